//! Heuristic price extraction from static HTML.
//!
//! ### Per-domain rules
//! - Configured overrides are tried first, in order, for matching domains.
//! - A rule that finds nothing falls through to the generic scan.
//!
//! ### Generic scan
//! - Walks every element once, in document order.
//! - Candidates carry `price` in their `class` or `id` (any case).
//! - The first candidate whose own text holds a non-zero number wins.
//!
//! ### Result
//! - A numeric string, or `"0"` when nothing was found.

pub mod rules;
pub mod scan;

pub use rules::{PriceRule, SelectorRule, normalize_decimal};
pub use scan::{PriceNode, is_candidate, match_price, scan_candidates};

use pricewatch_core::{Error, PriceOverride};
use scraper::Html;

/// Price reported when extraction finds nothing.
pub const PRICE_NOT_FOUND: &str = "0";

/// Price extractor with optional per-domain rules.
#[derive(Default)]
pub struct PriceExtractor {
    rules: Vec<Box<dyn PriceRule>>,
}

impl PriceExtractor {
    /// Create an extractor that only runs the generic scan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an extractor from configured overrides.
    ///
    /// # Errors
    ///
    /// Returns `Error::ExtractFailed` if any override selector is invalid.
    pub fn from_overrides(overrides: &[PriceOverride]) -> Result<Self, Error> {
        let mut extractor = Self::new();
        for rule in overrides {
            extractor = extractor.with_rule(SelectorRule::try_from(rule)?);
        }
        Ok(extractor)
    }

    /// Append a rule; rules run in the order they were added.
    pub fn with_rule(mut self, rule: impl PriceRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Number of configured rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Extract a price from `html` fetched from `domain`.
    ///
    /// Returns [`PRICE_NOT_FOUND`] when no rule or candidate yields a price.
    pub fn extract(&self, html: &str, domain: &str) -> String {
        let document = Html::parse_document(html);

        for rule in self.rules.iter().filter(|rule| rule.applies_to(domain)) {
            if let Some(price) = rule.extract(&document) {
                return price;
            }
            tracing::debug!(domain, "override found no price, continuing");
        }

        scan_candidates(scan::elements(&document)).unwrap_or_else(|| PRICE_NOT_FOUND.to_string())
    }
}
