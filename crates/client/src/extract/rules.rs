//! Per-domain extraction rules.
//!
//! Rules are tried in configuration order before the generic scan. A rule
//! that finds nothing usable yields `None` and the next rule (or the scan)
//! takes over; a rule never aborts extraction.

use pricewatch_core::{Error, PriceOverride};
use scraper::{Html, Selector};

use super::scan::match_price;

/// A (domain predicate, extraction strategy) pair.
pub trait PriceRule: Send + Sync {
    /// Whether this rule should run for pages of `domain`.
    fn applies_to(&self, domain: &str) -> bool;

    /// Price found by this rule, if any.
    fn extract(&self, document: &Html) -> Option<String>;
}

/// Rule backed by a configured CSS selector.
#[derive(Debug)]
pub struct SelectorRule {
    domain: String,
    selector: Selector,
    decimal_separator: Option<char>,
}

impl SelectorRule {
    /// Build a rule, validating the selector.
    pub fn new(domain: &str, selector: &str, decimal_separator: Option<char>) -> Result<Self, Error> {
        let parsed = Selector::parse(selector)
            .map_err(|e| Error::ExtractFailed(format!("invalid selector '{selector}' for {domain}: {e}")))?;

        Ok(Self {
            domain: domain.trim().trim_start_matches("www.").to_lowercase(),
            selector: parsed,
            decimal_separator,
        })
    }

    fn price_from_text(&self, text: &str) -> Option<String> {
        match self.decimal_separator {
            Some(separator) => normalize_decimal(text, separator),
            None => match_price(text),
        }
    }
}

impl TryFrom<&PriceOverride> for SelectorRule {
    type Error = Error;

    fn try_from(rule: &PriceOverride) -> Result<Self, Self::Error> {
        Self::new(&rule.domain, &rule.selector, rule.decimal_separator)
    }
}

impl PriceRule for SelectorRule {
    fn applies_to(&self, domain: &str) -> bool {
        domain == self.domain
            || domain
                .strip_suffix(self.domain.as_str())
                .is_some_and(|prefix| prefix.ends_with('.'))
    }

    fn extract(&self, document: &Html) -> Option<String> {
        document
            .select(&self.selector)
            .find_map(|element| self.price_from_text(&element.text().collect::<String>()))
    }
}

/// Normalize a price written with `separator` as its decimal mark.
///
/// Keeps only digits and the separator, turns the separator into `.` and
/// requires the result to parse as a positive decimal.
pub fn normalize_decimal(text: &str, separator: char) -> Option<String> {
    let normalized: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == separator)
        .map(|c| if c == separator { '.' } else { c })
        .collect();

    let value: f64 = normalized.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_comma_decimal() {
        assert_eq!(normalize_decimal("1.299,99 €", ','), Some("1299.99".to_string()));
        assert_eq!(normalize_decimal("EUR 5,5", ','), Some("5.5".to_string()));
    }

    #[test]
    fn test_normalize_dot_decimal_strips_grouping() {
        assert_eq!(normalize_decimal("$1,299.99", '.'), Some("1299.99".to_string()));
    }

    #[test]
    fn test_normalize_failure() {
        assert_eq!(normalize_decimal("1,2,3", ','), None);
        assert_eq!(normalize_decimal("sold out", ','), None);
        assert_eq!(normalize_decimal("0,00", ','), None);
    }

    #[test]
    fn test_rule_applies_to_domain_and_subdomains() {
        let rule = SelectorRule::new("www.Shop.example", ".amount", None).unwrap();
        assert!(rule.applies_to("shop.example"));
        assert!(rule.applies_to("de.shop.example"));
        assert!(!rule.applies_to("othershop.example"));
        assert!(!rule.applies_to("example"));
    }

    #[test]
    fn test_rule_rejects_invalid_selector() {
        let result = SelectorRule::new("shop.example", "div[", None);
        assert!(matches!(result, Err(Error::ExtractFailed(_))));
    }

    #[test]
    fn test_rule_extracts_with_selector() {
        let html = Html::parse_document(r#"<p class="price">$99</p><span id="cost">EUR <b>12,40</b></span>"#);
        let rule = SelectorRule::new("shop.example", "#cost", Some(',')).unwrap();
        assert_eq!(rule.extract(&html), Some("12.40".to_string()));
    }

    #[test]
    fn test_rule_without_separator_uses_pattern() {
        let html = Html::parse_document(r#"<div class="amount">Now 15.5 only</div>"#);
        let rule = SelectorRule::new("shop.example", ".amount", None).unwrap();
        assert_eq!(rule.extract(&html), Some("15.5".to_string()));
    }

    #[test]
    fn test_rule_try_from_override() {
        let config =
            PriceOverride { domain: "shop.example".into(), selector: "span.now".into(), decimal_separator: Some(',') };
        let rule = SelectorRule::try_from(&config).unwrap();
        assert!(rule.applies_to("shop.example"));
    }
}
