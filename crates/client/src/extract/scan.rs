//! Generic `price` class/id scan.
//!
//! The scan works over [`PriceNode`], a two-method view of an element, so it
//! can be driven by any HTML tree that can report attributes and own text.

use regex::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;

/// ASCII integer part with an optional `.` and one or two fractional digits.
static PRICE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(\.[0-9]{1,2})?").expect("invalid price regex"));

/// Attributes whose value marks an element as a price candidate.
const CANDIDATE_ATTRS: [&str; 2] = ["class", "id"];

/// The element capabilities the price scan needs.
pub trait PriceNode {
    /// Value of attribute `name`, if present.
    fn attr(&self, name: &str) -> Option<&str>;

    /// Text held directly by this node, excluding child elements.
    fn own_text(&self) -> String;
}

impl PriceNode for ElementRef<'_> {
    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn own_text(&self) -> String {
        self.children()
            .filter_map(|child| child.value().as_text())
            .map(|text| &**text)
            .collect()
    }
}

/// Whether `class` or `id` contains `price`, ignoring case.
pub fn is_candidate<N: PriceNode>(node: &N) -> bool {
    CANDIDATE_ATTRS
        .iter()
        .any(|name| node.attr(name).is_some_and(|value| value.to_lowercase().contains("price")))
}

/// First price-looking number in `text`, if it is greater than zero.
pub fn match_price(text: &str) -> Option<String> {
    let found = PRICE_PATTERN.find(text)?.as_str();
    let value: f64 = found.parse().ok()?;
    (value > 0.0).then(|| found.to_string())
}

/// Walk nodes in order and return the first candidate's non-zero price.
pub fn scan_candidates<N, I>(nodes: I) -> Option<String>
where
    N: PriceNode,
    I: IntoIterator<Item = N>,
{
    nodes
        .into_iter()
        .filter(is_candidate)
        .find_map(|node| match_price(&node.own_text()))
}

/// Every element of `document` in document order.
pub fn elements(document: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    document.tree.root().descendants().filter_map(ElementRef::wrap)
}
