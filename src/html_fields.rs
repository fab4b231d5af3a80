//! Label-driven extraction helpers shared by the team and player page parsers.
//!
//! Upstream pages render profile data as loose "label: value" fragments with no
//! stable ids, so each parser declares a `{label -> field}` table and feeds the
//! candidate fragments through [`extract_labeled`].

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Selector};

static FIRST_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

pub type LabelTable<F> = [(&'static str, F)];

/// Text of an element with its text nodes trimmed and joined by single spaces.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text nodes trimmed and concatenated without a separator.
pub fn stripped_text(el: &ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

/// Text of an element with every whitespace character removed.
pub fn compact_text(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The part after the last ASCII or full-width colon, trimmed.
pub fn value_after_label(text: &str) -> String {
    text.rsplit([':', '：'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

pub fn first_integer(text: &str) -> Option<i64> {
    FIRST_INT.find(text)?.as_str().parse().ok()
}

/// Fields whose label occurs in `text` (whitespace ignored), in table order.
pub fn labels_in<F: Copy>(text: &str, table: &LabelTable<F>) -> Vec<F> {
    let compact = compact_text(text);
    table
        .iter()
        .filter(|(label, _)| compact.contains(label))
        .map(|(_, field)| *field)
        .collect()
}

/// Runs every fragment against the table and hands matches to `assign`.
///
/// A later fragment matching the same field overwrites an earlier one; fragments
/// that match no label are ignored.
pub fn extract_labeled<'a, F, I>(fragments: I, table: &LabelTable<F>, mut assign: impl FnMut(F, String))
where
    F: Copy,
    I: IntoIterator<Item = &'a str>,
{
    for fragment in fragments {
        for field in labels_in(fragment, table) {
            assign(field, value_after_label(fragment));
        }
    }
}

/// `src` of the first `img` under the first descendant matching `selector`.
pub fn select_img_src(el: &ElementRef<'_>, selector: &Selector, img: &Selector) -> Option<String> {
    el.select(selector)
        .next()?
        .select(img)
        .next()?
        .value()
        .attr("src")
        .map(str::to_string)
}

pub fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static css selector")
}
