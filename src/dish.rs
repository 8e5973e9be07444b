use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::Weekday;
use regex::Regex;
use serde::Serialize;

/// Price like "2,50" or "2,50 €". Menus list up to three tiers per dish
/// (students | employees | guests); the first tier is the one we keep.
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d{1,2}),(\d{2})\s*€?").unwrap());

/// Trailing allergen annotation, e.g. "Pasta (21a, 28)". The first character
/// inside the parentheses must be a digit so notes like "(vegan)" survive.
static ALLERGEN_TAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\((\d[0-9a-z,\s.]*)\)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Main,
    Side,
}

/// One menu item, immutable once parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dish {
    pub name: String,
    pub price: Option<f64>,
    pub day: Weekday,
    pub category: Category,
    pub allergen_codes: BTreeSet<String>,
}

pub fn weekday_from_german(name: &str) -> Option<Weekday> {
    let day = match name.trim().to_lowercase().as_str() {
        "montag" => Weekday::Mon,
        "dienstag" => Weekday::Tue,
        "mittwoch" => Weekday::Wed,
        "donnerstag" => Weekday::Thu,
        "freitag" => Weekday::Fri,
        "samstag" | "sonnabend" => Weekday::Sat,
        "sonntag" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

pub fn german_weekday(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Montag",
        Weekday::Tue => "Dienstag",
        Weekday::Wed => "Mittwoch",
        Weekday::Thu => "Donnerstag",
        Weekday::Fri => "Freitag",
        Weekday::Sat => "Samstag",
        Weekday::Sun => "Sonntag",
    }
}

/// Byte spans of parenthesized segments; an unclosed one runs to the end.
fn paren_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut open = None;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' if open.is_none() => open = Some(i),
            ')' => {
                if let Some(start) = open.take() {
                    spans.push((start, i + ch.len_utf8()));
                }
            }
            _ => {}
        }
    }
    if let Some(start) = open {
        spans.push((start, text.len()));
    }
    spans
}

fn outside(spans: &[(usize, usize)], pos: usize) -> bool {
    spans.iter().all(|&(start, end)| pos < start || pos >= end)
}

/// A price token only counts outside parentheses: a code list written
/// without spaces, "(21,28)", would otherwise pass for one.
pub(crate) fn contains_price(text: &str) -> bool {
    let spans = paren_spans(text);
    PRICE_RE.find_iter(text).any(|m| outside(&spans, m.start()))
}

fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn split_allergen_tail(text: &str) -> (String, BTreeSet<String>) {
    if let Some(caps) = ALLERGEN_TAIL_RE.captures(text) {
        let codes = caps[2]
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(|t| t.trim_matches('.'))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        (caps[1].trim().to_string(), codes)
    } else {
        (text.trim().to_string(), BTreeSet::new())
    }
}

/// Parse one merged day-column entry into a [`Dish`].
///
/// Returns `None` for groups that are not dishes (section headers, day
/// labels, blank separators). A dish-shaped entry without a parsable price
/// still yields a dish with `price: None`; sides bundled with a main are
/// commonly listed without one.
pub fn parse_entry(text: &str, day: Weekday, category: Category) -> Option<Dish> {
    let spans = paren_spans(text);
    let price = PRICE_RE
        .captures_iter(text)
        .find(|caps| outside(&spans, caps.get(0).map_or(0, |m| m.start())))
        .and_then(|caps| format!("{}.{}", &caps[1], &caps[2]).parse::<f64>().ok());

    let mut stripped = String::with_capacity(text.len());
    let mut tail_start = 0;
    for m in PRICE_RE.find_iter(text) {
        if outside(&spans, m.start()) {
            stripped.push_str(&text[tail_start..m.start()]);
            stripped.push(' ');
            tail_start = m.end();
        }
    }
    stripped.push_str(&text[tail_start..]);
    let stripped = stripped.replace('|', " ");
    let (name, allergen_codes) = split_allergen_tail(&collapse_ws(&stripped));
    let name = collapse_ws(&name);

    if name.chars().filter(|c| c.is_alphabetic()).count() < 3 {
        return None;
    }
    if weekday_from_german(&name).is_some() {
        return None;
    }
    let lower = name.to_lowercase();
    if lower.contains("hauptgericht") || lower.contains("beilage") {
        return None;
    }

    Some(Dish {
        name,
        price,
        day,
        category,
        allergen_codes,
    })
}
