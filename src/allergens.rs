use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde::Serialize;

use crate::table::RawRow;

/// A legend entry: a one- or two-digit code with an optional lowercase
/// letter suffix ("21a"), followed by descriptive text up to the next code.
static LEGEND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}[a-z]?)\s+([^\d]+)").unwrap());

static PARENTHETICAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Bidirectional allergen code/name mapping built from the legend page.
/// Both directions are owned and filled together in one pass, so the
/// round-trip invariant holds by construction. Read-only after build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AllergenMapping {
    code_to_names: BTreeMap<String, BTreeSet<String>>,
    name_to_codes: BTreeMap<String, BTreeSet<String>>,
}

/// Lowercase, trim and collapse internal whitespace.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl AllergenMapping {
    /// Insert one code/name association into both directions. The name is
    /// normalized; names are not unique to one code and a code may collect
    /// aliases from several legend rows.
    pub fn insert(&mut self, code: &str, name: &str) {
        let name = normalize_name(name);
        if name.is_empty() {
            return;
        }
        self.code_to_names
            .entry(code.to_string())
            .or_default()
            .insert(name.clone());
        self.name_to_codes
            .entry(name)
            .or_default()
            .insert(code.to_string());
    }

    pub fn codes_for(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.name_to_codes.get(&normalize_name(name))
    }

    pub fn names_for(&self, code: &str) -> Option<&BTreeSet<String>> {
        self.code_to_names.get(code)
    }

    pub fn knows_code(&self, code: &str) -> bool {
        self.code_to_names.contains_key(code)
    }

    pub fn is_empty(&self) -> bool {
        self.code_to_names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.code_to_names.len()
    }
}

/// Yield `(code, description)` pairs found in one cell. A code only counts
/// when it sits at the start of the text or after whitespace, so "B12"
/// inside a description is not mistaken for one.
fn legend_entries(text: &str) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for caps in LEGEND_RE.captures_iter(text) {
        let code = caps.get(1).unwrap();
        let before = &text[..code.start()];
        if !before.is_empty() && !before.ends_with(|c: char| c.is_whitespace()) {
            continue;
        }
        entries.push((code.as_str().to_string(), caps[2].to_string()));
    }
    entries
}

/// Split a legend description into alias names. Entries separate aliases
/// with commas or line breaks; compound phrases additionally contribute
/// their first word and their "und"-joined parts, so "Milch und
/// Milchprodukte" resolves from plain "milch" as well.
fn split_aliases(description: &str) -> Vec<String> {
    let cleaned = PARENTHETICAL_RE.replace_all(description, " ");
    let mut aliases = Vec::new();
    for phrase in cleaned.split(|c| c == ',' || c == '\n') {
        let phrase = normalize_name(phrase.trim_end_matches(':'));
        if phrase.chars().count() < 3 {
            continue;
        }
        if let Some(first) = phrase.split_whitespace().next() {
            if first != phrase && first.chars().count() >= 3 {
                aliases.push(first.to_string());
            }
        }
        if phrase.contains(" und ") {
            for part in phrase.split(" und ") {
                let part = part.trim();
                if part.chars().count() >= 3 {
                    aliases.push(part.to_string());
                }
            }
        }
        aliases.push(phrase);
    }
    aliases
}

/// Build the mapping from the legend page's raw rows. Rows that yield no
/// recognizable code are skipped; legend formatting varies by document
/// revision and a sparse mapping only degrades filter resolution.
pub fn build_mapping(rows: &[RawRow]) -> AllergenMapping {
    let mut mapping = AllergenMapping::default();
    for row in rows {
        let mut found = false;
        for cell in &row.cells {
            for (code, description) in legend_entries(&cell.text) {
                found = true;
                for alias in split_aliases(&description) {
                    mapping.insert(&code, &alias);
                }
            }
        }
        if !found {
            debug!("legend row {} yielded no code, skipped", row.index);
        }
    }
    mapping
}

/// User-configured exclusion criteria translated into matchable primitives.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolvedFilter {
    pub words: BTreeSet<String>,
    pub codes: BTreeSet<String>,
    pub unresolved: Vec<String>,
}

/// Resolve configured filter input against the mapping. Unresolved allergen
/// names are dropped with a warning and reported back, never fatal; users
/// mistype or use vocabulary the legend does not.
pub fn resolve_filter(
    words: &[String],
    allergen_names: &[String],
    mapping: &AllergenMapping,
) -> ResolvedFilter {
    let words = words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect();

    let mut codes = BTreeSet::new();
    let mut unresolved = Vec::new();
    for name in allergen_names {
        match mapping.codes_for(name) {
            Some(found) => {
                debug!("allergen filter '{name}' resolved to codes {found:?}");
                codes.extend(found.iter().cloned());
            }
            None => {
                warn!("allergen filter '{name}' not found in the legend, ignoring it");
                unresolved.push(name.clone());
            }
        }
    }

    ResolvedFilter {
        words,
        codes,
        unresolved,
    }
}
