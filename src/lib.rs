//! Extracts the weekly Mensa menu from the canteen's PDF export, resolves
//! dietary filters (ingredient words, allergen names) against the allergen
//! legend on the last page, and groups the surviving dishes by weekday for
//! the mail report.
//!
//! The pipeline is synchronous and runs page by page in document order:
//! raw rows are merged into logical entries (dish names wrap across
//! physical lines), each entry becomes at most one [`Dish`], and the legend
//! yields a bidirectional code/name mapping so filters configured by name
//! ("milch") match dishes annotated by code ("30").

pub mod allergens;
pub mod config;
pub mod dish;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod mailer;
pub mod report;
pub mod table;

use log::{debug, warn};

pub use allergens::{build_mapping, resolve_filter, AllergenMapping, ResolvedFilter};
pub use config::Config;
pub use dish::{Category, Dish};
pub use error::MenuError;
pub use filter::{filter_dishes, group_by_day, DayMenu, WeeklyMenu};

use table::{DayColumns, RowMerger};

/// Tunables for the document parse.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Keep the open logical row across a page boundary. Off by default:
    /// when it is ambiguous whether the last row of a page continues on the
    /// next one, treating it as closed avoids over-merging.
    pub merge_across_pages: bool,
}

/// Everything the core extracts from one document: the dish records in
/// discovery order and the allergen mapping from the legend page. The
/// mapping is always returned so the caller can inspect or dump it.
#[derive(Debug, Clone)]
pub struct ParsedMenu {
    pub dishes: Vec<Dish>,
    pub mapping: AllergenMapping,
}

/// Run the extraction pipeline over the decoded page texts.
///
/// Pages 1..N-1 hold the dish table, page N the allergen legend. Partial
/// failures never abort: pages without table structure or weekday headers
/// are skipped with a warning, unparsable rows at debug level, and a failed
/// legend degrades to an empty mapping (all allergen-name filters then
/// resolve to nothing).
pub fn parse_document(pages: &[String], options: &ParseOptions) -> ParsedMenu {
    // The last page is the legend, even in a one-page document (which then
    // has no menu pages at all).
    let (menu_pages, legend_page) = match pages {
        [] => (&[][..], None),
        _ => (&pages[..pages.len() - 1], pages.last()),
    };

    let mapping = match legend_page {
        Some(text) => match table::extract_rows(text, pages.len() - 1) {
            Ok(rows) => {
                let mapping = build_mapping(&rows);
                if mapping.is_empty() {
                    warn!(
                        "legend page yielded no allergen codes; allergen filters will not resolve"
                    );
                } else {
                    debug!("legend defines {} allergen codes", mapping.len());
                }
                mapping
            }
            Err(err) => {
                warn!("skipping legend page: {err}");
                AllergenMapping::default()
            }
        },
        None => {
            warn!("document has no legend page; allergen filters will not resolve");
            AllergenMapping::default()
        }
    };

    let mut merger = RowMerger::new();
    for (page_idx, text) in menu_pages.iter().enumerate() {
        let rows = match table::extract_rows(text, page_idx) {
            Ok(rows) => rows,
            Err(err) => {
                warn!("skipping page: {err}");
                continue;
            }
        };
        let Some((header_idx, days)) = DayColumns::detect(&rows) else {
            warn!("page {page_idx} has no weekday header row, skipping");
            continue;
        };
        // Rows above the weekday header are page preamble, not table.
        for row in &rows[header_idx + 1..] {
            merger.push_row(row, &days);
        }
        if !options.merge_across_pages {
            merger.close_open();
        }
    }

    let mut dishes = Vec::new();
    for group in merger.finish() {
        for (day, text) in &group.columns {
            match dish::parse_entry(text, *day, group.category) {
                Some(dish) => dishes.push(dish),
                None => debug!("page {}: not a dish: {text:?}", group.page),
            }
        }
    }

    // Every code on a dish should have been defined by the legend; keep
    // unknown codes anyway, they still match nothing.
    if !mapping.is_empty() {
        for dish in &dishes {
            for code in &dish.allergen_codes {
                if !mapping.knows_code(code) {
                    warn!(
                        "dish '{}' carries code '{code}' missing from the legend",
                        dish.name
                    );
                }
            }
        }
    }

    ParsedMenu { dishes, mapping }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use pretty_assertions::assert_eq;

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    const MENU_PAGE: &str = "Montag                  Dienstag\n\
                             Hauptgerichte\n\
                             Gulasch mit 3,50 €      Pasta 2,75 €\n\
                             Paprika (28)            mit Pesto (30)\n\
                             Beilagen\n\
                             Salat (28)              Reis\n";

    const LEGEND_PAGE: &str = "Kennzeichnung\n\
                               28 Soja und Sojaprodukte\n\
                               30 Milch und Milchprodukte, Milch\n";

    #[test]
    fn parses_dishes_and_legend_from_document() {
        let parsed = parse_document(&pages(&[MENU_PAGE, LEGEND_PAGE]), &ParseOptions::default());
        let names: Vec<_> = parsed.dishes.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Gulasch mit Paprika", "Pasta mit Pesto", "Salat", "Reis"]
        );
        assert_eq!(parsed.dishes[0].day, Weekday::Mon);
        assert_eq!(parsed.dishes[0].price, Some(3.50));
        assert_eq!(parsed.dishes[0].category, Category::Main);
        assert_eq!(parsed.dishes[3].category, Category::Side);
        assert!(parsed.mapping.knows_code("28"));
        assert!(parsed.mapping.codes_for("milch").is_some());
    }

    #[test]
    fn single_page_document_is_all_legend() {
        let parsed = parse_document(&pages(&[LEGEND_PAGE]), &ParseOptions::default());
        assert!(parsed.dishes.is_empty());
        assert!(parsed.mapping.knows_code("28"));

        // A lone menu page is read as a legend too; its price lines define
        // no codes, so the result is empty rather than wrong.
        let parsed = parse_document(&pages(&[MENU_PAGE]), &ParseOptions::default());
        assert!(parsed.dishes.is_empty());
        assert!(parsed.mapping.is_empty());
    }

    #[test]
    fn unreadable_pages_degrade_to_fewer_dishes() {
        let parsed = parse_document(
            &pages(&["   \n", MENU_PAGE, "no table here", LEGEND_PAGE]),
            &ParseOptions::default(),
        );
        assert_eq!(parsed.dishes.len(), 4);
        assert!(!parsed.mapping.is_empty());
    }

    #[test]
    fn page_boundary_closes_open_row_by_default() {
        let first = "Montag                  Dienstag\n\
                     Hauptgerichte\n\
                     Braten mit 3,50 €\n";
        let second = "Montag                  Dienstag\n\
                     Semmelknödel\n";
        let closed = parse_document(
            &pages(&[first, second, LEGEND_PAGE]),
            &ParseOptions::default(),
        );
        let names: Vec<_> = closed.dishes.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Braten mit", "Semmelknödel"]);

        let merged = parse_document(
            &pages(&[first, second, LEGEND_PAGE]),
            &ParseOptions {
                merge_across_pages: true,
            },
        );
        let names: Vec<_> = merged.dishes.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Braten mit Semmelknödel"]);
    }

    #[test]
    fn pipeline_is_deterministic() {
        let input = pages(&[MENU_PAGE, LEGEND_PAGE]);
        let first = parse_document(&input, &ParseOptions::default());
        let second = parse_document(&input, &ParseOptions::default());
        assert_eq!(first.dishes, second.dishes);
        assert_eq!(
            serde_json::to_string(&first.mapping).unwrap(),
            serde_json::to_string(&second.mapping).unwrap()
        );
    }
}
