//! End-to-end runs over synthetic multi-page documents: parse, resolve,
//! filter, aggregate, render.

use chrono::Weekday;
use pretty_assertions::assert_eq;

use mensa_mail::{
    filter_dishes, group_by_day, parse_document, report, resolve_filter, Category, ParseOptions,
};

const MENU_PAGE: &str = "\
Speiseplan der Woche

Montag                        Dienstag                      Mittwoch
Hauptgerichte
Schweinebraten mit 2,50 €     Gemüselasagne 4,25 €          Fischfilet 3,75 €
Knödel und                    mit Parmesan (30)
Salat (21a, 28)
Beilagen
Kartoffeln 0,75 €             Reis 0,75 €
Alle Preise in Euro
";

const LEGEND_PAGE: &str = "\
Kennzeichnung der Allergene
21a Gluten aus Weizen
28 Soja und Sojaprodukte
30 Milch und Milchprodukte, Milch
";

fn document() -> Vec<String> {
    vec![MENU_PAGE.to_string(), LEGEND_PAGE.to_string()]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn wrapped_dish_names_merge_without_losing_fragments() {
    let parsed = parse_document(&document(), &ParseOptions::default());
    let braten = parsed
        .dishes
        .iter()
        .find(|d| d.name.starts_with("Schweinebraten"))
        .unwrap();
    // Three physical rows, one dish, all fragments in order.
    assert_eq!(braten.name, "Schweinebraten mit Knödel und Salat");
    assert_eq!(braten.price, Some(2.50));
    assert_eq!(braten.day, Weekday::Mon);
    assert_eq!(braten.category, Category::Main);
    let codes: Vec<_> = braten.allergen_codes.iter().cloned().collect();
    assert_eq!(codes, vec!["21a".to_string(), "28".to_string()]);
}

#[test]
fn full_run_filters_by_word_and_resolved_allergen() {
    let parsed = parse_document(&document(), &ParseOptions::default());
    assert_eq!(parsed.dishes.len(), 5);

    let filter = resolve_filter(
        &strings(&["schwein"]),
        &strings(&["MILCH", "sellerie"]),
        &parsed.mapping,
    );
    assert_eq!(filter.codes.iter().collect::<Vec<_>>(), vec!["30"]);
    assert_eq!(filter.unresolved, strings(&["sellerie"]));

    let kept = filter_dishes(parsed.dishes, &filter);
    let names: Vec<_> = kept.iter().map(|d| d.name.as_str()).collect();
    // "schwein" drops the Schweinebraten, code 30 drops the Gemüselasagne;
    // the unresolved "sellerie" drops nothing.
    assert_eq!(names, vec!["Fischfilet", "Kartoffeln", "Reis"]);

    let menu = group_by_day(kept);
    assert!(menu.for_day(Weekday::Mon).mains.is_empty());
    assert_eq!(menu.for_day(Weekday::Mon).sides[0].name, "Kartoffeln");
    assert_eq!(menu.for_day(Weekday::Tue).sides[0].name, "Reis");
    assert_eq!(menu.for_day(Weekday::Wed).mains[0].name, "Fischfilet");
}

#[test]
fn codeless_legend_degrades_to_unresolved_filters() {
    // Last page carries no code rows: nothing to resolve against.
    let pages = vec![
        MENU_PAGE.to_string(),
        "Kennzeichnung der Allergene\nStand: aktuelle Woche\n".to_string(),
    ];
    let parsed = parse_document(&pages, &ParseOptions::default());
    assert!(parsed.mapping.is_empty());

    let filter = resolve_filter(&[], &strings(&["milch"]), &parsed.mapping);
    assert!(filter.codes.is_empty());
    assert_eq!(filter.unresolved, strings(&["milch"]));

    // Dishes carrying codes are unaffected by the unresolved name.
    let kept = filter_dishes(parsed.dishes, &filter);
    assert_eq!(kept.len(), 5);
}

#[test]
fn unspaced_code_lists_merge_and_still_filter() {
    let menu_page = "\
Montag                        Dienstag
Hauptgerichte
Sojaschnitzel 3,25 €          Pasta 2,75 €
mit Reis (21,28)
";
    let legend_page = "21 Gluten\n28 Soja und Sojaprodukte\n";
    let parsed = parse_document(
        &[menu_page.to_string(), legend_page.to_string()],
        &ParseOptions::default(),
    );

    // The tight "(21,28)" list is codes, not a 21,28 € price: the wrapped
    // row stays part of the schnitzel and the codes survive resolution.
    let schnitzel = parsed
        .dishes
        .iter()
        .find(|d| d.name.starts_with("Sojaschnitzel"))
        .unwrap();
    assert_eq!(schnitzel.name, "Sojaschnitzel mit Reis");
    assert_eq!(schnitzel.price, Some(3.25));
    let codes: Vec<_> = schnitzel.allergen_codes.iter().cloned().collect();
    assert_eq!(codes, vec!["21".to_string(), "28".to_string()]);

    let filter = resolve_filter(&[], &strings(&["soja"]), &parsed.mapping);
    let kept = filter_dishes(parsed.dishes, &filter);
    let names: Vec<_> = kept.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Pasta"]);
}

#[test]
fn repeated_runs_render_identical_output() {
    let render = || {
        let parsed = parse_document(&document(), &ParseOptions::default());
        let filter = resolve_filter(&strings(&["schwein"]), &strings(&["soja"]), &parsed.mapping);
        let menu = group_by_day(filter_dishes(parsed.dishes, &filter));
        report::render_html(&menu, Weekday::Mon)
    };
    assert_eq!(render(), render());
}

#[test]
fn rendered_report_contains_surviving_dishes_only() {
    let parsed = parse_document(&document(), &ParseOptions::default());
    let filter = resolve_filter(&strings(&["schwein"]), &[], &parsed.mapping);
    let menu = group_by_day(filter_dishes(parsed.dishes, &filter));

    let html = report::render_html(&menu, Weekday::Tue);
    assert!(html.contains("Gemüselasagne"));
    assert!(html.contains("4,25 €"));
    assert!(html.contains("Fischfilet"));
    assert!(!html.contains("Schweinebraten"));
}
