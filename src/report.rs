use chrono::Weekday;

use crate::dish::{german_weekday, Dish};
use crate::filter::WeeklyMenu;

fn format_price(price: f64) -> String {
    format!("{price:.2} €").replace('.', ",")
}

fn push_section(html: &mut String, title: &str, dishes: &[Dish]) {
    if dishes.is_empty() {
        return;
    }
    // Cheapest first; unpriced dishes go last.
    let mut sorted: Vec<&Dish> = dishes.iter().collect();
    sorted.sort_by(|a, b| {
        a.price
            .unwrap_or(f64::MAX)
            .total_cmp(&b.price.unwrap_or(f64::MAX))
    });

    html.push_str(&format!("<h3>{title}</h3>"));
    for dish in sorted {
        match dish.price {
            Some(price) => html.push_str(&format!(
                "<p><b>{}</b><br>{}</p>",
                dish.name,
                format_price(price)
            )),
            None => html.push_str(&format!("<p><b>{}</b></p>", dish.name)),
        }
    }
}

/// Render the mail body: sections for today and, Monday through Thursday,
/// tomorrow. `today` is a parameter so rendering stays deterministic under
/// test; the driver passes the current local weekday.
pub fn render_html(menu: &WeeklyMenu, today: Weekday) -> String {
    let mut html = String::from(
        "<html><head><style>body { font-family: sans-serif; } \
         h2, h3 { color: #333; } p { margin: 0.5em 0; }</style></head><body>",
    );
    html.push_str("<h1>HWR Mensa Menü</h1><hr>");

    let today_idx = today.num_days_from_monday();
    let mut sections = Vec::new();
    if today_idx < 5 {
        sections.push(("Heute", today));
    }
    if today_idx < 4 {
        sections.push(("Morgen", today.succ()));
    }

    if sections.is_empty() {
        html.push_str("<p>Schönes Wochenende! Keine Gerichte für heute oder morgen verfügbar.</p>");
    } else {
        for (label, day) in sections {
            html.push_str(&format!("<h2>{label} ({})</h2>", german_weekday(day)));
            let day_menu = menu.for_day(day);
            if day_menu.is_empty() {
                html.push_str("<p>Keine Gerichte verfügbar.</p>");
            } else {
                push_section(&mut html, "Hauptgerichte", &day_menu.mains);
                push_section(&mut html, "Beilagen", &day_menu.sides);
            }
            html.push_str("<br>");
        }
    }

    html.push_str("<hr><p><small>Automatisch generiert vom Mensa-Bot.</small></p>");
    html.push_str("</body></html>");
    html
}
