use chrono::{Datelike, Local};
use log::{debug, info};

use mensa_mail::{
    fetch, filter_dishes, group_by_day, mailer, parse_document, report, resolve_filter, Config,
    ParseOptions,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let default_level = if config.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let client = fetch::build_client()?;
    let bytes = fetch::download_pdf(&client, &config.pdf_url).await?;
    let pages = fetch::extract_pages(&bytes)?;
    info!("decoded {} page(s)", pages.len());

    let parsed = parse_document(&pages, &ParseOptions::default());
    info!("extracted {} dish(es)", parsed.dishes.len());
    if config.debug {
        debug!(
            "allergen mapping: {}",
            serde_json::to_string_pretty(&parsed.mapping)?
        );
    }

    let filter = resolve_filter(&config.filter_words, &config.filter_allergens, &parsed.mapping);
    let kept = filter_dishes(parsed.dishes, &filter);
    let menu = group_by_day(kept);
    info!("{} dish(es) left after filtering", menu.dish_count());
    if config.debug {
        debug!("weekly menu: {}", serde_json::to_string_pretty(&menu)?);
    }

    let now = Local::now();
    let html = report::render_html(&menu, now.weekday());
    let subject = format!("Mensa HWR - {}", now.format("%d.%m"));
    mailer::send_report(&config, &subject, &html)?;

    Ok(())
}
