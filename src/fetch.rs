use log::info;
use reqwest::Client;

use crate::error::MenuError;

pub fn build_client() -> Result<Client, MenuError> {
    let client = Client::builder()
        // Avoid macOS system proxy lookup that can panic in sandboxed contexts.
        .no_proxy()
        .user_agent("mensa-mail/0.1")
        .build()?;
    Ok(client)
}

/// Download the weekly menu PDF. The only fatal I/O of a run; everything
/// after this degrades instead of aborting.
pub async fn download_pdf(client: &Client, url: &str) -> Result<Vec<u8>, MenuError> {
    info!("downloading menu from {url}");
    let response = client.get(url).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    info!("downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

/// Decode the PDF into per-page text. Pages come back separated by form
/// feeds; fully blank pages are dropped.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<String>, MenuError> {
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| MenuError::Decode(e.to_string()))?;
    let pages: Vec<String> = text
        .split('\u{c}')
        .filter(|page| !page.trim().is_empty())
        .map(str::to_string)
        .collect();
    if pages.is_empty() {
        return Err(MenuError::Decode("document contains no text".to_string()));
    }
    Ok(pages)
}
