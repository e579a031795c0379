use anyhow::{Context, Result};
use std::io::Cursor;

use crate::models::DocumentUnit;

/// Fetch each URL in order and reduce it to readable text, one unit per URL.
pub async fn load_websites(
    client: &reqwest::Client,
    urls: &[String],
) -> Result<Vec<DocumentUnit>> {
    let mut units = Vec::with_capacity(urls.len());
    for url in urls {
        units.push(load_website(client, url).await?);
    }
    tracing::info!(pages = units.len(), "Loaded web pages");
    Ok(units)
}

async fn load_website(client: &reqwest::Client, url: &str) -> Result<DocumentUnit> {
    let parsed = reqwest::Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;

    let response = client
        .get(parsed)
        .send()
        .await
        .with_context(|| format!("Failed to fetch {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("Fetching {url} returned {}", response.status());
    }

    let is_html = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
        .unwrap_or(false);
    let final_url = response.url().clone();

    let body = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read body of {url}"))?;

    if !is_html {
        return Ok(DocumentUnit::new(String::from_utf8_lossy(&body), url));
    }

    let (title, text) = extract_readable(&body, &final_url)?;
    let mut unit = DocumentUnit::new(text, url);
    if !title.is_empty() {
        unit.metadata
            .insert("title".to_string(), serde_json::Value::String(title));
    }
    Ok(unit)
}

/// Title and main text of an HTML page.
fn extract_readable(html: &[u8], url: &reqwest::Url) -> Result<(String, String)> {
    let mut cursor = Cursor::new(html);
    let product = readability::extractor::extract(&mut cursor, url)
        .map_err(|e| anyhow::anyhow!("Failed to extract readable text from {url}: {e}"))?;
    Ok((product.title.trim().to_string(), product.text.trim().to_string()))
}
