use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Pick a file extension from the response `Content-Type`.
///
/// Checks run in order and a later match overrides an earlier one, so an
/// OOXML word-processing type (which contains "doc") wins over anything else.
pub fn sniff_extension(content_type: &str) -> Option<&'static str> {
    let content_type = content_type.to_ascii_lowercase();
    let mut ext = None;
    if content_type.contains("pdf") {
        ext = Some("pdf");
    }
    if content_type.contains("text") {
        ext = Some("txt");
    }
    if content_type.contains("doc") {
        ext = Some("docx");
    }
    ext
}

/// Extension of the last path segment of `url`, lowercased.
fn url_extension(url: &reqwest::Url) -> Option<String> {
    let name = url.path_segments()?.last()?;
    let ext = Path::new(name).extension()?.to_str()?;
    Some(ext.to_ascii_lowercase())
}

/// Download `link` into `dir` as `download.<ext>` and return the file path.
///
/// The extension comes from the `Content-Type` header, falling back to the
/// URL's own extension. A link with neither ends up as `download.bin`, which
/// the loader then reports as unsupported.
pub async fn download_file(client: &reqwest::Client, link: &str, dir: &Path) -> Result<PathBuf> {
    let url = reqwest::Url::parse(link).with_context(|| format!("Invalid file link: {link}"))?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("Failed to download {link}"))?;

    if !response.status().is_success() {
        anyhow::bail!("Downloading {link} returned {}", response.status());
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let ext = sniff_extension(&content_type)
        .map(str::to_string)
        .or_else(|| url_extension(&url))
        .unwrap_or_else(|| "bin".to_string());

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read body of {link}"))?;

    let path = dir.join(format!("download.{ext}"));
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(
        link,
        content_type = %content_type,
        bytes = bytes.len(),
        file = %path.display(),
        "Downloaded file"
    );
    Ok(path)
}
