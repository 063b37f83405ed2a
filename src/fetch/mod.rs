// src/fetch/mod.rs

use reqwest::Client;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

use crate::error::{ChartError, Result};

/// Where tabular content lives: a local file or an HTTP(S) endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Path(PathBuf),
    Url(Url),
}

impl Locator {
    /// `http://` and `https://` strings become URLs, everything else a path.
    pub fn parse(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Locator::Url(url),
            _ => Locator::Path(PathBuf::from(raw)),
        }
    }

    /// Final path segment, used to guess the payload format.
    pub fn file_name(&self) -> Option<String> {
        match self {
            Locator::Path(p) => p.file_name().map(|n| n.to_string_lossy().to_string()),
            Locator::Url(u) => u
                .path_segments()
                .and_then(|mut s| s.next_back())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Path(p) => write!(f, "{}", p.display()),
            Locator::Url(u) => write!(f, "{}", u),
        }
    }
}

impl From<&str> for Locator {
    fn from(raw: &str) -> Self {
        Locator::parse(raw)
    }
}

async fn get_bytes(client: &Client, url: &Url) -> Result<Vec<u8>> {
    debug!("Fetching {}", url);
    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ChartError::fetch(url, format!("GET failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(ChartError::fetch(url, format!("non-success status {status}")));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| ChartError::fetch(url, format!("reading body: {e}")))?;
    Ok(bytes.to_vec())
}

/// Single best-effort read of the raw bytes behind `locator`.
/// No retries and no timeout; the caller decides what a failure means.
#[instrument(level = "debug", skip(client, locator), fields(locator = %locator))]
pub async fn fetch_bytes(client: &Client, locator: &Locator) -> Result<Vec<u8>> {
    match locator {
        Locator::Url(url) => get_bytes(client, url).await,
        Locator::Path(path) => fs::read(path)
            .await
            .map_err(|e| ChartError::fetch(path.display(), e)),
    }
}

/// Like [`fetch_bytes`], decoded as UTF-8 (lossily).
pub async fn fetch_text(client: &Client, locator: &Locator) -> Result<String> {
    let bytes = fetch_bytes(client, locator).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Copy the source unchanged to `dest`.
pub async fn download_raw(
    client: &Client,
    locator: &Locator,
    dest: impl AsRef<Path>,
) -> Result<u64> {
    let dest = dest.as_ref();
    let bytes = fetch_bytes(client, locator).await?;
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ChartError::fetch(dest.display(), e))?;
    }
    fs::write(dest, &bytes)
        .await
        .map_err(|e| ChartError::fetch(dest.display(), e))?;
    Ok(bytes.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn locator_parse_distinguishes_urls_and_paths() {
        assert!(matches!(
            Locator::parse("https://example.com/api/confidence-data/crash"),
            Locator::Url(_)
        ));
        assert!(matches!(
            Locator::parse("static/data/confidence_indices.csv"),
            Locator::Path(_)
        ));
        // a Windows-ish drive letter parses as a URL scheme but is still a path
        assert!(matches!(Locator::parse("C:/data/x.csv"), Locator::Path(_)));
    }

    #[test]
    fn file_name_of_url_and_path() {
        let u = Locator::parse("http://localhost:5000/static/data/indices.json");
        assert_eq!(u.file_name().as_deref(), Some("indices.json"));
        let p = Locator::parse("data/indices.csv");
        assert_eq!(p.file_name().as_deref(), Some("indices.csv"));
    }

    #[tokio::test]
    async fn reads_local_file() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "Date,A\n2020-01-01,1\n")?;
        let loc = Locator::Path(tmp.path().to_path_buf());

        let text = fetch_text(&Client::new(), &loc).await?;
        assert_eq!(text, "Date,A\n2020-01-01,1\n");
        Ok(())
    }

    #[tokio::test]
    async fn missing_file_is_fetch_error() {
        let loc = Locator::parse("/definitely/not/here/indices.csv");
        let err = fetch_text(&Client::new(), &loc).await.unwrap_err();
        match err {
            ChartError::Fetch { locator, .. } => assert!(locator.ends_with("indices.csv")),
            other => panic!("expected Fetch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn download_copies_bytes_unchanged() -> anyhow::Result<()> {
        let mut tmp = NamedTempFile::new()?;
        let raw = b"Date,A\r\n\r\n2020-01-01,  x \r\n";
        tmp.write_all(raw)?;
        let dir = tempdir()?;
        let dest = dir.path().join("nested").join("copy.csv");

        let n = download_raw(&Client::new(), &Locator::Path(tmp.path().into()), &dest).await?;
        assert_eq!(n, raw.len() as u64);
        assert_eq!(std::fs::read(&dest)?, raw);
        Ok(())
    }
}
