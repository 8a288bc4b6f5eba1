use std::time::Duration;

use crate::errors::{Result, ViewerError};

/// Fetches raw asset bytes from the filesystem or over HTTP.
///
/// Sources starting with `http://` or `https://` go through a shared reqwest
/// client; everything else is treated as a filesystem path. HTTP responses
/// with non-success status codes are errors, not empty payloads.
pub struct AssetReader {
    client: reqwest::Client,
}

impl AssetReader {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    pub async fn read_bytes(&self, source: &str) -> Result<Vec<u8>> {
        if source.starts_with("http://") || source.starts_with("https://") {
            self.read_http(source).await
        } else {
            let data = tokio::fs::read(source).await?;
            Ok(data)
        }
    }

    async fn read_http(&self, source: &str) -> Result<Vec<u8>> {
        let url = url::Url::parse(source)?;
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(ViewerError::HttpResponseError {
                status: resp.status().as_u16(),
            });
        }
        let bytes = resp.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Filename portion of a source path or URL, for logging.
    #[must_use]
    pub fn source_filename(source: &str) -> &str {
        if source.starts_with("http://") || source.starts_with("https://") {
            source.rsplit('/').next().unwrap_or(source)
        } else {
            std::path::Path::new(source)
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or(source)
        }
    }
}
