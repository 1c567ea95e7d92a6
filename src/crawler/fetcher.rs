//! Resource fetcher
//!
//! This module handles all retrieval for the crawler, including:
//! - Building the HTTP client with the crawler's user agent and timeout
//! - GET requests for http(s) URLs
//! - Reading `file://` URLs from disk, for crawling local mirrors
//! - Classifying failures into [`TransportError`] kinds
//!
//! There are no retries; a failed fetch is reported once and the caller
//! drops the item.

use crate::config::UserAgentConfig;
use crate::TransportError;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// A successfully retrieved resource
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code (200 for local files)
    pub status_code: u16,
    /// Content-Type header value, if the server sent one
    pub content_type: Option<String>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

/// Retrieves resources for the crawl loop
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResource, TransportError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    async fn fetch(&self, url: &str) -> Result<FetchedResource, TransportError> {
        (**self).fetch(url).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Applied to connecting and to the whole request
///
/// # Example
///
/// ```no_run
/// use media_crawler::config::UserAgentConfig;
/// use media_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(20)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// [`Fetcher`] for `http`, `https` and `file` URLs
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, timeout)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResource, TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::Other {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => fetch_http(&self.client, url).await,
            "file" => fetch_file(&parsed).await,
            scheme => Err(TransportError::Other {
                url: url.to_string(),
                message: format!("unsupported scheme '{}'", scheme),
            }),
        }
    }
}

/// Fetches a URL over HTTP
///
/// # Failure mapping
///
/// | Condition | Result |
/// |-----------|--------|
/// | Non-2xx status | `Status` |
/// | Timeout | `Timeout` |
/// | Connection refused, DNS, TLS | `Connect` |
/// | Body read failed | `Body` |
/// | Anything else | `Other` |
pub async fn fetch_http(client: &Client, url: &str) -> Result<FetchedResource, TransportError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_reqwest_error(url, e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return Err(TransportError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else {
            TransportError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    Ok(FetchedResource {
        final_url,
        status_code: status.as_u16(),
        content_type,
        body: body.to_vec(),
    })
}

fn classify_reqwest_error(url: &str, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
        }
    } else {
        TransportError::Other {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// Reads a `file://` URL from disk
///
/// The content type is guessed from the file extension since there is no
/// server to declare one.
pub async fn fetch_file(url: &Url) -> Result<FetchedResource, TransportError> {
    let path = url.to_file_path().map_err(|_| TransportError::Other {
        url: url.to_string(),
        message: "not a local file path".to_string(),
    })?;

    let body = tokio::fs::read(&path)
        .await
        .map_err(|e| TransportError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    Ok(FetchedResource {
        final_url: url.to_string(),
        status_code: 200,
        content_type: guess_content_type(&path).map(str::to_string),
        body,
    })
}

/// Maps a file extension to a Content-Type
pub fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let content_type = match ext.as_str() {
        "htm" | "html" => "text/html",
        "txt" => "text/plain",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "wma" => "audio/x-ms-wma",
        "aac" => "audio/aac",
        "wav" => "audio/x-wav",
        _ => return None,
    };
    Some(content_type)
}
