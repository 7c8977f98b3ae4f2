//! curl-backed session for anonymous HTTP access.
//!
//! Runs in the current thread; call from `spawn_blocking` if used from async code.

use std::str;
use std::time::Duration;

use super::{Document, Fetched, Session, SessionError};
use crate::config::LinkscopeConfig;
use crate::retry::{classify_curl_error, classify_http_status};

/// Default cap on response bodies (16 MiB).
const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Plain GET session: follows redirects, sends a fixed user agent and any
/// extra headers (e.g. `Referer`), and decodes JSON when the server says so.
#[derive(Debug, Clone)]
pub struct HttpSession {
    site: String,
    user_agent: String,
    connect_timeout: Duration,
    timeout: Duration,
    headers: Vec<(String, String)>,
    max_body_bytes: usize,
}

impl HttpSession {
    pub fn new(site: impl Into<String>, config: &LinkscopeConfig) -> Self {
        Self {
            site: site.into(),
            user_agent: config.user_agent.clone(),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            timeout: Duration::from_secs(config.request_timeout_secs),
            headers: Vec::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Adds a header sent with every request.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    fn transport_error(url: &str, e: &curl::Error) -> SessionError {
        SessionError::Transport {
            url: url.to_string(),
            message: e.to_string(),
            kind: classify_curl_error(e),
        }
    }
}

impl Session for HttpSession {
    fn site(&self) -> &str {
        &self.site
    }

    fn fetch(&self, url: &str) -> Result<Fetched, SessionError> {
        let curl_err = |e: curl::Error| Self::transport_error(url, &e);

        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(curl_err)?;
        easy.get(true).map_err(curl_err)?;
        easy.follow_location(true).map_err(curl_err)?;
        easy.max_redirections(10).map_err(curl_err)?;
        easy.useragent(&self.user_agent).map_err(curl_err)?;
        easy.accept_encoding("").map_err(curl_err)?;
        easy.connect_timeout(self.connect_timeout).map_err(curl_err)?;
        easy.timeout(self.timeout).map_err(curl_err)?;

        if !self.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (name, value) in &self.headers {
                list.append(&format!("{}: {}", name.trim(), value.trim()))
                    .map_err(curl_err)?;
            }
            easy.http_headers(list).map_err(curl_err)?;
        }

        let mut body: Vec<u8> = Vec::new();
        let mut too_large = false;
        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    if body.len() + data.len() > self.max_body_bytes {
                        too_large = true;
                        // Returning a short count aborts the transfer.
                        return Ok(0);
                    }
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(curl_err)?;
            transfer.perform()
        };
        if too_large {
            return Err(SessionError::Decode {
                url: url.to_string(),
                message: format!("body exceeds {} bytes", self.max_body_bytes),
            });
        }
        performed.map_err(curl_err)?;

        let status = easy.response_code().map_err(curl_err)?;
        let final_url = easy
            .effective_url()
            .map_err(curl_err)?
            .unwrap_or(url)
            .to_string();
        let content_type = easy
            .content_type()
            .map_err(curl_err)?
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        tracing::debug!(site = %self.site, url, status, "fetched");

        match status {
            200..=299 => {}
            404 | 410 => {
                return Err(SessionError::NotFound {
                    url: final_url,
                    status: status as u16,
                })
            }
            401 | 403 => {
                return Err(SessionError::Auth {
                    site: self.site.clone(),
                    message: format!("{final_url} returned HTTP {status}"),
                })
            }
            _ => {
                return Err(SessionError::Http {
                    url: final_url,
                    status: status as u16,
                    kind: classify_http_status(status),
                })
            }
        }

        let body = decode_body(&final_url, &content_type, body)?;
        Ok(Fetched {
            url: final_url,
            status: status as u16,
            body,
        })
    }
}

fn decode_body(url: &str, content_type: &str, body: Vec<u8>) -> Result<Document, SessionError> {
    if content_type.contains("json") {
        let value = serde_json::from_slice(&body).map_err(|e| SessionError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        return Ok(Document::Json(value));
    }
    let text = match String::from_utf8(body) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    };
    Ok(Document::Html(text))
}
