//! Getting raw records from the upstream CMS: HTTP or local file, JSON or HTML.

use std::path::PathBuf;

use reqwest::StatusCode;
use url::Url;

use crate::course::RawRecord;
use crate::course::payload::{self, PayloadError};

pub mod fetch;
pub mod retry;
pub mod scrape;

use fetch::FetchConfig;
use retry::IsRetryable;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Url(u) => f.write_str(u),
            Source::File(p) => write!(f, "{}", p.display()),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PayloadKind {
    Json,
    Html,
}

impl PayloadKind {
    pub fn detect(content_type: Option<&str>, body: &str) -> Self {
        if let Some(ct) = content_type {
            let ct = ct.to_ascii_lowercase();
            if ct.contains("json") { return PayloadKind::Json; }
            if ct.contains("html") { return PayloadKind::Html; }
        }
        match body.trim_start_matches('\u{feff}').trim_start().chars().next() {
            Some('[') | Some('{') => PayloadKind::Json,
            _ => PayloadKind::Html,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Json => "json",
            PayloadKind::Html => "html",
        }
    }
}

#[derive(Debug)]
pub enum SourceError {
    Http(reqwest::Error),
    Timeout,
    Status(StatusCode),
    Io(std::io::Error),
    Payload(PayloadError),
}

impl SourceError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Http(err)
        }
    }
}

impl IsRetryable for SourceError {
    fn is_retryable(&self) -> bool {
        match self {
            SourceError::Timeout => true,
            SourceError::Http(e) => e.is_connect() || e.is_request() || e.is_body(),
            SourceError::Status(s) => s.is_server_error() || *s == StatusCode::TOO_MANY_REQUESTS,
            SourceError::Io(_) | SourceError::Payload(_) => false,
        }
    }
}

impl std::fmt::Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceError::Http(err) => write!(f, "http error: {err}"),
            SourceError::Timeout => write!(f, "request timed out"),
            SourceError::Status(status) => write!(f, "upstream answered {status}"),
            SourceError::Io(err) => write!(f, "read error: {err}"),
            SourceError::Payload(err) => write!(f, "malformed source payload: {err}"),
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::Http(err) => Some(err),
            SourceError::Io(err) => Some(err),
            SourceError::Payload(err) => Some(err),
            SourceError::Timeout | SourceError::Status(_) => None,
        }
    }
}

impl From<PayloadError> for SourceError {
    fn from(err: PayloadError) -> Self { SourceError::Payload(err) }
}

#[derive(Debug)]
pub struct Loaded {
    pub records: Vec<RawRecord>,
    pub kind: PayloadKind,
    pub bytes: usize,
}

pub async fn load_records(source: &Source, cfg: &FetchConfig) -> Result<Loaded, SourceError> {
    let (body, content_type, base) = match source {
        Source::Url(url) => {
            let client = fetch::client(cfg)?;
            let fetched = fetch::fetch_source(&client, url, &cfg.retry).await?;
            let body = String::from_utf8_lossy(&fetched.body).into_owned();
            (body, fetched.content_type, Some(fetched.final_url))
        }
        Source::File(path) => {
            let body = tokio::fs::read_to_string(path).await.map_err(SourceError::Io)?;
            (body, None, None)
        }
    };
    let kind = PayloadKind::detect(content_type.as_deref(), &body);
    let records = decode(kind, &body, base.as_ref())?;
    Ok(Loaded { records, kind, bytes: body.len() })
}

pub fn decode(kind: PayloadKind, body: &str, base: Option<&Url>) -> Result<Vec<RawRecord>, SourceError> {
    match kind {
        PayloadKind::Json => Ok(payload::parse_records(body.trim_start_matches('\u{feff}'))?),
        PayloadKind::Html => Ok(scrape::scrape_records(body, base)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_prefers_content_type() {
        assert_eq!(PayloadKind::detect(Some("application/json; charset=utf-8"), "<html>"), PayloadKind::Json);
        assert_eq!(PayloadKind::detect(Some("text/html"), "[]"), PayloadKind::Html);
    }

    #[test]
    fn detect_sniffs_body_otherwise() {
        assert_eq!(PayloadKind::detect(None, "  \n[{\"title\":\"a\"}]"), PayloadKind::Json);
        assert_eq!(PayloadKind::detect(Some("text/plain"), "{\"items\":[]}"), PayloadKind::Json);
        assert_eq!(PayloadKind::detect(None, "<!doctype html><html></html>"), PayloadKind::Html);
        assert_eq!(PayloadKind::detect(None, ""), PayloadKind::Html);
    }

    #[test]
    fn decode_json_errors_are_typed() {
        let err = decode(PayloadKind::Json, "{\"nothing\":true}", None).unwrap_err();
        assert!(matches!(err, SourceError::Payload(PayloadError::NoRecordArray { .. })));
        assert!(!err.is_retryable());
    }

    #[test]
    fn status_retry_classification() {
        assert!(SourceError::Status(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(SourceError::Status(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(!SourceError::Status(StatusCode::NOT_FOUND).is_retryable());
        assert!(SourceError::Timeout.is_retryable());
    }

    #[tokio::test]
    async fn load_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.json");
        std::fs::write(&path, r#"{"items":[{"title":"A"},{"title":"B"}]}"#).unwrap();
        let cfg = FetchConfig { timeout: std::time::Duration::from_secs(1), retry: retry::RetryPolicy::default() };
        let loaded = load_records(&Source::File(path), &cfg).await.unwrap();
        assert_eq!(loaded.kind, PayloadKind::Json);
        assert_eq!(loaded.records.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let cfg = FetchConfig { timeout: std::time::Duration::from_secs(1), retry: retry::RetryPolicy::default() };
        let err = load_records(&Source::File("/definitely/not/here.json".into()), &cfg).await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
