use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use super::SourceError;
use super::retry::{RetryPolicy, with_retry};

#[derive(Clone, Debug, PartialEq)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

pub struct Fetched {
    pub body: Bytes,
    pub content_type: Option<String>,
    pub final_url: Url,
}

pub fn client(cfg: &FetchConfig) -> Result<Client, SourceError> {
    Client::builder()
        .timeout(cfg.timeout)
        .user_agent(concat!("course-feed/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(SourceError::from_reqwest)
}

pub async fn fetch_source(client: &Client, url: &str, policy: &RetryPolicy) -> Result<Fetched, SourceError> {
    with_retry(policy, || fetch_once(client, url)).await
}

async fn fetch_once(client: &Client, url: &str) -> Result<Fetched, SourceError> {
    let resp = client.get(url).send().await.map_err(SourceError::from_reqwest)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Status(status));
    }
    let content_type = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let final_url = resp.url().clone();
    let body = resp.bytes().await.map_err(SourceError::from_reqwest)?;
    Ok(Fetched { body, content_type, final_url })
}
