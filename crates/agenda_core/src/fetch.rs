use crate::config::CrawlConfig;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

/// Where listing and meeting pages come from.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Liveness check for a single link target.
pub trait LinkChecker {
    fn is_live(&self, url: &str) -> bool;
}

/// Blocking HTTP transport. No retries.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("building HTTP client")?;
        Ok(Self { client })
    }
}

impl PageSource for HttpClient {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("GET {url}"))?;
        debug!(url, status = %response.status(), "fetched page");
        // The body is parsed whatever the status; a missing table is handled
        // downstream.
        response.text().with_context(|| format!("reading body of {url}"))
    }
}

impl LinkChecker for HttpClient {
    fn is_live(&self, url: &str) -> bool {
        match self.client.head(url).send() {
            Ok(response) => response.status() == StatusCode::OK,
            Err(err) => {
                debug!(url, error = %err, "HEAD failed");
                false
            }
        }
    }
}
