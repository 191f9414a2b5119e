// HTTP fetching with a per-fetch deadline and manually followed redirects

use crate::error::{FetchError, Result};
use reqwest::header::LOCATION;
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Linkscope/0.1 (https://github.com/trapdoorsec/linkscope)";

/// Final answer of a fetch after any redirects were followed.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub status: u16,
    pub final_url: String,
    pub redirect_count: usize,
    pub body: Option<String>,
}

/// Thin wrapper over a shared [`Client`].
///
/// Redirects are disabled at the client and followed here so that the hop
/// count and final URL of every fetch are known exactly.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_redirects: usize,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration, max_redirects: usize) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            timeout,
            max_redirects,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Fetch `url`, following at most `max_redirects` redirects.
    ///
    /// The whole chain shares one deadline. Any HTTP status is an `Ok`; only
    /// transport problems are errors.
    pub async fn fetch(
        &self,
        method: Method,
        url: &str,
        read_body: bool,
    ) -> std::result::Result<FetchOutcome, FetchError> {
        match tokio::time::timeout(self.timeout, self.follow(method, url, read_body)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        }
    }

    /// GET with the body read as text.
    pub async fn get_text(&self, url: &str) -> std::result::Result<FetchOutcome, FetchError> {
        self.fetch(Method::GET, url, true).await
    }

    async fn follow(
        &self,
        method: Method,
        url: &str,
        read_body: bool,
    ) -> std::result::Result<FetchOutcome, FetchError> {
        let mut current = Url::parse(url)
            .map_err(|e| FetchError::Request(format!("invalid URL '{}': {}", url, e)))?;
        let mut redirect_count = 0;

        loop {
            let response = self
                .client
                .request(method.clone(), current.clone())
                .send()
                .await
                .map_err(|e| self.transport_error(e))?;
            let status = response.status();

            if status.is_redirection()
                && let Some(location) = response.headers().get(LOCATION)
            {
                if redirect_count >= self.max_redirects {
                    return Err(FetchError::TooManyRedirects(self.max_redirects));
                }
                let location = location
                    .to_str()
                    .map_err(|e| FetchError::InvalidRedirect(e.to_string()))?;
                let next = current
                    .join(location)
                    .map_err(|e| FetchError::InvalidRedirect(format!("{}: {}", location, e)))?;
                debug!("{} {} -> {}", status.as_u16(), current, next);
                current = next;
                redirect_count += 1;
                continue;
            }

            let body = if read_body {
                Some(response.text().await.map_err(|e| self.transport_error(e))?)
            } else {
                None
            };

            return Ok(FetchOutcome {
                status: status.as_u16(),
                final_url: current.to_string(),
                redirect_count,
                body,
            });
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            return FetchError::Timeout(self.timeout);
        }

        let text = error.to_string();
        if error.is_connect() {
            if text.to_lowercase().contains("dns") {
                FetchError::Connect(format!("could not resolve hostname: {}", text))
            } else {
                FetchError::Connect(text)
            }
        } else {
            FetchError::Request(text)
        }
    }
}
