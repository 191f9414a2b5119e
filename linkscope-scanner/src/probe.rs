// Concurrent reachability probing with a single HEAD -> GET fallback

use crate::error::FetchError;
use crate::fetch::{FetchOutcome, Fetcher};
use futures::future::join_all;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Attempt in the per-URL fallback chain.
///
/// `Optimistic` is a cheap HEAD. A transport failure moves the chain to
/// `Fallback`, a full GET; a transport failure there is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeMethod {
    Optimistic,
    Fallback,
}

impl ProbeMethod {
    pub fn http_method(&self) -> Method {
        match self {
            ProbeMethod::Optimistic => Method::HEAD,
            ProbeMethod::Fallback => Method::GET,
        }
    }

    /// The attempt to make after a transport failure, if any remains.
    pub fn next(self) -> Option<Self> {
        match self {
            ProbeMethod::Optimistic => Some(ProbeMethod::Fallback),
            ProbeMethod::Fallback => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeResult {
    pub url: String,
    pub method: ProbeMethod,
    /// 0 when no HTTP response was received.
    pub status: u16,
    pub succeeded: bool,
    pub final_url: String,
    pub redirect_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub response_time: Duration,
}

impl ProbeResult {
    pub fn is_success_status(status: u16) -> bool {
        status > 0 && status < 400
    }

    pub fn from_response(
        url: &str,
        method: ProbeMethod,
        outcome: &FetchOutcome,
        response_time: Duration,
    ) -> Self {
        let succeeded = Self::is_success_status(outcome.status);
        let error = (!succeeded).then(|| describe_status(outcome.status));

        Self {
            url: url.to_string(),
            method,
            status: outcome.status,
            succeeded,
            final_url: outcome.final_url.clone(),
            redirect_count: outcome.redirect_count,
            error,
            response_time,
        }
    }

    pub fn transport_failure(
        url: &str,
        method: ProbeMethod,
        error: &FetchError,
        response_time: Duration,
    ) -> Self {
        let mut reason = error.to_string();
        if reason.is_empty() {
            reason = "unknown transport error".to_string();
        }

        Self {
            url: url.to_string(),
            method,
            status: 0,
            succeeded: false,
            final_url: url.to_string(),
            redirect_count: 0,
            error: Some(reason),
            response_time,
        }
    }

    pub fn has_excessive_redirects(&self) -> bool {
        self.redirect_count > 1
    }
}

fn describe_status(status: u16) -> String {
    match StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
    {
        Some(reason) => format!("HTTP {} {}", status, reason),
        None => format!("HTTP {}", status),
    }
}

/// Probes a set of URLs concurrently and joins on all of them.
pub struct Prober {
    fetcher: Fetcher,
}

impl Prober {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    /// One result per input URL, in input order. Never fails.
    pub async fn probe_all(&self, urls: &[String]) -> Vec<ProbeResult> {
        info!("Probing {} links", urls.len());

        let results = join_all(urls.iter().map(|url| self.probe(url))).await;

        let failed = results.iter().filter(|r| !r.succeeded).count();
        info!(
            "Probe complete. {} reachable, {} unreachable",
            results.len() - failed,
            failed
        );
        results
    }

    pub async fn probe(&self, url: &str) -> ProbeResult {
        let start = Instant::now();
        let mut attempt = ProbeMethod::Optimistic;

        loop {
            match self
                .fetcher
                .fetch(attempt.http_method(), url, false)
                .await
            {
                Ok(outcome) => {
                    debug!(
                        "{} {} -> {} ({} redirects)",
                        attempt.http_method(),
                        url,
                        outcome.status,
                        outcome.redirect_count
                    );
                    return ProbeResult::from_response(url, attempt, &outcome, start.elapsed());
                }
                Err(error) => match attempt.next() {
                    Some(next) => {
                        debug!(
                            "{} {} failed ({}), retrying with {}",
                            attempt.http_method(),
                            url,
                            error,
                            next.http_method()
                        );
                        attempt = next;
                    }
                    None => {
                        warn!("Link unreachable {}: {}", url, error);
                        return ProbeResult::transport_failure(
                            url,
                            attempt,
                            &error,
                            start.elapsed(),
                        );
                    }
                },
            }
        }
    }
}
