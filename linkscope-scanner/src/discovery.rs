// robots.txt and sitemap discovery for a site origin

use crate::fetch::Fetcher;
use crate::normalize::{normalize, origin};
use crate::robots::RobotsFile;
use crate::sitemap::{SitemapDescriptor, WELL_KNOWN_PATHS, sniff};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RobotsStatus {
    Found { status: u16, file: RobotsFile },
    /// The server answered 4xx: there is no file.
    NotFound { status: u16 },
    /// 5xx or a transport failure.
    Inaccessible { reason: String },
}

impl RobotsStatus {
    pub fn file(&self) -> Option<&RobotsFile> {
        match self {
            RobotsStatus::Found { file, .. } => Some(file),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub origin: String,
    pub robots_url: String,
    pub robots: RobotsStatus,
    /// Candidates that answered below 400, in candidate order.
    pub sitemaps: Vec<SitemapDescriptor>,
    /// Sitemaps named in robots.txt that could not be fetched.
    pub failed_references: Vec<String>,
}

impl DiscoveryReport {
    pub fn unreferenced_sitemaps(&self) -> impl Iterator<Item = &SitemapDescriptor> {
        self.sitemaps.iter().filter(|s| !s.referenced_in_robots)
    }
}

/// robots.txt references first, then the well-known paths, without duplicates.
pub fn sitemap_candidates(references: &[String], page_url: &Url) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    let well_known = WELL_KNOWN_PATHS.iter().map(|p| normalize(p, page_url));

    for candidate in references.iter().cloned().chain(well_known) {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }
    candidates
}

pub struct Discoverer {
    fetcher: Fetcher,
}

impl Discoverer {
    pub fn new(fetcher: Fetcher) -> Self {
        Self { fetcher }
    }

    pub async fn discover(&self, page_url: &Url) -> DiscoveryReport {
        let site_origin = origin(page_url);
        let robots_url = normalize("/robots.txt", page_url);
        info!("Discovering crawl resources for {}", site_origin);

        let robots = self.fetch_robots(&robots_url).await;

        let references: Vec<String> = robots
            .file()
            .map(|file| file.sitemaps.iter().map(|s| normalize(s, page_url)).collect())
            .unwrap_or_default();
        let candidates = sitemap_candidates(&references, page_url);
        debug!("Checking {} sitemap candidates", candidates.len());

        let fetched = join_all(candidates.iter().map(|c| self.fetch_sitemap(c))).await;

        let mut sitemaps = Vec::new();
        let mut failed_references = Vec::new();
        for (candidate, result) in candidates.into_iter().zip(fetched) {
            let referenced = references.contains(&candidate);
            match result {
                Some(mut descriptor) => {
                    descriptor.referenced_in_robots = referenced;
                    sitemaps.push(descriptor);
                }
                None if referenced => {
                    warn!("Sitemap listed in robots.txt is unavailable: {}", candidate);
                    failed_references.push(candidate);
                }
                None => {}
            }
        }

        info!(
            "Discovery complete. {} sitemaps found, {} referenced sitemaps failed",
            sitemaps.len(),
            failed_references.len()
        );

        DiscoveryReport {
            origin: site_origin,
            robots_url,
            robots,
            sitemaps,
            failed_references,
        }
    }

    pub async fn fetch_robots(&self, url: &str) -> RobotsStatus {
        match self.fetcher.get_text(url).await {
            Ok(outcome) if (400..500).contains(&outcome.status) => {
                debug!("No robots.txt at {} ({})", url, outcome.status);
                RobotsStatus::NotFound {
                    status: outcome.status,
                }
            }
            Ok(outcome) if outcome.status >= 300 => {
                warn!("robots.txt at {} answered {}", url, outcome.status);
                RobotsStatus::Inaccessible {
                    reason: format!("HTTP {}", outcome.status),
                }
            }
            Ok(outcome) => {
                let body = outcome.body.unwrap_or_default();
                RobotsStatus::Found {
                    status: outcome.status,
                    file: RobotsFile::parse(&body),
                }
            }
            Err(e) => {
                warn!("robots.txt at {} is inaccessible: {}", url, e);
                RobotsStatus::Inaccessible {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// `None` for anything that is not a usable answer; a missing sitemap at a
    /// guessed location is not an error.
    pub async fn fetch_sitemap(&self, url: &str) -> Option<SitemapDescriptor> {
        let outcome = match self.fetcher.get_text(url).await {
            Ok(outcome) if outcome.status < 400 => outcome,
            Ok(outcome) => {
                debug!("Sitemap candidate {} answered {}", url, outcome.status);
                return None;
            }
            Err(e) => {
                debug!("Sitemap candidate {} failed: {}", url, e);
                return None;
            }
        };

        let (format, entry_count) = sniff(outcome.body.as_deref().unwrap_or_default());
        debug!("Sitemap {} is {} with {} entries", url, format.as_str(), entry_count);

        Some(SitemapDescriptor {
            url: url.to_string(),
            status: outcome.status,
            format,
            entry_count,
            referenced_in_robots: false,
        })
    }
}
