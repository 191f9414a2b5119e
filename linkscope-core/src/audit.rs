// Per-request audit orchestration: extract -> (probe || discover) -> evaluate

use crate::config::AuditOptions;
use crate::error::{AuditError, Result};
use crate::links::evaluate_links;
use crate::plan::ProbePlan;
use crate::report::CategoryReport;
use crate::resources::{evaluate_robots, evaluate_sitemaps};
use linkscope_scanner::extract::LinkSummary;
use linkscope_scanner::{
    Discoverer, DiscoveryReport, Fetcher, LinkExtractor, LinkRegistry, ProbeResult, Prober,
};
use scraper::Html;
use serde::Serialize;
use tracing::info;
use url::Url;

#[derive(Debug, Clone, Serialize)]
pub struct LinkAudit {
    pub summary: LinkSummary,
    pub registry: LinkRegistry,
    pub plan: ProbePlan,
    /// Aligned with `plan.targets`.
    pub probes: Vec<ProbeResult>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub page_url: String,
    pub links: LinkAudit,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<DiscoveryReport>,
    pub link_findings: CategoryReport,
    pub robots_findings: CategoryReport,
    pub sitemap_findings: CategoryReport,
}

impl AuditReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The page URL everything is resolved against. The only input whose failure
/// aborts an audit.
pub fn parse_base_url(page_url: &str) -> Result<Url> {
    let url = Url::parse(page_url.trim())
        .map_err(|e| AuditError::InvalidBaseUrl(format!("{}: {}", page_url, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AuditError::InvalidBaseUrl(format!(
            "{}: not an http(s) URL with a host",
            page_url
        )));
    }
    Ok(url)
}

/// Build the registry for an already parsed document.
pub fn links_from_document(page_url: &Url, document: &Html) -> Result<LinkRegistry> {
    Ok(LinkExtractor::new(page_url.clone())?.extract(document))
}

/// Stateless per-request auditor; holds nothing but its options and client.
pub struct Auditor {
    options: AuditOptions,
    fetcher: Fetcher,
}

impl Auditor {
    pub fn new(options: AuditOptions) -> Result<Self> {
        let fetcher = options.fetcher()?;
        Ok(Self { options, fetcher })
    }

    pub fn options(&self) -> &AuditOptions {
        &self.options
    }

    /// Fetch `page_url` and audit what it returns. Redirects are followed and
    /// the final URL becomes the base for link resolution.
    pub async fn audit_page(&self, page_url: &str) -> Result<AuditReport> {
        let requested = parse_base_url(page_url)?;
        info!("Fetching page {}", requested);

        let outcome = self
            .fetcher
            .get_text(requested.as_str())
            .await
            .map_err(|e| AuditError::PageFetch {
                url: requested.to_string(),
                reason: e.to_string(),
            })?;

        if outcome.status >= 400 {
            return Err(AuditError::PageFetch {
                url: requested.to_string(),
                reason: format!("HTTP {}", outcome.status),
            });
        }

        let html = outcome.body.unwrap_or_default();
        self.audit_html(&outcome.final_url, &html).await
    }

    pub async fn audit_html(&self, page_url: &str, html: &str) -> Result<AuditReport> {
        let page_url = parse_base_url(page_url)?;
        let registry = LinkExtractor::new(page_url.clone())?.extract_html(html);
        Ok(self.audit_registry(page_url, registry).await)
    }

    /// Probe and discover for an already built registry. Never fails: every
    /// fetch problem ends up as a field of the report.
    pub async fn audit_registry(&self, page_url: Url, registry: LinkRegistry) -> AuditReport {
        let plan = ProbePlan::select(&registry, self.options.probe_cap, self.options.probe_order);
        if plan.is_truncated() {
            info!(
                "Probing {} of {} links, {} left unchecked",
                plan.targets.len(),
                plan.candidate_count(),
                plan.unchecked.len()
            );
        }

        let prober = Prober::new(self.fetcher.clone());
        let discoverer = Discoverer::new(self.fetcher.clone());
        let discover = self.options.discover_resources;

        let (probes, discovery) = tokio::join!(prober.probe_all(&plan.targets), async {
            if discover {
                Some(discoverer.discover(&page_url).await)
            } else {
                None
            }
        });

        let link_findings = evaluate_links(&registry, &plan, &probes);
        let (robots_findings, sitemap_findings) = match &discovery {
            Some(discovery) => (
                evaluate_robots(&discovery.robots),
                evaluate_sitemaps(discovery),
            ),
            None => (CategoryReport::default(), CategoryReport::default()),
        };

        info!(
            "Audit of {} complete: {} link issues, {} robots issues, {} sitemap issues",
            page_url,
            link_findings.issues.len(),
            robots_findings.issues.len(),
            sitemap_findings.issues.len()
        );

        AuditReport {
            page_url: page_url.to_string(),
            links: LinkAudit {
                summary: registry.summary(),
                registry,
                plan,
                probes,
            },
            discovery,
            link_findings,
            robots_findings,
            sitemap_findings,
        }
    }
}

/// Fetch and audit a page with the given options.
pub async fn audit_page(page_url: &str, options: AuditOptions) -> Result<AuditReport> {
    Auditor::new(options)?.audit_page(page_url).await
}

/// Audit markup that was fetched elsewhere.
pub async fn audit_html(page_url: &str, html: &str, options: AuditOptions) -> Result<AuditReport> {
    Auditor::new(options)?.audit_html(page_url, html).await
}
