// Tests for robots.txt and sitemap findings

use linkscope_core::resources::{evaluate_robots, evaluate_sitemaps};
use linkscope_core::{Impact, Severity};
use linkscope_scanner::{
    DiscoveryReport, RobotsFile, RobotsStatus, SitemapDescriptor, SitemapFormat,
};

fn found(content: &str) -> RobotsStatus {
    RobotsStatus::Found {
        status: 200,
        file: RobotsFile::parse(content),
    }
}

fn sitemap(
    url: &str,
    format: SitemapFormat,
    entries: usize,
    referenced: bool,
) -> SitemapDescriptor {
    SitemapDescriptor {
        url: url.to_string(),
        status: 200,
        format,
        entry_count: entries,
        referenced_in_robots: referenced,
    }
}

fn discovery(
    robots: RobotsStatus,
    sitemaps: Vec<SitemapDescriptor>,
    failed: Vec<&str>,
) -> DiscoveryReport {
    DiscoveryReport {
        origin: "https://example.com".to_string(),
        robots_url: "https://example.com/robots.txt".to_string(),
        robots,
        sitemaps,
        failed_references: failed.into_iter().map(String::from).collect(),
    }
}

// ============================================================================
// robots.txt Tests
// ============================================================================

#[test]
fn test_robots_not_found_is_informational() {
    let report = evaluate_robots(&RobotsStatus::NotFound { status: 404 });
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].severity, Severity::Info);
    assert!(report.issues[0].message.contains("not found"));
    assert!(report.successes.is_empty());
}

#[test]
fn test_robots_inaccessible_is_informational() {
    let report = evaluate_robots(&RobotsStatus::Inaccessible {
        reason: "connection failed: refused".to_string(),
    });
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].severity, Severity::Info);
    assert!(report.issues[0].message.contains("connection failed"));
}

#[test]
fn test_robots_healthy_file() {
    let report = evaluate_robots(&found(
        "User-agent: *\nDisallow: /admin/\nSitemap: https://example.com/sitemap.xml\n",
    ));
    assert!(report.issues.is_empty(), "unexpected: {:?}", report.issues);
    assert_eq!(report.successes.len(), 2);
    assert_eq!(report.successes[0].impact, Impact::Medium);
}

#[test]
fn test_robots_disallow_all_is_an_error() {
    let report = evaluate_robots(&found("User-agent: *\nDisallow: /\n"));
    assert!(report.has_errors());
    assert!(
        report.issues[0]
            .message
            .contains("disallows the whole site for user-agent '*'")
    );
}

#[test]
fn test_robots_malformed_lines_are_warnings() {
    let report = evaluate_robots(&found(
        "User-agent: *\nDisallow: /x\nNoindex /private\nSitemap: https://example.com/s.xml",
    ));
    assert_eq!(report.count(Severity::Warning), 1);
    assert!(report.issues[0].message.contains("line 3"));
    assert!(report.issues[0].message.contains("not a recognized directive"));
}

#[test]
fn test_robots_without_disallow_or_sitemap() {
    let report = evaluate_robots(&found("User-agent: *\nAllow: /\n"));
    let messages: Vec<&str> = report.issues.iter().map(|i| i.message.as_str()).collect();
    assert!(messages.contains(&"robots.txt contains no Disallow rules"));
    assert!(messages.contains(&"robots.txt does not reference a sitemap"));
    assert!(report.issues.iter().all(|i| i.severity == Severity::Info));
}

#[test]
fn test_robots_conflicts_reported() {
    let report = evaluate_robots(&found(
        "User-agent: *\nDisallow: /beta\nUser-agent: Googlebot\nAllow: /beta\n",
    ));
    assert!(
        report
            .issues
            .iter()
            .any(|i| i.severity == Severity::Warning && i.message.contains("/beta for 'Googlebot'"))
    );
}

// ============================================================================
// Sitemap Tests
// ============================================================================

#[test]
fn test_no_sitemap_anywhere_is_informational() {
    let report = evaluate_sitemaps(&discovery(
        RobotsStatus::NotFound { status: 404 },
        vec![],
        vec![],
    ));
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].severity, Severity::Info);
    assert_eq!(report.issues[0].message, "No sitemap found");
}

#[test]
fn test_referenced_sitemap_is_clean() {
    let report = evaluate_sitemaps(&discovery(
        found("User-agent: *\nDisallow: /a\nSitemap: https://example.com/sitemap.xml"),
        vec![sitemap("https://example.com/sitemap.xml", SitemapFormat::XmlUrlset, 10, true)],
        vec![],
    ));
    assert!(report.issues.is_empty());
    assert_eq!(report.successes.len(), 1);
    assert!(report.successes[0].message.contains("xml-urlset, 10 entries"));
}

#[test]
fn test_unreferenced_and_failed_references_are_info() {
    let report = evaluate_sitemaps(&discovery(
        found("User-agent: *\nSitemap: https://example.com/gone.xml"),
        vec![sitemap("https://example.com/sitemap.xml", SitemapFormat::XmlUrlset, 3, false)],
        vec!["https://example.com/gone.xml"],
    ));
    assert_eq!(report.issues.len(), 2);
    assert!(report.issues.iter().all(|i| i.severity == Severity::Info));
    assert!(report.issues[0].message.contains("gone.xml"));
    assert!(report.issues[1].message.contains("not referenced in robots.txt"));
}

#[test]
fn test_oversized_urlset_needs_index() {
    let report = evaluate_sitemaps(&discovery(
        RobotsStatus::NotFound { status: 404 },
        vec![sitemap("https://example.com/sitemap.xml", SitemapFormat::XmlUrlset, 50_001, false)],
        vec![],
    ));
    assert!(
        report
            .issues
            .iter()
            .any(|i| i.severity == Severity::Warning && i.message.contains("50001 URLs"))
    );
}

#[test]
fn test_unknown_format_still_counts_as_found() {
    let report = evaluate_sitemaps(&discovery(
        RobotsStatus::NotFound { status: 404 },
        vec![sitemap("https://example.com/sitemap.xml", SitemapFormat::Unknown, 0, false)],
        vec![],
    ));
    assert_eq!(report.successes.len(), 1);
    assert!(report.issues.iter().any(|i| i.message.contains("not a recognized sitemap format")));
    assert!(!report.issues.iter().any(|i| i.message == "No sitemap found"));
}
