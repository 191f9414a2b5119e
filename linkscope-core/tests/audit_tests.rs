// End-to-end tests for page audits against a mock site

use linkscope_core::{AuditError, AuditOptions, Auditor, ProbeOrder, Severity, audit_html};
use linkscope_scanner::{LinkClass, ProbeMethod, RobotsStatus, SitemapFormat};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, path_regex},
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

const URLSET: &str = r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>a</loc></url><url><loc>b</loc></url></urlset>"#;

async fn mount_ok_links(mock_server: &MockServer) {
    Mock::given(method("HEAD"))
        .and(path_regex(r"^/page\d+$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(mock_server)
        .await;
}

// ============================================================================
// Link Probing Tests
// ============================================================================

#[tokio::test]
async fn test_cap_limits_probing_and_reports_unchecked() -> anyhow::Result<()> {
    init_tracing();
    let mock_server = MockServer::start().await;
    mount_ok_links(&mock_server).await;

    let html: String = (0..25)
        .map(|i| format!(r#"<a href="/page{}">Page {}</a>"#, i, i))
        .collect();
    let options = AuditOptions::default().with_discovery(false);
    let report = audit_html(&mock_server.uri(), &html, options).await?;

    assert_eq!(report.links.summary.internal, 25);
    assert_eq!(report.links.plan.targets.len(), 20);
    assert_eq!(report.links.probes.len(), 20);
    assert_eq!(report.links.plan.unchecked.len(), 5);
    for (probe, target) in report.links.probes.iter().zip(&report.links.plan.targets) {
        assert_eq!(&probe.url, target);
        assert!(probe.succeeded);
    }

    let notice = report
        .link_findings
        .issues
        .iter()
        .find(|i| i.message.contains("left unchecked"))
        .expect("caller must be told about unchecked links");
    for unchecked in &report.links.plan.unchecked {
        assert!(notice.message.contains(unchecked.as_str()));
    }
    assert!(report.discovery.is_none());
    Ok(())
}

#[tokio::test]
async fn test_mixed_page_classifies_and_probes_only_http_links() -> anyhow::Result<()> {
    init_tracing();
    let mock_server = MockServer::start().await;
    mount_ok_links(&mock_server).await;
    Mock::given(method("HEAD"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/hop"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/hop2"))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/hop2"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/page1"))
        .mount(&mock_server)
        .await;

    let html = r##"<html><body>
        <nav><ul><li><a href="/page1">Home</a></li><li><a href="/page1#top">Home again</a></li></ul></nav>
        <a href="javascript:void(0)">Open menu</a>
        <a href="#section">Jump</a>
        <a href="mailto:team@example.com">Mail</a>
        <a href="/broken">Old docs</a>
        <a href="/hop">Moved</a>
        <a name="anchor-only">No href</a>
    </body></html>"##;

    let report = Auditor::new(AuditOptions::default().with_discovery(false))?
        .audit_html(&format!("{}/index.html", mock_server.uri()), html)
        .await?;

    let summary = &report.links.summary;
    assert_eq!(summary.internal, 3);
    assert_eq!(summary.javascript, 1);
    assert_eq!(summary.anchor, 1);
    assert_eq!(summary.mailto, 1);
    assert_eq!(summary.missing_href, 1);
    assert_eq!(summary.total_anchors, 8);

    let js = report.links.registry.get("javascript:void(0)").unwrap();
    assert_eq!(js.class, LinkClass::Javascript);
    assert!(!report.links.plan.targets.iter().any(|t| t.starts_with("javascript:")));
    assert_eq!(report.links.probes.len(), 3);

    let broken = &report.links.probes[1];
    assert_eq!(broken.status, 404);
    assert!(!broken.succeeded);
    assert_eq!(broken.method, ProbeMethod::Optimistic);

    let hop = &report.links.probes[2];
    assert!(hop.succeeded);
    assert_eq!(hop.redirect_count, 2);
    assert_eq!(hop.final_url, format!("{}/page1", mock_server.uri()));

    let findings = &report.link_findings;
    let js_findings = findings
        .issues
        .iter()
        .filter(|i| i.message.contains("javascript:"))
        .count();
    assert_eq!(js_findings, 1);
    assert!(findings.issues.iter().any(|i| {
        i.message.contains("Broken link")
            && i.message.contains("/broken")
            && i.message.contains("404")
    }));
    assert!(findings.issues.iter().any(|i| i.message.contains("2 redirects")));
    Ok(())
}

#[tokio::test]
async fn test_internal_first_ordering() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    mount_ok_links(&mock_server).await;

    let html = r#"<a href="https://external.example/ext">Ext</a><a href="/page1">One</a><a href="/page2">Two</a>"#;
    let options = AuditOptions::default()
        .with_discovery(false)
        .with_probe_cap(2)
        .with_probe_order(ProbeOrder::InternalFirst);
    let report = audit_html(&mock_server.uri(), html, options).await?;

    assert_eq!(
        report.links.plan.targets,
        vec![
            format!("{}/page1", mock_server.uri()),
            format!("{}/page2", mock_server.uri())
        ]
    );
    assert_eq!(report.links.plan.unchecked, vec!["https://external.example/ext"]);
    Ok(())
}

#[tokio::test]
async fn test_non_http_schemes_skip_probing_and_cap() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    mount_ok_links(&mock_server).await;

    let html = r#"<a href="sms:+15551234">Text us</a>
        <a href="ftp://files.example.org/a.zip">Download</a>
        <a href="whatsapp://send?text=hi">Share</a>
        <a href="/page1">One</a>"#;
    let options = AuditOptions::default()
        .with_discovery(false)
        .with_probe_cap(1);
    let report = audit_html(&mock_server.uri(), html, options).await?;

    assert_eq!(
        report.links.plan.targets,
        vec![format!("{}/page1", mock_server.uri())]
    );
    assert!(report.links.plan.unchecked.is_empty());
    assert_eq!(report.links.summary.other, 3);
    assert!(report.links.probes.iter().all(|p| p.succeeded));
    assert!(
        !report
            .link_findings
            .issues
            .iter()
            .any(|i| i.message.contains("Broken link"))
    );
    assert_eq!(
        report.links.registry.get("sms:+15551234").map(|r| r.class),
        Some(LinkClass::Other)
    );
    Ok(())
}

// ============================================================================
// Discovery Tests
// ============================================================================

#[tokio::test]
async fn test_robots_404_reported_and_sitemap_found_via_well_known_path() -> anyhow::Result<()> {
    init_tracing();
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(URLSET))
        .mount(&mock_server)
        .await;

    let report =
        audit_html(&mock_server.uri(), "<p>No links</p>", AuditOptions::default()).await?;

    let discovery = report.discovery.as_ref().expect("discovery enabled");
    assert_eq!(discovery.robots, RobotsStatus::NotFound { status: 404 });
    assert_eq!(discovery.sitemaps.len(), 1);
    assert_eq!(discovery.sitemaps[0].format, SitemapFormat::XmlUrlset);
    assert_eq!(discovery.sitemaps[0].entry_count, 2);

    assert_eq!(report.robots_findings.issues.len(), 1);
    assert_eq!(report.robots_findings.issues[0].severity, Severity::Info);
    assert!(report.robots_findings.issues[0].message.contains("not found"));
    assert!(!report.sitemap_findings.has_errors());
    assert!(!report.sitemap_findings.successes.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_robots_rules_and_sitemap_references() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    let robots = format!(
        "User-agent: *\nDisallow: /admin/\nSitemap: {}/sitemap.xml\n",
        mock_server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(robots))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(URLSET))
        .mount(&mock_server)
        .await;

    let report = audit_html(&mock_server.uri(), "", AuditOptions::default()).await?;

    let discovery = report.discovery.as_ref().unwrap();
    let file = discovery.robots.file().unwrap();
    assert_eq!(file.groups.len(), 1);
    assert_eq!(file.groups[0].user_agent, "*");
    assert_eq!(file.groups[0].disallow, vec!["/admin/"]);
    assert!(file.groups[0].allow.is_empty());
    assert_eq!(file.sitemaps, vec![format!("{}/sitemap.xml", mock_server.uri())]);

    assert!(discovery.sitemaps[0].referenced_in_robots);
    assert!(report.robots_findings.issues.is_empty());
    assert!(report.sitemap_findings.issues.is_empty());
    Ok(())
}

// ============================================================================
// Page Fetch and Error Tests
// ============================================================================

#[tokio::test]
async fn test_audit_page_fetches_and_resolves_against_final_url() -> anyhow::Result<()> {
    let mock_server = MockServer::start().await;
    mount_ok_links(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/docs/"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(r#"<a href="../page3">Three</a>"#),
        )
        .mount(&mock_server)
        .await;

    let auditor = Auditor::new(AuditOptions::default().with_discovery(false))?;
    let report = auditor
        .audit_page(&format!("{}/start", mock_server.uri()))
        .await?;

    assert_eq!(report.page_url, format!("{}/docs/", mock_server.uri()));
    assert_eq!(
        report.links.plan.targets,
        vec![format!("{}/page3", mock_server.uri())]
    );
    assert!(report.links.probes[0].succeeded);

    let json = report.to_json()?;
    assert!(json.contains("\"link_findings\""));
    assert!(!json.contains("\"discovery\""));
    Ok(())
}

#[tokio::test]
async fn test_audit_page_error_status_aborts() {
    let mock_server = MockServer::start().await;
    let result = Auditor::new(AuditOptions::default())
        .unwrap()
        .audit_page(&format!("{}/nope", mock_server.uri()))
        .await;

    match result {
        Err(AuditError::PageFetch { reason, .. }) => assert_eq!(reason, "HTTP 404"),
        other => panic!("expected PageFetch error, got {:?}", other.map(|r| r.page_url)),
    }
}

#[tokio::test]
async fn test_invalid_base_url_is_the_only_abort() {
    let result = audit_html("not a url", r#"<a href="/x">X</a>"#, AuditOptions::default()).await;
    assert!(matches!(result, Err(AuditError::InvalidBaseUrl(_))));
}

#[tokio::test]
async fn test_unreachable_everything_still_yields_full_report() -> anyhow::Result<()> {
    let html = r#"<a href="/a">A</a><a href="/b">B</a>"#;
    let options = AuditOptions::default().with_timeout(1);
    let report = audit_html("http://127.0.0.1:1/", html, options).await?;

    assert_eq!(report.links.probes.len(), 2);
    for probe in &report.links.probes {
        assert_eq!(probe.status, 0);
        assert!(!probe.succeeded);
        assert!(probe.error.as_deref().is_some_and(|e| !e.is_empty()));
    }
    assert_eq!(report.link_findings.count(Severity::Warning), 2);

    let discovery = report.discovery.as_ref().unwrap();
    assert!(matches!(discovery.robots, RobotsStatus::Inaccessible { .. }));
    assert!(discovery.sitemaps.is_empty());
    assert_eq!(report.sitemap_findings.issues[0].message, "No sitemap found");
    Ok(())
}
