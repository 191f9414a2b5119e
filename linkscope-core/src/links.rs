// Link facts -> findings

use crate::plan::ProbePlan;
use crate::report::{CategoryReport, Difficulty, Impact, Issue};
use linkscope_scanner::{LinkClass, LinkRecord, LinkRegistry, ProbeResult};

const BROKEN_LINKS_REF: &str = "https://developers.google.com/search/docs/crawling-indexing/http-network-errors";
const CRAWLABLE_LINKS_REF: &str = "https://developers.google.com/search/docs/crawling-indexing/links-crawlable";
const REDIRECTS_REF: &str = "https://developers.google.com/search/docs/crawling-indexing/301-redirects";

fn first_seen(record: &LinkRecord) -> String {
    match record.occurrences.first() {
        Some(occ) if !occ.anchor_text.is_empty() => {
            format!("\"{}\" in {}", occ.anchor_text, occ.location)
        }
        Some(occ) => format!("an anchor without text in {}", occ.location),
        None => "the page".to_string(),
    }
}

fn times(n: usize) -> String {
    if n == 1 {
        "once".to_string()
    } else {
        format!("{} times", n)
    }
}

/// Turn the registry, the probe plan and its results into findings.
///
/// `probes` must be aligned with `plan.targets`.
pub fn evaluate_links(
    registry: &LinkRegistry,
    plan: &ProbePlan,
    probes: &[ProbeResult],
) -> CategoryReport {
    let mut report = CategoryReport::new();

    check_placeholder_links(registry, &mut report);
    check_missing_href(registry, &mut report);
    check_probes(registry, probes, &mut report);
    check_truncation(plan, &mut report);

    let summary = registry.summary();
    if summary.internal > 0 {
        report.success(
            format!("Page links to {} internal URLs", summary.internal),
            Impact::Medium,
        );
    }
    if plan.candidate_count() == 0 {
        report.issue(Issue::info(
            "No internal or external links found on the page",
            "Link to related pages so crawlers and visitors can discover them.",
        )
        .with_reference(CRAWLABLE_LINKS_REF));
    }

    report
}

fn check_placeholder_links(registry: &LinkRegistry, report: &mut CategoryReport) {
    for record in registry.records().iter().filter(|r| r.class.is_problematic()) {
        let what = match record.class {
            LinkClass::Javascript => format!("a javascript: href ({})", record.href.trim()),
            _ => "an empty or placeholder href".to_string(),
        };
        report.issue(
            Issue::warning(
                format!(
                    "Link {} uses {}; found {}",
                    first_seen(record),
                    what,
                    times(record.occurrences.len())
                ),
                "Use a real URL in href, or a <button> for actions that do not navigate.",
            )
            .with_reference(CRAWLABLE_LINKS_REF),
        );
    }
}

fn check_missing_href(registry: &LinkRegistry, report: &mut CategoryReport) {
    let missing = registry.missing_href().len();
    if missing > 0 {
        report.issue(
            Issue::info(
                format!("{} anchor element(s) have no href attribute", missing),
                "Add an href to anchors meant for navigation; crawlers ignore anchors without one.",
            )
            .with_reference(CRAWLABLE_LINKS_REF),
        );
    }
}

fn check_probes(registry: &LinkRegistry, probes: &[ProbeResult], report: &mut CategoryReport) {
    let mut broken = 0;

    for probe in probes {
        let record = registry.get(&probe.url);
        let context = record.map(first_seen).unwrap_or_else(|| "the page".to_string());

        if !probe.succeeded {
            broken += 1;
            let reason = probe
                .error
                .clone()
                .unwrap_or_else(|| format!("HTTP {}", probe.status));
            let impact = match record.map(|r| r.class) {
                Some(LinkClass::Internal) => Impact::High,
                _ => Impact::Medium,
            };
            report.issue(
                Issue::warning(
                    format!("Broken link {} ({}), linked from {}", probe.url, reason, context),
                    "Fix or remove the link, or redirect the target to a working page.",
                )
                .with_impact(impact)
                .with_reference(BROKEN_LINKS_REF),
            );
        } else if probe.has_excessive_redirects() {
            report.issue(
                Issue::warning(
                    format!(
                        "Link {} goes through {} redirects before reaching {}",
                        probe.url, probe.redirect_count, probe.final_url
                    ),
                    "Point the link directly at the final URL.",
                )
                .with_impact(Impact::Low)
                .with_reference(REDIRECTS_REF),
            );
        }
    }

    if !probes.is_empty() && broken == 0 {
        report.success(
            format!("All {} checked links are reachable", probes.len()),
            Impact::High,
        );
    }
}

fn check_truncation(plan: &ProbePlan, report: &mut CategoryReport) {
    if !plan.is_truncated() {
        return;
    }

    report.issue(
        Issue::info(
            format!(
                "Only the first {} of {} links were checked; {} left unchecked: {}",
                plan.targets.len(),
                plan.candidate_count(),
                plan.unchecked.len(),
                plan.unchecked.join(", ")
            ),
            "Check the remaining links with a full site crawl.",
        )
        .with_difficulty(Difficulty::Medium),
    );
}
