// robots.txt and sitemap facts -> findings

use crate::report::{CategoryReport, Difficulty, Impact, Issue};
use linkscope_scanner::robots::{MAX_ROBOTS_SIZE, MalformedReason};
use linkscope_scanner::sitemap::{MAX_URLSET_ENTRIES, SitemapFormat};
use linkscope_scanner::{DiscoveryReport, RobotsStatus};

const ROBOTS_REF: &str = "https://developers.google.com/search/docs/crawling-indexing/robots/intro";
const SITEMAP_REF: &str = "https://www.sitemaps.org/protocol.html";
const SITEMAP_INDEX_REF: &str = "https://developers.google.com/search/docs/crawling-indexing/sitemaps/large-sitemaps";

pub fn evaluate_robots(robots: &RobotsStatus) -> CategoryReport {
    let mut report = CategoryReport::new();

    let file = match robots {
        RobotsStatus::NotFound { status } => {
            report.issue(
                Issue::info(
                    format!("robots.txt not found (HTTP {})", status),
                    "Add a robots.txt at the site root, even a permissive one that lists your sitemap.",
                )
                .with_reference(ROBOTS_REF),
            );
            return report;
        }
        RobotsStatus::Inaccessible { reason } => {
            report.issue(
                Issue::info(
                    format!("robots.txt could not be retrieved: {}", reason),
                    "Make sure robots.txt is served with a 200 status; crawlers may back off on server errors.",
                )
                .with_reference(ROBOTS_REF),
            );
            return report;
        }
        RobotsStatus::Found { file, .. } => file,
    };

    report.success(
        format!("robots.txt found with {} rule group(s)", file.groups.len()),
        Impact::Medium,
    );

    for line in &file.malformed {
        let why = match line.reason {
            MalformedReason::Unrecognized => "is not a recognized directive",
            MalformedReason::OutsideGroup => "appears before any User-agent line",
            MalformedReason::InvalidValue => "has an invalid value",
        };
        report.issue(
            Issue::warning(
                format!("robots.txt line {} ({}) {}", line.line_number, line.content, why),
                "Fix or remove the line; crawlers ignore directives they cannot parse.",
            )
            .with_impact(Impact::Low)
            .with_reference(ROBOTS_REF),
        );
    }

    let policy = file.policy();
    for agent in &policy.blocked_agents {
        report.issue(
            Issue::error(
                format!("robots.txt disallows the whole site for user-agent '{}'", agent),
                "Remove 'Disallow: /' unless the site should be kept out of search results.",
            )
            .with_reference(ROBOTS_REF),
        );
    }

    if !policy.has_disallow_rules {
        report.issue(Issue::info(
            "robots.txt contains no Disallow rules",
            "Consider disallowing admin, search and other low-value paths.",
        ));
    }

    for conflict in &policy.conflicts {
        let (agent_rule, wildcard_rule) = if conflict.agent_allows {
            ("allows", "disallows")
        } else {
            ("disallows", "allows")
        };
        report.issue(
            Issue::warning(
                format!(
                    "robots.txt {} {} for '{}' but the wildcard group {} it",
                    agent_rule, conflict.path, conflict.user_agent, wildcard_rule
                ),
                "Make agent-specific and wildcard rules agree, or document why they differ.",
            )
            .with_difficulty(Difficulty::Medium),
        );
    }

    if policy.oversized {
        report.issue(
            Issue::warning(
                format!(
                    "robots.txt is {} bytes, over the {} byte limit crawlers read",
                    file.size_bytes, MAX_ROBOTS_SIZE
                ),
                "Consolidate rules with wildcards so the file stays small.",
            )
            .with_difficulty(Difficulty::Medium)
            .with_reference(ROBOTS_REF),
        );
    }

    if file.sitemaps.is_empty() {
        report.issue(Issue::info(
            "robots.txt does not reference a sitemap",
            "Add a 'Sitemap:' line with the absolute URL of your sitemap.",
        ));
    } else {
        report.success(
            format!("robots.txt references {} sitemap(s)", file.sitemaps.len()),
            Impact::Low,
        );
    }

    report
}

pub fn evaluate_sitemaps(discovery: &DiscoveryReport) -> CategoryReport {
    let mut report = CategoryReport::new();

    for failed in &discovery.failed_references {
        report.issue(
            Issue::info(
                format!("Sitemap listed in robots.txt could not be fetched: {}", failed),
                "Fix the Sitemap: URL in robots.txt or publish the sitemap at that location.",
            )
            .with_reference(SITEMAP_REF),
        );
    }

    if discovery.sitemaps.is_empty() {
        report.issue(
            Issue::info(
                "No sitemap found",
                "Publish a sitemap.xml and reference it from robots.txt.",
            )
            .with_reference(SITEMAP_REF),
        );
        return report;
    }

    for sitemap in &discovery.sitemaps {
        report.success(
            format!(
                "Sitemap found at {} ({}, {} entries)",
                sitemap.url,
                sitemap.format.as_str(),
                sitemap.entry_count
            ),
            Impact::Medium,
        );

        if sitemap.format == SitemapFormat::Unknown {
            report.issue(
                Issue::info(
                    format!("Content at {} is not a recognized sitemap format", sitemap.url),
                    "Serve an XML urlset, a sitemap index, a plain-text URL list or an RSS/Atom feed.",
                )
                .with_reference(SITEMAP_REF),
            );
        } else if sitemap.entry_count == 0 {
            report.issue(Issue::info(
                format!("Sitemap {} contains no entries", sitemap.url),
                "List the site's canonical URLs in the sitemap.",
            ));
        }

        if sitemap.needs_index() {
            report.issue(
                Issue::warning(
                    format!(
                        "Sitemap {} has {} URLs, over the {} per-file limit",
                        sitemap.url, sitemap.entry_count, MAX_URLSET_ENTRIES
                    ),
                    "Split it into several sitemaps behind a sitemap index.",
                )
                .with_difficulty(Difficulty::Medium)
                .with_reference(SITEMAP_INDEX_REF),
            );
        }

        if !sitemap.referenced_in_robots {
            report.issue(Issue::info(
                format!("Sitemap {} is not referenced in robots.txt", sitemap.url),
                "Add a 'Sitemap:' line for it to robots.txt.",
            ));
        }
    }

    report
}
