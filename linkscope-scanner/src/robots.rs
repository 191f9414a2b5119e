// robots.txt grammar and the policy facts derived from it

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Files above this size are truncated by major crawlers.
pub const MAX_ROBOTS_SIZE: usize = 50_000;

/// Agents whose full-site block is worth calling out.
pub const MAJOR_BOTS: &[&str] = &[
    "*",
    "googlebot",
    "bingbot",
    "slurp",
    "duckduckbot",
    "baiduspider",
    "yandexbot",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub user_agent: String,
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crawl_delay: Option<f64>,
}

impl RuleGroup {
    fn new(user_agent: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            ..Self::default()
        }
    }

    pub fn is_wildcard(&self) -> bool {
        self.user_agent == "*"
    }

    pub fn blocks_everything(&self) -> bool {
        self.disallow.iter().any(|p| p == "/")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedReason {
    /// Not one of the recognized `key: value` directives.
    Unrecognized,
    /// A rule line before any `User-agent` line.
    OutsideGroup,
    /// A recognized key whose value cannot be used.
    InvalidValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MalformedLine {
    /// 1-based.
    pub line_number: usize,
    pub content: String,
    pub reason: MalformedReason,
}

/// A path an agent-specific group and the wildcard group disagree on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConflict {
    pub user_agent: String,
    pub path: String,
    /// `true` if the agent-specific group allows what the wildcard disallows.
    pub agent_allows: bool,
}

/// Evaluated facts about a parsed file. No severity is attached here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotsPolicy {
    pub blocked_agents: Vec<String>,
    pub has_disallow_rules: bool,
    pub conflicts: Vec<RuleConflict>,
    pub oversized: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotsFile {
    pub groups: Vec<RuleGroup>,
    pub sitemaps: Vec<String>,
    pub malformed: Vec<MalformedLine>,
    pub size_bytes: usize,
}

enum Directive<'a> {
    UserAgent(&'a str),
    Allow(&'a str),
    Disallow(&'a str),
    CrawlDelay(&'a str),
    Sitemap(&'a str),
}

fn parse_directive(line: &str) -> Option<Directive<'_>> {
    let (key, value) = line.split_once(':')?;
    let value = value.trim();
    match key.trim().to_ascii_lowercase().as_str() {
        "user-agent" => Some(Directive::UserAgent(value)),
        "allow" => Some(Directive::Allow(value)),
        "disallow" => Some(Directive::Disallow(value)),
        "crawl-delay" => Some(Directive::CrawlDelay(value)),
        "sitemap" => Some(Directive::Sitemap(value)),
        _ => None,
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

impl RobotsFile {
    /// Parse robots.txt content. Never fails; unusable lines end up in
    /// [`RobotsFile::malformed`].
    pub fn parse(content: &str) -> Self {
        let mut file = RobotsFile {
            size_bytes: content.len(),
            ..Self::default()
        };

        for (idx, raw) in content.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }

            let mut malformed = |reason| {
                file.malformed.push(MalformedLine {
                    line_number: idx + 1,
                    content: raw.trim().to_string(),
                    reason,
                })
            };

            let Some(directive) = parse_directive(line) else {
                malformed(MalformedReason::Unrecognized);
                continue;
            };

            match directive {
                Directive::UserAgent(agent) if agent.is_empty() => {
                    malformed(MalformedReason::InvalidValue);
                }
                Directive::UserAgent(agent) => file.groups.push(RuleGroup::new(agent)),
                Directive::Sitemap(url) if url.is_empty() => {
                    malformed(MalformedReason::InvalidValue);
                }
                Directive::Sitemap(url) => file.sitemaps.push(url.to_string()),
                Directive::Allow(path) => match file.groups.last_mut() {
                    Some(group) if !path.is_empty() => group.allow.push(path.to_string()),
                    Some(_) => {}
                    None => malformed(MalformedReason::OutsideGroup),
                },
                Directive::Disallow(path) => match file.groups.last_mut() {
                    Some(group) if !path.is_empty() => group.disallow.push(path.to_string()),
                    Some(_) => {}
                    None => malformed(MalformedReason::OutsideGroup),
                },
                Directive::CrawlDelay(value) => match file.groups.last_mut() {
                    Some(group) => match value.parse::<f64>() {
                        Ok(delay) if delay >= 0.0 && delay.is_finite() => {
                            group.crawl_delay = Some(delay)
                        }
                        _ => malformed(MalformedReason::InvalidValue),
                    },
                    None => malformed(MalformedReason::OutsideGroup),
                },
            }
        }

        file
    }

    pub fn groups_for<'a>(&'a self, agent: &'a str) -> impl Iterator<Item = &'a RuleGroup> {
        self.groups
            .iter()
            .filter(move |g| g.user_agent.eq_ignore_ascii_case(agent))
    }

    pub fn disallow_count(&self) -> usize {
        self.groups.iter().map(|g| g.disallow.len()).sum()
    }

    pub fn policy(&self) -> RobotsPolicy {
        let mut blocked_agents: Vec<String> = Vec::new();
        for group in self.groups.iter().filter(|g| g.blocks_everything()) {
            let agent = group.user_agent.to_ascii_lowercase();
            if MAJOR_BOTS.contains(&agent.as_str()) && !blocked_agents.contains(&group.user_agent) {
                blocked_agents.push(group.user_agent.clone());
            }
        }

        RobotsPolicy {
            blocked_agents,
            has_disallow_rules: self.disallow_count() > 0,
            conflicts: self.conflicts(),
            oversized: self.size_bytes > MAX_ROBOTS_SIZE,
        }
    }

    fn conflicts(&self) -> Vec<RuleConflict> {
        let wildcard_allow: HashSet<&str> = self
            .groups
            .iter()
            .filter(|g| g.is_wildcard())
            .flat_map(|g| g.allow.iter().map(String::as_str))
            .collect();
        let wildcard_disallow: HashSet<&str> = self
            .groups
            .iter()
            .filter(|g| g.is_wildcard())
            .flat_map(|g| g.disallow.iter().map(String::as_str))
            .collect();

        let mut conflicts = Vec::new();
        for group in self.groups.iter().filter(|g| !g.is_wildcard()) {
            for path in &group.allow {
                if wildcard_disallow.contains(path.as_str()) {
                    conflicts.push(RuleConflict {
                        user_agent: group.user_agent.clone(),
                        path: path.clone(),
                        agent_allows: true,
                    });
                }
            }
            for path in &group.disallow {
                if wildcard_allow.contains(path.as_str()) {
                    conflicts.push(RuleConflict {
                        user_agent: group.user_agent.clone(),
                        path: path.clone(),
                        agent_allows: false,
                    });
                }
            }
        }
        conflicts
    }
}
