// Structural sniffing of sitemap bodies

use serde::{Deserialize, Serialize};
use url::Url;

/// A single `<urlset>` above this many entries should be split behind an index.
pub const MAX_URLSET_ENTRIES: usize = 50_000;

/// Conventional locations probed when robots.txt does not name a sitemap.
pub const WELL_KNOWN_PATHS: &[&str] = &[
    "/sitemap.xml",
    "/sitemap_index.xml",
    "/sitemap-index.xml",
    "/sitemaps/sitemap.xml",
    "/sitemap/sitemap.xml",
];

const SITEMAPS_NAMESPACE: &str = "sitemaps.org/schemas/sitemap";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SitemapFormat {
    XmlUrlset,
    SitemapIndex,
    Text,
    RssAtom,
    Unknown,
}

impl SitemapFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SitemapFormat::XmlUrlset => "xml-urlset",
            SitemapFormat::SitemapIndex => "sitemap-index",
            SitemapFormat::Text => "text",
            SitemapFormat::RssAtom => "rss-atom",
            SitemapFormat::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitemapDescriptor {
    pub url: String,
    pub status: u16,
    pub format: SitemapFormat,
    pub entry_count: usize,
    pub referenced_in_robots: bool,
}

impl SitemapDescriptor {
    pub fn needs_index(&self) -> bool {
        self.format == SitemapFormat::XmlUrlset && self.entry_count > MAX_URLSET_ENTRIES
    }
}

struct Signature {
    format: SitemapFormat,
    matches: fn(&str) -> bool,
    count: fn(&str) -> usize,
}

// Checked in order; the first match decides. `Unknown` is the fall-through.
const SIGNATURES: &[Signature] = &[
    Signature {
        format: SitemapFormat::XmlUrlset,
        matches: |body| {
            body.contains("<urlset")
                || (body.contains(SITEMAPS_NAMESPACE) && !body.contains("<sitemapindex"))
        },
        count: |body| body.matches("<url>").count(),
    },
    Signature {
        format: SitemapFormat::SitemapIndex,
        matches: |body| body.contains("<sitemapindex") || body.contains("<sitemap>"),
        count: |body| body.matches("<sitemap>").count(),
    },
    Signature {
        format: SitemapFormat::Text,
        matches: |body| {
            let mut lines = non_blank_lines(body).peekable();
            lines.peek().is_some() && lines.all(is_absolute_url)
        },
        count: |body| non_blank_lines(body).filter(|l| is_absolute_url(l)).count(),
    },
    Signature {
        format: SitemapFormat::RssAtom,
        matches: |body| body.contains("<rss") || body.contains("<feed"),
        count: |body| body.matches("<item>").count() + body.matches("<entry>").count(),
    },
];

fn non_blank_lines(body: &str) -> impl Iterator<Item = &str> {
    body.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn is_absolute_url(line: &str) -> bool {
    !line.contains(char::is_whitespace)
        && Url::parse(line)
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false)
}

/// Identify a sitemap body by its structure and count its entries.
pub fn sniff(body: &str) -> (SitemapFormat, usize) {
    SIGNATURES
        .iter()
        .find(|sig| (sig.matches)(body))
        .map(|sig| (sig.format, (sig.count)(body)))
        .unwrap_or((SitemapFormat::Unknown, 0))
}
