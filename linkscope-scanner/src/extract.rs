// Hyperlink extraction, classification and deduplication

use crate::error::{Result, ScanError};
use crate::normalize::{is_http, is_same_site, normalize};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};
use url::Url;

/// What kind of target an href points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkClass {
    Internal,
    External,
    Anchor,
    Mailto,
    Tel,
    Javascript,
    Data,
    Empty,
    /// Any other scheme (`sms:`, `ftp://`, app links): nothing an HTTP probe can check.
    Other,
}

impl LinkClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkClass::Internal => "internal",
            LinkClass::External => "external",
            LinkClass::Anchor => "anchor",
            LinkClass::Mailto => "mailto",
            LinkClass::Tel => "tel",
            LinkClass::Javascript => "javascript",
            LinkClass::Data => "data",
            LinkClass::Empty => "empty",
            LinkClass::Other => "other",
        }
    }

    /// Only internal and external links name a resource that can be probed.
    pub fn is_probeable(&self) -> bool {
        matches!(self, LinkClass::Internal | LinkClass::External)
    }

    /// Links that look like navigation but do not go anywhere.
    pub fn is_problematic(&self) -> bool {
        matches!(self, LinkClass::Javascript | LinkClass::Empty)
    }

    /// Classes whose registry key is the normalized URL rather than the raw href.
    fn keyed_by_url(&self) -> bool {
        matches!(
            self,
            LinkClass::Internal | LinkClass::External | LinkClass::Mailto | LinkClass::Tel
        )
    }
}

/// Classify an href relative to the page it was found on.
pub fn classify(href: &str, page_url: &Url) -> LinkClass {
    let trimmed = href.trim();
    if trimmed.is_empty() || trimmed == "#" {
        return LinkClass::Empty;
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("javascript:") {
        return LinkClass::Javascript;
    }
    if lower.starts_with("mailto:") {
        return LinkClass::Mailto;
    }
    if lower.starts_with("tel:") {
        return LinkClass::Tel;
    }
    if lower.starts_with("data:") {
        return LinkClass::Data;
    }
    if trimmed.starts_with('#') {
        return LinkClass::Anchor;
    }

    let page_host = page_url.host_str().unwrap_or_default();
    match page_url.join(trimmed) {
        Ok(resolved) if !is_http(&resolved) => LinkClass::Other,
        Ok(resolved) => match resolved.host_str() {
            Some(host) if is_same_site(host, page_host) => LinkClass::Internal,
            _ => LinkClass::External,
        },
        Err(_) => LinkClass::External,
    }
}

/// Where on the page a link sits, for human-readable reporting only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Location {
    Heading(String),
    List { container: Option<String> },
    Container(String),
    Body,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Heading(text) => write!(f, "heading \"{}\"", text),
            Location::List {
                container: Some(container),
            } => write!(f, "list in {}", container),
            Location::List { container: None } => write!(f, "list"),
            Location::Container(name) => write!(f, "{}", name),
            Location::Body => write!(f, "page body"),
        }
    }
}

const NAMED_CONTAINERS: &[&str] = &[
    "nav", "header", "footer", "aside", "main", "article", "section", "form",
];

fn container_name(element: &ElementRef) -> Option<String> {
    let value = element.value();
    let tag = value.name();
    let id = value.attr("id").map(str::trim).filter(|s| !s.is_empty());
    let label = value
        .attr("aria-label")
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (id, label) {
        (Some(id), _) => Some(format!("{}#{}", tag, id)),
        (None, Some(label)) => Some(format!("{} \"{}\"", tag, label)),
        (None, None) if NAMED_CONTAINERS.contains(&tag) => Some(tag.to_string()),
        (None, None) => None,
    }
}

/// Walk the ancestors of `element` and describe where it lives.
pub fn locate(element: &ElementRef) -> Location {
    let mut in_list = false;

    for node in element.ancestors() {
        let Some(ancestor) = ElementRef::wrap(node) else {
            continue;
        };
        let tag = ancestor.value().name();
        match tag {
            "body" | "html" => break,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" if !in_list => {
                return Location::Heading(collapse_whitespace(ancestor.text()));
            }
            "li" | "ul" | "ol" | "dl" => in_list = true,
            _ => {
                if let Some(name) = container_name(&ancestor) {
                    return if in_list {
                        Location::List {
                            container: Some(name),
                        }
                    } else {
                        Location::Container(name)
                    };
                }
            }
        }
    }

    if in_list {
        Location::List { container: None }
    } else {
        Location::Body
    }
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One appearance of a link in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    pub anchor_text: String,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Registry key: the normalized URL, or the trimmed href for links that
    /// do not name a fetchable resource.
    pub url: String,
    /// First raw href seen for this key.
    pub href: String,
    pub class: LinkClass,
    pub occurrences: Vec<Occurrence>,
}

/// Per-class link counts for a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSummary {
    pub total_anchors: usize,
    pub unique_links: usize,
    pub internal: usize,
    pub external: usize,
    pub anchor: usize,
    pub mailto: usize,
    pub tel: usize,
    pub javascript: usize,
    pub data: usize,
    pub empty: usize,
    pub other: usize,
    pub missing_href: usize,
}

/// Deduplicated links of one page, in document order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkRegistry {
    records: Vec<LinkRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    missing_href: Vec<Occurrence>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one anchor. Returns `true` if this created a new record.
    pub fn insert(&mut self, href: &str, page_url: &Url, occurrence: Occurrence) -> bool {
        let class = classify(href, page_url);
        let key = if class.keyed_by_url() {
            normalize(href, page_url)
        } else {
            href.trim().to_string()
        };

        if let Some(&idx) = self.index.get(&key) {
            self.records[idx].occurrences.push(occurrence);
            return false;
        }

        self.index.insert(key.clone(), self.records.len());
        self.records.push(LinkRecord {
            url: key,
            href: href.to_string(),
            class,
            occurrences: vec![occurrence],
        });
        true
    }

    pub fn record_missing_href(&mut self, occurrence: Occurrence) {
        self.missing_href.push(occurrence);
    }

    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    pub fn get(&self, url: &str) -> Option<&LinkRecord> {
        self.index.get(url).map(|&idx| &self.records[idx])
    }

    pub fn missing_href(&self) -> &[Occurrence] {
        &self.missing_href
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn by_class(&self, class: LinkClass) -> impl Iterator<Item = &LinkRecord> {
        self.records.iter().filter(move |r| r.class == class)
    }

    /// Internal and external records, in document order.
    pub fn probe_candidates(&self) -> impl Iterator<Item = &LinkRecord> {
        self.records.iter().filter(|r| r.class.is_probeable())
    }

    pub fn summary(&self) -> LinkSummary {
        let mut summary = LinkSummary {
            unique_links: self.records.len(),
            missing_href: self.missing_href.len(),
            ..LinkSummary::default()
        };

        for record in &self.records {
            summary.total_anchors += record.occurrences.len();
            let counter = match record.class {
                LinkClass::Internal => &mut summary.internal,
                LinkClass::External => &mut summary.external,
                LinkClass::Anchor => &mut summary.anchor,
                LinkClass::Mailto => &mut summary.mailto,
                LinkClass::Tel => &mut summary.tel,
                LinkClass::Javascript => &mut summary.javascript,
                LinkClass::Data => &mut summary.data,
                LinkClass::Empty => &mut summary.empty,
                LinkClass::Other => &mut summary.other,
            };
            *counter += 1;
        }
        summary.total_anchors += self.missing_href.len();

        summary
    }
}

/// Walks the anchors of a parsed page and builds its [`LinkRegistry`].
pub struct LinkExtractor {
    page_url: Url,
    anchor_selector: Selector,
    image_selector: Selector,
}

impl LinkExtractor {
    pub fn new(page_url: Url) -> Result<Self> {
        let anchor_selector = Selector::parse("a")
            .map_err(|e| ScanError::ParseError(format!("anchor selector: {:?}", e)))?;
        let image_selector = Selector::parse("img[alt]")
            .map_err(|e| ScanError::ParseError(format!("image selector: {:?}", e)))?;

        Ok(Self {
            page_url,
            anchor_selector,
            image_selector,
        })
    }

    pub fn page_url(&self) -> &Url {
        &self.page_url
    }

    pub fn extract_html(&self, html: &str) -> LinkRegistry {
        let document = Html::parse_document(html);
        self.extract(&document)
    }

    pub fn extract(&self, document: &Html) -> LinkRegistry {
        let mut registry = LinkRegistry::new();

        for element in document.select(&self.anchor_selector) {
            let occurrence = self.occurrence(&element);
            match element.value().attr("href") {
                Some(href) => {
                    if registry.insert(href, &self.page_url, occurrence) {
                        debug!("Found link: {}", href);
                    }
                }
                None => registry.record_missing_href(occurrence),
            }
        }

        info!(
            "Extracted {} unique links ({} without href) from {}",
            registry.len(),
            registry.missing_href().len(),
            self.page_url
        );
        registry
    }

    fn occurrence(&self, element: &ElementRef) -> Occurrence {
        let value = element.value();
        Occurrence {
            anchor_text: self.anchor_text(element),
            location: locate(element),
            rel: value.attr("rel").map(str::to_string),
            target: value.attr("target").map(str::to_string),
        }
    }

    fn anchor_text(&self, element: &ElementRef) -> String {
        let text = collapse_whitespace(element.text());
        if !text.is_empty() {
            return text;
        }

        let value = element.value();
        value
            .attr("aria-label")
            .or_else(|| value.attr("title"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                element
                    .select(&self.image_selector)
                    .filter_map(|img| img.value().attr("alt"))
                    .map(|alt| alt.trim().to_string())
                    .find(|alt| !alt.is_empty())
            })
            .unwrap_or_default()
    }
}
