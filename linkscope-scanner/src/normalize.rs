// URL primitives shared by link extraction and resource discovery

use tracing::debug;
use url::Url;

/// Resolve `href` against `base`, dropping the fragment and keeping the query.
///
/// An href that cannot be resolved is returned trimmed but otherwise as-is, so
/// a bad link still ends up in the registry under a stable key.
pub fn normalize(href: &str, base: &Url) -> String {
    let trimmed = href.trim();
    match base.join(trimmed) {
        Ok(mut resolved) => {
            resolved.set_fragment(None);
            resolved.to_string()
        }
        Err(e) => {
            debug!("Could not resolve '{}' against {}: {}", trimmed, base, e);
            trimmed.to_string()
        }
    }
}

/// `scheme://host[:port]` of a URL, without a trailing slash.
pub fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Lowercased host with any trailing dot and a leading `www.` removed.
pub fn site_host(host: &str) -> String {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Whether `host` belongs to the same site as `page_host`.
///
/// `www.` and bare variants are the same site, and so is any exact subdomain
/// of the page host (`blog.example.com` for `example.com`). The reverse is not
/// true: `example.com` is external to a page on `blog.example.com`.
pub fn is_same_site(host: &str, page_host: &str) -> bool {
    let host = site_host(host);
    let page_host = site_host(page_host);
    if page_host.is_empty() {
        return false;
    }
    host == page_host || host.ends_with(&format!(".{}", page_host))
}

/// Whether the prober can say anything useful about this URL.
pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}
