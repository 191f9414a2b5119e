pub mod discovery;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod probe;
pub mod robots;
pub mod sitemap;

pub use discovery::{Discoverer, DiscoveryReport, RobotsStatus};
pub use error::{FetchError, ScanError};
pub use extract::{LinkClass, LinkExtractor, LinkRecord, LinkRegistry, Location, Occurrence};
pub use fetch::Fetcher;
pub use probe::{ProbeMethod, ProbeResult, Prober};
pub use robots::{RobotsFile, RobotsPolicy, RuleGroup};
pub use sitemap::{SitemapDescriptor, SitemapFormat};
