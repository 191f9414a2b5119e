pub mod audit;
pub mod config;
pub mod error;
pub mod links;
pub mod plan;
pub mod report;
pub mod resources;

pub use audit::{AuditReport, Auditor, LinkAudit, audit_html, audit_page};
pub use config::{AuditOptions, ProbeOrder};
pub use error::AuditError;
pub use plan::ProbePlan;
pub use report::{CategoryReport, Difficulty, Impact, Issue, Severity, Success};

pub use linkscope_scanner;
