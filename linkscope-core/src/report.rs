// Issue/success records handed to the page-analysis pipeline

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
    pub impact: Impact,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Issue {
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            suggestion: suggestion.into(),
            impact: Impact::Medium,
            difficulty: Difficulty::Easy,
            reference: None,
        }
    }

    pub fn error(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(Severity::Error, message, suggestion).with_impact(Impact::High)
    }

    pub fn warning(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message, suggestion)
    }

    pub fn info(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::new(Severity::Info, message, suggestion).with_impact(Impact::Low)
    }

    pub fn with_impact(mut self, impact: Impact) -> Self {
        self.impact = impact;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Success {
    pub message: String,
    pub impact: Impact,
}

/// Findings for one resource category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub issues: Vec<Issue>,
    pub successes: Vec<Success>,
}

impl CategoryReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn success(&mut self, message: impl Into<String>, impact: Impact) {
        self.successes.push(Success {
            message: message.into(),
            impact,
        });
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Issues ordered error, warning, info; stable within a severity.
    pub fn sorted_issues(&self) -> Vec<&Issue> {
        let mut issues: Vec<&Issue> = self.issues.iter().collect();
        issues.sort_by_key(|i| i.severity);
        issues
    }
}
