// Selection of the links that get probed

use crate::config::ProbeOrder;
use linkscope_scanner::{LinkClass, LinkRegistry};
use serde::{Deserialize, Serialize};

/// Probe targets split at the cap. Everything in `unchecked` was eligible
/// but skipped, and the caller has to be told about it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbePlan {
    pub cap: usize,
    pub targets: Vec<String>,
    pub unchecked: Vec<String>,
}

impl ProbePlan {
    pub fn select(registry: &LinkRegistry, cap: usize, order: ProbeOrder) -> Self {
        let mut candidates: Vec<&str> = match order {
            ProbeOrder::Document => registry.probe_candidates().map(|r| r.url.as_str()).collect(),
            ProbeOrder::InternalFirst => registry
                .by_class(LinkClass::Internal)
                .chain(registry.by_class(LinkClass::External))
                .map(|r| r.url.as_str())
                .collect(),
        };

        let unchecked = if candidates.len() > cap {
            candidates.split_off(cap)
        } else {
            Vec::new()
        };

        Self {
            cap,
            targets: candidates.into_iter().map(String::from).collect(),
            unchecked: unchecked.into_iter().map(String::from).collect(),
        }
    }

    pub fn is_truncated(&self) -> bool {
        !self.unchecked.is_empty()
    }

    pub fn candidate_count(&self) -> usize {
        self.targets.len() + self.unchecked.len()
    }
}
