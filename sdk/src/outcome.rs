//! Outcome model: per-request records, case results, run aggregation.

use {
    crate::request::RequestClassification,
    serde::Serialize,
    std::{collections::BTreeMap, time::Duration},
};

/// Record of one executed request.
#[derive(Clone, Debug, Serialize)]
pub struct RequestOutcome {
    pub request_name: String,
    pub classification: RequestClassification,
    /// `None` when the exchange never produced a response.
    pub status_code: Option<u16>,
    pub elapsed: Duration,
    /// Every validation failure, in declaration order.
    pub failures: Vec<String>,
    /// State snapshot taken after the savers ran.
    pub state_after: BTreeMap<String, String>,
}

impl RequestOutcome {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CaseStatus {
    Pass,
    Fail,
    Skipped,
}

/// Aggregated result of one test case.
#[derive(Clone, Debug, Serialize)]
pub struct CaseResult {
    pub case_name: String,
    pub group: String,
    pub status: CaseStatus,
    pub outcomes: Vec<RequestOutcome>,
    /// Catalog-provided failure override, set only when the case failed.
    pub fail_message: Option<String>,
    /// Protocol documentation for the failing behavior, set only on failure.
    pub documentation_link: Option<String>,
    /// Reference screenshot of the expected host UI, set only on failure.
    pub ui_screenshot: Option<String>,
}

impl CaseResult {
    /// Failures from the setup/standard sequence, the ones that gate Pass.
    pub fn gating_failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.classification != RequestClassification::Cleanup)
            .flat_map(|outcome| {
                outcome
                    .failures
                    .iter()
                    .map(|failure| (outcome.request_name.as_str(), failure.as_str()))
            })
    }
}

/// Results of a whole run, in execution order.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunSummary {
    pub results: Vec<CaseResult>,
}

impl RunSummary {
    pub fn push(&mut self, result: CaseResult) {
        self.results.push(result);
    }

    pub fn count(&self, status: CaseStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Group names in first-seen order.
    pub fn groups(&self) -> Vec<&str> {
        let mut groups = Vec::new();
        for result in &self.results {
            if !groups.contains(&result.group.as_str()) {
                groups.push(result.group.as_str());
            }
        }
        groups
    }

    pub fn count_in_group(&self, group: &str, status: CaseStatus) -> usize {
        self.results
            .iter()
            .filter(|r| r.group == group && r.status == status)
            .count()
    }

    /// Exit-code rule: failures always gate; skips gate unless ignored.
    pub fn success(&self, ignore_skipped: bool) -> bool {
        if self.count(CaseStatus::Fail) > 0 {
            return false;
        }
        ignore_skipped || self.count(CaseStatus::Skipped) == 0
    }
}
