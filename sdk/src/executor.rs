//! Test-case executor: setup, ordered requests, cleanup, report.
//!
//! State machine per case:
//!
//! ```text
//! [Init] -> [Setup?] -> [RunRequests] -> [Cleanup?] -> [Report]
//! ```
//!
//! Requests within a case are strictly sequential; cases are executed
//! sequentially by the caller. Each case gets a fresh seeded state map.

use {
    crate::{
        case::{Category, TestCase},
        client::{WopiClient, OFFICE_NATIVE_USER_AGENT},
        outcome::{CaseResult, CaseStatus, RequestOutcome},
        proof_key::ProofKeyPair,
        request::{Request, RequestBody, RequestClassification, RequestRunContext},
        resources::ResourceManager,
        state::{keys, State},
        wire,
    },
    reqwest::Method,
    std::collections::HashMap,
};

/// Endpoint context shared by every case in a run.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub endpoint: String,
    pub access_token: String,
    pub access_token_ttl: u64,
    /// User agent for cases that do not demand the Office-native one.
    pub user_agent: String,
}

/// Drives test cases to completion against one endpoint.
pub struct CaseExecutor<'a> {
    pub client: &'a WopiClient,
    pub resources: &'a ResourceManager,
    pub proof_keys: &'a ProofKeyPair,
    /// Prerequisite cases addressable from `followupPrerequisiteName`.
    pub prereq_cases: &'a HashMap<String, TestCase>,
    pub config: &'a RunConfig,
}

impl CaseExecutor<'_> {
    /// Run one case to completion and reduce its outcomes to a result.
    pub async fn execute_case(&self, group: &str, case: &TestCase) -> CaseResult {
        self.run_case(group, case, true).await
    }

    async fn run_case(&self, group: &str, case: &TestCase, allow_prereqs: bool) -> CaseResult {
        log::debug!("case '{}' starting", case.name);
        let mut state = State::seeded(
            &self.config.endpoint,
            &self.config.access_token,
            self.config.access_token_ttl,
        );
        let user_agent = match case.category {
            Category::OfficeNativeClient => OFFICE_NATIVE_USER_AGENT,
            _ => self.config.user_agent.as_str(),
        };
        let ctx = RequestRunContext {
            client: self.client,
            resources: self.resources,
            proof_keys: self.proof_keys,
            user_agent,
        };

        let mut outcomes = Vec::new();
        let mut prereq_unmet = false;

        let mut setup_ok = true;
        if case.upload_document_on_setup {
            setup_ok = self.upload_document(case, &ctx, &mut state, &mut outcomes).await;
        }

        if setup_ok {
            for request in &case.requests {
                let outcome = request.execute(&ctx, &mut state).await;
                outcomes.push(outcome);

                let Some(prereq_name) = request.followup_prerequisite.as_deref() else {
                    continue;
                };
                if !allow_prereqs {
                    log::warn!(
                        "ignoring nested prerequisite '{prereq_name}' inside a prerequisite case"
                    );
                    continue;
                }
                // Single level: the prerequisite runs to completion with its
                // own state; only its status gates the parent.
                let unmet = match self.prereq_cases.get(prereq_name) {
                    Some(prereq) => {
                        let result = Box::pin(self.run_case(group, prereq, false)).await;
                        result.status != CaseStatus::Pass
                    }
                    None => {
                        log::warn!("prerequisite case '{prereq_name}' is not in the catalog");
                        true
                    }
                };
                if unmet {
                    log::info!(
                        "case '{}' skipped: prerequisite '{prereq_name}' unmet",
                        case.name
                    );
                    prereq_unmet = true;
                    break;
                }
            }
        }

        if case.wants_cleanup() {
            for request in &case.cleanup_requests {
                outcomes.push(request.execute(&ctx, &mut state).await);
            }
        }

        let failed = !setup_ok
            || outcomes
                .iter()
                .filter(|outcome| outcome.classification != RequestClassification::Cleanup)
                .any(|outcome| !outcome.passed());
        let status = if prereq_unmet {
            CaseStatus::Skipped
        } else if failed {
            CaseStatus::Fail
        } else {
            CaseStatus::Pass
        };

        let case_failed = status == CaseStatus::Fail;
        CaseResult {
            case_name: case.name.clone(),
            group: group.to_string(),
            status,
            outcomes,
            fail_message: case_failed.then(|| case.fail_message.clone()).flatten(),
            documentation_link: case_failed
                .then(|| case.documentation_link.clone())
                .flatten(),
            ui_screenshot: case_failed.then(|| case.ui_screenshot.clone()).flatten(),
        }
    }

    /// Setup: `PutFile` the fixture bytes and seed the file-name state keys.
    ///
    /// Returns whether the upload succeeded; its outcome is recorded either
    /// way so the report shows what happened.
    async fn upload_document(
        &self,
        case: &TestCase,
        ctx: &RequestRunContext<'_>,
        state: &mut State,
        outcomes: &mut Vec<RequestOutcome>,
    ) -> bool {
        match (
            self.resources.filename(&case.resource_id),
            self.resources.extension(&case.resource_id),
        ) {
            (Ok(filename), Ok(extension)) => {
                let filename = filename.to_string();
                state.set(keys::FILE_EXTENSION, extension);
                state.set(keys::FILE, filename.clone());
                state.set(keys::BASE_FILE_NAME, filename);
            }
            (Err(e), _) | (_, Err(e)) => {
                log::error!("setup for '{}' failed: {e}", case.name);
                return false;
            }
        }

        let put_file = Request {
            name: "Setup.PutFile".to_string(),
            classification: RequestClassification::Standard,
            method: Method::POST,
            url_template: format!("{{{}}}/contents", keys::WOPI_ENDPOINT),
            headers: vec![(wire::OVERRIDE.to_string(), "PUT".to_string())],
            body: Some(RequestBody::Resource(case.resource_id.clone())),
            expected_status_code: 200,
            expected_status_text: Some("OK".to_string()),
            requires_proof_key: false,
            validators: Vec::new(),
            state_savers: Vec::new(),
            followup_prerequisite: None,
            always_run_cleanup: false,
        };
        let outcome = put_file.execute(ctx, state).await;
        let ok = outcome.passed();
        outcomes.push(outcome);
        ok
    }
}
