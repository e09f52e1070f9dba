//! A single HTTP exchange description and its execution.
//!
//! Execution of one request walks a fixed pipeline: expand templates from
//! state, append the access token to the URL, synthesize proof headers when
//! required, issue the exchange, run every validator (no short-circuit),
//! then run the state savers. Transport failures become a synthetic
//! `"Transport error: …"` diagnostic; the rest of the case still runs.

use {
    crate::{
        client::WopiClient,
        outcome::RequestOutcome,
        proof_key::{self, ProofKeyPair},
        resources::ResourceManager,
        savers::StateSaver,
        state::{keys, State},
        template,
        validators::{ValidationContext, Validator},
        wire,
    },
    reqwest::{Method, Url},
    std::time::{Duration, Instant},
};

/// Where a request sits in its case's lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum RequestClassification {
    Standard,
    Cleanup,
    Prerequisite,
}

/// Request body template: either inline text (expanded against state) or the
/// raw bytes of a named resource.
#[derive(Clone, Debug)]
pub enum RequestBody {
    Text(String),
    Resource(String),
}

/// One HTTP exchange description.
#[derive(Clone, Debug)]
pub struct Request {
    pub name: String,
    pub classification: RequestClassification,
    pub method: Method,
    pub url_template: String,
    /// Header name/value-template pairs, in declaration order.
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub expected_status_code: u16,
    pub expected_status_text: Option<String>,
    pub requires_proof_key: bool,
    pub validators: Vec<Validator>,
    pub state_savers: Vec<StateSaver>,
    pub followup_prerequisite: Option<String>,
    pub always_run_cleanup: bool,
}

/// Shared collaborators a request needs to execute.
#[derive(Clone, Copy)]
pub struct RequestRunContext<'a> {
    pub client: &'a WopiClient,
    pub resources: &'a ResourceManager,
    pub proof_keys: &'a ProofKeyPair,
    pub user_agent: &'a str,
}

impl Request {
    /// Execute the exchange against the current state, mutating it through
    /// the declared state savers.
    pub async fn execute(&self, ctx: &RequestRunContext<'_>, state: &mut State) -> RequestOutcome {
        let started = Instant::now();
        let mut failures = Vec::new();

        // Expansion is best-effort: an unbound marker fails the request but
        // the exchange still goes out so the case collects more diagnostics.
        let (raw_url, mut missing) = template::expand_lossy(&self.url_template, state);
        let mut headers = Vec::with_capacity(self.headers.len());
        for (name, value_template) in &self.headers {
            let (value, miss) = template::expand_lossy(value_template, state);
            missing.extend(miss);
            headers.push((name.clone(), value));
        }
        let body = match &self.body {
            None => None,
            Some(RequestBody::Text(text_template)) => {
                let (text, miss) = template::expand_lossy(text_template, state);
                missing.extend(miss);
                Some(text.into_bytes())
            }
            Some(RequestBody::Resource(id)) => match ctx.resources.contents(id) {
                Ok(bytes) => Some(bytes.to_vec()),
                Err(e) => {
                    failures.push(e.to_string());
                    None
                }
            },
        };
        for name in missing {
            failures.push(format!("Unbound template variable '{name}'"));
        }

        let mut url = match Url::parse(&raw_url) {
            Ok(url) => url,
            Err(e) => {
                failures.push(format!("Transport error: invalid URL '{raw_url}': {e}"));
                return self.outcome(None, failures, state, started.elapsed());
            }
        };
        let has_token = url
            .query_pairs()
            .any(|(name, _)| name == wire::ACCESS_TOKEN_PARAM);
        if !has_token {
            if let Some(token) = state.get(keys::ACCESS_TOKEN) {
                url.query_pairs_mut()
                    .append_pair(wire::ACCESS_TOKEN_PARAM, token);
            }
        }

        if self.requires_proof_key {
            let timestamp = proof_key::wopi_timestamp_now();
            let token = state.get(keys::ACCESS_TOKEN).unwrap_or_default();
            let old_url = state.get(keys::OLD_ACCESS_TOKEN_URL);
            match ctx
                .proof_keys
                .proof_headers(token, url.as_str(), old_url, timestamp)
            {
                Ok(proof) => {
                    headers.push((wire::TIMESTAMP.to_string(), proof.timestamp.to_string()));
                    headers.push((wire::PROOF.to_string(), proof.proof));
                    headers.push((wire::PROOF_OLD.to_string(), proof.proof_old));
                }
                Err(e) => {
                    failures.push(format!("Transport error: proof signing failed: {e}"));
                    return self.outcome(None, failures, state, started.elapsed());
                }
            }
        }

        let response = match ctx
            .client
            .execute(self.method.clone(), url, ctx.user_agent, &headers, body)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                failures.push(format!("Transport error: {e}"));
                return self.outcome(None, failures, state, started.elapsed());
            }
        };

        if response.status_code != self.expected_status_code {
            let expected_text = self
                .expected_status_text
                .as_deref()
                .map(|text| format!(" {text}"))
                .unwrap_or_default();
            failures.push(format!(
                "Expected status {}{expected_text}, got {}",
                self.expected_status_code, response.status_code
            ));
        }

        // Collect every validator failure; later requests may depend on the
        // full diagnostic picture, so no short-circuiting here.
        let validation_ctx = ValidationContext {
            response: &response,
            resources: ctx.resources,
            state,
        };
        for validator in &self.validators {
            failures.extend(validator.validate(&validation_ctx).into_failures());
        }

        for saver in &self.state_savers {
            saver.apply(&response, state);
        }

        let elapsed = response.elapsed;
        self.outcome(Some(response.status_code), failures, state, elapsed)
    }

    fn outcome(
        &self,
        status_code: Option<u16>,
        failures: Vec<String>,
        state: &State,
        elapsed: Duration,
    ) -> RequestOutcome {
        RequestOutcome {
            request_name: self.name.clone(),
            classification: self.classification,
            status_code,
            elapsed,
            failures,
            state_after: state.snapshot(),
        }
    }
}
