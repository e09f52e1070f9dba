//! End-to-end engine tests against a local mock WOPI host.

use {
    mockito::{Matcher, Server, ServerGuard},
    reqwest::Method,
    std::{collections::HashMap, time::Duration},
    wopitest_sdk::{
        case::{Category, TestCase, TestCaseType},
        client::WopiClient,
        executor::{CaseExecutor, RunConfig},
        outcome::CaseStatus,
        proof_key::ProofKeyPair,
        request::{Request, RequestClassification},
        resources::{Resource, ResourceManager},
        savers::StateSaver,
        validators::{LockMismatchValidator, Validator},
    },
};

const FILE_PATH: &str = "/wopi/files/doc1";
const TOKEN: &str = "tok";

fn request(name: &str, classification: RequestClassification) -> Request {
    Request {
        name: name.to_string(),
        classification,
        method: Method::POST,
        url_template: "{WopiEndpoint}".to_string(),
        headers: Vec::new(),
        body: None,
        expected_status_code: 200,
        expected_status_text: None,
        requires_proof_key: false,
        validators: Vec::new(),
        state_savers: Vec::new(),
        followup_prerequisite: None,
        always_run_cleanup: false,
    }
}

fn case(name: &str, requests: Vec<Request>) -> TestCase {
    TestCase {
        name: name.to_string(),
        description: None,
        category: Category::WopiCore,
        case_type: TestCaseType::Default,
        resource_id: "Doc".to_string(),
        upload_document_on_setup: false,
        delete_document_on_tear_down: false,
        requests,
        cleanup_requests: Vec::new(),
        fail_message: None,
        documentation_link: None,
        ui_screenshot: None,
    }
}

struct Harness {
    server: ServerGuard,
    client: WopiClient,
    resources: ResourceManager,
    proof_keys: ProofKeyPair,
    prereqs: HashMap<String, TestCase>,
    config: RunConfig,
}

impl Harness {
    async fn new() -> Self {
        let server = Server::new_async().await;
        let config = RunConfig {
            endpoint: format!("{}{FILE_PATH}", server.url()),
            access_token: TOKEN.to_string(),
            access_token_ttl: 30,
            user_agent: "wopitest-tests".to_string(),
        };
        Self {
            server,
            client: WopiClient::new(Duration::from_secs(30)).unwrap(),
            resources: ResourceManager::new([Resource {
                id: "Doc".to_string(),
                filename: "doc.wopitest".to_string(),
                bytes: b"fixture".to_vec(),
            }])
            .unwrap(),
            proof_keys: ProofKeyPair::generate().unwrap(),
            prereqs: HashMap::new(),
            config,
        }
    }

    async fn run(&self, case: &TestCase) -> wopitest_sdk::outcome::CaseResult {
        let executor = CaseExecutor {
            client: &self.client,
            resources: &self.resources,
            proof_keys: &self.proof_keys,
            prereq_cases: &self.prereqs,
            config: &self.config,
        };
        executor.execute_case("Tests", case).await
    }
}

#[tokio::test]
async fn saved_lock_matches_on_the_conflict_response() {
    let mut harness = Harness::new().await;

    let lock = harness
        .server
        .mock("POST", FILE_PATH)
        .match_query(Matcher::UrlEncoded("access_token".into(), TOKEN.into()))
        .match_header("X-WOPI-Override", "LOCK")
        .with_status(200)
        .with_header("X-WOPI-Lock", "L1")
        .create_async()
        .await;
    let conflict = harness
        .server
        .mock("POST", FILE_PATH)
        .match_query(Matcher::Any)
        .match_header("X-WOPI-Override", "RELOCK")
        .with_status(409)
        .with_header("X-WOPI-Lock", "L1")
        .create_async()
        .await;

    let mut first = request("lock", RequestClassification::Standard);
    first.headers = vec![("X-WOPI-Override".to_string(), "LOCK".to_string())];
    first.state_savers = vec![StateSaver::ResponseHeader {
        header: "X-WOPI-Lock".to_string(),
        key: "SavedLock".to_string(),
    }];

    let mut second = request("relock", RequestClassification::Standard);
    second.headers = vec![("X-WOPI-Override".to_string(), "RELOCK".to_string())];
    second.expected_status_code = 409;
    second.validators = vec![Validator::LockMismatch(LockMismatchValidator {
        expected_value: None,
        expected_state_key: Some("SavedLock".to_string()),
        is_required: true,
    })];

    let mut locking = case("Locks.SavedLock", vec![first, second]);
    locking.documentation_link = Some("https://docs.example/wopi/lock".to_string());
    let result = harness.run(&locking).await;

    assert_eq!(result.status, CaseStatus::Pass, "{:?}", result.outcomes);
    assert_eq!(result.outcomes[0].state_after.get("SavedLock").unwrap(), "L1");
    // Diagnostics stay empty on a passing case.
    assert_eq!(result.documentation_link, None);
    assert_eq!(result.ui_screenshot, None);
    lock.assert_async().await;
    conflict.assert_async().await;
}

#[tokio::test]
async fn cleanup_runs_after_a_mid_sequence_failure() {
    let mut harness = Harness::new().await;

    let ok = harness
        .server
        .mock("POST", FILE_PATH)
        .match_query(Matcher::Any)
        .match_header("X-WOPI-Override", "LOCK")
        .with_status(200)
        .expect(2)
        .create_async()
        .await;
    let boom = harness
        .server
        .mock("POST", FILE_PATH)
        .match_query(Matcher::Any)
        .match_header("X-WOPI-Override", "PUT")
        .with_status(500)
        .create_async()
        .await;
    let cleanup = harness
        .server
        .mock("POST", FILE_PATH)
        .match_query(Matcher::Any)
        .match_header("X-WOPI-Override", "DELETE")
        .with_status(200)
        .create_async()
        .await;

    let with_override = |name: &str, override_value: &str| {
        let mut r = request(name, RequestClassification::Standard);
        r.headers = vec![("X-WOPI-Override".to_string(), override_value.to_string())];
        r
    };

    let mut failing = case(
        "Cleanup.AfterFailure",
        vec![
            with_override("lock", "LOCK"),
            with_override("relock", "LOCK"),
            with_override("put", "PUT"),
        ],
    );
    failing.delete_document_on_tear_down = true;
    failing.fail_message = Some("PutFile must succeed on an unlocked document.".to_string());
    failing.documentation_link = Some("https://docs.example/wopi/putfile".to_string());
    let mut delete = with_override("delete", "DELETE");
    delete.classification = RequestClassification::Cleanup;
    failing.cleanup_requests = vec![delete];

    let result = harness.run(&failing).await;

    assert_eq!(result.status, CaseStatus::Fail);
    assert_eq!(
        result.fail_message.as_deref(),
        Some("PutFile must succeed on an unlocked document.")
    );
    assert_eq!(
        result.documentation_link.as_deref(),
        Some("https://docs.example/wopi/putfile")
    );
    // The cleanup request went out even though the third request failed.
    cleanup.assert_async().await;
    ok.assert_async().await;
    boom.assert_async().await;
    let gating: Vec<_> = result.gating_failures().collect();
    assert_eq!(gating.len(), 1);
    assert_eq!(gating[0].0, "put");
}

#[tokio::test]
async fn access_token_and_proof_headers_go_on_the_wire() {
    let mut harness = Harness::new().await;

    let mock = harness
        .server
        .mock("POST", FILE_PATH)
        .match_query(Matcher::UrlEncoded("access_token".into(), TOKEN.into()))
        .match_header("X-WOPI-TimeStamp", Matcher::Regex(r"^\d+$".to_string()))
        .match_header("X-WOPI-Proof", Matcher::Regex(".+".to_string()))
        .match_header("X-WOPI-ProofOld", Matcher::Regex(".+".to_string()))
        .with_status(200)
        .create_async()
        .await;

    let mut signed = request("signed", RequestClassification::Standard);
    signed.requires_proof_key = true;

    let result = harness.run(&case("Proof.Headers", vec![signed])).await;

    assert_eq!(result.status, CaseStatus::Pass, "{:?}", result.outcomes);
    mock.assert_async().await;
}

#[tokio::test]
async fn setup_uploads_the_fixture_and_seeds_file_state() {
    let mut harness = Harness::new().await;

    let put_file = harness
        .server
        .mock("POST", format!("{FILE_PATH}/contents").as_str())
        .match_query(Matcher::Any)
        .match_header("X-WOPI-Override", "PUT")
        .match_body("fixture")
        .with_status(200)
        .create_async()
        .await;
    let probe = harness
        .server
        .mock("POST", FILE_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .create_async()
        .await;

    let mut uploading = case(
        "Setup.Upload",
        vec![request("probe", RequestClassification::Standard)],
    );
    uploading.upload_document_on_setup = true;

    let result = harness.run(&uploading).await;

    assert_eq!(result.status, CaseStatus::Pass, "{:?}", result.outcomes);
    let state = &result.outcomes[0].state_after;
    assert_eq!(state.get("File").unwrap(), "doc.wopitest");
    assert_eq!(state.get("FileExtension").unwrap(), ".wopitest");
    assert_eq!(state.get("BaseFileName").unwrap(), "doc.wopitest");
    put_file.assert_async().await;
    probe.assert_async().await;
}

#[tokio::test]
async fn failed_prerequisite_skips_the_dependent_case() {
    let mut harness = Harness::new().await;

    harness
        .server
        .mock("POST", FILE_PATH)
        .match_header("X-WOPI-Override", "LOCK")
        .with_status(200)
        .create_async()
        .await;
    harness
        .server
        .mock("POST", FILE_PATH)
        .match_header("X-WOPI-Override", "PREREQ")
        .with_status(404)
        .create_async()
        .await;

    let mut prereq_probe = request("prereq-probe", RequestClassification::Prerequisite);
    prereq_probe.headers = vec![("X-WOPI-Override".to_string(), "PREREQ".to_string())];
    let mut prereq = case("Prereq.Unsupported", vec![prereq_probe]);
    prereq.case_type = TestCaseType::Prerequisite;
    harness.prereqs.insert(prereq.name.clone(), prereq);

    let mut gated = request("lock", RequestClassification::Standard);
    gated.headers = vec![("X-WOPI-Override".to_string(), "LOCK".to_string())];
    gated.followup_prerequisite = Some("Prereq.Unsupported".to_string());

    let result = harness.run(&case("Locks.Gated", vec![gated])).await;

    assert_eq!(result.status, CaseStatus::Skipped);
}

#[tokio::test]
async fn transport_errors_do_not_stop_the_sequence() {
    let harness = Harness::new().await;

    // Point the case at a closed port: both requests fail with a transport
    // diagnostic, and both outcomes are recorded.
    let config = RunConfig {
        endpoint: "http://127.0.0.1:9/wopi/files/doc1".to_string(),
        ..harness.config.clone()
    };
    let executor = CaseExecutor {
        client: &harness.client,
        resources: &harness.resources,
        proof_keys: &harness.proof_keys,
        prereq_cases: &harness.prereqs,
        config: &config,
    };

    let unreachable = case(
        "Transport.Down",
        vec![
            request("first", RequestClassification::Standard),
            request("second", RequestClassification::Standard),
        ],
    );
    let result = executor.execute_case("Tests", &unreachable).await;

    assert_eq!(result.status, CaseStatus::Fail);
    assert_eq!(result.outcomes.len(), 2);
    for outcome in &result.outcomes {
        assert_eq!(outcome.status_code, None);
        assert!(outcome.failures[0].starts_with("Transport error:"));
    }
}

#[tokio::test]
async fn unbound_variable_fails_the_request_but_not_the_run() {
    let mut harness = Harness::new().await;

    let mock = harness
        .server
        .mock("POST", FILE_PATH)
        .match_query(Matcher::Any)
        .with_status(200)
        .expect_at_least(1)
        .create_async()
        .await;

    let mut bad_header = request("bad-header", RequestClassification::Standard);
    bad_header.headers = vec![("X-WOPI-Lock".to_string(), "{NeverSaved}".to_string())];
    let good = request("good", RequestClassification::Standard);

    let result = harness
        .run(&case("Unbound.Header", vec![bad_header, good]))
        .await;

    assert_eq!(result.status, CaseStatus::Fail);
    assert!(result.outcomes[0]
        .failures
        .iter()
        .any(|f| f.contains("Unbound template variable 'NeverSaved'")));
    assert!(result.outcomes[1].passed());
    mock.assert_async().await;
}
