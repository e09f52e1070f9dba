//! Raw serde mapping of the on-disk catalog XML.
//!
//! These structs mirror the document one-to-one and stay string-typed;
//! turning them into the executable model (and rejecting dangling
//! references) is the resolver's job.

use serde::Deserialize;

fn default_true() -> bool {
    true
}

fn default_status_code() -> u16 {
    200
}

fn default_category() -> String {
    "WopiCore".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlCatalog {
    pub resources: Option<XmlResources>,
    pub requests: Option<XmlRequestTable>,
    pub prereq_cases: Option<XmlPrereqCases>,
    #[serde(rename = "TestGroup", default)]
    pub groups: Vec<XmlTestGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlResources {
    #[serde(rename = "Resource", default)]
    pub resources: Vec<XmlResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlResource {
    pub id: String,
    pub name: String,
    /// File path relative to the catalog's directory.
    pub path: Option<String>,
    /// Inline contents, for small fixtures.
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlRequestTable {
    #[serde(rename = "Request", default)]
    pub requests: Vec<XmlRequest>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlPrereqCases {
    #[serde(rename = "TestCase", default)]
    pub cases: Vec<XmlTestCase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlTestGroup {
    pub name: String,
    pub test_cases: Option<XmlTestCases>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlTestCases {
    #[serde(rename = "TestCase", default)]
    pub cases: Vec<XmlTestCase>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlTestCase {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub upload_document_on_setup: bool,
    #[serde(default)]
    pub delete_document_on_tear_down: bool,
    #[serde(default)]
    pub fail_message: Option<String>,
    #[serde(default)]
    pub documentation_link: Option<String>,
    #[serde(default)]
    pub ui_screenshot: Option<String>,
    pub requests: Option<XmlRequestSequence>,
    #[serde(default)]
    pub cleanup_requests: Option<XmlRequestSequence>,
}

/// Ordered mix of inline `<Request>`s and `<RequestRef>`s to the table.
#[derive(Debug, Deserialize)]
pub(crate) struct XmlRequestSequence {
    #[serde(rename = "$value", default)]
    pub entries: Vec<XmlRequestEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) enum XmlRequestEntry {
    Request(XmlRequest),
    RequestRef(XmlRequestRef),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlRequestRef {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub method: String,
    pub url: String,
    #[serde(default = "default_status_code")]
    pub expected_status_code: u16,
    #[serde(default)]
    pub expected_status_text: Option<String>,
    #[serde(default)]
    pub requires_proof_key: bool,
    #[serde(default)]
    pub followup_prerequisite: Option<String>,
    #[serde(default)]
    pub always_run_cleanup: bool,
    #[serde(rename = "Header", default)]
    pub headers: Vec<XmlHeader>,
    #[serde(default)]
    pub body: Option<XmlBody>,
    #[serde(default)]
    pub validators: Option<XmlValidators>,
    #[serde(default)]
    pub state_savers: Option<XmlStateSavers>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlBody {
    /// Send a named resource's bytes.
    #[serde(default)]
    pub resource: Option<String>,
    /// Inline textual body, expanded against state.
    #[serde(rename = "$value", default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlValidators {
    #[serde(rename = "$value", default)]
    pub validators: Vec<XmlValidator>,
}

#[derive(Debug, Deserialize)]
pub(crate) enum XmlValidator {
    ResponseCodeValidator(XmlResponseCodeValidator),
    ResponseContentValidator(XmlResponseContentValidator),
    ResponseHeaderValidator(XmlResponseHeaderValidator),
    LockMismatchValidator(XmlLockMismatchValidator),
    JsonContentValidator(XmlJsonContentValidator),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlResponseCodeValidator {
    pub expected_code: u16,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlResponseContentValidator {
    #[serde(default)]
    pub expected_resource_id: Option<String>,
    #[serde(default)]
    pub expected_state_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlResponseHeaderValidator {
    pub header: String,
    /// One of `Absent`, `Present`, `Equals`, `EqualsState`, `AbsoluteUrl`.
    /// Defaults from the populated fields when omitted.
    #[serde(default)]
    pub comparator: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub state_key: Option<String>,
    #[serde(default)]
    pub must_include_access_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlLockMismatchValidator {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub state_key: Option<String>,
    #[serde(default = "default_true")]
    pub is_required: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlJsonContentValidator {
    #[serde(rename = "Property", default)]
    pub properties: Vec<XmlJsonProperty>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlJsonProperty {
    pub path: String,
    /// One of `Integer`, `Long`, `Boolean`, `String`, `EndsWith`, `Regex`,
    /// `AbsoluteUrl`, `ArrayContains`.
    pub kind: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub state_key: Option<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default = "default_true")]
    pub should_match: bool,
    #[serde(default)]
    pub must_include_access_token: bool,
    #[serde(default = "default_true")]
    pub is_required: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct XmlStateSavers {
    #[serde(rename = "$value", default)]
    pub savers: Vec<XmlStateSaver>,
}

#[derive(Debug, Deserialize)]
pub(crate) enum XmlStateSaver {
    SaveResponseHeader(XmlSaveResponseHeader),
    SaveJsonProperty(XmlSaveJsonProperty),
    SaveResponseBody(XmlSaveResponseBody),
    SaveState(XmlSaveState),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlSaveResponseHeader {
    pub header: String,
    #[serde(rename = "As")]
    pub as_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlSaveJsonProperty {
    pub path: String,
    #[serde(rename = "As")]
    pub as_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlSaveResponseBody {
    #[serde(rename = "As")]
    pub as_key: String,
    #[serde(default)]
    pub base64: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct XmlSaveState {
    pub key: String,
    pub value: String,
}
