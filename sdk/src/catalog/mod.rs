//! Test-catalog loading.
//!
//! The catalog is an XML document declaring fixture resources, named request
//! templates, prerequisite cases, and test groups. Parsing is two-phase:
//! a raw serde pass ([`xml`]) followed by resolution ([`resolve`]) into the
//! executable model, where every dangling reference becomes a fatal
//! [`CatalogError`].

mod resolve;
mod xml;

use {
    crate::{case::{TestCase, TestGroup}, resources::{ResourceError, ResourceManager}},
    std::{collections::HashMap, path::Path},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog XML: {0}")]
    Xml(#[from] serde_xml_rs::Error),
    #[error(transparent)]
    Resource(#[from] ResourceError),
    #[error("resource '{0}' declares neither Path nor inline Text")]
    ResourceSource(String),
    #[error("failed to read resource file '{path}': {source}")]
    ResourceIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request template without a Name attribute")]
    UnnamedRequestTemplate,
    #[error("test case '{case}' references unknown resource '{resource}'")]
    UnknownResource { case: String, resource: String },
    #[error("request references unknown template '{0}'")]
    UnknownRequestTemplate(String),
    #[error("test case '{case}' references unknown prerequisite '{prereq}'")]
    UnknownPrerequisite { case: String, prereq: String },
    #[error("test case '{0}' has no requests")]
    EmptyCase(String),
    #[error("test case '{0}' has an empty ResourceId")]
    MissingResourceId(String),
    #[error("unknown category '{category}' on test case '{case}'")]
    UnknownCategory { case: String, category: String },
    #[error("unknown HTTP method '{method}' on request '{request}'")]
    UnknownMethod { request: String, method: String },
    #[error("header validator on request '{request}' for '{header}' is missing its comparison operand")]
    IncompleteHeaderValidator { request: String, header: String },
    #[error("unknown header comparator '{comparator}' on request '{request}'")]
    UnknownComparator { request: String, comparator: String },
    #[error("unknown JSON property kind '{kind}' on request '{request}'")]
    UnknownPropertyKind { request: String, kind: String },
    #[error("JSON property '{path}' on request '{request}' has a literal that is not a valid {expected}")]
    InvalidLiteral {
        request: String,
        path: String,
        expected: String,
    },
}

/// A fully resolved catalog, ready for filtering and execution.
#[derive(Debug)]
pub struct Catalog {
    pub groups: Vec<TestGroup>,
    pub prereq_cases: HashMap<String, TestCase>,
    pub resources: ResourceManager,
}

impl Catalog {
    /// Load and resolve the catalog at `path`. Resource file paths resolve
    /// relative to the catalog's directory.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_xml(&text, base_dir)
    }

    /// Parse and resolve catalog XML with an explicit fixture base directory.
    pub fn from_xml(text: &str, base_dir: &Path) -> Result<Self, CatalogError> {
        let doc: xml::XmlCatalog = serde_xml_rs::from_str(text)?;
        resolve::resolve(doc, base_dir)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            case::Category,
            request::{RequestBody, RequestClassification},
            savers::StateSaver,
            validators::{HeaderExpectation, JsonPropertyKind, Validator},
        },
        assert_matches::assert_matches,
        reqwest::Method,
        std::path::Path,
    };

    const CATALOG: &str = r#"
<Catalog>
  <Resources>
    <Resource Id="WordDoc" Name="sample.wopitest" Text="fixture-bytes"/>
  </Resources>
  <Requests>
    <Request Name="CheckFileInfo" Method="GET" Url="{WopiEndpoint}" ExpectedStatusCode="200">
      <Validators>
        <JsonContentValidator>
          <Property Path="BaseFileName" Kind="String" StateKey="BaseFileName"/>
          <Property Path="UserId" Kind="Regex" Pattern="^\d+$" ShouldMatch="false" IsRequired="false"/>
        </JsonContentValidator>
      </Validators>
    </Request>
  </Requests>
  <PrereqCases>
    <TestCase Name="Prereq.SupportsLocks" ResourceId="WordDoc">
      <Requests>
        <Request Name="lock" Method="POST" Url="{WopiEndpoint}" ExpectedStatusCode="200">
          <Header Name="X-WOPI-Override" Value="LOCK"/>
          <Header Name="X-WOPI-Lock" Value="prereq-lock"/>
        </Request>
      </Requests>
    </TestCase>
  </PrereqCases>
  <TestGroup Name="Locks">
    <TestCases>
      <TestCase Name="Locks.DoubleLock" Category="WopiCore" ResourceId="WordDoc"
                UploadDocumentOnSetup="true" DeleteDocumentOnTearDown="true">
        <Requests>
          <Request Name="lock" Method="POST" Url="{WopiEndpoint}" ExpectedStatusCode="200"
                   RequiresProofKey="true" FollowupPrerequisite="Prereq.SupportsLocks">
            <Header Name="X-WOPI-Override" Value="LOCK"/>
            <Header Name="X-WOPI-Lock" Value="L1"/>
            <Validators>
              <ResponseCodeValidator ExpectedCode="200"/>
              <ResponseHeaderValidator Header="X-WOPI-ItemVersion" Comparator="Present"/>
            </Validators>
            <StateSavers>
              <SaveResponseHeader Header="X-WOPI-Lock" As="SavedLock"/>
              <SaveState Key="Marker" Value="set"/>
            </StateSavers>
          </Request>
          <RequestRef Name="CheckFileInfo"/>
          <Request Name="relock" Method="POST" Url="{WopiEndpoint}" ExpectedStatusCode="409">
            <Header Name="X-WOPI-Override" Value="LOCK"/>
            <Header Name="X-WOPI-Lock" Value="L2"/>
            <Body Resource="WordDoc"/>
            <Validators>
              <LockMismatchValidator StateKey="SavedLock"/>
            </Validators>
          </Request>
        </Requests>
        <CleanupRequests>
          <Request Name="unlock" Method="POST" Url="{WopiEndpoint}" ExpectedStatusCode="200">
            <Header Name="X-WOPI-Override" Value="UNLOCK"/>
            <Header Name="X-WOPI-Lock" Value="{SavedLock}"/>
          </Request>
        </CleanupRequests>
      </TestCase>
    </TestCases>
  </TestGroup>
</Catalog>
"#;

    fn load() -> Catalog {
        Catalog::from_xml(CATALOG, Path::new(".")).unwrap()
    }

    #[test]
    fn parses_resources_with_inline_text() {
        let catalog = load();
        assert_eq!(catalog.resources.contents("WordDoc").unwrap(), b"fixture-bytes");
        assert_eq!(catalog.resources.filename("WordDoc").unwrap(), "sample.wopitest");
    }

    #[test]
    fn resolves_groups_cases_and_flags() {
        let catalog = load();
        assert_eq!(catalog.groups.len(), 1);
        let group = &catalog.groups[0];
        assert_eq!(group.name, "Locks");
        let case = &group.cases[0];
        assert_eq!(case.name, "Locks.DoubleLock");
        assert_eq!(case.category, Category::WopiCore);
        assert!(case.upload_document_on_setup);
        assert!(case.delete_document_on_tear_down);
        assert_eq!(case.requests.len(), 3);
        assert_eq!(case.cleanup_requests.len(), 1);
        assert_eq!(
            case.cleanup_requests[0].classification,
            RequestClassification::Cleanup
        );
    }

    #[test]
    fn resolves_request_details() {
        let catalog = load();
        let lock = &catalog.groups[0].cases[0].requests[0];
        assert_eq!(lock.method, Method::POST);
        assert!(lock.requires_proof_key);
        assert_eq!(
            lock.followup_prerequisite.as_deref(),
            Some("Prereq.SupportsLocks")
        );
        assert_eq!(lock.headers[0], ("X-WOPI-Override".to_string(), "LOCK".to_string()));
        assert_eq!(lock.validators.len(), 2);
        assert_matches!(
            &lock.validators[1],
            Validator::ResponseHeader(v) if matches!(v.expectation, HeaderExpectation::Present)
        );
        assert_eq!(lock.state_savers.len(), 2);
        assert_matches!(
            &lock.state_savers[1],
            StateSaver::Literal { key, value } if key == "Marker" && value == "set"
        );
    }

    #[test]
    fn request_refs_pull_from_the_template_table() {
        let catalog = load();
        let check = &catalog.groups[0].cases[0].requests[1];
        assert_eq!(check.name, "CheckFileInfo");
        assert_eq!(check.method, Method::GET);
        let Validator::JsonContent(json) = &check.validators[0] else {
            panic!("expected a JsonContentValidator, got {:?}", check.validators[0]);
        };
        assert_eq!(json.properties.len(), 2);
        assert_matches!(
            &json.properties[1].kind,
            JsonPropertyKind::Regex {
                should_match: false,
                ..
            }
        );
        assert!(!json.properties[1].is_required);
    }

    #[test]
    fn body_resource_reference_resolves() {
        let catalog = load();
        let relock = &catalog.groups[0].cases[0].requests[2];
        assert_matches!(&relock.body, Some(RequestBody::Resource(id)) if id == "WordDoc");
    }

    #[test]
    fn prereq_cases_are_addressable_by_name() {
        let catalog = load();
        let prereq = catalog.prereq_cases.get("Prereq.SupportsLocks").unwrap();
        assert_eq!(
            prereq.requests[0].classification,
            RequestClassification::Prerequisite
        );
    }

    #[test]
    fn unknown_request_template_is_fatal() {
        let text = CATALOG.replace("RequestRef Name=\"CheckFileInfo\"", "RequestRef Name=\"Nope\"");
        assert_matches!(
            Catalog::from_xml(&text, Path::new(".")),
            Err(CatalogError::UnknownRequestTemplate(name)) if name == "Nope"
        );
    }

    #[test]
    fn unknown_prerequisite_is_fatal() {
        let text = CATALOG.replace(
            "FollowupPrerequisite=\"Prereq.SupportsLocks\"",
            "FollowupPrerequisite=\"Prereq.Missing\"",
        );
        assert_matches!(
            Catalog::from_xml(&text, Path::new(".")),
            Err(CatalogError::UnknownPrerequisite { prereq, .. }) if prereq == "Prereq.Missing"
        );
    }

    #[test]
    fn unknown_resource_is_fatal() {
        let text = CATALOG.replace(
            "Name=\"Locks.DoubleLock\" Category=\"WopiCore\" ResourceId=\"WordDoc\"",
            "Name=\"Locks.DoubleLock\" Category=\"WopiCore\" ResourceId=\"Ghost\"",
        );
        assert_matches!(
            Catalog::from_xml(&text, Path::new(".")),
            Err(CatalogError::UnknownResource { resource, .. }) if resource == "Ghost"
        );
    }

    #[test]
    fn resource_files_load_relative_to_the_catalog() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("fixtures")).unwrap();
        std::fs::write(dir.path().join("fixtures/doc.wopitest"), b"on-disk").unwrap();
        let text = CATALOG.replace(
            "Text=\"fixture-bytes\"",
            "Path=\"fixtures/doc.wopitest\"",
        );

        let catalog = Catalog::from_xml(&text, dir.path()).unwrap();
        assert_eq!(catalog.resources.contents("WordDoc").unwrap(), b"on-disk");
    }

    #[test]
    fn malformed_xml_is_fatal() {
        assert_matches!(
            Catalog::from_xml("<Catalog><Unclosed>", Path::new(".")),
            Err(CatalogError::Xml(_))
        );
    }
}
