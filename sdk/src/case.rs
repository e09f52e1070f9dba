//! Declarative test model: cases, groups, categories.
//!
//! Everything here is immutable after catalog resolution; execution state
//! lives in [`crate::state::State`] and the outcome types.

use {crate::request::Request, std::fmt};

/// Which client family a case exercises.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    WopiCore,
    OfficeNativeClient,
    OfficeOnline,
}

impl Category {
    /// Parse the catalog spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "WopiCore" => Some(Self::WopiCore),
            "OfficeNativeClient" => Some(Self::OfficeNativeClient),
            "OfficeOnline" => Some(Self::OfficeOnline),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WopiCore => write!(f, "WopiCore"),
            Self::OfficeNativeClient => write!(f, "OfficeNativeClient"),
            Self::OfficeOnline => write!(f, "OfficeOnline"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestCaseType {
    Default,
    Prerequisite,
}

/// One conformance test case.
#[derive(Clone, Debug)]
pub struct TestCase {
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub case_type: TestCaseType,
    pub resource_id: String,
    pub upload_document_on_setup: bool,
    pub delete_document_on_tear_down: bool,
    pub requests: Vec<Request>,
    pub cleanup_requests: Vec<Request>,
    pub fail_message: Option<String>,
    pub documentation_link: Option<String>,
    pub ui_screenshot: Option<String>,
}

impl TestCase {
    /// Whether the cleanup sequence must run regardless of failures.
    pub fn wants_cleanup(&self) -> bool {
        self.delete_document_on_tear_down
            || self.requests.iter().any(|request| request.always_run_cleanup)
    }
}

/// A named bundle of related cases, in catalog declaration order.
#[derive(Clone, Debug)]
pub struct TestGroup {
    pub name: String,
    pub cases: Vec<TestCase>,
}
