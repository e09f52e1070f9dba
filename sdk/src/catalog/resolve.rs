//! Resolution of the raw XML document into the executable model.
//!
//! Resolution is where configuration errors surface: dangling resource,
//! request-template, or prerequisite references abort the run before any
//! request is issued.

use {
    super::{xml, Catalog, CatalogError},
    crate::{
        case::{Category, TestCase, TestCaseType, TestGroup},
        request::{Request, RequestBody, RequestClassification},
        resources::{Resource, ResourceManager},
        savers::StateSaver,
        validators::{
            HeaderExpectation, JsonContentValidator, JsonPropertyKind, JsonPropertyValidator,
            LockMismatchValidator, ResponseCodeValidator, ResponseContentValidator,
            ResponseHeaderValidator, Validator,
        },
    },
    reqwest::Method,
    std::{
        collections::{HashMap, HashSet},
        path::Path,
    },
};

pub(crate) fn resolve(doc: xml::XmlCatalog, base_dir: &Path) -> Result<Catalog, CatalogError> {
    let resources = resolve_resources(doc.resources, base_dir)?;

    let mut templates = HashMap::new();
    for template in doc.requests.map(|t| t.requests).unwrap_or_default() {
        let name = template
            .name
            .clone()
            .ok_or(CatalogError::UnnamedRequestTemplate)?;
        templates.insert(name, template);
    }

    let mut prereq_cases = HashMap::new();
    for raw in doc.prereq_cases.map(|p| p.cases).unwrap_or_default() {
        let case = resolve_case(raw, TestCaseType::Prerequisite, &templates, &resources)?;
        prereq_cases.insert(case.name.clone(), case);
    }

    let mut groups = Vec::with_capacity(doc.groups.len());
    for raw_group in doc.groups {
        let mut cases = Vec::new();
        for raw in raw_group.test_cases.map(|t| t.cases).unwrap_or_default() {
            cases.push(resolve_case(
                raw,
                TestCaseType::Default,
                &templates,
                &resources,
            )?);
        }
        groups.push(TestGroup {
            name: raw_group.name,
            cases,
        });
    }

    check_prerequisites(&groups, &prereq_cases)?;

    Ok(Catalog {
        groups,
        prereq_cases,
        resources,
    })
}

fn resolve_resources(
    raw: Option<xml::XmlResources>,
    base_dir: &Path,
) -> Result<ResourceManager, CatalogError> {
    let mut resources = Vec::new();
    for resource in raw.map(|r| r.resources).unwrap_or_default() {
        let bytes = match (resource.path, resource.text) {
            (Some(path), _) => {
                let full = base_dir.join(&path);
                std::fs::read(&full).map_err(|source| CatalogError::ResourceIo {
                    path: full.display().to_string(),
                    source,
                })?
            }
            (None, Some(text)) => text.into_bytes(),
            (None, None) => return Err(CatalogError::ResourceSource(resource.id)),
        };
        resources.push(Resource {
            id: resource.id,
            filename: resource.name,
            bytes,
        });
    }
    Ok(ResourceManager::new(resources)?)
}

fn resolve_case(
    raw: xml::XmlTestCase,
    case_type: TestCaseType,
    templates: &HashMap<String, xml::XmlRequest>,
    resources: &ResourceManager,
) -> Result<TestCase, CatalogError> {
    let name = raw.name;
    if raw.resource_id.is_empty() {
        return Err(CatalogError::MissingResourceId(name));
    }
    if resources.filename(&raw.resource_id).is_err() {
        return Err(CatalogError::UnknownResource {
            case: name,
            resource: raw.resource_id,
        });
    }
    let category = Category::parse(&raw.category).ok_or_else(|| CatalogError::UnknownCategory {
        case: name.clone(),
        category: raw.category.clone(),
    })?;

    let classification = match case_type {
        TestCaseType::Default => RequestClassification::Standard,
        TestCaseType::Prerequisite => RequestClassification::Prerequisite,
    };
    let requests = resolve_sequence(raw.requests, classification, &name, templates)?;
    if requests.is_empty() {
        return Err(CatalogError::EmptyCase(name));
    }
    let cleanup_requests = resolve_sequence(
        raw.cleanup_requests,
        RequestClassification::Cleanup,
        &name,
        templates,
    )?;

    Ok(TestCase {
        name,
        description: raw.description,
        category,
        case_type,
        resource_id: raw.resource_id,
        upload_document_on_setup: raw.upload_document_on_setup,
        delete_document_on_tear_down: raw.delete_document_on_tear_down,
        requests,
        cleanup_requests,
        fail_message: raw.fail_message,
        documentation_link: raw.documentation_link,
        ui_screenshot: raw.ui_screenshot,
    })
}

fn resolve_sequence(
    raw: Option<xml::XmlRequestSequence>,
    classification: RequestClassification,
    case: &str,
    templates: &HashMap<String, xml::XmlRequest>,
) -> Result<Vec<Request>, CatalogError> {
    let mut requests = Vec::new();
    for (index, entry) in raw
        .map(|sequence| sequence.entries)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
    {
        let resolved = match entry {
            xml::XmlRequestEntry::Request(request) => {
                resolve_request(&request, classification, case, index)?
            }
            xml::XmlRequestEntry::RequestRef(reference) => {
                let template = templates.get(&reference.name).ok_or_else(|| {
                    CatalogError::UnknownRequestTemplate(reference.name.clone())
                })?;
                resolve_request(template, classification, case, index)?
            }
        };
        requests.push(resolved);
    }
    Ok(requests)
}

fn resolve_request(
    raw: &xml::XmlRequest,
    classification: RequestClassification,
    case: &str,
    index: usize,
) -> Result<Request, CatalogError> {
    let name = raw
        .name
        .clone()
        .unwrap_or_else(|| format!("{case}#{index}", index = index + 1));
    let method = Method::from_bytes(raw.method.to_ascii_uppercase().as_bytes()).map_err(|_| {
        CatalogError::UnknownMethod {
            request: name.clone(),
            method: raw.method.clone(),
        }
    })?;

    let body = match &raw.body {
        None => None,
        Some(body) => match (&body.resource, &body.text) {
            (Some(resource), _) => Some(RequestBody::Resource(resource.clone())),
            (None, Some(text)) => Some(RequestBody::Text(text.clone())),
            (None, None) => None,
        },
    };

    let mut validators = Vec::new();
    for raw_validator in raw
        .validators
        .as_ref()
        .map(|v| v.validators.as_slice())
        .unwrap_or_default()
    {
        validators.push(resolve_validator(raw_validator, &name)?);
    }

    let state_savers = raw
        .state_savers
        .as_ref()
        .map(|s| s.savers.as_slice())
        .unwrap_or_default()
        .iter()
        .map(resolve_saver)
        .collect();

    Ok(Request {
        name,
        classification,
        method,
        url_template: raw.url.clone(),
        headers: raw
            .headers
            .iter()
            .map(|header| (header.name.clone(), header.value.clone()))
            .collect(),
        body,
        expected_status_code: raw.expected_status_code,
        expected_status_text: raw.expected_status_text.clone(),
        requires_proof_key: raw.requires_proof_key,
        validators,
        state_savers,
        followup_prerequisite: raw.followup_prerequisite.clone(),
        always_run_cleanup: raw.always_run_cleanup,
    })
}

fn resolve_validator(
    raw: &xml::XmlValidator,
    request: &str,
) -> Result<Validator, CatalogError> {
    Ok(match raw {
        xml::XmlValidator::ResponseCodeValidator(v) => {
            Validator::ResponseCode(ResponseCodeValidator {
                expected: v.expected_code,
            })
        }
        xml::XmlValidator::ResponseContentValidator(v) => {
            Validator::ResponseContent(ResponseContentValidator {
                expected_resource_id: v.expected_resource_id.clone(),
                expected_state_key: v.expected_state_key.clone(),
            })
        }
        xml::XmlValidator::ResponseHeaderValidator(v) => {
            let comparator = v.comparator.as_deref().unwrap_or(if v.value.is_some() {
                "Equals"
            } else if v.state_key.is_some() {
                "EqualsState"
            } else {
                "Present"
            });
            let expectation = match comparator {
                "Absent" => HeaderExpectation::Absent,
                "Present" => HeaderExpectation::Present,
                "Equals" => HeaderExpectation::Equals {
                    value: v.value.clone().ok_or_else(|| {
                        CatalogError::IncompleteHeaderValidator {
                            request: request.to_string(),
                            header: v.header.clone(),
                        }
                    })?,
                },
                "EqualsState" => HeaderExpectation::EqualsStateValue {
                    key: v.state_key.clone().ok_or_else(|| {
                        CatalogError::IncompleteHeaderValidator {
                            request: request.to_string(),
                            header: v.header.clone(),
                        }
                    })?,
                },
                "AbsoluteUrl" => HeaderExpectation::AbsoluteUrl {
                    must_include_access_token: v.must_include_access_token,
                },
                other => {
                    return Err(CatalogError::UnknownComparator {
                        request: request.to_string(),
                        comparator: other.to_string(),
                    });
                }
            };
            Validator::ResponseHeader(ResponseHeaderValidator {
                header: v.header.clone(),
                expectation,
            })
        }
        xml::XmlValidator::LockMismatchValidator(v) => {
            Validator::LockMismatch(LockMismatchValidator {
                expected_value: v.value.clone(),
                expected_state_key: v.state_key.clone(),
                is_required: v.is_required,
            })
        }
        xml::XmlValidator::JsonContentValidator(v) => {
            let mut properties = Vec::with_capacity(v.properties.len());
            for property in &v.properties {
                properties.push(resolve_json_property(property, request)?);
            }
            Validator::JsonContent(JsonContentValidator { properties })
        }
    })
}

fn resolve_json_property(
    raw: &xml::XmlJsonProperty,
    request: &str,
) -> Result<JsonPropertyValidator, CatalogError> {
    let bad_literal = |expected: &str| CatalogError::InvalidLiteral {
        request: request.to_string(),
        path: raw.path.clone(),
        expected: expected.to_string(),
    };

    let kind = match raw.kind.as_str() {
        "Integer" | "Long" => JsonPropertyKind::Integer {
            value: raw
                .value
                .as_deref()
                .map(|v| v.parse().map_err(|_| bad_literal("integer")))
                .transpose()?,
            state_key: raw.state_key.clone(),
        },
        "Boolean" => JsonPropertyKind::Boolean {
            value: raw
                .value
                .as_deref()
                .map(|v| v.parse().map_err(|_| bad_literal("boolean")))
                .transpose()?,
            state_key: raw.state_key.clone(),
        },
        "String" => JsonPropertyKind::String {
            value: raw.value.clone(),
            state_key: raw.state_key.clone(),
        },
        "EndsWith" => JsonPropertyKind::EndsWith {
            suffix: raw.value.clone().ok_or_else(|| bad_literal("suffix"))?,
        },
        "Regex" => JsonPropertyKind::Regex {
            pattern: raw.pattern.clone().ok_or_else(|| bad_literal("pattern"))?,
            should_match: raw.should_match,
        },
        "AbsoluteUrl" => JsonPropertyKind::AbsoluteUrl {
            must_include_access_token: raw.must_include_access_token,
        },
        "ArrayContains" => JsonPropertyKind::ArrayContains {
            value: raw.value.clone().ok_or_else(|| bad_literal("value"))?,
        },
        other => {
            return Err(CatalogError::UnknownPropertyKind {
                request: request.to_string(),
                kind: other.to_string(),
            });
        }
    };

    Ok(JsonPropertyValidator {
        path: raw.path.clone(),
        is_required: raw.is_required,
        kind,
    })
}

fn resolve_saver(raw: &xml::XmlStateSaver) -> StateSaver {
    match raw {
        xml::XmlStateSaver::SaveResponseHeader(s) => StateSaver::ResponseHeader {
            header: s.header.clone(),
            key: s.as_key.clone(),
        },
        xml::XmlStateSaver::SaveJsonProperty(s) => StateSaver::JsonProperty {
            path: s.path.clone(),
            key: s.as_key.clone(),
        },
        xml::XmlStateSaver::SaveResponseBody(s) => StateSaver::ResponseBody {
            key: s.as_key.clone(),
            as_base64: s.base64,
        },
        xml::XmlStateSaver::SaveState(s) => StateSaver::Literal {
            key: s.key.clone(),
            value: s.value.clone(),
        },
    }
}

fn check_prerequisites(
    groups: &[TestGroup],
    prereq_cases: &HashMap<String, TestCase>,
) -> Result<(), CatalogError> {
    let known: HashSet<&str> = prereq_cases.keys().map(String::as_str).collect();
    for group in groups {
        for case in &group.cases {
            for request in case.requests.iter().chain(&case.cleanup_requests) {
                if let Some(prereq) = request.followup_prerequisite.as_deref() {
                    if !known.contains(prereq) {
                        return Err(CatalogError::UnknownPrerequisite {
                            case: case.name.clone(),
                            prereq: prereq.to_string(),
                        });
                    }
                }
            }
        }
    }
    Ok(())
}
