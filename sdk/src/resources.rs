//! Fixture documents used as test subjects.
//!
//! A resource is a document (bytes plus a file name carrying an extension)
//! that test cases upload on setup and exercise through the protocol.
//! Identity is by id; contents never change during a run.

use {std::collections::HashMap, thiserror::Error};

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("unknown resource id '{0}'")]
    Unknown(String),
    #[error("resource '{id}' file name '{filename}' has no extension")]
    MissingExtension { id: String, filename: String },
}

/// One fixture document.
#[derive(Clone, Debug)]
pub struct Resource {
    pub id: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Read-only id-to-resource table.
#[derive(Clone, Debug, Default)]
pub struct ResourceManager {
    resources: HashMap<String, Resource>,
}

impl ResourceManager {
    /// Build the table, rejecting resources whose file name has no extension.
    pub fn new(resources: impl IntoIterator<Item = Resource>) -> Result<Self, ResourceError> {
        let mut table = HashMap::new();
        for resource in resources {
            if extension_of(&resource.filename).is_none() {
                return Err(ResourceError::MissingExtension {
                    id: resource.id,
                    filename: resource.filename,
                });
            }
            table.insert(resource.id.clone(), resource);
        }
        Ok(Self { resources: table })
    }

    pub fn contents(&self, id: &str) -> Result<&[u8], ResourceError> {
        self.lookup(id).map(|r| r.bytes.as_slice())
    }

    pub fn filename(&self, id: &str) -> Result<&str, ResourceError> {
        self.lookup(id).map(|r| r.filename.as_str())
    }

    /// Extension of the resource's file name, including the leading dot.
    pub fn extension(&self, id: &str) -> Result<&str, ResourceError> {
        let filename = self.filename(id)?;
        // Extension presence was checked on construction.
        Ok(extension_of(filename).unwrap_or_default())
    }

    fn lookup(&self, id: &str) -> Result<&Resource, ResourceError> {
        self.resources
            .get(id)
            .ok_or_else(|| ResourceError::Unknown(id.to_string()))
    }
}

fn extension_of(filename: &str) -> Option<&str> {
    match filename.rfind('.') {
        Some(dot) if dot + 1 < filename.len() => Some(&filename[dot..]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use {super::*, assert_matches::assert_matches};

    fn sample() -> ResourceManager {
        ResourceManager::new([Resource {
            id: "WordDoc".to_string(),
            filename: "sample.wopitest".to_string(),
            bytes: b"fixture-bytes".to_vec(),
        }])
        .unwrap()
    }

    #[test]
    fn lookups_resolve_by_id() {
        let resources = sample();
        assert_eq!(resources.contents("WordDoc").unwrap(), b"fixture-bytes");
        assert_eq!(resources.filename("WordDoc").unwrap(), "sample.wopitest");
        assert_eq!(resources.extension("WordDoc").unwrap(), ".wopitest");
    }

    #[test]
    fn unknown_id_is_an_error() {
        assert_matches!(sample().contents("Nope"), Err(ResourceError::Unknown(id)) if id == "Nope");
    }

    #[test]
    fn extensionless_filename_is_rejected() {
        let result = ResourceManager::new([Resource {
            id: "Bad".to_string(),
            filename: "no-extension".to_string(),
            bytes: Vec::new(),
        }]);
        assert_matches!(result, Err(ResourceError::MissingExtension { .. }));
    }
}
