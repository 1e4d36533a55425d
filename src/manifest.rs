use crate::version::SemanticVersion;
use serde_json::Value;
use std::collections::HashMap;

/// A dependency declared in a manifest's `Dependencies` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDependency {
    pub unique_id: String,
    pub minimum_version: Option<SemanticVersion>,
    pub is_required: bool,
}

/// The `ContentPackFor` object: presence means the mod is data-only and bound to a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPackFor {
    pub unique_id: String,
    pub minimum_version: Option<SemanticVersion>,
}

/// The parsed shape of a mod's `manifest.json`. Required-ness of `name`/`unique_id`/`version` is
/// *not* enforced here. A manifest with these fields blank or at the `"0.0"` sentinel still
/// parses successfully; the validator is responsible for rejecting it with a proper reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub name: String,
    pub unique_id: String,
    pub version: SemanticVersion,
    pub minimum_api_version: Option<SemanticVersion>,
    pub entry_point: Option<String>,
    pub content_pack_for: Option<ContentPackFor>,
    pub dependencies: Vec<ManifestDependency>,
    pub update_keys: Vec<String>,
    pub author: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("manifest root must be a JSON object")]
    NotAnObject,
    #[error("'Version' field: {0}")]
    BadVersion(#[from] crate::version::VersionParseError),
    #[error("'MinimumApiVersion' field: {0}")]
    BadMinimumApiVersion(crate::version::VersionParseError),
    #[error("'ContentPackFor' must be an object with a 'UniqueID' field")]
    BadContentPackFor,
    #[error("'ContentPackFor.MinimumVersion' field: {0}")]
    BadContentPackMinimumVersion(crate::version::VersionParseError),
    #[error("'Dependencies' must be an array of objects")]
    BadDependencies,
    #[error("dependency entry missing or has non-string 'UniqueID'")]
    BadDependencyUniqueId,
    #[error("dependency '{0}': 'MinimumVersion' field: {1}")]
    BadDependencyMinimumVersion(String, crate::version::VersionParseError),
    #[error("'UpdateKeys' must be an array of strings")]
    BadUpdateKeys,
}

/// A case-insensitive view over a JSON object's top-level keys. Manifests are user-authored and
/// SMAPI-style loaders match field names ignoring case (`UniqueID`, `uniqueid`, `UNIQUEID` are all
/// the same field). `serde`'s derive macros have no built-in support for that, so this module
/// reads manifests by hand against `serde_json::Value` instead of deriving `Deserialize`.
struct CaseInsensitiveObject<'a> {
    by_lower_key: HashMap<String, &'a Value>,
}

impl<'a> CaseInsensitiveObject<'a> {
    fn new(value: &'a Value) -> Option<Self> {
        let map = value.as_object()?;
        let by_lower_key = map
            .iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        Some(CaseInsensitiveObject { by_lower_key })
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.by_lower_key.get(&field.to_lowercase()).copied()
    }

    fn get_str(&self, field: &str) -> Option<&'a str> {
        self.get(field).and_then(Value::as_str)
    }
}

fn parse_version_field(
    obj: &CaseInsensitiveObject,
    field: &str,
) -> Result<Option<SemanticVersion>, crate::version::VersionParseError> {
    match obj.get_str(field) {
        Some(raw) => Ok(Some(raw.parse()?)),
        None => Ok(None),
    }
}

fn parse_content_pack_for(
    obj: &CaseInsensitiveObject,
) -> Result<Option<ContentPackFor>, ManifestParseError> {
    let Some(value) = obj.get("ContentPackFor") else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let inner = CaseInsensitiveObject::new(value).ok_or(ManifestParseError::BadContentPackFor)?;
    let unique_id = inner
        .get_str("UniqueID")
        .ok_or(ManifestParseError::BadContentPackFor)?
        .to_string();
    let minimum_version = match inner.get_str("MinimumVersion") {
        Some(raw) => Some(
            raw.parse()
                .map_err(ManifestParseError::BadContentPackMinimumVersion)?,
        ),
        None => None,
    };
    Ok(Some(ContentPackFor {
        unique_id,
        minimum_version,
    }))
}

fn parse_dependencies(
    obj: &CaseInsensitiveObject,
) -> Result<Vec<ManifestDependency>, ManifestParseError> {
    let Some(value) = obj.get("Dependencies") else {
        return Ok(Vec::new());
    };
    if value.is_null() {
        return Ok(Vec::new());
    }
    let entries = value.as_array().ok_or(ManifestParseError::BadDependencies)?;

    let mut dependencies = Vec::with_capacity(entries.len());
    for entry in entries {
        let entry_obj =
            CaseInsensitiveObject::new(entry).ok_or(ManifestParseError::BadDependencies)?;
        let unique_id = entry_obj
            .get_str("UniqueID")
            .ok_or(ManifestParseError::BadDependencyUniqueId)?
            .to_string();
        let minimum_version = match entry_obj.get_str("MinimumVersion") {
            Some(raw) => Some(raw.parse().map_err(|e| {
                ManifestParseError::BadDependencyMinimumVersion(unique_id.clone(), e)
            })?),
            None => None,
        };
        let is_required = entry_obj
            .get("IsRequired")
            .and_then(Value::as_bool)
            .unwrap_or(true);
        dependencies.push(ManifestDependency {
            unique_id,
            minimum_version,
            is_required,
        });
    }
    Ok(dependencies)
}

fn parse_update_keys(obj: &CaseInsensitiveObject) -> Result<Vec<String>, ManifestParseError> {
    let Some(value) = obj.get("UpdateKeys") else {
        return Ok(Vec::new());
    };
    if value.is_null() {
        return Ok(Vec::new());
    }
    let entries = value.as_array().ok_or(ManifestParseError::BadUpdateKeys)?;
    entries
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or(ManifestParseError::BadUpdateKeys)
}

/// Parses a manifest document already decoded to a `serde_json::Value`. Callers that read the
/// file themselves (the loader distinguishes "file missing" from "parse failed" at that layer)
/// call this directly; `parse_manifest_str` is the convenience wrapper over raw text.
pub fn parse_manifest_value(value: &Value) -> Result<Manifest, ManifestParseError> {
    let obj = CaseInsensitiveObject::new(value).ok_or(ManifestParseError::NotAnObject)?;

    let name = obj.get_str("Name").unwrap_or_default().to_string();
    let unique_id = obj.get_str("UniqueID").unwrap_or_default().to_string();
    let version = parse_version_field(&obj, "Version")?.unwrap_or(SemanticVersion::ZERO);
    let minimum_api_version = match parse_version_field(&obj, "MinimumApiVersion") {
        Ok(v) => v,
        Err(e) => return Err(ManifestParseError::BadMinimumApiVersion(e)),
    };
    let entry_point = obj.get_str("EntryDll").map(str::to_string);
    let content_pack_for = parse_content_pack_for(&obj)?;
    let dependencies = parse_dependencies(&obj)?;
    let update_keys = parse_update_keys(&obj)?;
    let author = obj.get_str("Author").map(str::to_string);

    Ok(Manifest {
        name,
        unique_id,
        version,
        minimum_api_version,
        entry_point,
        content_pack_for,
        dependencies,
        update_keys,
        author,
    })
}

pub fn parse_manifest_str(raw: &str) -> Result<Manifest, ManifestParseError> {
    let value: Value = serde_json::from_str(raw)?;
    parse_manifest_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_matched_case_insensitively() {
        let json = r#"{"NAME": "Test Mod", "uniqueid": "author.test", "Version": "1.0.0"}"#;
        let manifest = parse_manifest_str(json).unwrap();
        assert_eq!(manifest.name, "Test Mod");
        assert_eq!(manifest.unique_id, "author.test");
        assert_eq!(manifest.version, SemanticVersion::new(1, 0, 0));
    }

    #[test]
    fn missing_version_defaults_to_sentinel() {
        let json = r#"{"Name": "Test Mod", "UniqueID": "author.test"}"#;
        let manifest = parse_manifest_str(json).unwrap();
        assert!(manifest.version.is_sentinel());
    }

    #[test]
    fn dependencies_default_is_required_true() {
        let json = r#"{
            "Name": "Test Mod", "UniqueID": "author.test", "Version": "1.0.0",
            "Dependencies": [{"UniqueID": "author.other"}]
        }"#;
        let manifest = parse_manifest_str(json).unwrap();
        assert_eq!(manifest.dependencies.len(), 1);
        assert!(manifest.dependencies[0].is_required);
    }

    #[test]
    fn dependency_is_required_false_is_honored() {
        let json = r#"{
            "Name": "Test Mod", "UniqueID": "author.test", "Version": "1.0.0",
            "Dependencies": [{"UniqueID": "author.other", "IsRequired": false}]
        }"#;
        let manifest = parse_manifest_str(json).unwrap();
        assert!(!manifest.dependencies[0].is_required);
    }

    #[test]
    fn content_pack_for_requires_unique_id() {
        let json = r#"{
            "Name": "Pack", "UniqueID": "author.pack", "Version": "1.0.0",
            "ContentPackFor": {}
        }"#;
        assert!(parse_manifest_str(json).is_err());
    }

    #[test]
    fn null_root_is_rejected() {
        assert!(matches!(
            parse_manifest_str("null"),
            Err(ManifestParseError::NotAnObject)
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(parse_manifest_str("{not json").is_err());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"Name": "Test", "UniqueID": "a.b", "Version": "1.0.0", "SomeFutureField": 42}"#;
        assert!(parse_manifest_str(json).is_ok());
    }
}
