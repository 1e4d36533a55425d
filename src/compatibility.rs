use crate::mod_metadata::ModId;
use crate::version::SemanticVersion;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

/// A mod's known compatibility standing, per the curated database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CompatibilityStatus {
    Ok,
    Obsolete,
    AssumeBroken,
}

/// One entry in the compatibility database, keyed externally by the mod's `unique_id`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CompatibilityRecord {
    pub status: CompatibilityStatus,
    #[serde(default)]
    pub reason_phrase: Option<String>,
    #[serde(default)]
    pub status_upper_version: Option<SemanticVersion>,
    #[serde(default)]
    pub alternative_url: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub update_key: Option<String>,
}

/// The default update-URL fallback, used when nothing more specific is known. Mirrored as a
/// `const` because the validator's message format names it literally.
pub const DEFAULT_COMPATIBILITY_FALLBACK_URL: &str = "https://smapi.io/compat";

/// A static, case-insensitive lookup from mod identity to compatibility guidance. Construction and
/// contents are a host concern. This type only owns the lookup machinery.
#[derive(Debug, Default, Clone)]
pub struct CompatibilityDatabase {
    records: HashMap<ModId, CompatibilityRecord>,
}

impl CompatibilityDatabase {
    pub fn new() -> Self {
        CompatibilityDatabase {
            records: HashMap::new(),
        }
    }

    pub fn from_records(records: impl IntoIterator<Item = (String, CompatibilityRecord)>) -> Self {
        CompatibilityDatabase {
            records: records
                .into_iter()
                .map(|(id, record)| (ModId::new(id), record))
                .collect(),
        }
    }

    /// Loads a `{ "<uniqueId>": { ...CompatibilityRecord fields... }, ... }` document.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        let table: HashMap<String, CompatibilityRecord> = serde_json::from_str(raw)?;
        Ok(Self::from_records(table))
    }

    pub fn get(&self, unique_id: &str) -> Option<&CompatibilityRecord> {
        self.records.get(&ModId::new(unique_id))
    }

    pub fn display_name(&self, unique_id: &str) -> Option<&str> {
        self.get(unique_id).and_then(|r| r.display_name.as_deref())
    }

    /// The mod's canonical page, if the record carries one via `alternative_url`. The core has no
    /// separate "mod page" field in the shipped data model; the alternative URL doubles as it.
    pub fn mod_page_url(&self, unique_id: &str) -> Option<&str> {
        self.get(unique_id).and_then(|r| r.alternative_url.as_deref())
    }
}

/// Recognized update-key vendors and their URL templates. The host may supply its own mapping
/// instead; this is the default the bundled CLI host wires in.
pub fn default_update_url_for(update_key: &str) -> Option<String> {
    let (vendor, id) = update_key.split_once(':')?;
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    match VENDOR_URL_TEMPLATES.get(vendor.to_lowercase().as_str()) {
        Some(template) => Some(template.replace("{id}", id)),
        None => None,
    }
}

static VENDOR_URL_TEMPLATES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("chucklefish", "https://community.playstarbound.com/resources/{id}"),
        ("github", "https://github.com/{id}/releases"),
        ("nexus", "https://www.nexusmods.com/stardewvalley/mods/{id}"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let db = CompatibilityDatabase::from_records([(
            "Author.Mod".to_string(),
            CompatibilityRecord {
                status: CompatibilityStatus::Ok,
                reason_phrase: None,
                status_upper_version: None,
                alternative_url: None,
                display_name: Some("Mod".into()),
                update_key: None,
            },
        )]);
        assert!(db.get("author.mod").is_some());
        assert!(db.get("AUTHOR.MOD").is_some());
        assert!(db.get("other").is_none());
    }

    #[test]
    fn default_update_url_known_vendors() {
        assert_eq!(
            default_update_url_for("Nexus:42").as_deref(),
            Some("https://www.nexusmods.com/stardewvalley/mods/42")
        );
        assert_eq!(
            default_update_url_for("GitHub:author/repo").as_deref(),
            Some("https://github.com/author/repo/releases")
        );
    }

    #[test]
    fn default_update_url_unknown_vendor_is_none() {
        assert_eq!(default_update_url_for("carrier-pigeon:42"), None);
    }

    #[test]
    fn malformed_update_key_is_none() {
        assert_eq!(default_update_url_for("no-colon-here"), None);
    }

    #[test]
    fn from_json_parses_table() {
        let json = r#"{
            "author.mod": {
                "Status": "AssumeBroken",
                "ReasonPhrase": "crashes on load",
                "StatusUpperVersion": "2.0.0",
                "AlternativeUrl": "https://alt",
                "UpdateKey": "Nexus:42"
            }
        }"#;
        let db = CompatibilityDatabase::from_json(json).unwrap();
        let record = db.get("author.mod").unwrap();
        assert_eq!(record.status, CompatibilityStatus::AssumeBroken);
        assert_eq!(record.reason_phrase.as_deref(), Some("crashes on load"));
    }
}
