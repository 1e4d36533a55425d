use crate::compatibility::CompatibilityRecord;
use crate::manifest::Manifest;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A mod's `UniqueID`, compared case-insensitively everywhere it appears. Wrapping it prevents
/// an accidental `==` or `HashMap` lookup anywhere in the pipeline from silently going case-
/// sensitive.
#[derive(Debug, Clone)]
pub struct ModId(String);

impl ModId {
    pub fn new(raw: impl Into<String>) -> Self {
        ModId(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl PartialEq for ModId {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for ModId {}

impl Hash for ModId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized().hash(state);
    }
}

impl fmt::Display for ModId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a `ModMetadata` record currently stands. `Failed` carries the reason; once set it is
/// never overwritten (first failure wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Found,
    Failed,
}

/// The pipeline's unit of work. Created once by the manifest loader, mutated only through
/// `set_status`, and read-only from then on.
#[derive(Debug, Clone)]
pub struct ModMetadata {
    pub display_name: String,
    pub directory_path: String,
    pub manifest: Option<Manifest>,
    pub data_record: Option<CompatibilityRecord>,
    status: Status,
    error: Option<String>,
}

impl ModMetadata {
    pub fn new(
        display_name: String,
        directory_path: String,
        manifest: Option<Manifest>,
        data_record: Option<CompatibilityRecord>,
    ) -> Self {
        ModMetadata {
            display_name,
            directory_path,
            manifest,
            data_record,
            status: Status::Found,
            error: None,
        }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_found(&self) -> bool {
        self.status == Status::Found
    }

    pub fn is_failed(&self) -> bool {
        self.status == Status::Failed
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The only way a record's status changes. Idempotent once Failed: a later call with a new
    /// reason is ignored so the first failure's message always wins.
    pub fn set_status(&mut self, status: Status, error: Option<String>) {
        if self.status == Status::Failed {
            return;
        }
        self.status = status;
        self.error = error;
    }

    /// The mod's unique_id, if a manifest was successfully read.
    pub fn mod_id(&self) -> Option<ModId> {
        self.manifest
            .as_ref()
            .map(|m| ModId::new(m.unique_id.clone()))
    }
}

pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
