use crate::compatibility::CompatibilityDatabase;
use crate::manifest::parse_manifest_value;
use crate::mod_metadata::{is_blank, ModMetadata, Status};
use log::{debug, warn};
use serde_json::Value;
use std::fs;
use std::path::Path;

const MANIFEST_FILENAME: &str = "manifest.json";

/// Reads one mod folder's manifest and produces a single `ModMetadata`. Never returns an `Err`.
/// Every failure mode becomes a `Failed` record.
pub fn load_mod_folder(folder: &Path, root: &Path, compat_db: &CompatibilityDatabase) -> ModMetadata {
    let manifest_path = folder.join(MANIFEST_FILENAME);
    let relative_path = folder
        .strip_prefix(root)
        .unwrap_or(folder)
        .to_string_lossy()
        .to_string();
    let directory_path = folder.to_string_lossy().to_string();

    if !manifest_path.is_file() {
        debug!("'{}' has no manifest.json", directory_path);
        let mut meta = ModMetadata::new(relative_path.clone(), directory_path, None, None);
        meta.set_status(Status::Failed, Some("it doesn't have a manifest.".to_string()));
        return meta;
    }

    let raw = match fs::read_to_string(&manifest_path) {
        Ok(raw) => raw,
        Err(e) => {
            let mut meta = ModMetadata::new(relative_path.clone(), directory_path, None, None);
            meta.set_status(
                Status::Failed,
                Some(format!("parsing its manifest failed: {}", e)),
            );
            return meta;
        }
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            let mut meta = ModMetadata::new(relative_path.clone(), directory_path, None, None);
            meta.set_status(
                Status::Failed,
                Some(format!("parsing its manifest failed: {}", e)),
            );
            return meta;
        }
    };

    if value.is_null() {
        let mut meta = ModMetadata::new(relative_path.clone(), directory_path, None, None);
        meta.set_status(Status::Failed, Some("its manifest is invalid.".to_string()));
        return meta;
    }

    let mut manifest = match parse_manifest_value(&value) {
        Ok(manifest) => manifest,
        Err(e) => {
            let mut meta = ModMetadata::new(relative_path.clone(), directory_path, None, None);
            meta.set_status(
                Status::Failed,
                Some(format!("parsing its manifest failed: {}", e)),
            );
            return meta;
        }
    };

    let data_record = compat_db.get(&manifest.unique_id).cloned();

    // The database may retroactively route a legacy mod's update checks: if it supplies an
    // update_key, it replaces the manifest's own list wholesale rather than merging into it.
    if let Some(record) = &data_record {
        if let Some(update_key) = &record.update_key {
            manifest.update_keys = vec![update_key.clone()];
        }
    }

    let display_name = [
        Some(manifest.name.as_str()),
        data_record.as_ref().and_then(|r| r.display_name.as_deref()),
        Some(relative_path.as_str()),
    ]
    .into_iter()
    .flatten()
    .find(|candidate| !is_blank(candidate))
    .unwrap_or(&relative_path)
    .to_string();

    debug!("loaded manifest for '{}'", display_name);
    if data_record.is_none() {
        warn!("no compatibility record for '{}', proceeding anyway", manifest.unique_id);
    }

    ModMetadata::new(
        display_name,
        folder.to_string_lossy().to_string(),
        Some(manifest),
        data_record,
    )
}
