use crate::mod_metadata::{is_blank, ModMetadata, Status};
use crate::compatibility::{CompatibilityStatus, DEFAULT_COMPATIBILITY_FALLBACK_URL};
use crate::version::SemanticVersion;
use std::collections::HashMap;
use std::path::Path;

/// Runs every non-topological check against each `Found` record, then the cross-mod uniqueness
/// pass. Already-`Failed` records (from the loader) are left untouched except by the uniqueness
/// pass, which still needs to see them to group by unique_id.
pub fn validate(
    mut metadata: Vec<ModMetadata>,
    api_version: &SemanticVersion,
    update_url_for: &dyn Fn(&str) -> Option<String>,
    fallback_url: &str,
) -> Vec<ModMetadata> {
    for meta in metadata.iter_mut() {
        if meta.is_failed() {
            continue;
        }
        if let Some(reason) = check_record(meta, api_version, update_url_for, fallback_url) {
            meta.set_status(Status::Failed, Some(reason));
        }
    }

    apply_uniqueness_pass(&mut metadata);
    metadata
}

fn check_record(
    meta: &ModMetadata,
    api_version: &SemanticVersion,
    update_url_for: &dyn Fn(&str) -> Option<String>,
    fallback_url: &str,
) -> Option<String> {
    let manifest = meta.manifest.as_ref()?;

    if let Some(record) = &meta.data_record {
        match record.status {
            CompatibilityStatus::Obsolete => {
                return Some(format!(
                    "it's obsolete: {}",
                    record.reason_phrase.clone().unwrap_or_default()
                ));
            }
            CompatibilityStatus::AssumeBroken => {
                let mut urls: Vec<String> = manifest
                    .update_keys
                    .iter()
                    .filter_map(|key| update_url_for(key))
                    .collect();
                if let Some(alt) = &record.alternative_url {
                    urls.push(alt.clone());
                }
                urls.push(fallback_url.to_string());

                let reason = record
                    .reason_phrase
                    .clone()
                    .unwrap_or_else(|| "it's outdated".to_string());
                let version_clause = match &record.status_upper_version {
                    None => "newer version".to_string(),
                    Some(upper) if *upper == manifest.version => "newer version".to_string(),
                    Some(upper) => format!("version newer than {}", upper),
                };
                return Some(format!(
                    "{}. Please check for a {} at {}",
                    reason,
                    version_clause,
                    urls.join(" or ")
                ));
            }
            CompatibilityStatus::Ok => {}
        }
    }

    if let Some(min) = &manifest.minimum_api_version {
        if min.is_newer_than(api_version) {
            return Some(format!(
                "it needs a more up-to-date version of the mod framework (needs {}, you have {}).",
                min, api_version
            ));
        }
    }

    if let Some(reason) = check_entry_point_exclusivity(meta, manifest) {
        return Some(reason);
    }

    let missing = missing_required_fields(manifest);
    if !missing.is_empty() {
        return Some(format!(
            "manifest is missing required fields ({})",
            missing.join(", ")
        ));
    }

    None
}

fn check_entry_point_exclusivity(
    meta: &ModMetadata,
    manifest: &crate::manifest::Manifest,
) -> Option<String> {
    match (&manifest.entry_point, &manifest.content_pack_for) {
        (None, None) => Some("manifest has no entry-point or content-pack field".to_string()),
        (Some(_), Some(_)) => Some(
            "manifest sets both 'EntryDll' and 'ContentPackFor', which are mutually exclusive"
                .to_string(),
        ),
        (Some(entry), None) => {
            if !is_valid_entry_filename(entry) {
                return Some(format!("its EntryDll '{}' is not a valid filename", entry));
            }
            let full_path = Path::new(&meta.directory_path).join(entry);
            if !full_path.is_file() {
                return Some(format!(
                    "its EntryDll '{}' was not found in the mod folder",
                    entry
                ));
            }
            None
        }
        (None, Some(content_pack_for)) => {
            if is_blank(&content_pack_for.unique_id) {
                Some("its ContentPackFor is missing a required unique ID".to_string())
            } else {
                None
            }
        }
    }
}

fn is_valid_entry_filename(name: &str) -> bool {
    if name.contains('/') || name.contains('\\') {
        return false;
    }
    sanitize_filename::sanitize(name) == name
}

fn missing_required_fields(manifest: &crate::manifest::Manifest) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if is_blank(&manifest.name) {
        missing.push("Name");
    }
    if manifest.version.is_sentinel() {
        missing.push("Version");
    }
    if is_blank(&manifest.unique_id) {
        missing.push("UniqueID");
    }
    missing
}

fn apply_uniqueness_pass(metadata: &mut [ModMetadata]) {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, meta) in metadata.iter().enumerate() {
        if let Some(manifest) = &meta.manifest {
            let key = manifest.unique_id.trim().to_lowercase();
            if !key.is_empty() {
                groups.entry(key).or_default().push(index);
            }
        }
    }

    for indices in groups.values() {
        if indices.len() <= 1 {
            continue;
        }
        let display_names: Vec<String> = indices
            .iter()
            .map(|&i| metadata[i].display_name.clone())
            .collect();
        for &i in indices {
            if metadata[i].is_failed() {
                continue;
            }
            let own_id = metadata[i]
                .manifest
                .as_ref()
                .map(|m| m.unique_id.trim().to_string())
                .unwrap_or_default();
            metadata[i].set_status(
                Status::Failed,
                Some(format!(
                    "its unique ID '{}' is used by multiple mods ({})",
                    own_id,
                    display_names.join(", ")
                )),
            );
        }
    }
}
