pub mod compatibility;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod mod_metadata;
pub mod pipeline;
pub mod version;

use compatibility::CompatibilityDatabase;
use mod_metadata::ModMetadata;
use pipeline::{discoverer, loader, resolver, validator};
use std::path::Path;
use version::SemanticVersion;

/// Wires discovery, loading, validation, and resolution together in order. Returns mods in load
/// order; Failed records carry a reason in `error()` rather than aborting the run.
pub fn run_pipeline(
    root: &Path,
    api_version: &SemanticVersion,
    compat_db: &CompatibilityDatabase,
    update_url_for: &dyn Fn(&str) -> Option<String>,
    fallback_url: &str,
) -> error::Result<Vec<ModMetadata>> {
    let folders = discoverer::discover_mod_folders(root)?;

    let loaded: Vec<ModMetadata> = folders
        .iter()
        .map(|folder| loader::load_mod_folder(folder, root, compat_db))
        .collect();

    let validated = validator::validate(loaded, api_version, update_url_for, fallback_url);
    let resolved = resolver::resolve(validated, compat_db);

    Ok(resolved)
}
