//! Unit naming and unit file lookup.

use std::path::{Path, PathBuf};

use crate::domain::Target;
use crate::error::{BackendError, Result};

const PREFIX: &str = "deis-";
const SUFFIX: &str = ".service";

/// Fleet unit name for a target: `deis-router@1.service`, `deis-registry.service`.
pub fn unit_name(target: &Target) -> String {
    match target.index() {
        Some(index) => format!("{PREFIX}{}@{index}{SUFFIX}", target.name()),
        None => format!("{PREFIX}{}{SUFFIX}", target.name()),
    }
}

/// File name of the definition a target is loaded from.
///
/// Indexed targets share the unindexed template.
pub fn template_name(component: &str) -> String {
    format!("{PREFIX}{component}{SUFFIX}")
}

/// Instance index of a `deis-<component>@N.service` unit, if it is one.
pub fn instance_index(unit: &str, component: &str) -> Option<u32> {
    unit.strip_prefix(PREFIX)?
        .strip_prefix(component)?
        .strip_prefix('@')?
        .strip_suffix(SUFFIX)?
        .parse()
        .ok()
}

/// First definition for `component` on the search path.
pub fn find_template(search_path: &[PathBuf], component: &str) -> Result<PathBuf> {
    let file = template_name(component);
    search_path
        .iter()
        .map(|dir| dir.join(&file))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            BackendError::new(
                component,
                format!("unit file {file} not found in {}", display_path(search_path)),
            )
            .into()
        })
}

fn display_path(search_path: &[PathBuf]) -> String {
    search_path
        .iter()
        .map(|dir| dir.display().to_string())
        .collect::<Vec<_>>()
        .join(":")
}

/// Copy the definition to `staging` under the unit's own name.
///
/// fleetctl names a unit after the file it is loaded from, so instances of
/// a template need their own copy.
pub async fn stage(template: &Path, staging: &Path, unit: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(staging).await?;
    let staged = staging.join(unit);
    tokio::fs::copy(template, &staged).await?;
    Ok(staged)
}
