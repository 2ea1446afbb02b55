//! Migration script discovery.

use crate::checksum::compute_checksum;
use crate::error::{EngineError, EngineResult};
use crate::version::Version;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const SCRIPT_PREFIX: char = 'V';
const SCRIPT_SEPARATOR: &str = "__";
const SCRIPT_SUFFIX: &str = ".sql";

/// A migration script found in one of the locations
#[derive(Debug, Clone)]
pub struct ResolvedScript {
    /// Version parsed from the file name
    pub version: Version,
    /// Description parsed from the file name, underscores shown as spaces
    pub description: String,
    /// File name, e.g. `V2__add_people.sql`
    pub script: String,
    /// Location (as configured) the script was found in
    pub location: String,
    /// Full path on disk
    pub path: PathBuf,
    /// Script contents
    pub sql: String,
    /// SHA-256 of the contents
    pub checksum: String,
}

/// Split `V<version>__<description>.sql` into version and description.
///
/// Returns `Ok(None)` for files that are not versioned migrations at all.
pub fn parse_script_name(file_name: &str) -> EngineResult<Option<(Version, String)>> {
    let Some(stem) = file_name
        .strip_prefix(SCRIPT_PREFIX)
        .and_then(|rest| rest.strip_suffix(SCRIPT_SUFFIX))
    else {
        return Ok(None);
    };

    let invalid = || EngineError::InvalidScriptName {
        script: file_name.to_string(),
    };
    let (raw_version, raw_description) = stem.split_once(SCRIPT_SEPARATOR).ok_or_else(invalid)?;
    if raw_description.is_empty() {
        return Err(invalid());
    }
    let version = Version::parse(raw_version).map_err(|_| invalid())?;
    Ok(Some((version, raw_description.replace('_', " "))))
}

/// Resolve every script under `locations` (relative to `base_dir`), sorted by
/// version.
///
/// Missing location directories are skipped with a warning: a release that
/// has no scripts yet simply resolves nothing.
pub fn resolve_scripts(base_dir: &Path, locations: &[String]) -> EngineResult<Vec<ResolvedScript>> {
    let mut scripts: Vec<ResolvedScript> = Vec::new();
    let mut seen: HashMap<Version, usize> = HashMap::new();

    for location in locations {
        let dir = base_dir.join(location);
        if !dir.is_dir() {
            log::warn!("Skipping location {location}: {} is not a directory", dir.display());
            continue;
        }

        let io_err = |source| EngineError::Io {
            path: dir.display().to_string(),
            source,
        };
        let mut entries = std::fs::read_dir(&dir)
            .map_err(io_err)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?;
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some((version, description)) = parse_script_name(file_name)? else {
                log::debug!("Ignoring non-migration file {}", path.display());
                continue;
            };

            if let Some(&existing) = seen.get(&version) {
                return Err(EngineError::DuplicateVersion {
                    version: version.to_string(),
                    first: scripts[existing].path.display().to_string(),
                    second: path.display().to_string(),
                });
            }

            let sql = std::fs::read_to_string(&path).map_err(|source| EngineError::Io {
                path: path.display().to_string(),
                source,
            })?;
            seen.insert(version.clone(), scripts.len());
            scripts.push(ResolvedScript {
                checksum: compute_checksum(&sql),
                version,
                description,
                script: file_name.to_string(),
                location: location.clone(),
                path,
                sql,
            });
        }
    }

    scripts.sort_by(|a, b| a.version.cmp(&b.version));
    log::debug!(
        "Resolved {} migration script(s) from {}",
        scripts.len(),
        locations.join(",")
    );
    Ok(scripts)
}

#[cfg(test)]
#[path = "script_test.rs"]
mod tests;
