//! Release-suffixed script locations.

use crate::error::{BranchError, BranchResult};

const SEPARATOR: char = '/';

/// Check that `release` can be used as a location segment
pub fn validate_release(release: &str) -> BranchResult<()> {
    if release.trim().is_empty() {
        return Err(BranchError::Configuration(
            "release identifier is empty".to_string(),
        ));
    }
    if release.contains(SEPARATOR) {
        return Err(BranchError::Configuration(format!(
            "release identifier '{release}' must not contain '{SEPARATOR}'"
        )));
    }
    Ok(())
}

/// Rewrite `current` from release `prev` to release `new`.
///
/// Every entry ending in `/<prev>` loses that segment, then every entry gets
/// `/<new>` appended. With an empty `prev` nothing is stripped. An entry that
/// is exactly `prev` has no base to keep and is rejected. Order is
/// preserved. Nothing is returned unless every entry could be rewritten.
pub fn compute_locations(prev: &str, new: &str, current: &[String]) -> BranchResult<Vec<String>> {
    validate_release(new)?;
    let suffix = format!("{SEPARATOR}{prev}");

    current
        .iter()
        .enumerate()
        .map(|(index, location)| {
            if location.trim().is_empty() {
                return Err(BranchError::Configuration(format!(
                    "location #{} is empty",
                    index + 1
                )));
            }
            if !prev.is_empty() && location == prev {
                return Err(BranchError::Configuration(format!(
                    "location '{location}' is the release '{prev}' itself, \
                     no base location is left to switch to '{new}'"
                )));
            }
            let base = if !prev.is_empty() && location.ends_with(&suffix) {
                &location[..location.len() - suffix.len()]
            } else {
                location.as_str()
            };
            Ok(format!("{base}{SEPARATOR}{new}"))
        })
        .collect()
}

#[cfg(test)]
#[path = "locations_test.rs"]
mod tests;
