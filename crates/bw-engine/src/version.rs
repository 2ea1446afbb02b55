//! Migration versions.
//!
//! A version is a sequence of numeric segments separated by `.` or `_`
//! (`1`, `1.2`, `2_0_1`). Versions compare segment by segment with missing
//! trailing segments treated as zero, so `1` and `1.0` are the same version.

use crate::error::{EngineError, EngineResult};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Parsed migration version
#[derive(Debug, Clone)]
pub struct Version {
    segments: Vec<u64>,
}

impl Version {
    /// Parse a version string such as `1.2` or `1_2`
    pub fn parse(raw: &str) -> EngineResult<Self> {
        let invalid = |reason: &str| EngineError::InvalidVersion {
            version: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("version is empty"));
        }

        let segments = raw
            .split(['.', '_'])
            .map(|segment| {
                if segment.is_empty() {
                    return Err(invalid("empty version segment"));
                }
                segment
                    .parse::<u64>()
                    .map_err(|_| invalid("segments must be non-negative integers"))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self { segments })
    }

    /// Numeric segments as parsed
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }

    /// Segments without trailing zeros, the canonical form for equality
    fn significant(&self) -> &[u64] {
        let len = self
            .segments
            .iter()
            .rposition(|&s| s != 0)
            .map_or(0, |pos| pos + 1);
        &self.segments[..len]
    }
}

/// Version `0`, sorts before every script version
impl Default for Version {
    fn default() -> Self {
        Self { segments: vec![0] }
    }
}

impl FromStr for Version {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let left = self.segments.get(i).copied().unwrap_or(0);
            let right = other.segments.get(i).copied().unwrap_or(0);
            match left.cmp(&right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .segments
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&joined)
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
