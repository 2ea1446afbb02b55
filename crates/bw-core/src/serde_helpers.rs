//! Shared serde helper functions used by the configuration model.

/// Serde default function that returns `true`.
pub fn default_true() -> bool {
    true
}
