//! Environment signals consulted by the release tooling.
//!
//! Signals are read at call time. Nothing here caches a value, so a change to
//! the process environment is seen by the next call.

/// Set when building the curated-store (Mac App Store) variant.
pub const RESTRICTED_DISTRIBUTION_VAR: &str = "MAS_BUILD";

/// Set by CI services; selects non-interactive behaviour.
pub const CI_VAR: &str = "CI";

/// Prefix for tool-specific variables such as `MESON_GITHUB_TOKEN`.
pub const ENV_PREFIX: &str = "MESON_";

/// Whether the restricted-distribution signal is present.
///
/// Only presence matters; `MAS_BUILD=0` still counts.
#[must_use]
pub fn is_restricted_distribution() -> bool {
    std::env::var_os(RESTRICTED_DISTRIBUTION_VAR).is_some()
}

/// Whether the process runs under automation.
#[must_use]
pub fn is_ci() -> bool {
    std::env::var_os(CI_VAR).is_some()
}

/// Read `MESON_<name>`, treating an empty value as unset.
///
/// # Examples
///
/// ```
/// use meson_common::env::prefixed_var;
///
/// // Unset in doctests.
/// assert_eq!(prefixed_var("SURELY_NOT_SET_ANYWHERE"), None);
/// ```
#[must_use]
pub fn prefixed_var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .filter(|value| !value.is_empty())
}
