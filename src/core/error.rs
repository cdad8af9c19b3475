use std::path::PathBuf;

use thiserror::Error;

/// Hard failure of an HFN/MFA conversion.
///
/// Enumeration never produces one of these: unknown layers or categories
/// enumerate as empty lists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("malformed address `{input}`: {reason}")]
    Malformed { input: String, reason: &'static str },

    #[error("unknown layer `{0}`")]
    UnknownLayer(String),

    #[error("unknown category `{category}` in layer `{layer}`")]
    UnknownCategory { layer: String, category: String },

    #[error("unknown subcategory `{subcategory}` in `{layer}.{category}`")]
    UnknownSubcategory { layer: String, category: String, subcategory: String },

    #[error("`{mfa}` is claimed by more than one address: {}", .candidates.join(", "))]
    AmbiguousMapping { mfa: String, candidates: Vec<String> },
}

/// One problem found by the load-time integrity check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityViolation {
    #[error("layer `{0}` has no categories")]
    EmptyLayer(String),

    #[error("category `{0}` has no subcategories")]
    EmptyCategory(String),

    #[error("duplicate code `{code}` under `{scope}`")]
    DuplicateCode { scope: String, code: String },

    #[error("duplicate numeric code `{numeric}` under `{scope}` ({first} and {second})")]
    DuplicateNumeric { scope: String, numeric: String, first: String, second: String },

    #[error("invalid numeric code `{numeric}` for `{path}`")]
    InvalidNumeric { path: String, numeric: String },

    #[error("invalid code `{code}` at `{path}`, expected ASCII letters or digits")]
    InvalidCode { path: String, code: String },

    #[error("`{path}` references unknown parent `{parent}`")]
    OrphanRow { path: String, parent: String },

    #[error("override for `{0}` targets a path missing from the table")]
    OverrideTargetMissing(String),

    #[error("override for `{path}` starts with {found} but the table places it under {expected}")]
    OverrideParentMismatch { path: String, expected: String, found: String },

    #[error("override for `{path}` already maps to {existing}, refusing {requested}")]
    OverrideConflict { path: String, existing: String, requested: String },

    #[error("overrides `{first}` and `{second}` share numeric path {numeric}")]
    OverrideCollision { numeric: String, first: String, second: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to read taxonomy file {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("failed to parse taxonomy table: {0}")]
    Parse(String),

    #[error("taxonomy integrity check failed: {}", join_violations(.0))]
    Integrity(Vec<IntegrityViolation>),
}

fn join_violations(violations: &[IntegrityViolation]) -> String {
    violations.iter().map(|v| v.to_string()).collect::<Vec<_>>().join("; ")
}
