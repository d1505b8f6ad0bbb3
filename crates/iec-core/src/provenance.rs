//! Provenance and schema descriptors attached to solver outputs.

use serde::{Deserialize, Serialize};

use crate::params::Parameters;

/// Semantic version describing the schema of serialized payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version incremented for breaking changes.
    pub major: u32,
    /// Minor version incremented for additive changes.
    pub minor: u32,
    /// Patch version incremented for bug fixes and documentation updates.
    pub patch: u32,
}

impl SchemaVersion {
    /// Creates a new schema version descriptor.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

/// Provenance recorded on every equilibrium state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverProvenance {
    /// Schema of the serialized state.
    pub schema_version: SchemaVersion,
    /// Identifier of the solver that produced the state.
    pub solver: String,
    /// RFC-3339 UTC timestamp of the solve.
    pub created_at: String,
    /// Source revision when known at build time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
    /// Stable hash of the originating parameter record.
    pub params_hash: String,
    /// Originating parameters.
    pub params: Parameters,
}

/// Source revision baked in at build time, if any.
pub fn build_revision() -> Option<String> {
    option_env!("GIT_COMMIT_HASH")
        .or_else(|| option_env!("VERGEN_GIT_SHA"))
        .map(|value| value.to_string())
}
