//! Consolidates per-platform, per-python-version pip-freeze snapshots from a
//! CI matrix into conditionally-constrained requirements files, inferring the
//! minimal PEP 508 marker expression under which each pinned version applies.

use thiserror::Error;

pub mod classify;
pub mod collect;
pub mod constraint;
pub mod emit;
pub mod resolve;
pub mod synth;
pub mod version;

pub use classify::{classify_filename, FileParts, JobKind, Os};
pub use collect::{collect_directory, CollectionMetadata, RequirementsCollector};
pub use constraint::Constraint;
pub use emit::emit;
pub use synth::{synthesize, RequirementLine};
pub use version::{compare_versions, PyVersion};

#[derive(Debug, Error)]
pub enum LkgError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("python versions [{versions}] are not contiguous within the observed domain [{domain}]")]
    NonContiguousVersions { versions: String, domain: String },
}

/// Synthesize and render the output text for one job kind.
pub fn generate(metadata: &CollectionMetadata) -> Result<String, LkgError> {
    Ok(emit::emit(&synth::synthesize(metadata)?))
}
