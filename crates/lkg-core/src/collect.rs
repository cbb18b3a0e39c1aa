use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::classify::{classify_filename, FileParts, JobKind, Os};
use crate::version::PyVersion;
use crate::LkgError;

/// Pinned version string -> the environments that pinned it.
pub type VersionObservations = BTreeMap<String, BTreeSet<FileParts>>;

/// Everything observed for one job kind across the CI matrix.
///
/// `py_version_oses` defines, per python version, what full OS coverage
/// means; `all_py_versions` is the ordered domain for range inference.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectionMetadata {
    pub all_file_parts: BTreeSet<FileParts>,
    pub py_version_oses: BTreeMap<PyVersion, BTreeSet<Os>>,
    pub all_py_versions: BTreeSet<PyVersion>,
    pub reqs: BTreeMap<String, VersionObservations>,
}

impl CollectionMetadata {
    fn record(&mut self, parts: &FileParts, package: &str, version: &str) {
        self.all_file_parts.insert(parts.clone());
        self.all_py_versions.insert(parts.py_version);
        self.py_version_oses
            .entry(parts.py_version)
            .or_default()
            .insert(parts.os);
        self.reqs
            .entry(package.to_string())
            .or_default()
            .entry(version.to_string())
            .or_default()
            .insert(parts.clone());
    }
}

/// Accumulates pip-freeze snapshots into one [`CollectionMetadata`] per job
/// kind. Test and notebook files never mix.
#[derive(Debug, Default)]
pub struct RequirementsCollector {
    pub tests: CollectionMetadata,
    pub notebooks: CollectionMetadata,
}

impl RequirementsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one file. Returns false for filenames that are not CI
    /// requirements snapshots; lines that are not `name==version` pins
    /// (comments, blanks, editable installs) are skipped.
    pub fn ingest_file(&mut self, filename: &str, contents: &str) -> bool {
        let Some((kind, parts)) = classify_filename(filename) else {
            return false;
        };
        let pin_pattern = Regex::new(r"^(.*?)==(.*)$").expect("valid regex");
        let metadata = match kind {
            JobKind::Tests => &mut self.tests,
            JobKind::Notebooks => &mut self.notebooks,
        };
        for line in contents.lines() {
            if let Some(captures) = pin_pattern.captures(line) {
                metadata.record(&parts, &captures[1], &captures[2]);
            }
        }
        true
    }
}

/// Read every CI requirements snapshot in `dir` into a collector.
///
/// Entries are visited in sorted name order so diagnostics are stable; the
/// aggregation itself is order-independent. Unclassified names are skipped;
/// an unreadable classified file is fatal.
pub fn collect_directory(dir: &Path) -> Result<RequirementsCollector, LkgError> {
    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();

    let mut collector = RequirementsCollector::new();
    for name in names {
        if classify_filename(&name).is_none() {
            debug!(file = %name, "skipping unclassified file");
            continue;
        }
        let contents = fs::read_to_string(dir.join(&name))?;
        collector.ingest_file(&name, &contents);
        debug!(file = %name, "collected");
    }
    Ok(collector)
}
