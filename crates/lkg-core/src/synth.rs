use std::collections::{BTreeMap, BTreeSet};

use crate::classify::Os;
use crate::collect::CollectionMetadata;
use crate::constraint::{combine, os_constraint, version_range, Constraint};
use crate::resolve::resolve_conflicts;
use crate::version::PyVersion;
use crate::LkgError;

/// One pinned requirement with its (optional) marker expression.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequirementLine {
    pub package: String,
    pub version: String,
    pub marker: Option<String>,
}

/// Turn collected observations into constrained requirement lines.
///
/// Per package and surviving version: group observations by python version,
/// derive each python version's OS predicate, merge python versions sharing
/// an identical predicate, and range-infer each merged group. A version
/// yields one line per predicate group; the groups partition its python
/// versions, so the emitted lines cover disjoint environments.
pub fn synthesize(metadata: &CollectionMetadata) -> Result<Vec<RequirementLine>, LkgError> {
    let mut lines = Vec::new();
    let empty_oses = BTreeSet::new();

    for (package, observations) in &metadata.reqs {
        let resolved = resolve_conflicts(package, observations);
        for (version, parts_set) in &resolved {
            let mut py_version_map: BTreeMap<PyVersion, BTreeSet<Os>> = BTreeMap::new();
            for parts in parts_set {
                py_version_map
                    .entry(parts.py_version)
                    .or_default()
                    .insert(parts.os);
            }

            let mut predicate_groups: BTreeMap<Option<Constraint>, BTreeSet<PyVersion>> =
                BTreeMap::new();
            for (py_version, observed_oses) in &py_version_map {
                let full_oses = metadata
                    .py_version_oses
                    .get(py_version)
                    .unwrap_or(&empty_oses);
                predicate_groups
                    .entry(os_constraint(observed_oses, full_oses))
                    .or_default()
                    .insert(*py_version);
            }

            for (predicate, py_versions) in &predicate_groups {
                let range = version_range(py_versions, &metadata.all_py_versions)?;
                lines.push(RequirementLine {
                    package: package.clone(),
                    version: version.clone(),
                    marker: combine(predicate.as_ref(), range.as_ref()),
                });
            }
        }
    }
    Ok(lines)
}
