use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::classify::Os;
use crate::collect::VersionObservations;
use crate::version::{compare_versions, PyVersion};

/// An environment a CI job ran under. Job type is deliberately absent:
/// parallel job types of the same environment must agree on a pin.
type EnvKey = (PyVersion, Os);

/// Resolve packages pinned to different versions under the same environment.
///
/// The lowest version (PEP 440 order) keeps the environment; every other
/// version loses exactly the observations for that environment. Builds a
/// fresh mapping rather than mutating in place, and drops versions whose
/// observation set ends up empty. One warning per conflicting environment.
pub fn resolve_conflicts(package: &str, observations: &VersionObservations) -> VersionObservations {
    let mut by_env: BTreeMap<EnvKey, BTreeSet<&str>> = BTreeMap::new();
    for (version, parts_set) in observations {
        for parts in parts_set {
            by_env
                .entry((parts.py_version, parts.os))
                .or_default()
                .insert(version.as_str());
        }
    }

    let mut keep: BTreeMap<EnvKey, &str> = BTreeMap::new();
    for ((py_version, os), versions) in &by_env {
        if versions.len() < 2 {
            continue;
        }
        let Some(lowest) = versions
            .iter()
            .copied()
            .min_by(|left, right| compare_versions(left, right))
        else {
            continue;
        };
        warn!(
            package,
            os = os.as_str(),
            python_version = %py_version,
            versions = ?versions,
            keeping = lowest,
            "multiple package versions for one environment; defaulting to lowest",
        );
        keep.insert((*py_version, *os), lowest);
    }

    if keep.is_empty() {
        return observations.clone();
    }

    let mut resolved = VersionObservations::new();
    for (version, parts_set) in observations {
        let kept: BTreeSet<_> = parts_set
            .iter()
            .filter(|parts| match keep.get(&(parts.py_version, parts.os)) {
                Some(winner) => *winner == version.as_str(),
                None => true,
            })
            .cloned()
            .collect();
        if !kept.is_empty() {
            resolved.insert(version.clone(), kept);
        }
    }
    resolved
}
