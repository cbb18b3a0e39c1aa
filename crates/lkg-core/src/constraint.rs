use std::collections::{BTreeMap, BTreeSet};

use crate::classify::Os;
use crate::version::PyVersion;
use crate::LkgError;

/// A marker expression plus whether it must be parenthesized when conjoined
/// with another constraint. "No constraint" is expressed as `Option::None`
/// at the call sites.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Constraint {
    pub text: String,
    pub needs_paren: bool,
}

impl Constraint {
    fn new(text: String, needs_paren: bool) -> Self {
        Self { text, needs_paren }
    }

    /// Render for use inside (`in_and`) or outside a conjunction.
    pub fn render(&self, in_and: bool) -> String {
        if self.needs_paren && in_and {
            format!("({})", self.text)
        } else {
            self.text.clone()
        }
    }
}

/// Minimal OS predicate for one python version.
///
/// `full` is the OS set recorded for that python version across the whole
/// matrix: matching it means no restriction is needed at all.
pub fn os_constraint(observed: &BTreeSet<Os>, full: &BTreeSet<Os>) -> Option<Constraint> {
    if observed == full {
        return None;
    }
    let checks: Vec<String> = observed
        .iter()
        .map(|os| format!("platform_system=='{}'", os.platform_system()))
        .collect();
    match checks.as_slice() {
        [] => None,
        [only] => Some(Constraint::new(only.clone(), false)),
        _ => Some(Constraint::new(format!("({})", checks.join(" or ")), true)),
    }
}

/// Minimal python-version predicate for a contiguous subset of the domain.
///
/// The subset's indices in the sorted domain must form an unbroken run;
/// a gap means the upstream observations are inconsistent and the run must
/// abort rather than emit a wrong constraint.
pub fn version_range(
    versions: &BTreeSet<PyVersion>,
    domain: &BTreeSet<PyVersion>,
) -> Result<Option<Constraint>, LkgError> {
    let sorted: Vec<PyVersion> = domain.iter().copied().collect();
    let index_of: BTreeMap<PyVersion, usize> =
        sorted.iter().enumerate().map(|(i, v)| (*v, i)).collect();

    let mut indices = Vec::with_capacity(versions.len());
    for version in versions {
        match index_of.get(version) {
            Some(index) => indices.push(*index),
            None => return Err(non_contiguous(versions, domain)),
        }
    }
    let (Some(&first), Some(&last)) = (indices.first(), indices.last()) else {
        return Ok(None);
    };
    if indices.len() != last - first + 1 {
        return Err(non_contiguous(versions, domain));
    }

    let spans_min = first == 0;
    let spans_max = last == sorted.len() - 1;
    let lo = sorted[first];
    let hi = sorted[last];

    let constraint = if spans_min && spans_max {
        None
    } else if spans_min {
        Some(Constraint::new(format!("python_version<='{hi}'"), false))
    } else if spans_max {
        Some(Constraint::new(format!("'{lo}'<=python_version"), false))
    } else if first == last {
        Some(Constraint::new(format!("python_version=='{lo}'"), false))
    } else {
        Some(Constraint::new(
            format!("'{lo}'<=python_version and python_version<='{hi}'"),
            true,
        ))
    };
    Ok(constraint)
}

fn non_contiguous(versions: &BTreeSet<PyVersion>, domain: &BTreeSet<PyVersion>) -> LkgError {
    LkgError::NonContiguousVersions {
        versions: join_versions(versions),
        domain: join_versions(domain),
    }
}

fn join_versions(versions: &BTreeSet<PyVersion>) -> String {
    versions
        .iter()
        .map(PyVersion::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Conjoin the OS and python-version predicates. The python-version side
/// leads; each side is parenthesized only when its own flag asks for it.
pub fn combine(os: Option<&Constraint>, py: Option<&Constraint>) -> Option<String> {
    match (os, py) {
        (None, None) => None,
        (None, Some(py)) => Some(py.render(false)),
        (Some(os), None) => Some(os.render(false)),
        (Some(os), Some(py)) => Some(format!("{} and {}", py.render(true), os.render(true))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oses(values: &[Os]) -> BTreeSet<Os> {
        values.iter().copied().collect()
    }

    fn versions(values: &[(u32, u32)]) -> BTreeSet<PyVersion> {
        values
            .iter()
            .map(|(major, minor)| PyVersion::new(*major, *minor))
            .collect()
    }

    #[test]
    fn full_os_coverage_needs_no_constraint() {
        let full = oses(&[Os::Macos, Os::Ubuntu, Os::Windows]);
        assert_eq!(os_constraint(&full, &full), None);
    }

    #[test]
    fn single_os_becomes_an_equality_check() {
        let full = oses(&[Os::Macos, Os::Ubuntu, Os::Windows]);
        let constraint = os_constraint(&oses(&[Os::Ubuntu]), &full).expect("constrained");
        assert_eq!(constraint.text, "platform_system=='Linux'");
        assert!(!constraint.needs_paren);
    }

    #[test]
    fn several_oses_become_a_parenthesized_disjunction() {
        let full = oses(&[Os::Macos, Os::Ubuntu, Os::Windows]);
        let constraint = os_constraint(&oses(&[Os::Windows, Os::Macos]), &full).expect("or");
        assert_eq!(
            constraint.text,
            "(platform_system=='Darwin' or platform_system=='Windows')"
        );
        assert!(constraint.needs_paren);
    }

    #[test]
    fn range_covering_the_domain_needs_no_constraint() {
        let domain = versions(&[(3, 7), (3, 8), (3, 9)]);
        assert_eq!(version_range(&domain, &domain).expect("ok"), None);
    }

    #[test]
    fn edge_runs_get_one_sided_bounds() {
        let domain = versions(&[(3, 7), (3, 8), (3, 9), (3, 10)]);

        let upper = version_range(&versions(&[(3, 7), (3, 8)]), &domain)
            .expect("ok")
            .expect("constrained");
        assert_eq!(upper.text, "python_version<='3.8'");
        assert!(!upper.needs_paren);

        let lower = version_range(&versions(&[(3, 9), (3, 10)]), &domain)
            .expect("ok")
            .expect("constrained");
        assert_eq!(lower.text, "'3.9'<=python_version");
        assert!(!lower.needs_paren);
    }

    #[test]
    fn interior_singleton_gets_an_equality() {
        let domain = versions(&[(3, 7), (3, 8), (3, 9)]);
        let constraint = version_range(&versions(&[(3, 8)]), &domain)
            .expect("ok")
            .expect("constrained");
        assert_eq!(constraint.text, "python_version=='3.8'");
    }

    #[test]
    fn interior_run_gets_a_two_sided_range() {
        let domain = versions(&[(3, 7), (3, 8), (3, 9), (3, 10)]);
        let constraint = version_range(&versions(&[(3, 8), (3, 9)]), &domain)
            .expect("ok")
            .expect("constrained");
        assert_eq!(
            constraint.text,
            "'3.8'<=python_version and python_version<='3.9'"
        );
        assert!(constraint.needs_paren);
    }

    #[test]
    fn gapped_subset_is_fatal() {
        let domain = versions(&[(3, 7), (3, 8), (3, 9)]);
        let result = version_range(&versions(&[(3, 7), (3, 9)]), &domain);
        assert!(matches!(
            result,
            Err(LkgError::NonContiguousVersions { .. })
        ));
    }

    #[test]
    fn subset_outside_the_domain_is_fatal() {
        let domain = versions(&[(3, 8), (3, 9)]);
        let result = version_range(&versions(&[(3, 10)]), &domain);
        assert!(result.is_err());
    }

    #[test]
    fn combine_orders_version_before_os_and_parenthesizes_as_flagged() {
        let os = Constraint::new(
            "(platform_system=='Darwin' or platform_system=='Linux')".to_string(),
            true,
        );
        let py = Constraint::new(
            "'3.8'<=python_version and python_version<='3.9'".to_string(),
            true,
        );
        let single_os = Constraint::new("platform_system=='Linux'".to_string(), false);
        let single_py = Constraint::new("python_version=='3.9'".to_string(), false);

        assert_eq!(combine(None, None), None);
        assert_eq!(
            combine(None, Some(&py)).expect("py only"),
            "'3.8'<=python_version and python_version<='3.9'"
        );
        assert_eq!(
            combine(Some(&single_os), None).expect("os only"),
            "platform_system=='Linux'"
        );
        assert_eq!(
            combine(Some(&single_os), Some(&single_py)).expect("both"),
            "python_version=='3.9' and platform_system=='Linux'"
        );
        assert_eq!(
            combine(Some(&os), Some(&py)).expect("both parenthesized"),
            "('3.8'<=python_version and python_version<='3.9') and (platform_system=='Darwin' or platform_system=='Linux')"
        );
    }
}
