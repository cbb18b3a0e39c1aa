//! Version ordering for CI python versions and pinned package versions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Python interpreter version as it appears in CI job names ("3.8", "3.10").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PyVersion {
    pub major: u32,
    pub minor: u32,
}

impl PyVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for PyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for PyVersion {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (major, minor) = input
            .trim()
            .split_once('.')
            .ok_or_else(|| format!("invalid python version: {input}"))?;
        let major = major
            .parse()
            .map_err(|_| format!("invalid python version: {input}"))?;
        let minor = minor
            .parse()
            .map_err(|_| format!("invalid python version: {input}"))?;
        Ok(Self { major, minor })
    }
}

/// Release phase of a package version. Variant order is the PEP 440 order:
/// dev < alpha < beta < rc < final < post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Phase {
    Dev(u64),
    Alpha(u64),
    Beta(u64),
    Rc(u64),
    Release,
    Post(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VersionKey {
    epoch: u64,
    release: Vec<u64>,
    phase: Phase,
}

impl VersionKey {
    /// Release segments compare with zero padding, so "1.0" == "1.0.0".
    fn cmp_key(&self, other: &Self) -> Ordering {
        if self.epoch != other.epoch {
            return self.epoch.cmp(&other.epoch);
        }
        let len = self.release.len().max(other.release.len());
        for i in 0..len {
            let left = self.release.get(i).copied().unwrap_or(0);
            let right = other.release.get(i).copied().unwrap_or(0);
            if left != right {
                return left.cmp(&right);
            }
        }
        self.phase.cmp(&other.phase)
    }
}

fn parse_key(raw: &str) -> Option<VersionKey> {
    let mut text = raw.trim().to_lowercase();

    // local version segment does not participate in ordering here
    if let Some(plus) = text.find('+') {
        text.truncate(plus);
    }

    let (epoch, rest) = match text.split_once('!') {
        Some((epoch, rest)) => (epoch.parse().ok()?, rest.to_string()),
        None => (0, text),
    };

    let mut release = Vec::new();
    let mut chars = rest.char_indices().peekable();
    let mut suffix_start = rest.len();
    loop {
        let mut digits = String::new();
        while let Some((_, c)) = chars.peek() {
            if c.is_ascii_digit() {
                digits.push(*c);
                chars.next();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return None;
        }
        release.push(digits.parse().ok()?);
        match chars.peek() {
            Some((idx, '.')) => {
                let after_dot = idx + 1;
                chars.next();
                if !matches!(chars.peek(), Some((_, c)) if c.is_ascii_digit()) {
                    suffix_start = after_dot;
                    break;
                }
            }
            Some((idx, _)) => {
                suffix_start = *idx;
                break;
            }
            None => break,
        }
    }

    let phase = parse_phase(rest[suffix_start..].trim_start_matches(['-', '_']))?;
    Some(VersionKey {
        epoch,
        release,
        phase,
    })
}

fn parse_phase(suffix: &str) -> Option<Phase> {
    if suffix.is_empty() {
        return Some(Phase::Release);
    }
    let (label, number) = split_phase_suffix(suffix)?;
    match label {
        "dev" => Some(Phase::Dev(number)),
        "a" | "alpha" => Some(Phase::Alpha(number)),
        "b" | "beta" => Some(Phase::Beta(number)),
        "c" | "rc" | "pre" | "preview" => Some(Phase::Rc(number)),
        "post" | "r" | "rev" => Some(Phase::Post(number)),
        _ => None,
    }
}

fn split_phase_suffix(suffix: &str) -> Option<(&str, u64)> {
    let digits_at = suffix
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(suffix.len());
    let label = suffix[..digits_at].trim_end_matches(['.', '-', '_']);
    let number = if digits_at == suffix.len() {
        0
    } else {
        suffix[digits_at..].parse().ok()?
    };
    Some((label, number))
}

/// PEP 440-flavored total order over raw version strings.
///
/// Parseable versions order by (epoch, release, phase); a parseable version
/// ranks above an unparseable one, and two unparseable strings fall back to
/// lexicographic order. Distinct raw strings never compare equal, so picking
/// a minimum is deterministic.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (parse_key(a), parse_key(b)) {
        (Some(ka), Some(kb)) => ka.cmp_key(&kb).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}
