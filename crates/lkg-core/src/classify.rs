use std::fmt;

use regex::Regex;

use crate::version::PyVersion;

/// CI matrix operating systems. Variant order fixes the order of OS
/// predicates inside a disjunction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Os {
    Macos,
    Ubuntu,
    Windows,
}

impl Os {
    /// Token used in CI job and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Macos => "macos",
            Os::Ubuntu => "ubuntu",
            Os::Windows => "windows",
        }
    }

    /// Value `platform_system` reports for this OS in marker expressions.
    pub fn platform_system(&self) -> &'static str {
        match self {
            Os::Macos => "Darwin",
            Os::Ubuntu => "Linux",
            Os::Windows => "Windows",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "macos" => Some(Os::Macos),
            "ubuntu" => Some(Os::Ubuntu),
            "windows" => Some(Os::Windows),
            _ => None,
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two output files a classified file feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobKind {
    Tests,
    Notebooks,
}

/// The (os, python version, job type) triple encoded in a CI requirements
/// filename. Structural equality; usable as an ordered-set member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileParts {
    pub os: Os,
    pub py_version: PyVersion,
    pub job_type: String,
}

/// Classify a CI-generated requirements filename.
///
/// Test jobs are named `tests-{os}-latest-{major.minor}-{jobtype}-requirements.txt`
/// and notebook jobs `notebooks-{jobtype}-{major.minor}-requirements.txt`;
/// notebook jobs all run on ubuntu, so that OS is fixed. Anything else is
/// not ours and yields `None`.
pub fn classify_filename(filename: &str) -> Option<(JobKind, FileParts)> {
    let test_pattern = Regex::new(
        r"^tests-(macos|ubuntu|windows)-latest-(3\.\d+)-([^-]+)-requirements\.txt$",
    )
    .expect("valid regex");
    let notebook_pattern =
        Regex::new(r"^notebooks-(.*)-(3\.\d+)-requirements\.txt$").expect("valid regex");

    if let Some(captures) = test_pattern.captures(filename) {
        let parts = FileParts {
            os: Os::from_token(&captures[1])?,
            py_version: captures[2].parse().ok()?,
            job_type: captures[3].to_string(),
        };
        return Some((JobKind::Tests, parts));
    }

    if let Some(captures) = notebook_pattern.captures(filename) {
        let parts = FileParts {
            os: Os::Ubuntu,
            py_version: captures[2].parse().ok()?,
            job_type: captures[1].to_string(),
        };
        return Some((JobKind::Notebooks, parts));
    }

    None
}
