//! Frontend dependency version parsing and ordering
//!
//! npm version fields are free-form: they can be exact versions, ranges,
//! tags, local paths or git references. Only the exact-version shapes are
//! comparable here; everything else is rejected so that the reconciler
//! leaves it alone.
//!
//! Accepted shapes:
//! - an optional single range prefix `^`, `~` or `=`, then an optional `v`
//! - `MAJOR[.MINOR[.PATCH]]`, missing components read as zero
//! - an optional pre-release suffix after `-` (anywhere) or `.` (after the
//!   patch number), e.g. `24.4.0-beta2` or `24.4.0.alpha1`
//! - build metadata after `+`, which is dropped

use crate::errors::VersionError;
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;
use std::str::FromStr;

/// A comparable frontend package version
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrontendVersion {
    version: Version,
}

impl FrontendVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        FrontendVersion {
            version: Version::new(major, minor, patch),
        }
    }

    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let fail = |reason| VersionError {
            input: input.to_string(),
            reason,
        };

        let trimmed = input.trim();
        let unprefixed = trimmed.strip_prefix(&['^', '~', '='][..]).unwrap_or(trimmed);
        let unprefixed = unprefixed.strip_prefix('v').unwrap_or(unprefixed);
        if !unprefixed.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(fail("must start with a digit"));
        }

        let without_build = unprefixed
            .split_once('+')
            .map_or(unprefixed, |(core, _)| core);

        let mut numbers = [0u64; 3];
        let mut components = 0;
        let mut rest = without_build;
        for slot in &mut numbers {
            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            *slot = rest[..digits]
                .parse()
                .map_err(|_| fail("version component out of range"))?;
            rest = &rest[digits..];
            components += 1;
            if components == 3 {
                break;
            }
            match rest.strip_prefix('.') {
                Some(next) if next.starts_with(|c: char| c.is_ascii_digit()) => rest = next,
                _ => break,
            }
        }

        let pre = if rest.is_empty() {
            Prerelease::EMPTY
        } else {
            let suffix = match (rest.as_bytes()[0], components) {
                (b'-', _) | (b'.', 3) => &rest[1..],
                _ => return Err(fail("unexpected text after version number")),
            };
            let normalized = normalize_prerelease(suffix).ok_or_else(|| fail("invalid pre-release"))?;
            Prerelease::new(&normalized).map_err(|_| fail("invalid pre-release"))?
        };

        let [major, minor, patch] = numbers;
        Ok(FrontendVersion {
            version: Version {
                major,
                minor,
                patch,
                pre,
                build: BuildMetadata::EMPTY,
            },
        })
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }

    #[inline]
    pub fn is_newer_than(&self, other: &FrontendVersion) -> bool {
        self > other
    }
}

/// Split `alpha12`-style identifiers into `alpha.12` so the numeric part
/// orders numerically, and strip leading zeros from numeric identifiers.
fn normalize_prerelease(suffix: &str) -> Option<String> {
    let mut parts = Vec::new();
    for ident in suffix.split('.') {
        if ident.is_empty() || matches!(ident, "x" | "X" | "*") {
            return None;
        }
        if ident.bytes().all(|b| b.is_ascii_digit()) {
            parts.push(ident.parse::<u64>().ok()?.to_string());
            continue;
        }
        match ident.find(|c: char| c.is_ascii_digit()) {
            Some(split)
                if split > 0
                    && ident[..split].bytes().all(|b| b.is_ascii_alphabetic())
                    && ident[split..].bytes().all(|b| b.is_ascii_digit()) =>
            {
                parts.push(ident[..split].to_string());
                parts.push(ident[split..].parse::<u64>().ok()?.to_string());
            }
            _ => parts.push(ident.to_string()),
        }
    }
    Some(parts.join("."))
}

impl FromStr for FrontendVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FrontendVersion::parse(s)
    }
}

impl fmt::Display for FrontendVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}
