//! Rule matching
//!
//! A rule's regexp is searched (not anchored) against the full candidate
//! path, rendered with `/` separators. Named groups become a [`CaptureMap`]
//! that is handed to the templater by value.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use fancy_regex::Regex;
use organise_fs::NormalizedPath;
use serde::Serialize;

use crate::template::BACKREF_PATTERN;
use crate::{Error, Result};

/// Named group values captured from one candidate path.
///
/// Groups that did not participate in the match are absent, never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CaptureMap(BTreeMap<String, String>);

impl CaptureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CaptureMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A compiled rule regexp.
///
/// Rule files use Python-style named backreferences (`(?P=name)`) inside
/// their patterns; these are rewritten to `\k<name>` before compiling.
#[derive(Debug, Clone)]
pub struct RuleMatcher {
    regex: Option<Regex>,
    pattern: String,
    groups: BTreeSet<String>,
}

impl RuleMatcher {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegex`] if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        let translated = BACKREF_PATTERN.replace_all(pattern, r"\k<${1}>");
        let regex = Regex::new(&translated).map_err(|e| Error::InvalidRegex {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        let groups = regex.capture_names().flatten().map(String::from).collect();

        Ok(Self {
            regex: Some(regex),
            pattern: pattern.to_string(),
            groups,
        })
    }

    /// A matcher that accepts every candidate and captures nothing.
    pub fn any() -> Self {
        Self {
            regex: None,
            pattern: String::new(),
            groups: BTreeSet::new(),
        }
    }

    /// The source pattern, or `None` for [`RuleMatcher::any`].
    pub fn pattern(&self) -> Option<&str> {
        self.regex.as_ref().map(|_| self.pattern.as_str())
    }

    /// Whether the pattern declares a group called `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.groups.contains(name)
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    /// Search `candidate` and return its captures, or `None` if the pattern
    /// does not occur in the path.
    pub fn find(&self, candidate: &Path) -> Result<Option<CaptureMap>> {
        let Some(regex) = &self.regex else {
            return Ok(Some(CaptureMap::new()));
        };

        let subject = NormalizedPath::new(candidate);
        let captures = regex
            .captures(subject.as_str())
            .map_err(|e| Error::RegexExecution {
                pattern: self.pattern.clone(),
                path: candidate.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(captures.map(|caps| {
            self.groups
                .iter()
                .filter_map(|name| caps.name(name).map(|m| (name.clone(), m.as_str().to_string())))
                .collect()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const FASTQ: &str = r"(?P<projectid>[\w-]+)/Sample_(?P<samplename>[\w-]+)/(?P=samplename)_S(?P<samplenumber>\d+)_L(?P<lanes>\d+)_R(?P<read>\d)_001.fastq.gz";

    #[test]
    fn test_fastq_captures() {
        let matcher = RuleMatcher::new(FASTQ).unwrap();
        let captures = matcher
            .find(Path::new("/runs/R1/Unaligned/ProjectA/Sample_S1/S1_S1_L001_R1_001.fastq.gz"))
            .unwrap()
            .unwrap();

        assert_eq!(captures.get("projectid"), Some("ProjectA"));
        assert_eq!(captures.get("samplename"), Some("S1"));
        assert_eq!(captures.get("samplenumber"), Some("1"));
        assert_eq!(captures.get("lanes"), Some("001"));
        assert_eq!(captures.get("read"), Some("1"));
    }

    #[test]
    fn test_backreference_must_repeat_capture() {
        let matcher = RuleMatcher::new(FASTQ).unwrap();
        let result = matcher
            .find(Path::new("ProjectA/Sample_S1/S2_S1_L001_R1_001.fastq.gz"))
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_no_match_is_none_not_error() {
        let matcher = RuleMatcher::new(FASTQ).unwrap();
        let result = matcher.find(Path::new("ProjectA/Sample_S1/S1.txt")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_unmatched_optional_group_is_absent() {
        let matcher = RuleMatcher::new(r"(?P<name>\w+)(?:\.(?P<ext>gz))?$").unwrap();
        let captures = matcher.find(Path::new("dir/report")).unwrap().unwrap();

        assert_eq!(captures.get("name"), Some("report"));
        assert_eq!(captures.get("ext"), None);
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn test_any_matches_everything() {
        let matcher = RuleMatcher::any();
        let captures = matcher.find(Path::new("whatever")).unwrap();
        assert_eq!(captures, Some(CaptureMap::new()));
        assert_eq!(matcher.pattern(), None);
    }

    #[test]
    fn test_declared_groups() {
        let matcher = RuleMatcher::new(FASTQ).unwrap();
        assert!(matcher.declares("projectid"));
        assert!(!matcher.declares("lane"));
        assert_eq!(matcher.groups().count(), 5);
    }

    #[test]
    fn test_invalid_pattern_is_error() {
        assert!(matches!(
            RuleMatcher::new("(?P<unclosed"),
            Err(Error::InvalidRegex { .. })
        ));
    }
}
