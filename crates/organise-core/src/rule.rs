//! Rule documents and rules
//!
//! A rule document is the parsed form of an organisation config:
//!
//! ```yaml
//! RUNFOLDER: /proj/incoming/<RUNFOLDER_NAME>
//! ORGANISED: <RUNFOLDER>/Projects
//! files_to_organize:
//!   - source: <RUNFOLDER>/Unaligned/*/*/*
//!     destination: <ORGANISED>/(?P=projectid)/Sample_(?P=samplename)/
//!     options:
//!       required: true
//!       symlink: true
//!       regexp: (?P<projectid>[\w-]+)/Sample_(?P<samplename>[\w-]+)/
//! ```
//!
//! Top-level scalars become variables; `files_to_organize` holds the rules
//! in the order they are applied.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use organise_fs::ConfigStore;
use serde::{Deserialize, Serialize};

use crate::variables::VariableMapping;
use crate::{Error, Result};

/// What a rule does with each matched file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Symbolic link at the destination pointing at the source's absolute path
    Symlink,
    /// Copy of the source's contents
    #[default]
    Copy,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symlink => write!(f, "symlink"),
            Self::Copy => write!(f, "copy"),
        }
    }
}

/// Alternative spelling of the action, as used by older configs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Softlink,
    Copy,
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Softlink => write!(f, "softlink"),
            Self::Copy => write!(f, "copy"),
        }
    }
}

/// A top-level scalar. Numbers and booleans are kept as written by their
/// parser and stringified for templating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// The `options` block of a rule entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOptions {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symlink: Option<bool>,
    #[serde(default, alias = "filter", skip_serializing_if = "Option::is_none")]
    pub regexp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<LinkType>,
}

/// One entry of `files_to_organize`, as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub source: String,
    pub destination: String,
    #[serde(default)]
    pub options: RuleOptions,
}

impl RuleEntry {
    /// Validate the entry into a [`Rule`] at the given 1-based position.
    ///
    /// # Errors
    ///
    /// [`Error::AmbiguousOperation`] if `symlink` and `link_type` disagree.
    pub fn to_rule(&self, index: usize) -> Result<Rule> {
        let options = &self.options;
        let action = match (options.symlink, options.link_type) {
            (Some(symlink), Some(link_type)) => {
                if symlink != (link_type == LinkType::Softlink) {
                    return Err(Error::AmbiguousOperation {
                        index,
                        symlink,
                        link_type: link_type.to_string(),
                    });
                }
                link_type.into()
            }
            (Some(true), None) => Action::Symlink,
            (_, Some(link_type)) => link_type.into(),
            _ => Action::Copy,
        };

        Ok(Rule {
            index,
            source: self.source.clone(),
            destination: self.destination.clone(),
            regexp: options.regexp.clone(),
            required: options.required,
            action,
        })
    }
}

impl From<LinkType> for Action {
    fn from(link_type: LinkType) -> Self {
        match link_type {
            LinkType::Softlink => Action::Symlink,
            LinkType::Copy => Action::Copy,
        }
    }
}

/// A parsed rule document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(rename = "files_to_organize", alias = "files_to_organise", default)]
    pub entries: Vec<RuleEntry>,
    #[serde(flatten)]
    pub variables: BTreeMap<String, ScalarValue>,
}

impl RuleDocument {
    /// Load a document, picking the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let document: Self = ConfigStore::new().load(path)?;
        tracing::debug!(
            path = %path.display(),
            variables = document.variables.len(),
            rules = document.entries.len(),
            "Loaded rule document"
        );
        Ok(document)
    }

    /// Add or override a top-level variable before resolution.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables
            .insert(name.into(), ScalarValue::String(value.into()));
    }

    /// Resolve the top-level scalars into a [`VariableMapping`].
    pub fn variable_mapping(&self) -> Result<VariableMapping> {
        VariableMapping::resolve(
            self.variables
                .iter()
                .map(|(name, value)| (name.clone(), value.to_string())),
        )
    }

    /// Validate every entry into a [`Rule`], numbered from 1.
    pub fn rules(&self) -> Result<Vec<Rule>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.to_rule(i + 1))
            .collect()
    }
}

/// A validated rule. Templates are unresolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    /// 1-based position in the document
    pub index: usize,
    pub source: String,
    pub destination: String,
    pub regexp: Option<String>,
    pub required: bool,
    pub action: Action,
}

impl Rule {
    /// An optional copy rule with no regexp.
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            index: 1,
            source: source.into(),
            destination: destination.into(),
            regexp: None,
            required: false,
            action: Action::Copy,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn with_regexp(mut self, regexp: impl Into<String>) -> Self {
        self.regexp = Some(regexp.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn symlink(mut self, symlink: bool) -> Self {
        self.action = if symlink { Action::Symlink } else { Action::Copy };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn parse(yaml: &str) -> RuleDocument {
        ConfigStore::new()
            .parse(yaml, "yml", Path::new("test.yml"))
            .unwrap()
    }

    #[test]
    fn test_parse_document() {
        let doc = parse(
            r#"
RUNFOLDER: /runs/<RUNFOLDER_NAME>
RUNFOLDER_NAME: R1
LANES: 4
files_to_organize:
  - source: <RUNFOLDER>/Unaligned/*/*/*
    destination: <RUNFOLDER>/Projects/(?P=projectid)/
    options:
      required: true
      symlink: true
      regexp: '(?P<projectid>[\w-]+)/Sample_'
  - source: <RUNFOLDER>/seqreports/*
    destination: <RUNFOLDER>/reports/
"#,
        );

        assert_eq!(doc.entries.len(), 2);
        assert_eq!(doc.variables.get("LANES"), Some(&ScalarValue::Integer(4)));

        let rules = doc.rules().unwrap();
        assert_eq!(rules[0].index, 1);
        assert_eq!(rules[0].action, Action::Symlink);
        assert!(rules[0].required);
        assert_eq!(rules[0].regexp.as_deref(), Some(r"(?P<projectid>[\w-]+)/Sample_"));
        assert_eq!(rules[1].index, 2);
        assert_eq!(rules[1].action, Action::Copy);
        assert!(!rules[1].required);

        let vars = doc.variable_mapping().unwrap();
        assert_eq!(vars.get("RUNFOLDER"), Some("/runs/R1"));
        assert_eq!(vars.get("LANES"), Some("4"));
    }

    #[test]
    fn test_british_spelling_and_legacy_keys() {
        let doc = parse(
            r#"
files_to_organise:
  - source: /a/*
    destination: /b/
    options:
      link_type: softlink
      filter: '(?P<x>\w+)'
"#,
        );
        let rules = doc.rules().unwrap();
        assert_eq!(rules[0].action, Action::Symlink);
        assert_eq!(rules[0].regexp.as_deref(), Some(r"(?P<x>\w+)"));
    }

    #[test]
    fn test_contradictory_action_is_ambiguous() {
        let doc = parse(
            r#"
files_to_organize:
  - source: /a/*
    destination: /b/
    options:
      symlink: true
      link_type: copy
"#,
        );
        assert!(matches!(
            doc.rules(),
            Err(Error::AmbiguousOperation { index: 1, symlink: true, .. })
        ));
    }

    #[rstest]
    #[case(None, None, Action::Copy)]
    #[case(Some(true), None, Action::Symlink)]
    #[case(Some(false), None, Action::Copy)]
    #[case(None, Some(LinkType::Softlink), Action::Symlink)]
    #[case(None, Some(LinkType::Copy), Action::Copy)]
    #[case(Some(true), Some(LinkType::Softlink), Action::Symlink)]
    #[case(Some(false), Some(LinkType::Copy), Action::Copy)]
    fn test_action_resolution(
        #[case] symlink: Option<bool>,
        #[case] link_type: Option<LinkType>,
        #[case] expected: Action,
    ) {
        let entry = RuleEntry {
            source: "/a".into(),
            destination: "/b".into(),
            options: RuleOptions {
                symlink,
                link_type,
                ..Default::default()
            },
        };
        assert_eq!(entry.to_rule(3).unwrap().action, expected);
    }

    #[test]
    fn test_set_variable_overrides_document() {
        let mut doc = parse("RUNFOLDER_NAME: from-file\nRUNFOLDER: /runs/<RUNFOLDER_NAME>\n");
        doc.set_variable("RUNFOLDER_NAME", "from-cli");

        let vars = doc.variable_mapping().unwrap();
        assert_eq!(vars.get("RUNFOLDER"), Some("/runs/from-cli"));
    }

    #[test]
    fn test_missing_rules_key_is_empty() {
        let doc = parse("A: b\n");
        assert!(doc.entries.is_empty());
        assert!(doc.rules().unwrap().is_empty());
    }

    #[test]
    fn test_rule_builder() {
        let rule = Rule::new("/in/*", "/out/")
            .with_index(2)
            .with_regexp("(?P<x>.)")
            .required(true)
            .symlink(true);
        assert_eq!(rule.index, 2);
        assert_eq!(rule.action, Action::Symlink);
        assert!(rule.required);
    }
}
