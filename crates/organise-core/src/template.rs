//! Path templating
//!
//! Two placeholder syntaxes appear in rule documents:
//!
//! - `<NAME>` tokens, resolved from the [`VariableMapping`]
//! - `(?P=name)` backreferences, resolved from a match's [`CaptureMap`]
//!
//! Regex group declarations such as `(?P<name>...)` look like tokens but are
//! left alone, so rule regexps can be templated with the same machinery.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::matcher::CaptureMap;
use crate::variables::VariableMapping;
use crate::{Error, Result};

/// Upper bound on token substitution passes before giving up.
pub const MAX_PASSES: usize = 32;

/// Group 1 is set when the `<NAME>` is a regex group declaration.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\(\?P?)?<([A-Za-z_][A-Za-z0-9_]*)>").unwrap());

pub(crate) static BACKREF_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\?P=([A-Za-z_][A-Za-z0-9_]*)\)").unwrap());

/// Names of the `<NAME>` tokens in `text`.
pub fn token_names(text: &str) -> BTreeSet<&str> {
    TOKEN_PATTERN
        .captures_iter(text)
        .filter(|caps| caps.get(1).is_none())
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str())
        .collect()
}

/// Names of the `(?P=name)` backreferences in `text`.
pub fn backreference_names(text: &str) -> BTreeSet<&str> {
    BACKREF_PATTERN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Replace every `<NAME>` token that `lookup` knows. Unknown tokens and
/// group declarations are kept verbatim.
pub fn substitute_tokens<'a>(text: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    TOKEN_PATTERN
        .replace_all(text, |caps: &Captures| {
            if caps.get(1).is_some() {
                return caps[0].to_string();
            }
            match lookup(&caps[2]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Resolves templates against a fixed variable mapping.
#[derive(Debug, Clone, Copy)]
pub struct Templater<'a> {
    variables: &'a VariableMapping,
}

impl<'a> Templater<'a> {
    pub fn new(variables: &'a VariableMapping) -> Self {
        Self { variables }
    }

    /// Resolve `<NAME>` tokens to a fixed point. Backreferences are left in
    /// place.
    ///
    /// # Errors
    ///
    /// [`Error::UnresolvedToken`] if a token remains once nothing changes,
    /// [`Error::CyclicVariable`] if the text is still changing after
    /// [`MAX_PASSES`].
    pub fn resolve(&self, template: &str) -> Result<String> {
        let mut current = template.to_string();
        for _ in 0..MAX_PASSES {
            let next = substitute_tokens(&current, |name| self.variables.get(name));
            if next == current {
                let unresolved = token_names(&current).into_iter().next().map(String::from);
                return match unresolved {
                    Some(token) => Err(Error::UnresolvedToken {
                        token: format!("<{token}>"),
                        template: template.to_string(),
                    }),
                    None => Ok(current),
                };
            }
            current = next;
        }
        Err(Error::CyclicVariable {
            names: token_names(&current).into_iter().map(String::from).collect(),
        })
    }

    /// Resolve tokens, then substitute backreferences from `captures`.
    ///
    /// Backreferences are substituted once, after tokens settle, so text
    /// captured from a path is never read as a token.
    pub fn resolve_with(&self, template: &str, captures: &CaptureMap) -> Result<String> {
        let resolved = self.resolve(template)?;

        let mut missing = None;
        let substituted = BACKREF_PATTERN
            .replace_all(&resolved, |caps: &Captures| match captures.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => {
                    missing.get_or_insert_with(|| caps[0].to_string());
                    String::new()
                }
            })
            .into_owned();

        match missing {
            Some(token) => Err(Error::UnresolvedToken {
                token,
                template: template.to_string(),
            }),
            None => Ok(substituted),
        }
    }
}
