//! Variable mapping with chained resolution
//!
//! Top-level entries of a rule document may reference each other:
//!
//! ```yaml
//! RUNFOLDERPATH: /proj/incoming
//! RUNFOLDER: <RUNFOLDERPATH>/<RUNFOLDER_NAME>
//! ORGANISED: <RUNFOLDER>/Projects
//! ```
//!
//! Resolution is a fixed point over the whole mapping, so the result does
//! not depend on the order the entries were declared in.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::template::{substitute_tokens, token_names};
use crate::{Error, Result};

/// Fully resolved token values. No value contains a `<NAME>` token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableMapping {
    values: BTreeMap<String, String>,
}

impl VariableMapping {
    /// Resolve raw definitions into a mapping.
    ///
    /// A later definition of the same name replaces an earlier one.
    ///
    /// # Errors
    ///
    /// [`Error::UnresolvedToken`] if a value references a name that is not
    /// defined, [`Error::CyclicVariable`] if definitions reference each
    /// other in a loop.
    pub fn resolve<I, K, V>(definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let raw: BTreeMap<String, String> = definitions
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        let mut resolved: BTreeMap<String, String> = BTreeMap::new();
        let mut pending = raw.clone();

        while !pending.is_empty() {
            let ready: Vec<String> = pending
                .iter()
                .filter(|(_, value)| {
                    token_names(value)
                        .iter()
                        .all(|token| resolved.contains_key(*token))
                })
                .map(|(name, _)| name.clone())
                .collect();

            if ready.is_empty() {
                return Err(diagnose(&raw, &pending));
            }

            for name in ready {
                if let Some(value) = pending.remove(&name) {
                    let value = substitute_tokens(&value, |token| {
                        resolved.get(token).map(String::as_str)
                    });
                    tracing::trace!(%name, %value, "Resolved variable");
                    resolved.insert(name, value);
                }
            }
        }

        Ok(Self { values: resolved })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Explain why no pending variable could make progress.
fn diagnose(raw: &BTreeMap<String, String>, pending: &BTreeMap<String, String>) -> Error {
    for value in pending.values() {
        if let Some(token) = token_names(value)
            .into_iter()
            .find(|token| !raw.contains_key(*token))
        {
            return Error::UnresolvedToken {
                token: format!("<{token}>"),
                template: value.clone(),
            };
        }
    }

    // Every outstanding reference points at another pending variable:
    // follow references until a name repeats.
    let mut chain: Vec<String> = Vec::new();
    let mut current = pending.keys().next().cloned().unwrap_or_default();
    loop {
        if let Some(start) = chain.iter().position(|name| *name == current) {
            let mut names = chain.split_off(start);
            names.push(current);
            return Error::CyclicVariable { names };
        }
        let next = pending.get(&current).and_then(|value| {
            token_names(value)
                .into_iter()
                .find(|token| pending.contains_key(*token))
                .map(String::from)
        });
        chain.push(current);
        match next {
            Some(name) => current = name,
            None => return Error::CyclicVariable { names: chain },
        }
    }
}
