//! Command implementations

mod check;
mod run;

use std::path::Path;

use organise_core::RuleDocument;

use crate::error::Result;

pub use check::run_check;
pub use run::run_organise;

/// Load a rule document and apply `--var` overrides on top of it.
fn load_document(config: &Path, vars: &[(String, String)]) -> Result<RuleDocument> {
    let mut document = RuleDocument::load(config)?;
    for (name, value) in vars {
        tracing::debug!(%name, %value, "Variable override");
        document.set_variable(name.as_str(), value.as_str());
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use organise_core::ScalarValue;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_overrides_replace_document_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rules.yml");
        fs::write(&path, "RUNFOLDER_NAME: from-file\nfiles_to_organize: []\n").unwrap();

        let document = load_document(
            &path,
            &[
                ("RUNFOLDER_NAME".to_string(), "R1".to_string()),
                ("EXTRA".to_string(), "x".to_string()),
            ],
        )
        .unwrap();

        assert_eq!(
            document.variables.get("RUNFOLDER_NAME"),
            Some(&ScalarValue::String("R1".to_string()))
        );
        assert!(document.variables.contains_key("EXTRA"));
    }

    #[test]
    fn test_missing_config_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_document(&dir.path().join("nope.yml"), &[]).is_err());
    }
}
