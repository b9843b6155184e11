use organise_fs::glob;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn tree() -> TempDir {
    let temp = TempDir::new().unwrap();
    for rel in [
        "Unaligned/ProjA/Sample_S1/S1_S1_L001_R1_001.fastq.gz",
        "Unaligned/ProjA/Sample_S1/S1_S1_L001_R2_001.fastq.gz",
        "Unaligned/ProjB/Sample_S2/S2_S2_L001_R1_001.fastq.gz",
        "Unaligned/ProjB/.hidden/file",
        "Unaligned/stray.txt",
    ] {
        let path = temp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }
    temp
}

#[rstest]
#[case("Unaligned/*/*/*", 3)]
#[case("Unaligned/*", 3)]
#[case("Unaligned/**/*.fastq.gz", 3)]
#[case("Unaligned/ProjA/Sample_S1/*_R1_*", 1)]
#[case("Unaligned/ProjC/*", 0)]
fn test_expand_counts(#[case] pattern: &str, #[case] expected: usize) {
    let temp = tree();
    let expansion = glob::expand(temp.path(), pattern).unwrap();
    assert_eq!(expansion.paths.len(), expected, "pattern {pattern}");
}

#[test]
fn test_expand_is_sorted_and_anchored() {
    let temp = tree();
    let expansion = glob::expand(temp.path(), "Unaligned/*/*/*").unwrap();

    let relative: Vec<PathBuf> = expansion
        .paths
        .iter()
        .map(|p| p.strip_prefix(temp.path()).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        relative,
        vec![
            PathBuf::from("Unaligned/ProjA/Sample_S1/S1_S1_L001_R1_001.fastq.gz"),
            PathBuf::from("Unaligned/ProjA/Sample_S1/S1_S1_L001_R2_001.fastq.gz"),
            PathBuf::from("Unaligned/ProjB/Sample_S2/S2_S2_L001_R1_001.fastq.gz"),
        ]
    );
    assert!(expansion.root_exists);
    assert!(expansion.errors.is_empty());
}

#[test]
fn test_expand_missing_root_is_empty_not_error() {
    let temp = tree();
    let expansion = glob::expand(temp.path(), "seqreports/project/*/*").unwrap();

    assert!(expansion.is_empty());
    assert!(!expansion.root_exists);
    assert_eq!(expansion.literal_root, temp.path().join("seqreports/project"));
}

#[test]
fn test_expand_absolute_pattern_ignores_root() {
    let temp = tree();
    let pattern = format!("{}/Unaligned/*.txt", temp.path().display());
    let expansion = glob::expand(&PathBuf::from("/does/not/matter"), &pattern).unwrap();

    assert_eq!(expansion.paths, vec![temp.path().join("Unaligned/stray.txt")]);
}

#[test]
fn test_expand_invalid_pattern_is_error() {
    let temp = tree();
    let result = glob::expand(temp.path(), "Unaligned/[*");
    assert!(matches!(result, Err(organise_fs::Error::InvalidGlob { .. })));
}
