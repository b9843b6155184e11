//! [`TestRunfolder`] builder for organisation scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Runfolder name used by default fixtures.
pub const RUNFOLDER_NAME: &str = "200624_A00834_0183_BHMTFYDRXX";

/// A rule document in the shape production configs use. Expects
/// `RUNFOLDERPATH` and `RUNFOLDER_NAME` to be supplied as overrides.
pub const RUNFOLDER_RULES: &str = r#"
RUNFOLDER: <RUNFOLDERPATH>/<RUNFOLDER_NAME>
ORGANISED: <RUNFOLDER>/Projects

files_to_organize:
  - source: <RUNFOLDER>/Unaligned/*/*/*
    destination: <ORGANISED>/(?P=projectid)/<RUNFOLDER_NAME>/Sample_(?P=samplename)/
    options:
      required: true
      symlink: true
      regexp: '(?P<projectid>[\w-]+)/Sample_(?P<samplename>[\w-]+)/(?P=samplename)_S(?P<samplenumber>\d+)_L(?P<lanes>\d+)_R(?P<read>\d)_001.fastq.gz'

  - source: <RUNFOLDER>/seqreports/project/*/*
    destination: <ORGANISED>/(?P=projectid)/<RUNFOLDER_NAME>/
    options:
      required: true
      symlink: true
      regexp: '(?P<projectid>[\w-]+)/<RUNFOLDER_NAME>_(?P=projectid)_multiqc_report[\w.-]+'

  - source: <RUNFOLDER>/Undetermined/*
    destination: <ORGANISED>/undetermined/
    options:
      required: false
      symlink: false
"#;

/// A temporary directory holding one runfolder.
///
/// # Example
///
/// ```rust,no_run
/// use organise_test_utils::TestRunfolder;
///
/// let run = TestRunfolder::new();
/// run.add_fastq("AB-1234", "AB-1234-14092", 35, 1, 1);
/// run.add_report("AB-1234");
/// run.assert_symlink("Projects/AB-1234");
/// ```
pub struct TestRunfolder {
    temp_dir: TempDir,
    name: String,
}

impl Default for TestRunfolder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunfolder {
    /// Create an empty runfolder named [`RUNFOLDER_NAME`].
    pub fn new() -> Self {
        Self::named(RUNFOLDER_NAME)
    }

    pub fn named(name: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join(name)).unwrap();
        Self {
            temp_dir,
            name: name.to_string(),
        }
    }

    /// The directory containing the runfolder (`RUNFOLDERPATH`).
    pub fn base(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The runfolder itself.
    pub fn path(&self) -> PathBuf {
        self.base().join(&self.name)
    }

    /// Write `content` at `relative` inside the runfolder, creating parents.
    pub fn add_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    /// Add a bcl2fastq-style fastq file under `Unaligned/`.
    pub fn add_fastq(&self, project: &str, sample: &str, number: u32, lane: u32, read: u32) -> PathBuf {
        let relative = format!(
            "Unaligned/{project}/Sample_{sample}/{sample}_S{number}_L{lane:03}_R{read}_001.fastq.gz"
        );
        self.add_file(&relative, &format!("@{sample} lane {lane} read {read}\n"))
    }

    /// Add a MultiQC report for `project` under `seqreports/project/`.
    pub fn add_report(&self, project: &str) -> PathBuf {
        let relative = format!(
            "seqreports/project/{project}/{}_{project}_multiqc_report.html",
            self.name
        );
        self.add_file(&relative, "<html></html>")
    }

    /// Write a rule document next to the runfolder and return its path.
    pub fn write_config(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.base().join(file_name);
        fs::write(&path, content).unwrap();
        path
    }

    /// Every entry under `relative` (inside the runfolder), relative to the
    /// runfolder, sorted.
    pub fn tree(&self, relative: &str) -> Vec<String> {
        let root = self.path();
        let mut entries = Vec::new();
        let mut stack = vec![root.join(relative)];
        while let Some(dir) = stack.pop() {
            let Ok(read) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in read {
                let path = entry.unwrap().path();
                let file_type = fs::symlink_metadata(&path).unwrap().file_type();
                if file_type.is_dir() {
                    stack.push(path.clone());
                }
                let rel = path.strip_prefix(&root).unwrap();
                entries.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
        entries.sort();
        entries
    }

    /// Assert that `relative` (inside the runfolder) is a symlink and
    /// return its target.
    ///
    /// # Panics
    /// Panics if the path is missing or not a symlink.
    pub fn assert_symlink(&self, relative: &str) -> PathBuf {
        let path = self.path().join(relative);
        let meta = fs::symlink_metadata(&path)
            .unwrap_or_else(|_| panic!("Expected symlink to exist: {}", path.display()));
        assert!(
            meta.file_type().is_symlink(),
            "Expected a symlink: {}",
            path.display()
        );
        fs::read_link(&path).unwrap()
    }

    /// Assert that `relative` (inside the runfolder) is a regular file with
    /// `content`.
    ///
    /// # Panics
    /// Panics if the path is missing, a symlink, or has other content.
    pub fn assert_copied(&self, relative: &str, content: &str) {
        let path = self.path().join(relative);
        let meta = fs::symlink_metadata(&path)
            .unwrap_or_else(|_| panic!("Expected file to exist: {}", path.display()));
        assert!(
            meta.file_type().is_file(),
            "Expected a regular file: {}",
            path.display()
        );
        assert_eq!(fs::read_to_string(&path).unwrap(), content);
    }

    /// Assert that `relative` (inside the runfolder) does not exist.
    ///
    /// # Panics
    /// Panics if anything exists at the path.
    pub fn assert_missing(&self, relative: &str) {
        let path = self.path().join(relative);
        assert!(
            fs::symlink_metadata(&path).is_err(),
            "Expected path NOT to exist: {}",
            path.display()
        );
    }
}
