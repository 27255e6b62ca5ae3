//! [`TestProject`] builder for fwcfg test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Root of the workspace `test-fixtures/` directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

/// The sample firmware project (catalog, overlay and manifest)
pub fn sample_project_dir() -> PathBuf {
    fixtures_dir().join("projects/sample")
}

/// A temporary project directory with helpers for writing sources and
/// asserting on outputs.
///
/// # Example
///
/// ```rust,no_run
/// use fwcfg_test_utils::TestProject;
///
/// let project = TestProject::new()
///     .with_catalog(r#"
/// [[setting]]
/// id = "USE_SPI"
/// type = "bool"
/// default = false
/// "#)
///     .with_overlay("#define USE_SPI\n");
/// project.assert_file_exists("defaults.toml");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Copy of the sample project from `test-fixtures/projects/sample`.
    pub fn sample() -> Self {
        let project = Self::new();
        for entry in fs::read_dir(sample_project_dir()).unwrap() {
            let entry = entry.unwrap();
            if entry.file_type().unwrap().is_file() {
                fs::copy(entry.path(), project.root().join(entry.file_name())).unwrap();
            }
        }
        project
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` inside the project.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write `defaults.toml`.
    pub fn with_catalog(self, content: &str) -> Self {
        self.write_file("defaults.toml", content);
        self
    }

    /// Write `user_config_override.h`.
    pub fn with_overlay(self, content: &str) -> Self {
        self.write_file("user_config_override.h", content);
        self
    }

    /// Write `overlay.toml`.
    pub fn with_table_overlay(self, content: &str) -> Self {
        self.write_file("overlay.toml", content);
        self
    }

    /// Write `fwcfg.toml`.
    pub fn with_manifest(self, content: &str) -> Self {
        self.write_file("fwcfg.toml", content);
        self
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn write_file(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    /// Read `relative` to a string.
    ///
    /// # Panics
    /// Panics with the path if the file cannot be read.
    pub fn read_file(&self, relative: &str) -> String {
        let path = self.path(relative);
        fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", path.display()))
    }

    /// Assert that `path` (relative to the project root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.path(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read_file(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }
}
