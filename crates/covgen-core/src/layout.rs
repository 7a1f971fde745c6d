//! Fixed artifact layout for a coverage run.

use std::io;
use std::path::{Path, PathBuf};

/// Raw dataset captured from the live instrumentation counters.
pub const POST_RAW_FILE: &str = "coverage_post_raw.info";

/// Raw zero-baseline dataset.
pub const INIT_RAW_FILE: &str = "coverage_init_raw.info";

/// Post dataset with excluded paths removed.
pub const POST_FILE: &str = "coverage_post.info";

/// Init dataset with excluded paths removed.
pub const INIT_FILE: &str = "coverage_init.info";

/// Union of the filtered init and post datasets.
pub const COMBINED_FILE: &str = "coverage.info";

/// HTML report output directory.
pub const REPORT_DIR: &str = "coverage";

/// Source path globs removed from both raw datasets: system headers, the
/// unit-test harness, vendored `lib*` subtrees and example code.
pub const EXCLUDE_GLOBS: [&str; 4] = ["/usr/include/*", "unittest/*", "lib*/*", "example/*"];

/// Locations of every artifact produced during a coverage run.
///
/// All artifacts live directly under the base directory. Each dataset file
/// is written by exactly one stage and read by exactly the next one; every
/// run recomputes the whole set from scratch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    base: PathBuf,
}

impl ArtifactLayout {
    /// Create a layout rooted at `base`.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Create a layout rooted at the current working directory.
    ///
    /// The directory is resolved to an absolute path once, at startup.
    pub fn from_current_dir() -> io::Result<Self> {
        Ok(Self {
            base: std::env::current_dir()?,
        })
    }

    /// Base directory holding the instrumented build tree.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Raw dataset from the live counters.
    pub fn post_raw(&self) -> PathBuf {
        self.base.join(POST_RAW_FILE)
    }

    /// Raw zero-baseline dataset.
    pub fn init_raw(&self) -> PathBuf {
        self.base.join(INIT_RAW_FILE)
    }

    /// Filtered post dataset.
    pub fn post_filtered(&self) -> PathBuf {
        self.base.join(POST_FILE)
    }

    /// Filtered init dataset.
    pub fn init_filtered(&self) -> PathBuf {
        self.base.join(INIT_FILE)
    }

    /// Combined dataset fed to the report generator.
    pub fn combined(&self) -> PathBuf {
        self.base.join(COMBINED_FILE)
    }

    /// Report output directory.
    pub fn report_dir(&self) -> PathBuf {
        self.base.join(REPORT_DIR)
    }
}
