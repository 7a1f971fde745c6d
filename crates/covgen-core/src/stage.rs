//! Stage definitions and command construction.

use crate::layout::{ArtifactLayout, EXCLUDE_GLOBS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// lcov switch enabling branch-coverage detail.
const BRANCH_RC: [&str; 2] = ["--rc", "lcov_branch_coverage=1"];

/// External programs the pipeline drives, resolved via the search path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tools {
    /// Coverage capture/filter/merge tool.
    pub lcov: String,

    /// HTML report generator.
    pub genhtml: String,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            lcov: "lcov".to_string(),
            genhtml: "genhtml".to_string(),
        }
    }
}

/// Stages of the coverage pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStage {
    /// Capture live counters from the instrumented tree.
    CapturePost,

    /// Capture a zero-baseline snapshot so unexecuted files still appear.
    CaptureInit,

    /// Remove excluded paths from the post dataset.
    FilterPost,

    /// Remove excluded paths from the init dataset.
    FilterInit,

    /// Union the filtered init and post datasets.
    Merge,

    /// Render the HTML report from the combined dataset.
    GenerateReport,
}

impl CoverageStage {
    /// All stages in execution order.
    pub const SEQUENCE: [CoverageStage; 6] = [
        CoverageStage::CapturePost,
        CoverageStage::CaptureInit,
        CoverageStage::FilterPost,
        CoverageStage::FilterInit,
        CoverageStage::Merge,
        CoverageStage::GenerateReport,
    ];

    /// Get the stage name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            CoverageStage::CapturePost => "capture_post",
            CoverageStage::CaptureInit => "capture_init",
            CoverageStage::FilterPost => "filter_post",
            CoverageStage::FilterInit => "filter_init",
            CoverageStage::Merge => "merge",
            CoverageStage::GenerateReport => "generate_report",
        }
    }

    /// Build the stage's command vector (first element is the executable).
    pub fn command(&self, tools: &Tools, layout: &ArtifactLayout) -> Vec<String> {
        match self {
            CoverageStage::CapturePost => {
                let mut cmd = vec![
                    tools.lcov.clone(),
                    "--directory".to_string(),
                    path_arg(layout.base().to_path_buf()),
                    "--capture".to_string(),
                    "-o".to_string(),
                    path_arg(layout.post_raw()),
                ];
                cmd.extend(BRANCH_RC.iter().map(|s| s.to_string()));
                cmd
            }
            // The baseline capture runs without the branch switch.
            CoverageStage::CaptureInit => vec![
                tools.lcov.clone(),
                "--directory".to_string(),
                path_arg(layout.base().to_path_buf()),
                "--capture".to_string(),
                "--initial".to_string(),
                "-o".to_string(),
                path_arg(layout.init_raw()),
            ],
            CoverageStage::FilterPost => {
                filter_command(tools, layout.post_raw(), layout.post_filtered())
            }
            CoverageStage::FilterInit => {
                filter_command(tools, layout.init_raw(), layout.init_filtered())
            }
            CoverageStage::Merge => {
                let mut cmd = vec![
                    tools.lcov.clone(),
                    "-a".to_string(),
                    path_arg(layout.init_filtered()),
                    "-a".to_string(),
                    path_arg(layout.post_filtered()),
                    "-o".to_string(),
                    path_arg(layout.combined()),
                ];
                cmd.extend(BRANCH_RC.iter().map(|s| s.to_string()));
                cmd
            }
            CoverageStage::GenerateReport => vec![
                tools.genhtml.clone(),
                path_arg(layout.combined()),
                "--branch-coverage".to_string(),
                "-o".to_string(),
                path_arg(layout.report_dir()),
            ],
        }
    }
}

/// Filter command shared by the init and post datasets; both use the same
/// exclude globs.
fn filter_command(tools: &Tools, input: PathBuf, output: PathBuf) -> Vec<String> {
    let mut cmd = vec![tools.lcov.clone(), "--remove".to_string(), path_arg(input)];
    cmd.extend(EXCLUDE_GLOBS.iter().map(|g| g.to_string()));
    cmd.push("-o".to_string());
    cmd.push(path_arg(output));
    cmd.extend(BRANCH_RC.iter().map(|s| s.to_string()));
    cmd
}

fn path_arg(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> ArtifactLayout {
        ArtifactLayout::new("/work")
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(CoverageStage::CapturePost.name(), "capture_post");
        assert_eq!(CoverageStage::CaptureInit.name(), "capture_init");
        assert_eq!(CoverageStage::FilterPost.name(), "filter_post");
        assert_eq!(CoverageStage::FilterInit.name(), "filter_init");
        assert_eq!(CoverageStage::Merge.name(), "merge");
        assert_eq!(CoverageStage::GenerateReport.name(), "generate_report");
    }

    #[test]
    fn test_sequence_order() {
        let names: Vec<_> = CoverageStage::SEQUENCE.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "capture_post",
                "capture_init",
                "filter_post",
                "filter_init",
                "merge",
                "generate_report"
            ]
        );
    }

    #[test]
    fn test_capture_post_has_branch_switch() {
        let cmd = CoverageStage::CapturePost.command(&Tools::default(), &layout());
        assert_eq!(cmd[0], "lcov");
        assert!(cmd.contains(&"--capture".to_string()));
        assert!(!cmd.contains(&"--initial".to_string()));
        assert!(cmd.contains(&"--rc".to_string()));
        assert!(cmd.contains(&"lcov_branch_coverage=1".to_string()));
        assert!(cmd.contains(&"/work/coverage_post_raw.info".to_string()));
    }

    #[test]
    fn test_capture_init_has_no_branch_switch() {
        let cmd = CoverageStage::CaptureInit.command(&Tools::default(), &layout());
        assert!(cmd.contains(&"--initial".to_string()));
        assert!(!cmd.contains(&"--rc".to_string()));
        assert!(cmd.contains(&"/work/coverage_init_raw.info".to_string()));
    }

    #[test]
    fn test_filter_stages_use_identical_globs() {
        let post = CoverageStage::FilterPost.command(&Tools::default(), &layout());
        let init = CoverageStage::FilterInit.command(&Tools::default(), &layout());

        for glob in EXCLUDE_GLOBS {
            assert!(post.contains(&glob.to_string()), "post filter misses {glob}");
            assert!(init.contains(&glob.to_string()), "init filter misses {glob}");
        }

        assert!(post.contains(&"--remove".to_string()));
        assert!(post.contains(&"/work/coverage_post_raw.info".to_string()));
        assert!(post.contains(&"/work/coverage_post.info".to_string()));
        assert!(init.contains(&"/work/coverage_init_raw.info".to_string()));
        assert!(init.contains(&"/work/coverage_init.info".to_string()));
    }

    #[test]
    fn test_merge_unions_init_then_post() {
        let cmd = CoverageStage::Merge.command(&Tools::default(), &layout());
        let init_pos = cmd
            .iter()
            .position(|a| a == "/work/coverage_init.info")
            .expect("init input");
        let post_pos = cmd
            .iter()
            .position(|a| a == "/work/coverage_post.info")
            .expect("post input");
        assert!(init_pos < post_pos, "init dataset must come first");
        assert!(cmd.contains(&"/work/coverage.info".to_string()));
        assert!(cmd.contains(&"lcov_branch_coverage=1".to_string()));
    }

    #[test]
    fn test_report_uses_genhtml_with_branch_detail() {
        let cmd = CoverageStage::GenerateReport.command(&Tools::default(), &layout());
        assert_eq!(cmd[0], "genhtml");
        assert!(cmd.contains(&"--branch-coverage".to_string()));
        assert!(cmd.contains(&"/work/coverage.info".to_string()));
        assert!(cmd.contains(&"/work/coverage".to_string()));
    }

    #[test]
    fn test_custom_tools_replace_program_names() {
        let tools = Tools {
            lcov: "/opt/lcov/bin/lcov".to_string(),
            genhtml: "/opt/lcov/bin/genhtml".to_string(),
        };
        let capture = CoverageStage::CapturePost.command(&tools, &layout());
        let report = CoverageStage::GenerateReport.command(&tools, &layout());
        assert_eq!(capture[0], "/opt/lcov/bin/lcov");
        assert_eq!(report[0], "/opt/lcov/bin/genhtml");
    }

    #[test]
    fn test_stage_serializes_snake_case() {
        let json = serde_json::to_string(&CoverageStage::CapturePost).expect("serialize");
        assert_eq!(json, "\"capture_post\"");
        let back: CoverageStage = serde_json::from_str("\"generate_report\"").expect("deserialize");
        assert_eq!(back, CoverageStage::GenerateReport);
    }
}
