//! Sequential orchestration of the coverage stages.

use crate::layout::ArtifactLayout;
use crate::runner::{StageResult, StageRunner};
use crate::stage::{CoverageStage, Tools};
use std::time::Instant;
use tracing::{debug, info};

/// Result of a complete pipeline execution.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Whether every stage passed.
    pub success: bool,

    /// Results of the stages that ran, in execution order.
    pub stages: Vec<StageResult>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Number of stages that passed.
    pub fn passed_count(&self) -> usize {
        self.stages.iter().filter(|s| s.passed()).count()
    }

    /// Number of stages that failed.
    pub fn failed_count(&self) -> usize {
        self.stages.iter().filter(|s| !s.passed()).count()
    }

    /// The stage that aborted the run, if any.
    pub fn first_failure(&self) -> Option<&StageResult> {
        self.stages.iter().find(|s| !s.passed())
    }
}

/// Coverage pipeline orchestrator.
pub struct CoveragePipeline;

impl CoveragePipeline {
    /// Run the fixed stage sequence against `layout`.
    ///
    /// Stages run strictly one after another; the first stage that fails
    /// (non-zero exit or spawn error) aborts the run and no later stage is
    /// spawned. Intermediate files written before the failure are left in
    /// place. The report directory is deleted, stale contents included,
    /// right before the report generator runs.
    pub async fn run(tools: &Tools, layout: &ArtifactLayout) -> PipelineResult {
        let start = Instant::now();

        let mut stage_results = Vec::new();
        let mut all_passed = true;

        for stage in CoverageStage::SEQUENCE {
            if stage == CoverageStage::GenerateReport {
                Self::reset_report_dir(layout).await;
            }

            info!(stage = %stage.name(), "executing stage");
            let command = stage.command(tools, layout);

            let result = match StageRunner::execute_stage(stage, &command).await {
                Ok(result) => result,
                Err(e) => {
                    // Spawn failures get a synthetic result so the summary
                    // still lists the stage.
                    all_passed = false;
                    stage_results.push(StageResult {
                        stage_name: stage.name().to_string(),
                        exit_code: -1,
                        stdout: String::new(),
                        stderr: e.to_string(),
                        duration_ms: start.elapsed().as_millis() as u64,
                        success: false,
                    });
                    break;
                }
            };

            debug!(
                stage = %stage.name(),
                exit_code = result.exit_code,
                duration_ms = result.duration_ms,
                "stage finished"
            );

            let passed = result.passed();
            stage_results.push(result);
            if !passed {
                all_passed = false;
                break;
            }
        }

        PipelineResult {
            success: all_passed,
            stages: stage_results,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    /// Delete the report directory and all contents if present.
    ///
    /// The one suppressed error in the pipeline: a missing directory counts
    /// as success, and any other removal failure is left for the report
    /// generator to surface.
    async fn reset_report_dir(layout: &ArtifactLayout) {
        let _ = tokio::fs::remove_dir_all(layout.report_dir()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_result(name: &str, exit_code: i32, success: bool) -> StageResult {
        StageResult {
            stage_name: name.to_string(),
            exit_code,
            stdout: "".to_string(),
            stderr: "".to_string(),
            duration_ms: 100,
            success,
        }
    }

    #[test]
    fn test_pipeline_result_counts() {
        let result = PipelineResult {
            success: true,
            stages: vec![
                stage_result("capture_post", 0, true),
                stage_result("capture_init", 0, true),
            ],
            duration_ms: 300,
        };

        assert_eq!(result.passed_count(), 2);
        assert_eq!(result.failed_count(), 0);
        assert!(result.first_failure().is_none());
        assert!(result.success);
    }

    #[test]
    fn test_pipeline_result_with_failures() {
        let result = PipelineResult {
            success: false,
            stages: vec![
                stage_result("capture_post", 0, true),
                stage_result("capture_init", 1, false),
            ],
            duration_ms: 300,
        };

        assert_eq!(result.passed_count(), 1);
        assert_eq!(result.failed_count(), 1);
        assert_eq!(
            result.first_failure().map(|s| s.stage_name.as_str()),
            Some("capture_init")
        );
        assert!(!result.success);
    }
}
