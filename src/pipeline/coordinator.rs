//! Per-brand pipeline: identify, materialize, substitute, build.

use super::candidates::Candidate;
use crate::brand::{BrandConfig, extract_config};
use crate::build::{BuildOrchestrator, BuildReport, CommandRunner};
use crate::error::{BrandError, Result, Stage};
use crate::exit_codes;
use crate::fs::CopyStats;
use crate::materialize::materialize;
use crate::patterns::PatternCatalog;
use crate::settings::{RunMode, Settings};
use crate::substitute::{SubstitutionEngine, SubstitutionReport};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

/// Everything a successful brand run produced.
#[derive(Debug, Clone)]
pub struct BrandReport {
    pub brand: String,
    pub instance_root: PathBuf,
    pub copy: CopyStats,
    pub substitution: SubstitutionReport,
    /// `None` when the build stage was skipped.
    pub build: Option<BuildReport>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// What happened to one candidate.
#[derive(Debug)]
pub enum CandidateOutcome {
    /// No config block; the loop moved on.
    NoConfig,
    /// A block with no parseable keys.
    Empty,
    Succeeded(BrandReport),
    Failed {
        brand: Option<String>,
        error: BrandError,
    },
}

#[derive(Debug)]
pub struct CandidateResult {
    pub label: String,
    pub outcome: CandidateOutcome,
}

/// Outcome of a whole run over a candidate list.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<CandidateResult>,
}

impl RunSummary {
    /// Number of candidates that went through the pipeline.
    pub fn attempted(&self) -> usize {
        self.results
            .iter()
            .filter(|r| {
                matches!(
                    r.outcome,
                    CandidateOutcome::Succeeded(_) | CandidateOutcome::Failed { .. }
                )
            })
            .count()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &BrandReport> {
        self.results.iter().filter_map(|r| match &r.outcome {
            CandidateOutcome::Succeeded(report) => Some(report),
            _ => None,
        })
    }

    /// Process exit code: the first pipeline failure wins, then empty blocks.
    pub fn exit_code(&self) -> i32 {
        let failure = self.results.iter().find_map(|r| match &r.outcome {
            CandidateOutcome::Failed { error, .. } => Some(error.exit_code()),
            _ => None,
        });
        if let Some(code) = failure {
            return code;
        }

        let empty = self
            .results
            .iter()
            .any(|r| matches!(r.outcome, CandidateOutcome::Empty));
        if empty && self.attempted() == 0 {
            return BrandError::ConfigEmpty.exit_code();
        }

        exit_codes::SUCCESS
    }

    /// Machine-readable summary.
    pub fn to_json(&self) -> Value {
        let results: Vec<Value> = self
            .results
            .iter()
            .map(|r| match &r.outcome {
                CandidateOutcome::NoConfig => json!({"candidate": r.label, "status": "no_config"}),
                CandidateOutcome::Empty => json!({
                    "candidate": r.label,
                    "status": "empty",
                    "error": BrandError::ConfigEmpty.to_string(),
                }),
                CandidateOutcome::Succeeded(report) => json!({
                    "candidate": r.label,
                    "status": "succeeded",
                    "brand": report.brand,
                    "instance": report.instance_root.display().to_string(),
                    "files_copied": report.copy.files,
                    "files_scanned": report.substitution.files_scanned,
                    "files_rewritten": report.substitution.files_rewritten,
                    "replacements": report.substitution.replacements,
                    "build_steps": report.build.as_ref().map(build_steps_json),
                    "started_at": report.started_at.to_rfc3339(),
                    "finished_at": report.finished_at.to_rfc3339(),
                }),
                CandidateOutcome::Failed { brand, error } => json!({
                    "candidate": r.label,
                    "status": "failed",
                    "brand": brand,
                    "stage": error.stage().map(|s| s.to_string()),
                    "error": error.to_string(),
                }),
            })
            .collect();

        json!({
            "attempted": self.attempted(),
            "exit_code": self.exit_code(),
            "results": results,
        })
    }
}

fn build_steps_json(build: &BuildReport) -> Value {
    build
        .steps
        .iter()
        .map(|step| {
            json!({
                "name": step.name,
                "command": step.command,
                "duration_ms": step.duration.as_millis() as u64,
            })
        })
        .collect()
}

/// Drives brands through the pipeline with one settings object and runner.
pub struct Pipeline<'a, R: CommandRunner> {
    settings: &'a Settings,
    catalog: PatternCatalog,
    runner: R,
    skip_build: bool,
}

impl<'a, R: CommandRunner> Pipeline<'a, R> {
    /// Compile the catalog once for every brand this pipeline runs.
    pub fn new(settings: &'a Settings, runner: R) -> Result<Self> {
        Ok(Self {
            settings,
            catalog: settings.catalog()?,
            runner,
            skip_build: false,
        })
    }

    /// Stop after substitution; the instance is left ready to build.
    pub fn skip_build(mut self, skip: bool) -> Self {
        self.skip_build = skip;
        self
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Run materialize, substitute and build for one brand config.
    ///
    /// The first failing stage ends the run. Nothing is rolled back: a
    /// failed substitution or build leaves the instance as it was at the
    /// point of failure.
    pub fn run_brand(&mut self, config: &BrandConfig) -> Result<BrandReport> {
        let started_at = Utc::now();
        let brand = config.identifier()?.to_string();

        let instance = materialize(self.settings, &brand)?;

        info!(brand = %brand, patterns = self.catalog.len(), "substituting brand values");
        let substitution = SubstitutionEngine::new(&self.catalog, self.settings.binary_sample_bytes)
            .apply(&instance.root, &brand, config)?;
        info!(
            brand = %brand,
            rewritten = substitution.files_rewritten,
            replacements = substitution.replacements,
            binary_skipped = substitution.binary_skipped,
            "substitution finished"
        );

        let build = if self.skip_build {
            info!(brand = %brand, "build skipped");
            None
        } else {
            let mut orchestrator =
                BuildOrchestrator::new(&self.settings.build_steps, &mut self.runner);
            Some(orchestrator.run(&instance.root)?)
        };

        Ok(BrandReport {
            brand,
            instance_root: instance.root,
            copy: instance.stats,
            substitution,
            build,
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Process candidates in order.
    ///
    /// Candidates without a block, and blocks with no keys, are reported and
    /// skipped. In [`RunMode::First`] the loop ends after the first pipeline
    /// run, whatever its outcome; in [`RunMode::All`] every configured
    /// candidate is run.
    pub fn run_candidates<I>(&mut self, candidates: I, mode: RunMode) -> RunSummary
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut summary = RunSummary::default();

        for candidate in candidates {
            let Some(config) = extract_config(&candidate.text) else {
                info!(candidate = %candidate.label, "no config found");
                summary.results.push(CandidateResult {
                    label: candidate.label,
                    outcome: CandidateOutcome::NoConfig,
                });
                continue;
            };

            if config.is_empty() {
                warn!(candidate = %candidate.label, "config block found but no keys were parsed");
                summary.results.push(CandidateResult {
                    label: candidate.label,
                    outcome: CandidateOutcome::Empty,
                });
                continue;
            }

            info!(
                candidate = %candidate.label,
                keys = config.len(),
                brand = config.username().unwrap_or("<none>"),
                "config found"
            );
            debug!(candidate = %candidate.label, block = %config.to_block(), "parsed config");

            let outcome = match self.run_brand(&config) {
                Ok(report) => {
                    info!(brand = %report.brand, instance = %report.instance_root.display(), "brand released");
                    CandidateOutcome::Succeeded(report)
                }
                Err(error) => {
                    let brand = config.username().map(str::to_string);
                    let stage = error.stage().unwrap_or(Stage::Identify);
                    error!(
                        brand = brand.as_deref().unwrap_or("<none>"),
                        stage = %stage,
                        error = %error,
                        "pipeline failed"
                    );
                    CandidateOutcome::Failed { brand, error }
                }
            };

            summary.results.push(CandidateResult {
                label: candidate.label,
                outcome,
            });

            if mode == RunMode::First {
                break;
            }
        }

        summary
    }
}
