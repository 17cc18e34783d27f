//! Tests for pipeline coordination.

use crate::brand::BrandConfig;
use crate::build::tests::FakeRunner;
use crate::build::runner::Completion;
use crate::error::{BrandError, Stage};
use crate::exit_codes;
use crate::pipeline::candidates::tickets_from_json;
use crate::pipeline::{Candidate, CandidateOutcome, Pipeline};
use crate::settings::{RunMode, Settings};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const APP_JSON: &str = "{\n  \"name\": \"old\",\n  \"displayName\": \"old\",\n}\n";
const README: &str = "# MyTestApp\n\nWhite-label template.\n";

fn template() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("MyTestApp")).unwrap();
    fs::create_dir_all(root.join("android")).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join("MyTestApp/app.json"), APP_JSON).unwrap();
    fs::write(root.join("README.md"), README).unwrap();
    fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
    temp
}

fn settings_for(root: &Path) -> Settings {
    Settings {
        template_root: root.to_string_lossy().into_owned(),
        ..Default::default()
    }
}

fn block(username: &str) -> String {
    format!(
        "Release please\n--- start config ---\nApp Username: {}\nFull Name: Acme Corp\nDefault: acme-app\n--- end config ---\n",
        username
    )
}

#[test]
fn test_acme_scenario_end_to_end() {
    let template = template();
    let settings = settings_for(template.path());
    let config: BrandConfig = [
        ("App Username", "acme"),
        ("Full Name", "Acme Corp"),
        ("Default", "acme-app"),
    ]
    .into_iter()
    .collect();

    let mut pipeline = Pipeline::new(&settings, FakeRunner::default()).unwrap();
    let report = pipeline.run_brand(&config).unwrap();

    let instance = template.path().join(".instances/acme");
    assert_eq!(report.instance_root, instance);

    let app_json = fs::read_to_string(instance.join("MyTestApp/app.json")).unwrap();
    assert!(app_json.contains("\"name\": \"Acme Corp\","));
    assert!(app_json.contains("\"displayName\": \"acme-app\","));
    assert_eq!(
        fs::read(instance.join("README.md")).unwrap(),
        fs::read(template.path().join("README.md")).unwrap()
    );
    assert!(!instance.join(".git").exists());

    // The template itself is never rewritten.
    assert_eq!(
        fs::read_to_string(template.path().join("MyTestApp/app.json")).unwrap(),
        APP_JSON
    );

    let runner = pipeline.into_runner();
    assert_eq!(runner.invocations.len(), 5);
    assert!(runner.invocations.iter().all(|i| i.working_dir.starts_with(&instance)));
    assert_eq!(report.build.unwrap().steps.len(), 5);
}

#[test]
fn test_missing_username_aborts_before_materialization() {
    let template = template();
    let settings = settings_for(template.path());
    let config: BrandConfig = [("Full Name", "Acme Corp")].into_iter().collect();

    let mut pipeline = Pipeline::new(&settings, FakeRunner::default()).unwrap();
    let err = pipeline.run_brand(&config).unwrap_err();

    assert!(matches!(err, BrandError::MissingUsername));
    assert_eq!(err.stage(), Some(Stage::Identify));
    assert!(!template.path().join(".instances").exists());
    assert!(pipeline.into_runner().invocations.is_empty());
}

#[test]
fn test_traversal_username_is_rejected() {
    let template = template();
    let settings = settings_for(template.path());
    let config: BrandConfig = [("App Username", "../../etc")].into_iter().collect();

    let mut pipeline = Pipeline::new(&settings, FakeRunner::default()).unwrap();
    let err = pipeline.run_brand(&config).unwrap_err();

    assert!(matches!(err, BrandError::InvalidIdentifier { .. }));
    assert!(!template.path().join(".instances").exists());
}

#[test]
fn test_failing_build_step_stops_pipeline() {
    let template = template();
    let settings = settings_for(template.path());
    let runner = FakeRunner::scripted([
        Completion::success(),
        Completion::success(),
        Completion::failed(Some(1)),
    ]);

    let mut pipeline = Pipeline::new(&settings, runner).unwrap();
    let summary = pipeline.run_candidates([Candidate::new("issue", block("acme"))], RunMode::First);

    assert_eq!(pipeline.into_runner().invocations.len(), 3);
    match &summary.results[0].outcome {
        CandidateOutcome::Failed { brand, error } => {
            assert_eq!(brand.as_deref(), Some("acme"));
            assert!(matches!(error, BrandError::BuildStepFailure { index: 3, .. }));
            assert_eq!(error.stage(), Some(Stage::Build));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(summary.exit_code(), exit_codes::BUILD_FAILURE);
    // Substitution already happened and is not rolled back.
    let app_json =
        fs::read_to_string(template.path().join(".instances/acme/MyTestApp/app.json")).unwrap();
    assert!(app_json.contains("Acme Corp"));
}

#[test]
fn test_missing_value_reports_substitute_stage() {
    let template = template();
    let settings = settings_for(template.path());
    let text = "--- start config ---\nApp Username: acme\nFull Name: Acme\n--- end config ---";

    let mut pipeline = Pipeline::new(&settings, FakeRunner::default()).unwrap();
    let summary = pipeline.run_candidates([Candidate::new("issue", text)], RunMode::First);

    match &summary.results[0].outcome {
        CandidateOutcome::Failed { error, .. } => {
            assert_eq!(error.stage(), Some(Stage::Substitute));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(summary.exit_code(), exit_codes::MISSING_VALUE);
    assert!(pipeline.into_runner().invocations.is_empty());
}

#[test]
fn test_first_mode_skips_missing_and_empty_then_stops() {
    let template = template();
    let settings = settings_for(template.path());
    let candidates = vec![
        Candidate::new("no block", "just chatter"),
        Candidate::new("empty block", "--- start config ---\n\n--- end config ---"),
        Candidate::new("acme", block("acme")),
        Candidate::new("globex", block("globex")),
    ];

    let mut pipeline = Pipeline::new(&settings, FakeRunner::default())
        .unwrap()
        .skip_build(true);
    let summary = pipeline.run_candidates(candidates, RunMode::First);

    assert_eq!(summary.results.len(), 3);
    assert!(matches!(summary.results[0].outcome, CandidateOutcome::NoConfig));
    assert!(matches!(summary.results[1].outcome, CandidateOutcome::Empty));
    assert!(matches!(summary.results[2].outcome, CandidateOutcome::Succeeded(_)));
    assert!(template.path().join(".instances/acme").is_dir());
    assert!(!template.path().join(".instances/globex").exists());
    assert_eq!(summary.exit_code(), exit_codes::SUCCESS);
}

#[test]
fn test_first_mode_stops_even_after_failure() {
    let template = template();
    let settings = settings_for(template.path());
    let candidates = vec![
        Candidate::new("bad", "--- start config ---\nFull Name: x\n--- end config ---"),
        Candidate::new("acme", block("acme")),
    ];

    let mut pipeline = Pipeline::new(&settings, FakeRunner::default()).unwrap();
    let summary = pipeline.run_candidates(candidates, RunMode::First);

    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.attempted(), 1);
    assert!(!template.path().join(".instances/acme").exists());
    assert_eq!(summary.exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn test_all_mode_runs_every_configured_candidate() {
    let template = template();
    let settings = settings_for(template.path());
    let candidates = vec![
        Candidate::new("acme", block("acme")),
        Candidate::new("nothing", "no config here"),
        Candidate::new("globex", block("globex")),
    ];

    let mut pipeline = Pipeline::new(&settings, FakeRunner::default()).unwrap();
    let summary = pipeline.run_candidates(candidates, RunMode::All);

    assert_eq!(summary.attempted(), 2);
    let brands: Vec<&str> = summary.succeeded().map(|r| r.brand.as_str()).collect();
    assert_eq!(brands, vec!["acme", "globex"]);
    assert_eq!(pipeline.into_runner().invocations.len(), 10);
    assert!(template.path().join(".instances/globex/README.md").is_file());
}

#[test]
fn test_only_empty_blocks_is_user_error() {
    let template = template();
    let settings = settings_for(template.path());

    let mut pipeline = Pipeline::new(&settings, FakeRunner::default()).unwrap();
    let summary = pipeline.run_candidates(
        [Candidate::new("empty", "--- start config ---\n--- end config ---")],
        RunMode::First,
    );

    assert_eq!(summary.exit_code(), exit_codes::USER_ERROR);
    assert_eq!(summary.to_json()["results"][0]["status"], "empty");
}

#[test]
fn test_summary_json_describes_outcomes() {
    let template = template();
    let settings = settings_for(template.path());

    let mut pipeline = Pipeline::new(&settings, FakeRunner::default())
        .unwrap()
        .skip_build(true);
    let summary = pipeline.run_candidates([Candidate::new("acme", block("acme"))], RunMode::First);
    let json = summary.to_json();

    assert_eq!(json["attempted"], 1);
    assert_eq!(json["exit_code"], 0);
    assert_eq!(json["results"][0]["status"], "succeeded");
    assert_eq!(json["results"][0]["brand"], "acme");
    assert!(json["results"][0]["files_scanned"].as_u64().unwrap() >= 2);
    assert!(json["results"][0]["build_steps"].is_null());
}

#[test]
fn test_summary_json_lists_completed_build_steps() {
    let template = template();
    let settings = settings_for(template.path());

    let mut pipeline = Pipeline::new(&settings, FakeRunner::default()).unwrap();
    let summary = pipeline.run_candidates([Candidate::new("acme", block("acme"))], RunMode::First);
    let steps = summary.to_json()["results"][0]["build_steps"].clone();

    let steps = steps.as_array().unwrap();
    assert_eq!(steps.len(), 5);
    assert_eq!(steps[0]["name"], "pwd");
    assert_eq!(steps[3]["name"], "assemble release");
    assert_eq!(steps[3]["command"], "./gradlew assembleRelease");
    assert!(steps.iter().all(|s| s["duration_ms"].is_u64()));
}

#[test]
fn test_tickets_json_selects_config_text() {
    let json = r#"[
        {"title": "Release acme", "body": "--- start config ---\nApp Username: body\n--- end config ---",
         "comments": ["--- start config ---\nApp Username: comment\n--- end config ---", "thanks"]},
        {"body": "nothing here"},
        {"title": "Empty", "comments": []}
    ]"#;

    let candidates = tickets_from_json(json).unwrap();

    assert_eq!(candidates.len(), 3);
    assert_eq!(candidates[0].label, "ticket 'Release acme'");
    assert!(candidates[0].text.contains("App Username: comment"));
    assert_eq!(candidates[1].label, "ticket #2");
    assert_eq!(candidates[1].text, "nothing here");
    assert_eq!(candidates[2].text, "");
}

#[test]
fn test_invalid_tickets_json_is_user_error() {
    assert!(matches!(
        tickets_from_json("{not json"),
        Err(BrandError::UserError(_))
    ));
}
