// Path: crates/cli/tests/run_validation.rs
use vit_cli::execute;
use vit_types::config::BootstrapConfig;
use vit_types::error::{BootstrapError, ConfigError};

fn config_in(parent: &std::path::Path) -> BootstrapConfig {
    let mut cfg = BootstrapConfig::default();
    cfg.schedule.genesis_time = Some("2024-01-01T00:00:00Z".into());
    cfg.paths.working_dir_parent = Some(parent.to_path_buf());
    cfg.paths.tool_dir = parent.join("jor_bins");
    cfg
}

#[tokio::test]
async fn test_invalid_schedule_fails_before_any_side_effect() {
    let parent = tempfile::tempdir().unwrap();
    let mut cfg = config_in(parent.path());
    cfg.schedule.slot_duration = "256s".into();

    let err = execute(cfg).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BootstrapError>(),
        Some(BootstrapError::Config(ConfigError::SlotDurationTooLong(_)))
    ));
    assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_missing_round_data_fails_before_tool_lookup() {
    let parent = tempfile::tempdir().unwrap();
    let mut cfg = config_in(parent.path());
    cfg.paths.proposals = parent.path().join("proposals.json");
    cfg.paths.fund = parent.path().join("fund.json");

    let err = execute(cfg).await.unwrap_err();
    assert!(format!("{err:#}").contains("reading proposals"));
    assert_eq!(std::fs::read_dir(parent.path()).unwrap().count(), 0);
}
