//! Tests for AthenaConfig: environment loading, profiles, and client construction.

use std::env;
use std::sync::Mutex;

use lakequery_athena::*;

// Env-based tests must run serially to avoid interfering with each other.
static ENV_LOCK: Mutex<()> = Mutex::new(());

// Helper: clear all ATHENA_* and profile env vars used by the config.
fn clear_athena_env() {
    let keys = [
        "LAKEQUERY_PROFILE",
        "ATHENA_REGION",
        "ATHENA_DATABASE",
        "ATHENA_WORKGROUP",
        "ATHENA_OUTPUT_LOCATION",
        "ATHENA_BACKOFF_MS",
        "ATHENA_MAX_RETRIES",
        "ATHENA_POLL_INTERVAL_MS",
        "ATHENA_MAX_POLL_ATTEMPTS",
        "AWS_REGION",
        "TEST_ATHENA_DATABASE",
        "TEST_ATHENA_REGION",
        "TEST_ATHENA_OUTPUT_LOCATION",
        "TEST_ATHENA_MAX_RETRIES",
    ];
    for k in keys {
        env::remove_var(k);
    }
}

#[test]
fn test_config_from_env() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_athena_env();

    env::set_var("ATHENA_REGION", "us-west-2");
    env::set_var("ATHENA_DATABASE", "analytics");
    env::set_var("ATHENA_WORKGROUP", "etl");
    env::set_var("ATHENA_OUTPUT_LOCATION", "s3://my-bucket/results/");
    env::set_var("ATHENA_BACKOFF_MS", "250");
    env::set_var("ATHENA_MAX_RETRIES", "4");
    env::set_var("ATHENA_POLL_INTERVAL_MS", "2000");
    env::set_var("ATHENA_MAX_POLL_ATTEMPTS", "30");

    let cfg = AthenaConfig::from_env();

    assert_eq!(cfg.region, "us-west-2");
    assert_eq!(cfg.database, "analytics");
    assert_eq!(cfg.workgroup.as_deref(), Some("etl"));
    assert_eq!(cfg.output_location, "s3://my-bucket/results/");
    assert_eq!(
        cfg.options,
        ClientOptions {
            backoff_ms: 250,
            max_retries: 4,
            poll_interval_ms: 2000,
            max_poll_attempts: 30,
        }
    );
    assert!(cfg.is_configured());

    clear_athena_env();
}

#[test]
fn test_config_profile() {
    let _lock = ENV_LOCK.lock().unwrap();
    clear_athena_env();

    env::set_var("ATHENA_DATABASE", "base_db");
    env::set_var("ATHENA_MAX_RETRIES", "2");

    env::set_var("LAKEQUERY_PROFILE", "test");
    env::set_var("TEST_ATHENA_DATABASE", "test_db");
    env::set_var("TEST_ATHENA_REGION", "eu-west-1");
    env::set_var("TEST_ATHENA_OUTPUT_LOCATION", "s3://test-bucket/");

    let cfg = AthenaConfig::from_env();

    assert_eq!(cfg.database, "test_db");
    assert_eq!(cfg.region, "eu-west-1");
    assert_eq!(cfg.output_location, "s3://test-bucket/");
    // Not overridden by the profile, so the bare key applies.
    assert_eq!(cfg.options.max_retries, 2);

    clear_athena_env();
}

#[tokio::test]
async fn test_from_config_requires_output_location() {
    let cfg = {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_athena_env();
        AthenaConfig::from_env()
    };
    assert!(!cfg.is_configured());

    let err = AthenaClient::from_config(&cfg).await.unwrap_err();
    assert!(matches!(err, AthenaError::Config(_)));
}

#[test]
fn test_config_serde_roundtrip() {
    let cfg = AthenaConfig {
        region: "us-east-1".into(),
        database: "default".into(),
        workgroup: None,
        output_location: "s3://b/".into(),
        options: ClientOptions::default(),
    };
    let json = serde_json::to_string(&cfg).expect("serialize");
    let back: AthenaConfig = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.output_location, "s3://b/");
    assert_eq!(back.options, ClientOptions::default());
}
