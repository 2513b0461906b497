//! Integration tests for configuration loading and validation
//!
//! Tests that touch environment variables hold `ENV_MUTEX`.

use samplecache::config::{load_config, read_config_or_default};
use samplecache::domain::{
    AggregationMode, DuplicateAttributePolicy, EmptySamplePolicy, PatientMismatchPolicy,
};
use secrecy::ExposeSecret;
use std::io::Write;
use std::sync::Mutex;
use tempfile::NamedTempFile;

static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn cleanup_env_vars() {
    for var in [
        "SAMPLECACHE_APPLICATION_LOG_LEVEL",
        "SAMPLECACHE_APPLICATION_DRY_RUN",
        "SAMPLECACHE_MONGODB_COLLECTION",
        "SAMPLECACHE_MONGODB_CONNECTION_STRING",
        "SAMPLECACHE_REDIS_HOST",
        "SAMPLECACHE_REDIS_PORT",
        "SAMPLECACHE_REDIS_PASSWORD",
        "TEST_SAMPLECACHE_MONGO_URI",
    ] {
        std::env::remove_var(var);
    }
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_complete_config() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[application]
log_level = "debug"
dry_run = true

[mongodb]
connection_string = "mongodb+srv://reader:pw@cluster.example.net"
database_name = "biobank"
collection = "clinical"
app_name = "samplecache-test"
connect_timeout_seconds = 5
aggregation = "client"

[redis]
host = "cache.internal"
port = 6380
username = "publisher"
password = "hunter2"
database = 3

[publish]
patients = ["P1", "P2"]
empty_sample_policy = "skip"
duplicate_attribute_policy = "first_wins"
patient_mismatch_policy = "fail"

[logging]
local_enabled = true
local_path = "/tmp/samplecache-logs"
local_rotation = "hourly"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "debug");
    assert!(config.application.dry_run);
    assert_eq!(config.mongodb.database_name, "biobank");
    assert_eq!(config.mongodb.collection, "clinical");
    assert_eq!(config.mongodb.app_name.as_deref(), Some("samplecache-test"));
    assert_eq!(config.mongodb.connect_timeout_seconds, 5);
    assert_eq!(config.mongodb.aggregation, AggregationMode::Client);
    assert_eq!(config.redis.host, "cache.internal");
    assert_eq!(config.redis.port, 6380);
    assert_eq!(config.redis.username.as_deref(), Some("publisher"));
    assert_eq!(
        config
            .redis
            .password
            .as_ref()
            .map(|p| p.expose_secret().as_str()),
        Some("hunter2")
    );
    assert_eq!(config.redis.database, 3);
    assert_eq!(config.publish.patients, vec!["P1", "P2"]);
    assert_eq!(config.publish.empty_sample_policy, EmptySamplePolicy::Skip);
    assert_eq!(
        config.publish.duplicate_attribute_policy,
        DuplicateAttributePolicy::FirstWins
    );
    assert_eq!(
        config.publish.patient_mismatch_policy,
        PatientMismatchPolicy::Fail
    );
    assert!(config.logging.local_enabled);
    assert_eq!(config.logging.local_rotation, "hourly");
}

#[test]
fn test_load_minimal_config_with_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[mongodb]
connection_string = "mongodb://localhost:27017"
database_name = "biobank"
collection = "clinical"
"#,
    );

    let config = load_config(file.path()).unwrap();

    assert_eq!(config.application.log_level, "info");
    assert!(!config.application.dry_run);
    assert_eq!(config.redis.host, "localhost");
    assert_eq!(config.redis.port, 6379);
    assert!(config.redis.password.is_none());
    assert_eq!(config.mongodb.connect_timeout_seconds, 10);
    assert!(config.publish.patients.is_empty());
    assert_eq!(config.publish.empty_sample_policy, EmptySamplePolicy::Fail);
    assert!(!config.logging.local_enabled);
}

#[test]
fn test_env_var_substitution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("TEST_SAMPLECACHE_MONGO_URI", "mongodb://secret@db:27017");

    let file = write_config(
        r#"
[mongodb]
# connection_string = "${NOT_SET_BUT_COMMENTED}"
connection_string = "${TEST_SAMPLECACHE_MONGO_URI}"
database_name = "biobank"
collection = "clinical"
"#,
    );

    let config = load_config(file.path()).unwrap();
    assert_eq!(
        config.mongodb.connection_string.expose_secret().as_str(),
        "mongodb://secret@db:27017"
    );

    cleanup_env_vars();
}

#[test]
fn test_missing_env_var_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[mongodb]
connection_string = "${TEST_SAMPLECACHE_MONGO_URI}"
database_name = "biobank"
collection = "clinical"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("TEST_SAMPLECACHE_MONGO_URI"));
}

#[test]
fn test_env_overrides_win_over_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("SAMPLECACHE_REDIS_HOST", "override.internal");
    std::env::set_var("SAMPLECACHE_REDIS_PORT", "7000");
    std::env::set_var("SAMPLECACHE_MONGODB_COLLECTION", "genomic");
    std::env::set_var("SAMPLECACHE_APPLICATION_DRY_RUN", "true");

    let file = write_config(
        r#"
[mongodb]
connection_string = "mongodb://localhost:27017"
database_name = "biobank"
collection = "clinical"

[redis]
host = "file.internal"
port = 6379
"#,
    );

    let config = load_config(file.path()).unwrap();
    cleanup_env_vars();

    assert_eq!(config.redis.host, "override.internal");
    assert_eq!(config.redis.port, 7000);
    assert_eq!(config.mongodb.collection, "genomic");
    assert!(config.application.dry_run);
}

#[test]
fn test_missing_file_falls_back_to_defaults_and_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();
    std::env::set_var("SAMPLECACHE_REDIS_HOST", "env-only.internal");

    let dir = tempfile::TempDir::new().unwrap();
    let (config, found) = read_config_or_default(dir.path().join("absent.toml")).unwrap();
    cleanup_env_vars();

    assert!(!found);
    assert_eq!(config.redis.host, "env-only.internal");
    assert_eq!(config.redis.port, 6379);
    assert!(config.validate().is_err());
}

#[test]
fn test_server_aggregation_rejects_non_default_policies() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    let file = write_config(
        r#"
[mongodb]
connection_string = "mongodb://localhost:27017"
database_name = "biobank"
collection = "clinical"
aggregation = "server"

[publish]
duplicate_attribute_policy = "fail"
"#,
    );

    let err = load_config(file.path()).unwrap_err();
    assert!(err.to_string().contains("duplicate_attribute_policy"));
}

#[test]
fn test_invalid_values_rejected() {
    let _lock = ENV_MUTEX.lock().unwrap();
    cleanup_env_vars();

    for (body, needle) in [
        (
            "[mongodb]\nconnection_string = \"http://db\"\ndatabase_name = \"b\"\ncollection = \"c\"\n",
            "mongodb://",
        ),
        (
            "[mongodb]\nconnection_string = \"mongodb://db\"\ndatabase_name = \"b\"\ncollection = \"c\"\n[logging]\nlocal_rotation = \"size\"\n",
            "local_rotation",
        ),
        (
            "[mongodb]\nconnection_string = \"mongodb://db\"\ndatabase_name = \"b\"\ncollection = \"c\"\n[publish]\nempty_sample_policy = \"ignore\"\n",
            "ignore",
        ),
    ] {
        let file = write_config(body);
        let err = load_config(file.path()).unwrap_err().to_string();
        assert!(err.contains(needle), "{err} should mention {needle}");
    }
}
