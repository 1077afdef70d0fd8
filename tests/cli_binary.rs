//! Integration tests for the cafescout binary
//!
//! Runs the compiled CLI against a throwaway cache file and checks output
//! and exit codes.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to run the CLI with given args against the cache at `db`
fn run_cli(home: &Path, db: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cafescout"))
        .arg("--db")
        .arg(db)
        .args(args)
        // Keep the user's real config out of the way
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("HOME", home)
        .env_remove("CAFESCOUT_CACHE_PATH")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute cafescout")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = Command::new(env!("CARGO_BIN_EXE_cafescout"))
        .arg("--help")
        .output()
        .expect("Failed to execute cafescout");

    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cafescout"), "Help should mention cafescout");
    assert!(stdout.contains("llm-get"), "Help should list llm-get");
}

#[test]
fn test_set_then_get_across_processes() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("data").join("cache.sqlite");

    let set = run_cli(
        temp_dir.path(),
        &db,
        &["set", "shibuya_1000", r#"{"name": "Cafe A", "rating": 4.5}"#],
    );
    assert!(set.status.success(), "set failed: {}", String::from_utf8_lossy(&set.stderr));
    assert!(db.exists(), "Cache file and parent directory should be created");

    let get = run_cli(temp_dir.path(), &db, &["get", "shibuya_1000"]);
    assert!(get.status.success());
    let value: serde_json::Value = serde_json::from_slice(&get.stdout).unwrap();
    assert_eq!(value, serde_json::json!({"name": "Cafe A", "rating": 4.5}));
}

#[test]
fn test_get_miss_exits_with_failure() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("cache.sqlite");

    let output = run_cli(temp_dir.path(), &db, &["get", "unknown"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("miss"));
}

#[test]
fn test_expired_entry_is_a_miss() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("cache.sqlite");

    let set = run_cli(temp_dir.path(), &db, &["set", "q", "[1, 2]", "--ttl-hours", "0"]);
    assert!(set.status.success());

    let get = run_cli(temp_dir.path(), &db, &["get", "q"]);
    assert!(!get.status.success());
}

#[test]
fn test_llm_set_then_get() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("cache.sqlite");

    let set = run_cli(
        temp_dir.path(),
        &db,
        &["llm-set", "gemma3:12b", "cafes near Shibuya", "recommend X"],
    );
    assert!(set.status.success());
    let hash = String::from_utf8_lossy(&set.stdout).trim().to_string();

    let hashed = run_cli(temp_dir.path(), &db, &["hash", "gemma3:12b", "cafes near Shibuya"]);
    assert_eq!(String::from_utf8_lossy(&hashed.stdout).trim(), hash);

    let by_prompt = run_cli(temp_dir.path(), &db, &["llm-get", "gemma3:12b", "cafes near Shibuya"]);
    assert!(by_prompt.status.success());
    assert_eq!(String::from_utf8_lossy(&by_prompt.stdout).trim(), "recommend X");

    let by_hash = run_cli(temp_dir.path(), &db, &["llm-get", "gemma3:12b", "--hash", hash.as_str()]);
    assert_eq!(String::from_utf8_lossy(&by_hash.stdout).trim(), "recommend X");

    let other = run_cli(temp_dir.path(), &db, &["llm-get", "gemma3:12b", "--hash", "other-hash"]);
    assert!(!other.status.success());
}

#[test]
fn test_invalid_json_prints_error_and_exits() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("cache.sqlite");

    let output = run_cli(temp_dir.path(), &db, &["set", "q", "{not json"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Invalid JSON value"), "Unexpected stderr: {}", stderr);
    assert!(!stderr.contains("InvalidJson("), "Error should use its message, not Debug: {}", stderr);
}

#[test]
fn test_broken_config_prints_readable_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config").join("cafescout");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "default_ttl_hours = -3\n").unwrap();
    let db = temp_dir.path().join("cache.sqlite");

    let output = run_cli(temp_dir.path(), &db, &["get", "q"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Error: Invalid default_ttl_hours: -3"),
        "Unexpected stderr: {}",
        stderr
    );
}

#[test]
fn test_config_file_sets_default_ttl() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join("config").join("cafescout");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "default_ttl_hours = 0\n").unwrap();
    let db = temp_dir.path().join("cache.sqlite");

    let set = run_cli(temp_dir.path(), &db, &["set", "q", "1"]);
    assert!(set.status.success());

    // Configured TTL of zero makes the write expire immediately
    let get = run_cli(temp_dir.path(), &db, &["get", "q"]);
    assert!(!get.status.success());
}

#[cfg(test)]
mod unit_tests {
    //! Library-level checks that don't require running the binary

    use cafescout::cache::{CacheManager, DEFAULT_TTL_HOURS};
    use cafescout::keys;
    use tempfile::TempDir;

    #[test]
    fn test_library_round_trip_with_search_key() {
        let temp_dir = TempDir::new().unwrap();
        let cache = CacheManager::open(temp_dir.path().join("lib.sqlite")).unwrap();
        let key = keys::search_key("Shibuya", 1000);

        cache
            .set_api_cache(&key, &vec!["Cafe A", "Cafe B"], DEFAULT_TTL_HOURS)
            .unwrap();

        let cached: Vec<String> = cache.get_api_cache("shibuya_1000").unwrap().unwrap();
        assert_eq!(cached, vec!["Cafe A", "Cafe B"]);
    }
}
