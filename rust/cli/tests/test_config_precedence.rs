use serde_json::Value;
use serial_test::serial;
use tempfile::TempDir;

const KEYS: [&str; 6] = [
    "HANDFACT_CONFIG",
    "HANDFACT_DB",
    "HANDFACT_MAX_RUNTIME_MS",
    "HANDFACT_MAX_HANDS_PER_RUN",
    "HANDFACT_PAGE_SIZE",
    "HANDFACT_RELAY",
];

struct EnvGuard;

impl EnvGuard {
    fn set(pairs: &[(&str, &str)]) -> Self {
        for key in KEYS {
            unsafe {
                std::env::remove_var(key);
            }
        }
        for (k, v) in pairs {
            unsafe {
                std::env::set_var(k, v);
            }
        }
        EnvGuard
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for key in KEYS {
            unsafe {
                std::env::remove_var(key);
            }
        }
    }
}

fn cfg() -> (i32, Value, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = handfact_cli::run(["handfact", "cfg"], &mut out, &mut err);
    let stdout = String::from_utf8(out).unwrap();
    let json = serde_json::from_str(&stdout).unwrap_or(Value::Null);
    (code, json, String::from_utf8(err).unwrap())
}

#[test]
#[serial]
fn defaults_report_default_source() {
    let _env = EnvGuard::set(&[]);
    let (code, json, _) = cfg();
    assert_eq!(code, 0);
    assert_eq!(json["database"]["value"].as_str(), Some("data/handfact.sqlite"));
    assert_eq!(json["max_runtime_ms"]["value"].as_u64(), Some(2200));
    assert_eq!(json["max_hands_per_run"]["value"].as_u64(), Some(12));
    assert_eq!(json["page_size"]["value"].as_u64(), Some(50));
    assert_eq!(json["relay"]["value"].as_bool(), Some(true));
    for key in ["database", "max_runtime_ms", "max_hands_per_run", "page_size", "relay"] {
        assert_eq!(json[key]["source"].as_str(), Some("default"), "{}", key);
    }
}

#[test]
#[serial]
fn env_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("handfact.toml");
    std::fs::write(
        &path,
        "database = \"from-file.sqlite\"\nmax_hands_per_run = 30\nrelay = false\n",
    )
    .unwrap();
    let _env = EnvGuard::set(&[
        ("HANDFACT_CONFIG", path.to_str().unwrap()),
        ("HANDFACT_MAX_HANDS_PER_RUN", "40"),
    ]);
    let (code, json, _) = cfg();
    assert_eq!(code, 0);
    assert_eq!(json["database"]["value"].as_str(), Some("from-file.sqlite"));
    assert_eq!(json["database"]["source"].as_str(), Some("file"));
    assert_eq!(json["max_hands_per_run"]["value"].as_u64(), Some(40));
    assert_eq!(json["max_hands_per_run"]["source"].as_str(), Some("env"));
    assert_eq!(json["relay"]["value"].as_bool(), Some(false));
    assert_eq!(json["relay"]["source"].as_str(), Some("file"));
}

#[test]
#[serial]
fn runtime_is_clamped_to_floor() {
    let _env = EnvGuard::set(&[("HANDFACT_MAX_RUNTIME_MS", "100")]);
    let (code, json, _) = cfg();
    assert_eq!(code, 0);
    assert_eq!(json["max_runtime_ms"]["value"].as_u64(), Some(800));
}

#[test]
#[serial]
fn invalid_page_size_is_rejected() {
    let _env = EnvGuard::set(&[("HANDFACT_PAGE_SIZE", "500")]);
    let (code, _, err) = cfg();
    assert_eq!(code, 2);
    assert!(err.contains("page_size must be within 1..=50"));
}

#[test]
#[serial]
fn invalid_config_is_reported_once() {
    let _env = EnvGuard::set(&[("HANDFACT_PAGE_SIZE", "0")]);
    let (code, _, err) = cfg();
    assert_eq!(code, 2);
    assert_eq!(err.matches("Invalid configuration").count(), 1, "{}", err);
    assert_eq!(err.lines().filter(|l| l.starts_with("Error:")).count(), 1, "{}", err);
}

#[test]
#[serial]
fn unparsable_relay_flag_is_rejected() {
    let _env = EnvGuard::set(&[("HANDFACT_RELAY", "sometimes")]);
    let (code, _, err) = cfg();
    assert_eq!(code, 2);
    assert!(err.contains("Invalid relay"));
}

#[test]
#[serial]
fn cli_flag_beats_env() {
    let dir = TempDir::new().unwrap();
    let env_db = dir.path().join("env.sqlite");
    let cli_db = dir.path().join("cli.sqlite");
    let _env = EnvGuard::set(&[("HANDFACT_DB", env_db.to_str().unwrap())]);
    let mut out = Vec::new();
    let mut err = Vec::new();
    let code = handfact_cli::run(
        ["handfact", "etl", "g1", "--db", cli_db.to_str().unwrap()],
        &mut out,
        &mut err,
    );
    assert_eq!(code, 0);
    assert!(cli_db.exists());
    assert!(!env_db.exists());
}
