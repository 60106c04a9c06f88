use std::env;
use std::sync::{Mutex, OnceLock};

use rust_decimal::Decimal;
use serde_json::Value;
use sitequote_cli::commands::{catalog, doctor, estimate, migrate, roi, seed};

const VALID_ENV: &[(&str, &str)] = &[("SITEQUOTE_DATABASE_URL", "sqlite::memory:")];

#[test]
fn migrate_returns_success_with_valid_env() {
    with_env(VALID_ENV, || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_remote_catalog_without_url() {
    with_env(
        &[
            ("SITEQUOTE_DATABASE_URL", "sqlite::memory:"),
            ("SITEQUOTE_CATALOG_SOURCE", "remote"),
        ],
        || {
            let result = migrate::run();
            assert_eq!(result.exit_code, 2, "expected config validation failure code");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "migrate");
            assert_eq!(payload["status"], "error");
            assert_eq!(payload["error_class"], "config_validation");
        },
    );
}

#[test]
fn seed_reports_collection_and_dataset_version() {
    with_env(VALID_ENV, || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected seed success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");

        let message = payload["message"].as_str().unwrap_or("");
        assert!(message.contains("`estimator_items`"), "{message}");
        assert!(message.contains("estimator-catalog-v1"), "{message}");
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_env(VALID_ENV, || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        let second_payload = parse_payload(&second.output);

        assert_eq!(first_payload["message"], second_payload["message"]);
    });
}

#[test]
fn catalog_on_empty_store_falls_back() {
    with_env(VALID_ENV, || {
        let result = catalog::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "catalog");
        assert_eq!(payload["data"]["origin"], "fallback");
        assert!(payload["data"]["fetch_error"].is_null());

        let prices: Vec<&str> = payload["data"]["project_types"]
            .as_array()
            .map(|items| items.iter().filter_map(|item| item["price"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(prices, vec!["1000", "2500", "5000", "8000"]);
    });
}

#[test]
fn catalog_honours_fallback_source() {
    with_env(
        &[
            ("SITEQUOTE_DATABASE_URL", "sqlite::memory:"),
            ("SITEQUOTE_CATALOG_SOURCE", "fallback"),
        ],
        || {
            let payload = parse_payload(&catalog::run().output);
            assert_eq!(payload["status"], "ok");
            assert_eq!(payload["data"]["origin"], "fallback");
        },
    );
}

#[test]
fn estimate_returns_quote_and_summary() {
    with_env(VALID_ENV, || {
        let result = estimate::run("landing", &["seo".to_string()]);
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "estimate");
        assert_eq!(payload["message"], "estimated budget $1,800");
        assert_eq!(payload["data"]["quote"]["total"], "1800");
        assert_eq!(
            payload["data"]["summary"],
            "I used the estimator. I'm looking for a Landing Page. Features: Advanced SEO. \
             Estimated Budget: $1,800."
        );
    });
}

#[test]
fn estimate_rejects_unknown_project_type() {
    with_env(VALID_ENV, || {
        let result = estimate::run("spaceship", &[]);
        assert_eq!(result.exit_code, 7);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "invalid_selection");
    });
}

#[test]
fn roi_uses_configured_uplift() {
    with_env(
        &[
            ("SITEQUOTE_DATABASE_URL", "sqlite::memory:"),
            ("SITEQUOTE_ESTIMATOR_ROI_CONVERSION_UPLIFT", "2"),
        ],
        || {
            let result = roi::run(1000, Decimal::from(2), Decimal::from(100));
            assert_eq!(result.exit_code, 0);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["data"]["uplift"], "2");
            let increase = payload["data"]["projection"]["monthly_increase"]
                .as_str()
                .and_then(|value| value.parse::<Decimal>().ok());
            assert_eq!(increase, Some(Decimal::from(2000)));
        },
    );
}

#[test]
fn roi_rejects_negative_inputs() {
    with_env(VALID_ENV, || {
        let result = roi::run(1000, Decimal::from(-1), Decimal::from(100));
        assert_eq!(result.exit_code, 7);
        assert_eq!(parse_payload(&result.output)["error_class"], "invalid_input");
    });
}

#[test]
fn roi_rejects_inputs_beyond_decimal_range() {
    with_env(VALID_ENV, || {
        let customer_value =
            Decimal::from_str_exact("50000000000000000000000").expect("decimal literal");
        let result = roi::run(4_000_000_000, Decimal::ONE_HUNDRED, customer_value);

        assert_eq!(result.exit_code, 7);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_input");
        assert!(payload["message"].as_str().is_some_and(|message| message.contains("too large")));
    });
}

#[test]
fn doctor_flags_unmigrated_database_catalog() {
    with_env(VALID_ENV, || {
        let report: Value =
            serde_json::from_str(&doctor::run(true)).expect("doctor output should be valid JSON");

        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][0]["name"], "config_validation");
        assert_eq!(report["checks"][0]["status"], "pass");
        assert_eq!(report["checks"][1]["name"], "database_connectivity");
        assert_eq!(report["checks"][1]["status"], "pass");
        assert_eq!(report["checks"][2]["name"], "catalog_source");
        assert_eq!(report["checks"][2]["status"], "fail");
    });
}

#[test]
fn doctor_passes_with_fallback_catalog() {
    with_env(
        &[
            ("SITEQUOTE_DATABASE_URL", "sqlite::memory:"),
            ("SITEQUOTE_CATALOG_SOURCE", "fallback"),
        ],
        || {
            let output = doctor::run(false);
            assert!(output.starts_with("doctor: all readiness checks passed"), "{output}");
            assert!(output.contains("- [ok] catalog_source"), "{output}");
        },
    );
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SITEQUOTE_DATABASE_URL",
        "SITEQUOTE_DATABASE_MAX_CONNECTIONS",
        "SITEQUOTE_DATABASE_TIMEOUT_SECS",
        "SITEQUOTE_CATALOG_SOURCE",
        "SITEQUOTE_CATALOG_REMOTE_URL",
        "SITEQUOTE_CATALOG_REMOTE_API_KEY",
        "SITEQUOTE_CATALOG_TIMEOUT_SECS",
        "SITEQUOTE_ESTIMATOR_ROI_CONVERSION_UPLIFT",
        "SITEQUOTE_SERVER_BIND_ADDRESS",
        "SITEQUOTE_SERVER_PORT",
        "SITEQUOTE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "SITEQUOTE_LOGGING_LEVEL",
        "SITEQUOTE_LOGGING_FORMAT",
        "SITEQUOTE_LOG_LEVEL",
        "SITEQUOTE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
