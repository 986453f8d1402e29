//! CLI command implementations
//!
//! Boot sequence shared by `serve` and `check`:
//! 1. Load and validate configuration
//! 2. Open the storage backend
//! 3. Apply the seed document, if configured
//!
//! `serve` then binds the HTTP server and runs until Ctrl-C.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use tracing::{error, info};

use crate::http_server::HttpServer;
use crate::observability::{init_logging, log_event, Event};
use crate::storage::{RosterSeed, RosterStore};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Main entry point for the CLI
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(config.as_deref(), port),
        Command::Check { config } => check(&config),
    }
}

/// Open the configured store and apply the seed document
pub async fn boot(config: &Config) -> CliResult<Arc<dyn RosterStore>> {
    let store = config.storage.open().await?;
    info!(
        event = %Event::StoreOpened,
        backend = config.storage.backend_name(),
        "lifecycle"
    );

    if let Some(seed_path) = &config.seed_path {
        let seed = RosterSeed::load(seed_path)?;
        let counts = seed.apply(store.as_ref()).await?;
        info!(
            event = %Event::SeedApplied,
            schools = counts.schools,
            teachers = counts.teachers,
            classes = counts.classes,
            students = counts.students,
            "lifecycle"
        );
    }

    Ok(store)
}

/// Start the HTTP server
pub fn serve(config_path: Option<&Path>, port: Option<u16>) -> CliResult<()> {
    let mut config = Config::load_or_default(config_path)?;
    if let Some(port) = port {
        if port == 0 {
            return Err(CliError::config_error("--port must be > 0"));
        }
        config.server.port = port;
    }

    init_logging(&config.log)?;
    log_event(Event::BootStart);
    log_event(Event::ConfigLoaded);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let result = rt.block_on(async {
        let store = boot(&config).await?;
        let server = HttpServer::with_config(config.server.clone(), store);

        info!(event = %Event::BootComplete, addr = %server.socket_addr(), "lifecycle");

        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    });

    match &result {
        Ok(()) => log_event(Event::ShutdownComplete),
        Err(e) => error!(
            event = %Event::BootFailed,
            code = e.code_str(),
            error = e.message(),
            "lifecycle"
        ),
    }

    result
}

/// Validate configuration and seed data without serving.
///
/// Writes the backend name and entity counts to stdout.
pub fn check(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let counts = rt.block_on(async {
        let store = boot(&config).await?;
        store.counts().await.map_err(CliError::from)
    })?;

    write_response(json!({
        "backend": config.storage.backend_name(),
        "counts": counts,
    }))
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;
    use std::sync::Mutex;

    use serde_json::Value;

    use super::*;
    use crate::storage::RosterCounts;

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    const SEED: &str = r#"{
        "schools":  [{ "id": 1, "name": "School of Hard Knocks", "city": "Springfield", "state": "IL" }],
        "teachers": [{ "id": 1, "name": "Mrs. Stricter", "schoolId": 1 }],
        "classes":  [{ "id": 1, "name": "Fifth Grade Class", "teacherId": 1 }],
        "students": [
            { "id": 1, "name": "Jim Bob", "classId": 1 },
            { "id": 2, "name": "Jane Doe", "classId": 1 }
        ]
    }"#;

    #[tokio::test]
    async fn test_boot_applies_seed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("seed.json"), SEED).unwrap();
        let config_path = dir.path().join("roster.json");
        fs::write(&config_path, r#"{ "seed_path": "seed.json" }"#).unwrap();

        let config = Config::load(&config_path).unwrap();
        let store = boot(&config).await.unwrap();

        assert_eq!(
            store.counts().await.unwrap(),
            RosterCounts {
                schools: 1,
                teachers: 1,
                classes: 1,
                students: 2,
            }
        );
    }

    #[tokio::test]
    async fn test_boot_without_seed_is_empty() {
        let store = boot(&Config::default()).await.unwrap();
        assert_eq!(store.counts().await.unwrap(), RosterCounts::default());
    }

    #[tokio::test]
    async fn test_boot_fails_on_missing_seed() {
        let config = Config {
            seed_path: Some("/nonexistent/seed.json".into()),
            ..Config::default()
        };
        let err = boot(&config).await.err().unwrap();
        assert_eq!(err.code_str(), "ROSTER_CLI_STORAGE_ERROR");
    }

    #[test]
    fn test_check_succeeds_with_seed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("seed.json"), SEED).unwrap();
        let config_path = dir.path().join("roster.json");
        fs::write(&config_path, r#"{ "seed_path": "seed.json" }"#).unwrap();

        assert!(check(&config_path).is_ok());
    }

    #[test]
    fn test_check_rejects_dangling_seed_reference() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("seed.json"),
            r#"{ "students": [{ "id": 1, "name": "Orphan", "classId": 9 }] }"#,
        )
        .unwrap();
        let config_path = dir.path().join("roster.json");
        fs::write(&config_path, r#"{ "seed_path": "seed.json" }"#).unwrap();

        assert!(check(&config_path).is_err());
    }

    #[test]
    fn test_serve_rejects_zero_port_override() {
        let err = serve(None, Some(0)).unwrap_err();
        assert_eq!(err.code_str(), "ROSTER_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_boot_events_carry_structured_fields() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("seed.json"), SEED).unwrap();
        let config_path = dir.path().join("roster.json");
        fs::write(&config_path, r#"{ "seed_path": "seed.json" }"#).unwrap();
        let config = Config::load(&config_path).unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_writer(move || writer.clone())
            .finish();

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        tracing::subscriber::with_default(subscriber, || {
            if let Err(e) = rt.block_on(boot(&config)) {
                panic!("boot failed: {e}");
            }
        });

        let fields: Vec<Value> = logs
            .lines()
            .into_iter()
            .map(|line| line["fields"].clone())
            .filter(|fields| fields["message"] == "lifecycle")
            .collect();

        let opened = fields
            .iter()
            .find(|f| f["event"] == "STORE_OPENED")
            .expect("store opened event");
        assert_eq!(opened["backend"], "memory");

        let seeded = fields
            .iter()
            .find(|f| f["event"] == "SEED_APPLIED")
            .expect("seed applied event");
        assert_eq!(seeded["students"], 2);
        assert_eq!(seeded["schools"], 1);
    }
}
