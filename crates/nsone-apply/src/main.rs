// # nsone-apply - Record Reconciliation CLI
//
// A thin integration layer: reads one record configuration, runs one
// reconciler verb against a record store, and prints the observed
// configuration. All translation logic lives in nsone-core.
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Opening the record store
// 4. Running the requested action
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `NSONE_RECORD_FILE`: Path to the record configuration (JSON), required
// - `NSONE_ACTION`: plan, create, read, update, apply or delete (default: apply)
// - `NSONE_STORE_TYPE`: Type of record store (file, memory; default: file)
// - `NSONE_STORE_PATH`: Path to the store file (for file store)
// - `NSONE_OBSERVED_FILE`: Where the last observed configuration is kept
//   (default: the record file with an `.observed.json` extension)
// - `NSONE_LOG_LEVEL`: trace, debug, info, warn or error (default: info)
//
// ## Observed State
//
// After every successful create, read, update or apply the observed
// configuration is written to the observed file; delete removes it. `apply`
// looks the current record up under the key from that file, so changing the
// zone, domain or type of a record replaces it instead of leaving the old
// one behind.
//
// ## Example
//
// ```bash
// export NSONE_RECORD_FILE=./www.json
// export NSONE_STORE_PATH=/var/lib/nsone/records.json
//
// nsone-apply
// ```

use anyhow::{Context, Result};
use nsone_core::{RecordConfig, Reconciler, StoreConfig, store};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Action completed
/// - 1: Configuration or startup error
/// - 2: Action failed
#[derive(Debug, Clone, Copy)]
enum ApplyExitCode {
    /// Action completed
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Action failed (validation, codec or store error)
    RuntimeError = 2,
}

impl From<ApplyExitCode> for ExitCode {
    fn from(code: ApplyExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Action requested via `NSONE_ACTION`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    /// Print the structured record without touching the store
    Plan,
    Create,
    Read,
    Update,
    /// Create, update or replace depending on what the store holds
    Apply,
    Delete,
}

impl Action {
    fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "plan" => Ok(Action::Plan),
            "create" => Ok(Action::Create),
            "read" => Ok(Action::Read),
            "update" => Ok(Action::Update),
            "apply" => Ok(Action::Apply),
            "delete" => Ok(Action::Delete),
            _ => anyhow::bail!(
                "NSONE_ACTION '{}' is not valid. \
                Valid actions: plan, create, read, update, apply, delete",
                value
            ),
        }
    }
}

/// Application configuration
struct Config {
    record_file: PathBuf,
    action: Action,
    store_type: String,
    store_path: Option<String>,
    observed_file: PathBuf,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let record_file: PathBuf = env::var("NSONE_RECORD_FILE")
            .context("NSONE_RECORD_FILE is required")?
            .into();
        let observed_file = match env::var("NSONE_OBSERVED_FILE") {
            Ok(path) if !path.is_empty() => path.into(),
            _ => record_file.with_extension("observed.json"),
        };

        Ok(Self {
            record_file,
            observed_file,
            action: Action::parse(&env::var("NSONE_ACTION").unwrap_or_else(|_| "apply".to_string()))?,
            store_type: env::var("NSONE_STORE_TYPE").unwrap_or_else(|_| "file".to_string()),
            store_path: env::var("NSONE_STORE_PATH").ok(),
            log_level: env::var("NSONE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.record_file.as_os_str().is_empty() {
            anyhow::bail!("NSONE_RECORD_FILE cannot be empty");
        }
        if !self.record_file.exists() {
            anyhow::bail!(
                "NSONE_RECORD_FILE does not exist: {}",
                self.record_file.display()
            );
        }

        match self.store_type.as_str() {
            "file" | "memory" => {}
            _ => anyhow::bail!(
                "NSONE_STORE_TYPE '{}' is not supported. \
                Supported types: file, memory",
                self.store_type
            ),
        }

        if self.store_type == "file" && self.store_path.as_ref().is_none_or(|p| p.is_empty()) {
            anyhow::bail!(
                "NSONE_STORE_PATH is required when NSONE_STORE_TYPE=file. \
                Set it via: export NSONE_STORE_PATH=/var/lib/nsone/records.json"
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "NSONE_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn store_config(&self) -> StoreConfig {
        match (self.store_type.as_str(), &self.store_path) {
            ("file", Some(path)) => StoreConfig::File { path: path.into() },
            _ => StoreConfig::Memory,
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return ApplyExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return ApplyExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // Logs go to stderr so stdout carries only the JSON result
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ApplyExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ApplyExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config).await {
            Ok(output) => {
                println!("{}", output);
                ApplyExitCode::Success
            }
            Err(e) => {
                error!("Action failed: {:#}", e);
                ApplyExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run the requested action and render its result as JSON
async fn run(config: Config) -> Result<String> {
    let content = tokio::fs::read_to_string(&config.record_file)
        .await
        .with_context(|| format!("Failed to read {}", config.record_file.display()))?;
    let desired: RecordConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", config.record_file.display()))?;

    // Planning never touches the configured store
    let store_config = match config.action {
        Action::Plan => StoreConfig::Memory,
        _ => config.store_config(),
    };
    let reconciler = Reconciler::new(store::open(&store_config).await?);
    let key = desired.key()?;
    info!(
        "Running {:?} for {} against {} store",
        config.action,
        key,
        reconciler.store_name()
    );

    let observed = match config.action {
        Action::Plan => {
            let record = reconciler.plan(&desired)?;
            return Ok(serde_json::to_string_pretty(&record)?);
        }
        Action::Create => reconciler.create(&desired).await?,
        Action::Read => reconciler.read(&key).await?,
        Action::Update => reconciler.update(&desired).await?,
        Action::Apply => {
            let previous = load_observed(&config.observed_file).await?;
            let current = match previous.map(|p| p.key()).transpose()? {
                Some(previous_key) if previous_key != key => {
                    match reconciler.find(&previous_key).await? {
                        Some(current) => Some(current),
                        None => reconciler.find(&key).await?,
                    }
                }
                _ => reconciler.find(&key).await?,
            };
            reconciler.apply(&desired, current.as_ref()).await?
        }
        Action::Delete => {
            reconciler.delete(&key).await?;
            if config.observed_file.exists() {
                tokio::fs::remove_file(&config.observed_file)
                    .await
                    .with_context(|| format!("Failed to remove {}", config.observed_file.display()))?;
            }
            return Ok(serde_json::json!({ "deleted": key.to_string() }).to_string());
        }
    };

    let output = serde_json::to_string_pretty(&observed)?;
    tokio::fs::write(&config.observed_file, &output)
        .await
        .with_context(|| format!("Failed to write {}", config.observed_file.display()))?;
    Ok(output)
}

/// Load the observed configuration left by the previous run, if any
async fn load_observed(path: &Path) -> Result<Option<RecordConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let observed = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(observed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse("plan").unwrap(), Action::Plan);
        assert_eq!(Action::parse("APPLY").unwrap(), Action::Apply);
        assert!(Action::parse("upsert").is_err());
    }

    #[test]
    fn test_store_config_selection() {
        let config = Config {
            record_file: "record.json".into(),
            action: Action::Apply,
            store_type: "memory".into(),
            store_path: None,
            observed_file: "record.observed.json".into(),
            log_level: "info".into(),
        };
        assert_eq!(config.store_config(), StoreConfig::Memory);
    }

    fn file_config(dir: &Path, action: Action) -> Config {
        Config {
            record_file: dir.join("record.json"),
            action,
            store_type: "file".into(),
            store_path: Some(dir.join("records.json").display().to_string()),
            observed_file: dir.join("record.observed.json"),
            log_level: "info".into(),
        }
    }

    fn write_record(dir: &Path, domain: &str) {
        let record = serde_json::json!({
            "zone": "example.com",
            "domain": domain,
            "type": "A",
            "answers": [ { "answer": "1.2.3.4" } ]
        });
        std::fs::write(dir.join("record.json"), record.to_string()).unwrap();
    }

    async fn stored_keys(dir: &Path) -> Vec<String> {
        nsone_core::FileRecordStore::new(dir.join("records.json"))
            .await
            .unwrap()
            .list()
            .await
    }

    #[tokio::test]
    async fn test_apply_replaces_record_when_domain_changes() {
        let dir = tempfile::tempdir().unwrap();

        write_record(dir.path(), "www.example.com");
        run(file_config(dir.path(), Action::Apply)).await.unwrap();
        assert_eq!(stored_keys(dir.path()).await, ["example.com/www.example.com/A"]);

        write_record(dir.path(), "api.example.com");
        let output = run(file_config(dir.path(), Action::Apply)).await.unwrap();
        assert!(output.contains("api.example.com"));
        assert_eq!(stored_keys(dir.path()).await, ["example.com/api.example.com/A"]);

        // Applying the same configuration again is an in-place update
        run(file_config(dir.path(), Action::Apply)).await.unwrap();
        assert_eq!(stored_keys(dir.path()).await, ["example.com/api.example.com/A"]);
    }

    #[tokio::test]
    async fn test_delete_clears_observed_file() {
        let dir = tempfile::tempdir().unwrap();
        write_record(dir.path(), "www.example.com");

        run(file_config(dir.path(), Action::Apply)).await.unwrap();
        assert!(dir.path().join("record.observed.json").exists());

        run(file_config(dir.path(), Action::Delete)).await.unwrap();
        assert!(!dir.path().join("record.observed.json").exists());
        assert!(stored_keys(dir.path()).await.is_empty());
    }
}
