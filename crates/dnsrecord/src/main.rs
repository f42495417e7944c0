// # dnsrecord - DNS record reconciler
//
// Thin shell around `dnsrecord_core::run`:
// 1. Reads configuration from environment variables
// 2. Initializes logging on stderr
// 3. Reads one JSON request from a file or stdin
// 4. Runs it against ClouDNS and prints exactly one JSON result on stdout
//
// All reconciliation logic lives in dnsrecord-core.
//
// ## Configuration
//
// - `DNSRECORD_LOG_LEVEL`: trace, debug, info, warn, error (default: warn)
// - `DNSRECORD_MODE`: live or dry-run (default: live)
//
// ## Example
//
// ```bash
// echo '{"auth_id":"1234","auth_password":"secret","domain":"example.com",
//        "host":"www","type":"A","value":"1.2.3.4"}' | dnsrecord
//
// DNSRECORD_MODE=dry-run dnsrecord request.json
// ```

use anyhow::{Context, Result};
use dnsrecord_core::ReconcileResult;
use dnsrecord_provider_cloudns::CloudnsFactory;
use std::env;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;
use tracing::{Level, debug, error};
use tracing_subscriber::FmtSubscriber;

/// Exit codes
///
/// - 0: The request succeeded (changed or not)
/// - 1: The request failed; the result says why
/// - 2: The process could not run the request normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsrecordExitCode {
    Success = 0,
    Failed = 1,
    InternalError = 2,
}

impl DnsrecordExitCode {
    fn for_result(result: &ReconcileResult) -> Self {
        if result.failed {
            DnsrecordExitCode::Failed
        } else {
            DnsrecordExitCode::Success
        }
    }
}

impl From<DnsrecordExitCode> for ExitCode {
    fn from(code: DnsrecordExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Process configuration
#[derive(Debug, Clone, PartialEq, Eq)]
struct Config {
    log_level: String,
    mode: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self {
            log_level: env::var("DNSRECORD_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string()),
            mode: env::var("DNSRECORD_MODE").unwrap_or_else(|_| "live".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "DNSRECORD_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        match self.mode.to_lowercase().as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "DNSRECORD_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        Ok(())
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        }
    }

    fn dry_run(&self) -> bool {
        self.mode.eq_ignore_ascii_case("dry-run")
    }

    fn factory(&self) -> CloudnsFactory {
        if self.dry_run() {
            CloudnsFactory::dry_run()
        } else {
            CloudnsFactory::live()
        }
    }
}

/// Read the request from `path`, or from stdin when no path is given
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read request from stdin")?;
            Ok(input)
        }
    }
}

/// Print the result on stdout
fn emit(result: &ReconcileResult, code: DnsrecordExitCode) -> ExitCode {
    match serde_json::to_string(result) {
        Ok(json) => {
            println!("{}", json);
            code.into()
        }
        Err(e) => {
            error!("Failed to serialize result: {}", e);
            println!(r#"{{"changed":false,"failed":true,"msg":"Failed to serialize result"}}"#);
            DnsrecordExitCode::InternalError.into()
        }
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return emit(
            &ReconcileResult::failure(format!("Configuration error: {}", e)),
            DnsrecordExitCode::InternalError,
        );
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .with_writer(io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return emit(
            &ReconcileResult::failure(format!("Failed to initialize logging: {}", e)),
            DnsrecordExitCode::InternalError,
        );
    }

    debug!("Starting dnsrecord [mode: {}]", config.mode);

    let path = env::args_os().nth(1);
    let input = match read_input(path.as_deref().map(Path::new)) {
        Ok(input) => input,
        Err(e) => {
            error!("{:#}", e);
            return emit(
                &ReconcileResult::failure(format!("{:#}", e)),
                DnsrecordExitCode::Failed,
            );
        }
    };

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return emit(
                &ReconcileResult::failure(format!("Failed to create runtime: {}", e)),
                DnsrecordExitCode::InternalError,
            );
        }
    };

    let factory = config.factory();
    let result = rt.block_on(dnsrecord_core::run(&input, &factory));

    debug!(
        "Finished: changed={} failed={} msg={}",
        result.changed, result.failed, result.msg
    );

    emit(&result, DnsrecordExitCode::for_result(&result))
}
