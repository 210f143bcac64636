//! cardiorisk: 10-year cardiovascular risk from a patient record.
//!
//! Reads one JSON record from a file path or stdin and prints the assessment.

use std::io::{BufReader, Read};
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cardiorisk::adapters::json::{read_patient, write_json};
use cardiorisk::adapters::sanitize::SanitizingMakeWriter;
use cardiorisk::adapters::SystemClock;
use cardiorisk::application::{EngineConfig, RiskEngine};
use cardiorisk::RiskError;

/// Exit status when the record has blocking validation errors.
const EXIT_INVALID_INPUT: u8 = 2;

fn main() -> Result<ExitCode> {
    // Logs never go to stdout; stdout carries the JSON result.
    let log_mode = std::env::var("CARDIORISK_LOG_MODE").unwrap_or_else(|_| "stderr".to_string());

    let (writer, _guard) = if log_mode == "file" {
        let log_file =
            std::env::var("CARDIORISK_LOG_FILE").unwrap_or_else(|_| "cardiorisk.log".to_string());

        if let Some(parent) = std::path::Path::new(&log_file).parent() {
            // Best-effort: the open below reports the real failure.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("Failed to open log file {log_file}"))?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stderr())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(SanitizingMakeWriter::new(writer)),
        )
        .init();

    let source = std::env::args().nth(1).unwrap_or_else(|| "-".to_string());
    let reader: Box<dyn Read> = if source == "-" {
        Box::new(std::io::stdin().lock())
    } else {
        let file = std::fs::File::open(&source)
            .with_context(|| format!("Failed to open patient record {source}"))?;
        Box::new(BufReader::new(file))
    };

    let input = read_patient(reader).context("Failed to parse patient record")?;

    let engine = RiskEngine::with_clock(SystemClock, EngineConfig::from_env_or_default());
    tracing::debug!("Using {}", engine.config().model.algorithm_version());

    match engine.assess(&input) {
        Ok(assessment) => {
            write_json(std::io::stdout().lock(), &assessment)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(RiskError::InvalidInput(issues)) => {
            write_json(
                std::io::stdout().lock(),
                &serde_json::json!({ "issues": issues }),
            )?;
            Ok(ExitCode::from(EXIT_INVALID_INPUT))
        }
        Err(e) => Err(e).context("Risk calculation failed"),
    }
}
