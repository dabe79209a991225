mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use scanmark_ocr::CommandEngine;
use scanmark_rs::{BatchError, BatchRunner, RunLog};
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
  let filter = EnvFilter::try_from_env("SCANMARK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .init();
}

fn connect_engine(args: &Args) -> Result<CommandEngine> {
  CommandEngine::connect(&args.engine, args.engine_config())
    .map_err(BatchError::from)
    .with_context(|| format!("cannot start OCR bridge {}", args.engine.display()))
}

#[tokio::main]
async fn main() -> ExitCode {
  let args = Args::parse();
  init_tracing();

  let log = RunLog::start(&args.log_dir, args.echo());
  log.info("Starting batch OCR");
  log.info(format!("Initializing OCR engine via {}", args.engine.display()));

  let engine = match connect_engine(&args) {
    Ok(engine) => engine,
    Err(e) => {
      log.error(format!("{:#}", e));
      return ExitCode::FAILURE;
    }
  };
  let config = engine.config();
  log.info(format!(
    "OCR engine ready: {} (model {}, device {})",
    engine.program().display(),
    config.model,
    config.device
  ));

  let runner = BatchRunner::new(engine, args.batch_options(), log);

  let cancel = runner.cancel_flag();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      cancel.store(true, Ordering::SeqCst);
    }
  });

  match runner.run().await {
    Ok(outcome) => ExitCode::from(outcome.exit_code() as u8),
    Err(_) => ExitCode::FAILURE,
  }
}
