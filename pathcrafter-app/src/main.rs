use anyhow::Result;
use clap::Parser;
use commands::{Cli, run};
use pathcrafter_common::observability::{LogConfig, init_logging};
use pathcrafter_config::load_config;
use pathcrafter_runtime::PathcrafterRuntime;
use std::time::Duration;
mod commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Config: file, then PATHCRAFTER__* env
    let (cfg, cfg_path) = load_config(cli.config.as_deref())?;

    // 2) Logging from the `logging` section
    let mut log = LogConfig::from_settings("pathcrafter", &cfg.logging);
    log.emit_stderr |= cli.verbose;
    let log_path = init_logging(log)?;
    tracing::debug!(config = %cfg_path.display(), log = %log_path.display(), "pathcrafter.start");

    let runtime = PathcrafterRuntime::build("pathcrafter", None)?;
    runtime.cancel_on_ctrl_c();
    let handle = runtime.handle();
    let outcome = runtime.block_on(run(cli.command, cfg, cfg_path, handle));
    runtime.shutdown(Duration::from_millis(500));
    outcome
}
