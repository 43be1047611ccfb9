//! evhz - Real-time input device event rate meter

use anyhow::{Context, Result};
use std::process::ExitCode;

use evhz::{
    app::App,
    config::{Config, SourceKind},
    reporter::{ReportSink, WriterSink},
    shutdown::ShutdownFlag,
    source::open_source,
};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = Config::load().context("Failed to load config")?;

    let shutdown = ShutdownFlag::new();
    shutdown
        .install_ctrlc_handler()
        .context("Failed to install Ctrl-C handler")?;

    // Printed before the terminal can switch to raw mode
    WriterSink::stdout().emit(exit_hint(config.source.kind));

    let mut source = open_source(config.source.kind).context("Failed to open event source")?;
    log::info!("Reading events from {}", source.name());

    let sink = WriterSink::stdout().raw_mode(source.raw_terminal());
    let mut app = App::new(&config, sink, shutdown);
    app.run(source.as_mut());

    let report = app.session_report(source.name());
    let raw_mode = source.raw_terminal();
    // Restore the terminal before the final summary
    drop(source);

    let mut sink = WriterSink::stdout().raw_mode(false);
    if raw_mode {
        sink.emit("");
    }
    for line in report.to_lines(config.report.precision) {
        sink.emit(&line);
    }

    if let Some(path) = &config.report.export_path {
        report
            .export_json(path)
            .with_context(|| format!("Failed to export report to {}", path.display()))?;
        log::info!("Session report written to {}", path.display());
    }

    Ok(())
}

fn exit_hint(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::Terminal => {
            "Checking input events in this terminal, press q, Esc or Ctrl-C to exit."
        }
        SourceKind::Evdev => {
            "Checking input events from all keyboards and mice, press Ctrl-C to exit."
        }
        SourceKind::Auto => "Checking input events from keyboards and mice, press Ctrl-C to exit.",
    }
}
