//! qrtag provisioning station entry point.
//!
//! Wires the camera, QR decoder, preview window, and PC/SC reader into the
//! application use cases.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ Cli::parse() + load_config()
//!  ├─ tracing_subscriber (RUST_LOG, else config level)
//!  ├─ Ctrl-C handler (Tokio task) ── raises StopSignal
//!  └─ spawn_blocking
//!       ├─ scan-write:   ThreadedFrameSource (capture thread)
//!       │                 + RqrrDecoder + preview  ─► QrDetector
//!       │                 + PcscReader ─► NfcHandler
//!       │                 ─► ProvisioningWorkflow::run()
//!       └─ show-records: PcscReader ─► NfcHandler ─► show_records()
//! ```
//!
//! The preview window is created on the blocking thread and never leaves it.

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qrtag_core::UriPattern;
use qrtag_station::{
    application::{
        detect_qr::{CameraScanner, Preview, QrDetector},
        provision::{ProvisioningWorkflow, WorkflowOptions},
        show_records::show_records,
        stop_signal::StopSignal,
    },
    cli::{Cli, Command},
    infrastructure::{
        camera::{frame_source::ThreadedFrameSource, nokhwa::NokhwaGrabber},
        console::ConsoleReporter,
        nfc::{handler::NfcHandler, pcsc::PcscReader},
        preview::{minifb::MinifbPreview, HeadlessPreview},
        qr_decode::RqrrDecoder,
        signal::spawn_ctrl_c_handler,
        storage::config::AppConfig,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config().context("failed to load configuration")?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!("qrtag starting");

    let stop = StopSignal::new();
    spawn_ctrl_c_handler(stop.clone());

    let command = cli.command;
    tokio::task::spawn_blocking(move || run_command(command, &config, stop))
        .await
        .context("station thread panicked")??;

    info!("qrtag stopped");
    Ok(())
}

fn run_command(command: Command, config: &AppConfig, stop: StopSignal) -> anyhow::Result<()> {
    match command {
        Command::ScanWrite { uri_pattern, .. } => scan_write(uri_pattern, config, stop),
        Command::ShowRecords => {
            let mut tags = NfcHandler::new(open_reader(config, stop)?);
            show_records(&mut tags, &mut ConsoleReporter::new())
                .context("failed to read tag records")
        }
    }
}

fn scan_write(
    uri_pattern: Option<UriPattern>,
    config: &AppConfig,
    stop: StopSignal,
) -> anyhow::Result<()> {
    let index = config.camera.index;
    let source = ThreadedFrameSource::start(move || NokhwaGrabber::open(index))
        .context("failed to open camera")?;
    let reader = open_reader(config, stop.clone())?;

    let preview: Box<dyn Preview> = if config.preview.enabled {
        Box::new(MinifbPreview::new(config.preview.window_title.clone()))
    } else {
        Box::new(HeadlessPreview)
    };
    let detector = QrDetector::new(Box::new(source), Box::new(RqrrDecoder::new()), preview, stop);

    if let Some(pattern) = &uri_pattern {
        info!(%pattern, "only URIs matching the pattern are accepted");
    }
    let mut workflow = ProvisioningWorkflow::new(
        CameraScanner::new(detector, uri_pattern),
        NfcHandler::new(reader),
        ConsoleReporter::new(),
        WorkflowOptions {
            verify_after_write: config.workflow.verify_after_write,
        },
    );

    let summary = workflow.run()?;
    println!(
        "Provisioned {} tag(s); {} failed write(s), {} failed verification(s).",
        summary.provisioned, summary.failed_writes, summary.failed_verifications
    );
    Ok(())
}

fn open_reader(config: &AppConfig, stop: StopSignal) -> anyhow::Result<PcscReader> {
    PcscReader::open(
        &config.nfc.reader,
        stop,
        Duration::from_millis(config.nfc.poll_interval_ms),
    )
    .context("failed to open NFC reader")
}
