// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! TorX adapter binary entry point.

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use torx_adapter::cli::{Cli, CodecKind};
use torx_adapter::config::AdapterConfig;
use torx_adapter::engine::{Engine, SessionEnd};
use torx_adapter::env;
use torx_adapter::gateway;
use torx_adapter::sut::{ByteCodec, LabelCodec, LineCodec, ProcessGateway};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    // Exit explicitly: a stdin read blocked in the runtime's I/O pool would
    // otherwise keep the process alive after end-of-test.
    let code = match run(&cli).await {
        Ok(end) => {
            info!(?end, "adapter finished");
            0
        }
        Err(err) => {
            eprintln!("torx-adapter: {err:#}");
            1
        }
    };
    std::process::exit(code);
}

fn init_tracing(directive: Option<&str>) {
    let filter = directive
        .map(str::to_string)
        .or_else(env::log_filter)
        .map(EnvFilter::new)
        .unwrap_or_else(|| {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: &Cli) -> anyhow::Result<SessionEnd> {
    let config = AdapterConfig::from_env(cli.default_timeout());

    match cli.codec {
        CodecKind::Line => {
            if let Some(table) = &cli.table {
                warn!(table = %table.display(), "label table ignored by the line codec");
            }
            serve(&cli.command, LineCodec, &config).await
        }
        CodecKind::Bytes => {
            let codec = match &cli.table {
                Some(path) => ByteCodec::load(path)
                    .with_context(|| format!("failed to load label table {}", path.display()))?,
                None => ByteCodec::fwgc(),
            };
            serve(&cli.command, codec, &config).await
        }
    }
}

async fn serve<C: LabelCodec>(
    command: &[String],
    codec: C,
    config: &AdapterConfig,
) -> anyhow::Result<SessionEnd> {
    let (handle, inbox) = gateway::channel();
    let sut = ProcessGateway::spawn(command, codec, handle)
        .await
        .context("failed to start the SUT")?;

    let mut engine = Engine::new(sut, inbox, config);
    let end = engine.run(tokio::io::stdin(), tokio::io::stdout()).await?;
    Ok(end)
}
