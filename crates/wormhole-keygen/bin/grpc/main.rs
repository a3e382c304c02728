mod cli;

use crate::cli::{LogFormatArg, CLI};
use anyhow::Context;
use clap::Parser;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wormhole_keygen::{
    buffer_size_from, KeyGenerator, KeyGeneratorSettings, KgsRpcConfig, KgsRpcFetcher,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;
    init_tracing(config.log_format);

    let fetch_timeout = config.fetch_timeout_ms.map(Duration::from_millis);
    let settings = KeyGeneratorSettings::builder()
        .buffer_size(buffer_size_from(config.buffer_size)?)
        .fetch_timeout(fetch_timeout)
        .build();
    let rpc_config = KgsRpcConfig::builder()
        .hostname(config.kgs_hostname)
        .port(config.kgs_port)
        .request_timeout(fetch_timeout)
        .build();

    info!(
        kgs = %rpc_config.uri(),
        buffer_size = settings.buffer_size,
        count = config.count,
        "drawing keys"
    );

    let fetcher = KgsRpcFetcher::new(&rpc_config)?;
    let generator = KeyGenerator::with_settings(settings, fetcher)?;

    for drawn in 0..config.count {
        let key = generator
            .new_key()
            .await
            .with_context(|| format!("failed to draw key {} of {}", drawn + 1, config.count))?;
        println!("{key}");
    }

    Ok(())
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}
