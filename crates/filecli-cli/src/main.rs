//! Filecli CLI
//!
//! 默认启动文件服务器；`upload` / `download` 子命令作为客户端使用。

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use filecli_core::{FileServer, LogLevel, TransferClient};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, DownloadArgs, ServerArgs, UploadArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command {
        Some(Commands::Upload(args)) => run_upload(&args).await.context("Upload failed"),
        Some(Commands::Download(args)) => run_download(&args).await.context("Download failed"),
        None => run_server(cli.server).await,
    }
}

fn init_logging(level: LogLevel) {
    // 桥接 log crate（filecli-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.as_filter()))
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_server(args: ServerArgs) -> Result<()> {
    let config = args.into_config()?;
    tracing::debug!("Server config: {:?}", config);

    FileServer::bind(config).await?.serve().await
}

async fn run_upload(args: &UploadArgs) -> Result<()> {
    let transfer = args.resolve()?;
    let client = TransferClient::with_host(&transfer.server, transfer.port)?;

    let remote = Some(transfer.remote.as_str()).filter(|r| !r.is_empty());
    let reply = client.upload(Path::new(&transfer.local), remote).await?;
    tracing::debug!("Server replied: {}", reply);

    println!("File uploaded successfully");
    Ok(())
}

async fn run_download(args: &DownloadArgs) -> Result<()> {
    let transfer = args.resolve()?;
    let client = TransferClient::with_host(&transfer.server, transfer.port)?;

    let local = Some(Path::new(&transfer.local)).filter(|l| !l.as_os_str().is_empty());
    let saved = client.download(&transfer.remote, local).await?;

    println!(
        "The file has been successfully downloaded to: {}",
        saved.display()
    );
    Ok(())
}
