use clap::Parser;
use std::path::PathBuf;
use tokio::{
    select,
    signal::unix::{signal, SignalKind},
};

pub mod alert;
pub mod config;
pub mod gateway;
pub mod http;
pub mod message;
pub mod metrics;
pub mod relay;

#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Config file
    #[arg(short, long)]
    pub config: PathBuf,
}

/// Handle signals
pub fn signal_handler() {
    tokio::spawn(async move {
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        select! {
            _ = sigterm.recv() => {
                tracing::info!("SIGTERM received, exiting");
                std::process::exit(0);
            }
            _ = sigint.recv() => {
                tracing::info!("SIGINT received, exiting");
                std::process::exit(0);
            }
        }
    });
}
