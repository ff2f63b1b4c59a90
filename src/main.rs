// Author: Dustin Pilgrim
// License: MIT

mod app;
mod cli;
mod config;
mod core;
mod daemon;
mod guard_log;
mod ipc;
mod services;

use clap::Parser;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Args::parse();

    if let Some(cmd) = args.command.clone() {
        return app::command::run(cmd, args.config.as_deref()).await;
    }

    app::daemon_mode::run(args).await
}
