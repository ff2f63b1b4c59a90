// Author: Dustin Pilgrim
// License: MIT

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "idlelock",
    version = env!("CARGO_PKG_VERSION"),
    about = "Idle session lock with PIN unlock"
)]
pub struct Args {
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[arg(short, long, action)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    #[command(about = "Sign in and start a guarded session")]
    Login {
        user: String,
    },

    #[command(about = "Display lock state and idle timers")]
    Info {
        #[arg(long)]
        json: bool,
    },

    #[command(about = "Report user activity (pointer, keyboard, touch, scroll)")]
    Activity {
        kind: Option<String>,
    },

    #[command(about = "Submit the PIN to unlock the session")]
    Unlock {
        pin: String,

        #[arg(long)]
        json: bool,
    },

    #[command(about = "Log out immediately")]
    Logout,

    #[command(about = "Record the surface the user is on")]
    Route {
        path: String,
    },

    #[command(about = "Stop the running guard")]
    Stop,
}
