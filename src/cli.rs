use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kimai")]
#[command(about = "Check and control running Kimai timesheets", long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true, env = "KIMAI_TRAY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the currently running task
    Status,

    /// List the ten most recently used tasks
    Recent,

    /// Restart a recent task by id
    Restart {
        /// Timesheet id (see `kimai recent`)
        id: i64,
    },

    /// Stop a running task
    Stop {
        /// Timesheet id. Defaults to the active task.
        id: Option<i64>,
    },

    /// Print the config file location
    Config,
}
