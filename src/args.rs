use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lampctl")]
#[command(version)]
#[command(about = "Control panel for a local LAMPP stack", long_about = None)]
pub(crate) struct Cli {
    /// Override the stack installation path (default: /opt/lampp)
    #[arg(long, global = true)]
    pub base: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Start a service
    Start {
        /// Service key (apache, mysql, ftp)
        service: String,
    },

    /// Stop a service
    Stop {
        /// Service key (apache, mysql, ftp)
        service: String,
    },

    /// Restart a service (stop, then start)
    Restart {
        /// Service key (apache, mysql, ftp)
        service: String,
    },

    /// Start the service if it is stopped, stop it if it is running
    Toggle {
        /// Service key (apache, mysql, ftp)
        service: String,
    },

    /// Start every service through the control script
    StartAll,

    /// Stop every service
    StopAll,

    /// Restart every service
    RestartAll,

    /// Reload the stack configuration
    Reload,

    /// Show the observed state of every service
    Status {
        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the tail of a service's error log
    Logs {
        /// Service whose error log to read (apache, mysql)
        service: String,

        /// Number of trailing lines to show
        #[arg(short = 'n', long, default_value = "50")]
        lines: usize,
    },

    /// Open the local site, phpMyAdmin, or the web directory
    Open {
        #[arg(value_enum)]
        target: OpenTarget,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum OpenTarget {
    /// http://localhost in the default browser
    Localhost,
    /// http://localhost/phpmyadmin in the default browser
    Phpmyadmin,
    /// The htdocs directory in the file manager
    Htdocs,
}
