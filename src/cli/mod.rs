pub mod builders;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Watch a workspace and remind about unpushed commits until Ctrl-C
    Watch {
        /// Workspace to watch (defaults to the current directory)
        path: Option<PathBuf>,

        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },

    /// Scan a workspace once and exit
    Check {
        path: Option<PathBuf>,

        #[arg(short = 'c', long)]
        config: Option<PathBuf>,
    },
}

impl Commands {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Commands::Watch { path, .. } | Commands::Check { path, .. } => path.as_ref(),
        }
    }

    pub fn config(&self) -> Option<&PathBuf> {
        match self {
            Commands::Watch { config, .. } | Commands::Check { config, .. } => config.as_ref(),
        }
    }
}
