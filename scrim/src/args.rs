use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "scrim")]
#[command(about = "Run a multi-game scrimmage between two UMI engines")]
pub struct Args {
    /// Path to the match configuration file
    pub config: PathBuf,

    /// Directory that engine paths and match artifacts resolve against.
    /// Defaults to the configuration file's directory.
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// Log every protocol line exchanged with the engines
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}
