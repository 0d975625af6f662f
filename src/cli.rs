use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "itkdb-browser")]
#[command(about = "Terminal browser for the ITk production database")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Print the version and exit
    #[arg(long)]
    pub version: bool,

    /// Write logs to this file instead of ITKDB_BROWSER_LOG_FILE
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn version_line() -> String {
        format!("itkdb-browser v{}", env!("CARGO_PKG_VERSION"))
    }
}
