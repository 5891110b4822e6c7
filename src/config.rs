use clap::Parser;
use std::path::PathBuf;

/// Answers newline-delimited JSON device requests on stdin, one response per line on stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "hubspace-bridge", version, about)]
pub struct Config {
    /// Device snapshot to serve (`[...]` or `{"devices": [...]}`)
    #[arg(short, long, env = "HUBSPACE_DEVICES")]
    pub devices: Option<PathBuf>,

    /// Log every request at debug level
    #[arg(long, env = "HUBSPACE_DEBUG")]
    pub debug: bool,
}

impl Config {
    pub fn log_filter(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}
