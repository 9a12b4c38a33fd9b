use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "simple-html-downloader")]
#[command(about = "Download a list of URLs with basic auth", long_about = None)]
pub struct Cli {
    /// Settings file (defaults to downloader.toml or $HTML_DOWNLOADER_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Without a subcommand the desktop window opens
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one batch from the terminal
    Fetch(FetchArgs),
}

#[derive(clap::Args, Debug)]
pub struct FetchArgs {
    /// File with one URL per line, or `-` for stdin
    #[arg(long)]
    pub urls: PathBuf,

    /// Download folder
    #[arg(long)]
    pub out: PathBuf,

    /// Credentials file (`*.txt` as `username,password`, otherwise INI with [AUTH])
    #[arg(long)]
    pub credentials: Option<PathBuf>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,

    /// Write the URLs to retry to this file
    #[arg(long)]
    pub failed_out: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}
