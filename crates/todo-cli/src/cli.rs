use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use todo_store::SyncMode;

#[derive(Parser)]
#[command(name = "todo", about = "Todo item service", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
    /// Rewrite a record log so it holds only live items
    Compact(CompactArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// Configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Address to listen on
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Record log path; items are kept in memory when unset
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// Name used in alert headers
    #[arg(long)]
    pub app_name: Option<String>,
    #[arg(long, value_enum)]
    pub sync: Option<SyncArg>,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompactArgs {
    /// Record log to compact
    #[arg(long)]
    pub data: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SyncArg {
    EveryWrite,
    OsDefault,
}

impl From<SyncArg> for SyncMode {
    fn from(arg: SyncArg) -> Self {
        match arg {
            SyncArg::EveryWrite => SyncMode::EveryWrite,
            SyncArg::OsDefault => SyncMode::OsDefault,
        }
    }
}
