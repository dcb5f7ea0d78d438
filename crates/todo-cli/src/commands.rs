use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use todo_server::{ServerConfig, TodoServer};
use todo_store::{ItemStore, LogItemStore, SyncMode};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Config(args) => cmd_config(args),
        Command::Compact(args) => cmd_compact(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None => Ok(ServerConfig::default()),
    }
}

fn apply_overrides(config: &mut ServerConfig, args: &ServeArgs) {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(data) = &args.data {
        config.storage.data_path = Some(data.clone());
    }
    if let Some(name) = &args.app_name {
        config.application_name = name.clone();
    }
    if let Some(sync) = args.sync {
        config.storage.sync_mode = sync.into();
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let server = TodoServer::new(config)?;
    println!(
        "{} Serving on {} (application {})",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold(),
        server.config().application_name.cyan()
    );

    let runtime = tokio::runtime::Runtime::new().context("starting runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn cmd_compact(args: CompactArgs) -> anyhow::Result<()> {
    let (before, after, live) = compact_log(&args.data)?;
    println!(
        "{} Compacted {}: {} -> {} bytes, {} live items",
        "✓".green().bold(),
        args.data.display().to_string().bold(),
        before,
        after.to_string().green(),
        live
    );
    Ok(())
}

fn compact_log(path: &Path) -> anyhow::Result<(u64, u64, u64)> {
    let store = LogItemStore::open(path, SyncMode::EveryWrite)
        .with_context(|| format!("opening record log {}", path.display()))?;
    let before = store.log_len()?;
    let after = store.compact()?;
    let live = store.count()?;
    Ok((before, after, live))
}
