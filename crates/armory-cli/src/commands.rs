use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use armory_catalog::{Catalog, LoadStatus};
use armory_server::{ArmoryServer, Environment, ServerConfig};
use armory_store::JsonFileStore;
use colored::Colorize;

use crate::cli::{CheckArgs, Cli, Command, ServeArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args, |key| std::env::var(key).ok())?;
    tracing::debug!(?config, "resolved configuration");
    println!(
        "{} Armory on {} (data: {}, {:?})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.data_dir.display(),
        config.environment
    );
    let server = ArmoryServer::new(config);
    print_report(&server.catalog().load_report());
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

/// Defaults, then the config file, then environment, then flags.
fn resolve_config(
    args: &ServeArgs,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.apply_env_from(lookup)?;

    if let Some(host) = &args.host {
        let ip = host
            .parse::<IpAddr>()
            .with_context(|| format!("invalid --host: {host}"))?;
        config.bind_addr.set_ip(ip);
    }
    if let Some(port) = args.port {
        config.bind_addr.set_port(port);
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(dir) = &args.public_dir {
        config.public_dir = Some(dir.clone());
    }
    if args.dev {
        config.environment = Environment::Development;
    }
    Ok(config)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let failed = check_data_dir(args.data_dir.clone());
    if failed > 0 {
        anyhow::bail!(
            "{failed} document(s) in {} failed to load",
            args.data_dir.display()
        );
    }
    println!("{} All documents loaded.", "✓".green().bold());
    Ok(())
}

fn check_data_dir(data_dir: PathBuf) -> usize {
    let catalog = Catalog::load(Arc::new(JsonFileStore::new(data_dir)));
    print_report(&catalog.load_report())
}

/// Print one line per document and return how many failed to load.
fn print_report(report: &[LoadStatus]) -> usize {
    for status in report {
        let mark = if status.loaded {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "{} {:<12} {:<28} {:>4} groups {:>6} records",
            mark,
            status.dataset.bold(),
            status.path.dimmed(),
            status.groups,
            status.records
        );
    }
    report.iter().filter(|status| !status.loaded).count()
}
