use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crucible_bootstrap::config::Config;
use crucible_bootstrap::parse::{AttrValue, ShellParser};
use crucible_bootstrap::session::Session;
use crucible_bootstrap::{Error, Result};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to a crucible config TOML (defaults are used when absent)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse an APKBUILD and print the extracted package record
    Apkbuild {
        /// Path to the APKBUILD
        path: PathBuf,
        /// Print the record as JSON instead of one attribute per line
        #[arg(long)]
        json: bool,
    },
    /// Dump every resolved variable of a flat shell-dialect file
    Vars {
        /// Path to the file to scan
        path: PathBuf,
    },
    /// Parse a deviceinfo file and print its attributes
    Deviceinfo {
        /// Path to the deviceinfo file
        path: PathBuf,
    },
    /// Pick a default build architecture for a package in the aports tree
    Arch {
        /// Name of the package to look up
        pkgname: String,
        /// Aports tree to search (overrides the config)
        #[arg(long)]
        aports: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => crucible_bootstrap::config::load(path)?,
        None => Config::default(),
    };
    let mut session = Session::new(config);

    match args.cmd {
        Command::Apkbuild { path, json } => cmd_apkbuild(&mut session, &path, json),
        Command::Vars { path } => cmd_vars(&session, &path),
        Command::Deviceinfo { path } => cmd_deviceinfo(&path),
        Command::Arch { pkgname, aports } => cmd_arch(&mut session, &pkgname, aports),
    }
}

fn cmd_apkbuild(session: &mut Session, path: &Path, json: bool) -> Result<()> {
    let record = crucible_bootstrap::parse::apkbuild(session, path)?;

    if json {
        let s = serde_json::to_string_pretty(&record)
            .map_err(|e| Error::msg(format!("json encode error: {e}")))?;
        println!("{s}");
        return Ok(());
    }

    for (name, value) in record.attributes() {
        match value {
            AttrValue::Scalar(s) => println!("{name}={s}"),
            AttrValue::Array(items) => println!("{name}=[{}]", items.join(", ")),
        }
    }
    Ok(())
}

fn cmd_vars(session: &Session, path: &Path) -> Result<()> {
    let data = std::fs::read_to_string(path)?;
    let parsed = ShellParser::parse(&data, &session.build_env())?;
    for (name, value) in parsed.variables() {
        println!("{name}={value}");
    }
    Ok(())
}

fn cmd_deviceinfo(path: &Path) -> Result<()> {
    let info = crucible_bootstrap::parse::deviceinfo(path)?;
    for (name, value) in info.attributes() {
        println!("{name}={value}");
    }
    Ok(())
}

fn cmd_arch(session: &mut Session, pkgname: &str, aports: Option<PathBuf>) -> Result<()> {
    if let Some(aports) = aports {
        session.config.aports = aports;
    }
    let arch = crucible_bootstrap::build::autodetect::arch(session, pkgname)?;
    println!("{arch}");
    Ok(())
}
