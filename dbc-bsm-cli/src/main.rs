//! DBC to BSM command-line converter
//!
//! Loads one or more DBC files and writes the beSTORM CAN configuration for
//! all of their messages. Settings come from an optional config.toml and are
//! overridden by command-line flags.

use anyhow::{bail, Context, Result};
use clap::Parser;
use dbc_bsm::{Converter, OversizePolicy};
use std::io::Write;
use std::path::PathBuf;

mod config;

/// DBC to BSM - generate beSTORM CAN fuzzing configurations from DBC files
#[derive(Parser, Debug)]
#[command(name = "dbc-bsm-cli")]
#[command(about = "Convert DBC message definitions into a beSTORM (BSM) configuration", long_about = None)]
#[command(version)]
struct Args {
    /// Path to DBC file(s) (can be repeated)
    #[arg(long, value_name = "FILE")]
    dbc: Vec<PathBuf>,

    /// Output file for the BSM document (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Add a "Generated on" comment with the current local time
    #[arg(long)]
    timestamps: bool,

    /// How to handle messages spanning more than 32 bits
    #[arg(long, value_name = "POLICY", value_parser = parse_oversize)]
    oversize: Option<OversizePolicy>,

    /// Only convert these message IDs (decimal or 0x hex, can be repeated)
    #[arg(long = "message", value_name = "ID", value_parser = config::parse_can_id)]
    messages: Vec<u32>,

    /// Print the conversion summary as JSON to stderr
    #[arg(long)]
    summary: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn parse_oversize(text: &str) -> std::result::Result<OversizePolicy, String> {
    match text.to_ascii_lowercase().as_str() {
        "reject" => Ok(OversizePolicy::Reject),
        "clamp" => Ok(OversizePolicy::Clamp),
        other => Err(format!("unknown policy '{}', expected 'reject' or 'clamp'", other)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("DBC to BSM CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using converter library v{}", dbc_bsm::VERSION);

    let mut app_config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => config::AppConfig::default(),
    };
    apply_overrides(&mut app_config, &args);

    if app_config.input.dbc_files.is_empty() {
        bail!("no DBC input given, use --dbc <FILE> or [input] dbc_files in the config file");
    }

    let mut converter = Converter::with_config(app_config.converter_config());
    for dbc_path in &app_config.input.dbc_files {
        converter
            .add_dbc(dbc_path)
            .with_context(|| format!("Error loading DBC: {:?}", dbc_path))?;
    }

    let stats = converter.database_stats();
    log::info!(
        "Loaded {} messages ({} signals, {} multiplexed messages)",
        stats.num_messages,
        stats.num_signals,
        stats.num_multiplexed_messages
    );

    // Render fully before touching the output so a failed conversion leaves no partial file
    let mut buffer = Vec::new();
    let summary = converter
        .convert(&mut buffer)
        .context("Conversion failed")?;

    match &app_config.output.path {
        Some(path) => {
            std::fs::write(path, &buffer)
                .with_context(|| format!("Failed to write output file: {:?}", path))?;
            log::info!("Wrote {:?}", path);
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(&buffer).context("Failed to write to stdout")?;
            handle.flush().context("Failed to write to stdout")?;
        }
    }

    if args.summary {
        eprintln!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(app_config: &mut config::AppConfig, args: &Args) {
    app_config.input.dbc_files.extend(args.dbc.iter().cloned());
    if args.output.is_some() {
        app_config.output.path = args.output.clone();
    }
    if args.timestamps {
        app_config.output.timestamps = true;
    }
    if let Some(policy) = args.oversize {
        app_config.layout.oversize = policy;
    }
    if !args.messages.is_empty() {
        app_config.filtering.message_ids = Some(args.messages.clone());
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "dbc-bsm-cli",
            "--dbc",
            "a.dbc",
            "--dbc",
            "b.dbc",
            "-o",
            "out.bsm",
            "--oversize",
            "clamp",
            "--message",
            "0x64",
            "--message",
            "200",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.dbc.len(), 2);
        assert_eq!(args.oversize, Some(OversizePolicy::Clamp));
        assert_eq!(args.messages, vec![100, 200]);
        assert_eq!(args.verbose, 2);
        assert!(!args.timestamps);
    }

    #[test]
    fn test_bad_oversize_policy() {
        let result = Args::try_parse_from(["dbc-bsm-cli", "--oversize", "wrap"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_win() {
        let args = Args::try_parse_from([
            "dbc-bsm-cli",
            "--dbc",
            "extra.dbc",
            "--timestamps",
            "--message",
            "7",
        ])
        .unwrap();

        let mut app_config: config::AppConfig = toml::from_str(
            r#"
            [input]
            dbc_files = ["base.dbc"]

            [filtering]
            message_ids = [1, 2]
            "#,
        )
        .unwrap();
        apply_overrides(&mut app_config, &args);

        assert_eq!(
            app_config.input.dbc_files,
            vec![PathBuf::from("base.dbc"), PathBuf::from("extra.dbc")]
        );
        assert!(app_config.output.timestamps);
        assert_eq!(app_config.filtering.message_ids, Some(vec![7]));
        assert_eq!(app_config.layout.oversize, OversizePolicy::Reject);
    }
}
