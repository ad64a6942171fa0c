//! Command-line front end of `kcdc-sky`.
//!
//! Usage:
//! ```text
//! kcdc-sky augment <INPUT> <OUTPUT> [--max-distance D] [--hammer-aitoff] [--strict]
//! kcdc-sky skymap <INPUT> <BASE> [--emin E] [--emax E] [--block-size N]
//!                 [--oversampling K] [--seed S] [--summary FILE] [--params FILE]
//!                 [--keep-partial | --drop-partial]
//! ```
//!
//! Log verbosity defaults to `info`; `RUST_LOG` overrides it, `-v`/`-q` raise or lower it.
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use log::{info, LevelFilter};

use kcdc_sky::params::{KcdcParams, KcdcParamsBuilder, Projection};
use kcdc_sky::pipeline::{augment, statistics};

#[derive(Parser, Debug)]
#[command(
    name = "kcdc-sky",
    version,
    about = "Sky coordinates and sky maps from KCDC air-shower exports",
    long_about = None
)]
struct Cli {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append RA, DEC, LON, LAT, JDAYS and DIST to every record
    Augment(AugmentArgs),
    /// Build the real and time-scrambled sky maps
    Skymap(SkymapArgs),
}

#[derive(Args, Debug)]
struct AugmentArgs {
    /// KCDC export to read
    input: Utf8PathBuf,

    /// Augmented file to write
    output: Utf8PathBuf,

    /// Keep only records within this distance (degrees) of the target; 0 keeps all
    #[arg(long)]
    max_distance: Option<f64>,

    /// Write Hammer–Aitoff projected coordinates instead of plain angles
    #[arg(long)]
    hammer_aitoff: bool,

    /// Abort on the first malformed record instead of zero-filling it
    #[arg(long)]
    strict: bool,

    /// JSON parameter file; command-line options take precedence
    #[arg(long)]
    params: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
struct SkymapArgs {
    /// KCDC export to read
    input: Utf8PathBuf,

    /// Output base: writes <BASE>.nreal.dat and <BASE>.nfake.dat
    base: Utf8PathBuf,

    /// Lower energy bound (inclusive)
    #[arg(long, allow_hyphen_values = true)]
    emin: Option<f64>,

    /// Upper energy bound (inclusive)
    #[arg(long, allow_hyphen_values = true)]
    emax: Option<f64>,

    /// Events per resampling block
    #[arg(long)]
    block_size: Option<usize>,

    /// Background draws per event
    #[arg(long)]
    oversampling: Option<u32>,

    /// Seed of the resampling generator
    #[arg(long)]
    seed: Option<u64>,

    /// Write a JSON run summary to this file
    #[arg(long)]
    summary: Option<Utf8PathBuf>,

    /// JSON parameter file; command-line options take precedence
    #[arg(long)]
    params: Option<Utf8PathBuf>,

    /// Resample the trailing partial block (default)
    #[arg(long, conflicts_with = "drop_partial")]
    keep_partial: bool,

    /// Discard the trailing partial block
    #[arg(long)]
    drop_partial: bool,

    /// Abort on the first malformed record instead of zero-filling it
    #[arg(long)]
    strict: bool,
}

fn init_logger(cli: &Cli) {
    let level = match (cli.quiet, cli.verbose) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_secs()
        .init();
}

fn base_params(path: Option<&Utf8PathBuf>) -> Result<KcdcParamsBuilder> {
    let params = match path {
        Some(p) => KcdcParams::from_json_path(p)
            .with_context(|| format!("Failed to load parameters from {p}"))?,
        None => KcdcParams::default(),
    };
    Ok(KcdcParamsBuilder::from_params(params))
}

/// Parameters of an `augment` run: the `--params` file (or the defaults), then the flags.
fn augment_params(args: &AugmentArgs) -> Result<KcdcParams> {
    let mut builder = base_params(args.params.as_ref())?;
    if let Some(d) = args.max_distance {
        builder = builder.max_distance(d);
    }
    if args.hammer_aitoff {
        builder = builder.projection(Projection::HammerAitoff);
    }
    if args.strict {
        builder = builder.strict(true);
    }
    builder.build().context("Invalid parameters")
}

/// Parameters of a `skymap` run: the `--params` file (or the defaults), then the flags.
fn skymap_params(args: &SkymapArgs) -> Result<KcdcParams> {
    let mut builder = base_params(args.params.as_ref())?;
    if let Some(v) = args.emin {
        builder = builder.emin(v);
    }
    if let Some(v) = args.emax {
        builder = builder.emax(v);
    }
    if let Some(v) = args.block_size {
        builder = builder.block_size(v);
    }
    if let Some(v) = args.oversampling {
        builder = builder.oversampling(v);
    }
    if let Some(v) = args.seed {
        builder = builder.seed(v);
    }
    if args.keep_partial {
        builder = builder.resample_partial_block(true);
    }
    if args.drop_partial {
        builder = builder.resample_partial_block(false);
    }
    if args.strict {
        builder = builder.strict(true);
    }
    builder.build().context("Invalid parameters")
}

fn run_augment(args: AugmentArgs) -> Result<()> {
    let params = augment_params(&args)?;
    augment(&args.input, &args.output, &params)
        .with_context(|| format!("Field augmentation of {} failed", args.input))?;
    Ok(())
}

fn run_skymap(args: SkymapArgs) -> Result<()> {
    let params = skymap_params(&args)?;
    let summary = statistics(&args.input, &args.base, &params)
        .with_context(|| format!("Sky-map run on {} failed", args.input))?;

    info!(
        "{} records, {} accepted, {} in the real map, {} background draws binned",
        summary.records, summary.accepted, summary.real_binned, summary.fake_binned
    );

    if let Some(path) = args.summary {
        summary
            .write_json(&path)
            .with_context(|| format!("Failed to write run summary {path}"))?;
        info!("Run summary written to {path}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&cli);

    match cli.command {
        Command::Augment(args) => run_augment(args),
        Command::Skymap(args) => run_skymap(args),
    }
}

#[cfg(test)]
mod cli_test {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("kcdc-sky").chain(args.iter().copied()))
    }

    fn skymap(args: &[&str]) -> SkymapArgs {
        match parse(args).unwrap().command {
            Command::Skymap(args) => args,
            other => panic!("expected skymap, got {other:?}"),
        }
    }

    fn augment_args(args: &[&str]) -> AugmentArgs {
        match parse(args).unwrap().command {
            Command::Augment(args) => args,
            other => panic!("expected augment, got {other:?}"),
        }
    }

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_negative_energy_bounds() {
        let args = skymap(&["skymap", "in.txt", "out", "--emin", "-3.5", "--emax", "-1"]);
        assert_eq!(args.emin, Some(-3.5));
        assert_eq!(args.emax, Some(-1.0));

        let params = skymap_params(&args).unwrap();
        assert_eq!((params.emin, params.emax), (-3.5, -1.0));
    }

    #[test]
    fn test_inverted_energy_bounds_rejected() {
        let args = skymap(&["skymap", "in.txt", "out", "--emin", "8", "--emax", "6"]);
        assert!(skymap_params(&args).is_err());
    }

    #[test]
    fn test_partial_block_flags() {
        let both = parse(&["skymap", "in.txt", "out", "--keep-partial", "--drop-partial"]);
        assert!(both.is_err());

        let defaults = skymap_params(&skymap(&["skymap", "in.txt", "out"])).unwrap();
        assert!(defaults.resample_partial_block);

        let dropped = skymap_params(&skymap(&["skymap", "in.txt", "out", "--drop-partial"]));
        assert!(!dropped.unwrap().resample_partial_block);
    }

    #[test]
    fn test_flags_override_params_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = r#"{"seed": 7, "oversampling": 5, "resample_partial_block": false}"#;
        file.write_all(json.as_bytes()).unwrap();
        let path = file.path().to_str().unwrap();

        let args = skymap(&["skymap", "in.txt", "out", "--params", path]);
        let from_file = skymap_params(&args).unwrap();
        assert_eq!(from_file.seed, 7);
        assert_eq!(from_file.oversampling, 5);
        assert!(!from_file.resample_partial_block);

        let args = skymap(&[
            "skymap",
            "in.txt",
            "out",
            "--params",
            path,
            "--seed",
            "9",
            "--keep-partial",
        ]);
        let params = skymap_params(&args).unwrap();
        assert_eq!(params.seed, 9);
        assert_eq!(params.oversampling, 5);
        assert!(params.resample_partial_block);
    }

    #[test]
    fn test_missing_params_file() {
        let args = skymap(&["skymap", "in.txt", "out", "--params", "/nonexistent/params.json"]);
        assert!(skymap_params(&args).is_err());
    }

    #[test]
    fn test_augment_flags() {
        let args = augment_args(&[
            "augment",
            "in.txt",
            "out.txt",
            "--hammer-aitoff",
            "--max-distance",
            "5",
            "--strict",
        ]);
        let params = augment_params(&args).unwrap();
        assert_eq!(params.projection, Projection::HammerAitoff);
        assert_eq!(params.max_distance, 5.0);
        assert!(params.strict);

        let plain = augment_params(&augment_args(&["augment", "in.txt", "out.txt"])).unwrap();
        assert_eq!(plain.projection, Projection::None);
        assert_eq!(plain.max_distance, KcdcParams::default().max_distance);
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = parse(&["-vv", "skymap", "in.txt", "out"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(parse(&["-q", "-v", "skymap", "in.txt", "out"]).is_err());
    }
}
