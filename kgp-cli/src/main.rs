// ABOUTME: Main entry point for the kgp image viewer
// ABOUTME: Displays images or reports terminal graphics capabilities

use anyhow::{Context, Result};
use clap::Parser;
use kgp_cli::cli::Cli;
use kgp_cli::config::Config;
use kgp_cli::display::{TerminalGeometry, load_image, resolve_medium, resolve_placeholders};
use kgp_cli::output::{JsonFormatter, OutputFormat, TableFormatter};
use kgp_cli::settings::Settings;
use kgp_sdk::{ImageId, KgpEncoder, KgpError, TerminalEnvironment, query_capabilities};
use std::env;
use std::io::{self, BufRead, Write};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        if let Some(help) = e.downcast_ref::<KgpError>().and_then(KgpError::help_text) {
            eprintln!();
            eprintln!("{}", help);
        }
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    if cli.query {
        return print_capabilities(&cli);
    }

    let settings = Settings::resolve(&cli, &config)?;
    let geometry = TerminalGeometry::detect()?;
    let limits = settings.constraints(&geometry);

    let environment = TerminalEnvironment::detect();
    let placeholders = resolve_placeholders(settings.placeholder, &limits, &environment);
    let medium = resolve_medium(settings.medium, settings.png, &environment);

    let image = load_image(&settings.path, geometry.cell_size(), &limits, settings.png)?;
    let image_id = settings.image_id.unwrap_or_else(ImageId::random);
    log::debug!("Image ID: {}", image_id);

    let mut encoder = KgpEncoder::new(image.into_request(image_id), medium, placeholders)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    encoder.write_to(&mut out, settings.chunk_size)?;

    if settings.wait {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        out.write_all(encoder.delete().as_bytes())?;
        out.flush()?;
    }

    Ok(())
}

fn print_capabilities(cli: &Cli) -> Result<()> {
    let environment = TerminalEnvironment::detect();
    let report = query_capabilities(&environment);

    // Determine if color should be used
    let use_color = !cli.no_color
        && env::var("NO_COLOR").is_err()
        && env::var("TERM").unwrap_or_default() != "dumb";

    let output = if cli.json {
        JsonFormatter::new(cli.pretty).format_report(&report)?
    } else {
        TableFormatter::new(use_color).format_report(&report)?
    };
    println!("{}", output);
    Ok(())
}
