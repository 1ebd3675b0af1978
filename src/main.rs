use std::path::Path;
use std::process::exit;

use anyhow::{anyhow, Result};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};

use citypages::build::{self, RunOutcome};
use citypages::config::Config;
use citypages::{archive, deploy};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let matches = App::new("citypages")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generates static city landing pages in bounded daily batches")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("project")
                .short("p")
                .long("project")
                .global(true)
                .takes_value(true)
                .help("Project directory (defaults to searching upward from the current directory)"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Run one generation batch and rebuild the output directory")
                .arg(
                    Arg::with_name("batch")
                        .short("b")
                        .long("batch")
                        .takes_value(true)
                        .help("Override the configured maximum batch size"),
                ),
        )
        .subcommand(
            SubCommand::with_name("deploy")
                .about("Pack the output directory and upload it to Cloudflare Pages"),
        )
        .get_matches();

    let result = match matches.subcommand() {
        ("build", Some(sub)) => run_build(sub),
        ("deploy", Some(sub)) => run_deploy(sub),
        _ => unreachable!("clap requires a subcommand"),
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        exit(1);
    }
}

fn run_build(matches: &ArgMatches) -> Result<()> {
    let mut config = load_config(matches)?;
    if let Some(batch) = matches.value_of("batch") {
        config.max_batch = batch
            .parse()
            .map_err(|_| anyhow!("--batch must be a non-negative integer"))?;
    }

    match build::run(&config)? {
        RunOutcome::Generated { pages, remaining } => {
            println!(
                "Generated {} pages ({} cities remaining):",
                pages.len(),
                remaining,
            );
            for page in pages {
                println!("  {}", page);
            }
        }
        RunOutcome::BacklogExhausted => {
            println!("No remaining cities to generate.");
        }
        RunOutcome::NoData => {
            println!(
                "No cities loaded. Ensure `{}` is present.",
                config.dataset.display(),
            );
        }
    }
    Ok(())
}

fn run_deploy(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let archive_path = config.output_directory.with_extension("tar.gz");
    archive::pack(&config.output_directory, &archive_path)?;

    let credentials = deploy::Credentials::from_env()?;
    let url = deploy::deploy(&credentials, &archive_path)?;
    println!("Deployed to {}", url);
    Ok(())
}

fn load_config(matches: &ArgMatches) -> Result<Config> {
    match matches.value_of("project") {
        Some(dir) => Config::from_directory(Path::new(dir)),
        None => Config::from_directory(&std::env::current_dir()?),
    }
}
