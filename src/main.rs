use clap::Parser;
use clap::error::ErrorKind as ClapErrorKind;

use kaggle_bridge::{DEBUG_VAR, Error, Outcome, Params, authenticate, invoke};

/// Runs one Kaggle API operation and prints the outcome as YAML.
///
/// Operation parameters are read from the environment (COMPETITION, DATASET,
/// KERNEL, DESTINATION, QUIET, PAGE, ...).
#[derive(Parser, Debug)]
#[command(name = "kaggle-bridge", version, about)]
struct Cli {
    /// competitions, datasets, kernels or debug
    command: Option<String>,

    /// Operation within the command, e.g. list or download
    subcommand: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let params = Params::from_env();
    let debug = params.contains(DEBUG_VAR);

    let default_filter = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    let outcome = match Cli::try_parse() {
        Ok(cli) => invoke(
            cli.command.as_deref(),
            cli.subcommand.as_deref(),
            &params,
            debug,
            authenticate,
        )?,
        Err(e) if matches!(e.kind(), ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => Outcome::from(Error::Dispatch(e.to_string().trim().to_string())),
    };

    log::debug!("{outcome:?}");
    print!("{}", outcome.to_yaml()?);
    Ok(())
}
