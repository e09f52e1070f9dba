//! Wopitest CLI entry point.

mod cli_conf;
mod display;
mod error;
mod prelude;
mod proof_keys;
mod run;
mod utils;

use crate::{prelude::*, proof_keys::*, run::*};

#[derive(Parser)]
#[command(
    name = "wopitest",
    version,
    about = "WOPI protocol conformance validator",
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Run conformance test cases against a WOPI endpoint")]
    Run(RunArgs),

    #[command(about = "Export the validator's proof-key discovery XML")]
    ExportProofKeys(ExportProofKeysArgs),
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Run(args) => run_tests(args).await,
        Command::ExportProofKeys(args) => export_proof_keys(args).await,
    };

    match outcome {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, clap::CommandFactory};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_the_documented_short_flags() {
        let cli = Cli::try_parse_from([
            "wopitest",
            "run",
            "-w",
            "http://host/wopi/files/1",
            "-t",
            "tok",
            "-l",
            "600",
            "-n",
            "PutRelativeFile.SuggestedExtension",
            "-c",
            "OfficeOnline",
            "-g",
            "Locks",
            "-r",
            "cases.xml",
            "--ignore-skipped",
        ]);
        assert!(cli.is_ok(), "{:?}", cli.err());
    }
}
