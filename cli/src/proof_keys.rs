use {
    crate::{command_title, prelude::*, utils::load_proof_keys},
    wopitest_sdk::discovery::discovery_xml,
};

#[derive(Args, Debug)]
pub(crate) struct ExportProofKeysArgs {
    #[arg(
        long = "proof-key",
        help = "PEM file with the current RSA proof key",
        value_name = "PEM"
    )]
    proof_key: Option<PathBuf>,

    #[arg(
        long = "old-proof-key",
        help = "PEM file with the previous RSA proof key",
        value_name = "PEM"
    )]
    old_proof_key: Option<PathBuf>,

    #[arg(
        long = "out",
        short = 'o',
        help = "Write the discovery XML to this path instead of stdout",
        value_name = "PATH"
    )]
    out: Option<PathBuf>,
}

/// Emit the `<wopi-discovery>` document hosts use to verify proof headers.
pub(crate) async fn export_proof_keys(
    args: ExportProofKeysArgs,
) -> Result<i32, WopitestCliError> {
    command_title!("Exporting proof-key discovery XML");

    if args.proof_key.is_none() {
        log::warn!(
            "exporting ephemeral keys; hosts can only verify runs that use the same PEM keys"
        );
    }
    let keys = load_proof_keys(args.proof_key.as_deref(), args.old_proof_key.as_deref())?;
    let xml = discovery_xml(&keys).map_err(WopitestCliError::Crypto)?;

    match args.out {
        Some(path) => {
            std::fs::write(&path, &xml).map_err(WopitestCliError::Io)?;
            println!("{} wrote {}", "✔".green().bold(), path.display());
        }
        None => print!("{xml}"),
    }
    Ok(0)
}
