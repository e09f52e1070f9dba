use {
    crate::display::*,
    colored::Colorize,
    thiserror::Error,
};

/// Custom error definitions for the wopitest CLI. Takes care of displaying
/// a pretty summary in the console.
#[derive(Debug, Error)]
pub(crate) enum WopitestCliError {
    #[error("{error}{separator}\n{0}", error = "Error".red().bold(), separator = separator())]
    Any(anyhow::Error),
    #[error("{error}{separator}\n{0}", error = "IO Error".red().bold(), separator = separator())]
    Io(std::io::Error),
    #[error("{error}{separator}\n{0}", error = "Catalog Error".red().bold(), separator = separator())]
    Catalog(wopitest_sdk::CatalogError),
    #[error("{error}{separator}\n{0}", error = "Crypto Error".red().bold(), separator = separator())]
    Crypto(wopitest_sdk::proof_key::ProofKeyError),
    #[error("{error}{separator}\n{0}", error = "HTTP Error".red().bold(), separator = separator())]
    Http(wopitest_sdk::client::TransportError),
}
