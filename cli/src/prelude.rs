pub(crate) use {
    crate::{cli_conf::CliConf, display::*, error::WopitestCliError},
    anyhow::{anyhow, Result as AnyResult},
    clap::{Args, Parser, Subcommand, ValueEnum},
    colored::Colorize,
    std::path::PathBuf,
};

// Where to find the optional config file.
pub(crate) const CLI_CONF_PATH: &str = "~/.wopitest/conf.toml";

// == Used by clap ==

/// Expands `~/` to the user's home directory in path arguments.
pub(crate) fn expand_tilde(path: &str) -> AnyResult<PathBuf> {
    if path.starts_with("~/") {
        match home::home_dir() {
            Some(home) => return Ok(home.join(&path[2..])),
            None => return Err(anyhow!("Could not find home directory")),
        }
    }

    Ok(path.into())
}
