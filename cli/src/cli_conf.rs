use {crate::prelude::*, serde::Deserialize};

/// Optional config file supplying defaults for the `run` flags.
///
/// Everything here can be overridden on the command line; a missing file is
/// simply an empty config.
#[derive(Clone, Debug, Default, Deserialize)]
pub(crate) struct CliConf {
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    #[serde(default)]
    pub(crate) access_token_ttl: Option<u64>,
    #[serde(default)]
    pub(crate) user_agent: Option<String>,
    #[serde(default)]
    pub(crate) proof_key: Option<PathBuf>,
    #[serde(default)]
    pub(crate) old_proof_key: Option<PathBuf>,
}

impl CliConf {
    pub(crate) fn load() -> AnyResult<Self> {
        let conf_path = expand_tilde(CLI_CONF_PATH)?;
        if !conf_path.exists() {
            return Ok(Self::default());
        }
        let conf = std::fs::read_to_string(&conf_path)?;

        Ok(toml::from_str(&conf)?)
    }
}
