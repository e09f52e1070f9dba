use {
    crate::{loading, prelude::*},
    std::path::Path,
    wopitest_sdk::ProofKeyPair,
};

/// Load the configured proof-key pair, or generate an ephemeral one when no
/// keys are configured.
///
/// Ephemeral keys are fine for a single run; hosts that verify proof against
/// a previously exported discovery document need persisted PEM keys.
pub(crate) fn load_proof_keys(
    proof_key: Option<&Path>,
    old_proof_key: Option<&Path>,
) -> Result<ProofKeyPair, WopitestCliError> {
    let keys_handle = loading!("Preparing proof keys...");

    let result = match (proof_key, old_proof_key) {
        (Some(current), Some(old)) => ProofKeyPair::from_pem_files(current, old),
        (None, None) => {
            log::warn!("no proof keys configured; generating an ephemeral pair");
            ProofKeyPair::generate()
        }
        _ => {
            keys_handle.error();
            return Err(WopitestCliError::Any(anyhow!(
                "Provide both --proof-key and --old-proof-key, or neither"
            )));
        }
    };

    match result {
        Ok(keys) => {
            keys_handle.success();
            Ok(keys)
        }
        Err(e) => {
            keys_handle.error();
            Err(WopitestCliError::Crypto(e))
        }
    }
}
