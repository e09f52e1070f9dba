//! Offline `<wopi-discovery>` proof-key export.
//!
//! Hosts verify `X-WOPI-Proof` against the public parameters published
//! here. The document is deliberately emitted formatted so it can be
//! inspected and diffed by hand.

use crate::proof_key::{ProofKeyError, ProofKeyPair};

/// Render the discovery document for the validator's key pair.
pub fn discovery_xml(keys: &ProofKeyPair) -> Result<String, ProofKeyError> {
    let params = keys.public_params()?;
    // The attribute values are base-64 and never need XML escaping.
    Ok(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<wopi-discovery>
  <proof-key value="{value}" modulus="{modulus}" exponent="{exponent}" oldvalue="{oldvalue}" oldmodulus="{oldmodulus}" oldexponent="{oldexponent}"/>
</wopi-discovery>
"#,
        value = params.current.value,
        modulus = params.current.modulus,
        exponent = params.current.exponent,
        oldvalue = params.old.value,
        oldmodulus = params.old.modulus,
        oldexponent = params.old.exponent,
    ))
}
