//! WOPI proof-key signing.
//!
//! Requests that require proof carry `X-WOPI-Proof` and `X-WOPI-ProofOld`:
//! base-64 RSASSA-PKCS1-v1_5/SHA-256 signatures over a canonical byte layout
//! of (access token, upper-cased URL, timestamp). The host re-derives the
//! buffer from the request it received and checks the signatures against the
//! public parameters published in the validator's discovery document.
//!
//! Canonical layout, all lengths big-endian 32-bit signed:
//!
//! ```text
//! [ len(token) | token-utf8 | len(UPPER(url)) | url-utf8 | len(8) | ts-i64-be ]
//! ```
//!
//! The byte order is fixed by the protocol and independent of the host CPU;
//! `to_be_bytes` is used throughout rather than any network-order primitive.

use {
    base64::{engine::general_purpose::STANDARD as BASE64, Engine as _},
    chrono::{DateTime, Utc},
    openssl::{
        hash::MessageDigest,
        pkey::{PKey, Private},
        rsa::Rsa,
        sign::Signer,
    },
    std::path::Path,
    thiserror::Error,
};

/// Ticks (100ns units) between 0001-01-01T00:00:00Z and the Unix epoch.
const TICKS_AT_UNIX_EPOCH: i64 = 621_355_968_000_000_000;

#[derive(Debug, Error)]
pub enum ProofKeyError {
    #[error("access token is required for proof signing")]
    MissingAccessToken,
    #[error("canonical proof URL must be ASCII: '{0}'")]
    NonAsciiUrl(String),
    #[error("openssl failure: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),
    #[error("failed to read key material from '{path}': {source}")]
    KeyIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Build the canonical pre-signing buffer for one request.
pub fn canonical_proof_bytes(
    access_token: &str,
    url: &str,
    timestamp: i64,
) -> Result<Vec<u8>, ProofKeyError> {
    if access_token.is_empty() {
        return Err(ProofKeyError::MissingAccessToken);
    }
    if !url.is_ascii() {
        return Err(ProofKeyError::NonAsciiUrl(url.to_string()));
    }

    let token = access_token.as_bytes();
    let url_upper = url.to_ascii_uppercase();
    let url_bytes = url_upper.as_bytes();
    let ts_bytes = timestamp.to_be_bytes();

    let mut buf = Vec::with_capacity(3 * 4 + token.len() + url_bytes.len() + ts_bytes.len());
    buf.extend_from_slice(&(token.len() as i32).to_be_bytes());
    buf.extend_from_slice(token);
    buf.extend_from_slice(&(url_bytes.len() as i32).to_be_bytes());
    buf.extend_from_slice(url_bytes);
    buf.extend_from_slice(&(ts_bytes.len() as i32).to_be_bytes());
    buf.extend_from_slice(&ts_bytes);
    Ok(buf)
}

/// Ticks since 0001-01-01T00:00:00Z for the given instant.
pub fn ticks_from(instant: &DateTime<Utc>) -> i64 {
    TICKS_AT_UNIX_EPOCH
        + instant.timestamp() * 10_000_000
        + i64::from(instant.timestamp_subsec_nanos() / 100)
}

/// Current time in the `X-WOPI-TimeStamp` encoding.
pub fn wopi_timestamp_now() -> i64 {
    ticks_from(&Utc::now())
}

/// Proof header values for one request.
#[derive(Clone, Debug)]
pub struct ProofHeaders {
    pub proof: String,
    pub proof_old: String,
    pub timestamp: i64,
}

/// Public RSA parameters of one key, each standard base-64.
///
/// `modulus` and `exponent` are the unpadded big-endian byte forms; `value`
/// is the DER (SPKI) encoding of the whole public key.
#[derive(Clone, Debug)]
pub struct PublicKeyParams {
    pub value: String,
    pub modulus: String,
    pub exponent: String,
}

impl PublicKeyParams {
    fn of(key: &PKey<Private>) -> Result<Self, ProofKeyError> {
        let rsa = key.rsa()?;
        Ok(Self {
            value: BASE64.encode(key.public_key_to_der()?),
            modulus: BASE64.encode(rsa.n().to_vec()),
            exponent: BASE64.encode(rsa.e().to_vec()),
        })
    }
}

/// Current and previous public parameters, as published by discovery.
#[derive(Clone, Debug)]
pub struct DiscoveryProofKeys {
    pub current: PublicKeyParams,
    pub old: PublicKeyParams,
}

/// The validator's current and previous RSA signing keys.
///
/// Both keys are read-only after load and may be shared freely across the
/// run. Keys are injected through configuration (PEM paths) rather than read
/// from fixed working-directory paths at call sites.
pub struct ProofKeyPair {
    current: PKey<Private>,
    old: PKey<Private>,
}

impl ProofKeyPair {
    /// Generate an ephemeral 2048-bit pair, for runs without configured keys.
    pub fn generate() -> Result<Self, ProofKeyError> {
        Ok(Self {
            current: PKey::from_rsa(Rsa::generate(2048)?)?,
            old: PKey::from_rsa(Rsa::generate(2048)?)?,
        })
    }

    pub fn from_pem(current_pem: &[u8], old_pem: &[u8]) -> Result<Self, ProofKeyError> {
        Ok(Self {
            current: PKey::from_rsa(Rsa::private_key_from_pem(current_pem)?)?,
            old: PKey::from_rsa(Rsa::private_key_from_pem(old_pem)?)?,
        })
    }

    pub fn from_pem_files(current: &Path, old: &Path) -> Result<Self, ProofKeyError> {
        let read = |path: &Path| {
            std::fs::read(path).map_err(|source| ProofKeyError::KeyIo {
                path: path.display().to_string(),
                source,
            })
        };
        Self::from_pem(&read(current)?, &read(old)?)
    }

    /// Sign `payload` with the current key.
    pub fn sign(&self, payload: &[u8]) -> Result<String, ProofKeyError> {
        sign_with(&self.current, payload)
    }

    /// Sign `payload` with the previous key.
    pub fn sign_old(&self, payload: &[u8]) -> Result<String, ProofKeyError> {
        sign_with(&self.old, payload)
    }

    /// Compute the proof header triple for one request.
    ///
    /// `old_url`, when present, switches the `X-WOPI-ProofOld` payload to the
    /// previous access-token URL so key-rotation cases can be exercised.
    pub fn proof_headers(
        &self,
        access_token: &str,
        url: &str,
        old_url: Option<&str>,
        timestamp: i64,
    ) -> Result<ProofHeaders, ProofKeyError> {
        let payload = canonical_proof_bytes(access_token, url, timestamp)?;
        let old_payload = match old_url {
            Some(old_url) => canonical_proof_bytes(access_token, old_url, timestamp)?,
            None => payload.clone(),
        };
        Ok(ProofHeaders {
            proof: self.sign(&payload)?,
            proof_old: self.sign_old(&old_payload)?,
            timestamp,
        })
    }

    /// Public parameters of both keys, for the discovery export.
    pub fn public_params(&self) -> Result<DiscoveryProofKeys, ProofKeyError> {
        Ok(DiscoveryProofKeys {
            current: PublicKeyParams::of(&self.current)?,
            old: PublicKeyParams::of(&self.old)?,
        })
    }
}

fn sign_with(key: &PKey<Private>, payload: &[u8]) -> Result<String, ProofKeyError> {
    let mut signer = Signer::new(MessageDigest::sha256(), key)?;
    signer.update(payload)?;
    Ok(BASE64.encode(signer.sign_to_vec()?))
}
