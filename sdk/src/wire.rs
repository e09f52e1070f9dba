//! WOPI wire-contract constants.
//!
//! Header names are case-insensitive on receipt; the literal casing below is
//! what goes on the wire when the validator sends them.

/// Names the operation a `POST` to the file endpoint performs.
pub const OVERRIDE: &str = "X-WOPI-Override";
/// Version of the file the host reports or the client pins.
pub const ITEM_VERSION: &str = "X-WOPI-ItemVersion";
/// Lock string owned by the current lock holder.
pub const LOCK: &str = "X-WOPI-Lock";
/// Previous lock string for `UnlockAndRelock`.
pub const OLD_LOCK: &str = "X-WOPI-OldLock";
/// Exact file name requested by `RenameFile`.
pub const REQUESTED_NAME: &str = "X-WOPI-RequestedName";
/// Suggested target name for `PutRelativeFile`.
pub const SUGGESTED_TARGET: &str = "X-WOPI-SuggestedTarget";
/// Exact target name for `PutRelativeFile`.
pub const RELATIVE_TARGET: &str = "X-WOPI-RelativeTarget";
/// Proof timestamp: ticks (100ns units) since 0001-01-01T00:00:00Z.
pub const TIMESTAMP: &str = "X-WOPI-TimeStamp";
/// Proof signature under the current key.
pub const PROOF: &str = "X-WOPI-Proof";
/// Proof signature under the previous key.
pub const PROOF_OLD: &str = "X-WOPI-ProofOld";
/// Body size announced on `PutFile`.
pub const SIZE: &str = "X-WOPI-Size";

/// Query parameter carrying the access token.
pub const ACCESS_TOKEN_PARAM: &str = "access_token";
