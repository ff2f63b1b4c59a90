// Author: Dustin Pilgrim
// License: MIT

use futures::future::BoxFuture;

use crate::core::error::VerifyError;

/// Checks a well-formed PIN candidate. `Ok(false)` is a wrong PIN; `Err` means
/// the check itself could not be made.
pub trait PinVerifier: Send + Sync {
    fn verify(&self, candidate: String) -> BoxFuture<'static, Result<bool, VerifyError>>;
}
