// Author: Dustin Pilgrim
// License: MIT

use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::core::error::VerifyError;
use crate::core::verify::PinVerifier;

/// Compares against one configured PIN after a fixed latency. Stands in for a
/// real credential backend.
pub struct StaticPinVerifier {
    expected: String,
    latency: Duration,
}

impl StaticPinVerifier {
    pub fn new(expected: impl Into<String>, latency: Duration) -> Self {
        Self { expected: expected.into(), latency }
    }
}

impl PinVerifier for StaticPinVerifier {
    fn verify(&self, candidate: String) -> BoxFuture<'static, Result<bool, VerifyError>> {
        let expected = self.expected.clone();
        let latency = self.latency;

        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            Ok(constant_time_eq(expected.as_bytes(), candidate.as_bytes()))
        }
        .boxed()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
