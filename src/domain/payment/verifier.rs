//! Gateway callback signature verification.
//!
//! Implements verification of redirect-gateway callback signatures using
//! HMAC-SHA512 over the canonical parameter string. The same canonical
//! form signs outbound redirect URLs, so this module owns both directions.
//!
//! ## Canonical form
//!
//! Parameter names are sorted lexicographically and joined as
//! `key=value&...`, excluding the signature parameter itself and
//! parameters with empty values (the gateway omits empties from its own
//! signing input).

use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha512;
use subtle::ConstantTimeEq;

/// Outcome of a signature check.
///
/// Verification never fails with an error: malformed, missing, or
/// mismatched signatures all report `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureCheck {
    Valid,
    Invalid,
}

impl SignatureCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, SignatureCheck::Valid)
    }
}

/// Verifier and signer for gateway callback parameters.
pub struct CallbackVerifier {
    /// Shared secret issued by the gateway.
    secret: SecretString,
}

impl CallbackVerifier {
    /// Creates a new verifier with the given shared secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Verifies a hex-encoded signature against the given parameters.
    ///
    /// `params` must contain every callback parameter except the signature
    /// field itself. A missing signature, non-hex signature, or any
    /// mismatch yields `Invalid`; this method never errors.
    pub fn verify(
        &self,
        params: &BTreeMap<String, String>,
        provided_signature: Option<&str>,
    ) -> SignatureCheck {
        let provided = match provided_signature {
            Some(s) if !s.is_empty() => s,
            _ => return SignatureCheck::Invalid,
        };

        let provided_bytes = match hex::decode(provided) {
            Ok(bytes) => bytes,
            Err(_) => return SignatureCheck::Invalid,
        };

        let expected = self.compute_signature(params);

        if constant_time_compare(&expected, &provided_bytes) {
            SignatureCheck::Valid
        } else {
            SignatureCheck::Invalid
        }
    }

    /// Signs the given parameters, returning a lowercase hex signature.
    ///
    /// Used when building the outbound redirect URL; the gateway verifies
    /// it with the same canonical form used by [`Self::verify`].
    pub fn sign(&self, params: &BTreeMap<String, String>) -> String {
        hex::encode(self.compute_signature(params))
    }

    /// Computes the HMAC-SHA512 signature over the canonical string.
    fn compute_signature(&self, params: &BTreeMap<String, String>) -> Vec<u8> {
        let canonical = canonical_string(params);

        let mut mac = Hmac::<Sha512>::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(canonical.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Builds the canonical signing string: sorted `key=value` pairs joined
/// with `&`, skipping empty values.
///
/// A `BTreeMap` iterates in key order, which provides the lexicographic
/// sort the scheme requires.
pub fn canonical_string(params: &BTreeMap<String, String>) -> String {
    let mut out = String::new();
    for (key, value) in params {
        if value.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(key);
        out.push('=');
        out.push_str(value);
    }
    out
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the
/// expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
