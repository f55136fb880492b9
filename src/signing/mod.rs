//! Signing and verification of parameter maps with a shared secret.
//!
//! A signature is computed in three steps: the parameters are sorted by key,
//! joined as `k1=v1&k2=v2...` with the secret appended, and the result is
//! hashed and rendered as uppercase hex. Verification re-signs the map without
//! its signature field and compares. Neither operation fails: degenerate input
//! yields an empty signature or `false`.

pub mod canonical;
pub mod diagnostics;
pub mod digest;

use std::collections::HashMap;

use zeroize::Zeroize;

use crate::config::SignerConfig;
use canonical::{canonicalize, is_blank, normalize, Entry};
use diagnostics::{DiagnosticSink, Event, LogSink, Operation};
use digest::DigestAlgorithm;

/// Parameter name that carries the signature inside a request.
pub const SIGN_FIELD: &str = "sign";

/// Request parameters. A `None` value is an absent value, distinct from `""`.
pub type ParameterMap = HashMap<String, Option<String>>;

/// Stateless signer. Holds only its settings and where diagnostics go.
#[derive(Debug, Clone)]
pub struct Signer<S = LogSink> {
    algorithm: DigestAlgorithm,
    signature_field: String,
    sink: S,
}

impl Signer<LogSink> {
    /// Legacy settings (MD5, `sign` field) reporting through the `log` crate.
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }

    pub fn from_config(config: &SignerConfig) -> Self {
        Self::new()
            .with_algorithm(config.algorithm)
            .with_signature_field(config.signature_field.clone())
    }
}

impl Default for Signer<LogSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DiagnosticSink> Signer<S> {
    pub fn with_sink(sink: S) -> Self {
        Self {
            algorithm: DigestAlgorithm::default(),
            signature_field: SIGN_FIELD.to_string(),
            sink,
        }
    }

    pub fn with_algorithm(mut self, algorithm: DigestAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_signature_field(mut self, field: impl Into<String>) -> Self {
        self.signature_field = field.into();
        self
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn signature_field(&self) -> &str {
        &self.signature_field
    }

    /// Signs `requests` with `secret`.
    ///
    /// Returns the uppercase hex digest, or an empty string when the map is
    /// absent or empty. A blank secret signs the empty canonical string, which
    /// is the same for every request; refuse blank secrets before calling.
    pub fn sign<'m, 's>(
        &self,
        requests: impl Into<Option<&'m ParameterMap>>,
        secret: impl Into<Option<&'s str>>,
    ) -> String {
        let entries = borrow_entries(requests.into(), None);
        self.sign_entries(entries, secret.into())
    }

    /// Checks the signature carried under the signature field of `requests`.
    ///
    /// The comparison is exact, so a lowercase signature never matches. The
    /// caller's map is left untouched.
    pub fn verify<'m, 's>(
        &self,
        requests: impl Into<Option<&'m ParameterMap>>,
        secret: impl Into<Option<&'s str>>,
    ) -> bool {
        let requests = match requests.into() {
            Some(requests) if !requests.is_empty() => requests,
            _ => {
                self.sink.record(&Event::EmptyParameters(Operation::Verify));
                return false;
            }
        };

        let field = self.signature_field.as_str();
        let declared = match requests.get(field) {
            Some(declared) => declared.as_deref(),
            None => {
                self.sink.record(&Event::MissingSignature { field });
                return false;
            }
        };
        let declared = match declared {
            Some(declared) if !is_blank(Some(declared)) => declared,
            _ => {
                self.sink.record(&Event::BlankSignature { field });
                return false;
            }
        };

        let remaining = borrow_entries(Some(requests), Some(field));
        let expected = self.sign_entries(remaining, secret.into());
        if is_blank(Some(expected.as_str())) {
            self.sink.record(&Event::DerivationFailed);
            return false;
        }
        declared == expected
    }

    /// The string that would be hashed for `requests`. It embeds the secret,
    /// so treat it as sensitive.
    pub fn canonical_string<'m, 's>(
        &self,
        requests: impl Into<Option<&'m ParameterMap>>,
        secret: impl Into<Option<&'s str>>,
    ) -> String {
        let sorted = normalize(borrow_entries(requests.into(), None));
        canonicalize(&sorted, secret.into())
    }

    fn sign_entries(&self, entries: Vec<Entry<'_>>, secret: Option<&str>) -> String {
        if entries.is_empty() {
            self.sink.record(&Event::EmptyParameters(Operation::Sign));
            return String::new();
        }
        self.sink.record(&Event::BeforeSort(&entries));
        let sorted = normalize(entries);
        self.sink.record(&Event::AfterSort(&sorted));

        let mut joined = canonicalize(&sorted, secret);
        self.sink.record(&Event::Joined(&joined));
        if joined.is_empty() {
            // The empty canonical string is still hashed.
            self.sink.record(&Event::BlankSecret);
        }

        let signature = self.algorithm.digest_hex_upper(joined.as_bytes());
        joined.zeroize();
        signature
    }
}

/// Borrows the map as entries, leaving out `exclude` when given.
fn borrow_entries<'a>(requests: Option<&'a ParameterMap>, exclude: Option<&str>) -> Vec<Entry<'a>> {
    requests
        .into_iter()
        .flatten()
        .filter(|(key, _)| Some(key.as_str()) != exclude)
        .map(|(key, value)| (key.as_str(), value.as_deref()))
        .collect()
}

/// Signs with the legacy defaults and `log` diagnostics.
pub fn sign<'m, 's>(
    requests: impl Into<Option<&'m ParameterMap>>,
    secret: impl Into<Option<&'s str>>,
) -> String {
    Signer::new().sign(requests, secret)
}

/// Verifies with the legacy defaults and `log` diagnostics.
pub fn verify<'m, 's>(
    requests: impl Into<Option<&'m ParameterMap>>,
    secret: impl Into<Option<&'s str>>,
) -> bool {
    Signer::new().verify(requests, secret)
}
