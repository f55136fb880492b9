//! Diagnostics emitted while signing and verifying. The signer reports
//! through a [`DiagnosticSink`] handed to it instead of a global logger;
//! [`LogSink`] forwards to the `log` facade.

use std::fmt::{self, Display};
use std::sync::Arc;

use log::Level;

use super::canonical::{Described, Entry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Sign,
    Verify,
}

impl Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Sign => f.write_str("sign"),
            Operation::Verify => f.write_str("verify"),
        }
    }
}

/// A single diagnostic record. Data is borrowed so nothing is formatted
/// unless a sink asks for it.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// The parameter map was absent or empty.
    EmptyParameters(Operation),
    /// The secret was blank, so there is nothing to digest.
    BlankSecret,
    /// Parameters as received, in caller order.
    BeforeSort(&'a [Entry<'a>]),
    /// Parameters after key ordering.
    AfterSort(&'a [Entry<'a>]),
    /// The canonical string fed to the digest. Contains the secret.
    Joined(&'a str),
    MissingSignature { field: &'a str },
    BlankSignature { field: &'a str },
    /// Re-signing the remaining parameters produced the empty sentinel.
    DerivationFailed,
}

impl Event<'_> {
    /// Short-circuit reasons are info, intermediate state is debug.
    pub fn level(&self) -> Level {
        match self {
            Event::BeforeSort(_) | Event::AfterSort(_) | Event::Joined(_) => Level::Debug,
            _ => Level::Info,
        }
    }
}

impl Display for Event<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::EmptyParameters(op) => write!(f, "{op}: parameter map is absent or empty"),
            Event::BlankSecret => f.write_str("sign: secret key is absent or blank"),
            Event::BeforeSort(entries) => write!(f, "sign: before sort: {}", Described(entries)),
            Event::AfterSort(entries) => write!(f, "sign: after sort: {}", Described(entries)),
            Event::Joined(joined) => write!(f, "sign: join string: {joined}"),
            Event::MissingSignature { field } => {
                write!(f, "verify: parameter map does not contain key [{field:?}]")
            }
            Event::BlankSignature { field } => {
                write!(f, "verify: signature under [{field:?}] is absent or blank")
            }
            Event::DerivationFailed => {
                f.write_str("verify: signing the remaining parameters produced no signature")
            }
        }
    }
}

/// Receives diagnostics from a [`Signer`](super::Signer). Implementations must
/// not influence signing; they only observe.
pub trait DiagnosticSink {
    fn record(&self, event: &Event<'_>);
}

/// Forwards every event to the `log` crate at the event's level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, event: &Event<'_>) {
        log::log!(event.level(), "{event}");
    }
}

/// Discards all diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl DiagnosticSink for Silent {
    fn record(&self, _event: &Event<'_>) {}
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn record(&self, event: &Event<'_>) {
        (**self).record(event);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, event: &Event<'_>) {
        (**self).record(event);
    }
}
