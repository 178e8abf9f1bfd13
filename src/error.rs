use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// The requested OID or name does not appear in the parameter tables.
    #[error("unknown parameter set: {0}")]
    UnknownParameterSet(String),
    /// A custom parameter combination violates a structural constraint.
    #[error("invalid parameters: {0}")]
    InvalidParameters(&'static str),
    /// A key or signature buffer has the wrong size for the parameter set.
    #[error("invalid length: expected {0} bytes, found {1} bytes")]
    BadLength(usize, usize),
    /// Every one-time leaf of the private key has been consumed.
    /// Signing with this key must never succeed again.
    #[error("private key exhausted: no unused one-time signature leaves remain")]
    KeyExhausted,
}

pub type Result<T> = core::result::Result<T, Error>;
