use crate::hashing::Hash;

/// Enum intended to represent all the different error types the object store, the transport and
/// the pack machinery can produce.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("object {0} was not found in the object store")]
    ObjectNotFound(Hash),
    #[error("could not decompress data: {0}")]
    Decompression(String),
    #[error("malformed pack response: {0}")]
    MalformedPackResponse(String),
    #[error("{unresolved} delta entries could not be resolved against any base")]
    UnresolvableDeltaChain { unresolved: usize },
    #[error("{url} did not advertise refs/heads/{branch} nor HEAD, response was:\n{response}")]
    NoDefaultRef {
        url: String,
        branch: String,
        response: String,
    },
    #[error("i/o operation error: {0:?}")]
    Io(#[from] std::io::Error),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("there was an error with data formatting: {0}")]
    Formatting(String),
    #[error("there is inconsistent data: {0}")]
    DataConsistency(String),
    #[error("argument {0:?} is not valid")]
    Arg(String),
}

/// Abstraction of the result type where the error is always an Error from this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;
