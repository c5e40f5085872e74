//! Errors raised outside the index itself.
//!
//! Building and searching a tree cannot fail; these cover the point
//! generator and the command line surface.
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A generator parameter is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No world preset matches the given name.
    #[error("unknown world: {0:?} (expected small, normal, gigantic or test)")]
    UnknownWorld(String),

    /// No front end action matches the given name.
    #[error("unknown action: {0:?} (expected ui, benchmark or test)")]
    UnknownAction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
