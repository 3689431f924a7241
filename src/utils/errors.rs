#![forbid(unsafe_code)]

use poem_openapi::Object;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("webapi_server input parameters:\n{}", .0)]
    InputParms(String),

    /// File system failures, with the path involved.
    #[error("I/O error on {}: {}", .0, .1)]
    IOError(String, #[source] std::io::Error),

    /// Inaccessible logger configuration file.
    #[error("Unable to initialize Log4rs using: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    /// Lookup or removal of an id absent from the registry.
    #[error("User {} not found", .0)]
    UserNotFound(i32),
}

// ***************************************************************************
//                            HTTP Error Body
// ***************************************************************************
/// Body returned when a request names a user the registry doesn't hold.
#[derive(Object, Debug)]
pub struct HttpError
{
    error: String,
}

impl HttpError {
    pub fn new(error: &str) -> Self {
        Self {error: error.to_string()}
    }
}
