//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

/// Process exit codes: anything that stops the tool exits 1.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    #[error("No Postal URL given")]
    #[diagnostic(
        code(postal::missing_url),
        help(
            "Pass --url https://postal.example.com (or -u),\n\
             or set the POSTAL_URL environment variable."
        )
    )]
    MissingUrl,

    #[error("No management API key given")]
    #[diagnostic(
        code(postal::missing_api_key),
        help(
            "Pass --api-key (or -k), or set the POSTAL_API_KEY environment variable.\n\
             Keys are created in the Postal web UI under Settings > API Keys."
        )
    )]
    MissingApiKey,

    #[error("Could not connect to Postal at {url}")]
    #[diagnostic(
        code(postal::connection_failed),
        help(
            "Check that the URL is correct and the management API is enabled.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: postal_api::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(postal::api_error))]
    Api(#[from] postal_api::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        exit_code::FAILURE
    }
}
