//! Command-line surface.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "postal-cli",
    version,
    about = "Interactive administration tool for Postal mail servers",
    long_about = "Interactive administration tool for Postal mail servers.\n\n\
                  Connects to the Postal management API and drives common\n\
                  provisioning tasks (organizations, servers, domains) through\n\
                  a guided menu."
)]
pub struct Cli {
    /// Postal installation URL, e.g. https://postal.example.com
    #[arg(short = 'u', long = "url", env = "POSTAL_URL")]
    pub url: Option<String>,

    /// Management API key
    #[arg(short = 'k', long = "api-key", env = "POSTAL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Jump straight into the guided "quick add domain" flow
    #[arg(short = 'q', long = "quick-add")]
    pub quick_add: bool,

    /// Request timeout in seconds
    #[arg(long, env = "POSTAL_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn short_flags_map_to_url_key_and_quick_add() {
        let cli = Cli::parse_from(["postal-cli", "-u", "https://postal.test", "-k", "key", "-q"]);
        assert_eq!(cli.url.as_deref(), Some("https://postal.test"));
        assert_eq!(cli.api_key.as_deref(), Some("key"));
        assert!(cli.quick_add);
        assert_eq!(cli.timeout, 30);
    }
}
