//! CLI module — Clap argument parser, run configuration, and usage text.

pub mod commands;
pub mod output;

use clap::Parser;

/// Exit status for every failure: usage errors, session problems, and
/// lookups that found nothing.
pub const EXIT_VAULT_ID_UNKNOWN: u8 = 2;

/// Binary name shown in usage text.
const BIN_NAME: &str = "storedsafe-vault-client";

/// Vault password client for StoredSafe.
///
/// Help and version are handled by hand so that `-?` works and help exits
/// with the same status as any other unanswered lookup.
#[derive(Parser, Debug)]
#[command(name = BIN_NAME, disable_help_flag = true)]
pub struct Cli {
    /// Object id (integer) or a hostname/username to search for
    #[arg(long = "vault-id", value_name = "OBJECT-ID|SEARCH-STRING")]
    pub vault_id: Option<String>,

    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Enable debug output (implies --verbose)
    #[arg(long)]
    pub debug: bool,

    /// Show usage
    #[arg(short = 'h', long = "help", short_alias = '?')]
    pub help: bool,

    /// Print version
    #[arg(short = 'V', long)]
    pub version: bool,
}

impl Cli {
    /// Build the run configuration, or `None` when usage should be shown
    /// instead (help requested or `--vault-id` missing).
    pub fn into_config(self) -> Option<RunConfig> {
        if self.help {
            return None;
        }
        let vault_id = self.vault_id?;
        Some(RunConfig {
            vault_id,
            verbose: self.verbose || self.debug,
            debug: self.debug,
        })
    }
}

/// Everything a single invocation needs besides the session file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub vault_id: String,
    pub verbose: bool,
    pub debug: bool,
}

impl RunConfig {
    /// Log filter directive for this run.
    pub fn log_filter(&self) -> String {
        let level = if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        };
        format!("warn,storedsafe_vault={level}")
    }
}

/// Usage text, including two worked examples.
pub fn usage() -> String {
    format!(
        "Usage: {BIN_NAME} --vault-id <object-id|search-string>
 --verbose                  (Boolean) Enable verbose output.
 --debug                    (Boolean) Enable debug output.
 --vault-id <Object-ID>     Obtain the decrypted password from the object with the matching Object-ID (integer).
 --vault-id <String>        Search for the string, return decrypted password field from last matching object.

Obtain the decrypted password for the specified Object-ID (919) from StoredSafe.

$ {BIN_NAME} --vault-id 919

Search all available vaults for hostname or user matching the search string and return decrypted password from last matching object.

$ {BIN_NAME} --vault-id prod-sweden-vars"
    )
}

/// Print the usage text to stdout.
pub fn print_usage() {
    println!("{}", usage());
}
