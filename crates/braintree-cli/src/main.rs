//! # bt CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use braintree_cli::customer::{run_customer, CustomerArgs};
use braintree_cli::digest::{run_digest, DigestArgs};
use braintree_cli::keys::{run_keys, KeysArgs};
use braintree_cli::tr_data::{run_tr_data, TrDataArgs};

/// Braintree gateway command-line tool.
///
/// Checks request attributes against signatures, computes gateway digests,
/// builds transparent redirect form data and manages vault customers.
#[derive(Parser, Debug)]
#[command(name = "bt", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a JSON attribute file against a request signature.
    VerifyKeys(KeysArgs),

    /// Compute or check a digest under a private key.
    Digest(DigestArgs),

    /// Print signed transparent redirect form data.
    TrData(TrDataArgs),

    /// Look up or delete vault customers.
    Customer(CustomerArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "bt starting");

    let result = match &cli.command {
        Commands::VerifyKeys(args) => run_keys(args),
        Commands::Digest(args) => run_digest(args),
        Commands::TrData(args) => run_tr_data(args),
        Commands::Customer(args) => run_customer(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braintree_cli::customer::CustomerCommand;
    use braintree_cli::keys::SignatureName;
    use braintree_cli::tr_data::TrKind;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_verify_keys() {
        let cli = Cli::try_parse_from(["bt", "verify-keys", "--signature", "credit-card-update", "card.json"]).unwrap();
        match cli.command {
            Commands::VerifyKeys(args) => {
                assert_eq!(args.signature, SignatureName::CreditCardUpdate);
                assert_eq!(args.file, PathBuf::from("card.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parse_verify_keys_rejects_unknown_signature() {
        assert!(Cli::try_parse_from(["bt", "verify-keys", "--signature", "refund", "x.json"]).is_err());
    }

    #[test]
    fn cli_parse_digest_with_default_env() {
        let cli = Cli::try_parse_from(["bt", "digest", "kind=create_customer"]).unwrap();
        match cli.command {
            Commands::Digest(args) => {
                assert_eq!(args.private_key_env, "BRAINTREE_PRIVATE_KEY");
                assert_eq!(args.message, "kind=create_customer");
                assert!(args.verify.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parse_tr_data() {
        let cli = Cli::try_parse_from([
            "bt",
            "-vv",
            "tr-data",
            "--kind",
            "update-customer",
            "--redirect-url",
            "https://example.com/done",
            "params.json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::TrData(args) => {
                assert_eq!(args.kind, TrKind::UpdateCustomer);
                assert_eq!(args.redirect_url, "https://example.com/done");
                assert_eq!(args.file, Some(PathBuf::from("params.json")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parse_customer_find_and_delete() {
        let cli = Cli::try_parse_from(["bt", "customer", "find", "c123"]).unwrap();
        match cli.command {
            Commands::Customer(args) => {
                assert!(matches!(args.command, CustomerCommand::Find { ref id } if id == "c123"))
            }
            other => panic!("unexpected command: {other:?}"),
        }
        let cli = Cli::try_parse_from(["bt", "customer", "delete", "c123"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Customer(CustomerArgs { command: CustomerCommand::Delete { .. } })
        ));
    }
}
