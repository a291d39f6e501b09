//! # Customer -- Look up or delete vault customers.
//!
//! ```bash
//! bt customer find c123
//! bt customer delete c123
//! ```

use anyhow::{Context, Result};
use braintree_client::{BraintreeGateway, GatewayConfig};
use clap::{Args, Subcommand};

/// Arguments for `bt customer`.
#[derive(Args, Debug)]
pub struct CustomerArgs {
    #[command(subcommand)]
    pub command: CustomerCommand,
}

/// Customer subcommands.
#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    /// Print a customer as JSON.
    Find {
        /// Customer id.
        id: String,
    },
    /// Delete a customer with its cards and addresses.
    Delete {
        /// Customer id.
        id: String,
    },
}

/// Execute `bt customer`.
pub fn run_customer(args: &CustomerArgs) -> Result<u8> {
    let config = GatewayConfig::from_env().context("gateway configuration")?;
    let gateway = BraintreeGateway::new(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(dispatch(&gateway, &args.command))
}

/// Run one customer subcommand against `gateway`.
pub async fn dispatch(gateway: &BraintreeGateway, command: &CustomerCommand) -> Result<u8> {
    match command {
        CustomerCommand::Find { id } => {
            let customer = gateway
                .customers()
                .find(id)
                .await
                .with_context(|| format!("customer lookup failed for {id}"))?;
            println!("{}", serde_json::to_string_pretty(&customer)?);
            Ok(0)
        }
        CustomerCommand::Delete { id } => {
            gateway
                .customers()
                .delete(id)
                .await
                .with_context(|| format!("customer delete failed for {id}"))?;
            tracing::info!(%id, "customer deleted");
            println!("deleted customer {id}");
            Ok(0)
        }
    }
}
