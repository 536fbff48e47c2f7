// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Command-line demo of the SDK.

use std::env;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stacks_turnkey::config::LOG_FORMAT_ENV;
use stacks_turnkey::transactions::GenerateWalletParams;
use stacks_turnkey::{SdkResult, StacksTurnkey};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "stacks-turnkey")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show balance, nonce, fee rate and history size of an address
    Account {
        /// Stacks address (`SP...` or `ST...`)
        address: String,
    },
    /// Create a Turnkey sub-organization with a Stacks wallet
    Generate {
        /// Root user name of the new sub-organization
        user_name: String,
        /// Wallet name, used in the sub-organization name
        wallet_name: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn run(sdk: &StacksTurnkey, command: Command) -> SdkResult<()> {
    match command {
        Command::Account { address } => {
            let balance = sdk.get_stacks_balance(&address).await;
            let nonce = sdk.get_current_nonce(&address).await;
            let fee_rate = sdk.get_fee_rate().await;
            let transactions = sdk.get_stacks_transactions(&address).await;

            println!("address:      {address}");
            println!("balance:      {balance} microSTX");
            println!("nonce:        {nonce}");
            println!("fee rate:     {fee_rate} microSTX/byte");
            println!("transactions: {}", transactions.len());
            println!("explorer:     {}", sdk.network().explorer_address_url(&address));
        }
        Command::Generate {
            user_name,
            wallet_name,
        } => {
            let wallet = sdk
                .generate_stacks_wallet(GenerateWalletParams {
                    user_name,
                    wallet_name,
                })
                .await?;
            println!("{}", serde_json::to_string_pretty(&wallet)?);
            if let Some(address) = wallet["stacksAddress"].as_str() {
                println!("explorer: {}", sdk.network().explorer_address_url(address));
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let sdk = match StacksTurnkey::from_env() {
        Ok(sdk) => sdk,
        Err(e) => {
            error!(error = %e, "Failed to load SDK configuration");
            return ExitCode::FAILURE;
        }
    };
    info!(
        name = %sdk.name(),
        network = %sdk.network().config().name,
        organization_id = %sdk.default_organization_id(),
        "SDK initialized"
    );

    match run(&sdk, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_account_command() {
        let cli = Cli::try_parse_from(["stacks-turnkey", "account", "ST1ABC"]).unwrap();
        match cli.command {
            Command::Account { address } => assert_eq!(address, "ST1ABC"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parses_generate_command() {
        let cli = Cli::try_parse_from(["stacks-turnkey", "generate", "alice", "Savings"]).unwrap();
        match cli.command {
            Command::Generate {
                user_name,
                wallet_name,
            } => {
                assert_eq!(user_name, "alice");
                assert_eq!(wallet_name, "Savings");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_arguments() {
        assert!(Cli::try_parse_from(["stacks-turnkey", "generate", "alice"]).is_err());
        assert!(Cli::try_parse_from(["stacks-turnkey"]).is_err());
    }

    #[test]
    fn help_does_not_need_configuration() {
        let err = Cli::try_parse_from(["stacks-turnkey", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
