use anyhow::Result;
use cdnzz_sdk::{CdnzzApi, CdnzzClient, Config, RecordType, VerifyType};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "cdnzz")]
#[command(about = "Manage CDNZZ domains, records and cache from the command line")]
struct CliArgs {
    /// Do not fetch or refresh the session token automatically.
    #[arg(long)]
    no_auto_refresh: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch a new session token and print it.
    Token {
        /// Requested lifetime in seconds.
        #[arg(long)]
        expires_in: Option<u64>,
        #[arg(long)]
        name: Option<String>,
    },
    AddDomain {
        domain: String,
    },
    ListDomains,
    VerifyInfo {
        domain: String,
    },
    VerifyDomain {
        domain: String,
        /// dns or file
        #[arg(long = "type")]
        verify_type: Option<VerifyType>,
    },
    AddSub {
        domain: String,
        host: String,
        record_type: RecordType,
        value: String,
    },
    DelSub {
        domain: String,
        sub_id: String,
    },
    ListSub {
        domain: String,
    },
    ModifySub {
        domain: String,
        sub_id: String,
        host: String,
        record_type: RecordType,
        value: String,
    },
    ActivateSub {
        domain: String,
        sub_id: String,
    },
    DeactivateSub {
        domain: String,
        sub_id: String,
    },
    Preload {
        url: String,
    },
    Purge {
        url: String,
    },
    Bandwidth {
        domain: String,
        sub_name: String,
        /// First day, YYYYMMDD.
        #[arg(long, value_parser = parse_day_arg)]
        start: Option<NaiveDate>,
        /// Last day, YYYYMMDD.
        #[arg(long, value_parser = parse_day_arg)]
        end: Option<NaiveDate>,
    },
    Traffic {
        domain: String,
        sub_name: String,
        #[arg(long, value_parser = parse_day_arg)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = parse_day_arg)]
        end: Option<NaiveDate>,
    },
}

fn parse_day_arg(input: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(input, "%Y%m%d")
        .map_err(|_| format!("Invalid day '{}'. Expected format: YYYYMMDD", input))
}

async fn run(client: &CdnzzClient, command: Command) -> cdnzz_sdk::Result<Value> {
    match command {
        Command::Token { expires_in, name } => client
            .fetch_token(expires_in.map(Duration::from_secs), name.as_deref())
            .await
            .map(Value::String),
        Command::AddDomain { domain } => client.add_domain(&domain).await,
        Command::ListDomains => client.list_domains().await,
        Command::VerifyInfo { domain } => client.fetch_verify_info(&domain).await,
        Command::VerifyDomain {
            domain,
            verify_type,
        } => client.verify_domain(&domain, verify_type).await,
        Command::AddSub {
            domain,
            host,
            record_type,
            value,
        } => {
            client
                .add_sub_domain(&domain, &host, record_type, &value)
                .await
        }
        Command::DelSub { domain, sub_id } => client.delete_sub_domain(&domain, &sub_id).await,
        Command::ListSub { domain } => client.list_sub_domains(&domain).await,
        Command::ModifySub {
            domain,
            sub_id,
            host,
            record_type,
            value,
        } => {
            client
                .modify_sub_domain(&domain, &sub_id, &host, record_type, &value)
                .await
        }
        Command::ActivateSub { domain, sub_id } => {
            client.activate_sub_domain(&domain, &sub_id).await
        }
        Command::DeactivateSub { domain, sub_id } => {
            client.deactivate_sub_domain(&domain, &sub_id).await
        }
        Command::Preload { url } => client.add_preload(&url).await,
        Command::Purge { url } => client.purge_cache(&url).await,
        Command::Bandwidth {
            domain,
            sub_name,
            start,
            end,
        } => client.fetch_bandwidth(&domain, &sub_name, start, end).await,
        Command::Traffic {
            domain,
            sub_name,
            start,
            end,
        } => client.fetch_traffic(&domain, &sub_name, start, end).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cdnzz_sdk=info,cdnzz=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let client = match Config::from_env().and_then(|mut config| {
        if args.no_auto_refresh {
            config.client.auto_refresh = false;
        }
        info!("Using CDNZZ API at {}", config.client.api_url);
        CdnzzClient::from_config(config)
    }) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize client: {}", e);
            std::process::exit(1);
        }
    };

    match run(&client, args.command).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            error!("Request failed: {}", e);
            std::process::exit(1);
        }
    }
}
