//! Harbor command-line client - Main Entry Point
//!
//! Wires the reqwest transport, the session file and the system clock into a
//! `HarborClient` and runs one command against the platform.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use harbor_application::ports::DurableStore;
use harbor_application::{ApiResult, ApiResultExt, HarborClient};
use harbor_domain::{InvestmentStatus, token_preview};
use harbor_infrastructure::{FileDurableStore, MemoryDurableStore, ReqwestTransport, SystemClock};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "harbor", version)]
#[command(about = "Command-line client for the Harbor investment platform")]
#[command(
    after_help = "Environment:\n  HARBOR_API_URL       Backend base URL\n  HARBOR_TIMEOUT_MS    Request timeout\n  HARBOR_STORAGE_PATH  Session file\n  RUST_LOG             Log filter"
)]
struct Cli {
    /// Print the result as a JSON envelope
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and keep the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Show the signed-in user
    Whoami,
    /// Show the local session state without calling the backend
    Status,
    /// Sign out everywhere this session file is used
    Logout,
    /// List your investments, or all investments as an admin
    Investments {
        #[arg(long, default_value_t = false)]
        all: bool,
        #[arg(long)]
        status: Option<String>,
    },
    /// List linked payment methods
    PaymentMethods,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = harbor_infrastructure::from_env()?;

    let storage: Arc<dyn DurableStore> = if let Some(path) = settings.storage_path {
        info!(path = %path.display(), "using session file");
        Arc::new(FileDurableStore::new(path))
    } else {
        warn!("no config directory; the session will not outlive this process");
        Arc::new(MemoryDurableStore::new())
    };

    let client = HarborClient::new(
        settings.client,
        Arc::new(ReqwestTransport::new()?),
        storage,
        Arc::new(SystemClock::new()),
    );

    run(&client, cli.command, cli.json).await
}

async fn run(
    client: &HarborClient,
    command: Command,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Login { email, password } => {
            let tokens = client.login(&email, &password).await?;
            if let Some(access) = tokens.access_token.as_deref() {
                info!(token = %token_preview(access), "signed in");
            }
            println!("{}", client.session_status().await.display_message());
        }
        Command::Whoami => {
            let user = client.get_current_user().await;
            report(user, json, |user| {
                let role = if user.is_admin { " (admin)" } else { "" };
                println!("{} <{}>{role}", user.display_name(), user.email);
            })?;
        }
        Command::Status => {
            println!("{}", client.session_status().await.display_message());
        }
        Command::Logout => {
            client.logout().await?;
            println!("Signed out");
        }
        Command::Investments { all, status } => {
            let investments = if all || status.is_some() {
                let status = status.as_deref().map(InvestmentStatus::from);
                client.admin_list_investments(status.as_ref()).await
            } else {
                client.list_investments().await
            };
            report(investments, json, |investments| {
                for investment in investments {
                    println!(
                        "{:<12} {:>14.2} {}",
                        investment.id,
                        investment.amount,
                        investment.status.as_str()
                    );
                }
            })?;
        }
        Command::PaymentMethods => {
            let methods = client.list_payment_methods().await;
            report(methods, json, |methods| {
                for method in methods {
                    println!("{:<12} {}", method.id, method.label());
                }
            })?;
        }
    }
    Ok(())
}

/// Prints a result either as an envelope or through `print`, and turns a
/// failure into the process error.
fn report<T, F>(result: ApiResult<T>, json: bool, print: F) -> Result<(), Box<dyn std::error::Error>>
where
    T: Serialize,
    F: FnOnce(&T),
{
    if json {
        let envelope = result.into_envelope();
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        if let Some(error) = envelope.error {
            return Err(error.into());
        }
        return Ok(());
    }
    print(&result?);
    Ok(())
}
