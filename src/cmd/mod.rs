use crate::{
    pkg::{internal::auth, server::{listen, state::AppState}},
    prelude::Result,
};
use clap::{Parser, Subcommand};

mod migrate;

#[derive(Parser)]
#[command(about = "rural healthcare staffing api")]
struct Cmd {
    #[command(subcommand)]
    command: Option<SubCommandType>,
}

#[derive(Subcommand)]
enum SubCommandType {
    Listen,
    Migrate,
    /// Provisions a system administrator account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
        #[arg(long, default_value = "System Administrator")]
        name: String,
    },
}

pub async fn run() -> Result<()> {
    let args = Cmd::parse();
    match args.command {
        Some(SubCommandType::Listen) => {
            listen().await?;
        }
        Some(SubCommandType::Migrate) => {
            migrate::apply().await?;
        }
        Some(SubCommandType::CreateAdmin {
            email,
            password,
            name,
        }) => {
            let state = AppState::new().await?;
            let id = auth::provision_system_admin(&state, &email, &password, &name).await?;
            tracing::info!(user = %id, "system admin {} created", email);
        }
        None => {
            tracing::error!("no subcommand passed");
        }
    }
    Ok(())
}
