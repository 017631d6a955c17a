//! services/client/src/cli.rs
//!
//! The command-line surface of the client: argument definitions and the
//! dispatch that drives the session manager.

use clap::{Parser, Subcommand};
use standards_desk_core::session::SessionManager;

use crate::error::ClientError;

/// Standards Desk session client for the standards lookup service.
#[derive(Parser)]
#[command(name = "desk", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and store the session locally
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    /// End the session; local state clears even if the server is unreachable
    Logout,
    /// Validate the stored session and show who is signed in
    Status,
    /// Exchange the stored refresh token for a fresh access token
    Refresh,
}

/// Runs one command against the session manager.
///
/// Failures that the session manager recorded are printed from its `error`
/// field (the displayable message, never the raw failure) and then
/// returned so the process exits non-zero.
pub async fn run(command: Command, session: &SessionManager) -> Result<(), ClientError> {
    match command {
        Command::Login { email, password } => {
            if let Err(err) = session.login(&email, &password).await {
                print_recorded_error(session);
                return Err(err.into());
            }
            print_identity(session);
            Ok(())
        }
        Command::Register {
            email,
            password,
            name,
        } => {
            if let Err(err) = session.register(&email, &password, &name).await {
                print_recorded_error(session);
                return Err(err.into());
            }
            print_identity(session);
            Ok(())
        }
        Command::Logout => {
            session.logout().await;
            println!("Signed out.");
            Ok(())
        }
        Command::Status => {
            session.check_auth().await;
            if session.is_authenticated() {
                print_identity(session);
            } else {
                println!("Not signed in.");
            }
            Ok(())
        }
        Command::Refresh => {
            if let Err(err) = session.refresh_session().await {
                println!("Session could not be refreshed; please sign in again.");
                return Err(err.into());
            }
            println!("Session refreshed.");
            Ok(())
        }
    }
}

fn print_identity(session: &SessionManager) {
    match session.user() {
        Some(user) => println!("Signed in as {} <{}>", user.name, user.email),
        // The accepted transient: tokens held but no identity loaded yet.
        None => println!("Signed in (identity not loaded yet)."),
    }
}

fn print_recorded_error(session: &SessionManager) {
    if let Some(message) = session.error() {
        println!("{message}");
    }
}
