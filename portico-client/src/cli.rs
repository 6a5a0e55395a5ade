//! Terminal host for the client
//!
//! Every invocation bootstraps the session first, then runs one command.
//! Protected commands pass through the route guard exactly like a view would.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use dialoguer::{Input, Password, console::Term};
use log::warn;
use portico_model::{LoginRequest, User, UserId};

use crate::app::App;
use crate::domains::auth::errors::{ClientError, FieldError};
use crate::domains::ui::routing::{GuardDecision, Route};
use crate::domains::users::notifications::{Notification, NotificationLevel};
use crate::domains::users::table::{COLUMNS, TagColor, UserRow};
use crate::domains::users::validation::CreateUserForm;
use crate::domains::users::view::{Confirm, ConfirmPrompt, ToggleOutcome};
use crate::infra::config::{Config, parse_base_url};

#[derive(Debug, Parser)]
#[command(name = "portico", version, about = "Portico user-management client")]
pub struct Cli {
    /// API base URL (overrides config file and PORTICO_API_URL)
    #[arg(long, global = true, value_parser = parse_base_url)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and persist the session token
    Login {
        #[arg(long)]
        username: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the navigation entries available to the signed-in user
    Menu,
    /// Administer user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum UsersAction {
    /// List all users
    List,
    /// Create a user (password is prompted)
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: Option<String>,
    },
    /// Enable a disabled user or disable an enabled one
    Toggle {
        id: UserId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load();
    if let Some(url) = cli.api_url {
        config = config.with_api_base_url(url);
    }

    let mut app = App::from_config(config).context("failed to initialise client")?;
    app.start().await;

    let protected = !matches!(cli.command, Command::Login { .. } | Command::Logout);
    let result = match cli.command {
        Command::Login { username } => login(&app, username).await,
        Command::Logout => logout(&app).await,
        Command::Whoami => whoami(&app),
        Command::Menu => menu(&app),
        Command::Users { action } => users(&mut app, action).await,
    };

    if protected && result.is_err() && app.navigator().is_at(Route::Login) {
        eprintln!("Run `portico login` to sign in.");
    }
    result
}

/// Apply the route guard for a protected command
fn require(app: &App, route: Route) -> Result<()> {
    match app.visit(route) {
        GuardDecision::Render => Ok(()),
        GuardDecision::RedirectToLogin => bail!("not signed in"),
        GuardDecision::Placeholder => bail!("session is still loading"),
    }
}

async fn login(app: &App, username: Option<String>) -> Result<()> {
    app.visit(Route::Login);
    let term = Term::stderr();

    let username = match username {
        Some(username) => username,
        None => Input::<String>::new()
            .with_prompt("Username")
            .interact_text_on(&term)?,
    };
    if username.trim().is_empty() {
        bail!(FieldError::UsernameRequired);
    }
    let password = Password::new().with_prompt("Password").interact_on(&term)?;
    if password.is_empty() {
        bail!(FieldError::PasswordRequired);
    }

    let user = app
        .login(LoginRequest::new(username.trim(), password))
        .await?;
    println!("Signed in as {}", user.username);
    Ok(())
}

async fn logout(app: &App) -> Result<()> {
    if let Some(notification) = app.logout() {
        if let Err(e) = notification.await {
            warn!("[Session] Logout notification task failed: {}", e);
        }
    }
    println!("Signed out");
    Ok(())
}

fn whoami(app: &App) -> Result<()> {
    require(app, Route::Home)?;
    let user = app
        .session()
        .current_user()
        .ok_or_else(|| anyhow!("not signed in"))?;
    print_user(&user, &app.config().timestamp_format);
    Ok(())
}

fn menu(app: &App) -> Result<()> {
    require(app, Route::Home)?;
    for item in app.menu() {
        println!("{:<8} {}", item.label, item.route.path());
    }
    Ok(())
}

async fn users(app: &mut App, action: UsersAction) -> Result<()> {
    require(app, Route::Users)?;

    let result = match action {
        UsersAction::List => list_users(app).await,
        UsersAction::Create { username, email } => {
            create_user(app, username, email).await
        }
        UsersAction::Toggle { id, yes } => toggle_user(app, id, yes).await,
    };

    print_notifications(&app.users_mut().take_notifications());
    result
}

/// Fail when the last fetch ended the session or raised an error notification
fn ensure_loaded(app: &App) -> Result<()> {
    if app.navigator().is_at(Route::Login) {
        bail!("session expired");
    }
    if app.users().notifications().iter().any(Notification::is_error) {
        bail!("failed to load users");
    }
    Ok(())
}

/// Short error for a failure the view has already turned into a notification
fn reported(err: ClientError) -> anyhow::Error {
    if err.is_auth() {
        anyhow!("session expired")
    } else {
        anyhow!("request failed")
    }
}

async fn list_users(app: &mut App) -> Result<()> {
    app.users_mut().fetch_users().await;
    ensure_loaded(app)?;
    print_table(&app.users().rows());
    Ok(())
}

async fn create_user(
    app: &mut App,
    username: String,
    email: Option<String>,
) -> Result<()> {
    let password = Password::new()
        .with_prompt("Password for the new user")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact_on(&Term::stderr())?;

    let view = app.users_mut();
    view.open_create_dialog();
    let form = CreateUserForm::new(username, password, email.as_deref());
    match view.submit_create(form).await {
        Ok(user) => {
            println!("Created {} (id {})", user.username, user.id);
            Ok(())
        }
        Err(ClientError::Validation(errors)) => {
            for error in errors.errors() {
                eprintln!("{:?}: {}", error.field(), error);
            }
            bail!("user not created")
        }
        Err(e) => Err(reported(e)),
    }
}

async fn toggle_user(app: &mut App, id: UserId, assume_yes: bool) -> Result<()> {
    app.users_mut().fetch_users().await;
    ensure_loaded(app)?;
    let user = app
        .users()
        .find_user(id)
        .cloned()
        .ok_or_else(|| anyhow!("no user with id {id}"))?;

    let gate = TerminalConfirm { assume_yes };
    let outcome = app
        .users_mut()
        .toggle_status(&user, &gate)
        .await
        .map_err(reported)?;
    match outcome {
        ToggleOutcome::Cancelled => println!("No changes made"),
        ToggleOutcome::Updated(updated) => {
            let status = if updated.is_enabled() { "enabled" } else { "disabled" };
            println!("{} is now {}", updated.username, status);
        }
    }
    Ok(())
}

/// Confirmation through an interactive yes/no prompt
#[derive(Debug, Clone, Copy)]
struct TerminalConfirm {
    assume_yes: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &ConfirmPrompt) -> bool {
        if self.assume_yes {
            return true;
        }
        let term = Term::stderr();
        if let Err(e) = term.write_line(&prompt.title) {
            warn!("[Users] Unable to write confirmation title: {}", e);
        }
        dialoguer::Confirm::new()
            .with_prompt(&prompt.content)
            .default(false)
            .interact_on(&term)
            .unwrap_or_else(|e| {
                warn!("[Users] Confirmation prompt failed: {}", e);
                false
            })
    }
}

fn print_user(user: &User, timestamp_format: &str) {
    let row = UserRow::from_user(user, timestamp_format);
    println!("id:        {}", row.id);
    println!("username:  {}", row.username);
    println!("email:     {}", row.email);
    println!("status:    {}", row.status.label());
    println!("superuser: {}", user.is_superuser());
    println!("created:   {}", row.created_at);
}

fn print_table(rows: &[UserRow]) {
    let mut header = vec!["ID"];
    header.extend(COLUMNS);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for row in rows {
        let color = match row.status.color() {
            TagColor::Green => Color::Green,
            TagColor::Red => Color::Red,
        };
        let action = if row.switch_on { "[on] disable" } else { "[off] enable" };
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(&row.username),
            Cell::new(&row.email),
            Cell::new(row.status.label()).fg(color),
            Cell::new(&row.created_at),
            Cell::new(action),
        ]);
    }
    println!("{table}");
}

fn print_notifications(notifications: &[Notification]) {
    for notification in notifications {
        match notification.level {
            NotificationLevel::Success => println!("{}", notification.message),
            NotificationLevel::Error => eprintln!("error: {}", notification.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use clap::CommandFactory;

    use crate::domains::auth::errors::{AuthError, ServerError};
    use crate::infra::storage::MemoryTokenStore;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_toggle_with_global_url() {
        let cli = Cli::try_parse_from([
            "portico",
            "users",
            "toggle",
            "7",
            "--yes",
            "--api-url",
            "localhost:9000/",
        ])
        .expect("parse");

        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9000"));
        match cli.command {
            Command::Users {
                action: UsersAction::Toggle { id, yes },
            } => {
                assert_eq!(id, 7);
                assert!(yes);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn create_requires_username() {
        assert!(Cli::try_parse_from(["portico", "users", "create"]).is_err());
    }

    #[test]
    fn notified_failures_are_not_repeated() {
        let err = reported(
            ServerError {
                status: 400,
                message: Some("Cannot disable superuser".into()),
            }
            .into(),
        );
        assert!(!err.to_string().contains("Cannot disable superuser"));
        assert_eq!(reported(AuthError::SessionExpired.into()).to_string(), "session expired");
    }

    #[tokio::test]
    async fn failed_fetch_is_reported_as_load_failure() {
        let config = Config::default().with_api_base_url("http://127.0.0.1:1");
        let mut app = App::new(config, Arc::new(MemoryTokenStore::new())).expect("app");

        app.users_mut().fetch_users().await;

        let err = ensure_loaded(&app).expect_err("load failed");
        assert_eq!(err.to_string(), "failed to load users");
    }

    #[test]
    fn assumed_yes_skips_prompt() {
        let prompt = ConfirmPrompt {
            title: "Disable User".into(),
            content: "Are you sure you want to disable bob?".into(),
            target_enabled: false,
        };
        assert!(TerminalConfirm { assume_yes: true }.confirm(&prompt));
    }
}
