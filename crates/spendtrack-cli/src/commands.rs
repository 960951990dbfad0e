//! Subcommand parsing and execution.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use spendtrack_core::auth::{decode_claims, GuardOutcome, Navigator};
use spendtrack_core::forms::{LoginForm, RegisterForm, ValidationReport};
use spendtrack_core::models::{NewCategory, NewTransaction, DEFAULT_CURRENCY};
use spendtrack_core::settings::{SettingsField, SettingsValue};
use spendtrack_core::summary::fetch_monthly_summary;
use spendtrack_core::utils::{format_amount, truncate_string};
use spendtrack_core::{
    ApiClient, CancelSignal, Config, SessionGuard, SettingsSession, TokenStore, UpdateOutcome,
};

/// Widest description shown in listings
const DESCRIPTION_WIDTH: usize = 40;

// ============================================================================
// Parsing
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login {
        username: Option<String>,
    },
    Register {
        username: Option<String>,
        email: Option<String>,
    },
    Logout,
    Status,
    SettingsShow,
    SettingsSet {
        field: String,
        value: Option<String>,
    },
    Categories,
    CategoryAdd {
        name: String,
        icon: String,
    },
    Icons,
    ExpenseAdd {
        category_id: i64,
        amount: f64,
        description: String,
        date: Option<NaiveDate>,
    },
    Summary,
    Limits,
}

impl Command {
    /// Parse arguments (without the program name). `None` means print usage.
    pub fn parse(args: &[String]) -> Option<Self> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let command = match args.as_slice() {
            ["login"] => Command::Login { username: None },
            ["login", username] => Command::Login {
                username: Some(username.to_string()),
            },
            ["register", rest @ ..] if rest.len() <= 2 => Command::Register {
                username: rest.first().map(|s| s.to_string()),
                email: rest.get(1).map(|s| s.to_string()),
            },
            ["logout"] => Command::Logout,
            ["status"] => Command::Status,
            ["settings"] | ["settings", "show"] => Command::SettingsShow,
            ["settings", "set", field] => Command::SettingsSet {
                field: field.to_string(),
                value: None,
            },
            ["settings", "set", field, value] => Command::SettingsSet {
                field: field.to_string(),
                value: Some(value.to_string()),
            },
            ["categories"] => Command::Categories,
            ["categories", "add", name, icon] => Command::CategoryAdd {
                name: name.to_string(),
                icon: icon.to_string(),
            },
            ["icons"] => Command::Icons,
            ["expense", "add", category_id, amount, description, rest @ ..] if rest.len() <= 1 => {
                let date = match rest.first() {
                    Some(d) => Some(NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()?),
                    None => None,
                };
                Command::ExpenseAdd {
                    category_id: category_id.parse().ok()?,
                    amount: amount.parse().ok()?,
                    description: description.to_string(),
                    date,
                }
            }
            ["summary"] => Command::Summary,
            ["limits"] => Command::Limits,
            _ => return None,
        };
        Some(command)
    }
}

// ============================================================================
// Session plumbing
// ============================================================================

/// The terminal has no login page to redirect to, so "navigating" means
/// telling the user how to get a new session.
struct LoginHint;

impl Navigator for LoginHint {
    fn to_entry_point(&self) {
        eprintln!("You are not logged in. Run `spendtrack login` to start a session.");
    }
}

struct App {
    config: Config,
    store: Arc<dyn TokenStore>,
    api: ApiClient,
}

impl App {
    fn load() -> Result<Self> {
        let config = Config::load()?;
        let store = config.token_store()?;
        let api = ApiClient::new(&config.base_url()?)?;
        Ok(Self { config, store, api })
    }

    fn guard(&self) -> SessionGuard {
        SessionGuard::new(self.store.clone(), Arc::new(LoginHint))
    }

    /// Client carrying the stored token, after the session guard let us in
    fn authorized_api(&self) -> Result<ApiClient> {
        if !self.guard().is_authenticated() {
            bail!("No valid session");
        }
        let token = self
            .store
            .get()?
            .ok_or_else(|| anyhow!("Session token disappeared"))?;
        Ok(self.api.with_token(token))
    }

    fn start_session(&mut self, username: &str, token: &str) -> Result<()> {
        self.store
            .set(token)
            .context("Failed to store session token")?;
        self.config.last_username = Some(username.to_string());
        self.config.save().context("Failed to save config")?;
        info!(username, "Session started");
        Ok(())
    }
}

// ============================================================================
// Prompts
// ============================================================================

fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(d) => print!("{} [{}]: ", label, d),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let line = line.trim();
    Ok(match (line.is_empty(), default) {
        (true, Some(d)) => d.to_string(),
        _ => line.to_string(),
    })
}

fn prompt_password(label: &str) -> Result<String> {
    rpassword::prompt_password(format!("{}: ", label)).context("Failed to read password")
}

fn check_confirmation(new_password: &str, confirmation: &str) -> Result<()> {
    if new_password != confirmation {
        bail!("Passwords do not match");
    }
    Ok(())
}

fn reject_invalid(report: ValidationReport) -> Result<()> {
    match report.banner(chrono::Utc::now()) {
        Some(banner) => {
            for field in &report.invalid {
                debug!(?field, "Invalid form field");
            }
            bail!(banner.message)
        }
        None => Ok(()),
    }
}

// ============================================================================
// Commands
// ============================================================================

pub async fn run(command: Command, cancel: &CancelSignal) -> Result<()> {
    let mut ctx = App::load()?;
    match command {
        Command::Login { username } => login(&mut ctx, username).await,
        Command::Register { username, email } => register(&mut ctx, username, email).await,
        Command::Logout => {
            ctx.store.clear()?;
            println!("Logged out.");
            Ok(())
        }
        Command::Status => status(&ctx),
        Command::SettingsShow => settings_show(&ctx, cancel).await,
        Command::SettingsSet { field, value } => settings_set(&ctx, &field, value, cancel).await,
        Command::Categories => categories(&ctx).await,
        Command::CategoryAdd { name, icon } => {
            let api = ctx.authorized_api()?;
            let created = api
                .create_category(&NewCategory {
                    name,
                    icon_name: icon,
                })
                .await?;
            println!("Created category {} ({})", created.name, created.id);
            Ok(())
        }
        Command::Icons => {
            let api = ctx.authorized_api()?;
            for icon in api.fetch_icons().await? {
                println!("{:>4}  {}", icon.id, icon.name);
            }
            Ok(())
        }
        Command::ExpenseAdd {
            category_id,
            amount,
            description,
            date,
        } => {
            let api = ctx.authorized_api()?;
            let transaction = NewTransaction {
                description,
                transaction_date: date.unwrap_or_else(|| Local::now().date_naive()),
                amount,
            };
            let created = api.create_transaction(category_id, &transaction).await?;
            println!(
                "Recorded {} on {}: {}",
                format_amount(created.amount, DEFAULT_CURRENCY),
                created.transaction_date,
                truncate_string(&created.description, DESCRIPTION_WIDTH)
            );
            Ok(())
        }
        Command::Summary => summary(&ctx).await,
        Command::Limits => {
            let api = ctx.authorized_api()?;
            for limit in api.fetch_predefined_limits().await? {
                println!(
                    "{:<20} {:>12}  {}",
                    truncate_string(&limit.title, 20),
                    format_amount(limit.amount, DEFAULT_CURRENCY),
                    truncate_string(&limit.description, DESCRIPTION_WIDTH)
                );
            }
            Ok(())
        }
    }
}

async fn login(ctx: &mut App, username: Option<String>) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username", ctx.config.last_username.as_deref())?,
    };
    let form = LoginForm {
        username,
        password: prompt_password("Password")?,
    };
    reject_invalid(form.validate())?;

    let token = ctx.api.login(&form.username, &form.password).await?;
    ctx.start_session(&form.username, &token)?;
    println!("Logged in as {}.", form.username);
    Ok(())
}

async fn register(ctx: &mut App, username: Option<String>, email: Option<String>) -> Result<()> {
    let username = match username {
        Some(u) => u,
        None => prompt("Username", None)?,
    };
    let email = match email {
        Some(e) => e,
        None => prompt("Email", None)?,
    };
    let form = RegisterForm {
        username,
        email,
        password: prompt_password("Password")?,
    };
    reject_invalid(form.validate())?;

    let token = ctx
        .api
        .register(&form.username, &form.email, &form.password)
        .await?;
    ctx.start_session(&form.username, &token)?;
    println!("Account created. Logged in as {}.", form.username);
    Ok(())
}

fn status(ctx: &App) -> Result<()> {
    match ctx.guard().evaluate() {
        GuardOutcome::Authenticated => {
            let token = ctx.store.get()?.unwrap_or_default();
            let expiry = decode_claims(&token)
                .ok()
                .and_then(|c| c.expires_at())
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "never".to_string());
            println!("Logged in (session expires: {}).", expiry);
        }
        GuardOutcome::Missing => println!("Not logged in."),
        GuardOutcome::Expired => println!("Session expired."),
        GuardOutcome::Malformed => println!("Stored session was unreadable and has been removed."),
    }
    Ok(())
}

async fn settings_show(ctx: &App, cancel: &CancelSignal) -> Result<()> {
    ctx.authorized_api()?;
    let session = SettingsSession::new(ctx.api.clone(), ctx.store.clone());
    let Some(snapshot) = session.populate(cancel).await? else {
        eprintln!("Cancelled.");
        return Ok(());
    };
    println!("Username: {}", snapshot.username);
    println!("Email:    {}", snapshot.email);
    println!("Currency: {}", snapshot.currency());
    Ok(())
}

async fn settings_set(
    ctx: &App,
    field: &str,
    value: Option<String>,
    cancel: &CancelSignal,
) -> Result<()> {
    ctx.authorized_api()?;
    let value = match (SettingsField::parse(field), value) {
        (Some(SettingsField::Password), _) => {
            let current_password = prompt_password("Current password")?;
            let new_password = prompt_password("New password")?;
            check_confirmation(&new_password, &prompt_password("Confirm new password")?)?;
            SettingsValue::Password {
                current_password,
                new_password,
            }
        }
        (Some(_), Some(v)) => SettingsValue::Text(v),
        (Some(f), None) => SettingsValue::Text(prompt(&format!("New {}", f), None)?),
        (None, _) => bail!("Unknown settings field '{}' (expected username, email or password)", field),
    };

    let session = SettingsSession::new(ctx.api.clone(), ctx.store.clone());
    match session.update_field_named(field, value, cancel).await {
        UpdateOutcome::Notified(notification) if notification.is_error() => bail!(notification),
        UpdateOutcome::Notified(notification) => println!("{}", notification),
        UpdateOutcome::Cancelled => eprintln!("Cancelled. Nothing was changed."),
        UpdateOutcome::Ignored => bail!("Nothing to update for '{}'", field),
    }
    Ok(())
}

async fn categories(ctx: &App) -> Result<()> {
    let api = ctx.authorized_api()?;
    let categories = api.fetch_categories().await?;
    if categories.is_empty() {
        println!("No categories yet. Add one with `spendtrack categories add <name> <icon>`.");
    }
    for category in categories {
        println!(
            "{:>4}  {:<24} {}",
            category.id,
            truncate_string(&category.name, 24),
            category.icon_name
        );
    }
    Ok(())
}

async fn summary(ctx: &App) -> Result<()> {
    let api = ctx.authorized_api()?;
    let summary = fetch_monthly_summary(&api, Local::now().date_naive()).await;
    println!(
        "Transactions this month: {:>4}  ({} vs last month)",
        summary.current.count,
        summary.transactions_change()
    );
    println!(
        "Spent this month:        {}  ({} vs last month)",
        format_amount(summary.current.spent, &summary.currency),
        summary.spending_change()
    );
    Ok(())
}
