//! motocare-admin: operator jobs against the MotoCare database
//!
//! - `migrate`: apply pending schema migrations
//! - `backfill-deposits`: write missing deposit entries into the cash book
//! - `diagnose-login`: explain why a staff member cannot sign in
//! - `create-profile`: bootstrap a staff account (first owner included)
//! - `import-parts`: load a JSON parts catalogue into a branch

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::models::{MIN_PASSWORD_LEN, ProfileCreate, Role};
use sqlx::PgPool;
use tracing::info;

use motocare_server::Config;
use motocare_server::logger::{LogOptions, init_logger};
use motocare_server::services::diagnostics::Severity;
use motocare_server::services::{backfill, diagnostics, import};

#[derive(Parser, Debug)]
#[command(
    name = "motocare-admin",
    version,
    about = "Maintenance jobs for the MotoCare backend"
)]
struct Cli {
    /// Overrides DATABASE_URL from the environment
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply pending migrations
    Migrate,

    /// Record missing deposit entries for work orders
    BackfillDeposits {
        /// Report what would be written without writing it
        #[arg(long)]
        dry_run: bool,
    },

    /// Run the login checks for an account and report each one
    DiagnoseLogin {
        email: String,
        /// Also check this password against the stored hash
        #[arg(long, env = "MOTOCARE_DIAG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create a staff profile
    CreateProfile {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_role, default_value = "staff")]
        role: Role,
        #[arg(long)]
        branch: String,
        #[arg(long, env = "MOTOCARE_NEW_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Import parts from a JSON file (array, or {"parts": [...]})
    ImportParts {
        file: PathBuf,
        #[arg(long)]
        branch: String,
    },
}

fn parse_role(value: &str) -> Result<Role, String> {
    Role::from_db(&value.to_ascii_lowercase()).ok_or_else(|| {
        let known: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
        format!("unknown role {value:?}, expected one of {}", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_logger(LogOptions {
        default_filter: "motocare_server=info,motocare_admin=info,sqlx=warn",
        ..Default::default()
    });

    let cli = Cli::parse();
    let override_url = cli.database_url.clone();
    let config = Config::from_lookup(|name| match (name, &override_url) {
        ("DATABASE_URL", Some(url)) => Some(url.clone()),
        _ => std::env::var(name).ok(),
    })
    .map_err(|e| anyhow!(e))
    .context("failed to load configuration")?;

    let pool = motocare_server::db::connect(&config)
        .await
        .map_err(|e| anyhow!(e))
        .context("failed to connect to the database")?;

    let result = run(&cli, &pool).await;
    pool.close().await;
    result
}

async fn run(cli: &Cli, pool: &PgPool) -> Result<()> {
    match &cli.command {
        Commands::Migrate => {
            motocare_server::db::migrate(pool)
                .await
                .map_err(|e| anyhow!(e))?;
            info!("Migrations applied");
            Ok(())
        }

        Commands::BackfillDeposits { dry_run } => {
            let report = backfill::run_deposit_backfill(pool, *dry_run)
                .await
                .map_err(|e| anyhow!(e))
                .context("deposit backfill failed")?;
            if cli.json {
                return print_json(&report);
            }
            println!(
                "scanned {} work order(s) with a deposit, {} already recorded",
                report.scanned, report.already_recorded
            );
            for draft in &report.drafts {
                println!(
                    "  {} [{}] {:.2} -> {}",
                    draft.work_order_code,
                    draft.branch_id,
                    draft.amount,
                    draft.reference()
                );
            }
            if report.dry_run {
                println!("dry run: {} entr(ies) would be written", report.drafts.len());
            } else {
                println!("wrote {} entr(ies)", report.inserted);
            }
            Ok(())
        }

        Commands::DiagnoseLogin { email, password } => {
            let diagnosis = diagnostics::diagnose_login(pool, email, password.as_deref())
                .await
                .map_err(|e| anyhow!(e))?;
            if cli.json {
                print_json(&diagnosis)?;
            } else {
                println!("login diagnosis for {}", diagnosis.email);
                for finding in &diagnosis.findings {
                    let mark = match finding.severity {
                        Severity::Ok => "ok  ",
                        Severity::Warn => "warn",
                        Severity::Fail => "FAIL",
                    };
                    println!("  [{mark}] {}: {}", finding.check, finding.detail);
                }
            }
            if !diagnosis.can_login() {
                bail!("{} cannot sign in", diagnosis.email);
            }
            Ok(())
        }

        Commands::CreateProfile {
            email,
            name,
            role,
            branch,
            password,
        } => {
            if password.chars().count() < MIN_PASSWORD_LEN {
                bail!("password must be at least {MIN_PASSWORD_LEN} characters");
            }
            ensure_branch(pool, branch).await?;
            let hashed = motocare_server::util::hash_password(password)
                .map_err(|e| anyhow!("failed to hash password: {e}"))?;
            let data = ProfileCreate {
                email: email.clone(),
                full_name: name.clone(),
                role: *role,
                branch_id: branch.clone(),
                password: String::new(),
            };
            let profile = motocare_server::db::profiles::create(
                pool,
                shared::util::snowflake_id(),
                &data,
                &hashed,
                shared::util::now_millis(),
            )
            .await
            .map_err(|e| anyhow!(e))
            .context("failed to create profile")?;
            info!(profile_id = profile.id, email = %profile.email, role = %profile.role, "Profile created");
            if cli.json {
                return print_json(&profile);
            }
            println!("created {} ({}) in {}", profile.email, profile.role, profile.branch_id);
            Ok(())
        }

        Commands::ImportParts { file, branch } => {
            ensure_branch(pool, branch).await?;
            let items = import::read_import_file(file).map_err(|e| anyhow!(e))?;
            let total = items.len();
            let report = import::import_parts(pool, branch, items)
                .await
                .map_err(|e| anyhow!(e))
                .context("import failed")?;
            if cli.json {
                return print_json(&report);
            }
            println!(
                "{total} item(s): {} created, {} updated, {} skipped",
                report.created,
                report.updated,
                report.skipped.len()
            );
            for skipped in &report.skipped {
                println!("  #{} {}: {}", skipped.index, skipped.sku, skipped.reason);
            }
            Ok(())
        }
    }
}

async fn ensure_branch(pool: &PgPool, branch_id: &str) -> Result<()> {
    let branch = motocare_server::db::branches::get(pool, branch_id)
        .await
        .map_err(|e| anyhow!(e))?;
    match branch {
        Some(b) if b.is_active => Ok(()),
        Some(_) => bail!("branch {branch_id} is inactive"),
        None => bail!("branch {branch_id} does not exist"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
