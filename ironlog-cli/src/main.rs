use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use log::info;

use ironlog::Config;
use ironlog::StoreError;
use ironlog::auth::TokenIssuer;
use ironlog::db::models::{NewUser, User};
use ironlog::db::{self, Repository, SqliteRepository};

#[derive(Parser, Debug)]
#[command(version, about = "Ironlog - admin tools for the workout log", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create the database if needed and apply pending migrations
    Migrate,
    /// Provision a user so they can log in
    CreateUser {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        name: String,
    },
    /// Print the user registered under an email
    ShowUser {
        #[arg(short, long)]
        email: String,
    },
    /// Mint a 24h bearer token for an existing user
    IssueToken {
        #[arg(short, long)]
        email: String,
    },
}

fn print_user(user: &User) {
    println!("{}, {} <{}>", user.id, user.name, user.email);
}

async fn find_user(repo: &SqliteRepository, email: &str) -> Result<User> {
    match repo.find_user_by_email(email).await {
        Err(StoreError::NotFound) => anyhow::bail!("No user with email {}", email),
        other => Ok(other?),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let database_url = Config::database_url_from_env().context("Invalid configuration")?;
    let pool = db::connect(&database_url).await?;
    let repo = SqliteRepository::new(pool);

    match args.command {
        Commands::Migrate => {
            info!("Database {} is up to date", database_url);
        }
        Commands::CreateUser { email, name } => {
            let user = match repo.create_user(&NewUser { email, name }).await {
                Err(StoreError::DuplicateResource) => {
                    anyhow::bail!("A user with that email already exists")
                }
                other => other?,
            };
            print_user(&user);
        }
        Commands::ShowUser { email } => {
            let user = find_user(&repo, &email).await?;
            print_user(&user);
        }
        Commands::IssueToken { email } => {
            let config = Config::from_env().context("Invalid configuration")?;
            let user = find_user(&repo, &email).await?;
            let issued = TokenIssuer::new(&config.signing_key).issue(user.id)?;
            info!("Token for user {} expires at {}", user.id, issued.expires_at);
            println!("{}", issued.token);
        }
    }

    Ok(())
}
