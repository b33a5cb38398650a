//! Command-line entrypoint for bookshelf: run the server or work with tokens
//! and password hashes using the configured secrets.

use anyhow::Context;
use bookshelf_app::App;
use bookshelf_authz::{CredentialHasher, TokenService, UserClaims};
use bookshelf_kernel::settings::{AuthSettings, Settings};
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(version, about = "Book search-and-save backend")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the GraphQL server
    Serve,

    /// Print a token for the given identity, signed with the configured secret
    IssueToken {
        #[arg(long)]
        id: String,

        #[arg(long)]
        username: String,

        #[arg(long)]
        email: String,
    },

    /// Verify a token and print its claims as JSON
    VerifyToken { token: String },

    /// Print a bcrypt hash at the configured cost
    HashPassword { plaintext: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Commands::Serve => {
            bookshelf_telemetry::init(&settings.telemetry);
            tracing::info!(env = ?settings.environment, "bookshelf serve starting");
            App::new(settings)?.run().await?;
        }
        Commands::IssueToken {
            id,
            username,
            email,
        } => {
            let token = token_service(&settings.auth)
                .issue(&UserClaims {
                    id,
                    username,
                    email,
                })
                .context("failed to issue token")?;
            println!("{token}");
        }
        Commands::VerifyToken { token } => {
            let claims = token_service(&settings.auth)
                .verify(token.trim())
                .context("token rejected")?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
        Commands::HashPassword { plaintext } => {
            let hash = CredentialHasher::new(settings.auth.bcrypt_cost).hash(&plaintext)?;
            println!("{hash}");
        }
    }

    Ok(())
}

fn token_service(settings: &AuthSettings) -> TokenService {
    TokenService::new(
        settings.jwt_secret.as_bytes(),
        chrono::Duration::seconds(settings.token_ttl_secs),
    )
}
