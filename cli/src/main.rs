//! Task runner for the microservice lifecycle.
//!
//! # Usage
//!
//! ```bash
//! cumulo init --name my-service
//! cumulo build
//! cumulo register
//! cumulo upload --file dist/my-service.zip
//! cumulo create-env
//! cumulo credentials
//! cumulo deregister
//! ```
//!
//! Platform credentials come from `--tenant/--user/--password` or the
//! `C8Y_*` environment, which in turn may be seeded from a local `.env`
//! file.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use cumulo_platform::env::load_env_file;
use cumulo_platform::{Credentials, PlatformClient};

mod commands;
mod manifest;
mod project;
mod version;

#[derive(Parser)]
#[command(name = "cumulo")]
#[command(version)]
#[command(about = "Microservice task runner", long_about = None)]
struct Cli {
    /// Platform base URL
    #[arg(long, env = "C8Y_BASEURL")]
    base_url: Option<String>,

    /// Platform tenant id
    #[arg(long, env = "C8Y_TENANT")]
    tenant: Option<String>,

    /// Platform username
    #[arg(long, env = "C8Y_USER")]
    user: Option<String>,

    /// Platform password
    #[arg(long, env = "C8Y_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Microservice name (default: the MICROSERVICE_NAME file)
    #[arg(long, global = true)]
    name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the microservice application on the platform
    Register,
    /// Delete the microservice application from the platform
    Deregister,
    /// Upload a packed microservice image to the application
    Upload {
        /// Path to the packed image (zip)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print the application's bootstrap credentials
    Credentials,
    /// Write the bootstrap credentials as an env file for local runs
    CreateEnv {
        /// Output path
        #[arg(short, long, default_value = ".env-ms")]
        output: PathBuf,
    },
    /// Pack the microservice image via ./build.sh
    Build {
        /// Version tag (default: derived from `git describe`)
        #[arg(long)]
        version: Option<String>,
        /// Isolation level (default: the ISOLATION file)
        #[arg(long, value_enum)]
        isolation: Option<Isolation>,
    },
    /// Initialize the project files for a new microservice
    Init {
        /// Isolation level
        #[arg(long, value_enum, default_value_t = Isolation::MultiTenant)]
        isolation: Isolation,
    },
}

/// Tenant isolation of the deployed microservice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Isolation {
    /// One instance shared by all subscribed tenants.
    MultiTenant,
    /// One instance per subscribed tenant.
    PerTenant,
}

impl Isolation {
    fn as_str(self) -> &'static str {
        match self {
            Isolation::MultiTenant => "MULTI_TENANT",
            Isolation::PerTenant => "PER_TENANT",
        }
    }

    fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.trim() {
            "MULTI_TENANT" => Ok(Isolation::MultiTenant),
            "PER_TENANT" => Ok(Isolation::PerTenant),
            other => anyhow::bail!("unknown isolation level '{other}'"),
        }
    }
}

impl Cli {
    /// Client acting as the configured platform user.
    fn client(&self) -> anyhow::Result<PlatformClient> {
        let base_url = self
            .base_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--base-url or C8Y_BASEURL is required"))?;
        let credentials = Credentials::new(
            required(&self.tenant, "--tenant or C8Y_TENANT")?,
            required(&self.user, "--user or C8Y_USER")?,
            required(&self.password, "--password or C8Y_PASSWORD")?,
        );
        Ok(PlatformClient::new(base_url, credentials))
    }
}

fn required(value: &Option<String>, what: &str) -> anyhow::Result<String> {
    value
        .clone()
        .ok_or_else(|| anyhow::anyhow!("{what} is required"))
}

#[tokio::main]
async fn main() {
    // Flag/env parsing happens after the .env seed so `env =` defaults see it.
    if let Err(e) = load_env_file(".env") {
        eprintln!("Warning: cannot read .env: {e}");
    }
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Register => commands::register::run(&cli).await,
        Commands::Deregister => commands::deregister::run(&cli).await,
        Commands::Upload { file } => commands::upload::run(&cli, file).await,
        Commands::Credentials => commands::credentials::run(&cli).await,
        Commands::CreateEnv { output } => commands::create_env::run(&cli, output).await,
        Commands::Build { version, isolation } => {
            commands::build::run(&cli, version.as_deref(), *isolation)
        }
        Commands::Init { isolation } => commands::init::run(&cli, *isolation),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
