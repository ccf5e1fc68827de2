//! busway CLI - interactive maintenance of the busway user table
//!
//! Opens one database connection, shows a text menu, and lets an operator
//! create, list, edit, and remove user records until they exit or press
//! Ctrl+C. The connection is closed on every way out of the menu.

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use busway_core::{load_dotenv, BuswayConfig, MemoryUserStore, PgUserStore, UserStore};
use clap::Parser;
use tracing::{debug, error, info};

mod console;
mod report;
mod session;
mod tracing_setup;
mod ui;

use console::{Console, StdConsole};
use session::Session;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "busway",
    author,
    version,
    about = "Interactive console for creating, listing, editing, and removing busway users",
    long_about = "Connects to the busway PostgreSQL database and presents a menu for managing \
                  rows of the Usuario table. Connection settings come from ~/.busway/config.toml, \
                  BUSWAY_DB_* / DATABASE_URL environment variables, and the flags below."
)]
struct Cli {
    /// Config file (default: ~/.busway/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Database host
    #[arg(long)]
    host: Option<String>,

    /// Database port
    #[arg(long)]
    port: Option<u16>,

    /// Database name
    #[arg(long = "database", value_name = "NAME")]
    database: Option<String>,

    /// Database user
    #[arg(long)]
    user: Option<String>,

    /// Database password
    #[arg(long)]
    password: Option<String>,

    /// Full connection URL (overrides host/port/database/user/password)
    ///
    /// Without it, any of the discrete flags above replace a URL taken from
    /// the environment or the config file.
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,

    /// Keep records in memory instead of connecting to a database
    #[arg(long)]
    in_memory: bool,

    /// Suppress the connection spinner
    #[arg(long, short = 'q')]
    quiet: bool,

    /// Debug logging to stderr (includes executed SQL)
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// Layer command-line flags over file and environment settings.
    fn resolve_config(&self) -> Result<BuswayConfig> {
        let mut config = BuswayConfig::load(self.config.as_deref())
            .context("failed to load configuration")?;
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn has_discrete_connection_flags(&self) -> bool {
        self.host.is_some()
            || self.port.is_some()
            || self.database.is_some()
            || self.user.is_some()
            || self.password.is_some()
    }

    fn apply_overrides(&self, config: &mut BuswayConfig) {
        let db = &mut config.database;

        if let Some(host) = &self.host {
            db.host = host.clone();
        }
        if let Some(port) = self.port {
            db.port = port;
        }
        if let Some(name) = &self.database {
            db.name = name.clone();
        }
        if let Some(user) = &self.user {
            db.user = user.clone();
        }
        if let Some(password) = &self.password {
            db.password = password.clone();
        }
        match &self.database_url {
            Some(url) => db.url = Some(url.clone()),
            // A URL from env or file would otherwise shadow these flags.
            None if self.has_discrete_connection_flags() => db.url = None,
            None => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug }).ok();
    let quiet = ui::quiet_mode(cli.quiet);
    load_dotenv();

    println!("=== BUSWAY CRUD SYSTEM ===");

    if cli.in_memory {
        println!("Using in-memory store (records are discarded on exit).");
        let mut session = Session::new(MemoryUserStore::new(), StdConsole::new());
        run_session(&mut session, interrupted()).await;
        return Ok(());
    }

    // Startup failures end the process without entering the menu.
    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(err) => {
            error!("{err:#}");
            println!("Configuration error: {err:#}");
            return Ok(());
        }
    };
    debug!(?config, "resolved configuration");

    match connect(&config, quiet).await {
        Ok(store) => {
            println!("Connected to the database successfully!");
            let mut session = Session::new(store, StdConsole::new());
            run_session(&mut session, interrupted()).await;
        }
        Err(err) => {
            error!("{err:#}");
            println!("Database connection error: {err:#}");
        }
    }

    Ok(())
}

async fn connect(config: &BuswayConfig, quiet: bool) -> Result<PgUserStore> {
    let options = config
        .database
        .connect_options()
        .context("invalid database settings")?;
    let target = config.database.describe();

    let pb = ui::connect_spinner(&target, quiet);
    let result = PgUserStore::connect(&options).await;
    if let Some(pb) = pb {
        pb.finish_with_message(match &result {
            Ok(_) => format!("✓ Connected to {target}"),
            Err(_) => format!("✗ Could not connect to {target}"),
        });
    }

    let store = result.with_context(|| format!("failed to connect to {target}"))?;
    info!("connected to {target}");
    Ok(store)
}

/// Run the menu until exit or until `interrupt` resolves, then close the store.
async fn run_session<S, C, F>(session: &mut Session<S, C>, interrupt: F)
where
    S: UserStore,
    C: Console,
    F: Future<Output = ()>,
{
    tokio::select! {
        () = session.run() => {}
        () = interrupt => session.interrupt(),
    }

    debug!(state = ?session.state(), "menu finished");
    session.close().await;
}

/// Resolves on Ctrl+C. If the handler cannot be installed, never resolves.
async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
}
