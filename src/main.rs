//! modbot - moderation chat bot.
//!
//! Loads the configuration, starts the control API and runs the bot against
//! the console session until interrupted.

use modbot::Bot;
use modbot::config::Config;
use modbot::control::ControlServer;
use modbot::session::{ConsoleSession, Session};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Set to `json` for JSON log lines.
const LOG_FORMAT_ENV: &str = "MODBOT_LOG_FORMAT";

/// How long in-flight control requests may drain on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout belongs to the console session.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if std::env::var(LOG_FORMAT_ENV).is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        bot = %config.bot.name,
        rules = config.rules.len(),
        control_port = config.control.port,
        "Starting modbot"
    );

    let bot = Bot::from_config(&config)?;

    // Control API is optional.
    let control = if config.control.enabled {
        let server = ControlServer::new(config.control.port, bot.info());
        let addr = server.start().await?;
        info!(addr = %addr, "Control API started");
        Some(server)
    } else {
        info!("Control API disabled");
        None
    };

    let session: Arc<dyn Session> =
        Arc::new(ConsoleSession::new(config.bot.command_prefix.clone()));
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    let result = bot.run(session, shutdown).await;

    if let Some(server) = control {
        server
            .stop(tokio::time::Instant::now() + SHUTDOWN_GRACE)
            .await?;
    }

    result?;
    info!("modbot stopped");
    Ok(())
}
