//! Console host for the friends plugin
//!
//! Loads the configuration, enables the plugin, then reads console commands
//! until `stop`, end of input or a shutdown signal. The plugin is disabled
//! on the way out so friendships are saved.

use anyhow::anyhow;
use plugin_friends::{FriendsPlugin, HostPlugin};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

mod cli;
mod config;
mod console;
mod logging;
mod signals;

use cli::CliArgs;
use config::AppConfig;
use console::{Console, ConsoleMessenger, Outcome, PlayerRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let mut config = AppConfig::load_from_file(&args.config_path).await?;
    config.apply_cli_overrides(&args);
    config
        .validate()
        .map_err(|e| anyhow!("Configuration validation failed: {}", e))?;

    logging::setup_logging(&config.logging)?;
    info!(
        "📂 Config: {} | Data: {}",
        args.config_path.display(),
        config.friends.data_folder.display()
    );

    if let Err(e) = run(config).await {
        error!("❌ Application error: {:?}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    let registry = Arc::new(PlayerRegistry::default());
    let messenger = Arc::new(ConsoleMessenger::new(registry.clone(), config.console.json_chat));
    let plugin = FriendsPlugin::new(config.friends.clone(), registry.clone(), messenger);
    let mut console = Console::new(plugin, registry);

    console.plugin_mut().on_enable().await?;
    info!("✅ Friends console ready, type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut sweep = tokio::time::interval(Duration::from_millis(config.console.expiry_sweep_ms));
    let shutdown = signals::shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if console.handle_line(&line, Instant::now()) == Outcome::Stop {
                            info!("🛑 Stop requested from console");
                            break;
                        }
                    }
                    None => {
                        info!("🛑 End of input");
                        break;
                    }
                }
            }
            _ = sweep.tick() => {
                let expired = console.plugin_mut().expire_offers(Instant::now());
                if expired > 0 {
                    debug!("Expired {} friend requests", expired);
                }
            }
            signal = &mut shutdown => {
                info!("🛑 Received {} signal", signal?);
                break;
            }
        }
    }

    info!(
        "💾 Saving {} friendships",
        console.plugin().friendships().len()
    );
    console.plugin_mut().on_disable().await?;
    info!("👋 Friends console stopped");
    Ok(())
}
