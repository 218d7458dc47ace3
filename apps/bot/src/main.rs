use std::sync::Arc;

use gauntlet::adapters::{JsonRosterStore, MemoryChannel, MemoryModeration, MemoryStore, TelegramGateway};
use gauntlet::commands::{Inbound, Sender};
use gauntlet::ports::{Channel, Moderation, RosterStore};
use gauntlet::{spawn_poller, AppError, BotConfig, Runtime, TournamentEngine};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod telemetry;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let dry_run = std::env::args().any(|arg| arg == "--dry-run");
    telemetry::init_tracing(dry_run);

    // Environment variables must be set by the runtime environment; see
    // `gauntlet::config::bot` for the full list.
    let config = BotConfig::from_env()?;

    let channel: Arc<dyn Channel>;
    let moderation: Arc<dyn Moderation>;
    let store: Arc<dyn RosterStore>;
    if dry_run {
        let console = MemoryChannel::echoing();
        spawn_console(console.clone());
        info!("Dry run: reading `<sender> <chat> <text>` lines from stdin");
        channel = console;
        moderation = MemoryModeration::new();
        store = MemoryStore::new();
    } else {
        let gateway = Arc::new(TelegramGateway::new(
            &config.api_base,
            &config.token,
            config.asset_base.clone(),
        )?);
        channel = gateway.clone();
        moderation = gateway;
        store = Arc::new(JsonRosterStore::new(config.roster_path.clone()));
    }

    let mut engine = TournamentEngine::new(config.game.clone());
    match store.load().await {
        Ok(players) => {
            let count = players.len();
            match engine.restore(players) {
                Ok(()) => info!(players = count, "Roster restored"),
                Err(e) => warn!(error = %e, "Stored roster rejected; starting empty"),
            }
        }
        Err(e) => warn!(error = %e, "Stored roster unreadable; starting empty"),
    }

    let shutdown = CancellationToken::new();
    let (tx, rx) = mpsc::channel(256);
    let poller = spawn_poller(channel.clone(), tx, shutdown.clone());

    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            on_signal.cancel();
        }
    });

    println!("🚀 Gauntlet bot running (operator {})", config.game.operator_id);
    Runtime::new(engine, channel, moderation, store, shutdown.clone())
        .run(rx)
        .await;

    shutdown.cancel();
    poller.abort();
    Ok(())
}

/// Feed stdin lines into the memory channel. A message is private when the
/// sender and chat ids match.
fn spawn_console(channel: Arc<MemoryChannel>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut parts = line.splitn(3, ' ');
            let (Some(sender), Some(chat), Some(text)) = (parts.next(), parts.next(), parts.next())
            else {
                eprintln!("expected: <sender_id> <chat_id> <text>");
                continue;
            };
            let (Ok(sender), Ok(chat)) = (sender.parse::<i64>(), chat.parse::<i64>()) else {
                eprintln!("sender and chat must be integer ids");
                continue;
            };
            channel
                .push_inbound(Inbound {
                    sender: Sender {
                        id: sender,
                        display_name: format!("user{sender}"),
                        username: Some(format!("user{sender}")),
                    },
                    chat,
                    private: sender == chat,
                    message_id: None,
                    text: text.to_string(),
                    sent_at: None,
                })
                .await;
        }
    });
}
