//! Async shell around [`TournamentEngine`].
//!
//! A single task owns the engine. It waits on inbound messages, the engine's
//! next deadline and the shutdown token, feeds whichever fires first into the
//! engine, and performs the resulting effects in order.
//!
//! Delayed removals run as their own tasks. They hang off a per-tournament
//! token that an abort cancels, which in turn hangs off the shutdown token.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::commands::Inbound;
use crate::domain::player::{ChatId, PlayerId};
use crate::effects::Effect;
use crate::errors::domain::DomainError;
use crate::ports::{Channel, Moderation, RosterStore};
use crate::services::{Input, TournamentEngine};

const POLL_RETRY: Duration = Duration::from_secs(2);

/// Sends the operator one notice per kind of moderation failure.
#[derive(Clone)]
struct ModerationAlarm {
    channel: Arc<dyn Channel>,
    operator: PlayerId,
    raised: Arc<Mutex<HashSet<&'static str>>>,
}

impl ModerationAlarm {
    async fn failed(&self, op: &'static str, player: PlayerId, err: DomainError) {
        warn!(op, player_id = player, error = %err, "Moderation failed");
        if !self.raised.lock().await.insert(op) {
            return;
        }
        let notice = format!(
            "⚠️ I could not {op} a player ({err}). Make me an admin with member \
             management rights; the game continues regardless."
        );
        if let Err(e) = self.channel.send_text(self.operator, &notice).await {
            warn!(error = %e, "Operator notice failed");
        }
    }
}

pub struct Runtime {
    engine: TournamentEngine,
    channel: Arc<dyn Channel>,
    moderation: Arc<dyn Moderation>,
    store: Arc<dyn RosterStore>,
    started: Instant,
    shutdown: CancellationToken,
    removals: CancellationToken,
    alarm: ModerationAlarm,
}

impl Runtime {
    pub fn new(
        engine: TournamentEngine,
        channel: Arc<dyn Channel>,
        moderation: Arc<dyn Moderation>,
        store: Arc<dyn RosterStore>,
        shutdown: CancellationToken,
    ) -> Self {
        let alarm = ModerationAlarm {
            channel: channel.clone(),
            operator: engine.operator_id(),
            raised: Arc::new(Mutex::new(HashSet::new())),
        };
        Self {
            engine,
            channel,
            moderation,
            store,
            started: Instant::now(),
            removals: shutdown.child_token(),
            shutdown,
            alarm,
        }
    }

    pub fn engine(&self) -> &TournamentEngine {
        &self.engine
    }

    fn now(&self) -> Duration {
        self.started.elapsed()
    }

    /// Run until shutdown or until the inbound stream closes; hands the engine back.
    pub async fn run(mut self, mut inbound: mpsc::Receiver<Inbound>) -> TournamentEngine {
        let shutdown = self.shutdown.clone();
        info!("Runtime started");
        loop {
            let deadline = self.engine.next_deadline().map(|d| self.started + d);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                msg = inbound.recv() => match msg {
                    Some(msg) => self.feed(Input::Message(msg)).await,
                    None => break,
                },
                _ = wait_for(deadline) => self.feed(Input::Tick).await,
            }
        }
        info!("Runtime stopped");
        self.engine
    }

    pub async fn feed(&mut self, input: Input) {
        let effects = self.engine.handle(input, self.now());
        self.perform(effects).await;
    }

    async fn perform(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Send { to, text } => {
                    report_delivery(to, self.channel.send_text(to, &text).await);
                }
                Effect::Prompt { to, text, choices } => {
                    report_delivery(to, self.channel.send_prompt(to, &text, &choices).await);
                }
                Effect::SendMedia { to, asset, caption } => {
                    report_delivery(to, self.channel.send_media(to, asset, &caption).await);
                }
                Effect::Delete { chat, message_id } => {
                    report_delivery(chat, self.channel.delete_message(chat, message_id).await);
                }
                Effect::Restrict { chat, player } => {
                    if let Err(e) = self.moderation.restrict(chat, player).await {
                        self.alarm.failed("restrict", player, e).await;
                    }
                }
                Effect::Remove {
                    chat,
                    player,
                    after,
                } => self.schedule_removal(chat, player, after),
                Effect::CancelRemovals => {
                    debug!("Pending removals cancelled");
                    self.removals.cancel();
                    self.removals = self.shutdown.child_token();
                }
                Effect::LoadRoster => {
                    let loaded = self.store.load().await;
                    let follow_up = self.engine.handle(Input::RosterLoaded(loaded), self.now());
                    queue.extend(follow_up);
                }
                Effect::SaveRoster(players) => {
                    if let Err(e) = self.store.save(&players).await {
                        error!(error = %e, players = players.len(), "Roster save failed");
                    }
                }
                Effect::NotifyOperator(text) => {
                    let operator = self.engine.operator_id();
                    report_delivery(operator, self.channel.send_text(operator, &text).await);
                }
            }
        }
    }

    fn schedule_removal(&self, chat: ChatId, player: PlayerId, after: Duration) {
        let moderation = self.moderation.clone();
        let alarm = self.alarm.clone();
        let cancel = self.removals.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = sleep(after) => {}
            }
            if let Err(e) = moderation.unrestrict(chat, player).await {
                alarm.failed("unrestrict", player, e).await;
            }
            match moderation.remove(chat, player).await {
                Ok(()) => debug!(player_id = player, "Removed from channel"),
                Err(e) => alarm.failed("remove", player, e).await,
            }
        });
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

fn report_delivery(to: ChatId, result: Result<(), DomainError>) {
    if let Err(e) = result {
        warn!(to, error = %e, "Delivery failed");
    }
}

/// Forward channel updates into `tx` until shutdown.
pub fn spawn_poller(
    channel: Arc<dyn Channel>,
    tx: mpsc::Sender<Inbound>,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let batch = tokio::select! {
                _ = shutdown.cancelled() => return,
                batch = channel.next_updates() => batch,
            };
            match batch {
                Ok(messages) => {
                    for msg in messages {
                        if tx.send(msg).await.is_err() {
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Polling for updates failed");
                    sleep(POLL_RETRY).await;
                }
            }
        }
    })
}
