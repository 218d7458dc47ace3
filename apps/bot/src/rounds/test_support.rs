use std::time::Duration;

use crate::commands::PlayerAction;
use crate::config::Timings;
use crate::domain::player::{Player, PlayerId, PlayerStatus};
use crate::effects::Effect;
use crate::errors::domain::DomainError;
use crate::rounds::{RoundContext, RoundProtocol};

pub const CHAT: i64 = -100_42;

pub fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

/// Alive players `1..=n` named `p1`, `p2`, ...
pub fn alive_players(n: i64) -> Vec<Player> {
    (1..=n)
        .map(|id| {
            Player::new(id, format!("p{id}"))
                .with_username(Some(format!("p{id}")))
                .with_status(PlayerStatus::Alive)
        })
        .collect()
}

pub fn ctx_with(n: i64, timings: Timings, seed: u64) -> RoundContext {
    RoundContext::new(1, CHAT, timings, seed, alive_players(n), Duration::ZERO)
}

/// Fire the armed deadline the way the coordinator does.
pub fn fire(proto: &mut dyn RoundProtocol, ctx: &mut RoundContext) {
    let at = ctx
        .deadline()
        .expect("a deadline should be armed before firing it");
    ctx.set_now(at);
    ctx.clear_deadline();
    proto.on_deadline(ctx);
}

pub fn act(
    proto: &mut dyn RoundProtocol,
    ctx: &mut RoundContext,
    at: Duration,
    actor: PlayerId,
    action: PlayerAction,
) -> Result<(), DomainError> {
    ctx.set_now(at);
    proto.on_action(ctx, actor, &action)
}

pub fn status_of(ctx: &RoundContext, id: PlayerId) -> PlayerStatus {
    ctx.player(id).map(|p| p.status).expect("player in round")
}

pub fn texts(effects: &[Effect]) -> Vec<String> {
    effects
        .iter()
        .filter_map(|e| e.text().map(str::to_string))
        .collect()
}

/// Act at the context's current time.
pub fn act_now(
    proto: &mut dyn RoundProtocol,
    ctx: &mut RoundContext,
    actor: PlayerId,
    action: PlayerAction,
) -> Result<(), DomainError> {
    let now = ctx.now();
    act(proto, ctx, now, actor, action)
}
