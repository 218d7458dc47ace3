//! Plurality vote with random tie-break.
//!
//! Ballots repeat (`collecting -> pause -> collecting ...`) until at most two
//! players remain. Each ballot eliminates exactly one player: the unique
//! leader, a uniform pick among tied leaders, or a uniform pick among all
//! alive players when nobody voted. A round that starts with two or fewer
//! players is skipped without a ballot.

use std::collections::BTreeMap;

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::info;

use crate::commands::PlayerAction;
use crate::domain::player::PlayerId;
use crate::effects::Asset;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::{foreign_action, wrong_phase, RoundContext, RoundKind, RoundOutcome, RoundProtocol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VotePhase {
    Intro,
    Collecting,
    Pause,
    Resolved,
}

/// Vote count per target, ignoring votes for players outside `alive`.
pub fn tally(ballots: &[(PlayerId, PlayerId)], alive: &[PlayerId]) -> BTreeMap<PlayerId, u32> {
    let mut counts = BTreeMap::new();
    for (_, target) in ballots {
        if alive.contains(target) {
            *counts.entry(*target).or_insert(0) += 1;
        }
    }
    counts
}

/// Who may be eliminated: the leaders, or everyone alive if no votes counted.
pub fn candidates(counts: &BTreeMap<PlayerId, u32>, alive: &[PlayerId]) -> Vec<PlayerId> {
    let Some(max) = counts.values().copied().max() else {
        let mut all = alive.to_vec();
        all.sort_unstable();
        return all;
    };
    counts
        .iter()
        .filter(|(_, n)| **n == max)
        .map(|(id, _)| *id)
        .collect()
}

pub fn draw<R: Rng + ?Sized>(candidates: &[PlayerId], rng: &mut R) -> Option<PlayerId> {
    candidates.choose(rng).copied()
}

pub struct Vote {
    phase: VotePhase,
    ballot_no: u32,
}

impl Vote {
    pub fn new() -> Self {
        Self {
            phase: VotePhase::Intro,
            ballot_no: 0,
        }
    }

    pub fn ballot_no(&self) -> u32 {
        self.ballot_no
    }

    fn open_ballot(&mut self, ctx: &mut RoundContext) {
        self.phase = VotePhase::Collecting;
        self.ballot_no += 1;
        for id in ctx.active_ids() {
            if let Some(p) = ctx.player_mut(id) {
                p.round_state.ballot_mut().vote_for = None;
            }
        }
        let window = ctx.timings().vote.window;
        let names: Vec<String> = ctx
            .active_ids()
            .into_iter()
            .map(|id| ctx.handle_of(id))
            .collect();
        ctx.say(format!(
            "🗳️ Ballot {} is open for {}s. Vote with /vote @name.\nStill standing: {}",
            self.ballot_no,
            window.as_secs(),
            names.join(", ")
        ));
        ctx.schedule_in(window);
    }

    fn ballots(ctx: &RoundContext) -> Vec<(PlayerId, PlayerId)> {
        ctx.participants()
            .iter()
            .filter(|p| p.is_alive())
            .filter_map(|p| {
                p.round_state
                    .ballot()
                    .and_then(|b| b.vote_for)
                    .map(|target| (p.id, target))
            })
            .collect()
    }

    fn close_ballot(&mut self, ctx: &mut RoundContext, open_next: bool) {
        let alive = ctx.active_ids();
        let ballots = Self::ballots(ctx);
        let counts = tally(&ballots, &alive);
        let pool = candidates(&counts, &alive);
        let Some(victim) = draw(&pool, ctx.rng()) else {
            self.phase = VotePhase::Resolved;
            ctx.complete(RoundOutcome::Completed);
            return;
        };

        let votes = counts.get(&victim).copied().unwrap_or(0);
        let reason = if counts.is_empty() {
            "no votes cast; drawn at random"
        } else if pool.len() > 1 {
            "tied vote; drawn at random"
        } else {
            "most votes"
        };
        ctx.eliminate(victim, reason);
        info!(
            round = ctx.round_no(),
            ballot = self.ballot_no,
            victim,
            votes,
            tied = pool.len(),
            reason,
            "Ballot closed"
        );

        let handle = ctx.handle_of(victim);
        let text = if counts.is_empty() {
            format!("Nobody voted. Fate chose {handle}, who is eliminated.")
        } else if pool.len() > 1 {
            format!("A tie at {votes} vote(s)! The draw fell on {handle}, who is eliminated.")
        } else {
            format!("{handle} received {votes} vote(s) and is eliminated.")
        };
        ctx.say(format!("☠️ {text}"));

        let remaining = ctx.active_count();
        if remaining <= 1 {
            self.phase = VotePhase::Resolved;
            ctx.complete(RoundOutcome::Completed);
        } else if remaining == 2 {
            self.phase = VotePhase::Resolved;
            ctx.say("Two players remain. They will settle it in a final duel.");
            ctx.complete(RoundOutcome::FinalDuel);
        } else if open_next {
            self.phase = VotePhase::Pause;
            let pause = ctx.timings().vote.pause;
            ctx.schedule_in(pause);
        } else {
            self.phase = VotePhase::Resolved;
            ctx.complete(RoundOutcome::Completed);
        }
    }
}

impl Default for Vote {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundProtocol for Vote {
    fn kind(&self) -> RoundKind {
        RoundKind::Vote
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            VotePhase::Intro => "intro",
            VotePhase::Collecting => "collecting",
            VotePhase::Pause => "pause",
            VotePhase::Resolved => "resolved",
        }
    }

    fn start(&mut self, ctx: &mut RoundContext) {
        let alive = ctx.active_count();
        if alive <= 2 {
            self.phase = VotePhase::Resolved;
            info!(round = ctx.round_no(), alive, "Vote skipped");
            let (next, outcome) = if alive == 2 {
                ("Skipping straight to the final duel.", RoundOutcome::FinalDuel)
            } else {
                ("Skipping this round.", RoundOutcome::Completed)
            };
            ctx.say(format!(
                "🗳️ Round {}: {} needs more than two players. {next}",
                ctx.round_no(),
                RoundKind::Vote.title()
            ));
            ctx.complete(outcome);
            return;
        }
        let intro = ctx.timings().vote.intro;
        ctx.show(
            Asset::VoteIntro,
            format!(
                "🗳️ Round {}: {}\nEach ballot eliminates the player with the most votes. \
                 Ties and empty ballots are settled by chance.\nFirst ballot in {}s.",
                ctx.round_no(),
                RoundKind::Vote.title(),
                intro.as_secs()
            ),
        );
        ctx.schedule_in(intro);
    }

    fn on_action(
        &mut self,
        ctx: &mut RoundContext,
        actor: PlayerId,
        action: &PlayerAction,
    ) -> Result<(), DomainError> {
        let PlayerAction::Vote(mention) = action else {
            return Err(foreign_action(self.kind(), action));
        };
        if self.phase != VotePhase::Collecting {
            return Err(wrong_phase("No ballot is open right now."));
        }
        ctx.require_active(actor)?;
        let target = ctx.resolve_target(mention)?;
        if target == actor {
            return Err(DomainError::validation(
                ValidationKind::SelfTarget,
                "You cannot vote for yourself.",
            ));
        }
        if let Some(p) = ctx.player_mut(actor) {
            p.round_state.ballot_mut().vote_for = Some(target);
        }
        let target_handle = ctx.handle_of(target);
        ctx.tell(actor, format!("Your vote for {target_handle} is recorded."));

        let alive = ctx.active_ids();
        if Self::ballots(ctx).len() == alive.len() {
            ctx.say("Everyone has voted.");
            self.close_ballot(ctx, true);
        }
        Ok(())
    }

    fn on_deadline(&mut self, ctx: &mut RoundContext) {
        match self.phase {
            VotePhase::Intro | VotePhase::Pause => self.open_ballot(ctx),
            VotePhase::Collecting => self.close_ballot(ctx, true),
            VotePhase::Resolved => {}
        }
    }

    fn force_resolve(&mut self, ctx: &mut RoundContext) {
        match self.phase {
            VotePhase::Collecting => self.close_ballot(ctx, false),
            VotePhase::Intro | VotePhase::Pause => {
                self.phase = VotePhase::Resolved;
                ctx.complete(RoundOutcome::Completed);
            }
            VotePhase::Resolved => {}
        }
    }
}
