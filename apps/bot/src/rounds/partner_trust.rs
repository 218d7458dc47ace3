//! Trust or betray.
//!
//! `intro -> pairing -> choice_intro -> choice -> resolved`. Pairing needs
//! mutual consent: a pick only becomes a [`Pairing`] once the target picks
//! back. Unpaired players fall at the pairing deadline; pairs then resolve
//! independently through [`payoff`].

use tracing::info;

use crate::commands::PlayerAction;
use crate::domain::player::PlayerId;
use crate::domain::round_state::Signal;
use crate::effects::Asset;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::rounds::{foreign_action, wrong_phase, RoundContext, RoundKind, RoundOutcome, RoundProtocol};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustPhase {
    Intro,
    Pairing,
    ChoiceIntro,
    Choice,
    Resolved,
}

/// A mutually confirmed partnership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing {
    pub a: PlayerId,
    pub b: PlayerId,
}

impl Pairing {
    pub fn contains(&self, id: PlayerId) -> bool {
        self.a == id || self.b == id
    }
}

/// Survival of `(a, b)` for the given signals.
pub fn payoff(a: Signal, b: Signal) -> (bool, bool) {
    match (a, b) {
        (Signal::Cooperate, Signal::Cooperate) => (true, true),
        (Signal::Defect, Signal::Defect) => (false, false),
        (Signal::Cooperate, Signal::Defect) => (false, true),
        (Signal::Defect, Signal::Cooperate) => (true, false),
    }
}

pub struct PartnerTrust {
    phase: TrustPhase,
    pairs: Vec<Pairing>,
}

impl PartnerTrust {
    pub fn new() -> Self {
        Self {
            phase: TrustPhase::Intro,
            pairs: Vec::new(),
        }
    }

    pub fn pairs(&self) -> &[Pairing] {
        &self.pairs
    }

    fn pick(
        &mut self,
        ctx: &mut RoundContext,
        actor: PlayerId,
        mention: &str,
    ) -> Result<(), DomainError> {
        if self.phase != TrustPhase::Pairing {
            return Err(wrong_phase("Picking partners is not open right now."));
        }
        let actor_slot = ctx.require_active(actor)?.round_state.trust_mut().clone();
        if actor_slot.partner_confirmed() {
            return Err(DomainError::validation(
                ValidationKind::AlreadyPaired,
                "You already have a confirmed partner.",
            ));
        }
        let target = ctx.resolve_target(mention)?;
        if target == actor {
            return Err(DomainError::validation(
                ValidationKind::SelfTarget,
                "You cannot pick yourself.",
            ));
        }
        let target_slot = ctx
            .player_mut(target)
            .map(|p| p.round_state.trust_mut().clone())
            .unwrap_or_default();
        if target_slot.partner_confirmed() {
            return Err(DomainError::validation(
                ValidationKind::TargetUnavailable,
                format!("{} already has a partner.", ctx.handle_of(target)),
            ));
        }

        if target_slot.pick == Some(actor) {
            for (me, other) in [(actor, target), (target, actor)] {
                if let Some(p) = ctx.player_mut(me) {
                    let slot = p.round_state.trust_mut();
                    slot.pick = Some(other);
                    slot.partner = Some(other);
                }
            }
            self.pairs.push(Pairing { a: target, b: actor });
            let (ha, hb) = (ctx.handle_of(target), ctx.handle_of(actor));
            info!(round = ctx.round_no(), a = target, b = actor, "Pairing confirmed");
            ctx.say(format!("🤝 {ha} and {hb} are now partners."));
        } else {
            if let Some(p) = ctx.player_mut(actor) {
                p.round_state.trust_mut().pick = Some(target);
            }
            let target_handle = ctx.handle_of(target);
            ctx.tell(
                actor,
                format!("You picked {target_handle}. They must pick you back to confirm."),
            );
        }
        Ok(())
    }

    fn choose(
        &mut self,
        ctx: &mut RoundContext,
        actor: PlayerId,
        signal: Signal,
    ) -> Result<(), DomainError> {
        match self.phase {
            TrustPhase::Choice => {}
            TrustPhase::Resolved => return Err(wrong_phase("Choices are closed.")),
            _ => return Err(wrong_phase("Choices are not open yet.")),
        }
        let slot = ctx.require_active(actor)?.round_state.trust_mut();
        if !slot.partner_confirmed() {
            return Err(DomainError::validation(
                ValidationKind::NotPaired,
                "Only paired players choose.",
            ));
        }
        if slot.choice.is_some() {
            return Err(DomainError::validation(
                ValidationKind::AlreadyActed,
                "Your choice is already locked in.",
            ));
        }
        slot.choice = Some(signal);
        ctx.tell(actor, "Your choice is locked in.");
        Ok(())
    }

    fn close_pairing(&mut self, ctx: &mut RoundContext) {
        let unpaired: Vec<PlayerId> = ctx
            .active_ids()
            .into_iter()
            .filter(|id| !self.pairs.iter().any(|pair| pair.contains(*id)))
            .collect();
        let mut names = Vec::new();
        for id in unpaired {
            if ctx.eliminate(id, "no partner") {
                names.push(ctx.handle_of(id));
            }
        }
        if !names.is_empty() {
            ctx.say(format!("💀 Without a partner: {}", names.join(", ")));
        }
        info!(
            round = ctx.round_no(),
            pairs = self.pairs.len(),
            unpaired = names.len(),
            "Pairing closed"
        );
    }

    fn resolve(&mut self, ctx: &mut RoundContext) {
        self.phase = TrustPhase::Resolved;
        let mut lines = Vec::new();
        for pair in self.pairs.clone() {
            let (sa, sb) = (signal_of(ctx, pair.a), signal_of(ctx, pair.b));
            let (keep_a, keep_b) = payoff(sa, sb);
            if !keep_a {
                ctx.eliminate(pair.a, "lost the trust game");
            }
            if !keep_b {
                ctx.eliminate(pair.b, "lost the trust game");
            }
            lines.push(format!(
                "{} {} / {} {}",
                ctx.handle_of(pair.a),
                verdict(sa, keep_a),
                ctx.handle_of(pair.b),
                verdict(sb, keep_b)
            ));
        }
        if !lines.is_empty() {
            ctx.say(format!("⚖️ The choices are in:\n{}", lines.join("\n")));
        }
        ctx.complete(RoundOutcome::Completed);
    }
}

/// Recorded choice, defaulting to `Defect` when none was made.
fn signal_of(ctx: &RoundContext, id: PlayerId) -> Signal {
    ctx.player(id)
        .and_then(|p| p.round_state.trust())
        .and_then(|slot| slot.choice)
        .unwrap_or(Signal::Defect)
}

fn verdict(signal: Signal, survived: bool) -> String {
    let word = match signal {
        Signal::Cooperate => "trusted",
        Signal::Defect => "betrayed",
    };
    if survived {
        format!("{word} and survives")
    } else {
        format!("{word} and is eliminated")
    }
}

impl Default for PartnerTrust {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundProtocol for PartnerTrust {
    fn kind(&self) -> RoundKind {
        RoundKind::PartnerTrust
    }

    fn phase(&self) -> &'static str {
        match self.phase {
            TrustPhase::Intro => "intro",
            TrustPhase::Pairing => "pairing",
            TrustPhase::ChoiceIntro => "choice_intro",
            TrustPhase::Choice => "choice",
            TrustPhase::Resolved => "resolved",
        }
    }

    fn start(&mut self, ctx: &mut RoundContext) {
        let intro = ctx.timings().trust.intro;
        ctx.show(
            Asset::TrustIntro,
            format!(
                "🤝 Round {}: {}\nFind a partner with /pick @name. Only mutual picks count.\n\
                 Players without a partner are eliminated. Pairing opens in {}s.",
                ctx.round_no(),
                RoundKind::PartnerTrust.title(),
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
        match action {
            PlayerAction::Pick(mention) => self.pick(ctx, actor, mention),
            PlayerAction::Choose(signal) => self.choose(ctx, actor, *signal),
            other => Err(foreign_action(self.kind(), other)),
        }
    }

    fn on_deadline(&mut self, ctx: &mut RoundContext) {
        let t = ctx.timings().trust.clone();
        match self.phase {
            TrustPhase::Intro => {
                self.phase = TrustPhase::Pairing;
                ctx.say(format!(
                    "Pairing is open! Use /pick @name. You have {}s.",
                    t.pairing.as_secs()
                ));
                ctx.schedule_in(t.pairing);
            }
            TrustPhase::Pairing => {
                self.close_pairing(ctx);
                if self.pairs.is_empty() {
                    self.phase = TrustPhase::Resolved;
                    ctx.say("No pairs were formed.");
                    ctx.complete(RoundOutcome::Completed);
                    return;
                }
                self.phase = TrustPhase::ChoiceIntro;
                ctx.say(format!(
                    "Each partner will secretly choose to TRUST or BETRAY.\n\
                     Both trust: both survive. Both betray: both fall. \
                     One betrays: the betrayer survives alone.\nChoices open in {}s.",
                    t.choice_intro.as_secs()
                ));
                ctx.schedule_in(t.choice_intro);
            }
            TrustPhase::ChoiceIntro => {
                self.phase = TrustPhase::Choice;
                ctx.prompt(
                    format!(
                        "Make your choice. You have {}s. No choice counts as betray.",
                        t.choice.as_secs()
                    ),
                    &["trust", "betray"],
                );
                ctx.schedule_in(t.choice);
            }
            TrustPhase::Choice => self.resolve(ctx),
            TrustPhase::Resolved => {}
        }
    }

    fn force_resolve(&mut self, ctx: &mut RoundContext) {
        match self.phase {
            TrustPhase::Intro | TrustPhase::Pairing => {
                self.close_pairing(ctx);
                self.resolve(ctx);
            }
            TrustPhase::ChoiceIntro | TrustPhase::Choice => self.resolve(ctx),
            TrustPhase::Resolved => {}
        }
    }
}
