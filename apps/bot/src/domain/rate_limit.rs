//! Per-player sliding-window counter for invalid or abusive actions.
//!
//! Each hit increments the player's count; a window older than the interval
//! starts over. The hit that brings the count to the threshold is suppressed
//! and the window resets, so a player who calms down is heard again.

use std::collections::HashMap;
use std::time::Duration;

use crate::config::SpamLimits;
use crate::domain::player::PlayerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Suppressed,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    started_at: Duration,
}

#[derive(Debug, Clone)]
pub struct RateLimiter {
    threshold: u32,
    interval: Duration,
    windows: HashMap<PlayerId, Window>,
}

impl RateLimiter {
    pub fn new(limits: &SpamLimits) -> Self {
        Self {
            threshold: limits.threshold.max(1),
            interval: limits.interval,
            windows: HashMap::new(),
        }
    }

    pub fn hit(&mut self, player: PlayerId, now: Duration) -> Verdict {
        let window = self.windows.entry(player).or_insert(Window {
            count: 0,
            started_at: now,
        });
        if now.saturating_sub(window.started_at) > self.interval {
            window.count = 0;
            window.started_at = now;
        }
        window.count += 1;
        if window.count >= self.threshold {
            window.count = 0;
            window.started_at = now;
            return Verdict::Suppressed;
        }
        Verdict::Allowed
    }

    /// Forget a player's window, e.g. after a legitimate action.
    pub fn clear(&mut self, player: PlayerId) {
        self.windows.remove(&player);
    }

    pub fn reset(&mut self) {
        self.windows.clear();
    }
}
