//! Helpers for generating unique test data
//!
//! Display names carry a ULID suffix and player ids come from a process-wide
//! counter, so tests sharing a binary never collide on either.

use std::sync::atomic::{AtomicI64, Ordering};

use ulid::Ulid;

static NEXT_PLAYER_ID: AtomicI64 = AtomicI64::new(10_000);

/// Generate a unique display name with the given prefix
///
/// # Examples
/// ```
/// use gauntlet_test_support::unique_name;
///
/// let a = unique_name("player");
/// let b = unique_name("player");
/// assert_ne!(a, b);
/// assert!(a.starts_with("player-"));
/// ```
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Hand out a player id not used by any other caller in this process.
pub fn unique_player_id() -> i64 {
    NEXT_PLAYER_ID.fetch_add(1, Ordering::Relaxed)
}
