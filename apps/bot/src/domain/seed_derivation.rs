//! RNG seed derivation for deterministic tournaments.
//!
//! Every random choice descends from the configured base seed, so a fixed
//! `GAUNTLET_SEED` replays the same schedule and the same in-round draws.

/// Seed for the scheduler's round selection in a given tournament.
pub fn derive_schedule_seed(base_seed: u64, tournament_no: u32) -> u64 {
    base_seed
        .wrapping_add(u64::from(tournament_no).wrapping_mul(1_000_003))
        .wrapping_add(1)
}

/// Seed for one round's draws (flip intervals, correct shapes, tie-breaks...).
pub fn derive_round_seed(base_seed: u64, tournament_no: u32, round_no: u8) -> u64 {
    base_seed
        .wrapping_add(u64::from(tournament_no).wrapping_mul(1_000_003))
        .wrapping_add(u64::from(round_no).wrapping_mul(10_007))
        .wrapping_add(2)
}
