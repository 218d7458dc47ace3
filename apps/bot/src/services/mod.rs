pub mod coordinator;
pub mod registration;
pub mod scheduler;
pub mod tournament;

pub use coordinator::{Coordinator, RoundReport, Step};
pub use registration::Registration;
pub use scheduler::{Decision, Finale, PendingRound, Scheduler};
pub use tournament::{Input, Stage, TournamentEngine};
