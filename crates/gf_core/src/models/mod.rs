pub mod clock;
pub mod drive;
pub mod field;
pub mod play;
pub mod snapshot;
pub mod stats;

pub use clock::{ClockPosition, Phase, PossessionDuration};
pub use drive::Drive;
pub use field::FieldOffset;
pub use play::{Play, PlayEvent, PlayKey};
pub use snapshot::{EventSnapshot, Scoreboard, ScoringPlay, TeamSummary, TiePolicy};
pub use stats::{EntityKind, StatAccumulator, StatOwner, TEAM_ENTITY_ID};
