mod category;
mod game;
mod record;
pub(crate) mod storage;
mod tournament;

pub use category::Category;
pub use game::{Game, Innings, Officials, FINAL_STATUS};
pub use record::{FieldRecord, IdentityKey, StatsReport, PLAYER_FIELD, TEAM_FIELD};
pub use tournament::TournamentInfo;
