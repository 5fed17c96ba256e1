//! 基本型（プレイヤー名・対局種別・順位・特殊フラグ・確定値）

mod game_type;
mod player;
mod rank;
mod value;

pub use game_type::{GameType, SpecialFlag, BUST_DELTA};
pub use player::PlayerName;
pub use rank::Rank;
pub use value::ConfirmedValue;

/// 卓の最大人数（四麻）
pub const MAX_PLAYERS: usize = 4;
