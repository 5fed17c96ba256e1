//! 麻雀（四麻 / 三麻）の成績計算・精算エンジン
//!
//! - 素点合計の検証、着順、ウマ、特殊フラグ（跳び / 跳ばし）、役満祝儀、確定値の計算
//! - 今回の戦績への記録と、直近の局の取り消し
//! - 今回の戦績から通算成績への精算
//! - 統計・履歴・設定の保存
//!
//! 通常は [`Scorebook`] を通して操作する。

pub mod error;
pub mod io;
pub mod recorder;
pub mod report;
pub mod round;
pub mod scorebook;
pub mod scoring;
pub mod settings;
pub mod settlement;
pub mod state;
pub mod stats;
pub mod store;
pub mod types;
pub mod undo;
pub mod validate;

pub use error::{EngineError, Result, Severity};
pub use report::{SessionRow, StatsRow};
pub use round::{PlayerInput, PlayerResult, RoundInput, RoundRecord, ValidatedRound};
pub use scorebook::{Committed, RoundPreview, Scorebook};
pub use settings::{Settings, YakumanUnits};
pub use settlement::SettlementSummary;
pub use state::AppState;
pub use stats::{PlayerStats, StatsTable};
pub use store::{JsonFileStore, MemoryStore, Snapshot, Store, StoreKind};
pub use types::{ConfirmedValue, GameType, PlayerName, Rank, SpecialFlag};
pub use validate::ValidationResult;
