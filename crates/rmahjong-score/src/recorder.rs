//! 1局の記録
//!
//! 検証済みの入力から記録を作り、履歴に追加して今回の戦績に加算する。
//! 通算成績は精算（`settlement`）でのみ変更される。

use log::info;

use crate::round::{RoundRecord, ValidatedRound};
use crate::scoring::score_round;
use crate::state::AppState;

/// 1局を記録し、記録した内容を返す。
pub fn record_round(state: &mut AppState, round: ValidatedRound, recorded_at: String) -> RoundRecord {
    let record = score_round(&round, &state.settings, recorded_at);
    for result in &record.results {
        state
            .session
            .entry(result.player.clone())
            .or_default()
            .apply(result);
    }
    state.history.push(record.clone());
    info!(
        "recorded round #{} ({}): {}",
        state.history.len(),
        record.game_type,
        record
            .by_rank()
            .iter()
            .map(|r| format!("{}={:+}", r.player, r.final_score_diff))
            .collect::<Vec<_>>()
            .join(" ")
    );
    record
}
