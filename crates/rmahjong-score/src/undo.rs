//! 直近の局の取り消し
//!
//! 記録時の値（再計算しない）で今回の戦績を減算するため、設定が変わっていても
//! 記録前の状態に厳密に戻る。精算済みの局は取り消せない。

use log::info;

use crate::error::{EngineError, Result};
use crate::round::RoundRecord;
use crate::state::AppState;

/// 履歴の末尾を取り消し、取り消した記録を返す。
pub fn undo_last_round(state: &mut AppState) -> Result<RoundRecord> {
    let Some(last) = state.history.last() else {
        return Err(EngineError::EmptyHistory);
    };
    if state.history.len() <= state.settled_rounds {
        return Err(EngineError::AlreadySettled {
            settled: state.settled_rounds,
        });
    }

    // 全員分を先に計算し、1人でも整合しなければ何も変更しない
    let mut reverted = Vec::with_capacity(last.results.len());
    for result in &last.results {
        let current = state.session.get(&result.player).copied().unwrap_or_default();
        let next = current
            .reverted(result)
            .ok_or_else(|| EngineError::InconsistentStats(result.player.clone()))?;
        reverted.push((result.player.clone(), next));
    }

    for (player, stats) in reverted {
        if stats.is_zero() {
            state.session.remove(&player);
        } else {
            state.session.insert(player, stats);
        }
    }
    let record = state.history.pop().ok_or(EngineError::EmptyHistory)?;
    info!("undid round #{} ({})", state.history.len() + 1, record.recorded_at);
    Ok(record)
}
