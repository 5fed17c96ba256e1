//! 今回の戦績の精算
//!
//! 今回の戦績を通算成績へフィールドごとに加算し、今回の戦績を空にする。
//! 精算済み局数を履歴長に進めるので、精算した局は以後取り消せない。

use log::info;
use serde::Serialize;

use crate::state::AppState;
use crate::types::PlayerName;

/// 精算の結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettlementSummary {
    /// 通算成績へ加算したプレイヤー
    pub players: Vec<PlayerName>,
    /// 今回精算した局数
    pub rounds: usize,
}

impl SettlementSummary {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.rounds == 0
    }
}

/// 今回の戦績を通算成績へ移す。今回の戦績が空なら何もしない。
pub fn settle_session(state: &mut AppState) -> SettlementSummary {
    let rounds = state.history.len() - state.settled_rounds;
    let session = std::mem::take(&mut state.session);
    let players: Vec<PlayerName> = session.keys().cloned().collect();
    for (player, stats) in session {
        state.lifetime.entry(player).or_default().merge(&stats);
    }
    state.settled_rounds = state.history.len();

    let summary = SettlementSummary { players, rounds };
    if !summary.is_empty() {
        info!("settled {} rounds for {} players", summary.rounds, summary.players.len());
    }
    summary
}
