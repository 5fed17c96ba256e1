//! アプリ状態（設定・通算成績・今回の戦績・対戦履歴）
//!
//! エンジンの操作はすべて `&mut AppState` を受け取る。
//! 失敗する操作は検証を先に済ませ、途中で状態を変更しない。

use std::collections::BTreeSet;

use log::{info, warn};

use crate::error::{EngineError, Result};
use crate::round::RoundRecord;
use crate::settings::Settings;
use crate::stats::{PlayerStats, StatsTable};
use crate::types::PlayerName;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub(crate) settings: Settings,
    /// 通算成績（精算でのみ加算される）
    pub(crate) lifetime: StatsTable,
    /// 今回の戦績（未精算の局の集計）
    pub(crate) session: StatsTable,
    pub(crate) history: Vec<RoundRecord>,
    /// 先頭から何局分が通算成績に精算済みか
    pub(crate) settled_rounds: usize,
}

impl AppState {
    /// 読み込んだ値から組み立てる。精算済み局数が履歴より多い場合は履歴長に丸める。
    pub fn new(
        settings: Settings,
        lifetime: StatsTable,
        session: StatsTable,
        history: Vec<RoundRecord>,
        settled_rounds: usize,
    ) -> Self {
        let settled_rounds = if settled_rounds > history.len() {
            warn!(
                "精算済み局数 {settled_rounds} が履歴 {} 局を超えています。履歴長に合わせます",
                history.len()
            );
            history.len()
        } else {
            settled_rounds
        };
        Self {
            settings,
            lifetime,
            session,
            history,
            settled_rounds,
        }
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn lifetime(&self) -> &StatsTable {
        &self.lifetime
    }

    pub fn session(&self) -> &StatsTable {
        &self.session
    }

    pub fn history(&self) -> &[RoundRecord] {
        &self.history
    }

    pub fn settled_rounds(&self) -> usize {
        self.settled_rounds
    }

    /// 未精算の局
    pub fn unsettled_rounds(&self) -> &[RoundRecord] {
        &self.history[self.settled_rounds..]
    }

    /// 設定・成績・履歴のどこかに現れる名前か
    pub fn is_known_player(&self, name: &str) -> bool {
        self.settings.is_available(name)
            || self.settings.selected_players().iter().any(|p| p.as_str() == name)
            || self.lifetime.contains_key(name)
            || self.session.contains_key(name)
            || self.history.iter().any(|r| r.involves(name))
    }

    /// 名前を全体で置き換える（プレイヤー一覧・参加者・成績のキー・記録済みの局）。
    pub fn rename_player(&mut self, old: &PlayerName, new: &PlayerName) -> Result<()> {
        if old == new {
            return Ok(());
        }
        if !self.is_known_player(old.as_str()) {
            return Err(EngineError::UnknownPlayer(old.clone()));
        }
        if self.is_known_player(new.as_str()) {
            return Err(EngineError::PlayerExists(new.clone()));
        }

        self.settings.rename_player(old, new);
        for table in [&mut self.lifetime, &mut self.session] {
            if let Some(stats) = table.remove(old) {
                table.insert(new.clone(), stats);
            }
        }
        let mut rewritten = 0usize;
        for record in &mut self.history {
            for result in record.results.iter_mut().filter(|r| &r.player == old) {
                result.player = new.clone();
                rewritten += 1;
            }
        }
        info!("renamed {old} -> {new} ({rewritten} records)");
        Ok(())
    }

    /// 参加者でなく未精算の局もないプレイヤーの成績とプレイヤー一覧の登録を削除する。
    ///
    /// 1人でも削除できない場合は何も変更しない。
    pub fn purge_players(&mut self, names: &[PlayerName]) -> Result<Vec<PlayerName>> {
        let targets: BTreeSet<&PlayerName> = names.iter().collect();
        for name in &targets {
            if !self.is_known_player(name.as_str()) {
                return Err(EngineError::UnknownPlayer((*name).clone()));
            }
            if self.settings.is_in_roster(name.as_str())
                || self.unsettled_rounds().iter().any(|r| r.involves(name.as_str()))
            {
                return Err(EngineError::PlayerInUse((*name).clone()));
            }
        }

        let purged: Vec<PlayerName> = targets.into_iter().cloned().collect();
        for name in &purged {
            self.lifetime.remove(name);
            self.session.remove(name);
            self.settings.remove_player(name);
        }
        info!(
            "purged: {}",
            purged.iter().map(PlayerName::as_str).collect::<Vec<_>>().join(", ")
        );
        Ok(purged)
    }

    /// 通算成績を全員 0 に戻す（キーは残す）。今回の戦績と履歴はそのまま。
    pub fn reset_lifetime_stats(&mut self) {
        for stats in self.lifetime.values_mut() {
            *stats = PlayerStats::default();
        }
        info!("lifetime stats reset ({} players)", self.lifetime.len());
    }

    /// 全データを初期状態に戻す
    pub fn clear_all(&mut self) {
        *self = AppState::default();
        info!("all data cleared");
    }
}
