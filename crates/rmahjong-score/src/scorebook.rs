//! 成績帳（エンジン操作の窓口）
//!
//! `AppState` と保存先を1つにまとめ、状態を変更する操作のたびに全文書を保存する。
//! 保存に失敗してもメモリ上の変更は取り消さず、`Committed::save_error` で知らせる。

use log::info;
use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::recorder;
use crate::report::{self, SessionRow, StatsRow};
use crate::round::{PlayerResult, RoundInput, RoundRecord};
use crate::scoring::compute_results;
use crate::settings::{Settings, YakumanUnits};
use crate::settlement::{self, SettlementSummary};
use crate::state::AppState;
use crate::store::{self, Snapshot, Store};
use crate::types::{GameType, PlayerName};
use crate::undo;
use crate::validate::{self, ValidationResult};

/// 状態変更の結果
///
/// `save_error` が `Some` の場合、変更はメモリ上にだけ反映されている。
#[derive(Debug)]
#[must_use]
pub struct Committed<T> {
    pub value: T,
    pub save_error: Option<EngineError>,
}

impl<T> Committed<T> {
    pub fn is_saved(&self) -> bool {
        self.save_error.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

/// 記録前の計算結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundPreview {
    pub validation: ValidationResult,
    /// 入力順の各プレイヤーの計算結果
    pub results: Vec<PlayerResult>,
}

pub struct Scorebook<S: Store> {
    state: AppState,
    store: S,
}

impl<S: Store> Scorebook<S> {
    /// 保存先から状態を読み込んで開く。読めなかった文書の警告も返す。
    pub fn open(store: S) -> (Self, Vec<EngineError>) {
        let (state, warnings) = store::load_state(&store);
        info!(
            "opened: {} rounds ({} settled), {} lifetime players, {} session players",
            state.history().len(),
            state.settled_rounds(),
            state.lifetime().len(),
            state.session().len()
        );
        (Self { state, store }, warnings)
    }

    pub fn with_state(state: AppState, store: S) -> Self {
        Self { state, store }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        self.state.settings()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_parts(self) -> (AppState, S) {
        (self.state, self.store)
    }

    /// 現在の状態を保存する
    pub fn save(&mut self) -> Result<()> {
        store::save_state(&mut self.store, &self.state)
    }

    fn commit<T>(&mut self, value: T) -> Committed<T> {
        Committed {
            value,
            save_error: self.save().err(),
        }
    }

    // ------------------------------------------------------------------------
    // 1局の操作

    /// 素点合計の検証（副作用なし）
    pub fn validate(&self, input: &RoundInput) -> ValidationResult {
        validate::validate_scores(input, self.settings().game_type())
    }

    /// 記録した場合の計算結果（副作用なし）。素点合計が合わなくても計算する。
    pub fn preview(&self, input: &RoundInput) -> Result<RoundPreview> {
        validate::check_entries(input, self.settings())?;
        Ok(RoundPreview {
            validation: self.validate(input),
            results: compute_results(input, self.settings()),
        })
    }

    /// 検証して記録する。検証に失敗した場合は何も変更しない。
    pub fn record_round(&mut self, input: RoundInput) -> Result<Committed<RoundRecord>> {
        let round = validate::admit(input, self.settings())?;
        let record = recorder::record_round(&mut self.state, round, store::timestamp());
        Ok(self.commit(record))
    }

    pub fn undo_last_round(&mut self) -> Result<Committed<RoundRecord>> {
        let record = undo::undo_last_round(&mut self.state)?;
        Ok(self.commit(record))
    }

    pub fn settle_session(&mut self) -> Result<Committed<SettlementSummary>> {
        let summary = settlement::settle_session(&mut self.state);
        Ok(self.commit(summary))
    }

    // ------------------------------------------------------------------------
    // 設定

    pub fn set_game_type(&mut self, game_type: GameType) -> Result<Committed<()>> {
        self.state.settings_mut().set_game_type(game_type)?;
        Ok(self.commit(()))
    }

    pub fn set_roster(&mut self, roster: Vec<PlayerName>) -> Result<Committed<()>> {
        self.state.settings_mut().set_roster(roster)?;
        Ok(self.commit(()))
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<Committed<()>> {
        self.state.settings_mut().set_rate(rate)?;
        Ok(self.commit(()))
    }

    pub fn set_uma(&mut self, game_type: GameType, table: &[i32]) -> Result<Committed<()>> {
        self.state.settings_mut().set_uma(game_type, table)?;
        Ok(self.commit(()))
    }

    pub fn set_yakuman_units(&mut self, units: YakumanUnits) -> Result<Committed<()>> {
        self.state.settings_mut().set_yakuman_units(units);
        Ok(self.commit(()))
    }

    // ------------------------------------------------------------------------
    // プレイヤー

    pub fn add_player(&mut self, name: PlayerName) -> Result<Committed<()>> {
        self.state.settings_mut().add_player(name)?;
        Ok(self.commit(()))
    }

    pub fn rename_player(&mut self, old: &PlayerName, new: &PlayerName) -> Result<Committed<()>> {
        self.state.rename_player(old, new)?;
        Ok(self.commit(()))
    }

    pub fn purge_players(&mut self, names: &[PlayerName]) -> Result<Committed<Vec<PlayerName>>> {
        let purged = self.state.purge_players(names)?;
        Ok(self.commit(purged))
    }

    pub fn reset_lifetime_stats(&mut self) -> Result<Committed<()>> {
        self.state.reset_lifetime_stats();
        Ok(self.commit(()))
    }

    pub fn clear_all(&mut self) -> Result<Committed<()>> {
        self.state.clear_all();
        Ok(self.commit(()))
    }

    // ------------------------------------------------------------------------
    // 集計・出力

    pub fn stats_table(&self) -> Vec<StatsRow> {
        report::stats_table(self.state.lifetime())
    }

    pub fn session_table(&self) -> Vec<SessionRow> {
        report::session_table(self.state.session(), self.settings().rate())
    }

    /// 通算成績の CSV（UTF-8 BOM 付き）。成績がなければ `None`。
    pub fn export_stats_csv(&self) -> Option<Vec<u8>> {
        report::export_stats_csv(&self.stats_table())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.state, store::timestamp())
    }

    /// 全データのバックアップを保存先に書き出し、その場所を返す。
    pub fn export_backup(&mut self) -> Result<String> {
        let json = self.snapshot().to_json()?;
        let location = self
            .store
            .write_backup(&store::backup_file_name(), &json)
            .map_err(|source| EngineError::PersistenceWrite {
                store: "backup",
                source,
            })?;
        info!("backup written: {location}");
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::round::PlayerInput;
    use crate::store::{MemoryStore, StoreKind};

    fn input(book: &Scorebook<MemoryStore>, scores: &[i64]) -> RoundInput {
        RoundInput::new(
            book.settings()
                .roster()
                .iter()
                .zip(scores)
                .map(|(p, &s)| PlayerInput::new(p.clone(), s))
                .collect(),
        )
    }

    #[test]
    fn test_record_persists_all_documents() {
        let (mut book, warnings) = Scorebook::open(MemoryStore::default());
        assert!(warnings.is_empty());
        let committed = book.record_round(input(&book, &[32_000, 28_000, 24_000, 16_000])).unwrap();
        assert!(committed.is_saved());
        for kind in StoreKind::ALL {
            assert!(book.store().document(kind).is_some(), "{kind:?} not saved");
        }

        let (reopened, warnings) = Scorebook::open(book.store().clone());
        assert!(warnings.is_empty());
        assert_eq!(reopened.state(), book.state());
    }

    #[test]
    fn test_extreme_scores_are_errors() {
        let (mut book, _) = Scorebook::open(MemoryStore::default());
        let extreme = input(&book, &[i64::MAX, 1, 0, 0]);
        assert!(!book.validate(&extreme).valid);
        assert!(matches!(book.preview(&extreme), Err(EngineError::InvalidRound(_))));
        assert!(matches!(book.record_round(extreme), Err(EngineError::InvalidRound(_))));
        assert!(book.state().history().is_empty());
        assert!(book.state().session().is_empty());
    }

    #[test]
    fn test_mismatch_blocks_recording() {
        let (mut book, _) = Scorebook::open(MemoryStore::default());
        let err = book
            .record_round(input(&book, &[32_000, 28_000, 24_000, 15_000]))
            .unwrap_err();
        assert!(matches!(err, EngineError::ScoreMismatch { .. }));
        assert!(book.state().history().is_empty());
        assert!(book.store().document(StoreKind::History).is_none());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let (mut book, _) = Scorebook::open(MemoryStore::default());
        book.store_mut().set_fail_writes(true);
        let committed = book.record_round(input(&book, &[32_000, 28_000, 24_000, 16_000])).unwrap();
        assert!(!committed.is_saved());
        assert!(matches!(committed.save_error, Some(EngineError::PersistenceWrite { .. })));
        assert_eq!(book.state().history().len(), 1);
        assert!(book.export_backup().is_err());
    }

    #[test]
    fn test_preview_does_not_mutate() {
        let (book, _) = Scorebook::open(MemoryStore::default());
        let preview = book.preview(&input(&book, &[32_000, 28_000, 24_000, 15_000])).unwrap();
        assert!(!preview.validation.valid);
        assert_eq!(preview.results.len(), 4);
        assert_eq!(preview.results[0].final_score_diff, 17_000);
        assert!(book.state().history().is_empty());
        assert!(book.preview(&input(&book, &[50_000, 50_000])).is_err());
    }

    #[test]
    fn test_backup_contains_snapshot() {
        let (mut book, _) = Scorebook::open(MemoryStore::default());
        let _ = book.record_round(input(&book, &[32_000, 28_000, 24_000, 16_000])).unwrap();
        let location = book.export_backup().unwrap();
        assert!(location.starts_with("memory:mahjong_backup_"));
        let (_, json) = &book.store().backups()[0];
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.session.len(), 4);
        assert_eq!(snapshot.version, "1.0");
    }
}
