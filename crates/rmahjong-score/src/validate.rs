//! 入力検証（素点合計のチェックと、記録前の構造チェック）

use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::round::{RoundInput, ValidatedRound};
use crate::settings::Settings;
use crate::types::GameType;

/// 素点合計の許容誤差（点）
///
/// 素点は100点単位で入力されるため、実質的には完全一致と同じ判定になる。
pub const SCORE_TOLERANCE: i64 = 100;

/// 1人分の素点の上限（絶対値）
pub const MAX_RAW_SCORE: i64 = 100_000;

/// 1人分の役満祝儀の回数の上限（絶対値）
pub const MAX_YAKUMAN_COUNT: i32 = 10;

/// 素点合計の検証結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub total: i64,
    pub expected: i64,
    /// `total - expected`
    pub difference: i64,
    /// 特殊フラグ補正の合計。0 でない場合、最終得点はゼロサムにならない。
    pub flag_delta: i64,
}

impl ValidationResult {
    /// 不一致なら `ScoreMismatch` を返す
    pub fn ok(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(EngineError::ScoreMismatch {
                total: self.total,
                expected: self.expected,
                difference: self.difference,
            })
        }
    }
}

/// 素点（特殊フラグ補正前）の合計を期待値と比較する。副作用なし。
pub fn validate_scores(input: &RoundInput, game_type: GameType) -> ValidationResult {
    let total = input.raw_total();
    let expected = game_type.expected_total();
    let difference = total.saturating_sub(expected);
    ValidationResult {
        valid: difference.unsigned_abs() < SCORE_TOLERANCE.unsigned_abs(),
        total,
        expected,
        difference,
        flag_delta: input.flag_delta(),
    }
}

/// 記録可能な入力かを検証し、`ValidatedRound` に変換する。
///
/// - 人数が種別の人数と一致する
/// - プレイヤーの重複がない
/// - 全員が現在の参加者である
/// - 素点と役満祝儀が範囲内である
/// - 素点合計が期待値と一致する
pub fn admit(input: RoundInput, settings: &Settings) -> Result<ValidatedRound> {
    check_entries(&input, settings)?;
    validate_scores(&input, settings.game_type()).ok()?;
    Ok(ValidatedRound::new_unchecked(input))
}

/// 人数・重複・参加者・入力値の範囲の構造チェック（素点合計は見ない）
pub fn check_entries(input: &RoundInput, settings: &Settings) -> Result<()> {
    let game_type = settings.game_type();
    let expected = game_type.player_count();
    if input.len() != expected {
        return Err(EngineError::InvalidRound(format!(
            "{game_type} は {expected} 人分の入力が必要です ({} 人分)",
            input.len()
        )));
    }
    let entries = input.entries();
    for (i, e) in entries.iter().enumerate() {
        if entries[..i].iter().any(|prev| prev.player == e.player) {
            return Err(EngineError::InvalidRound(format!("{} が重複しています", e.player)));
        }
        if !settings.is_in_roster(e.player.as_str()) {
            return Err(EngineError::InvalidRound(format!("{} は参加者ではありません", e.player)));
        }
        if e.raw_score.unsigned_abs() > MAX_RAW_SCORE.unsigned_abs() {
            return Err(EngineError::InvalidRound(format!(
                "{} の素点 {} は ±{MAX_RAW_SCORE} の範囲外です",
                e.player, e.raw_score
            )));
        }
        if e.yakuman_count.unsigned_abs() > MAX_YAKUMAN_COUNT.unsigned_abs() {
            return Err(EngineError::InvalidRound(format!(
                "{} の役満祝儀 {} は ±{MAX_YAKUMAN_COUNT} の範囲外です",
                e.player, e.yakuman_count
            )));
        }
    }
    Ok(())
}
