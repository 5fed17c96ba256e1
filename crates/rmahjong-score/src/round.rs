//! 1局分の入力と記録

use serde::{Deserialize, Serialize};

use crate::types::{ConfirmedValue, GameType, PlayerName, Rank, SpecialFlag};

/// 1人分の入力（素点・特殊フラグ・役満祝儀）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInput {
    pub player: PlayerName,
    /// 入力された素点（特殊フラグ補正前）
    pub raw_score: i64,
    #[serde(default)]
    pub flag: SpecialFlag,
    /// 役満祝儀の回数（負の値は減点）
    #[serde(default)]
    pub yakuman_count: i32,
}

impl PlayerInput {
    pub fn new(player: PlayerName, raw_score: i64) -> Self {
        Self {
            player,
            raw_score,
            flag: SpecialFlag::None,
            yakuman_count: 0,
        }
    }

    pub fn with_flag(mut self, flag: SpecialFlag) -> Self {
        self.flag = flag;
        self
    }

    pub fn with_yakuman(mut self, count: i32) -> Self {
        self.yakuman_count = count;
        self
    }

    /// 特殊フラグ補正後の点数（順位付けと記録に使う）
    #[inline]
    pub fn adjusted_score(&self) -> i64 {
        self.raw_score.saturating_add(self.flag.score_delta())
    }
}

/// 1局分の入力
///
/// 並び順は同点時の着順の優先順位を兼ねる（先に並んだ方が上位）。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundInput {
    entries: Vec<PlayerInput>,
}

impl RoundInput {
    pub fn new(entries: Vec<PlayerInput>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: PlayerInput) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[PlayerInput] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 素点の合計（補正前）
    pub fn raw_total(&self) -> i64 {
        self.entries.iter().fold(0i64, |acc, e| acc.saturating_add(e.raw_score))
    }

    /// 特殊フラグ補正の合計
    pub fn flag_delta(&self) -> i64 {
        self.entries.iter().fold(0i64, |acc, e| acc.saturating_add(e.flag.score_delta()))
    }
}

/// 検証済みの1局分入力
///
/// `validate::admit` だけが生成する。記録処理はこの型を受け取り、再検証しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRound {
    input: RoundInput,
}

impl ValidatedRound {
    pub(crate) fn new_unchecked(input: RoundInput) -> Self {
        Self { input }
    }

    pub fn input(&self) -> &RoundInput {
        &self.input
    }

    pub fn into_input(self) -> RoundInput {
        self.input
    }
}

/// 1人分の記録
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub player: PlayerName,
    /// 特殊フラグ補正後の点数
    pub score: i64,
    /// ウマ（点）
    pub uma: i64,
    /// 最終得点差（補正後点数 - 持ち点 + ウマ）
    #[serde(rename = "score_diff")]
    pub final_score_diff: i64,
    #[serde(rename = "position")]
    pub rank: Rank,
    #[serde(rename = "yakuman")]
    pub yakuman_count: i32,
    /// 役満祝儀による加減点（レート込み、確定値にのみ反映）
    #[serde(default)]
    pub yakuman_bonus: f64,
    #[serde(rename = "special")]
    pub special_flag: SpecialFlag,
    pub confirmed_value: ConfirmedValue,
}

/// 1局の記録。作成後は変更しない（名前変更による書き換えを除く）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub game_type: GameType,
    /// 記録時刻（RFC 3339）
    pub recorded_at: String,
    /// 入力順の各プレイヤーの記録
    pub results: Vec<PlayerResult>,
}

impl RoundRecord {
    pub fn result_for(&self, player: &str) -> Option<&PlayerResult> {
        self.results.iter().find(|r| r.player.as_str() == player)
    }

    pub fn involves(&self, player: &str) -> bool {
        self.result_for(player).is_some()
    }

    /// 最終得点差の合計（ウマ表の合計が 0 なら 0 になる）
    pub fn final_diff_sum(&self) -> i64 {
        self.results.iter().map(|r| r.final_score_diff).sum()
    }

    /// 着順順に並べた記録
    pub fn by_rank(&self) -> Vec<&PlayerResult> {
        let mut sorted: Vec<&PlayerResult> = self.results.iter().collect();
        sorted.sort_by_key(|r| r.rank);
        sorted
    }
}
