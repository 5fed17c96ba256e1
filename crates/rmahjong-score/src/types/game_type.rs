//! 対局種別（四麻 / 三麻）と特殊フラグ（跳び / 跳ばし）

use serde::{Deserialize, Serialize};
use std::fmt;

/// 跳び / 跳ばし で加減される点数
pub const BUST_DELTA: i64 = 10_000;

/// 対局種別
///
/// 人数・持ち点・合計点が種別ごとに決まる。JSON では "四麻" / "三麻"。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameType {
    #[default]
    #[serde(rename = "四麻", alias = "four_player")]
    FourPlayer,
    #[serde(rename = "三麻", alias = "three_player")]
    ThreePlayer,
}

impl GameType {
    /// 種別の数
    pub const NUM: usize = 2;

    /// 卓の人数
    #[inline]
    pub const fn player_count(self) -> usize {
        match self {
            GameType::FourPlayer => 4,
            GameType::ThreePlayer => 3,
        }
    }

    /// 1人あたりの持ち点（返し点）
    #[inline]
    pub const fn base_score(self) -> i64 {
        match self {
            GameType::FourPlayer => 25_000,
            GameType::ThreePlayer => 35_000,
        }
    }

    /// 1局の素点合計の期待値
    #[inline]
    pub const fn expected_total(self) -> i64 {
        self.base_score() * self.player_count() as i64
    }

    pub const fn label(self) -> &'static str {
        match self {
            GameType::FourPlayer => "四麻",
            GameType::ThreePlayer => "三麻",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 終局時の特殊フラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpecialFlag {
    #[default]
    #[serde(rename = "なし", alias = "none")]
    None,
    /// 跳び（持ち点がマイナスになった側）
    #[serde(rename = "跳び", alias = "bust")]
    Bust,
    /// 跳ばし（相手を飛ばした側）
    #[serde(rename = "跳ばし", alias = "deal_in_bust")]
    DealInBust,
}

impl SpecialFlag {
    /// 順位付けの前に素点へ加える補正
    #[inline]
    pub const fn score_delta(self) -> i64 {
        match self {
            SpecialFlag::None => 0,
            SpecialFlag::Bust => -BUST_DELTA,
            SpecialFlag::DealInBust => BUST_DELTA,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SpecialFlag::None => "なし",
            SpecialFlag::Bust => "跳び",
            SpecialFlag::DealInBust => "跳ばし",
        }
    }
}
