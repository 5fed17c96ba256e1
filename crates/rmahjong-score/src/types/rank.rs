//! 着順（Rank）

use serde::{Deserialize, Serialize};
use std::fmt;

/// 着順（1位〜4位）。JSON では 1〜4 の整数で表す。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Rank {
    First = 1,
    Second = 2,
    Third = 3,
    Fourth = 4,
}

impl Rank {
    /// 着順の数
    pub const NUM: usize = 4;

    /// 全ての着順
    pub const ALL: [Rank; 4] = [Rank::First, Rank::Second, Rank::Third, Rank::Fourth];

    /// 1始まりの着順番号から変換
    #[inline]
    pub const fn from_position(n: u8) -> Option<Rank> {
        match n {
            1 => Some(Rank::First),
            2 => Some(Rank::Second),
            3 => Some(Rank::Third),
            4 => Some(Rank::Fourth),
            _ => None,
        }
    }

    /// 1始まりの着順番号
    #[inline]
    pub const fn position(self) -> u8 {
        self as u8
    }

    /// インデックスとして使用（配列アクセス用、1位 = 0）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize - 1
    }
}

impl TryFrom<u8> for Rank {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Rank::from_position(n).ok_or_else(|| format!("rank must be 1..=4, got {n}"))
    }
}

impl From<Rank> for u8 {
    fn from(r: Rank) -> u8 {
        r.position()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}位", self.position())
    }
}
