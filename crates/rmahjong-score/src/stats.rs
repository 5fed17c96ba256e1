//! プレイヤー別の集計（今回の戦績 / 通算成績で共通の形）

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::round::PlayerResult;
use crate::types::{ConfirmedValue, PlayerName, Rank, SpecialFlag};

/// プレイヤー名 → 集計
pub type StatsTable = BTreeMap<PlayerName, PlayerStats>;

/// 1プレイヤーの集計
///
/// 記録（`apply`）と取り消し（`revert`）は互いに厳密な逆演算になる。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StatsRecord", into = "StatsRecord")]
pub struct PlayerStats {
    /// 最終得点差の累計（総合勝ち得点）
    pub total_score: i64,
    /// 着順ごとの回数（1位 = index 0）
    pub rank_counts: [u32; Rank::NUM],
    /// 跳び
    pub busts: u32,
    /// 跳ばし
    pub deal_in_busts: u32,
    /// 役満祝儀の回数（正の回数のみ数える）
    pub yakuman: u32,
    pub confirmed_value: ConfirmedValue,
}

impl PlayerStats {
    /// 1局分の記録を加算する
    pub fn apply(&mut self, result: &PlayerResult) {
        self.total_score += result.final_score_diff;
        self.rank_counts[result.rank.index()] += 1;
        match result.special_flag {
            SpecialFlag::Bust => self.busts += 1,
            SpecialFlag::DealInBust => self.deal_in_busts += 1,
            SpecialFlag::None => {}
        }
        self.yakuman += yakuman_increment(result.yakuman_count);
        self.confirmed_value += result.confirmed_value;
    }

    /// 1局分の記録を減算した値を返す。
    ///
    /// 回数が負になる場合（記録が加算されていない）は `None`。
    pub fn reverted(&self, result: &PlayerResult) -> Option<PlayerStats> {
        let mut next = *self;
        next.total_score -= result.final_score_diff;
        let slot = &mut next.rank_counts[result.rank.index()];
        *slot = slot.checked_sub(1)?;
        match result.special_flag {
            SpecialFlag::Bust => next.busts = next.busts.checked_sub(1)?,
            SpecialFlag::DealInBust => next.deal_in_busts = next.deal_in_busts.checked_sub(1)?,
            SpecialFlag::None => {}
        }
        next.yakuman = next.yakuman.checked_sub(yakuman_increment(result.yakuman_count))?;
        next.confirmed_value -= result.confirmed_value;
        Some(next)
    }

    /// 別の集計をフィールドごとに加算する（精算用）
    pub fn merge(&mut self, other: &PlayerStats) {
        self.total_score += other.total_score;
        for (mine, theirs) in self.rank_counts.iter_mut().zip(other.rank_counts) {
            *mine += theirs;
        }
        self.busts += other.busts;
        self.deal_in_busts += other.deal_in_busts;
        self.yakuman += other.yakuman;
        self.confirmed_value += other.confirmed_value;
    }

    #[inline]
    pub fn rank_count(&self, rank: Rank) -> u32 {
        self.rank_counts[rank.index()]
    }

    /// 対局数
    pub fn games(&self) -> u32 {
        self.rank_counts.iter().sum()
    }

    /// 着順率（%）。対局数 0 なら 0。
    pub fn rank_rate(&self, rank: Rank) -> f64 {
        match self.games() {
            0 => 0.0,
            games => f64::from(self.rank_count(rank)) * 100.0 / f64::from(games),
        }
    }

    /// 平均着順。対局数 0 なら `None`。
    pub fn average_rank(&self) -> Option<f64> {
        let games = self.games();
        if games == 0 {
            return None;
        }
        let weighted: u32 = Rank::ALL
            .iter()
            .map(|&r| u32::from(r.position()) * self.rank_count(r))
            .sum();
        Some(f64::from(weighted) / f64::from(games))
    }

    pub fn is_zero(&self) -> bool {
        *self == PlayerStats::default()
    }
}

#[inline]
fn yakuman_increment(count: i32) -> u32 {
    count.max(0).unsigned_abs()
}

/// 保存形式（集計表と同じ日本語キー）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct StatsRecord {
    #[serde(rename = "総合勝ち得点")]
    total_score: i64,
    #[serde(rename = "1位")]
    first: u32,
    #[serde(rename = "2位")]
    second: u32,
    #[serde(rename = "3位")]
    third: u32,
    #[serde(rename = "4位")]
    fourth: u32,
    #[serde(rename = "跳ばし")]
    deal_in_busts: u32,
    #[serde(rename = "跳び")]
    busts: u32,
    #[serde(rename = "役満")]
    yakuman: u32,
    #[serde(rename = "確定値")]
    confirmed_value: ConfirmedValue,
}

impl From<StatsRecord> for PlayerStats {
    fn from(r: StatsRecord) -> Self {
        PlayerStats {
            total_score: r.total_score,
            rank_counts: [r.first, r.second, r.third, r.fourth],
            busts: r.busts,
            deal_in_busts: r.deal_in_busts,
            yakuman: r.yakuman,
            confirmed_value: r.confirmed_value,
        }
    }
}

impl From<PlayerStats> for StatsRecord {
    fn from(s: PlayerStats) -> Self {
        let [first, second, third, fourth] = s.rank_counts;
        StatsRecord {
            total_score: s.total_score,
            first,
            second,
            third,
            fourth,
            deal_in_busts: s.deal_in_busts,
            busts: s.busts,
            yakuman: s.yakuman,
            confirmed_value: s.confirmed_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(rank: Rank, diff: i64, flag: SpecialFlag, yakuman: i32) -> PlayerResult {
        PlayerResult {
            player: PlayerName::new("A").unwrap(),
            score: 25_000 + diff,
            uma: 0,
            final_score_diff: diff,
            rank,
            yakuman_count: yakuman,
            yakuman_bonus: 0.0,
            special_flag: flag,
            confirmed_value: ConfirmedValue::from_f64(diff as f64 / 10.0),
        }
    }

    #[test]
    fn test_apply_then_revert_is_identity() {
        let mut stats = PlayerStats::default();
        stats.apply(&result(Rank::Second, 8_000, SpecialFlag::None, 0));
        let before = stats;
        let r = result(Rank::First, 27_000, SpecialFlag::DealInBust, 2);
        stats.apply(&r);
        assert_eq!(stats.deal_in_busts, 1);
        assert_eq!(stats.yakuman, 2);
        assert_eq!(stats.reverted(&r), Some(before));
    }

    #[test]
    fn test_negative_yakuman_is_not_counted() {
        let mut stats = PlayerStats::default();
        stats.apply(&result(Rank::Fourth, -19_000, SpecialFlag::Bust, -1));
        assert_eq!(stats.yakuman, 0);
        assert_eq!(stats.busts, 1);
    }

    #[test]
    fn test_revert_detects_underflow() {
        let stats = PlayerStats::default();
        assert_eq!(stats.reverted(&result(Rank::First, 1_000, SpecialFlag::None, 0)), None);
    }

    #[test]
    fn test_rates_and_average_rank() {
        let mut stats = PlayerStats::default();
        assert_eq!(stats.average_rank(), None);
        assert_eq!(stats.rank_rate(Rank::First), 0.0);
        stats.apply(&result(Rank::First, 17_000, SpecialFlag::None, 0));
        stats.apply(&result(Rank::Third, -6_000, SpecialFlag::None, 0));
        assert_eq!(stats.games(), 2);
        assert_eq!(stats.average_rank(), Some(2.0));
        assert_eq!(stats.rank_rate(Rank::First), 50.0);
        assert_eq!(stats.total_score, 11_000);
    }

    #[test]
    fn test_merge_adds_fieldwise() {
        let mut a = PlayerStats::default();
        a.apply(&result(Rank::First, 17_000, SpecialFlag::None, 1));
        let mut b = PlayerStats::default();
        b.apply(&result(Rank::Fourth, -19_000, SpecialFlag::Bust, 0));
        a.merge(&b);
        assert_eq!(a.rank_counts, [1, 0, 0, 1]);
        assert_eq!(a.total_score, -2_000);
        assert_eq!(a.busts, 1);
        assert_eq!(a.yakuman, 1);
        assert_eq!(a.confirmed_value.as_f64(), -200.0);
    }

    #[test]
    fn test_serialized_with_table_keys() {
        let mut stats = PlayerStats::default();
        stats.apply(&result(Rank::Second, 8_000, SpecialFlag::DealInBust, 0));
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["総合勝ち得点"], 8_000);
        assert_eq!(json["2位"], 1);
        assert_eq!(json["跳ばし"], 1);
        assert_eq!(json["確定値"], 800.0);
        let back: PlayerStats = serde_json::from_value(json).unwrap();
        assert_eq!(back, stats);
        // 欠けたキーは 0
        let partial: PlayerStats = serde_json::from_str(r#"{"1位": 3}"#).unwrap();
        assert_eq!(partial.rank_counts, [3, 0, 0, 0]);
    }
}
