//! 1局の得点計算
//!
//! 特殊フラグ補正 → 着順 → ウマ → 最終得点差 → 役満祝儀 → 確定値 の順に計算する。
//! どの関数も純粋で、状態を変更しない。

use log::{debug, warn};

use crate::round::{PlayerResult, RoundInput, RoundRecord, ValidatedRound};
use crate::settings::{GameConfig, Settings, UMA_SCALE, YakumanUnits};
use crate::types::{ConfirmedValue, Rank};

/// 補正後の点数から着順を決める。
///
/// 降順の安定ソートなので、同点の場合は先に並んだ方が上位になる。
/// 5人以上の入力には着順を付けられないため `None` を返す。
pub fn assign_ranks(scores: &[i64]) -> Option<Vec<Rank>> {
    if scores.len() > Rank::NUM {
        return None;
    }
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].cmp(&scores[a]));

    let mut ranks = vec![Rank::First; scores.len()];
    for (pos, &idx) in order.iter().enumerate() {
        ranks[idx] = Rank::ALL[pos];
    }
    Some(ranks)
}

/// 着順に対応するウマ（点）
#[inline]
pub fn uma_points(rank: Rank, config: &GameConfig<'_>) -> i64 {
    i64::from(config.uma_for(rank)) * UMA_SCALE
}

/// 役満祝儀による加減点（レート込み）
///
/// 正の回数は祝儀単価、負の回数は減点単価を掛ける。点数の収支には含めず、確定値にだけ反映する。
pub fn yakuman_bonus(count: i32, rate: f64, units: YakumanUnits) -> f64 {
    let unit = match count.signum() {
        1 => units.bonus,
        -1 => units.penalty,
        _ => return 0.0,
    };
    f64::from(count) * f64::from(unit) * UMA_SCALE as f64 * rate
}

/// 確定値 = (最終得点差 + 役満祝儀) × レート ÷ 10
///
/// 役満祝儀は既にレートを含むため、レートが2回掛かる。
#[inline]
pub fn confirmed_value(final_score_diff: i64, yakuman_bonus: f64, rate: f64) -> ConfirmedValue {
    ConfirmedValue::from_f64((final_score_diff as f64 + yakuman_bonus) * rate / 10.0)
}

/// 入力順の各プレイヤーの計算結果を返す（人数の検証は呼び出し側）。
pub(crate) fn compute_results(input: &RoundInput, settings: &Settings) -> Vec<PlayerResult> {
    let config = settings.game_config();
    let rate = settings.rate();
    let units = settings.yakuman_units();

    let adjusted: Vec<i64> = input.entries().iter().map(|e| e.adjusted_score()).collect();
    // 人数は Rank::NUM 以下に制限済み
    let ranks = assign_ranks(&adjusted).unwrap_or_default();

    input
        .entries()
        .iter()
        .zip(adjusted.iter().zip(ranks))
        .map(|(entry, (&score, rank))| {
            let uma = uma_points(rank, &config);
            let final_score_diff = score - config.base_score() + uma;
            let bonus = yakuman_bonus(entry.yakuman_count, rate, units);
            let value = confirmed_value(final_score_diff, bonus, rate);
            debug!(
                "{}: score={score} rank={rank} uma={uma} diff={final_score_diff} bonus={bonus} value={value}",
                entry.player
            );
            PlayerResult {
                player: entry.player.clone(),
                score,
                uma,
                final_score_diff,
                rank,
                yakuman_count: entry.yakuman_count,
                yakuman_bonus: bonus,
                special_flag: entry.flag,
                confirmed_value: value,
            }
        })
        .collect()
}

/// 検証済みの入力から1局分の記録を作る。
pub fn score_round(round: &ValidatedRound, settings: &Settings, recorded_at: String) -> RoundRecord {
    let record = RoundRecord {
        game_type: settings.game_type(),
        recorded_at,
        results: compute_results(round.input(), settings),
    };
    let sum = record.final_diff_sum();
    if sum != 0 {
        warn!("最終得点差の合計が 0 ではありません: {sum:+} (特殊フラグ補正 {:+})", round.input().flag_delta());
    }
    record
}
