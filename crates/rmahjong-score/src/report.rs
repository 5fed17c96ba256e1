//! 集計表（通算成績 / 今回の戦績）と CSV 出力

use std::io::{self, Write};

use serde::Serialize;

use crate::stats::{PlayerStats, StatsTable};
use crate::types::{ConfirmedValue, PlayerName, Rank};

/// 通算成績の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsRow {
    /// 総合勝ち得点順の順位（1始まり）
    pub position: usize,
    pub player: PlayerName,
    pub total_score: i64,
    pub confirmed_value: ConfirmedValue,
    pub rank_counts: [u32; Rank::NUM],
    pub games: u32,
    /// 1位率・2位率・3位率（%）
    pub top_rates: [f64; 3],
    pub deal_in_busts: u32,
    pub busts: u32,
    pub yakuman: u32,
}

/// 今回の戦績の1行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRow {
    pub player: PlayerName,
    pub games: u32,
    pub average_rank: f64,
    /// 着順率（%、1位〜4位）
    pub rank_rates: [f64; Rank::NUM],
    pub total_score: i64,
    /// レート込みの得点
    pub rated_score: f64,
    pub confirmed_value: ConfirmedValue,
    pub yakuman: u32,
    pub deal_in_busts: u32,
    pub busts: u32,
}

/// 通算成績を総合勝ち得点の降順に並べる（同点は名前順）
pub fn stats_table(lifetime: &StatsTable) -> Vec<StatsRow> {
    let mut entries: Vec<(&PlayerName, &PlayerStats)> = lifetime.iter().collect();
    entries.sort_by(|a, b| b.1.total_score.cmp(&a.1.total_score));
    entries
        .into_iter()
        .enumerate()
        .map(|(i, (player, s))| StatsRow {
            position: i + 1,
            player: player.clone(),
            total_score: s.total_score,
            confirmed_value: s.confirmed_value,
            rank_counts: s.rank_counts,
            games: s.games(),
            top_rates: [
                s.rank_rate(Rank::First),
                s.rank_rate(Rank::Second),
                s.rank_rate(Rank::Third),
            ],
            deal_in_busts: s.deal_in_busts,
            busts: s.busts,
            yakuman: s.yakuman,
        })
        .collect()
}

/// 今回の戦績（1局以上のプレイヤーのみ、名前順）
pub fn session_table(session: &StatsTable, rate: f64) -> Vec<SessionRow> {
    session
        .iter()
        .filter_map(|(player, s)| {
            let average_rank = s.average_rank()?;
            Some(SessionRow {
                player: player.clone(),
                games: s.games(),
                average_rank,
                rank_rates: Rank::ALL.map(|r| s.rank_rate(r)),
                total_score: s.total_score,
                rated_score: s.total_score as f64 * rate,
                confirmed_value: s.confirmed_value,
                yakuman: s.yakuman,
                deal_in_busts: s.deal_in_busts,
                busts: s.busts,
            })
        })
        .collect()
}

/// CSV の見出し
pub const CSV_HEADER: [&str; 11] = [
    "順位",
    "プレイヤー",
    "総合勝ち得点",
    "1位",
    "2位",
    "3位",
    "4位",
    "跳ばし",
    "跳び",
    "役満",
    "確定値",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// 通算成績表を CSV で書き出す（UTF-8 BOM 付き）
pub fn write_stats_csv<W: Write>(writer: &mut W, rows: &[StatsRow]) -> io::Result<()> {
    writer.write_all(UTF8_BOM)?;
    write_csv_row(writer, &CSV_HEADER)?;
    for row in rows {
        let [first, second, third, fourth] = row.rank_counts;
        let fields = [
            row.position.to_string(),
            row.player.to_string(),
            row.total_score.to_string(),
            first.to_string(),
            second.to_string(),
            third.to_string(),
            fourth.to_string(),
            row.deal_in_busts.to_string(),
            row.busts.to_string(),
            row.yakuman.to_string(),
            row.confirmed_value.as_f64().to_string(),
        ];
        write_csv_row(writer, &fields)?;
    }
    Ok(())
}

/// CSV をメモリ上に作る。行がなければ `None`。
pub fn export_stats_csv(rows: &[StatsRow]) -> Option<Vec<u8>> {
    if rows.is_empty() {
        return None;
    }
    let mut buf = Vec::new();
    // Vec への書き込みは失敗しない
    write_stats_csv(&mut buf, rows).ok()?;
    Some(buf)
}

fn write_csv_row<W: Write>(writer: &mut W, row: &[impl AsRef<str>]) -> io::Result<()> {
    for (idx, value) in row.iter().enumerate() {
        if idx > 0 {
            writer.write_all(b",")?;
        }
        write_csv_value(writer, value.as_ref())?;
    }
    writer.write_all(b"\n")
}

fn write_csv_value<W: Write>(writer: &mut W, value: &str) -> io::Result<()> {
    if !value.contains([',', '"', '\n', '\r']) {
        return writer.write_all(value.as_bytes());
    }
    writer.write_all(b"\"")?;
    writer.write_all(value.replace('"', "\"\"").as_bytes())?;
    writer.write_all(b"\"")
}
