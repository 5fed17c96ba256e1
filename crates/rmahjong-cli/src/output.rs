//! 表示（テキスト / JSON）

use anyhow::Result;
use rmahjong_score::{
    AppState, GameType, PlayerName, PlayerResult, RoundPreview, RoundRecord, SessionRow, Settings,
    SettlementSummary, SpecialFlag, StatsRow, ValidationResult,
};
use serde::Serialize;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// 設定・状態

#[derive(Serialize)]
pub struct SettingsView<'a> {
    pub game_type: GameType,
    pub rate: f64,
    pub roster: Vec<&'a str>,
    pub selected_players: Vec<&'a str>,
    pub available_players: Vec<&'a str>,
    pub uma_four: &'a [i32],
    pub uma_three: &'a [i32],
    pub yakuman_bonus: u32,
    pub yakuman_penalty: u32,
}

impl<'a> SettingsView<'a> {
    pub fn of(s: &'a Settings) -> Self {
        let names = |list: &'a [PlayerName]| -> Vec<&'a str> { list.iter().map(PlayerName::as_str).collect() };
        let units = s.yakuman_units();
        SettingsView {
            game_type: s.game_type(),
            rate: s.rate(),
            roster: names(s.roster()),
            selected_players: names(s.selected_players()),
            available_players: names(s.available_players()),
            uma_four: s.uma_table(GameType::FourPlayer),
            uma_three: s.uma_table(GameType::ThreePlayer),
            yakuman_bonus: units.bonus,
            yakuman_penalty: units.penalty,
        }
    }
}

pub fn print_settings(s: &Settings) {
    let v = SettingsView::of(s);
    println!("種別:       {}", v.game_type);
    println!("レート:     {}", v.rate);
    println!("参加者:     {}", v.roster.join(", "));
    println!("プレイヤー: {}", v.available_players.join(", "));
    println!("ウマ(四麻): {:?}", v.uma_four);
    println!("ウマ(三麻): {:?}", v.uma_three);
    println!("役満祝儀:   +{} / -{}", v.yakuman_bonus, v.yakuman_penalty);
}

#[derive(Serialize)]
pub struct StatusView<'a> {
    pub settings: SettingsView<'a>,
    pub rounds: usize,
    pub settled_rounds: usize,
    pub unsettled_rounds: usize,
    pub lifetime_players: usize,
    pub session_players: usize,
}

impl<'a> StatusView<'a> {
    pub fn of(state: &'a AppState) -> Self {
        StatusView {
            settings: SettingsView::of(state.settings()),
            rounds: state.history().len(),
            settled_rounds: state.settled_rounds(),
            unsettled_rounds: state.unsettled_rounds().len(),
            lifetime_players: state.lifetime().len(),
            session_players: state.session().len(),
        }
    }
}

pub fn print_status(state: &AppState) {
    let v = StatusView::of(state);
    print_settings(state.settings());
    println!(
        "対戦数:     {} (精算済み {} / 未精算 {})",
        v.rounds, v.settled_rounds, v.unsettled_rounds
    );
}

// ---------------------------------------------------------------------------
// 1局

pub fn print_validation(v: &ValidationResult) {
    let mark = if v.valid { "OK" } else { "NG" };
    println!(
        "素点合計 {mark}: {} / {} (差額 {:+})",
        v.total, v.expected, v.difference
    );
    if v.flag_delta != 0 {
        println!("特殊フラグ補正の合計が {:+} のため、最終得点はゼロサムになりません", v.flag_delta);
    }
}

fn print_results(results: &[PlayerResult]) {
    let mut sorted: Vec<&PlayerResult> = results.iter().collect();
    sorted.sort_by_key(|r| r.rank);
    for r in sorted {
        let mut extra = String::new();
        if r.special_flag != SpecialFlag::None {
            extra.push_str(&format!(" {}", r.special_flag.label()));
        }
        if r.yakuman_count != 0 {
            extra.push_str(&format!(" 役満祝儀 {:+} ({:+.0})", r.yakuman_count, r.yakuman_bonus));
        }
        println!(
            "{} {:<10} {:>7} ウマ {:>+7} 得点 {:>+7} 確定値 {:>+9.1}{extra}",
            r.rank,
            r.player.as_str(),
            r.score,
            r.uma,
            r.final_score_diff,
            r.confirmed_value.as_f64(),
        );
    }
}

pub fn print_preview(p: &RoundPreview) {
    print_validation(&p.validation);
    print_results(&p.results);
}

pub fn print_record(r: &RoundRecord) {
    println!("{} {}", r.game_type, r.recorded_at);
    print_results(&r.results);
}

pub fn print_history(history: &[RoundRecord], settled: usize, skip: usize) {
    for (i, r) in history.iter().enumerate().skip(skip) {
        let mark = if i < settled { "精算済" } else { "未精算" };
        println!("#{} [{mark}] {} {}", i + 1, r.game_type, r.recorded_at);
        print_results(&r.results);
    }
}

pub fn print_settlement(s: &SettlementSummary) {
    if s.is_empty() {
        println!("精算する戦績がありません");
    } else {
        println!("{} 局分の戦績を {} 人の通算成績に反映しました", s.rounds, s.players.len());
    }
}

// ---------------------------------------------------------------------------
// 集計表

pub fn print_stats_table(rows: &[StatsRow]) {
    if rows.is_empty() {
        println!("通算成績はまだありません");
        return;
    }
    println!(
        "{:>4} {:<10} {:>9} {:>9} {:>3} {:>3} {:>3} {:>3} {:>6} {:>6} {:>6} {:>4} {:>4} {:>4}",
        "順位", "プレイヤー", "得点", "確定値", "1位", "2位", "3位", "4位", "1位率", "2位率", "3位率",
        "跳ばし", "跳び", "役満"
    );
    for r in rows {
        let [first, second, third, fourth] = r.rank_counts;
        let [top1, top2, top3] = r.top_rates;
        println!(
            "{:>4} {:<10} {:>+9} {:>+9.1} {:>3} {:>3} {:>3} {:>3} {:>5.0}% {:>5.0}% {:>5.0}% {:>4} {:>4} {:>4}",
            r.position,
            r.player.as_str(),
            r.total_score,
            r.confirmed_value.as_f64(),
            first,
            second,
            third,
            fourth,
            top1,
            top2,
            top3,
            r.deal_in_busts,
            r.busts,
            r.yakuman,
        );
    }
}

pub fn print_session_table(rows: &[SessionRow]) {
    if rows.is_empty() {
        println!("今回の戦績はまだありません");
        return;
    }
    for r in rows {
        let rates: Vec<String> = r.rank_rates.iter().map(|x| format!("{x:.1}%")).collect();
        println!(
            "{:<10} {}戦 平均順位 {:.2} 順位率 [{}] 得点 {:+} レート込み {:+.1} 確定値 {:+.1} 役満 {} 跳ばし {} 跳び {}",
            r.player.as_str(),
            r.games,
            r.average_rank,
            rates.join(" "),
            r.total_score,
            r.rated_score,
            r.confirmed_value.as_f64(),
            r.yakuman,
            r.deal_in_busts,
            r.busts,
        );
    }
}
