//! 設定（対局種別・レート・ウマ・役満祝儀・参加プレイヤー）
//!
//! フィールドは非公開で、変更は検証付きのメソッド経由で行う。
//! 検証に失敗したメソッドは設定を一切変更しない。

use log::{info, warn};

use crate::error::{EngineError, Result};
use crate::types::{GameType, MAX_PLAYERS, PlayerName, Rank};

/// 既定のレート
pub const DEFAULT_RATE: f64 = 1.0;
/// 役満祝儀 +1 あたりの加点（千点単位）
pub const DEFAULT_YAKUMAN_BONUS_UNIT: u32 = 40;
/// 役満祝儀 -1 あたりの減点（千点単位）
pub const DEFAULT_YAKUMAN_PENALTY_UNIT: u32 = 20;
/// 四麻の既定ウマ（千点単位）
pub const DEFAULT_UMA_FOUR: [i32; 4] = [10, 5, -5, -10];
/// 三麻の既定ウマ（千点単位）
pub const DEFAULT_UMA_THREE: [i32; 3] = [15, -5, -10];
/// 初回起動時の参加者
pub const DEFAULT_ROSTER: [&str; 4] = ["杉村", "三瓶", "福原", "松井"];
/// 初回起動時のプレイヤー一覧に加える仮の名前の数（プレイヤー1〜8）
const DEFAULT_GUEST_COUNT: usize = 8;

/// ウマは千点単位で保持し、計算時にこの倍率を掛ける
pub const UMA_SCALE: i64 = 1000;

/// 1局の計算に使う種別ごとの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig<'a> {
    pub game_type: GameType,
    /// 着順ごとのウマ（千点単位、長さ = 人数）
    pub uma: &'a [i32],
}

impl GameConfig<'_> {
    #[inline]
    pub fn player_count(&self) -> usize {
        self.game_type.player_count()
    }

    #[inline]
    pub fn base_score(&self) -> i64 {
        self.game_type.base_score()
    }

    #[inline]
    pub fn expected_total(&self) -> i64 {
        self.game_type.expected_total()
    }

    /// 着順に対応するウマ（千点単位）。表の外の着順は 0。
    #[inline]
    pub fn uma_for(&self, rank: Rank) -> i32 {
        self.uma.get(rank.index()).copied().unwrap_or(0)
    }
}

/// 役満祝儀の単価（千点単位）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YakumanUnits {
    /// 祝儀 +1 あたりの加点
    pub bonus: u32,
    /// 祝儀 -1 あたりの減点（絶対値）
    pub penalty: u32,
}

impl Default for YakumanUnits {
    fn default() -> Self {
        Self {
            bonus: DEFAULT_YAKUMAN_BONUS_UNIT,
            penalty: DEFAULT_YAKUMAN_PENALTY_UNIT,
        }
    }
}

/// アプリ設定
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    game_type: GameType,
    rate: f64,
    yakuman: YakumanUnits,
    uma_four: [i32; 4],
    uma_three: [i32; 3],
    /// 現在の参加者（長さ = 人数）
    roster: Vec<PlayerName>,
    /// 席の選択（最大4人）。三麻→四麻の切替で4人目を復元するために保持する。
    selected: Vec<PlayerName>,
    /// 選択可能なプレイヤー一覧
    available: Vec<PlayerName>,
}

impl Default for Settings {
    fn default() -> Self {
        let guests = (1..=DEFAULT_GUEST_COUNT).map(|i| format!("プレイヤー{i}"));
        let available: Vec<PlayerName> = DEFAULT_ROSTER
            .iter()
            .map(|name| name.to_string())
            .chain(guests)
            .filter_map(|name| PlayerName::new(&name).ok())
            .collect();
        let roster: Vec<PlayerName> = available.iter().take(MAX_PLAYERS).cloned().collect();
        Self {
            game_type: GameType::FourPlayer,
            rate: DEFAULT_RATE,
            yakuman: YakumanUnits::default(),
            uma_four: DEFAULT_UMA_FOUR,
            uma_three: DEFAULT_UMA_THREE,
            selected: roster.clone(),
            roster,
            available,
        }
    }
}

/// 保存データ等から設定を組み立てるための生の値
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsParts {
    pub game_type: GameType,
    pub rate: f64,
    pub yakuman: YakumanUnits,
    pub uma_four: [i32; 4],
    pub uma_three: [i32; 3],
    pub roster: Vec<PlayerName>,
    pub selected: Vec<PlayerName>,
    pub available: Vec<PlayerName>,
}

impl Settings {
    /// 生の値から設定を組み立て、整合性を検証する。
    pub fn from_parts(parts: SettingsParts) -> Result<Self> {
        let settings = Self {
            game_type: parts.game_type,
            rate: parts.rate,
            yakuman: parts.yakuman,
            uma_four: parts.uma_four,
            uma_three: parts.uma_three,
            roster: parts.roster,
            selected: parts.selected,
            available: parts.available,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// 設定全体の整合性を検証する。
    pub fn validate(&self) -> Result<()> {
        check_rate(self.rate)?;
        check_unique(&self.available, "プレイヤー一覧")?;
        check_unique(&self.selected, "席の選択")?;
        if self.selected.len() > MAX_PLAYERS {
            return Err(EngineError::InvalidSettings(format!(
                "席の選択は最大 {MAX_PLAYERS} 人です ({} 人)",
                self.selected.len()
            )));
        }
        self.check_roster(&self.roster)
    }

    #[inline]
    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    #[inline]
    pub fn rate(&self) -> f64 {
        self.rate
    }

    #[inline]
    pub fn yakuman_units(&self) -> YakumanUnits {
        self.yakuman
    }

    pub fn roster(&self) -> &[PlayerName] {
        &self.roster
    }

    pub fn selected_players(&self) -> &[PlayerName] {
        &self.selected
    }

    pub fn available_players(&self) -> &[PlayerName] {
        &self.available
    }

    /// 指定した種別のウマ表（千点単位）
    pub fn uma_table(&self, game_type: GameType) -> &[i32] {
        match game_type {
            GameType::FourPlayer => &self.uma_four,
            GameType::ThreePlayer => &self.uma_three,
        }
    }

    /// 現在の種別の計算用設定
    pub fn game_config(&self) -> GameConfig<'_> {
        GameConfig {
            game_type: self.game_type,
            uma: self.uma_table(self.game_type),
        }
    }

    pub fn is_in_roster(&self, name: &str) -> bool {
        self.roster.iter().any(|p| p.as_str() == name)
    }

    pub fn is_available(&self, name: &str) -> bool {
        self.available.iter().any(|p| p.as_str() == name)
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<()> {
        check_rate(rate)?;
        info!("rate: {} -> {}", self.rate, rate);
        self.rate = rate;
        Ok(())
    }

    pub fn set_yakuman_units(&mut self, units: YakumanUnits) {
        info!("yakuman units: bonus={} penalty={}", units.bonus, units.penalty);
        self.yakuman = units;
    }

    /// ウマ表を設定する。長さは種別の人数と一致する必要がある。
    ///
    /// 合計が 0 でない表も受け付けるが、その場合は1局の最終得点がゼロサムにならない。
    pub fn set_uma(&mut self, game_type: GameType, table: &[i32]) -> Result<()> {
        let expected = game_type.player_count();
        if table.len() != expected {
            return Err(EngineError::UmaLength {
                game_type,
                expected,
                actual: table.len(),
            });
        }
        let sum: i32 = table.iter().sum();
        if sum != 0 {
            warn!("{game_type} のウマ合計が 0 ではありません: {table:?} (合計 {sum})");
        }
        match game_type {
            GameType::FourPlayer => self.uma_four.copy_from_slice(table),
            GameType::ThreePlayer => self.uma_three.copy_from_slice(table),
        }
        info!("uma ({game_type}): {table:?}");
        Ok(())
    }

    /// 対局種別を切り替える。
    ///
    /// 参加者は席の選択の先頭から人数分を取り、足りない分はプレイヤー一覧から補う。
    pub fn set_game_type(&mut self, game_type: GameType) -> Result<()> {
        let count = game_type.player_count();
        let mut roster: Vec<PlayerName> = self.selected.iter().take(count).cloned().collect();
        for p in &self.available {
            if roster.len() >= count {
                break;
            }
            if !roster.contains(p) {
                roster.push(p.clone());
            }
        }
        if roster.len() < count {
            return Err(EngineError::InvalidSettings(format!(
                "{game_type} には {count} 人必要ですが、プレイヤー一覧は {} 人です",
                self.available.len()
            )));
        }
        info!("game type: {} -> {}", self.game_type, game_type);
        self.game_type = game_type;
        self.selected = merge_selection(&roster, &self.selected);
        self.roster = roster;
        Ok(())
    }

    /// 参加者を設定する。人数一致・重複なし・プレイヤー一覧に含まれることが条件。
    pub fn set_roster(&mut self, roster: Vec<PlayerName>) -> Result<()> {
        self.check_roster(&roster)?;
        info!(
            "roster: {}",
            roster.iter().map(PlayerName::as_str).collect::<Vec<_>>().join(", ")
        );
        self.selected = merge_selection(&roster, &self.selected);
        self.roster = roster;
        Ok(())
    }

    /// プレイヤー一覧に追加する。
    pub fn add_player(&mut self, name: PlayerName) -> Result<()> {
        if self.available.contains(&name) {
            return Err(EngineError::PlayerExists(name));
        }
        info!("player added: {name}");
        self.available.push(name);
        Ok(())
    }

    /// プレイヤー一覧・席の選択・参加者の名前を置き換える（重複検査は呼び出し側）。
    pub(crate) fn rename_player(&mut self, old: &PlayerName, new: &PlayerName) {
        for list in [&mut self.available, &mut self.selected, &mut self.roster] {
            for p in list.iter_mut() {
                if p == old {
                    *p = new.clone();
                }
            }
        }
    }

    /// プレイヤー一覧と席の選択から外す（参加者でないことは呼び出し側で確認済み）。
    pub(crate) fn remove_player(&mut self, name: &PlayerName) {
        self.available.retain(|p| p != name);
        self.selected.retain(|p| p != name);
    }

    fn check_roster(&self, roster: &[PlayerName]) -> Result<()> {
        let expected = self.game_type.player_count();
        if roster.len() != expected {
            return Err(EngineError::InvalidSettings(format!(
                "{} の参加者は {expected} 人です ({} 人指定)",
                self.game_type,
                roster.len()
            )));
        }
        check_unique(roster, "参加者")?;
        if let Some(missing) = roster.iter().find(|p| !self.available.contains(p)) {
            return Err(EngineError::UnknownPlayer(missing.clone()));
        }
        Ok(())
    }
}

fn check_rate(rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(EngineError::InvalidSettings(format!(
            "レートは正の数である必要があります: {rate}"
        )));
    }
    Ok(())
}

fn check_unique(names: &[PlayerName], what: &str) -> Result<()> {
    for (i, p) in names.iter().enumerate() {
        if names[..i].contains(p) {
            return Err(EngineError::InvalidSettings(format!("{what} に {p} が重複しています")));
        }
    }
    Ok(())
}

/// 新しい参加者を先頭に置き、以前の席の選択の残りで最大4人まで埋める。
fn merge_selection(roster: &[PlayerName], previous: &[PlayerName]) -> Vec<PlayerName> {
    let mut selected = roster.to_vec();
    for p in previous {
        if selected.len() >= MAX_PLAYERS {
            break;
        }
        if !selected.contains(p) {
            selected.push(p.clone());
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<PlayerName> {
        list.iter().map(|s| PlayerName::new(s).unwrap()).collect()
    }

    #[test]
    fn test_default_settings_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.game_type(), GameType::FourPlayer);
        assert_eq!(s.roster(), names(&DEFAULT_ROSTER).as_slice());
        assert_eq!(s.available_players().len(), 12);
        assert!(s.is_available("プレイヤー8"));
        assert_eq!(s.uma_table(GameType::FourPlayer), &[10, 5, -5, -10]);
        assert_eq!(s.uma_table(GameType::ThreePlayer), &[15, -5, -10]);
        assert_eq!(s.yakuman_units(), YakumanUnits { bonus: 40, penalty: 20 });
    }

    #[test]
    fn test_rate_must_be_positive() {
        let mut s = Settings::default();
        assert!(s.set_rate(0.0).is_err());
        assert!(s.set_rate(-1.0).is_err());
        assert!(s.set_rate(f64::NAN).is_err());
        assert_eq!(s.rate(), 1.0);
        s.set_rate(0.5).unwrap();
        assert_eq!(s.rate(), 0.5);
    }

    #[test]
    fn test_switch_to_three_player_and_back_restores_fourth_seat() {
        let mut s = Settings::default();
        let four = s.roster().to_vec();
        s.set_game_type(GameType::ThreePlayer).unwrap();
        assert_eq!(s.roster(), &four[..3]);
        assert_eq!(s.game_config().uma, &[15, -5, -10]);
        s.set_game_type(GameType::FourPlayer).unwrap();
        assert_eq!(s.roster(), &four[..]);
    }

    #[test]
    fn test_set_roster_validates_count_duplicates_and_pool() {
        let mut s = Settings::default();
        let pool = s.available_players().to_vec();
        assert!(s.set_roster(pool[..3].to_vec()).is_err());
        let dup = vec![pool[0].clone(), pool[0].clone(), pool[1].clone(), pool[2].clone()];
        assert!(s.set_roster(dup).is_err());
        let mut outsider = pool[..3].to_vec();
        outsider.extend(names(&["ゲスト"]));
        assert!(matches!(s.set_roster(outsider), Err(EngineError::UnknownPlayer(_))));

        let new_roster = pool[4..8].to_vec();
        s.set_roster(new_roster.clone()).unwrap();
        assert_eq!(s.roster(), &new_roster[..]);
        assert_eq!(s.selected_players(), &new_roster[..]);
    }

    #[test]
    fn test_set_uma_checks_length() {
        let mut s = Settings::default();
        let err = s.set_uma(GameType::ThreePlayer, &[10, 0, -5, -5]).unwrap_err();
        assert!(matches!(err, EngineError::UmaLength { expected: 3, actual: 4, .. }));
        s.set_uma(GameType::ThreePlayer, &[20, 0, -20]).unwrap();
        assert_eq!(s.uma_table(GameType::ThreePlayer), &[20, 0, -20]);
        // 合計が 0 でなくても受け付ける（警告のみ）
        s.set_uma(GameType::FourPlayer, &[30, 10, -10, -20]).unwrap();
    }

    #[test]
    fn test_add_and_rename_player() {
        let mut s = Settings::default();
        let guest = PlayerName::new("ゲスト").unwrap();
        s.add_player(guest.clone()).unwrap();
        assert!(matches!(s.add_player(guest.clone()), Err(EngineError::PlayerExists(_))));

        let old = s.roster()[0].clone();
        let new = PlayerName::new("田中").unwrap();
        s.rename_player(&old, &new);
        assert_eq!(s.roster()[0], new);
        assert_eq!(s.selected_players()[0], new);
        assert!(s.is_available("田中"));
        assert!(!s.is_available(old.as_str()));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_from_parts_rejects_roster_outside_pool() {
        let parts = SettingsParts {
            game_type: GameType::ThreePlayer,
            rate: 1.0,
            yakuman: YakumanUnits::default(),
            uma_four: DEFAULT_UMA_FOUR,
            uma_three: DEFAULT_UMA_THREE,
            roster: names(&["A", "B", "C"]),
            selected: names(&["A", "B", "C"]),
            available: names(&["A", "B"]),
        };
        assert!(Settings::from_parts(parts).is_err());
    }
}
