//! 永続化
//!
//! 統計・履歴・設定の3つの文書を、それぞれ丸ごと上書きで保存する。
//! 文書の中身（JSON）はここで組み立て、保存先の違いは `Store` が吸収する。

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use std::io;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::round::RoundRecord;
use crate::settings::{Settings, SettingsParts, YakumanUnits};
use crate::state::AppState;
use crate::stats::StatsTable;
use crate::types::{GameType, PlayerName};

/// 保存形式のバージョン
pub const FORMAT_VERSION: &str = "1.0";

/// 保存する文書の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    Stats,
    History,
    Settings,
}

impl StoreKind {
    pub const ALL: [StoreKind; 3] = [StoreKind::Stats, StoreKind::History, StoreKind::Settings];

    pub const fn name(self) -> &'static str {
        match self {
            StoreKind::Stats => "stats",
            StoreKind::History => "history",
            StoreKind::Settings => "settings",
        }
    }

    /// データディレクトリ内のファイル名
    pub const fn file_name(self) -> &'static str {
        match self {
            StoreKind::Stats => "mahjong_stats.json",
            StoreKind::History => "mahjong_history.json",
            StoreKind::Settings => "app_settings.json",
        }
    }
}

/// 文書の保存先
pub trait Store {
    /// 保存済みの文書を読む。まだ保存されていなければ `Ok(None)`。
    fn read(&self, kind: StoreKind) -> io::Result<Option<String>>;

    /// 文書を丸ごと上書きする
    fn write(&mut self, kind: StoreKind, contents: &str) -> io::Result<()>;

    /// バックアップを書き出し、保存先を返す
    fn write_backup(&mut self, file_name: &str, contents: &str) -> io::Result<String>;
}

/// 現在時刻（RFC 3339、ローカル時刻）
pub fn timestamp() -> String {
    chrono::Local::now().to_rfc3339()
}

/// バックアップのファイル名
pub fn backup_file_name() -> String {
    chrono::Local::now()
        .format("mahjong_backup_%Y%m%d_%H%M%S.json")
        .to_string()
}

// ----------------------------------------------------------------------------
// 文書

#[derive(Debug, Serialize, Deserialize)]
struct StatsDocument {
    stats: StatsTable,
    #[serde(default)]
    session: StatsTable,
    last_updated: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryDocument {
    history: Vec<RoundRecord>,
    /// 欠けている場合は全局精算済みとみなす
    #[serde(default, skip_serializing_if = "Option::is_none")]
    settled_rounds: Option<usize>,
    last_updated: String,
    version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SettingsDocument {
    settings: SettingsRecord,
    last_updated: String,
    version: String,
}

/// 設定の保存形式（フラットなキー）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRecord {
    pub rate: f64,
    pub game_type: GameType,
    pub available_players: Vec<String>,
    /// 席の選択
    pub selected_players: Vec<String>,
    /// 現在の参加者
    pub players: Vec<String>,
    pub uma_1st: i32,
    pub uma_2nd: i32,
    pub uma_3rd: i32,
    pub uma_4th: i32,
    pub uma_1st_sanma: i32,
    pub uma_2nd_sanma: i32,
    pub uma_3rd_sanma: i32,
    pub yakuman_bonus: u32,
    /// 負の値で保存されていても絶対値として扱う
    pub yakuman_penalty: i64,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        SettingsRecord::from(&Settings::default())
    }
}

impl From<&Settings> for SettingsRecord {
    fn from(s: &Settings) -> Self {
        let names = |list: &[PlayerName]| list.iter().map(|p| p.to_string()).collect::<Vec<_>>();
        let [uma_1st, uma_2nd, uma_3rd, uma_4th] = uma_array(s.uma_table(GameType::FourPlayer));
        let [uma_1st_sanma, uma_2nd_sanma, uma_3rd_sanma] = uma_array(s.uma_table(GameType::ThreePlayer));
        let units = s.yakuman_units();
        SettingsRecord {
            rate: s.rate(),
            game_type: s.game_type(),
            available_players: names(s.available_players()),
            selected_players: names(s.selected_players()),
            players: names(s.roster()),
            uma_1st,
            uma_2nd,
            uma_3rd,
            uma_4th,
            uma_1st_sanma,
            uma_2nd_sanma,
            uma_3rd_sanma,
            yakuman_bonus: units.bonus,
            yakuman_penalty: i64::from(units.penalty),
        }
    }
}

impl TryFrom<SettingsRecord> for Settings {
    type Error = EngineError;

    fn try_from(r: SettingsRecord) -> Result<Self> {
        let names = |list: Vec<String>| {
            list.into_iter()
                .map(PlayerName::try_from)
                .collect::<Result<Vec<_>>>()
        };
        let penalty = u32::try_from(r.yakuman_penalty.unsigned_abs()).map_err(|_| {
            EngineError::InvalidSettings(format!("役満祝儀の減点 {} は範囲外です", r.yakuman_penalty))
        })?;
        Settings::from_parts(SettingsParts {
            game_type: r.game_type,
            rate: r.rate,
            yakuman: YakumanUnits {
                bonus: r.yakuman_bonus,
                penalty,
            },
            uma_four: [r.uma_1st, r.uma_2nd, r.uma_3rd, r.uma_4th],
            uma_three: [r.uma_1st_sanma, r.uma_2nd_sanma, r.uma_3rd_sanma],
            roster: names(r.players)?,
            selected: names(r.selected_players)?,
            available: names(r.available_players)?,
        })
    }
}

fn uma_array<const N: usize>(table: &[i32]) -> [i32; N] {
    let mut out = [0; N];
    for (dst, src) in out.iter_mut().zip(table) {
        *dst = *src;
    }
    out
}

/// 全データのバックアップ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub stats: StatsTable,
    pub session: StatsTable,
    pub history: Vec<RoundRecord>,
    pub settled_rounds: usize,
    pub settings: SettingsRecord,
    pub export_date: String,
    pub version: String,
}

impl Snapshot {
    pub fn of(state: &AppState, export_date: String) -> Self {
        Snapshot {
            stats: state.lifetime().clone(),
            session: state.session().clone(),
            history: state.history().to_vec(),
            settled_rounds: state.settled_rounds(),
            settings: SettingsRecord::from(state.settings()),
            export_date,
            version: FORMAT_VERSION.to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ----------------------------------------------------------------------------
// 読み込み / 保存

fn read_document<S, T>(store: &S, kind: StoreKind) -> Result<Option<T>>
where
    S: Store + ?Sized,
    T: for<'de> Deserialize<'de>,
{
    let read_error = |reason: String| EngineError::PersistenceRead {
        store: kind.name(),
        reason,
    };
    let Some(text) = store.read(kind).map_err(|e| read_error(e.to_string()))? else {
        return Ok(None);
    };
    serde_json::from_str(&text).map(Some).map_err(|e| read_error(e.to_string()))
}

/// 保存済みの状態を読み込む。
///
/// 読めなかった文書は既定値で置き換え、その理由を2つ目の戻り値で返す。
pub fn load_state<S: Store + ?Sized>(store: &S) -> (AppState, Vec<EngineError>) {
    let mut warnings = Vec::new();

    let settings = match read_document::<_, SettingsDocument>(store, StoreKind::Settings) {
        Ok(Some(doc)) => Settings::try_from(doc.settings).unwrap_or_else(|e| {
            warnings.push(EngineError::PersistenceRead {
                store: StoreKind::Settings.name(),
                reason: e.to_string(),
            });
            Settings::default()
        }),
        Ok(None) => Settings::default(),
        Err(e) => {
            warnings.push(e);
            Settings::default()
        }
    };

    let (lifetime, session) = match read_document::<_, StatsDocument>(store, StoreKind::Stats) {
        Ok(Some(doc)) => (doc.stats, doc.session),
        Ok(None) => Default::default(),
        Err(e) => {
            warnings.push(e);
            Default::default()
        }
    };

    let (history, settled_rounds) = match read_document::<_, HistoryDocument>(store, StoreKind::History) {
        Ok(Some(doc)) => {
            let settled = doc.settled_rounds.unwrap_or(doc.history.len());
            (doc.history, settled)
        }
        Ok(None) => (Vec::new(), 0),
        Err(e) => {
            warnings.push(e);
            (Vec::new(), 0)
        }
    };

    for w in &warnings {
        warn!("{w} (既定値を使用します)");
    }
    (AppState::new(settings, lifetime, session, history, settled_rounds), warnings)
}

fn write_document<S, T>(store: &mut S, kind: StoreKind, doc: &T) -> Result<()>
where
    S: Store + ?Sized,
    T: Serialize,
{
    let text = serde_json::to_string_pretty(doc)?;
    store.write(kind, &text).map_err(|source| EngineError::PersistenceWrite {
        store: kind.name(),
        source,
    })
}

/// 3つの文書をすべて保存する。失敗しても残りの文書は書き込み、最初の失敗を返す。
pub fn save_state<S: Store + ?Sized>(store: &mut S, state: &AppState) -> Result<()> {
    let now = timestamp();
    let results = [
        write_document(
            store,
            StoreKind::Stats,
            &StatsDocument {
                stats: state.lifetime().clone(),
                session: state.session().clone(),
                last_updated: now.clone(),
                version: FORMAT_VERSION.to_string(),
            },
        ),
        write_document(
            store,
            StoreKind::History,
            &HistoryDocument {
                history: state.history().to_vec(),
                settled_rounds: Some(state.settled_rounds()),
                last_updated: now.clone(),
                version: FORMAT_VERSION.to_string(),
            },
        ),
        write_document(
            store,
            StoreKind::Settings,
            &SettingsDocument {
                settings: SettingsRecord::from(state.settings()),
                last_updated: now,
                version: FORMAT_VERSION.to_string(),
            },
        ),
    ];
    let mut first = None;
    for r in results {
        if let Err(e) = r {
            warn!("{e}");
            first.get_or_insert(e);
        }
    }
    first.map_or(Ok(()), Err)
}
