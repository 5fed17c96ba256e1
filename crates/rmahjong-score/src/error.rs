//! Error types for the score book
//!
//! 全ての失敗はこの型で表し、`severity()` で重大度を宣言する。

use crate::types::{GameType, PlayerName};

/// 失敗の重大度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// 操作は続行できる（入力の見直し・警告表示で済む）
    Warning,
    /// 操作は拒否された、またはデータが読めなかった
    Error,
}

/// Score book errors
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    /// 素点合計が期待値と一致しない
    #[error("素点合計が一致しません: 合計 {total} / 期待値 {expected} (差額 {difference:+})")]
    ScoreMismatch {
        total: i64,
        expected: i64,
        difference: i64,
    },

    /// 取り消す記録がない
    #[error("取り消すゲーム記録がありません")]
    EmptyHistory,

    /// 直近の記録は精算済みで取り消せない
    #[error("直近のゲーム記録は精算済みのため取り消せません (精算済み {settled} 局)")]
    AlreadySettled { settled: usize },

    /// 1局分の入力が不正（人数・重複・ロスター外など）
    #[error("不正な入力: {0}")]
    InvalidRound(String),

    /// 設定値が不正
    #[error("不正な設定: {0}")]
    InvalidSettings(String),

    #[error("不正なプレイヤー名: {0:?}")]
    InvalidPlayerName(String),

    #[error("プレイヤーが見つかりません: {0}")]
    UnknownPlayer(PlayerName),

    #[error("プレイヤー名が既に使われています: {0}")]
    PlayerExists(PlayerName),

    /// 参加中・未精算のプレイヤーは削除できない
    #[error("{0} は参加中または未精算の記録があるため削除できません")]
    PlayerInUse(PlayerName),

    /// ウマ表の長さが種別の人数と合わない
    #[error("{game_type} のウマは {expected} 個必要です (指定 {actual} 個)")]
    UmaLength {
        game_type: GameType,
        expected: usize,
        actual: usize,
    },

    /// 取り消し時に統計が負になる（履歴と統計が食い違っている）
    #[error("{0} の統計が履歴と一致しないため取り消せません")]
    InconsistentStats(PlayerName),

    /// 保存データの読み込み失敗
    #[error("{store} の読み込みに失敗しました: {reason}")]
    PersistenceRead { store: &'static str, reason: String },

    /// 保存データの書き込み失敗
    #[error("{store} の保存に失敗しました: {source}")]
    PersistenceWrite {
        store: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl EngineError {
    /// 失敗の重大度
    ///
    /// 書き込み失敗はメモリ上の状態が正であり続けるため `Warning`、
    /// 読み込み失敗は既定値へのフォールバックを伴うため `Error`。
    pub fn severity(&self) -> Severity {
        match self {
            EngineError::ScoreMismatch { .. }
            | EngineError::EmptyHistory
            | EngineError::AlreadySettled { .. }
            | EngineError::PersistenceWrite { .. } => Severity::Warning,
            EngineError::InvalidRound(_)
            | EngineError::InvalidSettings(_)
            | EngineError::InvalidPlayerName(_)
            | EngineError::UnknownPlayer(_)
            | EngineError::PlayerExists(_)
            | EngineError::PlayerInUse(_)
            | EngineError::UmaLength { .. }
            | EngineError::InconsistentStats(_)
            | EngineError::PersistenceRead { .. }
            | EngineError::Serialize(_) => Severity::Error,
        }
    }
}

/// Result type for score book operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_of_recoverable_failures() {
        assert_eq!(EngineError::EmptyHistory.severity(), Severity::Warning);
        let mismatch = EngineError::ScoreMismatch {
            total: 99_000,
            expected: 100_000,
            difference: -1_000,
        };
        assert_eq!(mismatch.severity(), Severity::Warning);
        assert!(mismatch.to_string().contains("-1000"));
        let write = EngineError::PersistenceWrite {
            store: "stats",
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(write.severity(), Severity::Warning);
    }

    #[test]
    fn test_severity_of_read_failure() {
        let read = EngineError::PersistenceRead {
            store: "history",
            reason: "expected value at line 1".to_string(),
        };
        assert_eq!(read.severity(), Severity::Error);
    }
}
