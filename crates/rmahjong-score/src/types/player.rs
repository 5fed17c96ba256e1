//! プレイヤー名

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::error::EngineError;

/// プレイヤー名。前後の空白を除いた空でない文字列で、プレイヤーの識別子を兼ねる。
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(name: &str) -> Result<Self, EngineError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidPlayerName(name.to_string()));
        }
        Ok(PlayerName(trimmed.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerName {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        PlayerName::new(&s)
    }
}

impl TryFrom<&str> for PlayerName {
    type Error = EngineError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        PlayerName::new(s)
    }
}

impl From<PlayerName> for String {
    fn from(p: PlayerName) -> String {
        p.0
    }
}

impl Borrow<str> for PlayerName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_name_is_trimmed() {
        let p = PlayerName::new("  杉村 ").unwrap();
        assert_eq!(p.as_str(), "杉村");
        assert!(PlayerName::new("   ").is_err());
    }

    #[test]
    fn test_player_name_rejects_empty_json() {
        assert!(serde_json::from_str::<PlayerName>("\"\"").is_err());
        let p: PlayerName = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(p.to_string(), "A");
    }
}
