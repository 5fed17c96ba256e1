//! 1人分の入力の解析: `NAME=SCORE[,bust|,dealt][,y=N]`

use anyhow::{Context, Result, bail};
use rmahjong_score::{PlayerInput, PlayerName, RoundInput, SpecialFlag};

pub fn parse_entry(text: &str) -> Result<PlayerInput> {
    let mut parts = text.split(',');
    let head = parts.next().unwrap_or_default();
    let Some((name, score)) = head.rsplit_once('=') else {
        bail!("invalid entry {text:?}: expected NAME=SCORE");
    };
    let player = PlayerName::new(name).with_context(|| format!("invalid entry {text:?}"))?;
    let score: i64 = score
        .trim()
        .parse()
        .with_context(|| format!("invalid score in {text:?}"))?;

    let mut entry = PlayerInput::new(player, score);
    for opt in parts.map(str::trim) {
        match opt {
            "bust" | "跳び" => entry = entry.with_flag(SpecialFlag::Bust),
            "dealt" | "跳ばし" => entry = entry.with_flag(SpecialFlag::DealInBust),
            _ => {
                let Some(count) = opt.strip_prefix("y=") else {
                    bail!("unknown option {opt:?} in {text:?}");
                };
                let count: i32 = count
                    .parse()
                    .with_context(|| format!("invalid yakuman count in {text:?}"))?;
                entry = entry.with_yakuman(count);
            }
        }
    }
    Ok(entry)
}

pub fn parse_round(entries: &[String]) -> Result<RoundInput> {
    let parsed = entries
        .iter()
        .map(|e| parse_entry(e))
        .collect::<Result<Vec<_>>>()?;
    Ok(RoundInput::new(parsed))
}
