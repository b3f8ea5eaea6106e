//! Wire schema of one game-center payload.
//!
//! The feed is loose with types: the same field may arrive as a number, a
//! numeric string, an empty string or null depending on game state. Every
//! numeric field therefore goes through the lenient helpers below.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Top-level key the feed uses next to the event id.
pub const NEXT_UPDATE_KEY: &str = "nextupdate";

fn lenient_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(*b as i64),
        _ => None,
    }
}

pub(crate) fn de_opt_i64<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(lenient_i64(&v))
}

pub(crate) fn de_i64<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_opt_i64(d)?.unwrap_or(0))
}

pub(crate) fn de_string<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

pub(crate) fn de_bool<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Bool(b) => b,
        other => lenient_i64(&other).is_some_and(|n| n != 0),
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGame {
    pub home: RawTeam,
    pub away: RawTeam,
    /// Drive records keyed by drive number, plus `crntdrv`.
    #[serde(default)]
    pub drives: BTreeMap<String, Value>,
    #[serde(default)]
    pub scrsummary: BTreeMap<String, RawScoringPlay>,
    #[serde(default, deserialize_with = "de_string")]
    pub qtr: String,
    #[serde(default, deserialize_with = "de_string")]
    pub clock: String,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub down: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub togo: Option<i64>,
    #[serde(default, deserialize_with = "de_string")]
    pub posteam: String,
    #[serde(default, deserialize_with = "de_bool")]
    pub redzone: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTeam {
    #[serde(deserialize_with = "de_string")]
    pub abbr: String,
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub to: Option<i64>,
    /// `"1".."5"` per period and `"T"` for the total.
    #[serde(default)]
    pub score: BTreeMap<String, Value>,
    /// Category blocks (`passing`, `rushing`, ...) and the `team` block.
    #[serde(default)]
    pub stats: BTreeMap<String, Value>,
}

impl RawTeam {
    pub fn score_for(&self, key: &str) -> u32 {
        self.score.get(key).and_then(lenient_i64).unwrap_or(0).max(0) as u32
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawScoringPlay {
    #[serde(default, deserialize_with = "de_string")]
    pub team: String,
    #[serde(default, rename = "type", deserialize_with = "de_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "de_i64")]
    pub qtr: i64,
    #[serde(default, deserialize_with = "de_string")]
    pub desc: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDrive {
    #[serde(default, deserialize_with = "de_string")]
    pub posteam: String,
    #[serde(default, deserialize_with = "de_bool")]
    pub redzone: bool,
    #[serde(default)]
    pub plays: BTreeMap<String, RawPlay>,
    #[serde(default, deserialize_with = "de_i64")]
    pub fds: i64,
    #[serde(default, deserialize_with = "de_string")]
    pub result: String,
    #[serde(default, deserialize_with = "de_i64")]
    pub penyds: i64,
    #[serde(default, deserialize_with = "de_i64")]
    pub ydsgained: i64,
    #[serde(default, deserialize_with = "de_string")]
    pub postime: String,
    #[serde(default)]
    pub start: RawDriveEdge,
    #[serde(default)]
    pub end: RawDriveEdge,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDriveEdge {
    #[serde(default, deserialize_with = "de_string")]
    pub qtr: String,
    #[serde(default, deserialize_with = "de_string")]
    pub time: String,
    #[serde(default, deserialize_with = "de_string")]
    pub yrdln: String,
    #[serde(default, deserialize_with = "de_string")]
    pub team: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlay {
    #[serde(default, deserialize_with = "de_string")]
    pub qtr: String,
    #[serde(default, deserialize_with = "de_i64")]
    pub down: i64,
    #[serde(default, deserialize_with = "de_string")]
    pub time: String,
    #[serde(default, deserialize_with = "de_string")]
    pub yrdln: String,
    #[serde(default, deserialize_with = "de_i64")]
    pub ydstogo: i64,
    #[serde(default, deserialize_with = "de_string")]
    pub posteam: String,
    #[serde(default, deserialize_with = "de_string")]
    pub desc: String,
    #[serde(default, deserialize_with = "de_string")]
    pub note: String,
    /// Stat occurrences keyed by player id (`"0"` for the team).
    #[serde(default)]
    pub players: BTreeMap<String, Vec<RawPlayEvent>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayEvent {
    #[serde(default, deserialize_with = "de_i64")]
    pub sequence: i64,
    #[serde(default, deserialize_with = "de_string")]
    pub clubcode: String,
    #[serde(default, rename = "playerName", deserialize_with = "de_string")]
    pub player_name: String,
    #[serde(rename = "statId", deserialize_with = "de_i64")]
    pub stat_id: i64,
    #[serde(default)]
    pub yards: Value,
}

/// One player's row in a category block, e.g. `{"name": "T.Brady", "att": 35, ...}`.
#[derive(Debug, Clone)]
pub struct CategoryLine {
    pub player_id: String,
    pub name: String,
    pub fields: Vec<(String, f64)>,
}

pub fn category_lines(block: &Value) -> Vec<CategoryLine> {
    let Some(players) = block.as_object() else {
        return Vec::new();
    };
    players
        .iter()
        .filter_map(|(player_id, fields)| {
            let fields = fields.as_object()?;
            let name = fields.get("name").and_then(Value::as_str).unwrap_or_default().to_string();
            let numeric = fields
                .iter()
                .filter(|(k, _)| k.as_str() != "name")
                .filter_map(|(k, v)| lenient_i64(v).map(|n| (k.clone(), n as f64)))
                .collect();
            Some(CategoryLine { player_id: player_id.clone(), name, fields: numeric })
        })
        .collect()
}

/// Numeric fields of the `team` block; `top` (time of possession) is returned separately.
pub fn team_block_fields(block: &Value) -> (Vec<(String, f64)>, String) {
    let Some(fields) = block.as_object() else {
        return (Vec::new(), String::new());
    };
    let top = fields.get("top").and_then(Value::as_str).unwrap_or_default().to_string();
    let numeric = fields
        .iter()
        .filter(|(k, _)| k.as_str() != "top")
        .filter_map(|(k, v)| match v {
            Value::Number(n) => n.as_f64().map(|f| (k.clone(), f)),
            Value::String(s) => s.trim().parse::<f64>().ok().map(|f| (k.clone(), f)),
            _ => None,
        })
        .collect();
    (numeric, top)
}
