//! Named statistic counters for one entity.
//!
//! A `StatAccumulator` is a commutative monoid under [`StatAccumulator::add`]
//! with the empty map as identity. [`StatAccumulator::subtract`] is the
//! building block of incremental diffs and [`StatAccumulator::max_merge`]
//! reconciles the two independently unreliable sources of an entity's totals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{FeedError, Result};

/// Entity id the feed uses for team-level (non-player) statistics.
pub const TEAM_ENTITY_ID: &str = "0";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Team,
}

/// Identity of the entity a set of statistics belongs to.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatOwner {
    pub id: String,
    pub kind: EntityKind,
}

impl StatOwner {
    pub fn player(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: EntityKind::Player }
    }

    pub fn team(abbr: impl Into<String>) -> Self {
        Self { id: abbr.into(), kind: EntityKind::Team }
    }
}

impl fmt::Display for StatOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntityKind::Player => write!(f, "player:{}", self.id),
            EntityKind::Team => write!(f, "team:{}", self.id),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StatAccumulator {
    pub owner: StatOwner,
    /// Display name as reported by the feed (e.g. "T.Brady").
    pub name: String,
    /// Team abbreviation the entity played for.
    pub team: String,
    /// `None` once records with different home/away flags are summed.
    pub home: Option<bool>,
    values: BTreeMap<String, f64>,
}

impl StatAccumulator {
    pub fn new(owner: StatOwner, name: impl Into<String>, team: impl Into<String>) -> Self {
        Self { owner, name: name.into(), team: team.into(), home: None, values: BTreeMap::new() }
    }

    /// The identity element for `owner`.
    pub fn empty(owner: StatOwner) -> Self {
        Self::new(owner, String::new(), String::new())
    }

    pub fn with_home(mut self, home: bool) -> Self {
        self.home = Some(home);
        self
    }

    /// Value of `field`, zero when the entity never recorded it.
    pub fn get(&self, field: &str) -> f64 {
        self.values.get(field).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Adds `value` onto `field`.
    pub fn record(&mut self, field: impl Into<String>, value: f64) {
        *self.values.entry(field.into()).or_insert(0.0) += value;
    }

    /// Overwrites `field` with `value`.
    pub fn set(&mut self, field: impl Into<String>, value: f64) {
        self.values.insert(field.into(), value);
    }

    pub fn record_all<'a, I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        for (field, value) in values {
            self.record(field.clone(), *value);
        }
    }

    pub fn values(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    fn check_owner(&self, other: &StatAccumulator) -> Result<()> {
        if self.owner != other.owner {
            return Err(FeedError::IdentityMismatch {
                left: self.owner.to_string(),
                right: other.owner.to_string(),
            });
        }
        Ok(())
    }

    fn merged_metadata(&self, other: &StatAccumulator) -> Self {
        let name = if self.name.is_empty() { other.name.clone() } else { self.name.clone() };
        let team = if self.team.is_empty() { other.team.clone() } else { self.team.clone() };
        let home = match (self.home, other.home) {
            (Some(a), Some(b)) if a == b => Some(a),
            (Some(a), None) | (None, Some(a)) => Some(a),
            _ => None,
        };
        Self { owner: self.owner.clone(), name, team, home, values: BTreeMap::new() }
    }

    /// Per-field sum. Both sides must describe the same entity.
    pub fn add(&self, other: &StatAccumulator) -> Result<StatAccumulator> {
        self.check_owner(other)?;
        let mut sum = self.merged_metadata(other);
        sum.values = self.values.clone();
        sum.record_all(other.values.iter());
        Ok(sum)
    }

    /// What `self` recorded beyond `other`.
    ///
    /// Fields only `other` knows about are ignored (the feed never takes a
    /// stat away) and non-positive results are dropped. Returns `Ok(None)`
    /// when nothing is left, i.e. no new activity.
    pub fn subtract(&self, other: &StatAccumulator) -> Result<Option<StatAccumulator>> {
        self.check_owner(other)?;
        let mut delta = Self { values: BTreeMap::new(), ..self.clone() };
        for (field, value) in &self.values {
            let remaining = value - other.get(field);
            if remaining > 0.0 {
                delta.values.insert(field.clone(), remaining);
            }
        }
        if delta.values.is_empty() {
            return Ok(None);
        }
        Ok(Some(delta))
    }

    /// Per-field maximum; fields present on one side only pass through.
    pub fn max_merge(&self, other: &StatAccumulator) -> Result<StatAccumulator> {
        self.check_owner(other)?;
        let mut merged = self.merged_metadata(other);
        merged.values = self.values.clone();
        for (field, value) in &other.values {
            merged
                .values
                .entry(field.clone())
                .and_modify(|v| *v = v.max(*value))
                .or_insert(*value);
        }
        Ok(merged)
    }

    /// Whether any field belongs to `category` (e.g. `"passing"`).
    pub fn has_category(&self, category: &str) -> bool {
        let prefix = format!("{category}_");
        self.values.keys().any(|k| k.starts_with(&prefix))
    }

    /// Touchdowns across every category.
    pub fn touchdowns(&self) -> f64 {
        self.values.iter().filter(|(k, _)| k.ends_with("tds")).map(|(_, v)| *v).sum()
    }

    /// NFL passer rating, `None` without pass attempts.
    pub fn passer_rating(&self) -> Option<f64> {
        let att = self.get("passing_att");
        if att <= 0.0 {
            return None;
        }
        let ints = self.get("passing_int") + self.get("passing_ints");
        let components = [
            (self.get("passing_cmp") / att - 0.3) * 5.0,
            (self.get("passing_yds") / att - 3.0) * 0.25,
            (self.get("passing_tds") / att) * 20.0,
            2.375 - (ints / att * 25.0),
        ];
        let sum: f64 = components.iter().map(|c| c.clamp(0.0, 2.375)).sum();
        Some((sum / 6.0 * 1000.0).round() / 10.0)
    }
}
