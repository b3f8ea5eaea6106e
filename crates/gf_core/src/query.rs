//! Searching and aggregating player statistics.
//!
//! `PlayerStats` is an ordered set of per-player accumulators built from
//! plays, drives or whole games. It is consumed by value so searches chain:
//!
//! ```ignore
//! let leaders = snapshot
//!     .player_stats()
//!     .category(StatCategory::Passing)
//!     .filter(|p| p.home == Some(true))
//!     .sort_by_field("passing_yds", true)
//!     .limit(3);
//! ```

use std::cmp::Ordering;

use crate::data::StatCategory;
use crate::error::Result;
use crate::models::{Drive, EventSnapshot, Play, StatAccumulator};

/// Player accumulators in first-appearance order.
#[derive(Debug, Clone, Default)]
pub struct PlayerStats {
    players: Vec<StatAccumulator>,
}

impl PlayerStats {
    pub fn new(players: Vec<StatAccumulator>) -> Self {
        Self { players }
    }

    /// Sums every player's statistics over `plays`.
    pub fn from_plays<'a, I>(plays: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Play>,
    {
        let mut stats = Self::default();
        for play in plays {
            for player in &play.players {
                stats.absorb(player)?;
            }
        }
        Ok(stats)
    }

    pub fn from_drives<'a, I>(drives: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a Drive>,
    {
        Self::from_plays(drives.into_iter().flat_map(|d| d.plays.iter()))
    }

    /// Combines the reconciled per-player totals of several games, e.g. a
    /// week or a season.
    pub fn combine<'a, I>(games: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a EventSnapshot>,
    {
        let mut stats = Self::default();
        for game in games {
            for player in game.entities.values() {
                stats.absorb(player)?;
            }
        }
        Ok(stats)
    }

    fn absorb(&mut self, player: &StatAccumulator) -> Result<()> {
        match self.players.iter_mut().find(|p| p.owner == player.owner) {
            Some(total) => *total = total.add(player)?,
            None => self.players.push(player.clone()),
        }
        Ok(())
    }

    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnMut(&StatAccumulator) -> bool,
    {
        Self { players: self.players.into_iter().filter(predicate).collect() }
    }

    /// Keeps players that recorded `field` with a value satisfying `test`.
    /// Players without the field are dropped.
    pub fn filter_field<P>(self, field: &str, mut test: P) -> Self
    where
        P: FnMut(f64) -> bool,
    {
        self.filter(|p| p.contains(field) && test(p.get(field)))
    }

    /// Players with any statistic in `category`.
    pub fn category(self, category: StatCategory) -> Self {
        self.filter(|p| p.has_category(category.prefix()))
    }

    /// Players with at least one touchdown of any kind.
    pub fn touchdowns(self) -> Self {
        self.filter(|p| p.touchdowns() > 0.0)
    }

    /// Stable sort on `field`; missing fields count as zero.
    pub fn sort_by_field(mut self, field: &str, descending: bool) -> Self {
        self.players.sort_by(|a, b| {
            let order = a.get(field).partial_cmp(&b.get(field)).unwrap_or(Ordering::Equal);
            if descending {
                order.reverse()
            } else {
                order
            }
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.players.truncate(n);
        self
    }

    /// First player whose feed name (`"T.Brady"`) equals `name`.
    pub fn name(&self, name: &str) -> Option<&StatAccumulator> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn player_id(&self, player_id: &str) -> Option<&StatAccumulator> {
        self.players.iter().find(|p| p.owner.id == player_id)
    }

    /// Field-wise sum over every player, e.g. a team's rushing total.
    pub fn sum_field(&self, field: &str) -> f64 {
        self.players.iter().map(|p| p.get(field)).sum()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StatAccumulator> {
        self.players.iter()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn into_vec(self) -> Vec<StatAccumulator> {
        self.players
    }
}

impl IntoIterator for PlayerStats {
    type Item = StatAccumulator;
    type IntoIter = std::vec::IntoIter<StatAccumulator>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.into_iter()
    }
}

impl<'a> IntoIterator for &'a PlayerStats {
    type Item = &'a StatAccumulator;
    type IntoIter = std::slice::Iter<'a, StatAccumulator>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.iter()
    }
}

impl EventSnapshot {
    /// The reconciled per-player totals, ordered by player id.
    pub fn player_stats(&self) -> PlayerStats {
        PlayerStats::new(self.entities.values().cloned().collect())
    }

    /// Per-player totals summed from the reconstructed plays only.
    pub fn play_stats(&self) -> Result<PlayerStats> {
        PlayerStats::from_drives(&self.drives)
    }

    /// The `n`th drive of the game, counting from 1. With `team`, the `n`th
    /// drive of that team.
    pub fn drive_number(&self, n: usize, team: Option<&str>) -> Option<&Drive> {
        let index = n.checked_sub(1)?;
        self.drives.iter().filter(|d| team.map_or(true, |t| d.team == t)).nth(index)
    }

    /// Plays of every drive matching `predicate`, in game order.
    pub fn plays_where<P>(&self, mut predicate: P) -> impl Iterator<Item = &Play>
    where
        P: FnMut(&Play) -> bool,
    {
        self.plays().filter(move |p| predicate(p))
    }
}

impl Drive {
    pub fn player_stats(&self) -> Result<PlayerStats> {
        PlayerStats::from_plays(&self.plays)
    }
}
