//! Raw payload -> `EventSnapshot`.
//!
//! Besides decoding, the parser repairs the feed defects seen in practice:
//! whole drives repeated under a new drive id, plays repeated under a new
//! play id, blank end-of-drive yard lines, and drive end quarters that lag
//! behind the plays they contain.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

use super::raw::{
    category_lines, team_block_fields, RawDrive, RawGame, RawPlay, RawPlayEvent, RawTeam,
    NEXT_UPDATE_KEY,
};
use crate::data::{yards_of, StandardStatMap, StatCategory, StatExpander};
use crate::error::{FeedError, Result};
use crate::models::{
    ClockPosition, Drive, EventSnapshot, FieldOffset, Phase, Play, PlayEvent, PossessionDuration,
    Scoreboard, ScoringPlay, StatAccumulator, StatOwner, TeamSummary, TEAM_ENTITY_ID,
};

/// Decodes a payload and extracts the record for `event_id`.
pub fn decode_payload(event_id: &str, payload: &[u8]) -> Result<RawGame> {
    if payload.iter().all(u8::is_ascii_whitespace) {
        return Err(FeedError::EmptyFeed);
    }
    let value: Value = serde_json::from_slice(payload)?;
    let Value::Object(mut events) = value else {
        return Err(FeedError::EmptyFeed);
    };
    events.remove(NEXT_UPDATE_KEY);
    if events.is_empty() {
        return Err(FeedError::EmptyFeed);
    }
    let game = events
        .remove(event_id)
        .ok_or_else(|| FeedError::UnknownEventId(event_id.to_string()))?;
    Ok(serde_json::from_value(game)?)
}

fn numeric_keys<T>(map: &BTreeMap<String, T>) -> Vec<(u32, &T)> {
    let mut keyed: Vec<(u32, &T)> =
        map.iter().filter_map(|(k, v)| k.trim().parse().ok().map(|id| (id, v))).collect();
    keyed.sort_by_key(|(id, _)| *id);
    keyed
}

/// Clock reading for `phase`; a blank clock means the period has run out.
fn clock_or_expired(phase: Phase, clock: &str) -> Result<ClockPosition> {
    if clock.trim().is_empty() {
        return Ok(ClockPosition::new(phase, 0, 0));
    }
    ClockPosition::with_phase(phase, clock)
}

fn optional_position(possessing: &str, yardline: &str) -> Result<Option<FieldOffset>> {
    if yardline.trim().is_empty() {
        return Ok(None);
    }
    FieldOffset::from_yardline(possessing, yardline).map(Some)
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[derive(Clone)]
pub struct SnapshotParser {
    expander: Arc<dyn StatExpander>,
}

impl Default for SnapshotParser {
    fn default() -> Self {
        Self::new(Arc::new(StandardStatMap))
    }
}

impl std::fmt::Debug for SnapshotParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotParser").finish_non_exhaustive()
    }
}

impl SnapshotParser {
    pub fn new(expander: Arc<dyn StatExpander>) -> Self {
        Self { expander }
    }

    pub fn parse(&self, event_id: &str, payload: &[u8]) -> Result<EventSnapshot> {
        let game = decode_payload(event_id, payload)?;
        self.build(event_id, &game)
    }

    pub fn build(&self, event_id: &str, game: &RawGame) -> Result<EventSnapshot> {
        let clock = ClockPosition::from_feed(&game.qtr, &game.clock)?;
        let home = team_summary(&game.home, true)?;
        let away = team_summary(&game.away, false)?;
        let drives = self.assemble_drives(&game.drives)?;

        let mut play_totals: BTreeMap<String, StatAccumulator> = BTreeMap::new();
        for play in drives.iter().flat_map(|d| d.plays.iter()) {
            for player in &play.players {
                let total = match play_totals.remove(&player.owner.id) {
                    Some(total) => total.add(player)?,
                    None => player.clone(),
                };
                play_totals.insert(player.owner.id.clone(), total);
            }
        }
        for total in play_totals.values_mut() {
            if !total.team.is_empty() {
                total.home = Some(total.team == home.abbr);
            }
        }

        let game_totals = game_level_totals(game);
        let entities = max_merge_totals(&play_totals, &game_totals)?;

        let scoring = numeric_keys(&game.scrsummary)
            .into_iter()
            .map(|(_, s)| ScoringPlay {
                team: s.team.clone(),
                kind: s.kind.clone(),
                quarter: s.qtr.clamp(0, 5) as u8,
                description: s.desc.clone(),
            })
            .collect();

        Ok(EventSnapshot {
            event_id: event_id.to_string(),
            home,
            away,
            clock,
            down: game.down.filter(|d| (1..=4).contains(d)).map(|d| d as u8),
            yards_togo: game.togo.filter(|t| *t >= 0).map(|t| t as u32),
            possession_team: non_empty(&game.posteam),
            red_zone: game.redzone,
            drives,
            scoring,
            play_totals,
            game_totals,
            entities,
        })
    }

    /// Builds drives in ascending drive-id order.
    ///
    /// A drive sharing any play id with an earlier drive is a repeat and is
    /// dropped whole; the first occurrence wins.
    fn assemble_drives(&self, records: &BTreeMap<String, Value>) -> Result<Vec<Drive>> {
        let mut seen_plays: HashSet<u32> = HashSet::new();
        let mut drives = Vec::new();

        for (drive_id, value) in numeric_keys(records) {
            let raw: RawDrive = serde_json::from_value(value.clone())?;
            let play_ids: Vec<u32> =
                numeric_keys(&raw.plays).into_iter().map(|(id, _)| id).collect();
            if let Some(repeat) = play_ids.iter().find(|id| seen_plays.contains(id)) {
                debug!(drive_id, play_id = repeat, "dropping drive that repeats an earlier drive");
                continue;
            }
            seen_plays.extend(play_ids);
            drives.push(self.build_drive(drive_id, &raw)?);
        }
        Ok(drives)
    }

    fn build_drive(&self, drive_id: u32, raw: &RawDrive) -> Result<Drive> {
        let team = raw.posteam.trim().to_string();
        let raw_plays = numeric_keys(&raw.plays);

        let mut emitted: HashSet<(&str, &str, &str, &str)> = HashSet::new();
        let mut plays = Vec::with_capacity(raw_plays.len());
        for (play_id, rp) in &raw_plays {
            let key = (rp.desc.as_str(), rp.time.as_str(), rp.yrdln.as_str(), rp.qtr.as_str());
            if !emitted.insert(key) {
                debug!(drive_id, play_id, "skipping duplicate play");
                continue;
            }
            plays.push(self.build_play(drive_id, *play_id, rp)?);
        }

        let start_time = match non_empty(&raw.start.qtr) {
            Some(qtr) => Some(clock_or_expired(Phase::from_feed(&qtr)?, &raw.start.time)?),
            None => None,
        };
        let start_position = optional_position(&team, &raw.start.yrdln)?;
        let end_position = Some(end_position(drive_id, &team, raw, &raw_plays)?);

        let mut end_time = match end_phase(raw, &raw_plays)? {
            Some(phase) => Some(clock_or_expired(phase, &raw.end.time)?),
            None => None,
        };
        // Known approximation: only drives that appear to end in Q1 or Q3 are
        // pushed forward, which can misplace drives spanning halftime or overtime.
        if let (Some(start), Some(end)) = (start_time, end_time) {
            if end <= start && matches!(end.phase(), Phase::Q1 | Phase::Q3) {
                let repaired = end.with_new_phase(end.phase().next_quarter());
                debug!(drive_id, from = %end, to = %repaired, "advancing drive end quarter");
                end_time = Some(repaired);
            }
        }

        Ok(Drive {
            drive_id,
            team,
            start_position,
            end_position,
            start_time,
            end_time,
            first_downs: raw.fds.max(0) as u32,
            penalty_yards: raw.penyds as i32,
            total_yards: raw.ydsgained as i32,
            possession: PossessionDuration::parse(&raw.postime)?,
            result: non_empty(&raw.result),
            red_zone: raw.redzone,
            plays,
        })
    }

    fn build_play(&self, drive_id: u32, play_id: u32, rp: &RawPlay) -> Result<Play> {
        let phase = Phase::from_feed(&rp.qtr)?;
        let clock = clock_or_expired(phase, &rp.time)?;
        let position = optional_position(&rp.posteam, &rp.yrdln)?;
        let team = rp.posteam.trim().to_string();

        let mut occurrences: Vec<(&str, &RawPlayEvent)> = rp
            .players
            .iter()
            .flat_map(|(entity, events)| events.iter().map(move |e| (entity.as_str(), e)))
            .collect();
        occurrences.sort_by_key(|(entity, e)| (e.sequence, *entity));

        let mut events = Vec::with_capacity(occurrences.len());
        let mut players: Vec<StatAccumulator> = Vec::new();
        let mut team_stats = StatAccumulator::new(StatOwner::team(team.as_str()), &team, &team);

        for (entity, raw_event) in occurrences {
            let stat_code = raw_event.stat_id.max(0) as u32;
            events.push(PlayEvent {
                sequence: raw_event.sequence.max(0) as u32,
                entity_id: entity.to_string(),
                team: raw_event.clubcode.clone(),
                player_name: non_empty(&raw_event.player_name),
                stat_code,
                yards: yards_of(&raw_event.yards),
            });

            let Some(values) = self.expander.expand(stat_code, &raw_event.yards) else {
                trace!(play_id, stat_code, "ignoring unknown stat code");
                continue;
            };

            if entity == TEAM_ENTITY_ID {
                team_stats.record_all(values.iter());
                continue;
            }
            let idx = match players.iter().position(|p| p.owner.id == entity) {
                Some(idx) => idx,
                None => {
                    players.push(StatAccumulator::new(
                        StatOwner::player(entity),
                        raw_event.player_name.clone(),
                        raw_event.clubcode.clone(),
                    ));
                    players.len() - 1
                }
            };
            players[idx].record_all(values.iter());
        }

        Ok(Play {
            play_id,
            drive_id,
            team,
            down: rp.down.clamp(0, 4) as u8,
            yards_togo: rp.ydstogo.max(0) as u32,
            description: rp.desc.clone(),
            note: non_empty(&rp.note),
            clock,
            position,
            events,
            players,
            team_stats,
        })
    }
}

/// The feed leaves the end yard line blank when a drive ends the game; fall
/// back to the last play that has one, then to midfield.
fn end_position(
    drive_id: u32,
    team: &str,
    raw: &RawDrive,
    raw_plays: &[(u32, &RawPlay)],
) -> Result<FieldOffset> {
    if let Some(line) = non_empty(&raw.end.yrdln) {
        return FieldOffset::from_yardline(team, &line);
    }
    match raw_plays.iter().rev().find_map(|(_, p)| non_empty(&p.yrdln)) {
        Some(line) => {
            debug!(drive_id, yardline = %line, "end yard line taken from last play");
            FieldOffset::from_yardline(team, &line)
        }
        None => {
            debug!(drive_id, "no yard line on any play, ending drive at midfield");
            Ok(FieldOffset::midfield())
        }
    }
}

/// The reported end quarter is unreliable across period boundaries; the
/// latest quarter among the drive's plays is used instead.
fn end_phase(raw: &RawDrive, raw_plays: &[(u32, &RawPlay)]) -> Result<Option<Phase>> {
    let mut latest: Option<Phase> = None;
    for (_, play) in raw_plays {
        if play.qtr.trim().is_empty() {
            continue;
        }
        let phase = Phase::from_feed(&play.qtr)?;
        latest = Some(latest.map_or(phase, |l| l.max(phase)));
    }
    match latest {
        Some(phase) => Ok(Some(phase)),
        None => match non_empty(&raw.end.qtr) {
            Some(qtr) => Phase::from_feed(&qtr).map(Some),
            None => Ok(None),
        },
    }
}

fn team_summary(raw: &RawTeam, home: bool) -> Result<TeamSummary> {
    let abbr = raw.abbr.trim().to_string();
    let mut score = Scoreboard { periods: [0; 5], total: raw.score_for("T") };
    for (i, period) in score.periods.iter_mut().enumerate() {
        *period = raw.score_for(&(i + 1).to_string());
    }

    let mut stats =
        StatAccumulator::new(StatOwner::team(abbr.as_str()), &abbr, &abbr).with_home(home);
    let mut time_of_possession = PossessionDuration::default();
    if let Some(block) = raw.stats.get(StatCategory::Team.prefix()) {
        let (fields, top) = team_block_fields(block);
        for (field, value) in fields {
            stats.set(field, value);
        }
        time_of_possession = PossessionDuration::parse(&top)?;
    }

    Ok(TeamSummary {
        abbr,
        score,
        timeouts: raw.to.filter(|t| *t >= 0).map(|t| t.min(u8::MAX as i64) as u8),
        stats,
        time_of_possession,
    })
}

/// Game-level per-player totals, named `<category>_<field>`.
fn game_level_totals(game: &RawGame) -> BTreeMap<String, StatAccumulator> {
    let mut totals: BTreeMap<String, StatAccumulator> = BTreeMap::new();
    for (team, home) in [(&game.home, true), (&game.away, false)] {
        let abbr = team.abbr.trim();
        for category in StatCategory::PLAYER_CATEGORIES {
            let Some(block) = team.stats.get(category.prefix()) else {
                continue;
            };
            for line in category_lines(block) {
                let owner = StatOwner::player(line.player_id.as_str());
                let acc = totals.entry(line.player_id.clone()).or_insert_with(|| {
                    StatAccumulator::new(owner, &line.name, abbr).with_home(home)
                });
                for (field, value) in line.fields {
                    acc.set(format!("{}_{}", category.prefix(), field), value);
                }
            }
        }
    }
    totals
}

fn max_merge_totals(
    play_totals: &BTreeMap<String, StatAccumulator>,
    game_totals: &BTreeMap<String, StatAccumulator>,
) -> Result<BTreeMap<String, StatAccumulator>> {
    let ids: BTreeSet<&String> = play_totals.keys().chain(game_totals.keys()).collect();
    let mut merged = BTreeMap::new();
    for id in ids {
        let entity = match (play_totals.get(id), game_totals.get(id)) {
            (Some(play), Some(game)) => {
                let mut m = play.max_merge(game)?;
                if !game.name.is_empty() {
                    m.name = game.name.clone();
                }
                m
            }
            (Some(only), None) | (None, Some(only)) => only.clone(),
            (None, None) => continue,
        };
        merged.insert(id.clone(), entity);
    }
    Ok(merged)
}
