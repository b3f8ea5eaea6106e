//! Stat code table
//!
//! The feed reports every statistic inside a play as a numeric stat code plus
//! a raw yardage value. This table expands a code into named counter fields
//! (e.g. code 15 is a completed pass: `passing_att`, `passing_cmp` and
//! `passing_yds`).

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCategory {
    Passing,
    Rushing,
    Receiving,
    Fumbles,
    Kicking,
    Punting,
    KickReturn,
    PuntReturn,
    Defense,
    Penalty,
    /// Team-only counters (first downs, third-down conversions, timeouts).
    Team,
}

impl StatCategory {
    /// Field-name prefix used by the feed's per-player category blocks.
    pub fn prefix(&self) -> &'static str {
        match self {
            StatCategory::Passing => "passing",
            StatCategory::Rushing => "rushing",
            StatCategory::Receiving => "receiving",
            StatCategory::Fumbles => "fumbles",
            StatCategory::Kicking => "kicking",
            StatCategory::Punting => "punting",
            StatCategory::KickReturn => "kickret",
            StatCategory::PuntReturn => "puntret",
            StatCategory::Defense => "defense",
            StatCategory::Penalty => "penalty",
            StatCategory::Team => "team",
        }
    }

    /// Categories that carry per-player statistics in a game snapshot.
    pub const PLAYER_CATEGORIES: [StatCategory; 9] = [
        StatCategory::Passing,
        StatCategory::Rushing,
        StatCategory::Receiving,
        StatCategory::Fumbles,
        StatCategory::Kicking,
        StatCategory::Punting,
        StatCategory::KickReturn,
        StatCategory::PuntReturn,
        StatCategory::Defense,
    ];
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatCode {
    pub code: u32,
    pub category: StatCategory,
    /// Counters bumped by `value` on every occurrence.
    pub fields: &'static [&'static str],
    /// Field receiving the raw yardage, if the code carries yards.
    pub yards: Option<&'static str>,
    /// Credit per occurrence; 0.5 for split sacks.
    pub value: f64,
    pub desc: &'static str,
}

/// Expanded values of one stat occurrence, keyed by field name.
pub type StatValues = BTreeMap<String, f64>;

/// Seam through which the parser turns stat codes into named fields.
pub trait StatExpander: Send + Sync {
    /// `None` for codes the expander does not know.
    fn expand(&self, code: u32, raw_yards: &serde_json::Value) -> Option<StatValues>;
}

/// The built-in table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardStatMap;

impl StandardStatMap {
    pub fn lookup(code: u32) -> Option<&'static StatCode> {
        CODE_INDEX.get(&code).copied()
    }
}

impl StatExpander for StandardStatMap {
    fn expand(&self, code: u32, raw_yards: &serde_json::Value) -> Option<StatValues> {
        Self::lookup(code).map(|info| info.expand(yards_of(raw_yards)))
    }
}

impl StatCode {
    pub fn expand(&self, yards: i64) -> StatValues {
        let mut values = StatValues::new();
        if let Some(field) = self.yards {
            values.insert(field.to_string(), yards as f64);
        }
        for field in self.fields {
            values.insert(field.to_string(), self.value);
        }
        values
    }
}

/// Raw yards arrive as a number, a numeric string, or null. Anything
/// unparsable counts as zero.
pub fn yards_of(raw: &serde_json::Value) -> i64 {
    match raw {
        serde_json::Value::Number(n) => {
            n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0)
        }
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

static CODE_INDEX: Lazy<HashMap<u32, &'static StatCode>> =
    Lazy::new(|| STAT_CODES.iter().map(|c| (c.code, c)).collect());

#[rustfmt::skip]
pub static STAT_CODES: &[StatCode] = &[
    StatCode { code: 2, category: StatCategory::Punting, fields: &["punting_blk"], yards: None, value: 1.0, desc: "Punt blocked (offense)" },
    StatCode { code: 3, category: StatCategory::Team, fields: &["first_down", "rushing_first_down"], yards: None, value: 1.0, desc: "1st down (rushing)" },
    StatCode { code: 4, category: StatCategory::Team, fields: &["first_down", "passing_first_down"], yards: None, value: 1.0, desc: "1st down (passing)" },
    StatCode { code: 5, category: StatCategory::Team, fields: &["first_down", "penalty_first_down"], yards: None, value: 1.0, desc: "1st down (penalty)" },
    StatCode { code: 6, category: StatCategory::Team, fields: &["third_down_att", "third_down_conv"], yards: None, value: 1.0, desc: "3rd down attempt converted" },
    StatCode { code: 7, category: StatCategory::Team, fields: &["third_down_att", "third_down_failed"], yards: None, value: 1.0, desc: "3rd down attempt failed" },
    StatCode { code: 8, category: StatCategory::Team, fields: &["fourth_down_att", "fourth_down_conv"], yards: None, value: 1.0, desc: "4th down attempt converted" },
    StatCode { code: 9, category: StatCategory::Team, fields: &["fourth_down_att", "fourth_down_failed"], yards: None, value: 1.0, desc: "4th down attempt failed" },
    StatCode { code: 10, category: StatCategory::Rushing, fields: &["rushing_att"], yards: Some("rushing_yds"), value: 1.0, desc: "Rushing yards" },
    StatCode { code: 11, category: StatCategory::Rushing, fields: &["rushing_att", "rushing_tds"], yards: Some("rushing_yds"), value: 1.0, desc: "Rushing yards, TD" },
    StatCode { code: 12, category: StatCategory::Rushing, fields: &[], yards: Some("rushing_yds"), value: 1.0, desc: "Rushing yards, No rush" },
    StatCode { code: 13, category: StatCategory::Rushing, fields: &["rushing_tds"], yards: Some("rushing_yds"), value: 1.0, desc: "Rushing yards, TD, No rush" },
    StatCode { code: 14, category: StatCategory::Passing, fields: &["passing_att", "passing_incmp"], yards: None, value: 1.0, desc: "Pass incomplete" },
    StatCode { code: 15, category: StatCategory::Passing, fields: &["passing_att", "passing_cmp"], yards: Some("passing_yds"), value: 1.0, desc: "Passing yards" },
    StatCode { code: 16, category: StatCategory::Passing, fields: &["passing_att", "passing_cmp", "passing_tds"], yards: Some("passing_yds"), value: 1.0, desc: "Passing yards, TD" },
    StatCode { code: 19, category: StatCategory::Passing, fields: &["passing_att", "passing_incmp", "passing_int"], yards: None, value: 1.0, desc: "Interception (by passer)" },
    StatCode { code: 20, category: StatCategory::Passing, fields: &["passing_sk"], yards: Some("passing_sk_yds"), value: 1.0, desc: "Sack yards (offense)" },
    StatCode { code: 21, category: StatCategory::Receiving, fields: &["receiving_rec"], yards: Some("receiving_yds"), value: 1.0, desc: "Pass reception yards" },
    StatCode { code: 22, category: StatCategory::Receiving, fields: &["receiving_rec", "receiving_tds"], yards: Some("receiving_yds"), value: 1.0, desc: "Pass reception yards, TD" },
    StatCode { code: 23, category: StatCategory::Receiving, fields: &[], yards: Some("receiving_yds"), value: 1.0, desc: "Pass reception yards, No reception" },
    StatCode { code: 24, category: StatCategory::Receiving, fields: &["receiving_tds"], yards: Some("receiving_yds"), value: 1.0, desc: "Pass reception yards, TD, No reception" },
    StatCode { code: 25, category: StatCategory::Defense, fields: &["defense_int"], yards: Some("defense_int_yds"), value: 1.0, desc: "Interception yards" },
    StatCode { code: 26, category: StatCategory::Defense, fields: &["defense_int", "defense_tds", "defense_int_tds"], yards: Some("defense_int_yds"), value: 1.0, desc: "Interception yards, TD" },
    StatCode { code: 27, category: StatCategory::Defense, fields: &[], yards: Some("defense_int_yds"), value: 1.0, desc: "Interception yards, No interception" },
    StatCode { code: 28, category: StatCategory::Defense, fields: &["defense_tds", "defense_int_tds"], yards: Some("defense_int_yds"), value: 1.0, desc: "Interception yards, TD, No interception" },
    StatCode { code: 29, category: StatCategory::Punting, fields: &["punting_tot"], yards: Some("punting_yds"), value: 1.0, desc: "Punting yards" },
    StatCode { code: 30, category: StatCategory::Punting, fields: &["punting_i20"], yards: None, value: 1.0, desc: "Punt inside 20" },
    StatCode { code: 31, category: StatCategory::Punting, fields: &["punting_tot"], yards: Some("punting_yds"), value: 1.0, desc: "Punt into endzone" },
    StatCode { code: 32, category: StatCategory::Punting, fields: &["punting_tot", "punting_touchback"], yards: Some("punting_yds"), value: 1.0, desc: "Punt with touchback" },
    StatCode { code: 33, category: StatCategory::PuntReturn, fields: &["puntret_tot"], yards: Some("puntret_yds"), value: 1.0, desc: "Punt return yards" },
    StatCode { code: 34, category: StatCategory::PuntReturn, fields: &["puntret_tot", "puntret_tds"], yards: Some("puntret_yds"), value: 1.0, desc: "Punt return yards, TD" },
    StatCode { code: 35, category: StatCategory::PuntReturn, fields: &[], yards: Some("puntret_yds"), value: 1.0, desc: "Punt return yards, No return" },
    StatCode { code: 36, category: StatCategory::PuntReturn, fields: &["puntret_tds"], yards: Some("puntret_yds"), value: 1.0, desc: "Punt return yards, TD, No return" },
    StatCode { code: 37, category: StatCategory::Team, fields: &["puntret_oob"], yards: None, value: 1.0, desc: "Punt out of bounds" },
    StatCode { code: 38, category: StatCategory::Team, fields: &["puntret_downed"], yards: None, value: 1.0, desc: "Punt downed (no return)" },
    StatCode { code: 39, category: StatCategory::PuntReturn, fields: &["puntret_fair"], yards: None, value: 1.0, desc: "Punt - fair catch" },
    StatCode { code: 40, category: StatCategory::Team, fields: &["puntret_touchback"], yards: None, value: 1.0, desc: "Punt - touchback (no return)" },
    StatCode { code: 41, category: StatCategory::Kicking, fields: &["kicking_tot"], yards: Some("kicking_yds"), value: 1.0, desc: "Kickoff yards" },
    StatCode { code: 42, category: StatCategory::Kicking, fields: &["kicking_i20"], yards: None, value: 1.0, desc: "Kickoff inside 20" },
    StatCode { code: 43, category: StatCategory::Kicking, fields: &["kicking_tot"], yards: Some("kicking_yds"), value: 1.0, desc: "Kickoff into endzone" },
    StatCode { code: 44, category: StatCategory::Kicking, fields: &["kicking_tot", "kicking_touchback"], yards: Some("kicking_yds"), value: 1.0, desc: "Kickoff with touchback" },
    StatCode { code: 45, category: StatCategory::KickReturn, fields: &["kickret_ret"], yards: Some("kickret_yds"), value: 1.0, desc: "Kickoff return yards" },
    StatCode { code: 46, category: StatCategory::KickReturn, fields: &["kickret_ret", "kickret_tds"], yards: Some("kickret_yds"), value: 1.0, desc: "Kickoff return yards, TD" },
    StatCode { code: 47, category: StatCategory::KickReturn, fields: &[], yards: Some("kickret_yds"), value: 1.0, desc: "Kickoff return yards, No return" },
    StatCode { code: 48, category: StatCategory::KickReturn, fields: &["kickret_tds"], yards: Some("kickret_yds"), value: 1.0, desc: "Kickoff return yards, TD, No return" },
    StatCode { code: 49, category: StatCategory::Team, fields: &["kickret_oob"], yards: None, value: 1.0, desc: "Kickoff out of bounds" },
    StatCode { code: 50, category: StatCategory::KickReturn, fields: &["kickret_fair"], yards: None, value: 1.0, desc: "Kickoff - fair catch" },
    StatCode { code: 51, category: StatCategory::Team, fields: &["kickret_touchback"], yards: None, value: 1.0, desc: "Kickoff - touchback" },
    StatCode { code: 52, category: StatCategory::Fumbles, fields: &["fumbles_tot", "fumbles_forced"], yards: None, value: 1.0, desc: "Fumble - forced" },
    StatCode { code: 53, category: StatCategory::Fumbles, fields: &["fumbles_tot", "fumbles_notforced"], yards: None, value: 1.0, desc: "Fumble - not forced" },
    StatCode { code: 54, category: StatCategory::Fumbles, fields: &["fumbles_oob"], yards: None, value: 1.0, desc: "Fumble - out of bounds" },
    StatCode { code: 55, category: StatCategory::Fumbles, fields: &["fumbles_rec"], yards: Some("fumbles_rec_yds"), value: 1.0, desc: "Own recovery yards" },
    StatCode { code: 56, category: StatCategory::Fumbles, fields: &["fumbles_rec", "fumbles_rec_tds"], yards: Some("fumbles_rec_yds"), value: 1.0, desc: "Own recovery yards, TD" },
    StatCode { code: 57, category: StatCategory::Fumbles, fields: &[], yards: Some("fumbles_rec_yds"), value: 1.0, desc: "Own recovery yards, No recovery" },
    StatCode { code: 58, category: StatCategory::Fumbles, fields: &["fumbles_rec_tds"], yards: Some("fumbles_rec_yds"), value: 1.0, desc: "Own recovery yards, TD, No recovery" },
    StatCode { code: 59, category: StatCategory::Defense, fields: &["defense_frec"], yards: Some("defense_frec_yds"), value: 1.0, desc: "Opponent recovery yards" },
    StatCode { code: 60, category: StatCategory::Defense, fields: &["defense_frec", "defense_tds", "defense_frec_tds"], yards: Some("defense_frec_yds"), value: 1.0, desc: "Opponent recovery yards, TD" },
    StatCode { code: 61, category: StatCategory::Defense, fields: &[], yards: Some("defense_frec_yds"), value: 1.0, desc: "Opponent recovery yards, No recovery" },
    StatCode { code: 62, category: StatCategory::Defense, fields: &["defense_tds", "defense_frec_tds"], yards: Some("defense_frec_yds"), value: 1.0, desc: "Opponent recovery yards, TD, No recovery" },
    StatCode { code: 63, category: StatCategory::Defense, fields: &[], yards: Some("defense_misc_yds"), value: 1.0, desc: "Miscellaneous yards" },
    StatCode { code: 64, category: StatCategory::Defense, fields: &["defense_tds", "defense_misc_tds"], yards: Some("defense_misc_yds"), value: 1.0, desc: "Miscellaneous yards, TD" },
    StatCode { code: 68, category: StatCategory::Team, fields: &["timeout"], yards: None, value: 1.0, desc: "Timeout" },
    StatCode { code: 69, category: StatCategory::Kicking, fields: &["kicking_fga", "kicking_fgmissed"], yards: Some("kicking_fgmissed_yds"), value: 1.0, desc: "Field goal missed yards" },
    StatCode { code: 70, category: StatCategory::Kicking, fields: &["kicking_fga", "kicking_fgm"], yards: Some("kicking_fgm_yds"), value: 1.0, desc: "Field goal yards" },
    StatCode { code: 71, category: StatCategory::Kicking, fields: &["kicking_fga", "kicking_fgmissed", "kicking_fgb"], yards: Some("kicking_fgmissed_yds"), value: 1.0, desc: "Field goal blocked (offense)" },
    StatCode { code: 72, category: StatCategory::Kicking, fields: &["kicking_xpa", "kicking_xpmade"], yards: None, value: 1.0, desc: "Extra point - good" },
    StatCode { code: 73, category: StatCategory::Kicking, fields: &["kicking_xpa", "kicking_xpmissed"], yards: None, value: 1.0, desc: "Extra point - failed" },
    StatCode { code: 74, category: StatCategory::Kicking, fields: &["kicking_xpa", "kicking_xpmissed", "kicking_xpb"], yards: None, value: 1.0, desc: "Extra point - blocked" },
    StatCode { code: 75, category: StatCategory::Rushing, fields: &["rushing_twopta", "rushing_twoptm"], yards: None, value: 1.0, desc: "2 point rush - good" },
    StatCode { code: 76, category: StatCategory::Rushing, fields: &["rushing_twopta", "rushing_twoptmissed"], yards: None, value: 1.0, desc: "2 point rush - failed" },
    StatCode { code: 77, category: StatCategory::Passing, fields: &["passing_twopta", "passing_twoptm"], yards: None, value: 1.0, desc: "2 point pass - good" },
    StatCode { code: 78, category: StatCategory::Passing, fields: &["passing_twopta", "passing_twoptmissed"], yards: None, value: 1.0, desc: "2 point pass - failed" },
    StatCode { code: 79, category: StatCategory::Defense, fields: &["defense_tkl"], yards: None, value: 1.0, desc: "Solo tackle" },
    StatCode { code: 80, category: StatCategory::Defense, fields: &["defense_tkl", "defense_tkl_primary"], yards: None, value: 1.0, desc: "Assisted tackle" },
    StatCode { code: 82, category: StatCategory::Defense, fields: &["defense_ast"], yards: None, value: 1.0, desc: "Tackle assist" },
    StatCode { code: 83, category: StatCategory::Defense, fields: &["defense_sk"], yards: Some("defense_sk_yds"), value: 1.0, desc: "Sack yards (defense)" },
    StatCode { code: 84, category: StatCategory::Defense, fields: &["defense_sk"], yards: Some("defense_sk_yds"), value: 0.5, desc: "1/2 sack yards (defense)" },
    StatCode { code: 85, category: StatCategory::Defense, fields: &["defense_pass_def"], yards: None, value: 1.0, desc: "Pass defensed" },
    StatCode { code: 86, category: StatCategory::Defense, fields: &["defense_puntblk"], yards: None, value: 1.0, desc: "Punt blocked (defense)" },
    StatCode { code: 87, category: StatCategory::Defense, fields: &["defense_xpblk"], yards: None, value: 1.0, desc: "Extra point blocked (defense)" },
    StatCode { code: 88, category: StatCategory::Defense, fields: &["defense_fgblk"], yards: None, value: 1.0, desc: "Field goal blocked (defense)" },
    StatCode { code: 89, category: StatCategory::Defense, fields: &["defense_safe"], yards: None, value: 1.0, desc: "Safety (defense)" },
    StatCode { code: 91, category: StatCategory::Defense, fields: &["defense_ffum"], yards: None, value: 1.0, desc: "Forced fumble (defense)" },
    StatCode { code: 93, category: StatCategory::Penalty, fields: &["penalty"], yards: Some("penalty_yds"), value: 1.0, desc: "Penalty" },
    StatCode { code: 95, category: StatCategory::Team, fields: &["rushing_loss"], yards: Some("rushing_loss_yds"), value: 1.0, desc: "Tackled for a loss" },
    StatCode { code: 102, category: StatCategory::Team, fields: &["kicking_downed"], yards: None, value: 1.0, desc: "Kickoff - kick downed" },
    StatCode { code: 103, category: StatCategory::Passing, fields: &[], yards: Some("passing_sk_yds"), value: 1.0, desc: "Sack yards (offense), No sack" },
    StatCode { code: 104, category: StatCategory::Receiving, fields: &["receiving_twopta", "receiving_twoptm"], yards: None, value: 1.0, desc: "2 point pass reception - good" },
    StatCode { code: 105, category: StatCategory::Receiving, fields: &["receiving_twopta", "receiving_twoptmissed"], yards: None, value: 1.0, desc: "2 point pass reception - failed" },
    StatCode { code: 106, category: StatCategory::Fumbles, fields: &["fumbles_lost"], yards: None, value: 1.0, desc: "Fumble - lost" },
    StatCode { code: 107, category: StatCategory::Kicking, fields: &["kicking_rec"], yards: None, value: 1.0, desc: "Own kickoff recovery" },
    StatCode { code: 108, category: StatCategory::Kicking, fields: &["kicking_rec", "kicking_rec_tds"], yards: None, value: 1.0, desc: "Own kickoff recovery, TD" },
    StatCode { code: 110, category: StatCategory::Defense, fields: &["defense_qbhit"], yards: None, value: 1.0, desc: "Quarterback hit" },
    StatCode { code: 111, category: StatCategory::Passing, fields: &[], yards: Some("passing_cmp_air_yds"), value: 1.0, desc: "Pass length, completion" },
    StatCode { code: 112, category: StatCategory::Passing, fields: &[], yards: Some("passing_incmp_air_yds"), value: 1.0, desc: "Pass length, No completion" },
    StatCode { code: 113, category: StatCategory::Receiving, fields: &[], yards: Some("receiving_yac_yds"), value: 1.0, desc: "Yardage gained after the catch" },
    StatCode { code: 115, category: StatCategory::Receiving, fields: &["receiving_tar"], yards: None, value: 1.0, desc: "Pass target" },
    StatCode { code: 120, category: StatCategory::Defense, fields: &["defense_tkl_loss"], yards: None, value: 1.0, desc: "Tackle for a loss" },
    StatCode { code: 301, category: StatCategory::Team, fields: &["xp_aborted"], yards: None, value: 1.0, desc: "Extra point - aborted" },
    StatCode { code: 402, category: StatCategory::Defense, fields: &[], yards: Some("defense_tkl_loss_yds"), value: 1.0, desc: "Tackle for a loss yards" },
    StatCode { code: 410, category: StatCategory::Kicking, fields: &[], yards: Some("kicking_all_yds"), value: 1.0, desc: "Kickoff and length of kick" },
];
