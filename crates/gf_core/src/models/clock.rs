//! Game clock and possession time.
//!
//! `ClockPosition` is the only ordering the crate uses to place plays and
//! drives in time, and to tell whether a game has started or is over.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Add;

use crate::error::{FeedError, Result};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Pregame,
    Q1,
    Q2,
    Halftime,
    Q3,
    Q4,
    Overtime,
    Final,
}

impl Phase {
    /// Maps a feed quarter number (1..=5) to a phase.
    pub fn from_quarter(quarter: u8) -> Option<Self> {
        match quarter {
            1 => Some(Phase::Q1),
            2 => Some(Phase::Q2),
            3 => Some(Phase::Q3),
            4 => Some(Phase::Q4),
            5 => Some(Phase::Overtime),
            _ => None,
        }
    }

    /// Parses the feed's period marker (`"1"`, `"Halftime"`, `"final overtime"`, ...).
    pub fn from_feed(marker: &str) -> Result<Self> {
        let marker = marker.trim();
        if let Ok(q) = marker.parse::<u8>() {
            return Self::from_quarter(q)
                .ok_or_else(|| FeedError::MalformedClock(marker.to_string()));
        }
        match marker.to_ascii_lowercase().as_str() {
            "pregame" | "" => Ok(Phase::Pregame),
            "halftime" => Ok(Phase::Halftime),
            "final" | "final overtime" => Ok(Phase::Final),
            _ => Err(FeedError::MalformedClock(marker.to_string())),
        }
    }

    pub fn quarter(&self) -> Option<u8> {
        match self {
            Phase::Q1 => Some(1),
            Phase::Q2 => Some(2),
            Phase::Q3 => Some(3),
            Phase::Q4 => Some(4),
            Phase::Overtime => Some(5),
            _ => None,
        }
    }

    /// The next playing quarter (Q1 -> Q2, Q3 -> Q4). Non-quarter phases are unchanged.
    pub fn next_quarter(&self) -> Self {
        match self {
            Phase::Q1 => Phase::Q2,
            Phase::Q2 => Phase::Q3,
            Phase::Q3 => Phase::Q4,
            Phase::Q4 => Phase::Overtime,
            other => *other,
        }
    }

    /// Phases during which the game clock carries no meaning.
    pub fn is_clockless(&self) -> bool {
        matches!(self, Phase::Pregame | Phase::Halftime | Phase::Final)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Pregame => "Pregame",
            Phase::Q1 => "Q1",
            Phase::Q2 => "Q2",
            Phase::Halftime => "Halftime",
            Phase::Q3 => "Q3",
            Phase::Q4 => "Q4",
            Phase::Overtime => "OT",
            Phase::Final => "Final",
        };
        f.write_str(s)
    }
}

/// Parses `"MM:SS"` into seconds.
fn parse_clock(clock: &str) -> Result<u32> {
    let clock = clock.trim();
    let malformed = || FeedError::MalformedClock(clock.to_string());
    let (m, s) = clock.split_once(':').ok_or_else(malformed)?;
    let minutes: u32 = m.trim().parse().map_err(|_| malformed())?;
    let seconds: u32 = s.trim().parse().map_err(|_| malformed())?;
    if seconds >= 60 {
        return Err(malformed());
    }
    minutes.checked_mul(60).and_then(|m| m.checked_add(seconds)).ok_or_else(malformed)
}

/// A point in game time: a phase plus the time remaining in it.
///
/// Within one phase, less time remaining is later. Clockless phases
/// (pregame, halftime, final) always carry zero remaining time, so e.g. every
/// `Final` position compares equal and above everything else.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClockPosition {
    phase: Phase,
    remaining_secs: u32,
}

impl ClockPosition {
    /// Out-of-range readings saturate at `u32::MAX` seconds.
    pub fn new(phase: Phase, minutes: u32, seconds: u32) -> Self {
        let remaining_secs = if phase.is_clockless() {
            0
        } else {
            minutes.saturating_mul(60).saturating_add(seconds)
        };
        Self { phase, remaining_secs }
    }

    pub fn pregame() -> Self {
        Self::new(Phase::Pregame, 0, 0)
    }

    pub fn final_whistle() -> Self {
        Self::new(Phase::Final, 0, 0)
    }

    /// Builds a position from a feed period marker and a `"MM:SS"` clock.
    ///
    /// Clockless phases ignore the clock string entirely.
    pub fn from_feed(marker: &str, clock: &str) -> Result<Self> {
        let phase = Phase::from_feed(marker)?;
        Self::with_phase(phase, clock)
    }

    pub fn with_phase(phase: Phase, clock: &str) -> Result<Self> {
        if phase.is_clockless() {
            return Ok(Self::new(phase, 0, 0));
        }
        let secs = parse_clock(clock)?;
        Ok(Self::new(phase, secs / 60, secs % 60))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn minutes(&self) -> u32 {
        self.remaining_secs / 60
    }

    pub fn seconds(&self) -> u32 {
        self.remaining_secs % 60
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_final(&self) -> bool {
        self.phase == Phase::Final
    }

    pub fn is_pregame(&self) -> bool {
        self.phase == Phase::Pregame
    }

    /// Same clock reading, different phase.
    pub fn with_new_phase(&self, phase: Phase) -> Self {
        Self::new(phase, self.minutes(), self.seconds())
    }
}

impl Ord for ClockPosition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.phase
            .cmp(&other.phase)
            .then_with(|| other.remaining_secs.cmp(&self.remaining_secs))
    }
}

impl PartialOrd for ClockPosition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClockPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.phase.is_clockless() {
            write!(f, "{}", self.phase)
        } else {
            write!(f, "{} {:02}:{:02}", self.phase, self.minutes(), self.seconds())
        }
    }
}

/// Time of possession. Never negative.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PossessionDuration {
    secs: u32,
}

impl PossessionDuration {
    pub fn new(minutes: u32, seconds: u32) -> Self {
        Self { secs: minutes.saturating_mul(60).saturating_add(seconds) }
    }

    /// Parses the feed's `"M:SS"` possession time. A blank value is zero.
    pub fn parse(clock: &str) -> Result<Self> {
        if clock.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(Self { secs: parse_clock(clock)? })
    }

    pub fn minutes(&self) -> u32 {
        self.secs / 60
    }

    pub fn seconds(&self) -> u32 {
        self.secs % 60
    }

    pub fn total_secs(&self) -> u32 {
        self.secs
    }

    pub fn subtract(&self, other: &PossessionDuration) -> Result<PossessionDuration> {
        self.secs
            .checked_sub(other.secs)
            .map(|secs| PossessionDuration { secs })
            .ok_or(FeedError::NegativeDuration { minuend: self.secs, subtrahend: other.secs })
    }
}

impl Add for PossessionDuration {
    type Output = PossessionDuration;

    fn add(self, other: PossessionDuration) -> PossessionDuration {
        PossessionDuration { secs: self.secs.saturating_add(other.secs) }
    }
}

impl fmt::Display for PossessionDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes(), self.seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_quarter_is_greater() {
        let a = ClockPosition::from_feed("3", "10:00").unwrap();
        let b = ClockPosition::from_feed("4", "10:00").unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_less_remaining_is_later() {
        let a = ClockPosition::from_feed("2", "10:00").unwrap();
        let b = ClockPosition::from_feed("2", "02:13").unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_phase_total_order() {
        let order = [
            ClockPosition::pregame(),
            ClockPosition::from_feed("1", "00:01").unwrap(),
            ClockPosition::from_feed("2", "15:00").unwrap(),
            ClockPosition::from_feed("Halftime", "").unwrap(),
            ClockPosition::from_feed("3", "00:00").unwrap(),
            ClockPosition::from_feed("4", "14:59").unwrap(),
            ClockPosition::from_feed("5", "10:00").unwrap(),
            ClockPosition::final_whistle(),
        ];
        for pair in order.windows(2) {
            assert!(pair[0] < pair[1], "{} should precede {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_final_is_absorbing() {
        let a = ClockPosition::from_feed("Final", "00:00").unwrap();
        let b = ClockPosition::from_feed("final overtime", "03:12").unwrap();
        assert_eq!(a, b);
        assert!(a.is_final());
        assert!(a > ClockPosition::from_feed("5", "00:00").unwrap());
    }

    #[test]
    fn test_malformed_clock() {
        assert!(matches!(ClockPosition::from_feed("2", "ten"), Err(FeedError::MalformedClock(_))));
        for (marker, clock) in [("2", "10:75"), ("9", "10:00"), ("2", "")] {
            let result = ClockPosition::from_feed(marker, clock);
            assert!(matches!(result, Err(FeedError::MalformedClock(_))), "{marker} {clock}");
        }
        assert!(matches!(Phase::from_feed("Quarter"), Err(FeedError::MalformedClock(_))));
    }

    #[test]
    fn test_oversized_clock_is_malformed() {
        for clock in ["99999999:00", "71582789:00", "4294967295:59"] {
            let result = ClockPosition::from_feed("2", clock);
            assert!(matches!(result, Err(FeedError::MalformedClock(_))), "{clock}");
            assert!(matches!(PossessionDuration::parse(clock), Err(FeedError::MalformedClock(_))));
        }
        // Largest reading that still fits.
        let edge = ClockPosition::from_feed("2", "71582788:15").unwrap();
        assert_eq!(edge.remaining_secs(), u32::MAX);
    }

    #[test]
    fn test_constructors_saturate() {
        let clock = ClockPosition::new(Phase::Q2, u32::MAX, 59);
        assert_eq!(clock.remaining_secs(), u32::MAX);
        let long = PossessionDuration::new(u32::MAX, 0);
        assert_eq!((long + PossessionDuration::new(1, 0)).total_secs(), u32::MAX);
    }

    #[test]
    fn test_next_quarter() {
        assert_eq!(Phase::Q1.next_quarter(), Phase::Q2);
        assert_eq!(Phase::Q3.next_quarter(), Phase::Q4);
        assert_eq!(Phase::Final.next_quarter(), Phase::Final);
    }

    #[test]
    fn test_duration_arithmetic() {
        let a = PossessionDuration::parse("2:35").unwrap();
        let b = PossessionDuration::new(1, 40);
        assert_eq!((a + b).to_string(), "04:15");
        assert_eq!(a.subtract(&b).unwrap(), PossessionDuration::new(0, 55));
        assert!(matches!(b.subtract(&a), Err(FeedError::NegativeDuration { .. })));
        assert_eq!(PossessionDuration::parse("").unwrap(), PossessionDuration::default());
    }
}
