use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FeedError, Result};

/// Yardage relative to midfield from the possessing team's point of view.
///
/// `-50` is the possessing team's own goal line, `0` is midfield and `50` is
/// the opponent's goal line. Every constructor clamps into that range.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FieldOffset(i8);

impl FieldOffset {
    pub const MIN: i8 = -50;
    pub const MAX: i8 = 50;

    pub fn midfield() -> Self {
        FieldOffset(0)
    }

    pub fn new(offset: i32) -> Self {
        FieldOffset(offset.clamp(Self::MIN as i32, Self::MAX as i32) as i8)
    }

    /// Parses a feed yard line such as `"NE 20"` or `"50"`.
    ///
    /// A yard line on the possessing team's side of the field is negative.
    pub fn from_yardline(possessing: &str, yardline: &str) -> Result<Self> {
        let yardline = yardline.trim();
        if yardline == "50" {
            return Ok(Self::midfield());
        }

        let malformed = || FeedError::MalformedPosition(yardline.to_string());
        let (team, yards) = yardline.split_once(' ').ok_or_else(malformed)?;
        let yards: i32 = yards.trim().parse().map_err(|_| malformed())?;
        if team.is_empty() || !(0..=50).contains(&yards) {
            return Err(malformed());
        }

        let offset = 50 - yards;
        if team == possessing.trim() {
            Ok(Self::new(-offset))
        } else {
            Ok(Self::new(offset))
        }
    }

    pub fn offset(&self) -> i8 {
        self.0
    }

    pub fn add(&self, yards: i32) -> Self {
        Self::new(self.0 as i32 + yards)
    }

    pub fn is_own_territory(&self) -> bool {
        self.0 < 0
    }

    /// Formats back into the feed's `"TEAM NN"` notation.
    ///
    /// Midfield is always written `"50"`, so `"NE 50"` does not survive a
    /// parse and format; goal lines come back as `"TEAM 0"`.
    pub fn to_yardline(&self, possessing: &str, defending: &str) -> String {
        match self.0 {
            0 => "50".to_string(),
            o if o < 0 => format!("{} {}", possessing, 50 + o as i32),
            o => format!("{} {}", defending, 50 - o as i32),
        }
    }
}

impl fmt::Display for FieldOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "MIDFIELD"),
            o if o < 0 => write!(f, "OWN {}", 50 + o as i32),
            o => write!(f, "OPP {}", 50 - o as i32),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_own_territory_is_negative() {
        let pos = FieldOffset::from_yardline("NE", "NE 20").unwrap();
        assert_eq!(pos.offset(), -30);
        assert!(pos.is_own_territory());
        assert_eq!(pos.to_string(), "OWN 20");
    }

    #[test]
    fn test_opponent_territory_is_positive() {
        let pos = FieldOffset::from_yardline("NE", "NYJ 20").unwrap();
        assert_eq!(pos.offset(), 30);
        assert_eq!(pos.to_string(), "OPP 20");
    }

    #[test]
    fn test_midfield() {
        assert_eq!(FieldOffset::from_yardline("NE", "50").unwrap(), FieldOffset::midfield());
        assert_eq!(FieldOffset::midfield().to_string(), "MIDFIELD");
    }

    #[test]
    fn test_malformed_yardlines() {
        for bad in ["", "NE", "NE abc", "NE 61", " 20"] {
            assert!(
                matches!(
                    FieldOffset::from_yardline("NE", bad),
                    Err(FeedError::MalformedPosition(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_add_clamps() {
        let pos = FieldOffset::new(45);
        assert_eq!(pos.add(20).offset(), 50);
        assert_eq!(pos.add(-200).offset(), -50);
        assert_eq!(FieldOffset::new(127).offset(), 50);
    }

    #[test]
    fn test_yardline_edges() {
        let midfield = FieldOffset::from_yardline("NE", "NE 50").unwrap();
        assert_eq!(midfield, FieldOffset::midfield());
        assert_eq!(midfield.to_yardline("NE", "NYJ"), "50");

        let own_goal = FieldOffset::from_yardline("NE", "NE 0").unwrap();
        assert_eq!(own_goal.offset(), FieldOffset::MIN);
        assert_eq!(own_goal.to_yardline("NE", "NYJ"), "NE 0");

        let opp_goal = FieldOffset::from_yardline("NE", "NYJ 0").unwrap();
        assert_eq!(opp_goal.offset(), FieldOffset::MAX);
        assert_eq!(opp_goal.to_yardline("NE", "NYJ"), "NYJ 0");
    }

    proptest! {
        #[test]
        fn test_yardline_roundtrip(own in any::<bool>(), yards in 0i32..=49) {
            let team = if own { "NE" } else { "NYJ" };
            let line = format!("{team} {yards}");
            let pos = FieldOffset::from_yardline("NE", &line).unwrap();
            prop_assert_eq!(pos.to_yardline("NE", "NYJ"), line);
        }

        #[test]
        fn test_offset_always_in_range(start in -50i32..=50, delta in -500i32..=500) {
            let pos = FieldOffset::new(start).add(delta);
            prop_assert!((FieldOffset::MIN..=FieldOffset::MAX).contains(&pos.offset()));
        }
    }
}
