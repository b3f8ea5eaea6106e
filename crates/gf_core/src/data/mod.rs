pub mod statmap;

pub use statmap::{
    yards_of, StandardStatMap, StatCategory, StatCode, StatExpander, StatValues, STAT_CODES,
};
