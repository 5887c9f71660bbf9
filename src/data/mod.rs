//! Roster data: CSV loading and the single-entry session cache.

pub mod cache;
pub mod roster;

pub use cache::{CachedRoster, RosterCache};
pub use roster::{
    load_roster, load_roster_with_report, parse_roster, parse_roster_with_report, EmployeeRecord,
    LoadError, LoadReport, Roster, DISPLAY_COLUMNS,
};
