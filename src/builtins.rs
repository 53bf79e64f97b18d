//! Built-in macros reserved from user redefinition.

use chrono::Local;

use crate::macros::MacroMap;

pub const FILE: &str = "FILE";
pub const LINE: &str = "LINE";
pub const DATE: &str = "DATE";
pub const TIME: &str = "TIME";
pub const TIMESTAMP: &str = "TIMESTAMP";

/// Sentinel stored for `LINE` so existence checks hold; the expansion value
/// is always computed from the cursor instead.
pub const LINE_SENTINEL: &str = "1";

/// Whether `name` (already normalized) is reserved.
pub fn is_builtin(name: &str) -> bool {
    matches!(name, FILE | LINE | DATE | TIME | TIMESTAMP)
}

/// The wall-clock strings bound to `DATE`, `TIME` and `TIMESTAMP`.
///
/// Computed once per run; the same strings are used for expansion and for
/// the reporting fields of the result.
#[derive(Debug, Clone)]
pub struct Timestamps {
    pub date: String,
    pub time: String,
    pub timestamp: String,
}

impl Timestamps {
    pub fn now() -> Timestamps {
        let now = Local::now();
        Timestamps {
            date: now.format("%b %d %Y").to_string(),
            time: now.format("%H:%M:%S").to_string(),
            timestamp: now.format("%a %b %d %H:%M:%S %Y").to_string(),
        }
    }
}

/// Overlay the built-in time macros onto a seeded store.
///
/// `FILE` and `LINE` are bound by the engine when it enters each source.
pub fn install(macros: &mut MacroMap, stamp: &Timestamps) {
    macros.bind(DATE, Some(stamp.date.clone()));
    macros.bind(TIME, Some(stamp.time.clone()));
    macros.bind(TIMESTAMP, Some(stamp.timestamp.clone()));
}
