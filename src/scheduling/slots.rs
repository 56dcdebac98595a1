//! Candidate timeslot calendar. Timeslots are generated values, not
//! persisted entities: business days over a horizon, four fixed daily
//! slots (two morning, two afternoon).

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

/// Fixed daily start times: 08:30, 10:45, 14:00, 16:15.
pub const SLOT_TIMES: [(u32, u32); 4] = [(8, 30), (10, 45), (14, 0), (16, 15)];

/// All candidate (date, start-time) values from the day after `from` up to
/// `days_ahead` days out, weekends excluded, ascending.
pub fn candidate_timeslots(from: NaiveDate, days_ahead: u32) -> Vec<NaiveDateTime> {
    let mut out = Vec::new();
    for offset in 1..=i64::from(days_ahead) {
        let date = from + Duration::days(offset);
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        for (h, m) in SLOT_TIMES {
            let Some(dt) = date.and_hms_opt(h, m, 0) else {
                continue;
            };
            out.push(dt);
        }
    }
    out
}
