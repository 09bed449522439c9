/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

use std::time::Duration;
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

// simple Duration ctor wrappers so that callers don't depend on nightly Duration features
#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn secs_f64 (n: f64)->Duration { Duration::from_secs_f64(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }
#[inline] pub fn hours (n: u64)->Duration { Duration::from_secs(n * 3600) }

#[inline]
pub fn utc_now()->DateTime<Utc> {
    Utc::now()
}

/// parse an ISO-8601 instant (with offset) and convert into the given zone
pub fn parse_iso (s: &str, tz: Tz)->Option<DateTime<Tz>> {
    DateTime::parse_from_rfc3339( s.trim()).ok().map( |dt| dt.with_timezone(&tz))
}

/// the calendar day of an instant in the given zone. All daily bucketing uses
/// local days, never UTC dates
pub fn local_day<Z> (dt: &DateTime<Z>, tz: Tz)->NaiveDate where Z: TimeZone {
    dt.with_timezone(&tz).date_naive()
}

/// human day label, e.g. "Wed May 01"
pub fn day_label (day: NaiveDate)->String {
    day.format("%a %b %d").to_string()
}

/// compact date stamp used in artifact names and upstream paths, e.g. "20240501"
pub fn ymd_compact<Z> (dt: &DateTime<Z>)->String where Z: TimeZone, Z::Offset: std::fmt::Display {
    format!("{:04}{:02}{:02}", dt.year(), dt.month(), dt.day())
}

/// truncate an instant down to the containing 6 hour boundary (00/06/12/18z)
pub fn six_hour_floor (dt: &DateTime<Utc>)->DateTime<Utc> {
    let h = (dt.hour() / 6) * 6;
    Utc.with_ymd_and_hms( dt.year(), dt.month(), dt.day(), h, 0, 0).unwrap()
}
