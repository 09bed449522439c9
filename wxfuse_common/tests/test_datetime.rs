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

#![allow(unused)]

use chrono::{NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use wxfuse_common::datetime::{day_label, local_day, parse_iso, six_hour_floor, ymd_compact};

const NY: Tz = chrono_tz::America::New_York;

#[test]
fn test_parse_iso_converts_zone() {
    let dt = parse_iso( "2024-05-01T03:00:00+00:00", NY).unwrap();
    // 03z on May 1 is still Apr 30 local in the eastern zone
    assert_eq!( dt.date_naive(), NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
}

#[test]
fn test_local_day_is_not_utc_day() {
    let dt = Utc.with_ymd_and_hms(2024, 5, 1, 2, 30, 0).unwrap();
    assert_eq!( local_day(&dt, NY), NaiveDate::from_ymd_opt(2024, 4, 30).unwrap());
}

#[test]
fn test_day_label_format() {
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
    assert_eq!( day_label(day), "Wed May 01");
}

#[test]
fn test_six_hour_floor() {
    let dt = Utc.with_ymd_and_hms(2024, 5, 1, 17, 42, 9).unwrap();
    let floored = six_hour_floor(&dt);
    assert_eq!( floored.hour(), 12);
    assert_eq!( ymd_compact(&floored), "20240501");
}
