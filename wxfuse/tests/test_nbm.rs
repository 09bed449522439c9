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

/// GRIB index handling and unit conversion tests
/// run with "cargo test --test test_nbm -- --nocapture"

use wxfuse::ingest::decode::DecodedField;
use wxfuse::ingest::nbm::{convert_units, find_entry, kelvin_to_f, parse_index};

const INDEX_SAMPLE: &str = "\
1:0:d=2024050112:TMP:2 m above ground:24 hour fcst:
2:181424:d=2024050112:TMP:2 m above ground:24 hour fcst:std dev
3:312900:d=2024050112:TMAX:2 m above ground:12-24 hour max fcst:
4:470122:d=2024050112:POP12:surface:12-24 hour acc fcst:
5:550871:d=2024050112:APCP:surface:12-24 hour acc fcst:
";

#[test]
fn test_parse_index() {
    let entries = parse_index(INDEX_SAMPLE);
    assert_eq!( entries.len(), 5);
    assert_eq!( entries[0].number, 1);
    assert_eq!( entries[0].offset, 0);
    assert!( entries[1].key.contains("std dev"));
    assert_eq!( entries[4].offset, 550871);
}

#[test]
fn test_find_entry_skips_std_dev_and_ends_at_next_offset() {
    let entries = parse_index(INDEX_SAMPLE);

    // first non-"std dev" TMP record, range ends one byte before the next record
    let (start, end) = find_entry( &entries, ":TMP:").unwrap();
    assert_eq!( start, 0);
    assert_eq!( end, Some(181423));

    let (start, end) = find_entry( &entries, ":TMAX:").unwrap();
    assert_eq!( start, 312900);
    assert_eq!( end, Some(470121));

    // the last record is open ended
    let (start, end) = find_entry( &entries, ":APCP:").unwrap();
    assert_eq!( start, 550871);
    assert_eq!( end, None);

    assert!( find_entry( &entries, ":ASNOW:").is_none());
}

#[test]
fn test_index_tolerates_garbage_lines() {
    let entries = parse_index("not-an-index-line\n7:12:d=2024050112:TMIN:2 m above ground:\n");
    assert_eq!( entries.len(), 1);
    assert_eq!( entries[0].number, 7);
}

#[test]
fn test_unit_conversions() {
    assert!( (kelvin_to_f(273.15) - 32.0).abs() < 1e-9);
    assert!( (kelvin_to_f(373.15) - 212.0).abs() < 1e-9);

    assert!( (convert_units("TMP", 273.15) - 32.0).abs() < 1e-9);
    assert!( (convert_units("APCP", 1.0) - 0.0393701).abs() < 1e-9);
    assert!( (convert_units("ASNOW", 1.0) - 39.3701).abs() < 1e-9);
    assert_eq!( convert_units("POP12", 55.0), 55.0);
}

#[test]
fn test_nearest_value_skips_missing_cells() {
    let field = DecodedField::from_points( vec![
        (39.0, -77.0, f32::NAN),
        (39.5, -77.5, 290.0),
        (40.0, -78.0, 280.0),
    ]);
    assert_eq!( field.nearest_value(39.4, -77.4), Some(290.0));
    assert_eq!( field.nearest_value(40.1, -78.1), Some(280.0));
}

#[test]
fn test_nearest_value_wraps_longitude() {
    // grids published on [0, 360) still resolve for western-hemisphere queries
    let field = DecodedField::from_points( vec![
        (39.0, 282.5, 285.0),  // 282.5°E == -77.5°
        (39.0, 100.0, 300.0),
    ]);
    assert_eq!( field.nearest_value(39.0, -77.5), Some(285.0));
}
