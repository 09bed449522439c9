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

/// reducer tests
/// run with "cargo test --test test_ensemble -- --nocapture"

use chrono::NaiveDate;
use wxfuse::ensemble::build_site_ensembles;
use wxfuse::models::{Site, SourceDailyRecord, SRC_GRIDPOINT, SRC_NBM, SRC_RSS};

fn day ()->NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
}

fn make_record (source: &'static str, high: Option<f64>, low: Option<f64>, pop: Option<f64>,
                precip: Option<&str>, notes: &str)->SourceDailyRecord {
    let site = Site::new( "Home", 39.3, -77.7);
    let mut rec = SourceDailyRecord::new( &site, day(), source);
    rec.high_f = high;
    rec.low_f = low;
    rec.pop_pct = pop;
    rec.precip_type = precip.map( |p| p.to_string());
    rec.precip_notes = notes.to_string();
    rec.wind_phrase = if notes.is_empty() { None } else { Some( notes.to_string()) };
    rec
}

#[test]
fn test_merges_sources() {
    let recs = vec![
        make_record( SRC_NBM, Some(82.0), Some(60.0), Some(40.0), Some("Rain"), ""),
        make_record( SRC_RSS, Some(84.0), Some(59.0), Some(60.0), Some("Snow"), "Breezy north winds"),
    ];
    let rows = build_site_ensembles( "Home", recs, 1);
    assert_eq!( rows.len(), 1);

    let row = &rows[0];
    assert_eq!( row.high_f, Some(83.0));
    assert_eq!( row.low_f, Some(59.5));
    assert_eq!( row.pop_pct, Some(60.0));
    assert_eq!( row.heat_category, Some("Caution"));
    assert_eq!( row.precip_type.as_deref(), Some("Snow")); // priority beats Rain
    assert_eq!( row.freeze_risk_badge, None);
    assert!( !row.low_confidence);
    assert_eq!( row.sources, vec![SRC_NBM, SRC_RSS]);
    assert_eq!( row.sources_count, 2);
    assert_eq!( row.label, "Wed May 01");
}

#[test]
fn test_skips_day_without_temperatures() {
    let recs = vec![ make_record( SRC_NBM, None, None, None, None, "")];
    let rows = build_site_ensembles( "Home", recs, 1);
    assert!( rows.is_empty());
}

#[test]
fn test_drops_poisoned_low() {
    let recs = vec![ make_record( SRC_NBM, Some(70.0), Some(80.0), None, None, "")];
    let rows = build_site_ensembles( "Home", recs, 1);
    assert_eq!( rows[0].high_f, Some(70.0));
    assert_eq!( rows[0].low_f, None);
}

#[test]
fn test_sanitizes_out_of_range_temperatures() {
    let recs = vec![
        make_record( SRC_NBM, Some(500.0), Some(-120.0), None, None, ""),
        make_record( SRC_RSS, Some(75.0), Some(50.0), None, None, ""),
    ];
    let rows = build_site_ensembles( "Home", recs, 1);
    assert_eq!( rows[0].high_f, Some(75.0));
    assert_eq!( rows[0].low_f, Some(50.0));
}

#[test]
fn test_duplicate_records_do_not_change_output() {
    let base = vec![
        make_record( SRC_NBM, Some(82.0), Some(60.0), Some(40.0), Some("Rain"), ""),
        make_record( SRC_RSS, Some(84.0), Some(58.0), Some(60.0), None, ""),
    ];
    let mut doubled = base.clone();
    doubled.extend( base.clone());

    let once = build_site_ensembles( "Home", base, 1);
    let twice = build_site_ensembles( "Home", doubled, 1);

    assert_eq!( once[0].high_f, twice[0].high_f);
    assert_eq!( once[0].low_f, twice[0].low_f);
    assert_eq!( once[0].pop_pct, twice[0].pop_pct);
    assert_eq!( once[0].sources, twice[0].sources);
    assert_eq!( once[0].sources_count, twice[0].sources_count);
}

#[test]
fn test_record_order_does_not_change_numerics() {
    let a = make_record( SRC_NBM, Some(82.0), Some(60.0), Some(40.0), Some("Rain"), "");
    let b = make_record( SRC_RSS, Some(84.0), Some(58.0), Some(60.0), Some("Sleet"), "");
    let c = make_record( SRC_GRIDPOINT, Some(80.0), Some(55.0), Some(10.0), None, "");

    let fwd = build_site_ensembles( "Home", vec![a.clone(), b.clone(), c.clone()], 1);
    let rev = build_site_ensembles( "Home", vec![c, b, a], 1);

    assert_eq!( fwd[0].high_f, rev[0].high_f);
    assert_eq!( fwd[0].low_f, rev[0].low_f);
    assert_eq!( fwd[0].pop_pct, rev[0].pop_pct);
    assert_eq!( fwd[0].precip_type, rev[0].precip_type); // a priority label is present
    assert_eq!( fwd[0].sources, rev[0].sources);
}

#[test]
fn test_pop_stays_in_range() {
    let recs = vec![
        make_record( SRC_NBM, Some(82.0), None, Some(100.0), None, ""),
        make_record( SRC_RSS, Some(84.0), None, Some(0.0), None, ""),
    ];
    let rows = build_site_ensembles( "Home", recs, 1);
    let pop = rows[0].pop_pct.unwrap();
    assert!( (0.0..=100.0).contains(&pop));
    assert_eq!( pop, 100.0);
}

#[test]
fn test_wind_signal_extends_freeze_guidance() {
    let recs = vec![
        make_record( SRC_NBM, Some(40.0), Some(27.0), None, None, "Breezy tonight"),
    ];
    let rows = build_site_ensembles( "Home", recs, 1);
    assert_eq!( rows[0].freeze_risk_badge, Some("Hard Freeze"));
    assert!( rows[0].freeze_guidance.as_deref().unwrap().contains("Wind-chill"));
}

#[test]
fn test_single_source_is_low_confidence() {
    let recs = vec![ make_record( SRC_NBM, Some(82.0), Some(60.0), None, None, "")];
    let rows = build_site_ensembles( "Home", recs, 1);
    assert!( rows[0].low_confidence);
    assert_eq!( rows[0].sources_count, 1);
}

#[test]
fn test_precip_notes_joined_unique() {
    let recs = vec![
        make_record( SRC_NBM, Some(82.0), None, None, None, "steady rain"),
        make_record( SRC_RSS, Some(84.0), None, None, None, "steady rain"),
        make_record( SRC_GRIDPOINT, Some(80.0), None, None, None, "NWS QPF 0.25\""),
    ];
    let rows = build_site_ensembles( "Home", recs, 1);
    assert_eq!( rows[0].precip_notes, "steady rain | NWS QPF 0.25\"");
}
