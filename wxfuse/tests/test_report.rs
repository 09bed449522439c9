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

/// rendering collaborator tests
/// run with "cargo test --test test_report -- --nocapture"

use anyhow::Result;
use chrono::NaiveDate;
use wxfuse::ensemble::build_site_ensembles;
use wxfuse::models::{Site, SourceDailyRecord, SRC_NBM};
use wxfuse::report::csv::{write_home_csv, write_work_csv};
use wxfuse::report::html::sparkline;

fn sample_rows ()->Vec<wxfuse::models::DailyEnsemble> {
    let site = Site::new( "Home", 39.3, -77.7);
    let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let mut rec = SourceDailyRecord::new( &site, day, SRC_NBM);
    rec.high_f = Some(95.0);
    rec.low_f = Some(30.0);
    rec.pop_pct = Some(40.0);
    rec.precip_type = Some( "Rain".to_string());

    build_site_ensembles( "Home", vec![rec], 1)
}

#[test]
fn test_sparkline_path() {
    let spark = sparkline( &[Some(60.0), None, Some(80.0), Some(70.0)]);
    assert!( spark.d.starts_with("M0,"));
    assert_eq!( spark.d.matches('L').count(), 2); // the missing point is skipped
    assert_eq!( spark.min_value, Some(60.0));
    assert_eq!( spark.max_value, Some(80.0));
}

#[test]
fn test_sparkline_needs_two_points() {
    assert!( sparkline( &[Some(60.0)]).d.is_empty());
    assert!( sparkline( &[None, None]).d.is_empty());
}

#[test]
fn test_csv_columns()->Result<()> {
    let rows = sample_rows();
    let dir = tempfile::tempdir()?;

    let home_path = dir.path().join("home.csv");
    write_home_csv( &rows, &home_path)?;
    let home_text = std::fs::read_to_string(&home_path)?;
    let header = home_text.lines().next().unwrap();
    assert!( header.starts_with("date,label,high_f,low_f,pop_pct"));
    assert!( !header.contains("freeze_risk_badge"));
    assert!( home_text.contains("Extreme Caution"));
    assert!( home_text.contains("30/40/10"));

    let work_path = dir.path().join("work.csv");
    write_work_csv( &rows, &work_path)?;
    let work_text = std::fs::read_to_string(&work_path)?;
    assert!( work_text.lines().next().unwrap().ends_with("freeze_risk_badge,freeze_guidance"));
    assert!( work_text.contains("Freeze"));
    Ok(())
}
