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

/// DWML parser tests over the bundled three-day sample
/// run with "cargo test --test test_dwml -- --nocapture"

use anyhow::Result;
use chrono_tz::Tz;
use wxfuse::ingest::dwml::parse_dwml;
use wxfuse::models::{Site, SRC_NDFD};

const SAMPLE: &str = include_str!("fixtures/dwml_sample.xml");
const NY: Tz = chrono_tz::America::New_York;

fn test_site ()->Site {
    Site::new( "Home", 39.3, -77.7)
}

#[test]
fn test_parse_dwml_extracts_daily_fields()->Result<()> {
    let rows = parse_dwml( SAMPLE, &test_site(), 3, NY, SRC_NDFD)?;
    assert_eq!( rows.len(), 3);

    let first = &rows[0];
    assert_eq!( first.high_f, Some(78.0));
    assert_eq!( first.low_f, Some(58.0));
    assert_eq!( first.pop_pct, Some(40.0)); // max of the first two 12h periods
    assert!( first.precip_type.as_deref().unwrap_or("").starts_with("Rain"));
    assert!( first.wind_phrase.as_deref().unwrap_or("").to_lowercase().contains("breezy"));
    assert_eq!( first.label, "Wed May 01");

    let second = &rows[1];
    assert!( second.precip_type.as_deref().unwrap_or("").contains("Snow"));
    Ok(())
}

#[test]
fn test_parse_dwml_sums_liquid_amounts()->Result<()> {
    let rows = parse_dwml( SAMPLE, &test_site(), 3, NY, SRC_NDFD)?;
    // 0.25 + 0.10 over the two day-0 periods, zero values are ignored
    assert_eq!( rows[0].qpf_inches, Some(0.35));
    assert_eq!( rows[2].qpf_inches, None);
    Ok(())
}

#[test]
fn test_parse_dwml_truncates_horizon()->Result<()> {
    let rows = parse_dwml( SAMPLE, &test_site(), 2, NY, SRC_NDFD)?;
    assert_eq!( rows.len(), 2);
    Ok(())
}

#[test]
fn test_parse_dwml_collects_notes()->Result<()> {
    let rows = parse_dwml( SAMPLE, &test_site(), 3, NY, SRC_NDFD)?;
    assert!( rows[0].notes.contains("Rain likely"));
    assert!( rows[0].precip_notes.contains("Rain"));
    // worded forecast without wind tokens leaves the phrase unset
    assert!( rows[2].wind_phrase.is_none());
    Ok(())
}

#[test]
fn test_parse_dwml_rejects_malformed_input() {
    assert!( parse_dwml( "this is not xml", &test_site(), 3, NY, SRC_NDFD).is_err());
}
