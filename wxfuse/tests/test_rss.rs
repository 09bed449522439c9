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

/// feed extraction tests
/// run with "cargo test --test test_rss -- --nocapture"

use anyhow::Result;
use chrono_tz::Tz;
use wxfuse::ingest::rss::parse_rss;
use wxfuse::models::Site;

const NY: Tz = chrono_tz::America::New_York;

fn feed (items: &str)->String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
<rss version=\"2.0\">\n<channel>\n<title>Forecast</title>\n<link>https://forecast.weather.gov</link>\n\
<description>point forecast</description>\n{items}\n</channel>\n</rss>\n"
    )
}

fn test_site ()->Site {
    Site::new( "Home", 39.3, -77.7)
}

#[test]
fn test_parse_rss_extracts_temps_and_pop()->Result<()> {
    let xml = feed(
        "<item><title>Wednesday</title>\
<description>Rain likely. High: 78 °F. Chance of precipitation is 40%. Later 60%.</description>\
<pubDate>Wed, 01 May 2024 06:00:00 -0400</pubDate></item>\
<item><title>Wednesday Night</title>\
<description>Breezy. Low: 58 °F.</description>\
<pubDate>Wed, 01 May 2024 18:00:00 -0400</pubDate></item>"
    );

    let rows = parse_rss( &xml, &test_site(), 10, NY)?;
    assert_eq!( rows.len(), 1); // both entries fall on the same local day

    let row = &rows[0];
    assert_eq!( row.high_f, Some(78.0));
    assert_eq!( row.low_f, Some(58.0));
    assert_eq!( row.pop_pct, Some(60.0)); // max of all percentages seen
    assert_eq!( row.precip_type.as_deref(), Some("Rain"));
    assert!( row.wind_phrase.as_deref().unwrap().contains("Breezy"));
    Ok(())
}

#[test]
fn test_parse_rss_keyword_priority()->Result<()> {
    // "snow" wins over "rain" even when rain appears first in the text
    let xml = feed(
        "<item><title>Thursday</title>\
<description>Rain changing to snow. High: 40 F.</description>\
<pubDate>Thu, 02 May 2024 06:00:00 -0400</pubDate></item>"
    );

    let rows = parse_rss( &xml, &test_site(), 10, NY)?;
    assert_eq!( rows[0].precip_type.as_deref(), Some("Snow"));
    Ok(())
}

#[test]
fn test_parse_rss_negative_temperature()->Result<()> {
    let xml = feed(
        "<item><title>Cold snap</title>\
<description>Dangerously cold. Low: -5 F.</description>\
<pubDate>Fri, 03 May 2024 06:00:00 -0400</pubDate></item>"
    );

    let rows = parse_rss( &xml, &test_site(), 10, NY)?;
    assert_eq!( rows[0].low_f, Some(-5.0));
    Ok(())
}

#[test]
fn test_parse_rss_entry_without_timestamp_is_skipped()->Result<()> {
    let xml = feed( "<item><title>Whenever</title><description>High: 70 F.</description></item>");
    let rows = parse_rss( &xml, &test_site(), 10, NY)?;
    assert!( rows.is_empty());
    Ok(())
}

#[test]
fn test_parse_rss_rejects_non_feed() {
    assert!( parse_rss( "<html>maintenance page</html>", &test_site(), 10, NY).is_err());
}
