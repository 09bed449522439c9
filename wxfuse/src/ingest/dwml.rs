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

///! parser for DWML, the XML dialect whose scalar series reference named time-layouts.
///! Series values are paired with layout timestamps positionally, stopping at the shorter list

use std::collections::{BTreeMap, HashMap};
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use roxmltree::{Document, Node};

use wxfuse_common::datetime::parse_iso;
use crate::ensemble::PRECIP_PRIORITY;
use crate::models::{Site, SourceDailyRecord};
use crate::{parse_error, Result};

const WIND_TOKENS: [&str; 3] = ["breezy", "wind", "gust"];

type Layouts = HashMap<String, Vec<DateTime<Tz>>>;
type Daily = BTreeMap<NaiveDate, SourceDailyRecord>;

fn parse_time_layouts (doc: &Document, tz: Tz)->Layouts {
    let mut layouts = Layouts::new();

    for layout in doc.descendants().filter( |n| n.has_tag_name("time-layout")) {
        let key = match layout.children().find( |c| c.has_tag_name("layout-key")).and_then( |n| n.text()) {
            Some(key) => key.to_string(),
            None => continue
        };

        let times: Vec<DateTime<Tz>> = layout.children()
            .filter( |c| c.has_tag_name("start-valid-time"))
            .filter_map( |n| n.text())
            .filter_map( |t| parse_iso(t, tz))
            .collect();

        layouts.insert( key, times);
    }
    layouts
}

fn ensure_record<'a> (daily: &'a mut Daily, site: &Site, day: NaiveDate, source: &'static str)->&'a mut SourceDailyRecord {
    daily.entry(day).or_insert_with( || SourceDailyRecord::new( site, day, source))
}

fn layout_times<'a> (node: &Node, layouts: &'a Layouts)->Option<&'a Vec<DateTime<Tz>>> {
    node.attribute("time-layout").and_then( |key| layouts.get(key))
}

fn value_texts<'a,'i> (node: &Node<'a,'i>)->Vec<&'a str> {
    node.children()
        .filter( |c| c.has_tag_name("value"))
        .map( |c| c.text().unwrap_or(""))
        .collect()
}

fn title_case (s: &str)->String {
    s.split_whitespace()
        .map( |word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new()
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// convert a declared-unit amount into inches, rounded to 2 dp
fn convert_amount (value: &str, units: Option<&str>)->Option<f64> {
    let value = value.trim();
    if value.is_empty() { return None }
    let numeric: f64 = value.parse().ok()?;

    let factor = match units.unwrap_or("").to_lowercase().as_str() {
        "inches" | "inch" | "in" => 1.0,
        "mm" | "millimeters" => 0.0393701,
        "kg/m^2" | "kg/m2" => 0.0393701,
        "m" => 39.3701,
        _ => 1.0
    };
    Some( round2( numeric * factor))
}

fn round2 (v: f64)->f64 { (v * 100.0).round() / 100.0 }

fn accumulate_amounts (doc: &Document, layouts: &Layouts, daily: &mut Daily, site: &Site, source: &'static str,
                       tag: &str, type_filter: &str, field: fn(&mut SourceDailyRecord)->&mut Option<f64>) {
    for node in doc.descendants().filter( |n| n.has_tag_name(tag)) {
        let node_type = node.attribute("type").unwrap_or("").to_lowercase();
        if !type_filter.is_empty() && node_type != type_filter { continue }

        let times = match layout_times( &node, layouts) { Some(times) => times, None => continue };
        let units = node.attribute("units");

        for (ts, val) in times.iter().zip( value_texts(&node)) {
            let amount = match convert_amount( val, units) {
                Some(amount) if amount > 0.0 => amount,
                _ => continue
            };
            let record = ensure_record( daily, site, ts.date_naive(), source);
            let slot = field(record);
            *slot = Some( round2( slot.unwrap_or(0.0) + amount));
        }
    }
}

/// derive (primary type, joined note) from the decorated per-day weather descriptors via
/// the fixed precipitation priority rule
fn summarize_precip (types: &[String])->(Option<String>, String) {
    let mut seen: Vec<&str> = Vec::new();
    for t in types {
        if !t.is_empty() && !seen.contains(&t.as_str()) {
            seen.push(t);
        }
    }
    if seen.is_empty() { return (None, String::new()) }

    let primary = PRECIP_PRIORITY.iter()
        .find( |label| seen.contains(label))
        .map( |label| label.to_string())
        .unwrap_or_else( || seen[0].to_string());

    (Some(primary), seen.join(", "))
}

pub fn parse_dwml (xml_text: &str, site: &Site, days: usize, tz: Tz, source: &'static str)->Result<Vec<SourceDailyRecord>> {
    let doc = Document::parse(xml_text).map_err( |e| parse_error( format!("malformed DWML: {e}")))?;
    let layouts = parse_time_layouts( &doc, tz);
    let mut daily = Daily::new();

    //--- temperatures
    for node in doc.descendants().filter( |n| n.has_tag_name("temperature")) {
        let temp_type = node.attribute("type").unwrap_or("");
        let times = match layout_times( &node, &layouts) { Some(times) => times, None => continue };

        for (ts, val) in times.iter().zip( value_texts(&node)) {
            let num: f64 = match val.trim().parse() { Ok(num) => num, Err(_) => continue };
            let record = ensure_record( &mut daily, site, ts.date_naive(), source);
            match temp_type {
                "maximum" => record.high_f = Some(num),
                "minimum" => record.low_f = Some(num),
                _ => {}
            }
        }
    }

    //--- probability of precipitation, per-day maximum
    for node in doc.descendants().filter( |n| n.has_tag_name("probability-of-precipitation")) {
        let times = match layout_times( &node, &layouts) { Some(times) => times, None => continue };

        for (ts, val) in times.iter().zip( value_texts(&node)) {
            let num: f64 = match val.trim().parse() { Ok(num) => num, Err(_) => continue };
            let record = ensure_record( &mut daily, site, ts.date_naive(), source);
            record.pop_pct = Some( record.pop_pct.unwrap_or(0.0).max(num));
        }
    }

    //--- accumulated amounts, summed per day
    accumulate_amounts( &doc, &layouts, &mut daily, site, source, "precipitation", "liquid", |r| &mut r.qpf_inches);
    accumulate_amounts( &doc, &layouts, &mut daily, site, source, "precipitation", "snow", |r| &mut r.snow_inches);
    accumulate_amounts( &doc, &layouts, &mut daily, site, source, "precipitation", "ice", |r| &mut r.ice_inches);
    accumulate_amounts( &doc, &layouts, &mut daily, site, source, "snow-amount", "", |r| &mut r.snow_inches);
    accumulate_amounts( &doc, &layouts, &mut daily, site, source, "ice-accumulation", "", |r| &mut r.ice_inches);

    //--- weather summaries and decorated conditions
    let mut weather_notes: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();
    let mut weather_types: BTreeMap<NaiveDate, Vec<String>> = BTreeMap::new();

    for node in doc.descendants().filter( |n| n.has_tag_name("weather")) {
        let times = match layout_times( &node, &layouts) { Some(times) => times, None => continue };
        let value_nodes: Vec<Node> = node.children().filter( |c| c.has_tag_name("value")).collect();

        for (ts, value_node) in times.iter().zip(value_nodes) {
            let day = ts.date_naive();
            ensure_record( &mut daily, site, day, source);

            if let Some(summary) = value_node.attribute("weather-summary") {
                weather_notes.entry(day).or_default().push( summary.to_string());
            }

            for condition in value_node.children().filter( |c| c.has_tag_name("weather-conditions")) {
                let wtype = condition.attribute("weather-type").unwrap_or("");
                if wtype.is_empty() || wtype == "none" { continue }

                let mut descriptor = title_case( &wtype.replace('_'," "));
                if let Some(intensity) = condition.attribute("intensity") {
                    if intensity != "none" && intensity != "moderate" {
                        descriptor = format!("{} {}", title_case(intensity), descriptor);
                    }
                }
                if let Some(coverage) = condition.attribute("coverage") {
                    if coverage != "definite" {
                        descriptor = format!("{} {}", title_case(coverage), descriptor);
                    }
                }
                weather_types.entry(day).or_default().push(descriptor);
            }
        }
    }

    //--- worded forecasts feed the notes and the wind signal
    for node in doc.descendants().filter( |n| n.has_tag_name("wordedForecast")) {
        let times = match layout_times( &node, &layouts) { Some(times) => times, None => continue };
        let texts: Vec<&str> = node.children()
            .filter( |c| c.has_tag_name("text"))
            .map( |c| c.text().unwrap_or(""))
            .collect();

        for (ts, text) in times.iter().zip(texts) {
            let normalized = text.trim();
            if normalized.is_empty() { continue }

            let record = ensure_record( &mut daily, site, ts.date_naive(), source);
            if record.notes.is_empty() {
                record.notes = normalized.to_string();
            } else {
                record.notes.push_str(" | ");
                record.notes.push_str(normalized);
            }

            let lowered = normalized.to_lowercase();
            if WIND_TOKENS.iter().any( |t| lowered.contains(t)) {
                record.wind_phrase = Some( normalized.to_string());
            }
        }
    }

    //--- fold the collected weather info into the records
    for (day, record) in daily.iter_mut() {
        let empty = Vec::new();
        let types = weather_types.get(day).unwrap_or(&empty);
        let (ptype, type_notes) = summarize_precip(types);

        if let Some(ptype) = ptype {
            record.precip_type = Some(ptype);
        }

        let summaries = weather_notes.get(day).unwrap_or(&empty);
        if !type_notes.is_empty() || !summaries.is_empty() {
            let mut fragments: Vec<&str> = Vec::new();
            if !type_notes.is_empty() { fragments.push(&type_notes) }
            for s in summaries {
                if !s.is_empty() && !fragments.contains(&s.as_str()) {
                    fragments.push(s);
                }
            }
            record.precip_notes = fragments.join("; ");
        }
    }

    Ok( daily.into_values().take(days).collect())
}
