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

///! last-resort ingestor: text extraction from the MapClick syndication feed. When the
///! endpoint does not serve RSS we re-request its DWML form and route into the DWML parser

use std::collections::BTreeMap;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use rss::Channel;
use tracing::warn;

use wxfuse_common::cache::FileCache;
use wxfuse_common::datetime::secs;
use wxfuse_common::fs::file_contents_as_string;
use wxfuse_common::net;

use crate::ingest::dwml::parse_dwml;
use crate::ingest::Ingestor;
use crate::models::{Site, SourceDailyRecord, SRC_RSS};
use crate::{parse_error, Result};

pub const RSS_URL: &str = "https://forecast.weather.gov/MapClick.php";

const WIND_TOKENS: [&str; 3] = ["breezy", "wind", "gust"];

/// keyword → label, first match wins
const PRECIP_KEYWORDS: [(&str,&str); 5] = [
    ("snow", "Snow"),
    ("freezing", "Freezing Rain"),
    ("sleet", "Sleet"),
    ("ice", "Ice Pellets"),
    ("rain", "Rain"),
];

lazy_static! {
    static ref TEMP_RE: Regex = Regex::new( r"(?i)(High|Low)\s*:?\s*(-?\d+)\s*°?\s*F").unwrap();
    static ref POP_RE: Regex = Regex::new( r"(\d+)%").unwrap();
    static ref SLUG_RE: Regex = Regex::new( r"[^a-z0-9]+").unwrap();
}

fn name_slug (name: &str)->String {
    SLUG_RE.replace_all( &name.to_lowercase(), "-").to_string()
}

fn entry_day (item: &rss::Item, tz: Tz)->Option<NaiveDate> {
    let ts = item.pub_date()?;
    DateTime::parse_from_rfc2822(ts).or_else( |_| DateTime::parse_from_rfc3339(ts)).ok()
        .map( |dt| dt.with_timezone(&tz).date_naive())
}

/// regex extraction over the concatenated entry title and summary
pub fn parse_rss (text: &str, site: &Site, days: usize, tz: Tz)->Result<Vec<SourceDailyRecord>> {
    let channel = Channel::read_from( text.as_bytes())
        .map_err( |e| parse_error( format!("malformed RSS: {e}")))?;

    let mut daily: BTreeMap<NaiveDate, SourceDailyRecord> = BTreeMap::new();

    for item in channel.items() {
        let day = match entry_day( item, tz) { Some(day) => day, None => continue };
        let record = daily.entry(day).or_insert_with( || SourceDailyRecord::new( site, day, SRC_RSS));

        let text = [item.title().unwrap_or(""), item.description().unwrap_or("")].join(" ");
        let lowered = text.to_lowercase();

        for caps in TEMP_RE.captures_iter(&text) {
            let deg: f64 = match caps[2].parse() { Ok(deg) => deg, Err(_) => continue };
            if caps[1].eq_ignore_ascii_case("high") {
                record.high_f = Some(deg);
            } else {
                record.low_f = Some(deg);
            }
        }

        let pop = POP_RE.captures_iter(&text)
            .filter_map( |caps| caps[1].parse::<f64>().ok())
            .fold( None, |acc: Option<f64>, v| Some( acc.map_or( v, |a| a.max(v))));
        if let Some(pop) = pop {
            record.pop_pct = Some( record.pop_pct.unwrap_or(0.0).max(pop));
        }

        for (keyword, label) in PRECIP_KEYWORDS {
            if lowered.contains(keyword) {
                record.precip_type = Some( label.to_string());
                break
            }
        }

        record.precip_notes = text.trim().to_string();
        if WIND_TOKENS.iter().any( |t| lowered.contains(t)) {
            record.wind_phrase = Some( text.trim().to_string());
        }
    }

    Ok( daily.into_values().take(days).collect())
}

pub struct RssIngestor {
    client: Client,
    cache: Arc<FileCache>,
    days: usize,
    tz: Tz,
}

impl RssIngestor {
    pub fn new (client: Client, cache: Arc<FileCache>, days: usize, tz: Tz)->Self {
        RssIngestor { client, cache, days, tz }
    }

    fn feed_url (&self, site: &Site, fcst_type: &str)->String {
        format!("{}?lat={}&lon={}&FcstType={}", RSS_URL, site.latitude, site.longitude, fcst_type)
    }

    /// a payload is RSS iff it contains "<rss" (case-insensitive). Anything else gets
    /// replaced by the DWML form of the same endpoint, rewriting the cache slot
    async fn download_feed (&self, site: &Site)->Result<String> {
        let slug = name_slug(&site.name);
        let name = format!("{slug}.xml");

        let client = &self.client;
        let url = self.feed_url( site, "rss");
        let cached = self.cache.fetch( "rss", &name, async move {
            net::get_ok_bytes( client, &url, Some(secs(60))).await
        }).await?;

        let mut text = file_contents_as_string(&cached.path).map_err( |e| crate::WxFuseError::IOError(e))?;
        if !text.to_lowercase().contains("<rss") {
            warn!("MapClick RSS unavailable for {}, falling back to DWML", site.name);
            let bytes = net::get_ok_bytes( &self.client, &self.feed_url( site, "dwml"), Some(secs(60))).await?;
            self.cache.rewrite( &cached, &bytes)?;
            text = String::from_utf8_lossy(&bytes).to_string();
        }
        Ok(text)
    }
}

#[async_trait]
impl Ingestor for RssIngestor {
    fn source_name (&self)->&'static str { SRC_RSS }

    async fn fetch (&self, site: &Site)->Result<Vec<SourceDailyRecord>> {
        let payload = self.download_feed(site).await?;
        if payload.to_lowercase().contains("<rss") {
            parse_rss( &payload, site, self.days, self.tz)
        } else {
            parse_dwml( &payload, site, self.days, self.tz, SRC_RSS)
        }
    }
}
