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

///! NDFD time-series ingestor. The endpoint frontends are not equally reliable so we walk
///! through a sequence of request shapes and take the first one that answers

use std::sync::Arc;
use async_trait::async_trait;
use chrono::Duration;
use chrono_tz::Tz;
use reqwest::Client;
use tracing::debug;

use wxfuse_common::cache::FileCache;
use wxfuse_common::datetime::{secs, utc_now};
use wxfuse_common::net;

use crate::ingest::dwml::parse_dwml;
use crate::ingest::Ingestor;
use crate::models::{Site, SourceDailyRecord, SRC_NDFD};
use crate::{op_failed, Result};

pub const NDFD_URL: &str = "https://graphical.weather.gov/xml/SOAP_server/ndfdXMLclient.php";

pub struct NdfdIngestor {
    client: Client,
    cache: Arc<FileCache>,
    days: usize,
    tz: Tz,
}

impl NdfdIngestor {
    pub fn new (client: Client, cache: Arc<FileCache>, days: usize, tz: Tz)->Self {
        NdfdIngestor { client, cache, days, tz }
    }

    fn base_query (&self)->String {
        let now = utc_now().with_timezone(&self.tz);
        let end = now + Duration::days(self.days as i64 + 1);
        format!(
            "product=time-series&begin={}&end={}&Unit=e&maxt=maxt&mint=mint&pop12=pop12&qpf=qpf&snow=snow&iceaccum=iceaccum&wspd=wspd&wgust=wgust",
            now.format("%Y-%m-%dT%H:%M:%S"), end.format("%Y-%m-%dT%H:%M:%S")
        )
    }

    /// the request shapes to try, in order
    fn request_urls (&self, site: &Site)->Vec<String> {
        let base = self.base_query();
        let lat = format!("{:.4}", site.latitude);
        let lon = format!("{:.4}", site.longitude);

        vec![
            format!("{NDFD_URL}?{base}&whichClient=NDFDgenLatLonList&lat={lat}&lon={lon}"),
            format!("{NDFD_URL}?{base}&whichClient=NDFDgen&lat={lat}&lon={lon}"),
            format!("{NDFD_URL}?{base}&whichClient=NDFDgenLatLonList&listLatLon={lat},{lon}"),
        ]
    }
}

#[async_trait]
impl Ingestor for NdfdIngestor {
    fn source_name (&self)->&'static str { SRC_NDFD }

    async fn fetch (&self, site: &Site)->Result<Vec<SourceDailyRecord>> {
        let name = format!("{}.xml", site.coord_slug());
        let mut last_err = op_failed("no NDFD request shape attempted");

        for (attempt, url) in self.request_urls(site).into_iter().enumerate() {
            let client = &self.client;
            match self.cache.read_text( "ndfd", &name, async move {
                net::get_ok_bytes( client, &url, Some(secs(60))).await
            }).await {
                Ok(text) => {
                    return parse_dwml( &text, site, self.days, self.tz, SRC_NDFD)
                }
                Err(e) => {
                    debug!("NDFD request shape {} failed for {}: {}", attempt+1, site.name, e);
                    last_err = e.into();
                }
            }
        }

        Err(last_err)
    }
}
