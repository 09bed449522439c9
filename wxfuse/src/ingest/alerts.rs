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

///! best-effort active-alerts companion data. A 404 from this endpoint means "no alerts
///! for the point", not a failure

use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use wxfuse_common::net;

use crate::models::{AlertSummary, Site};
use crate::{op_failed, Result};

pub const ALERTS_URL: &str = "https://api.weather.gov/alerts/active";

pub struct AlertsClient {
    client: Client,
}

impl AlertsClient {
    pub fn new (client: Client)->Self {
        AlertsClient { client }
    }

    pub async fn fetch (&self, site: &Site)->Result<Vec<AlertSummary>> {
        let url = format!("{}?point={:.4},{:.4}", ALERTS_URL, site.latitude, site.longitude);

        let response = net::get_with_retry( &self.client, &url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok( Vec::new())
        }
        let response = response.error_for_status().map_err( |e| op_failed(e))?;
        let payload: Value = response.json().await.map_err( |e| op_failed(e))?;

        Ok( parse_alerts(&payload))
    }
}

pub fn parse_alerts (payload: &Value)->Vec<AlertSummary> {
    let features = payload.get("features").and_then( |f| f.as_array());
    let mut alerts: Vec<AlertSummary> = Vec::new();

    for feature in features.map( |f| f.as_slice()).unwrap_or(&[]) {
        let props = match feature.get("properties") { Some(props) => props, None => continue };

        let headline = match props.get("event").and_then( |e| e.as_str()).filter( |e| !e.is_empty()) {
            Some(event) => event.to_string(),
            None => continue
        };
        let severity = props.get("severity").and_then( |s| s.as_str())
            .filter( |s| !s.is_empty())
            .unwrap_or("Unknown")
            .to_string();
        let expires = props.get("expires").and_then( |e| e.as_str())
            .and_then( |e| DateTime::parse_from_rfc3339(e).ok())
            .map( |dt| dt.to_utc());
        let instruction = props.get("instruction").and_then( |i| i.as_str())
            .or_else( || props.get("description").and_then( |d| d.as_str()))
            .map( |s| s.to_string());

        alerts.push( AlertSummary { headline, severity, expires, instruction });
    }
    alerts
}
