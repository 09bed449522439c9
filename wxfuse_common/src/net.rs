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

///! shared HTTP layer: one client per run, GET/HEAD with bounded retry and byte-range support

use std::time::Duration;
use reqwest::{header, Client, Method, Response, StatusCode};
use tracing::debug;

use crate::datetime::secs_f64;
use crate::{op_failed, Result};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const RETRY_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF_BASE: f64 = 0.3;

fn is_retriable (status: StatusCode)->bool {
    matches!( status.as_u16(), 500 | 502 | 503 | 504)
}

/// create the client shared by all ingestors of a run
pub fn new_client (user_agent: &str)->Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(DEFAULT_TIMEOUT)
        .build()
        .map_err( |e| e.into())
}

/// send a GET/HEAD request, re-issuing it with exponential backoff while the server
/// answers with a transient 5xx status. The final response is returned regardless of
/// status so that callers can special-case codes such as 404
async fn request_with_retry (client: &Client, method: Method, url: &str,
                             range: Option<String>, timeout: Option<Duration>)->Result<Response> {
    let mut attempt = 0;
    loop {
        let mut req = client.request( method.clone(), url);
        if let Some(range) = &range {
            req = req.header( header::RANGE, range.as_str());
        }
        if let Some(timeout) = timeout {
            req = req.timeout(timeout);
        }

        let response = req.send().await?;
        if is_retriable( response.status()) && attempt < RETRY_ATTEMPTS {
            let delay = secs_f64( RETRY_BACKOFF_BASE * 2f64.powi(attempt as i32));
            debug!("{} {} -> {}, retry {}/{} in {:?}", method, url, response.status(), attempt+1, RETRY_ATTEMPTS, delay);
            tokio::time::sleep(delay).await;
            attempt += 1;
        } else {
            return Ok(response)
        }
    }
}

pub async fn get_with_retry (client: &Client, url: &str)->Result<Response> {
    request_with_retry( client, Method::GET, url, None, None).await
}

/// HEAD probe, used to check upstream object existence without downloading it
pub async fn head_status (client: &Client, url: &str)->Result<StatusCode> {
    let response = request_with_retry( client, Method::HEAD, url, None, None).await?;
    Ok( response.status())
}

/// retrieve the full body, erroring on any non-2xx final status
pub async fn get_ok_bytes (client: &Client, url: &str, timeout: Option<Duration>)->Result<Vec<u8>> {
    let response = request_with_retry( client, Method::GET, url, None, timeout).await?;
    let response = response.error_for_status()?;
    Ok( response.bytes().await?.to_vec())
}

/// retrieve `[start, end]` of the addressed object (open ended when `end` is None).
/// Servers reply with 206 for honored ranges, some fall back to 200 with the full body
pub async fn get_ranged_bytes (client: &Client, url: &str, start: u64, end: Option<u64>,
                               timeout: Option<Duration>)->Result<Vec<u8>> {
    let range = match end {
        Some(end) => format!("bytes={}-{}", start, end),
        None => format!("bytes={}-", start)
    };

    let response = request_with_retry( client, Method::GET, url, Some(range), timeout).await?;
    match response.status() {
        StatusCode::PARTIAL_CONTENT | StatusCode::OK => Ok( response.bytes().await?.to_vec()),
        other => Err( op_failed( format!("range request failed with code {} for {}", other.as_str(), url)))
    }
}
