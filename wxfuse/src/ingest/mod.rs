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

///! the acquisition layer: one Ingestor per upstream source, all producing the same
///! per-day record shape

use async_trait::async_trait;

use crate::config::PrimaryIngest;
use crate::models::{Site, SourceDailyRecord};
use crate::Result;

pub mod dwml;
pub mod ndfd;
pub mod gridpoint;
pub mod rss;
pub mod nbm;
pub mod decode;
pub mod alerts;

/// the uniform source capability. An empty result is permitted and reported by the
/// driver as a non-fatal no-data failure
#[async_trait]
pub trait Ingestor: Send + Sync {
    /// stable source identifier, one of the `models::SRC_*` constants
    fn source_name (&self)->&'static str;

    async fn fetch (&self, site: &Site)->Result<Vec<SourceDailyRecord>>;
}

/// deterministic dispatch list. `public_files` is (nbm, gridpoint, ndfd) in dispatch order;
/// duplicates (by source identity) are dropped keeping the first occurrence
pub fn ingestor_order<'a> (primary: PrimaryIngest, rss_fallback: bool,
                           public_files: [&'a dyn Ingestor; 3], rss: &'a dyn Ingestor)->Vec<&'a dyn Ingestor> {
    let mut order: Vec<&'a dyn Ingestor> = Vec::new();

    match primary {
        PrimaryIngest::PublicFiles => {
            order.extend_from_slice(&public_files);
            if rss_fallback { order.push(rss) }
        }
        PrimaryIngest::Rss => {
            order.push(rss);
            order.extend_from_slice(&public_files);
        }
    }

    let mut seen: Vec<&'static str> = Vec::new();
    order.retain( |ing| {
        if seen.contains(&ing.source_name()) {
            false
        } else {
            seen.push(ing.source_name());
            true
        }
    });

    order
}
