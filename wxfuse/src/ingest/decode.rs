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

///! the injectable GRIB decoding capability: turn a single-record byte slice into grid
///! points we can query by nearest neighbor. Keeping this behind a trait means the heavy
///! decoder can be swapped without touching the ingestor

use std::io::Cursor;
use tracing::debug;

use crate::{op_failed, Result};

/// one decoded grid, queryable by geographic nearest neighbor
pub struct DecodedField {
    points: Vec<(f32, f32, f32)>, // (lat, lon, value)
}

impl DecodedField {
    pub fn from_points (points: Vec<(f32, f32, f32)>)->Self {
        DecodedField { points }
    }

    pub fn len (&self)->usize { self.points.len() }

    pub fn is_empty (&self)->bool { self.points.is_empty() }

    /// the raw value of the grid cell nearest to (lat, lon). Missing cells (NaN) are skipped,
    /// longitudes are compared on the wrapped [-180, 180) difference
    pub fn nearest_value (&self, lat: f64, lon: f64)->Option<f64> {
        let mut best: Option<(f64, f32)> = None;

        for (p_lat, p_lon, value) in &self.points {
            if value.is_nan() { continue }

            let d_lat = *p_lat as f64 - lat;
            let d_lon = (*p_lon as f64 - lon + 180.0).rem_euclid(360.0) - 180.0;
            let dist2 = d_lat * d_lat + d_lon * d_lon;

            if best.map_or( true, |(b,_)| dist2 < b) {
                best = Some( (dist2, *value));
            }
        }
        best.map( |(_,v)| v as f64)
    }
}

pub trait GribDecode: Send + Sync {
    /// decode a byte slice holding the single record previously selected from the index.
    /// `short_name` is the field the caller sliced for and is used for diagnostics only,
    /// the slice already contains exactly that record
    fn decode_field (&self, bytes: &[u8], short_name: &str)->Result<DecodedField>;
}

/// default decoder backed by the pure-Rust `grib` crate
pub struct GribCrateDecoder;

impl GribCrateDecoder {
    pub fn new ()->Self { GribCrateDecoder }
}

impl GribDecode for GribCrateDecoder {
    fn decode_field (&self, bytes: &[u8], short_name: &str)->Result<DecodedField> {
        let grib2 = grib::from_reader( Cursor::new(bytes))
            .map_err( |e| op_failed( format!("GRIB slice for {} unreadable: {:?}", short_name, e)))?;

        let (_index, submessage) = grib2.iter().next()
            .ok_or_else( || op_failed( format!("GRIB slice for {} contains no message", short_name)))?;

        let latlons = submessage.latlons()
            .map_err( |e| op_failed( format!("no grid geometry in {} slice: {:?}", short_name, e)))?;
        let decoder = grib::Grib2SubmessageDecoder::from(submessage)
            .map_err( |e| op_failed( format!("undecodable {} slice: {:?}", short_name, e)))?;
        let values = decoder.dispatch()
            .map_err( |e| op_failed( format!("undecodable {} slice: {:?}", short_name, e)))?;

        let points: Vec<(f32,f32,f32)> = latlons.zip(values)
            .map( |((lat,lon), value)| (lat, lon, value))
            .collect();

        if points.is_empty() {
            return Err( op_failed( format!("empty {} grid", short_name)))
        }
        debug!("decoded {} grid points for {}", points.len(), short_name);

        Ok( DecodedField::from_points(points))
    }
}
