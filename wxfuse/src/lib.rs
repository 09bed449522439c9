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

//! wxfuse blends several public forecast feeds into one daily ensemble per site, annotated
//! with occupational heat- and cold-stress guidance. The pipeline runs all configured
//! ingestors over the two fixed sites, reduces the per-source daily records, classifies the
//! result and hands it to the report/email collaborators.

pub mod models;
pub mod config;
pub mod ingest;
pub mod ensemble;
pub mod ehs;
pub mod pipeline;
pub mod report;
pub mod smtp;

mod errors;
pub use errors::*;
