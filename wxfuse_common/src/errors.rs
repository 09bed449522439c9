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

use thiserror::Error;
use reqwest;

pub type Result<T> = std::result::Result<T, WxCommonError>;

#[derive(Error,Debug)]
pub enum WxCommonError {
    #[error("IO error {0}")]
    IOError( #[from] std::io::Error),

    #[error("http error {0}")]
    HttpError( #[from] reqwest::Error),

    #[error("parse error {0}")]
    ParseError(String),

    /// a generic error
    #[error("operation failed {0}")]
    OpFailed(String)
}

pub fn op_failed (msg: impl ToString)->WxCommonError {
    WxCommonError::OpFailed(msg.to_string())
}

pub fn parse_error (msg: impl ToString)->WxCommonError {
    WxCommonError::ParseError(msg.to_string())
}
