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

use std::fs::{self, File};
use std::io::{self, Read, Write, Error as IOError, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

type Result<T> = std::result::Result<T,std::io::Error>;

pub fn ensure_dir (path: impl AsRef<Path>)->io::Result<()> {
    let path = path.as_ref();
    if !path.is_dir() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// make sure `path` is a directory we can write into, creating it when missing
pub fn ensure_writable_dir (path: impl AsRef<Path>) -> io::Result<()> {
    let path = path.as_ref();
    match fs::metadata(path) {
        Ok(md) if md.is_dir() && !md.permissions().readonly() => Ok(()),
        Ok(md) if md.is_dir() => {
            Err( IOError::new( ErrorKind::PermissionDenied, format!("read-only dir {path:?}")))
        }
        Ok(_) => Err( IOError::new( ErrorKind::NotADirectory, format!("{path:?} exists but is no dir"))),
        Err(_) => fs::create_dir_all(path)
    }
}

pub fn file_contents_as_string (path: impl AsRef<Path>) -> Result<String> {
    let mut file = File::open( path.as_ref())?;
    let len = file.metadata()?.len();
    let mut contents = String::with_capacity(len as usize);
    file.read_to_string(&mut contents)?;
    Ok(contents)
}

pub fn file_contents (path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let mut file = File::open( path.as_ref())?;
    let len = file.metadata()?.len();
    let mut contents: Vec<u8> = Vec::with_capacity(len as usize);
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

pub fn set_filepath_contents (path: impl AsRef<Path>, new_contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        ensure_dir(parent)?;
    }
    let mut file = File::create( path.as_ref())?;
    file.write_all(new_contents)
}

pub fn file_length (path: impl AsRef<Path>) -> Option<u64> {
    fs::metadata( path.as_ref()).ok().map( |meta| meta.len() )
}

/// age of a file since its last modification, None if it does not exist
pub fn file_age (path: impl AsRef<Path>) -> Option<Duration> {
    let meta = fs::metadata( path.as_ref()).ok()?;
    let last_mod = meta.modified().ok()?;
    SystemTime::now().duration_since(last_mod).ok()
}
