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

///! TTL-based byte cache for downloaded artifacts, keyed on (namespace, name) under a root dir

use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::fs::{ensure_dir, ensure_writable_dir, file_age, file_contents, file_contents_as_string};
use crate::{Result, WxCommonError};

/// a cache slot that was either reused (`fresh`) or just (re)written
#[derive(Debug,Clone)]
pub struct CachedFile {
    pub path: PathBuf,
    pub fresh: bool,
}

pub struct FileCache {
    root: PathBuf,
    ttl: Duration,
}

impl FileCache {
    /// a zero `ttl` disables reuse, every fetch re-runs its downloader
    pub fn new (root: impl AsRef<Path>, ttl: Duration)->Result<Self> {
        let root = root.as_ref().to_path_buf();
        ensure_writable_dir(&root)?;
        Ok( FileCache { root, ttl } )
    }

    fn slot (&self, namespace: &str, name: &str)->Result<PathBuf> {
        let path = self.root.join(namespace).join(name);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        Ok(path)
    }

    fn is_fresh (&self, path: &Path)->bool {
        if self.ttl.is_zero() { return false }
        match file_age(path) {
            Some(age) => age <= self.ttl,
            None => false
        }
    }

    /// return the cached file for (namespace, name) if still within TTL, otherwise run
    /// `download` and store its bytes. The slot is written through a temp file and renamed
    /// into place so a failing downloader never leaves a partial file behind. Downloader
    /// errors propagate unchanged.
    ///
    /// concurrent fetches of distinct keys are fine, a single key has to have a single writer
    pub async fn fetch<F> (&self, namespace: &str, name: &str, download: F)->Result<CachedFile>
        where F: Future<Output=Result<Vec<u8>>>
    {
        let target = self.slot( namespace, name)?;
        if self.is_fresh(&target) {
            return Ok( CachedFile { path: target, fresh: true } )
        }

        let data = download.await?;

        let mut file = NamedTempFile::new_in( target.parent().unwrap_or( self.root.as_path()))?;
        file.write_all(&data)?;
        file.persist(&target).map_err( |e| WxCommonError::IOError(e.error))?;
        debug!("cached {} bytes as {:?}", data.len(), target);

        Ok( CachedFile { path: target, fresh: false } )
    }

    pub async fn read_text<F> (&self, namespace: &str, name: &str, download: F)->Result<String>
        where F: Future<Output=Result<Vec<u8>>>
    {
        let cached = self.fetch( namespace, name, download).await?;
        Ok( file_contents_as_string(&cached.path)?)
    }

    pub async fn read_bytes<F> (&self, namespace: &str, name: &str, download: F)->Result<Vec<u8>>
        where F: Future<Output=Result<Vec<u8>>>
    {
        let cached = self.fetch( namespace, name, download).await?;
        Ok( file_contents(&cached.path)?)
    }

    /// overwrite a slot in place, used when a caller has to rewrite a cached payload
    /// with a different representation of the same resource
    pub fn rewrite (&self, cached: &CachedFile, data: &[u8])->Result<()> {
        crate::fs::set_filepath_contents( &cached.path, data)?;
        Ok(())
    }
}
