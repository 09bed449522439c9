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

/// unit tests for the TTL byte cache
/// run with "cargo test --test test_cache -- --nocapture"

use std::fs::{File, FileTimes};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};
use anyhow::Result;
use wxfuse_common::cache::FileCache;
use wxfuse_common::datetime::hours;
use wxfuse_common::op_failed;

#[tokio::test]
async fn test_fresh_hit_skips_downloader()->Result<()> {
    let dir = tempfile::tempdir()?;
    let cache = FileCache::new( dir.path(), hours(3))?;
    let n_downloads = AtomicUsize::new(0);

    let first = cache.fetch( "ns", "payload.bin", async {
        n_downloads.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1u8,2,3])
    }).await?;
    assert!( !first.fresh);

    let second = cache.fetch( "ns", "payload.bin", async {
        n_downloads.fetch_add(1, Ordering::SeqCst);
        Ok(vec![9u8])
    }).await?;
    assert!( second.fresh);
    assert_eq!( n_downloads.load(Ordering::SeqCst), 1);
    assert_eq!( std::fs::read(&second.path)?, vec![1u8,2,3]);

    Ok(())
}

#[tokio::test]
async fn test_expired_slot_redownloads()->Result<()> {
    let dir = tempfile::tempdir()?;
    let cache = FileCache::new( dir.path(), hours(1))?;
    let n_downloads = AtomicUsize::new(0);

    let first = cache.fetch( "ns", "payload.bin", async {
        n_downloads.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1u8])
    }).await?;

    // age the slot past the TTL
    let old = SystemTime::now() - Duration::from_secs(2 * 3600);
    let file = File::options().write(true).open(&first.path)?;
    file.set_times( FileTimes::new().set_modified(old))?;

    let second = cache.fetch( "ns", "payload.bin", async {
        n_downloads.fetch_add(1, Ordering::SeqCst);
        Ok(vec![2u8])
    }).await?;
    assert!( !second.fresh);
    assert_eq!( n_downloads.load(Ordering::SeqCst), 2);
    assert_eq!( std::fs::read(&second.path)?, vec![2u8]);

    Ok(())
}

#[tokio::test]
async fn test_zero_ttl_disables_reuse()->Result<()> {
    let dir = tempfile::tempdir()?;
    let cache = FileCache::new( dir.path(), Duration::ZERO)?;
    let n_downloads = AtomicUsize::new(0);

    for _ in 0..2 {
        cache.fetch( "ns", "payload.bin", async {
            n_downloads.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0u8])
        }).await?;
    }
    assert_eq!( n_downloads.load(Ordering::SeqCst), 2);

    Ok(())
}

#[tokio::test]
async fn test_failed_download_leaves_no_file()->Result<()> {
    let dir = tempfile::tempdir()?;
    let cache = FileCache::new( dir.path(), hours(1))?;

    let res = cache.fetch( "ns", "payload.bin", async {
        Err( op_failed("upstream gone"))
    }).await;
    assert!( res.is_err());
    assert!( !dir.path().join("ns").join("payload.bin").exists());

    Ok(())
}
