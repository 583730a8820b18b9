/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Time source and sleep abstractions to support testing.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Trait with a `now()` function returning the current time
pub trait TimeSource: Debug + Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// Time source delegating to [`SystemTime::now`].
#[non_exhaustive]
#[derive(Debug, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    /// Creates a new `SystemTimeSource`.
    pub fn new() -> Self {
        SystemTimeSource
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A shareable [`TimeSource`]. Defaults to [`SystemTimeSource`].
#[derive(Clone, Debug)]
pub struct SharedTimeSource(Arc<dyn TimeSource>);

impl SharedTimeSource {
    /// Wraps a time source.
    pub fn new(source: impl TimeSource + 'static) -> Self {
        Self(Arc::new(source))
    }
}

impl Default for SharedTimeSource {
    fn default() -> Self {
        Self::new(SystemTimeSource::new())
    }
}

impl TimeSource for SharedTimeSource {
    fn now(&self) -> SystemTime {
        self.0.now()
    }
}

/// Blocks the calling thread between attempts.
pub trait Sleep: Debug + Send + Sync {
    /// Blocks for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Sleeps with [`std::thread::sleep`].
#[non_exhaustive]
#[derive(Debug, Default)]
pub struct ThreadSleep;

impl ThreadSleep {
    /// Creates a new `ThreadSleep`.
    pub fn new() -> Self {
        ThreadSleep
    }
}

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// A shareable [`Sleep`]. Defaults to [`ThreadSleep`].
#[derive(Clone, Debug)]
pub struct SharedSleep(Arc<dyn Sleep>);

impl SharedSleep {
    /// Wraps a sleep implementation.
    pub fn new(sleep: impl Sleep + 'static) -> Self {
        Self(Arc::new(sleep))
    }
}

impl Default for SharedSleep {
    fn default() -> Self {
        Self::new(ThreadSleep::new())
    }
}

impl Sleep for SharedSleep {
    fn sleep(&self, duration: Duration) {
        self.0.sleep(duration)
    }
}
