// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::fmt;
use std::sync::{Mutex, PoisonError};

/// Decides whether a sampled metric should be sent.
///
/// The random generator is seeded once, when the sampler is created, and
/// then shared by every thread using it.
pub struct Sampler {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl Sampler {
    /// Create a sampler backed by a `StdRng` seeded from OS entropy.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a sampler using the given generator, useful for getting
    /// deterministic sampling in tests.
    pub fn from_rng<R>(rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        Sampler {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Return `true` if a metric with the given rate should be sent.
    ///
    /// Rates at or above `1.0` are always sent and rates at or below `0.0`
    /// never are. The generator is only consulted in between.
    pub fn should_send(&self, rate: f32) -> bool {
        if rate >= 1.0 {
            return true;
        }
        if rate.is_nan() || rate <= 0.0 {
            return false;
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen::<f32>() <= rate
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler").finish_non_exhaustive()
    }
}
