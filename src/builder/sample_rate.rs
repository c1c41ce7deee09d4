// Statline - A StatsD client with a metrics-over-logging bridge
//
// Copyright 2026 Statline Developers
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::types::MetricError;
use std::fmt::Write;

/// Validated sample rate in `[0.0, 1.0]`.
///
/// A rate of `0.0` is valid and means the metric is never sent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRate(f32);

impl SampleRate {
    pub const FULL: SampleRate = SampleRate(1.0);

    pub fn value(&self) -> f32 {
        self.0
    }

    pub fn is_full(&self) -> bool {
        self.0 >= 1.0
    }

    /// Write `|@<rate>` with at most six decimals and trailing zeros removed.
    ///
    /// Nothing is written for a full rate. A non-zero rate too small for six
    /// decimals is written in full so it never reads as zero.
    pub(crate) fn write_suffix(&self, out: &mut String) {
        if self.is_full() {
            return;
        }

        let start = out.len();
        let _ = write!(out, "|@{:.6}", self.0);

        while out.len() > start + 3 && out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }

        if self.0 > 0.0 && &out[start..] == "|@0" {
            out.truncate(start);
            let _ = write!(out, "|@{}", self.0);
        }
    }
}

impl TryFrom<f32> for SampleRate {
    type Error = MetricError;

    fn try_from(rate: f32) -> Result<Self, Self::Error> {
        if (0.0..=1.0).contains(&rate) {
            Ok(SampleRate(rate))
        } else {
            Err(MetricError::InvalidInput("sample rate must be between 0.0 and 1.0"))
        }
    }
}
