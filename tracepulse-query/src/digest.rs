// Copyright 2025 Tracepulse (https://github.com/tracepulse)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! T-Digest - Mergeable Quantile Estimation
//!
//! A bounded-size summary of a weighted duration sample with:
//! - O(1) amortized weighted insertion
//! - O(compression) space regardless of sample size
//! - Mergeable across time buckets without re-scanning raw samples
//!
//! Merging is what makes the two-stage aggregation work: per-bucket
//! digests roll up into one group digest, exact for counts and bounded
//! error for quantiles (tightest near the tails).
//!
//! Reference: Dunning & Ertl, "Computing Extremely Accurate Quantiles
//! Using t-Digests" (2019).
//!
//! Querying an empty digest returns `0.0` for every quantile rather than
//! NaN or an error. Consumers render "no data" and "zero latency" the
//! same way, so the distinction is carried by the bucket's count, not by
//! the quantile vector.

use serde::{Deserialize, Serialize};

/// A cluster of nearby samples, represented by its weighted mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Centroid {
    mean: f64,
    weight: f64,
}

impl Centroid {
    fn new(mean: f64, weight: f64) -> Self {
        Self { mean, weight }
    }

    fn absorb(&mut self, other: &Centroid) {
        let total = self.weight + other.weight;
        if total > 0.0 {
            self.mean = (self.mean * self.weight + other.mean * other.weight) / total;
            self.weight = total;
        }
    }
}

/// Mergeable weighted quantile summary (t-digest family).
///
/// `compression` bounds the number of retained centroids; quantile error
/// is O(1/compression) with better accuracy near 0 and 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TDigest {
    compression: f64,
    /// Compressed centroids, sorted by mean.
    centroids: Vec<Centroid>,
    /// Unprocessed (value, weight) pairs, folded in on compress.
    buffer: Vec<(f64, f64)>,
    total_weight: f64,
    min: f64,
    max: f64,
}

impl TDigest {
    pub fn new(compression: f64) -> Self {
        debug_assert!(compression > 0.0);
        Self {
            compression: compression.max(1.0),
            centroids: Vec::new(),
            buffer: Vec::new(),
            total_weight: 0.0,
            min: f64::MAX,
            max: f64::MIN,
        }
    }

    /// True when no weight has been accumulated.
    pub fn is_empty(&self) -> bool {
        self.total_weight <= 0.0
    }

    /// Total inserted weight.
    pub fn weight(&self) -> f64 {
        self.total_weight
    }

    /// Insert a value with the given weight. Raw rows insert weight 1;
    /// pre-aggregated rows insert their row count. Non-finite values and
    /// non-positive weights are ignored.
    pub fn insert(&mut self, value: f64, weight: f64) {
        if !value.is_finite() || !weight.is_finite() || weight <= 0.0 {
            return;
        }

        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.total_weight += weight;
        self.buffer.push((value, weight));

        if self.buffer.len() >= self.buffer_capacity() {
            self.compress();
        }
    }

    /// Fold another digest into this one. Order-insensitive up to the
    /// structure's approximation error.
    pub fn merge(&mut self, other: &TDigest) {
        if other.is_empty() {
            return;
        }

        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.total_weight += other.total_weight;

        self.buffer
            .extend(other.centroids.iter().map(|c| (c.mean, c.weight)));
        self.buffer.extend(other.buffer.iter().copied());
        self.compress();
    }

    /// Exact maximum of inserted values, `0.0` when empty.
    pub fn max(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.max
        }
    }

    /// Estimate the value at quantile `q` in `[0, 1]`.
    ///
    /// An empty digest returns `0.0` (defined underflow, never NaN).
    pub fn quantile(&mut self, q: f64) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.compress();

        let q = q.clamp(0.0, 1.0);
        if q == 0.0 {
            return self.min;
        }
        if q == 1.0 {
            return self.max;
        }

        let n = self.centroids.len();
        if n == 1 {
            return self.centroids[0].mean;
        }

        // Each centroid's mass is centered on its mean; interpolate
        // between neighboring centers on the cumulative weight axis.
        let target = q * self.total_weight;
        let mut cum = 0.0;

        for i in 0..n {
            let c = self.centroids[i];
            let center = cum + c.weight / 2.0;

            if target <= center {
                if i == 0 {
                    // Below the first center: interpolate from min.
                    let frac = target / center.max(f64::MIN_POSITIVE);
                    return self.min + frac * (c.mean - self.min);
                }
                let prev = self.centroids[i - 1];
                let prev_center = cum - prev.weight / 2.0;
                let span = (center - prev_center).max(f64::MIN_POSITIVE);
                let frac = (target - prev_center) / span;
                return prev.mean + frac * (c.mean - prev.mean);
            }
            cum += c.weight;
        }

        // Above the last center: interpolate toward max.
        let last = self.centroids[n - 1];
        let last_center = cum - last.weight / 2.0;
        let span = (self.total_weight - last_center).max(f64::MIN_POSITIVE);
        let frac = (target - last_center) / span;
        last.mean + frac.min(1.0) * (self.max - last.mean)
    }

    /// Estimate several quantiles at once. Empty digests yield a zero
    /// vector of the same length.
    pub fn quantiles(&mut self, qs: &[f64]) -> Vec<f64> {
        qs.iter().map(|&q| self.quantile(q)).collect()
    }

    fn buffer_capacity(&self) -> usize {
        (self.compression * 2.0) as usize
    }

    /// Fold buffered values into the centroid list and re-compress.
    fn compress(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let mut all: Vec<Centroid> = std::mem::take(&mut self.centroids);
        all.extend(
            self.buffer
                .drain(..)
                .map(|(value, weight)| Centroid::new(value, weight)),
        );
        all.sort_by(|a, b| a.mean.partial_cmp(&b.mean).unwrap_or(std::cmp::Ordering::Equal));

        let total = self.total_weight;
        let mut result: Vec<Centroid> = Vec::new();
        let mut weight_so_far = 0.0;
        let mut iter = all.into_iter();
        let mut current = match iter.next() {
            Some(c) => c,
            None => return,
        };

        for c in iter {
            let proposed = current.weight + c.weight;
            let q = ((weight_so_far + proposed / 2.0) / total).clamp(0.0, 1.0);
            // Merging bound from the t-digest merging algorithm: clusters
            // stay small near the tails, where accuracy matters most.
            let limit = (4.0 * total * q * (1.0 - q) / self.compression).max(1.0);

            if proposed <= limit {
                current.absorb(&c);
            } else {
                weight_so_far += current.weight;
                result.push(current);
                current = c;
            }
        }
        result.push(current);
        self.centroids = result;
    }

    /// Number of retained centroids, for size checks.
    #[cfg(test)]
    fn centroid_count(&self) -> usize {
        self.centroids.len()
    }
}
