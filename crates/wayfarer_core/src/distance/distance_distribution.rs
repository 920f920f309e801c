use fxhash::FxHashMap;
use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::DistributionError,
    problem::{meters::Meters, mode::Mode, purpose::Purpose},
};

const CDF_TOLERANCE: f64 = 1e-9;

/// Weighted empirical distribution of observed distances within one travel
/// time bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct EmpiricalCdf {
    values: Vec<f64>,
    cdf: Vec<f64>,
}

impl EmpiricalCdf {
    pub fn new(values: Vec<f64>, cdf: Vec<f64>) -> Self {
        Self { values, cdf }
    }

    /// Builds the distribution from unsorted `(distance, weight)` observations.
    pub fn from_weighted(mut observations: Vec<(f64, f64)>) -> Option<Self> {
        observations.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total = observations.iter().map(|(_, weight)| weight).sum::<f64>();
        if observations.is_empty() || total <= 0.0 {
            return None;
        }

        let mut cumulative = 0.0;
        let mut values = Vec::with_capacity(observations.len());
        let mut cdf = Vec::with_capacity(observations.len());

        for (value, weight) in observations {
            cumulative += weight;
            values.push(value);
            cdf.push(cumulative / total);
        }

        Some(Self { values, cdf })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn cdf(&self) -> &[f64] {
        &self.cdf
    }

    fn validate(&self, mode: Mode, bucket: usize) -> Result<(), DistributionError> {
        if self.values.is_empty() {
            return Err(DistributionError::EmptyBucket { mode, bucket });
        }

        if self.values.len() != self.cdf.len() {
            return Err(DistributionError::LengthMismatch {
                mode,
                bucket,
                values: self.values.len(),
                cdf: self.cdf.len(),
            });
        }

        if self.values.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(DistributionError::UnsortedValues { mode, bucket });
        }

        let in_range = self.cdf.iter().all(|p| (0.0..=1.0 + CDF_TOLERANCE).contains(p));
        let monotonic = self.cdf.windows(2).all(|pair| pair[0] <= pair[1]);
        let complete = self
            .cdf
            .last()
            .is_some_and(|last| (last - 1.0).abs() < CDF_TOLERANCE);

        if !(in_range && monotonic && complete) {
            return Err(DistributionError::InvalidCdf { mode, bucket });
        }

        Ok(())
    }

    /// Inverse transform sampling for `u` in `[0, 1)`.
    pub fn quantile(&self, u: f64, interpolate: bool) -> f64 {
        let index = self
            .cdf
            .partition_point(|&p| p < u)
            .min(self.values.len() - 1);

        if !interpolate || index == 0 {
            return self.values[index];
        }

        let (lower_p, upper_p) = (self.cdf[index - 1], self.cdf[index]);
        let (lower, upper) = (self.values[index - 1], self.values[index]);

        if upper_p <= lower_p {
            return upper;
        }

        lower + (upper - lower) * (u - lower_p) / (upper_p - lower_p)
    }

    /// Skews the cumulative probabilities towards longer (`factor > 0`) or
    /// shorter (`factor < 0`) distances.
    fn resample(&mut self, factor: f64) {
        let n = self.cdf.len() as f64;

        for (k, p) in self.cdf.iter_mut().enumerate() {
            let position = (k + 1) as f64 / n;
            *p *= if factor >= 0.0 {
                1.0 + factor * position
            } else {
                1.0 + factor.abs() - factor.abs() * position
            };
        }

        if let Some(&last) = self.cdf.last()
            && last > 0.0
        {
            self.cdf.iter_mut().for_each(|p| *p /= last);
        }
    }
}

/// Distances observed for one mode, bucketed by travel time.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceDistribution {
    mode: Mode,
    /// Upper bounds in seconds, the last one is infinite.
    bounds: Vec<f64>,
    buckets: Vec<EmpiricalCdf>,
}

impl DistanceDistribution {
    pub fn new(
        mode: Mode,
        bounds: Vec<f64>,
        buckets: Vec<EmpiricalCdf>,
    ) -> Result<Self, DistributionError> {
        if bounds.is_empty() {
            return Err(DistributionError::NoBuckets { mode });
        }

        if bounds.len() != buckets.len() {
            return Err(DistributionError::BucketCountMismatch {
                mode,
                bounds: bounds.len(),
                buckets: buckets.len(),
            });
        }

        if bounds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(DistributionError::UnsortedBounds { mode });
        }

        if bounds.last() != Some(&f64::INFINITY) {
            return Err(DistributionError::MissingInfiniteBound { mode });
        }

        for (bucket, cdf) in buckets.iter().enumerate() {
            cdf.validate(mode, bucket)?;
        }

        Ok(Self {
            mode,
            bounds,
            buckets,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    pub fn buckets(&self) -> &[EmpiricalCdf] {
        &self.buckets
    }

    /// Index of the bucket with the smallest upper bound not below `travel_time`.
    pub fn bucket_index(&self, travel_time: SignedDuration) -> usize {
        let seconds = travel_time.as_secs_f64();
        self.bounds
            .partition_point(|&bound| bound < seconds)
            .min(self.bounds.len() - 1)
    }

    pub fn bucket(&self, travel_time: SignedDuration) -> &EmpiricalCdf {
        &self.buckets[self.bucket_index(travel_time)]
    }

    pub fn sample(&self, travel_time: SignedDuration, u: f64, interpolate: bool) -> Meters {
        Meters::new(self.bucket(travel_time).quantile(u, interpolate))
    }
}

/// A trip observed in the household travel survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SurveyTrip {
    pub mode: Mode,
    #[schemars(with = "String")]
    pub travel_time: SignedDuration,
    /// Beeline distance between both activities.
    pub distance: Meters,
    pub weight: f64,
    pub preceding_purpose: Purpose,
    pub following_purpose: Purpose,
}

impl SurveyTrip {
    /// Trips between two anchors say nothing about secondary destinations.
    pub fn is_between_anchors(&self) -> bool {
        self.preceding_purpose.is_fixed() && self.following_purpose.is_fixed()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceDistributions {
    distributions: FxHashMap<Mode, DistanceDistribution>,
}

impl DistanceDistributions {
    pub const DEFAULT_BIN_SIZE: usize = 20;

    pub fn new(distributions: Vec<DistanceDistribution>) -> Self {
        Self {
            distributions: distributions
                .into_iter()
                .map(|distribution| (distribution.mode(), distribution))
                .collect(),
        }
    }

    pub fn get(&self, mode: Mode) -> Option<&DistanceDistribution> {
        self.distributions.get(&mode)
    }

    /// Distributions sorted by mode.
    pub fn iter(&self) -> impl Iterator<Item = &DistanceDistribution> {
        Mode::ALL.iter().filter_map(|mode| self.distributions.get(mode))
    }

    /// Builds one distribution per observed mode. Travel time buckets hold
    /// about `bin_size` distinct observations each.
    pub fn from_survey(
        trips: &[SurveyTrip],
        bin_size: usize,
    ) -> Result<Self, DistributionError> {
        let mut by_mode: FxHashMap<Mode, Vec<&SurveyTrip>> = FxHashMap::default();

        for trip in trips.iter().filter(|trip| !trip.is_between_anchors()) {
            by_mode.entry(trip.mode).or_default().push(trip);
        }

        let mut distributions = Vec::with_capacity(by_mode.len());

        for mode in Mode::ALL {
            let Some(mode_trips) = by_mode.get(&mode) else {
                continue;
            };

            let mut travel_times = mode_trips
                .iter()
                .map(|trip| trip.travel_time.as_secs_f64())
                .collect::<Vec<_>>();
            travel_times.sort_by(f64::total_cmp);

            let bounds = travel_time_bounds(&travel_times, bin_size);

            let mut lower = f64::NEG_INFINITY;
            let mut buckets = Vec::with_capacity(bounds.len());
            for (bucket, &upper) in bounds.iter().enumerate() {
                let observations = mode_trips
                    .iter()
                    .filter(|trip| {
                        let seconds = trip.travel_time.as_secs_f64();
                        seconds > lower && seconds <= upper
                    })
                    .map(|trip| (trip.distance.value(), trip.weight))
                    .collect::<Vec<_>>();

                if observations.is_empty() {
                    return Err(DistributionError::EmptyBucket { mode, bucket });
                }

                buckets.push(
                    EmpiricalCdf::from_weighted(observations)
                        .ok_or(DistributionError::NoWeight { mode })?,
                );
                lower = upper;
            }

            debug!(
                "{mode}: {} survey trips in {} travel time buckets",
                mode_trips.len(),
                buckets.len()
            );

            distributions.push(DistanceDistribution::new(mode, bounds, buckets)?);
        }

        Ok(Self::new(distributions))
    }

    /// Calibrates the distribution of `mode`, see [`EmpiricalCdf`] skewing.
    pub fn resample(&mut self, mode: Mode, factor: f64) {
        if let Some(distribution) = self.distributions.get_mut(&mode) {
            distribution
                .buckets
                .iter_mut()
                .for_each(|bucket| bucket.resample(factor));
        }
    }
}

/// Upper bounds closing a bucket after every `bin_size` distinct sorted values.
fn travel_time_bounds(sorted_values: &[f64], bin_size: usize) -> Vec<f64> {
    let mut bounds = Vec::new();
    let mut count = 0;
    let mut previous_bound = None;

    for &value in sorted_values {
        if previous_bound == Some(value) {
            continue;
        }

        if count < bin_size {
            count += 1;
        } else {
            count = 0;
            bounds.push(value);
            previous_bound = Some(value);
        }
    }

    match bounds.last_mut() {
        Some(last) => *last = f64::INFINITY,
        None => bounds.push(f64::INFINITY),
    }

    bounds
}
