use std::collections::HashMap;
use std::fmt;

use crate::data::InstrumentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationTemporality {
    Cumulative,
    Delta,
}

impl AggregationTemporality {
    /// OTLP enum value.
    pub fn otlp_value(self) -> i32 {
        match self {
            AggregationTemporality::Delta => 1,
            AggregationTemporality::Cumulative => 2,
        }
    }
}

/// Picks a temporality for each instrument kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationTemporalitySelector {
    AlwaysCumulative,
    DeltaPreferred,
    LowMemory,
}

impl AggregationTemporalitySelector {
    pub fn always_cumulative() -> Self {
        AggregationTemporalitySelector::AlwaysCumulative
    }

    pub fn delta_preferred() -> Self {
        AggregationTemporalitySelector::DeltaPreferred
    }

    pub fn low_memory() -> Self {
        AggregationTemporalitySelector::LowMemory
    }

    /// Map a configured preference (`cumulative`, `delta`, `lowmemory`).
    pub fn from_preference(preference: &str) -> Option<Self> {
        match preference {
            "cumulative" => Some(Self::AlwaysCumulative),
            "delta" => Some(Self::DeltaPreferred),
            "lowmemory" => Some(Self::LowMemory),
            _ => None,
        }
    }

    pub fn select(self, instrument: InstrumentType) -> AggregationTemporality {
        match self {
            AggregationTemporalitySelector::AlwaysCumulative => AggregationTemporality::Cumulative,
            AggregationTemporalitySelector::DeltaPreferred => match instrument {
                InstrumentType::UpDownCounter | InstrumentType::ObservableUpDownCounter => {
                    AggregationTemporality::Cumulative
                }
                _ => AggregationTemporality::Delta,
            },
            AggregationTemporalitySelector::LowMemory => match instrument {
                InstrumentType::Counter | InstrumentType::Histogram => {
                    AggregationTemporality::Delta
                }
                _ => AggregationTemporality::Cumulative,
            },
        }
    }
}

pub const DEFAULT_BUCKET_BOUNDARIES: [f64; 15] = [
    0.0, 5.0, 10.0, 25.0, 50.0, 75.0, 100.0, 250.0, 500.0, 750.0, 1_000.0, 2_500.0, 5_000.0,
    7_500.0, 10_000.0,
];

#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Instrument-dependent choice.
    Default,
    Drop,
    Sum,
    LastValue,
    ExplicitBucketHistogram { boundaries: Vec<f64> },
    Base2ExponentialBucketHistogram { max_buckets: u32, max_scale: i32 },
}

impl Aggregation {
    pub fn explicit_bucket_histogram() -> Self {
        Aggregation::ExplicitBucketHistogram {
            boundaries: DEFAULT_BUCKET_BOUNDARIES.to_vec(),
        }
    }

    pub fn base2_exponential_bucket_histogram() -> Self {
        Aggregation::Base2ExponentialBucketHistogram {
            max_buckets: 160,
            max_scale: 20,
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregation::Default => f.write_str("DefaultAggregation"),
            Aggregation::Drop => f.write_str("DropAggregation"),
            Aggregation::Sum => f.write_str("SumAggregation"),
            Aggregation::LastValue => f.write_str("LastValueAggregation"),
            Aggregation::ExplicitBucketHistogram { boundaries } => {
                write!(f, "ExplicitBucketHistogramAggregation{{boundaries={boundaries:?}}}")
            }
            Aggregation::Base2ExponentialBucketHistogram {
                max_buckets,
                max_scale,
            } => write!(
                f,
                "Base2ExponentialHistogramAggregation{{maxBuckets={max_buckets},maxScale={max_scale}}}"
            ),
        }
    }
}

/// Per-instrument default aggregation with overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultAggregationSelector {
    overrides: HashMap<InstrumentType, Aggregation>,
}

impl DefaultAggregationSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, instrument: InstrumentType, aggregation: Aggregation) -> Self {
        self.overrides.insert(instrument, aggregation);
        self
    }

    pub fn get(&self, instrument: InstrumentType) -> Aggregation {
        self.overrides
            .get(&instrument)
            .cloned()
            .unwrap_or(Aggregation::Default)
    }
}
