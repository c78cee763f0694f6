pub mod aggregator;
pub mod producer;

pub use aggregator::QuoteAggregator;
pub use producer::QuoteProducer;

use serde::Serialize;

use crate::fare::VehicleClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// How a quote was produced. Wire-serialized under the more descriptive
/// `source` field names in `crates/server`, not these variant names
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    Live,
    Estimate,
    Cached,
}

#[derive(Debug, Clone, Serialize)]
pub struct FareQuote {
    pub platform: String,
    pub vehicle_class: VehicleClass,
    pub price_minor_units: i64,
    pub currency: String,
    pub eta_label: Option<String>,
    pub confidence: Confidence,
    #[serde(skip)]
    pub provenance: Provenance,
    pub timestamp_ms: u64,
}

impl serde::Serialize for VehicleClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
