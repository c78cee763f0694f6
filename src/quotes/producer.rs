use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::{
    fare::{FallbackEstimator, ThreadRngSurge, VehicleClass},
    quotes::{Confidence, FareQuote, Provenance},
    shared::Coordinate,
};

/// Internal-only: a producer catches this itself and substitutes a
/// fallback quote list. Never propagated to [`crate::quotes::QuoteAggregator`]'s
/// caller.
#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream returned an error: {0}")]
    Upstream(String),
    #[error("request build failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// One upstream ride-hailing platform. Implementations are expected to be
/// slow and unreliable; `quote` must never propagate an error to its
/// caller — on internal failure it falls back to [`FallbackEstimator`] and
/// marks the result `provenance = estimate, confidence = medium`.
#[async_trait]
pub trait QuoteProducer: Send + Sync {
    fn platform_name(&self) -> &str;

    /// The vehicle classes this platform offers, used both for live quotes
    /// and as the fallback menu when the platform is unreachable.
    fn vehicle_menu(&self) -> &[VehicleClass];

    async fn quote(&self, pickup: Coordinate, drop: Coordinate) -> Vec<FareQuote>;
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn fallback_quotes(platform: &str, currency: &str, menu: &[VehicleClass], pickup: Coordinate, drop: Coordinate) -> Vec<FareQuote> {
    let surge = ThreadRngSurge;
    let estimator = FallbackEstimator::new(&surge);
    estimator
        .estimate(&pickup, &drop, menu)
        .into_iter()
        .map(|(class, price)| FareQuote {
            platform: platform.to_string(),
            vehicle_class: class,
            price_minor_units: price,
            currency: currency.to_string(),
            eta_label: None,
            confidence: Confidence::Medium,
            provenance: Provenance::Estimate,
            timestamp_ms: now_ms(),
        })
        .collect()
}

/// A producer backed by a remote HTTP quote endpoint. Concrete platform
/// integrations (anti-automation handling, session cookies, scraping) are
/// out of scope; this adapter models the "opaque HTTP quote source" shape
/// every real producer narrows down to.
pub struct HttpQuoteProducer {
    platform: String,
    endpoint: String,
    currency: String,
    menu: Vec<VehicleClass>,
    client: reqwest::Client,
}

impl HttpQuoteProducer {
    pub fn new(platform: impl Into<String>, endpoint: impl Into<String>, currency: impl Into<String>, menu: Vec<VehicleClass>, timeout: std::time::Duration) -> Self {
        Self {
            platform: platform.into(),
            endpoint: endpoint.into(),
            currency: currency.into(),
            menu,
            client: reqwest::Client::builder().timeout(timeout).build().unwrap_or_default(),
        }
    }

    async fn fetch(&self, pickup: Coordinate, drop: Coordinate) -> Result<Vec<FareQuote>, ProducerError> {
        #[derive(serde::Deserialize)]
        struct RemoteQuote {
            vehicle_class: String,
            price_minor_units: i64,
            eta_label: Option<String>,
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("pickup_lat", pickup.lat),
                ("pickup_lng", pickup.lng),
                ("drop_lat", drop.lat),
                ("drop_lng", drop.lng),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProducerError::Upstream(response.status().to_string()));
        }

        let remote: Vec<RemoteQuote> = response.json().await?;
        let now = now_ms();
        Ok(remote
            .into_iter()
            .filter_map(|r| {
                let class = self.menu.iter().copied().find(|c| c.as_str() == r.vehicle_class)?;
                Some(FareQuote {
                    platform: self.platform.clone(),
                    vehicle_class: class,
                    price_minor_units: r.price_minor_units,
                    currency: self.currency.clone(),
                    eta_label: r.eta_label,
                    confidence: Confidence::High,
                    provenance: Provenance::Live,
                    timestamp_ms: now,
                })
            })
            .collect())
    }
}

#[async_trait]
impl QuoteProducer for HttpQuoteProducer {
    fn platform_name(&self) -> &str {
        &self.platform
    }

    fn vehicle_menu(&self) -> &[VehicleClass] {
        &self.menu
    }

    async fn quote(&self, pickup: Coordinate, drop: Coordinate) -> Vec<FareQuote> {
        match self.fetch(pickup, drop).await {
            Ok(quotes) if !quotes.is_empty() => quotes,
            Ok(_) => {
                warn!(platform = %self.platform, "upstream returned no usable quotes, falling back");
                fallback_quotes(&self.platform, &self.currency, &self.menu, pickup, drop)
            }
            Err(err) => {
                warn!(platform = %self.platform, error = %err, "producer failed, falling back to estimate");
                fallback_quotes(&self.platform, &self.currency, &self.menu, pickup, drop)
            }
        }
    }
}
