use std::{sync::Arc, time::Duration as StdDuration};

use dashmap::DashMap;
use futures::future::join_all;
use tracing::debug;

use crate::{
    quotes::{producer::QuoteProducer, FareQuote, Provenance},
    shared::Coordinate,
};

type CacheKey = (i64, i64, i64, i64);

struct CacheEntry {
    quotes: Vec<FareQuote>,
    cached_at: std::time::Instant,
}

/// Fan-out/fan-in over registered [`QuoteProducer`]s with a coarsened-
/// coordinate cache. Never fails: every producer already swallows its own
/// errors, so `get_quotes` always returns (a possibly-estimate-only) list.
pub struct QuoteAggregator {
    producers: Vec<Arc<dyn QuoteProducer>>,
    cache: DashMap<CacheKey, CacheEntry>,
    ttl: StdDuration,
}

impl QuoteAggregator {
    pub fn new(producers: Vec<Arc<dyn QuoteProducer>>, ttl: StdDuration) -> Self {
        Self {
            producers,
            cache: DashMap::new(),
            ttl,
        }
    }

    fn cache_key(pickup: &Coordinate, drop: &Coordinate) -> CacheKey {
        let (p_lat, p_lng) = pickup.coarsened();
        let (d_lat, d_lng) = drop.coarsened();
        (p_lat, p_lng, d_lat, d_lng)
    }

    pub async fn get_quotes(&self, pickup: Coordinate, drop: Coordinate) -> Vec<FareQuote> {
        let key = Self::cache_key(&pickup, &drop);

        if let Some(entry) = self.cache.get(&key) {
            if entry.cached_at.elapsed() < self.ttl {
                debug!(?key, "quote cache hit");
                return entry
                    .quotes
                    .iter()
                    .cloned()
                    .map(|mut q| {
                        q.provenance = Provenance::Cached;
                        q
                    })
                    .collect();
            }
        }
        debug!(?key, "quote cache miss, fanning out to producers");

        let tasks = self.producers.iter().cloned().map(|producer| {
            tokio::spawn(async move { producer.quote(pickup, drop).await })
        });
        let joined = join_all(tasks).await;

        let quotes: Vec<FareQuote> = joined
            .into_iter()
            .flat_map(|res| res.unwrap_or_default())
            .collect();

        if !quotes.is_empty() {
            self.cache.insert(
                key,
                CacheEntry {
                    quotes: quotes.clone(),
                    cached_at: std::time::Instant::now(),
                },
            );
        }

        quotes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fare::VehicleClass;
    use crate::quotes::Confidence;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProducer {
        name: &'static str,
        menu: Vec<VehicleClass>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl QuoteProducer for FixedProducer {
        fn platform_name(&self) -> &str {
            self.name
        }
        fn vehicle_menu(&self) -> &[VehicleClass] {
            &self.menu
        }
        async fn quote(&self, _pickup: Coordinate, _drop: Coordinate) -> Vec<FareQuote> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            vec![FareQuote {
                platform: self.name.to_string(),
                vehicle_class: self.menu[0],
                price_minor_units: 120,
                currency: "INR".to_string(),
                eta_label: None,
                confidence: Confidence::High,
                provenance: Provenance::Live,
                timestamp_ms: 0,
            }]
        }
    }

    #[tokio::test]
    async fn second_call_within_ttl_is_served_from_cache() {
        let producer = Arc::new(FixedProducer {
            name: "alpha",
            menu: vec![VehicleClass::Mini],
            calls: AtomicUsize::new(0),
        });
        let aggregator = QuoteAggregator::new(vec![producer], StdDuration::from_secs(30));
        let pickup = Coordinate::new(28.70, 77.10).unwrap();
        let drop = Coordinate::new(28.75, 77.15).unwrap();

        let first = aggregator.get_quotes(pickup, drop).await;
        assert_eq!(first[0].provenance, Provenance::Live);

        let second = aggregator.get_quotes(pickup, drop).await;
        assert_eq!(second[0].provenance, Provenance::Cached);
        assert_eq!(second[0].price_minor_units, first[0].price_minor_units);
    }

    #[tokio::test]
    async fn partial_failure_still_returns_other_producers_quotes() {
        struct FailingProducer;
        #[async_trait]
        impl QuoteProducer for FailingProducer {
            fn platform_name(&self) -> &str {
                "beta"
            }
            fn vehicle_menu(&self) -> &[VehicleClass] {
                &[]
            }
            async fn quote(&self, _pickup: Coordinate, _drop: Coordinate) -> Vec<FareQuote> {
                Vec::new()
            }
        }

        let good = Arc::new(FixedProducer {
            name: "alpha",
            menu: vec![VehicleClass::Mini],
            calls: AtomicUsize::new(0),
        });
        let aggregator = QuoteAggregator::new(vec![good, Arc::new(FailingProducer)], StdDuration::from_secs(30));
        let quotes = aggregator
            .get_quotes(Coordinate::new(0.0, 0.0).unwrap(), Coordinate::new(0.1, 0.1).unwrap())
            .await;
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].platform, "alpha");
    }
}
