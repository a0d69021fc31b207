use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

use fxhash::{FxHashMap, FxHasher64};
use parking_lot::Mutex;
use tokio::sync::OnceCell;

use crate::{
    http_api::MatrixProviderError, provider::TravelMatrixProvider,
    travel_matrices::TravelMatrices,
};

fn hash_points<H: Hasher>(points: &[geo_types::Point], hasher: &mut H) {
    points.len().hash(hasher);
    for point in points {
        hasher.write_u64(point.x().to_bits());
        hasher.write_u64(point.y().to_bits());
    }
}

pub fn cache_key(points: &[geo_types::Point], provider: &TravelMatrixProvider) -> u64 {
    let mut hasher = FxHasher64::default();

    hash_points(points, &mut hasher);
    provider.hash(&mut hasher);

    hasher.finish()
}

/// Shared in-memory matrix cache. Entries are keyed by a digest of the
/// coordinate set and the provider, so concurrent jobs over the same stops
/// share one lookup. An absent key is computed at most once: all concurrent
/// callers for the same key join the single in-flight provider call.
#[derive(Default)]
pub struct MatrixCache {
    entries: Mutex<FxHashMap<u64, Arc<OnceCell<TravelMatrices>>>>,
}

impl MatrixCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_fetch<F, Fut>(
        &self,
        points: &[geo_types::Point],
        provider: &TravelMatrixProvider,
        fetch: F,
    ) -> Result<TravelMatrices, MatrixProviderError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<TravelMatrices, MatrixProviderError>>,
    {
        let key = cache_key(points, provider);

        // The lock only guards the map itself, never the provider call.
        let cell = Arc::clone(
            self.entries
                .lock()
                .entry(key)
                .or_insert_with(|| Arc::new(OnceCell::new())),
        );

        let matrices = cell.get_or_try_init(fetch).await?;

        Ok(matrices.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn points() -> Vec<geo_types::Point> {
        vec![
            geo_types::Point::new(4.35, 50.85),
            geo_types::Point::new(4.40, 51.21),
        ]
    }

    fn matrices() -> TravelMatrices {
        TravelMatrices::new(2, vec![0.0, 5.0, 5.0, 0.0], vec![0.0, 9.0, 9.0, 0.0])
    }

    #[tokio::test]
    async fn test_concurrent_lookups_fetch_once() {
        let cache = Arc::new(MatrixCache::new());
        let calls = Arc::new(AtomicU32::new(0));
        let provider = TravelMatrixProvider::Haversine { speed_kmh: 50.0 };

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let provider = provider.clone();

            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(&points(), &provider, || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(matrices())
                    })
                    .await
            }));
        }

        for handle in handles {
            let result = handle.await.unwrap().unwrap();
            assert_eq!(result.distance_meters(0, 1), 5.0);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_providers_get_distinct_entries() {
        let cache = MatrixCache::new();

        for speed in [30.0, 50.0] {
            let provider = TravelMatrixProvider::Haversine { speed_kmh: speed };
            cache
                .get_or_fetch(&points(), &provider, || async { Ok(matrices()) })
                .await
                .unwrap();
        }

        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = MatrixCache::new();
        let provider = TravelMatrixProvider::Haversine { speed_kmh: 50.0 };

        let result = cache
            .get_or_fetch(&points(), &provider, || async {
                Err(MatrixProviderError::NotConfigured)
            })
            .await;
        assert!(result.is_err());

        // The next caller retries instead of observing a poisoned entry.
        let result = cache
            .get_or_fetch(&points(), &provider, || async { Ok(matrices()) })
            .await;
        assert!(result.is_ok());
    }
}
