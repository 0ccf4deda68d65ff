//! In-process cache store using Moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tasklane_core::{CacheError, CacheStore};

use crate::metrics::CacheMetrics;

/// Valor almacenado junto con su TTL.
#[derive(Clone)]
struct CachedValue {
    bytes: Arc<[u8]>,
    ttl: Duration,
}

/// Expira cada entry segun el TTL con el que fue escrita.
struct EntryTtl;

impl Expiry<String, CachedValue> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Cache de snapshots usando Moka.
/// Thread-safe y async-friendly; cada `set` trae su propio TTL.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use tasklane_core::CacheStore;
/// use tasklane_server::cache::MokaCacheStore;
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = MokaCacheStore::new(10_000);
/// cache.set("task:1", b"{}".to_vec(), Duration::from_secs(300)).await.unwrap();
///
/// if let Ok(Some(bytes)) = cache.get("task:1").await {
///     println!("Cache hit: {} bytes", bytes.len());
/// }
/// # }
/// ```
#[derive(Clone)]
pub struct MokaCacheStore {
    inner: Cache<String, CachedValue>,
    metrics: CacheMetrics,
}

impl MokaCacheStore {
    /// Crea un cache con capacidad maxima de `max_capacity` entries.
    pub fn new(max_capacity: u64) -> Self {
        let metrics = CacheMetrics::new();

        // Configurar listener para evictions
        let eviction_metrics = metrics.clone();
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    moka::notification::RemovalCause::Expired => "ttl",
                    moka::notification::RemovalCause::Size => "capacity",
                    moka::notification::RemovalCause::Explicit => "manual",
                    moka::notification::RemovalCause::Replaced => "replaced",
                };
                eviction_metrics.record_eviction(reason);
            })
            .build();

        Self { inner, metrics }
    }

    /// Retorna el numero aproximado de entries en cache.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Retorna las metricas para acceso externo.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    /// Ejecuta el mantenimiento pendiente (expiraciones, evictions).
    pub async fn sync(&self) {
        self.inner.run_pending_tasks().await;
    }

    fn update_entry_gauge(&self) {
        self.metrics.update_entry_count(self.inner.entry_count());
    }
}

#[async_trait]
impl CacheStore for MokaCacheStore {
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), CacheError> {
        let start = Instant::now();
        let value = CachedValue {
            bytes: value.into(),
            ttl,
        };
        self.inner.insert(key.to_string(), value).await;

        self.metrics.record_operation_duration("set", start.elapsed());
        self.update_entry_gauge();
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let start = Instant::now();
        let result = self.inner.get(key).await;

        if result.is_some() {
            self.metrics.record_hit();
        } else {
            self.metrics.record_miss();
        }
        self.metrics.record_operation_duration("get", start.elapsed());

        Ok(result.map(|value| value.bytes.to_vec()))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let start = Instant::now();
        self.inner.invalidate(key).await;

        self.metrics
            .record_operation_duration("delete", start.elapsed());
        self.update_entry_gauge();
        Ok(())
    }

    fn name(&self) -> &str {
        "moka"
    }
}
