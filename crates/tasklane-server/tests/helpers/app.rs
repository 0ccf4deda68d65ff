//! Construccion de la aplicacion para tests.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use tasklane_core::{CacheStore, TaskStore};
use tasklane_server::cache::MokaCacheStore;
use tasklane_server::limiter::SlidingWindowLimiter;
use tasklane_server::service::TaskService;
use tasklane_server::store::MemoryTaskStore;
use tasklane_server::{AppState, create_router};
use tasklane_worker::{Job, Pool, PoolConfig};
use tokio::sync::oneshot;

use super::client::TestClient;

/// Aplicacion completa sobre stores en memoria.
pub struct TestApp {
    pub client: TestClient,
    pub service: TaskService,
    pub limiter: Arc<SlidingWindowLimiter>,
}

impl TestApp {
    /// Aplicacion con el limite de requests dado por ventana de un minuto.
    pub fn with_limit(limit: usize) -> Self {
        Self::build(
            limit,
            Arc::new(MemoryTaskStore::new()),
            Arc::new(MokaCacheStore::new(1_000)),
        )
    }

    /// Aplicacion sobre stores arbitrarios, con limite holgado.
    pub fn with_stores(store: Arc<dyn TaskStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self::build(1_000, store, cache)
    }

    fn build(limit: usize, store: Arc<dyn TaskStore>, cache: Arc<dyn CacheStore>) -> Self {
        // A single worker keeps cache jobs in submission order.
        let pool = Arc::new(Pool::new(PoolConfig::new(1, 64)).unwrap());
        let service = TaskService::new(store, cache, pool, Duration::from_secs(300));
        let limiter = Arc::new(SlidingWindowLimiter::new(
            NonZeroUsize::new(limit).unwrap(),
            Duration::from_secs(60),
        ));

        let router = create_router(AppState::new(service.clone()), Arc::clone(&limiter));

        Self {
            client: TestClient::new(router),
            service,
            limiter,
        }
    }

    /// Espera a que terminen los cache jobs encolados hasta ahora.
    pub async fn settle(&self) {
        settle(self.service.pool()).await;
    }
}

/// Crea un TestClient con la aplicacion por defecto.
pub fn client() -> TestClient {
    TestApp::with_limit(1_000).client
}

/// Encola una barrera y espera a que corra. Con un solo worker, todo lo
/// encolado antes ya termino.
pub async fn settle(pool: &Pool) {
    let (done_tx, done_rx) = oneshot::channel();
    pool.submit(Job::new("barrier", move |_ctx| async move {
        let _ = done_tx.send(());
        Ok(())
    }))
    .await
    .expect("pool should accept the barrier");

    tokio::time::timeout(Duration::from_secs(5), done_rx)
        .await
        .expect("barrier should run")
        .expect("barrier sender dropped");
}
