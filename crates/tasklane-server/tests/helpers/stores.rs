//! Stores instrumentados para tests del cache-aside.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tasklane_core::{
    CacheError, CacheStore, NewTask, Result, Task, TaskFilter, TaskId, TaskStore, UserId,
};
use tasklane_server::cache::MokaCacheStore;
use tasklane_server::store::MemoryTaskStore;
use tokio::sync::{Notify, oneshot};

type Gate = (oneshot::Sender<()>, Arc<Notify>);

/// MemoryTaskStore que cuenta lecturas y puede pausar una lectura.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryTaskStore,
    gets: AtomicUsize,
    lists: AtomicUsize,
    gate: Mutex<Option<Gate>>,
}

impl CountingStore {
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        Self {
            inner: MemoryTaskStore::with_tasks(tasks),
            ..Self::default()
        }
    }

    /// Numero de llamadas a `get_by_id`.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// Numero de llamadas a `list_by_user`.
    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    /// La proxima lectura avisa por el receiver despues de leer y espera
    /// a que se notifique el `Notify` antes de retornar.
    pub fn pause_next_get(&self) -> (oneshot::Receiver<()>, Arc<Notify>) {
        let (reached_tx, reached_rx) = oneshot::channel();
        let release = Arc::new(Notify::new());
        *self.gate.lock() = Some((reached_tx, Arc::clone(&release)));
        (reached_rx, release)
    }
}

#[async_trait]
impl TaskStore for CountingStore {
    async fn create(&self, task: NewTask) -> Result<Task> {
        self.inner.create(task).await
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Task> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let result = self.inner.get_by_id(id).await;

        let gate = self.gate.lock().take();
        if let Some((reached, release)) = gate {
            let _ = reached.send(());
            release.notified().await;
        }
        result
    }

    async fn update(&self, task: &Task) -> Result<()> {
        self.inner.update(task).await
    }

    async fn delete(&self, id: TaskId) -> Result<()> {
        self.inner.delete(id).await
    }

    async fn list_by_user(&self, user_id: UserId, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.inner.list_by_user(user_id, filter).await
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Operacion registrada por RecordingCache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOp {
    Set(String),
    Get(String),
    Delete(String),
}

/// MokaCacheStore que registra cada operacion.
pub struct RecordingCache {
    inner: MokaCacheStore,
    ops: Mutex<Vec<CacheOp>>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self {
            inner: MokaCacheStore::new(1_000),
            ops: Mutex::new(Vec::new()),
        }
    }

    pub fn ops(&self) -> Vec<CacheOp> {
        self.ops.lock().clone()
    }

    /// Numero de `set` sobre `key`.
    pub fn sets_of(&self, key: &str) -> usize {
        self.count(|op| matches!(op, CacheOp::Set(k) if k == key))
    }

    /// Numero de `delete` sobre `key`.
    pub fn deletes_of(&self, key: &str) -> usize {
        self.count(|op| matches!(op, CacheOp::Delete(k) if k == key))
    }

    /// Lee sin registrar la operacion.
    pub async fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.get(key).await.unwrap()
    }

    fn count(&self, pred: impl Fn(&CacheOp) -> bool) -> usize {
        self.ops.lock().iter().filter(|op| pred(op)).count()
    }
}

#[async_trait]
impl CacheStore for RecordingCache {
    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> std::result::Result<(), CacheError> {
        self.ops.lock().push(CacheOp::Set(key.to_string()));
        self.inner.set(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> std::result::Result<Option<Vec<u8>>, CacheError> {
        self.ops.lock().push(CacheOp::Get(key.to_string()));
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> std::result::Result<(), CacheError> {
        self.ops.lock().push(CacheOp::Delete(key.to_string()));
        self.inner.delete(key).await
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Cache que falla en toda operacion.
#[derive(Default)]
pub struct FailingCache {
    calls: AtomicUsize,
}

impl FailingCache {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail(&self) -> CacheError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CacheError::unavailable("connection refused")
    }
}

#[async_trait]
impl CacheStore for FailingCache {
    async fn set(
        &self,
        _key: &str,
        _value: Vec<u8>,
        _ttl: Duration,
    ) -> std::result::Result<(), CacheError> {
        Err(self.fail())
    }

    async fn get(&self, _key: &str) -> std::result::Result<Option<Vec<u8>>, CacheError> {
        Err(self.fail())
    }

    async fn delete(&self, _key: &str) -> std::result::Result<(), CacheError> {
        Err(self.fail())
    }

    fn name(&self) -> &str {
        "failing"
    }
}
