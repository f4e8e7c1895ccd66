use super::protocol::{
    CHANGED, CHILDREN, CREATE, CreateRequest, GET, PathRequest, REMOVE, REPLACE, RawNode,
    ReplaceRequest, SET, WriteRequest,
};
use super::{DocumentPath, DocumentTree, TreeValue};
use async_trait::async_trait;
use moka::sync::Cache;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tessera_primitive::{
    AsyncPrimitive, Blocking, OperationId, Ordering, PrimitiveContext, PrimitiveEvent,
    PrimitiveResult, PrimitiveType, ProxySession, Serializer,
};
use tessera_types::{Version, Versioned};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Cached node reads plus an invalidation epoch.
///
/// Every invalidation bumps the epoch before evicting. A read fills the cache
/// only if no invalidation happened since it was issued, and evicts its own
/// entry if one slipped in while it was inserting.
struct CacheState {
    entries: Cache<DocumentPath, RawNode>,
    epoch: AtomicU64,
}

impl CacheState {
    fn epoch(&self) -> u64 {
        self.epoch.load(AtomicOrdering::SeqCst)
    }

    fn invalidate(&self, path: &DocumentPath) {
        self.epoch.fetch_add(1, AtomicOrdering::SeqCst);
        self.entries.invalidate(path);
    }

    fn invalidate_all(&self) {
        self.epoch.fetch_add(1, AtomicOrdering::SeqCst);
        self.entries.invalidate_all();
    }

    /// Caches `raw`, read by a request issued at epoch `issued`.
    fn fill(&self, path: &DocumentPath, raw: RawNode, issued: u64) {
        if self.epoch() != issued {
            return;
        }
        self.entries.insert(path.clone(), raw);
        if self.epoch() != issued {
            self.entries.invalidate(path);
        }
    }
}

/// Client-side cache of node reads, kept fresh by local writes and by the
/// tree's change events.
struct ReadCache {
    state: Arc<CacheState>,
    listener: JoinHandle<()>,
}

impl ReadCache {
    fn spawn(capacity: usize, events: broadcast::Receiver<PrimitiveEvent>, name: &str) -> Self {
        let state = Arc::new(CacheState {
            entries: Cache::new(capacity as u64),
            epoch: AtomicU64::new(0),
        });
        let listener = tokio::spawn(invalidate_on_change(
            state.clone(),
            events,
            name.to_string(),
        ));
        Self { state, listener }
    }
}

impl Drop for ReadCache {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

async fn invalidate_on_change(
    state: Arc<CacheState>,
    mut events: broadcast::Receiver<PrimitiveEvent>,
    name: String,
) {
    loop {
        match events.recv().await {
            Ok(event) if event.kind() == CHANGED => match event.decode::<DocumentPath>() {
                Ok(path) => state.invalidate(&path),
                Err(e) => {
                    warn!(%name, "undecodable change event, dropping cache: {e}");
                    state.invalidate_all();
                }
            },
            Ok(_) => {}
            Err(RecvError::Lagged(missed)) => {
                debug!(%name, missed, "change events lagged, dropping cache");
                state.invalidate_all();
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Asynchronous document tree holding values of type `V`.
///
/// Paths are absolute ([`DocumentPath`]). Every node but the root may carry a
/// value, stamped with the [`Version`] of the write that stored it.
pub struct AsyncDocumentTree<V> {
    session: ProxySession,
    serializer: Serializer,
    cache: Option<Arc<ReadCache>>,
    _value: PhantomData<fn() -> V>,
}

impl<V: TreeValue> AsyncDocumentTree<V> {
    pub(crate) fn new(context: PrimitiveContext) -> PrimitiveResult<Self> {
        let session = context.session().clone();
        let cache = match context.cache_capacity() {
            Some(capacity) => Some(Arc::new(ReadCache::spawn(
                capacity,
                session.events()?,
                session.name(),
            ))),
            None => None,
        };
        Ok(Self {
            session,
            serializer: context.serializer().clone(),
            cache,
            _value: PhantomData,
        })
    }

    pub fn session(&self) -> &ProxySession {
        &self.session
    }

    /// The order in which [`children`](Self::children) lists nodes.
    pub fn ordering(&self) -> Option<Ordering> {
        self.session.primitive_type().ordering()
    }

    /// Whether reads of `path` are currently served from the local cache.
    pub fn is_cached(&self, path: &DocumentPath) -> bool {
        self.cache
            .as_ref()
            .is_some_and(|cache| cache.state.entries.contains_key(path))
    }

    /// Number of cached reads, after pending evictions have been applied.
    /// Always zero when caching is disabled.
    pub fn cached_len(&self) -> u64 {
        self.cache.as_ref().map_or(0, |cache| {
            cache.state.entries.run_pending_tasks();
            cache.state.entries.entry_count()
        })
    }

    /// Reads a node. Missing and valueless nodes read as `None`.
    pub async fn get(&self, path: &DocumentPath) -> PrimitiveResult<Option<Versioned<V>>> {
        let raw = match &self.cache {
            Some(cache) => match cache.state.entries.get(path) {
                Some(raw) => raw,
                None => {
                    let issued = cache.state.epoch();
                    let raw = self.fetch(path).await?;
                    cache.state.fill(path, raw.clone(), issued);
                    raw
                }
            },
            None => self.fetch(path).await?,
        };
        self.decode(raw)
    }

    /// Writes a node, creating it if needed. The parent must exist.
    ///
    /// Returns the value it replaced.
    pub async fn set(&self, path: &DocumentPath, value: &V) -> PrimitiveResult<Option<Versioned<V>>> {
        let request = WriteRequest {
            path: path.clone(),
            value: self.serializer.encode(value)?,
        };
        let previous = self.write(path, SET, &request).await?;
        self.decode(previous)
    }

    /// Creates a node under an existing parent. Returns `false` if the node
    /// already exists.
    pub async fn create(&self, path: &DocumentPath, value: &V) -> PrimitiveResult<bool> {
        self.create_node(path, value, false).await
    }

    /// Creates a node along with any missing ancestors, which carry no value.
    pub async fn create_recursive(&self, path: &DocumentPath, value: &V) -> PrimitiveResult<bool> {
        self.create_node(path, value, true).await
    }

    /// Replaces the value of a node only if it is still at `version`.
    pub async fn replace(
        &self,
        path: &DocumentPath,
        value: &V,
        version: Version,
    ) -> PrimitiveResult<bool> {
        let request = ReplaceRequest {
            path: path.clone(),
            value: self.serializer.encode(value)?,
            version,
        };
        self.write(path, REPLACE, &request).await
    }

    /// Removes a leaf and returns its value. Nodes with children are rejected.
    pub async fn remove(&self, path: &DocumentPath) -> PrimitiveResult<Option<Versioned<V>>> {
        let request = PathRequest { path: path.clone() };
        let removed = self.write(path, REMOVE, &request).await?;
        self.decode(removed)
    }

    /// Lists the direct children of a node.
    pub async fn children(
        &self,
        path: &DocumentPath,
    ) -> PrimitiveResult<Vec<(String, Option<Versioned<V>>)>> {
        let request = PathRequest { path: path.clone() };
        let children: Vec<(String, RawNode)> = self.session.invoke(CHILDREN, &request).await?;
        children
            .into_iter()
            .map(|(name, raw)| Ok((name, self.decode(raw)?)))
            .collect()
    }

    /// Adapts this tree into a blocking one driven on `runtime`.
    pub fn sync(self, runtime: Handle) -> DocumentTree<V> {
        DocumentTree::new(Blocking::new(self, runtime))
    }

    async fn create_node(
        &self,
        path: &DocumentPath,
        value: &V,
        recursive: bool,
    ) -> PrimitiveResult<bool> {
        let request = CreateRequest {
            path: path.clone(),
            value: self.serializer.encode(value)?,
            recursive,
        };
        self.write(path, CREATE, &request).await
    }

    async fn fetch(&self, path: &DocumentPath) -> PrimitiveResult<RawNode> {
        self.session
            .invoke(GET, &PathRequest { path: path.clone() })
            .await
    }

    async fn write<Req, Resp>(
        &self,
        path: &DocumentPath,
        id: OperationId,
        request: &Req,
    ) -> PrimitiveResult<Resp>
    where
        Req: serde::Serialize + Sync,
        Resp: serde::de::DeserializeOwned,
    {
        let result = self.session.invoke(id, request).await;
        if let Some(cache) = &self.cache {
            cache.state.invalidate(path);
        }
        result
    }

    fn decode(&self, raw: RawNode) -> PrimitiveResult<Option<Versioned<V>>> {
        raw.map(|node| node.try_map(|bytes| self.serializer.decode::<V>(&bytes)))
            .transpose()
    }
}

impl<V> Clone for AsyncDocumentTree<V> {
    fn clone(&self) -> Self {
        Self {
            session: self.session.clone(),
            serializer: self.serializer.clone(),
            cache: self.cache.clone(),
            _value: PhantomData,
        }
    }
}

impl<V> fmt::Debug for AsyncDocumentTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncDocumentTree")
            .field("session", &self.session)
            .field("serializer", &self.serializer)
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

#[async_trait]
impl<V: TreeValue> AsyncPrimitive for AsyncDocumentTree<V> {
    fn name(&self) -> &str {
        self.session.name()
    }

    fn primitive_type(&self) -> &PrimitiveType {
        self.session.primitive_type()
    }

    async fn close(&self) -> PrimitiveResult<()> {
        if let Some(cache) = &self.cache {
            cache.listener.abort();
            cache.state.invalidate_all();
        }
        self.session.close().await
    }
}
