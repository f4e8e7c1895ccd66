use super::{DistributedLock, IS_LOCKED, LOCK, TRY_LOCK, UNLOCK};
use async_trait::async_trait;
use tessera_primitive::{AsyncPrimitive, Blocking, PrimitiveResult, PrimitiveType, ProxySession};
use tessera_types::Version;
use tokio::runtime::Handle;

/// Asynchronous distributed lock.
#[derive(Debug, Clone)]
pub struct AsyncDistributedLock {
    session: ProxySession,
}

impl AsyncDistributedLock {
    pub(crate) fn new(session: ProxySession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &ProxySession {
        &self.session
    }

    /// Acquires the lock, waiting behind earlier waiters.
    ///
    /// Resolves to the version of this grant.
    pub async fn lock(&self) -> PrimitiveResult<Version> {
        self.session.invoke(LOCK, &()).await
    }

    /// Acquires the lock only if it is free.
    pub async fn try_lock(&self) -> PrimitiveResult<Option<Version>> {
        self.session.invoke(TRY_LOCK, &()).await
    }

    /// Releases the lock. Returns `false` if this session did not hold it.
    pub async fn unlock(&self) -> PrimitiveResult<bool> {
        self.session.invoke(UNLOCK, &()).await
    }

    /// Whether any session holds the lock.
    pub async fn is_locked(&self) -> PrimitiveResult<bool> {
        self.session.invoke(IS_LOCKED, &()).await
    }

    /// Adapts this lock into a blocking one driven on `runtime`.
    pub fn sync(self, runtime: Handle) -> DistributedLock {
        DistributedLock::new(Blocking::new(self, runtime))
    }
}

#[async_trait]
impl AsyncPrimitive for AsyncDistributedLock {
    fn name(&self) -> &str {
        self.session.name()
    }

    fn primitive_type(&self) -> &PrimitiveType {
        self.session.primitive_type()
    }

    async fn close(&self) -> PrimitiveResult<()> {
        self.session.close().await
    }
}
