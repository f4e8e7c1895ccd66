use super::AsyncDistributedLock;
use tessera_primitive::{AsyncPrimitive, Blocking, PrimitiveResult};
use tessera_types::Version;

/// Blocking distributed lock.
///
/// Every method blocks the calling thread until the partition answers. Must
/// not be used from inside an asynchronous task.
#[derive(Debug, Clone)]
pub struct DistributedLock {
    inner: Blocking<AsyncDistributedLock>,
}

impl DistributedLock {
    pub(crate) fn new(inner: Blocking<AsyncDistributedLock>) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.get().name()
    }

    pub fn lock(&self) -> PrimitiveResult<Version> {
        self.inner.wait(self.inner.get().lock())
    }

    pub fn try_lock(&self) -> PrimitiveResult<Option<Version>> {
        self.inner.wait(self.inner.get().try_lock())
    }

    pub fn unlock(&self) -> PrimitiveResult<bool> {
        self.inner.wait(self.inner.get().unlock())
    }

    pub fn is_locked(&self) -> PrimitiveResult<bool> {
        self.inner.wait(self.inner.get().is_locked())
    }

    pub fn close(&self) -> PrimitiveResult<()> {
        self.inner.wait(self.inner.get().close())
    }

    /// The asynchronous lock this facade drives.
    pub fn async_primitive(&self) -> &AsyncDistributedLock {
        self.inner.get()
    }
}
