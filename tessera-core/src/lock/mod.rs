//! Distributed lock.
//!
//! A lock is held by at most one session at a time. Waiters are granted the
//! lock in arrival order, and every grant carries a new [`Version`] that can
//! be used as a fencing token. Closing a session releases its lock and
//! abandons its waits.
//!
//! The lock is not reentrant: a session that calls `lock` while holding the
//! lock waits behind itself.
//!
//! [`Version`]: tessera_types::Version

mod async_lock;
mod blocking;
mod service;

pub use async_lock::AsyncDistributedLock;
pub use blocking::DistributedLock;
pub use service::LockService;

use tessera_primitive::{
    OperationId, PrimitiveBuilder, PrimitiveContext, PrimitiveKind, PrimitiveResult,
    PrimitiveType,
};
use tokio::runtime::Handle;

/// Type descriptor shared by lock clients and lock state machines.
pub const LOCK_TYPE: PrimitiveType = PrimitiveType::new("lock");

const LOCK: OperationId = OperationId::command("lock");
const TRY_LOCK: OperationId = OperationId::command("try-lock");
const UNLOCK: OperationId = OperationId::command("unlock");
const IS_LOCKED: OperationId = OperationId::query("is-locked");

/// Construction strategy for distributed locks.
#[derive(Debug)]
pub struct LockKind;

impl PrimitiveKind for LockKind {
    type Options = ();
    type Async = AsyncDistributedLock;
    type Sync = DistributedLock;

    fn base_type() -> PrimitiveType {
        LOCK_TYPE
    }

    fn wrap(context: PrimitiveContext, _options: &()) -> PrimitiveResult<AsyncDistributedLock> {
        Ok(AsyncDistributedLock::new(context.session().clone()))
    }

    fn synchronize(primitive: AsyncDistributedLock, runtime: Handle) -> DistributedLock {
        primitive.sync(runtime)
    }
}

/// Builder for [`DistributedLock`].
pub type DistributedLockBuilder = PrimitiveBuilder<LockKind>;
