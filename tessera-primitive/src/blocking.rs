//! Async-to-sync adapter.
//!
//! [`Blocking`] wraps an asynchronous primitive together with the runtime
//! that drives it. Typed synchronous facades hold one and route every call
//! through [`Blocking::wait`], so a caller never has two operations of its
//! own in flight. Calls from different threads are not serialized.

use std::future::Future;
use tokio::runtime::Handle;

/// An asynchronous primitive driven to completion on a runtime handle.
#[derive(Debug, Clone)]
pub struct Blocking<P> {
    primitive: P,
    runtime: Handle,
}

impl<P> Blocking<P> {
    pub fn new(primitive: P, runtime: Handle) -> Self {
        Self { primitive, runtime }
    }

    /// The wrapped asynchronous primitive.
    pub fn get(&self) -> &P {
        &self.primitive
    }

    pub fn into_inner(self) -> P {
        self.primitive
    }

    pub fn runtime(&self) -> &Handle {
        &self.runtime
    }

    /// Blocks the calling thread until `future` completes.
    ///
    /// # Panics
    ///
    /// Panics when called from inside an asynchronous task. Use the
    /// asynchronous primitive there, or move the call into
    /// `tokio::task::spawn_blocking`.
    pub fn wait<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
