//! Lock state machine.

use std::collections::VecDeque;
use tessera_primitive::local::{PrimitiveService, ServiceContext, ServiceResponse};
use tessera_primitive::{Operation, PrimitiveError, PrimitiveResult};
use tessera_types::{SessionId, Version};
use tokio::sync::oneshot;
use tracing::debug;

struct Holder {
    session: SessionId,
    version: Version,
}

struct Waiter {
    session: SessionId,
    reply: oneshot::Sender<PrimitiveResult<Vec<u8>>>,
}

/// State machine backing [`LOCK_TYPE`](super::LOCK_TYPE).
#[derive(Default)]
pub struct LockService {
    holder: Option<Holder>,
    waiters: VecDeque<Waiter>,
    version: Version,
}

impl LockService {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session currently holding the lock, and the version of its grant.
    pub fn holder(&self) -> Option<(SessionId, Version)> {
        self.holder.as_ref().map(|h| (h.session, h.version))
    }

    pub fn waiting(&self) -> usize {
        self.waiters.len()
    }

    fn grant(&mut self, session: SessionId) -> Version {
        self.version = self.version.next();
        self.holder = Some(Holder {
            session,
            version: self.version,
        });
        self.version
    }

    /// Hands the lock to the first waiter still listening.
    fn grant_next(&mut self) {
        self.holder = None;
        while let Some(waiter) = self.waiters.pop_front() {
            if waiter.reply.is_closed() {
                continue;
            }
            let version = self.grant(waiter.session);
            let delivered = match serde_json::to_vec(&version) {
                Ok(bytes) => waiter.reply.send(Ok(bytes)).is_ok(),
                Err(e) => {
                    let _ = waiter.reply.send(Err(e.into()));
                    false
                }
            };
            if delivered {
                debug!(session = %waiter.session, %version, "lock handed off");
                return;
            }
            self.holder = None;
        }
    }

    fn holds(&self, session: SessionId) -> bool {
        self.holder.as_ref().is_some_and(|h| h.session == session)
    }
}

impl PrimitiveService for LockService {
    fn apply(
        &mut self,
        context: &mut ServiceContext<'_>,
        operation: &Operation,
    ) -> ServiceResponse {
        let session = context.session();
        match operation.id().name() {
            "lock" => {
                if self.holder.is_none() {
                    let version = self.grant(session);
                    return ServiceResponse::ok(&version);
                }
                let (reply, receiver) = oneshot::channel();
                self.waiters.push_back(Waiter { session, reply });
                ServiceResponse::deferred(receiver)
            }
            "try-lock" => {
                let granted = self.holder.is_none().then(|| self.grant(session));
                ServiceResponse::ok(&granted)
            }
            "unlock" => {
                if !self.holds(session) {
                    return ServiceResponse::ok(&false);
                }
                self.grant_next();
                ServiceResponse::ok(&true)
            }
            "is-locked" => ServiceResponse::ok(&self.holder.is_some()),
            other => ServiceResponse::err(PrimitiveError::UnknownOperation(other.to_string())),
        }
    }

    fn on_close(&mut self, context: &mut ServiceContext<'_>) {
        let session = context.session();
        self.waiters.retain(|w| w.session != session);
        if self.holds(session) {
            debug!(%session, "releasing lock of closed session");
            self.grant_next();
        }
    }
}
