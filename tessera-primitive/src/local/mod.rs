//! In-process protocol.
//!
//! Implements the partition traits with partitions that live in the current
//! process. Every partition hosts real primitive state machines registered
//! in a [`ServiceRegistry`], so primitives built against it behave like
//! remote ones: operations go through a session, commands and queries are
//! executed by the state machine, and events fan out to every session.
//!
//! Besides embedding, this is what the test suites run against. Partitions
//! count connect attempts and executed operations, and can be told to
//! refuse connections.

mod partition;
mod proxy;
mod service;

pub use partition::{LocalPartition, LocalPartitionGroup, LocalPartitionService, LocalPrimitiveClient};
pub use proxy::LocalProxy;
pub use service::{PrimitiveService, ServiceContext, ServiceFactory, ServiceRegistry, ServiceResponse};
