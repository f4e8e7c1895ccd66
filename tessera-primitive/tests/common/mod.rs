//! A minimal counter primitive used to exercise the builder end to end.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tessera_primitive::local::{
    LocalPartitionGroup, LocalPartitionService, PrimitiveService, ServiceContext,
    ServiceRegistry, ServiceResponse,
};
use tessera_primitive::{
    AsyncPrimitive, Blocking, Operation, OperationId, PrimitiveBuilder, PrimitiveContext,
    PrimitiveError, PrimitiveKind, PrimitiveManagementService, PrimitiveProtocol,
    PrimitiveResult, PrimitiveType, ProtocolType, ProxySession, Serializer,
};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

pub const COUNTER_TYPE: PrimitiveType = PrimitiveType::new("counter");

const INCREMENT: OperationId = OperationId::command("increment");
const GET: OperationId = OperationId::query("get");
const APPEND: OperationId = OperationId::command("append");
const SLOW_APPEND: OperationId = OperationId::command("slow-append");

pub type Log = Arc<Mutex<Vec<String>>>;

pub struct CounterService {
    value: i64,
    log: Log,
}

impl PrimitiveService for CounterService {
    fn apply(&mut self, _context: &mut ServiceContext<'_>, operation: &Operation) -> ServiceResponse {
        match operation.id().name() {
            "increment" => match operation.decode::<i64>() {
                Ok(delta) => {
                    self.value += delta;
                    ServiceResponse::ok(&self.value)
                }
                Err(e) => ServiceResponse::err(e),
            },
            "get" => ServiceResponse::ok(&self.value),
            "append" => match operation.decode::<String>() {
                Ok(entry) => {
                    self.log.lock().unwrap().push(entry);
                    ServiceResponse::ok(&())
                }
                Err(e) => ServiceResponse::err(e),
            },
            "slow-append" => match operation.decode::<String>() {
                Ok(entry) => {
                    let (tx, rx) = oneshot::channel();
                    let log = self.log.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        log.lock().unwrap().push(entry);
                        let _ = tx.send(Ok(serde_json::to_vec(&()).unwrap()));
                    });
                    ServiceResponse::deferred(rx)
                }
                Err(e) => ServiceResponse::err(e),
            },
            other => ServiceResponse::err(PrimitiveError::UnknownOperation(other.to_string())),
        }
    }
}

pub struct CounterKind;

impl PrimitiveKind for CounterKind {
    type Options = ();
    type Async = AsyncCounter;
    type Sync = Counter;

    fn base_type() -> PrimitiveType {
        COUNTER_TYPE
    }

    fn wrap(context: PrimitiveContext, _options: &()) -> PrimitiveResult<AsyncCounter> {
        Ok(AsyncCounter {
            session: context.session().clone(),
        })
    }

    fn synchronize(primitive: AsyncCounter, runtime: Handle) -> Counter {
        Counter {
            inner: Blocking::new(primitive, runtime),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AsyncCounter {
    session: ProxySession,
}

impl AsyncCounter {
    pub fn session(&self) -> &ProxySession {
        &self.session
    }

    pub async fn increment(&self, delta: i64) -> PrimitiveResult<i64> {
        self.session.invoke(INCREMENT, &delta).await
    }

    pub async fn get(&self) -> PrimitiveResult<i64> {
        self.session.invoke(GET, &()).await
    }

    pub async fn append(&self, entry: &str) -> PrimitiveResult<()> {
        self.session.invoke(APPEND, entry).await
    }

    pub async fn slow_append(&self, entry: &str) -> PrimitiveResult<()> {
        self.session.invoke(SLOW_APPEND, entry).await
    }
}

#[async_trait]
impl AsyncPrimitive for AsyncCounter {
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

pub struct Counter {
    inner: Blocking<AsyncCounter>,
}

impl Counter {
    pub fn async_primitive(&self) -> &AsyncCounter {
        self.inner.get()
    }

    pub fn increment(&self, delta: i64) -> PrimitiveResult<i64> {
        self.inner.wait(self.inner.get().increment(delta))
    }

    pub fn get(&self) -> PrimitiveResult<i64> {
        self.inner.wait(self.inner.get().get())
    }

    pub fn append(&self, entry: &str) -> PrimitiveResult<()> {
        self.inner.wait(self.inner.get().append(entry))
    }

    pub fn slow_append(&self, entry: &str) -> PrimitiveResult<()> {
        self.inner.wait(self.inner.get().slow_append(entry))
    }

    pub fn close(&self) -> PrimitiveResult<()> {
        self.inner.wait(self.inner.get().close())
    }
}

pub type CounterBuilder = PrimitiveBuilder<CounterKind>;

pub fn registry(log: &Log) -> ServiceRegistry {
    let mut registry = ServiceRegistry::new();
    let log = log.clone();
    registry.register(&COUNTER_TYPE, move |_| {
        Ok(Box::new(CounterService {
            value: 0,
            log: log.clone(),
        }))
    });
    registry
}

/// One multi-raft group named `raft` with `partitions` partitions.
pub fn cluster(partitions: u32) -> (Arc<LocalPartitionService>, Log) {
    let log = Log::default();
    let service = LocalPartitionService::new().with_group(LocalPartitionGroup::new(
        "raft",
        ProtocolType::MULTI_RAFT,
        partitions,
        &registry(&log),
    ));
    (Arc::new(service), log)
}

pub fn builder(
    name: &str,
    service: &Arc<LocalPartitionService>,
    runtime: Handle,
) -> CounterBuilder {
    CounterBuilder::new(name, PrimitiveManagementService::new(service.clone(), runtime))
        .with_protocol(PrimitiveProtocol::multi_raft())
        .with_serializer(Serializer::json())
}

pub fn connect_attempts(service: &LocalPartitionService) -> usize {
    service.group("raft").map(|g| g.connect_attempts()).unwrap_or(0)
}
