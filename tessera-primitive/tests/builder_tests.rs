mod common;

use common::{COUNTER_TYPE, CounterBuilder, builder, cluster, connect_attempts};
use std::sync::Arc;
use tessera_primitive::local::{LocalPartitionGroup, LocalPartitionService};
use tessera_primitive::{
    AsyncPrimitive, PartitionGroup, PartitionService, PrimitiveError, PrimitiveKind,
    PrimitiveManagementService, PrimitiveProtocol, PrimitiveType, ProtocolType, Serializer,
};

// ── Configuration failures ──────────────────────────────────────

#[tokio::test]
async fn missing_protocol_fails_without_connecting() {
    let (service, _) = cluster(3);
    let builder = CounterBuilder::new(
        "counter-a",
        PrimitiveManagementService::current(service.clone()),
    )
    .with_serializer(Serializer::json());

    let err = builder.build_async().await.err().unwrap();
    assert!(matches!(err, PrimitiveError::MissingProtocol));
    assert!(err.is_configuration());
    assert_eq!(connect_attempts(&service), 0);
}

#[tokio::test]
async fn missing_serializer_fails_without_connecting() {
    let (service, _) = cluster(3);
    let builder = CounterBuilder::new(
        "counter-a",
        PrimitiveManagementService::current(service.clone()),
    )
    .with_protocol(PrimitiveProtocol::multi_raft());

    let err = builder.build_async().await.err().unwrap();
    assert!(matches!(err, PrimitiveError::MissingSerializer));
    assert_eq!(connect_attempts(&service), 0);
}

// ── Topology failures ───────────────────────────────────────────

#[tokio::test]
async fn unknown_protocol_fails_with_no_partition_group() {
    let (service, _) = cluster(3);
    let builder = builder("counter-a", &service, tokio::runtime::Handle::current())
        .with_protocol(PrimitiveProtocol::new(ProtocolType::new("gossip")));

    let err = builder.build_async().await.err().unwrap();
    match &err {
        PrimitiveError::NoPartitionGroup { protocol } => assert_eq!(protocol, "gossip"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_topology());
    assert_eq!(connect_attempts(&service), 0);
}

#[tokio::test]
async fn unknown_group_name_fails_with_no_partition_group() {
    let (service, _) = cluster(3);
    let builder = builder("counter-a", &service, tokio::runtime::Handle::current())
        .with_protocol(PrimitiveProtocol::multi_raft().with_group("elsewhere"));

    let err = builder.build_async().await.err().unwrap();
    assert!(matches!(err, PrimitiveError::NoPartitionGroup { .. }));
    assert_eq!(connect_attempts(&service), 0);
}

#[tokio::test]
async fn empty_group_fails_with_no_partition() {
    let (service, _) = cluster(0);
    let builder = builder("counter-a", &service, tokio::runtime::Handle::current());

    let err = builder.build_async().await.err().unwrap();
    match err {
        PrimitiveError::NoPartition { group, name } => {
            assert_eq!(group, "raft");
            assert_eq!(name, "counter-a");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unsupported_type_fails_before_connecting() {
    let service = Arc::new(LocalPartitionService::new().with_group(LocalPartitionGroup::new(
        "raft",
        ProtocolType::MULTI_RAFT,
        2,
        &Default::default(),
    )));
    let builder = builder("counter-a", &service, tokio::runtime::Handle::current());

    let err = builder.build_async().await.err().unwrap();
    assert!(matches!(err, PrimitiveError::UnsupportedType(ref t) if t == "counter"));
    assert_eq!(connect_attempts(&service), 0);
}

// ── Connection ──────────────────────────────────────────────────

#[tokio::test]
async fn connection_failure_propagates_unchanged() {
    let (service, _) = cluster(3);
    service.group("raft").unwrap().refuse_connections(true);
    let builder = builder("counter-a", &service, tokio::runtime::Handle::current());

    let err = builder.build_async_primitive().await.err().unwrap();
    let expected = service
        .partition_group(&PrimitiveProtocol::multi_raft())
        .unwrap()
        .partition_for("counter-a")
        .unwrap()
        .id();
    match err {
        PrimitiveError::Connection { partition, reason } => {
            assert_eq!(partition, expected);
            assert!(reason.contains("refused"));
        }
        other => panic!("unexpected error: {other}"),
    }
    // Exactly one attempt: no retry at this layer.
    assert_eq!(connect_attempts(&service), 1);
}

#[tokio::test]
async fn failed_build_is_retryable() {
    let (service, _) = cluster(3);
    let group = service.group("raft").unwrap().clone();
    group.refuse_connections(true);
    let builder = builder("counter-a", &service, tokio::runtime::Handle::current());
    assert!(builder.build_async_primitive().await.is_err());

    group.refuse_connections(false);
    let counter = builder.build_async_primitive().await.unwrap();
    assert_eq!(counter.increment(1).await.unwrap(), 1);
    assert_eq!(connect_attempts(&service), 2);
}

#[tokio::test]
async fn same_name_with_different_type_is_refused() {
    let (service, _) = cluster(1);
    let first = builder("shared", &service, tokio::runtime::Handle::current());
    first.build_async_primitive().await.unwrap();

    // Same type name, different ordering.
    struct OrderedCounter;
    impl PrimitiveKind for OrderedCounter {
        type Options = ();
        type Async = common::AsyncCounter;
        type Sync = common::Counter;
        fn base_type() -> PrimitiveType {
            COUNTER_TYPE.ordered(tessera_primitive::Ordering::Natural)
        }
        fn wrap(
            context: tessera_primitive::PrimitiveContext,
            options: &(),
        ) -> tessera_primitive::PrimitiveResult<common::AsyncCounter> {
            common::CounterKind::wrap(context, options)
        }
        fn synchronize(p: common::AsyncCounter, rt: tokio::runtime::Handle) -> common::Counter {
            common::CounterKind::synchronize(p, rt)
        }
    }
    let second = tessera_primitive::PrimitiveBuilder::<OrderedCounter>::new(
        "shared",
        PrimitiveManagementService::current(service.clone()),
    )
    .with_protocol(PrimitiveProtocol::multi_raft())
    .with_serializer(Serializer::json());

    let err = second.build_async_primitive().await.err().unwrap();
    assert!(matches!(err, PrimitiveError::Connection { .. }));
}

// ── Successful builds ───────────────────────────────────────────

#[tokio::test]
async fn build_connects_to_the_routed_partition() {
    let (service, _) = cluster(5);
    let counter = builder("lock-a", &service, tokio::runtime::Handle::current())
        .build_async_primitive()
        .await
        .unwrap();

    let expected = service
        .partition_group(&PrimitiveProtocol::multi_raft())
        .unwrap()
        .partition_for("lock-a")
        .unwrap()
        .id();
    assert_eq!(counter.session().partition_id(), expected);
    assert!(counter.session().session_id().is_some());
    assert!(counter.session().is_connected());
    assert_eq!(counter.name(), "lock-a");
    assert_eq!(counter.primitive_type(), &COUNTER_TYPE);

    let hosting = service.group("raft").unwrap().local_partition(expected).unwrap();
    assert_eq!(hosting.local_client().primitive_names(), vec!["lock-a".to_string()]);
}

#[tokio::test]
async fn builds_of_the_same_name_share_state_but_not_sessions() {
    let (service, _) = cluster(3);
    let builder = builder("shared-counter", &service, tokio::runtime::Handle::current());
    let a = builder.build_async_primitive().await.unwrap();
    let b = builder.build_async_primitive().await.unwrap();

    assert_ne!(a.session().session_id(), b.session().session_id());
    a.increment(5).await.unwrap();
    assert_eq!(b.get().await.unwrap(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_builds_are_independent() {
    let (service, _) = cluster(4);
    let builds = (0..16).map(|i| {
        let builder = builder(&format!("counter-{i}"), &service, tokio::runtime::Handle::current());
        async move { builder.build_async_primitive().await }
    });
    let counters = futures::future::join_all(builds).await;

    for (i, counter) in counters.into_iter().enumerate() {
        let counter = counter.unwrap();
        assert_eq!(counter.increment(i as i64).await.unwrap(), i as i64);
    }
    assert_eq!(connect_attempts(&service), 16);
}

#[tokio::test]
async fn closed_primitive_rejects_operations() {
    let (service, _) = cluster(1);
    let counter = builder("counter-a", &service, tokio::runtime::Handle::current())
        .build_async_primitive()
        .await
        .unwrap();

    counter.close().await.unwrap();
    assert!(!counter.session().is_connected());
    let err = counter.get().await.unwrap_err();
    assert!(matches!(err, PrimitiveError::Closed { .. }));
    // Closing twice is harmless.
    counter.close().await.unwrap();
}

// ── Read-only ───────────────────────────────────────────────────

#[tokio::test]
async fn read_only_rejects_commands_at_the_client() {
    let (service, _) = cluster(1);
    let writer = builder("counter-a", &service, tokio::runtime::Handle::current())
        .build_async_primitive()
        .await
        .unwrap();
    writer.increment(3).await.unwrap();

    let reader = builder("counter-a", &service, tokio::runtime::Handle::current())
        .with_read_only()
        .build_async_primitive()
        .await
        .unwrap();
    assert!(reader.session().is_read_only());

    let client = service.group("raft").unwrap().local_partitions()[0]
        .local_client()
        .clone();
    let before = client.operation_count();

    let err = reader.increment(1).await.unwrap_err();
    match err {
        PrimitiveError::ReadOnly { name, operation } => {
            assert_eq!(name, "counter-a");
            assert_eq!(operation, "increment");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(client.operation_count(), before);

    assert_eq!(reader.get().await.unwrap(), 3);
    assert_eq!(client.operation_count(), before + 1);
}

#[tokio::test]
async fn builder_type_and_config_accessors() {
    let (service, _) = cluster(1);
    let builder = builder("counter-a", &service, tokio::runtime::Handle::current())
        .with_cache_enabled()
        .with_cache_size(10);

    assert_eq!(builder.name(), "counter-a");
    assert_eq!(builder.primitive_type(), COUNTER_TYPE);
    assert_eq!(builder.config().cache_capacity(), Some(10));
    let debug = format!("{builder:?}");
    assert!(debug.contains("counter-a"));
}
