use std::sync::Arc;
use tessera_core::{
    DOCUMENT_TREE_TYPE, LOCAL_GROUP, LOCK_TYPE, Tessera, local_partition_service, services,
};
use tessera_primitive::{
    Ordering, PartitionGroup, PartitionService, PrimitiveConfig, PrimitiveError,
    PrimitiveManagementService, PrimitiveProtocol, ProtocolType, Serializer,
};
use tokio::runtime::Handle;

#[test]
fn registry_hosts_every_kind() {
    let registry = services();
    assert!(registry.supports(&LOCK_TYPE));
    assert!(registry.supports(&DOCUMENT_TREE_TYPE));
    assert!(registry.supports(&DOCUMENT_TREE_TYPE.ordered(Ordering::Insertion)));
}

#[test]
fn local_service_exposes_one_multi_raft_group() {
    let service = local_partition_service(4);
    let group = service
        .partition_group(&PrimitiveProtocol::multi_raft())
        .unwrap();
    assert_eq!(group.name(), LOCAL_GROUP);
    assert_eq!(group.protocol_type(), &ProtocolType::MULTI_RAFT);
    assert_eq!(group.partitions().len(), 4);
    assert!(
        service
            .partition_group(&PrimitiveProtocol::multi_primary())
            .is_none()
    );
}

#[tokio::test]
async fn builders_start_from_the_defaults() {
    let tessera = Tessera::local(2, Handle::current());
    let defaults = tessera.default_config();
    assert_eq!(defaults.protocol(), Some(&PrimitiveProtocol::multi_raft()));
    assert!(defaults.serializer().is_some());

    let builder = tessera.lock_builder("lock-a");
    assert_eq!(builder.name(), "lock-a");
    assert_eq!(builder.config().protocol(), defaults.protocol());
    assert!(!builder.config().is_cache_enabled());
}

#[tokio::test]
async fn custom_defaults_apply_to_every_builder() {
    let service = Arc::new(local_partition_service(1));
    let management = PrimitiveManagementService::new(service.clone(), Handle::current());
    let mut defaults = PrimitiveConfig::default();
    defaults
        .set_protocol(PrimitiveProtocol::multi_raft())
        .set_serializer(Serializer::json())
        .enable_read_only();
    let tessera = Tessera::with_default_config(management, defaults);

    let tree = tessera
        .tree_builder::<u32>("config")
        .build_async_primitive()
        .await
        .unwrap();
    assert!(tree.session().is_read_only());

    let lock = tessera.lock_builder("l").build_async_primitive().await.unwrap();
    assert!(matches!(lock.lock().await, Err(PrimitiveError::ReadOnly { .. })));
}

#[tokio::test]
async fn unconfigured_defaults_fail_before_connecting() {
    let service = Arc::new(local_partition_service(2));
    let management = PrimitiveManagementService::new(service.clone(), Handle::current());
    let tessera = Tessera::with_default_config(management, PrimitiveConfig::default());

    let err = tessera
        .lock_builder("lock-a")
        .build_async_primitive()
        .await
        .unwrap_err();
    assert!(matches!(err, PrimitiveError::MissingProtocol));
    assert_eq!(service.group(LOCAL_GROUP).unwrap().connect_attempts(), 0);
}

#[tokio::test]
async fn a_name_always_lands_on_the_same_partition() {
    let tessera = Tessera::local(5, Handle::current());
    let first = tessera.lock_builder("lock-a").build_async_primitive().await.unwrap();
    let second = tessera.lock_builder("lock-a").build_async_primitive().await.unwrap();
    assert_eq!(first.session().partition_id(), second.session().partition_id());
    assert_ne!(first.session().session_id(), second.session().session_id());
}
