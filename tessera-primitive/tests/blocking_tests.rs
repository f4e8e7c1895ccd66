mod common;

use common::{builder, cluster};
use std::thread;
use std::time::Duration;
use tessera_primitive::PrimitiveError;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn blocking_build_from_a_plain_thread() {
    let runtime = runtime();
    let (service, _) = cluster(3);

    let counter = builder("lock-a", &service, runtime.handle().clone())
        .build()
        .unwrap();
    assert_eq!(counter.increment(2).unwrap(), 2);
    assert_eq!(counter.increment(3).unwrap(), 5);
    assert_eq!(counter.get().unwrap(), 5);
}

#[test]
fn build_async_resolves_to_a_blocking_facade() {
    let runtime = runtime();
    let (service, _) = cluster(1);
    let builder = builder("counter-a", &service, runtime.handle().clone());

    let counter = runtime.block_on(builder.build_async()).unwrap();
    // The facade is used off the runtime, from the calling thread.
    assert_eq!(counter.increment(1).unwrap(), 1);
}

#[test]
fn operations_complete_in_issue_order() {
    let runtime = runtime();
    let (service, log) = cluster(1);
    let counter = builder("ordered", &service, runtime.handle().clone())
        .build()
        .unwrap();

    // slow_append finishes 50ms after submission, append at once. A facade
    // that did not wait would log "b" first.
    counter.slow_append("a").unwrap();
    counter.append("b").unwrap();
    counter.slow_append("c").unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["a", "b", "c"]);
}

#[test]
fn blocking_call_waits_for_completion() {
    let runtime = runtime();
    let (service, log) = cluster(1);
    let counter = builder("waits", &service, runtime.handle().clone())
        .build()
        .unwrap();

    counter.slow_append("done").unwrap();
    // Observed immediately after return, without sleeping.
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[test]
fn facades_on_different_threads_are_independent() {
    let runtime = runtime();
    let (service, _) = cluster(2);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let counter = builder("shared", &service, runtime.handle().clone())
                .build()
                .unwrap();
            thread::spawn(move || {
                for _ in 0..25 {
                    counter.increment(1).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let counter = builder("shared", &service, runtime.handle().clone())
        .build()
        .unwrap();
    assert_eq!(counter.get().unwrap(), 100);
}

#[test]
fn failures_are_raised_on_the_calling_thread() {
    let runtime = runtime();
    let (service, _) = cluster(1);
    let counter = builder("closing", &service, runtime.handle().clone())
        .build()
        .unwrap();

    counter.close().unwrap();
    let err = counter.get().unwrap_err();
    assert!(matches!(err, PrimitiveError::Closed { ref name } if name == "closing"));
}

#[test]
fn failed_blocking_build_reports_connection_error() {
    let runtime = runtime();
    let (service, _) = cluster(2);
    service.group("raft").unwrap().refuse_connections(true);

    let started = std::time::Instant::now();
    let err = builder("lock-a", &service, runtime.handle().clone())
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, PrimitiveError::Connection { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
}
