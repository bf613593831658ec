/// Shared-handle tests
///
/// Concurrent event application on one instance serializes under the
/// per-instance lock: versions come out strictly successive, no event is
/// lost and no dispatch interleaves with another.
/// Run with: cargo test --test shared_tests
mod common;

use std::thread;

use aggroot::prelude::dx::*;

use common::{created, line_added, Order};

#[test]
fn test_concurrent_apply_change_serializes() {
    let id = Identifier::new();
    let mut order = Order::new().unwrap();
    order.apply_change(created(id, "acme")).unwrap();

    let shared = Shared::new(order);
    let threads = 4;
    let events_per_thread = 10;

    thread::scope(|scope| {
        for t in 0..threads {
            let handle = shared.clone();
            scope.spawn(move || {
                for i in 0..events_per_thread {
                    let sku = format!("sku-{}-{}", t, i);
                    let report = handle.apply_change(line_added(&sku, 1, 1.0)).unwrap();
                    assert!(report.is_valid());
                }
            });
        }
    });

    let total_events = 1 + threads * events_per_thread;
    assert_eq!(shared.version().unwrap(), total_events as u64);

    shared
        .with(|order| {
            assert_eq!(order.line_count(), (threads * events_per_thread) as usize);
            // Versions are strictly successive: no interleaved appends
            for (i, event) in order.uncommitted_events().iter().enumerate() {
                assert_eq!(event.version(), (i + 1) as u64);
            }
        })
        .unwrap();
}

#[test]
fn test_shared_transactions_and_reads() {
    let id = Identifier::new();
    let mut order = Order::new().unwrap();
    order.apply_change(created(id, "acme")).unwrap();

    let shared = Shared::new(order);

    let report = shared
        .track_changes(|o| o.set_property("status", "closed"))
        .unwrap();
    assert!(report.is_valid());

    let status = shared.with(|o| o.status()).unwrap();
    assert_eq!(status, "closed");

    let order = shared.try_unwrap().unwrap_or_else(|_| panic!("last handle"));
    assert_eq!(order.status(), "closed");
}
