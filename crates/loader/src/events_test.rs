use super::EventRegistry;

#[tokio::test]
async fn subscribers_receive_published_events() {
    let registry = EventRegistry::new(8);
    let (_a, mut rx_a) = registry.subscribe();
    let (_b, mut rx_b) = registry.subscribe();

    let delivered = registry.publish(&7u32);
    assert_eq!(delivered, 2);
    assert_eq!(rx_a.recv().await, Some(7));
    assert_eq!(rx_b.recv().await, Some(7));
}

#[tokio::test]
async fn subscriber_ids_are_distinct() {
    let registry = EventRegistry::<u32>::new(8);
    let (a, _rx_a) = registry.subscribe();
    let (b, _rx_b) = registry.subscribe();
    assert_ne!(a, b);
}

#[tokio::test]
async fn unsubscribe_removes_subscriber() {
    let registry = EventRegistry::new(8);
    let (id, mut rx) = registry.subscribe();

    assert!(registry.unsubscribe(id));
    assert!(!registry.unsubscribe(id));
    assert_eq!(registry.count(), 0);
    assert_eq!(registry.publish(&1u32), 0);

    // The sender side is gone, so the channel ends after the backlog.
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn full_queue_drops_event_for_that_subscriber_only() {
    let registry = EventRegistry::new(1);
    let (_slow, _rx_slow) = registry.subscribe();
    let (_live, mut rx_live) = registry.subscribe();

    assert_eq!(registry.publish(&1u32), 2);
    // The slow subscriber never drains; its queue of one is now full.
    assert_eq!(registry.publish(&2u32), 1);

    assert_eq!(rx_live.recv().await, Some(1));
    assert_eq!(rx_live.recv().await, Some(2));
}

#[tokio::test]
async fn closed_receivers_are_pruned_on_publish() {
    let registry = EventRegistry::new(8);
    let (_id, rx) = registry.subscribe();
    drop(rx);

    assert_eq!(registry.count(), 1);
    assert_eq!(registry.publish(&1u32), 0);
    assert_eq!(registry.count(), 0);
}
