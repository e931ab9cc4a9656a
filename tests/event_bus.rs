use quant_dashboard::common::{AppEvent, EventBus, Topic};

#[test]
fn subscribers_only_see_their_topics() {
    let bus = EventBus::new();
    let header = bus.subscribe(&[Topic::RouteChanged, Topic::ThemeChanged]);
    let saves = bus.subscribe(&[Topic::LayoutSaved]);

    let reached = bus.publish(AppEvent::RouteChanged {
        title: "Assets".into(),
    });
    assert_eq!(reached, 1);
    bus.publish(AppEvent::LayoutSaved {
        storage_key: "dashboard:grid:main".into(),
    });

    assert_eq!(
        header.drain(),
        vec![AppEvent::RouteChanged {
            title: "Assets".into()
        }]
    );
    assert_eq!(saves.drain().len(), 1);
    assert!(header.drain().is_empty());
}

#[test]
fn unsubscribed_handle_receives_nothing() {
    let bus = EventBus::new();
    let sub = bus.subscribe(&[Topic::ThemeChanged]);
    bus.unsubscribe(&sub);
    assert_eq!(bus.publish(AppEvent::ThemeChanged { dark: false }), 0);
    assert!(sub.drain().is_empty());
    assert_eq!(bus.subscriber_count(), 0);
}

#[test]
fn dropped_subscription_is_pruned_on_publish() {
    let bus = EventBus::new();
    let handle = bus.clone();
    {
        let _sub = handle.subscribe(&[Topic::LayoutReset]);
        assert_eq!(bus.subscriber_count(), 1);
    }
    assert_eq!(bus.publish(AppEvent::LayoutReset), 0);
    assert_eq!(bus.subscriber_count(), 0);
}
