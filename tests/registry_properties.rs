//! Property tests: the registry behaves like an ordered list per event.

use proptest::prelude::*;
use socket_relay::{callback, Callback, SubscriberId, SubscriptionRegistry};

const EVENTS: [&str; 3] = ["message", "typing", "presence"];

#[derive(Clone, Debug)]
enum Op {
    Subscribe { event: usize, owner: usize },
    Unsubscribe { event: usize, owner: usize },
    UnsubscribeAll { owner: usize },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..EVENTS.len(), 0..4usize).prop_map(|(event, owner)| Op::Subscribe { event, owner }),
        2 => (0..EVENTS.len(), 0..4usize).prop_map(|(event, owner)| Op::Unsubscribe { event, owner }),
        1 => (0..4usize).prop_map(|owner| Op::UnsubscribeAll { owner }),
    ]
}

proptest! {
    #[test]
    fn listeners_match_model(ops in prop::collection::vec(op_strategy(), 0..60)) {
        let registry = SubscriptionRegistry::new();
        let owners: Vec<SubscriberId> = (0..4).map(|i| SubscriberId::new(format!("owner-{i}"))).collect();
        // (event, owner, callback) in subscription order.
        let mut model: Vec<(usize, usize, Callback)> = Vec::new();

        for op in ops {
            match op {
                Op::Subscribe { event, owner } => {
                    let cb = callback(|_| Ok(()));
                    registry
                        .subscribe_handler(EVENTS[event], Some(cb.clone()), &owners[owner])
                        .unwrap();
                    model.push((event, owner, cb));
                }
                Op::Unsubscribe { event, owner } => {
                    let expected = model.iter().filter(|(e, o, _)| *e == event && *o == owner).count();
                    prop_assert_eq!(registry.unsubscribe(EVENTS[event], &owners[owner]), expected);
                    model.retain(|(e, o, _)| !(*e == event && *o == owner));
                }
                Op::UnsubscribeAll { owner } => {
                    let expected = model.iter().filter(|(_, o, _)| *o == owner).count();
                    prop_assert_eq!(registry.unsubscribe_all(&owners[owner]), expected);
                    model.retain(|(_, o, _)| *o != owner);
                }
            }
        }

        for (index, event) in EVENTS.iter().enumerate() {
            let expected: Vec<&(usize, usize, Callback)> =
                model.iter().filter(|(e, _, _)| *e == index).collect();
            let actual = registry.listeners_for(event);

            prop_assert_eq!(actual.len(), expected.len());
            for (entry, (_, owner, cb)) in actual.iter().zip(expected) {
                prop_assert_eq!(entry.owner(), &owners[*owner]);
                prop_assert!(entry.same_callback(cb));
            }
            // Keys only exist while they have listeners.
            prop_assert_eq!(
                registry.event_names().contains(&event.to_string()),
                !actual.is_empty()
            );
        }
    }

    #[test]
    fn repeated_unsubscribe_is_noop(times in 1..5usize) {
        let registry = SubscriptionRegistry::new();
        let owner = SubscriberId::new("owner");
        let other = SubscriberId::new("other");
        registry.subscribe("message", |_| Ok(()), &owner);
        registry.subscribe("message", |_| Ok(()), &other);

        prop_assert_eq!(registry.unsubscribe("message", &owner), 1);
        for _ in 0..times {
            prop_assert_eq!(registry.unsubscribe("message", &owner), 0);
        }
        prop_assert_eq!(registry.listener_count("message"), 1);
    }
}
