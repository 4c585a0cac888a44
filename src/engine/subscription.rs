//! Scoped event subscriptions.
//!
//! A `Subscription` is a guard: while it lives, events of its topic are
//! dispatched; dropping it unsubscribes. Owners keep guards in fields whose
//! lifetime matches the listener (mount for frames, one session for
//! select/session-end), so teardown cannot leave a stale listener behind.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slotmap::{SlotMap, new_key_type};

use crate::engine::xr::PlatformEvent;

new_key_type! {
    pub struct SubscriptionKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    AnimationFrame,
    Select,
    SessionEnd,
}

impl Topic {
    pub fn of(event: &PlatformEvent) -> Topic {
        match event {
            PlatformEvent::AnimationFrame { .. } => Topic::AnimationFrame,
            PlatformEvent::Select(_) => Topic::Select,
            PlatformEvent::SessionEnded(_) => Topic::SessionEnd,
        }
    }
}

type Registry = RefCell<SlotMap<SubscriptionKey, Topic>>;

#[derive(Debug, Default)]
pub struct Subscriptions {
    live: Rc<Registry>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let key = self.live.borrow_mut().insert(topic);
        log::trace!("subscribed to {topic:?}");
        Subscription {
            key,
            topic,
            registry: Rc::downgrade(&self.live),
        }
    }

    pub fn is_subscribed(&self, topic: Topic) -> bool {
        self.live.borrow().values().any(|t| *t == topic)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.live.borrow().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[must_use = "dropping a Subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription {
    key: SubscriptionKey,
    topic: Topic,
    registry: Weak<Registry>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.key);
            log::trace!("unsubscribed from {:?}", self.topic);
        }
    }
}
