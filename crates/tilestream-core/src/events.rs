use serde::Serialize;

/// Lifecycle notification emitted by a chunked tile map
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MapEvent {
    PreUpdate {
        #[serde(rename = "elapsedMs")]
        elapsed_ms: f64,
    },
    PostUpdate {
        #[serde(rename = "elapsedMs")]
        elapsed_ms: f64,
    },
    PreDraw {
        #[serde(rename = "elapsedMs")]
        elapsed_ms: f64,
    },
    PostDraw {
        #[serde(rename = "elapsedMs")]
        elapsed_ms: f64,
    },
}

impl MapEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MapEvent::PreUpdate { .. } => "preupdate",
            MapEvent::PostUpdate { .. } => "postupdate",
            MapEvent::PreDraw { .. } => "predraw",
            MapEvent::PostDraw { .. } => "postdraw",
        }
    }
}

/// Type alias for boxed event handlers
pub type EventHandler = Box<dyn FnMut(&MapEvent)>;

/// Handle returned by [`MapEvents::on`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Registry of event handlers, called in subscription order
#[derive(Default)]
pub struct MapEvents {
    handlers: Vec<(Subscription, EventHandler)>,
    next_id: u64,
}

impl MapEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&mut self, handler: impl FnMut(&MapEvent) + 'static) -> Subscription {
        let subscription = Subscription(self.next_id);
        self.next_id += 1;
        self.handlers.push((subscription, Box::new(handler)));
        subscription
    }

    /// Remove a handler; returns false if it was already gone
    pub fn off(&mut self, subscription: Subscription) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(id, _)| *id != subscription);
        self.handlers.len() != before
    }

    pub fn emit(&mut self, event: MapEvent) {
        for (_, handler) in self.handlers.iter_mut() {
            handler(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for MapEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapEvents")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn test_emit_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut events = MapEvents::new();

        let first = log.clone();
        events.on(move |e| first.borrow_mut().push(format!("a:{}", e.name())));
        let second = log.clone();
        events.on(move |e| second.borrow_mut().push(format!("b:{}", e.name())));

        events.emit(MapEvent::PreDraw { elapsed_ms: 16.0 });
        assert_eq!(*log.borrow(), vec!["a:predraw", "b:predraw"]);
    }

    #[test]
    fn test_off_removes_handler() {
        let count = Rc::new(RefCell::new(0));
        let mut events = MapEvents::new();
        let counter = count.clone();
        let sub = events.on(move |_| *counter.borrow_mut() += 1);

        events.emit(MapEvent::PreUpdate { elapsed_ms: 0.0 });
        assert!(events.off(sub));
        assert!(!events.off(sub));
        events.emit(MapEvent::PreUpdate { elapsed_ms: 0.0 });

        assert_eq!(*count.borrow(), 1);
        assert!(events.is_empty());
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(MapEvent::PostUpdate { elapsed_ms: 8.5 }).unwrap();
        assert_eq!(json["type"], "postupdate");
        assert_eq!(json["elapsedMs"], 8.5);
    }
}
