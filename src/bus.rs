//! Publish/subscribe event bus with an append-only history.
//!
//! Systems publish; observers subscribe and see each event as it is
//! appended. Observers only ever receive `&SimEvent` and have no handle on
//! the graph, so they cannot mutate simulation state from a callback.

use std::fmt;

use crate::id::SequenceGenerator;
use crate::model::{EventType, SimEvent};

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&SimEvent)>;

pub struct EventBus {
    history: Vec<SimEvent>,
    observers: Vec<(SubscriptionId, Observer)>,
    seq: SequenceGenerator,
    next_subscription: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            observers: Vec::new(),
            seq: SequenceGenerator::new(),
            next_subscription: 0,
        }
    }

    /// Register an observer called synchronously for every later event.
    pub fn subscribe(&mut self, observer: impl FnMut(&SimEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Append an event to the history and notify observers in
    /// subscription order. Returns the event's sequence number.
    pub fn publish(&mut self, event_type: EventType, tick: u64, payload: serde_json::Value) -> u64 {
        let seq = self.seq.next_seq();
        let event = SimEvent {
            seq,
            event_type,
            tick,
            payload,
        };
        for (_, observer) in self.observers.iter_mut() {
            observer(&event);
        }
        self.history.push(event);
        seq
    }

    pub fn history(&self) -> &[SimEvent] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Events published during `tick`. History is tick-ordered, so this
    /// walks back from the end.
    pub fn events_at(&self, tick: u64) -> impl Iterator<Item = &SimEvent> {
        let start = self
            .history
            .iter()
            .rposition(|e| e.tick < tick)
            .map_or(0, |i| i + 1);
        self.history[start..].iter().filter(move |e| e.tick == tick)
    }

    pub fn published_at(&self, event_type: EventType, tick: u64) -> bool {
        self.events_at(tick).any(|e| e.event_type == event_type)
    }

    pub fn count_of(&self, event_type: EventType) -> usize {
        self.history
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("history", &self.history.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn publish_appends_in_order_with_sequence_numbers() {
        let mut bus = EventBus::new();
        bus.publish(EventType::SurplusExtraction, 0, serde_json::Value::Null);
        bus.publish(EventType::EcologicalOvershoot, 0, serde_json::Value::Null);
        bus.publish(EventType::Uprising, 1, serde_json::Value::Null);

        let seqs: Vec<u64> = bus.history().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
        assert_eq!(bus.history()[2].event_type, EventType::Uprising);
    }

    #[test]
    fn observers_see_every_event() {
        let mut bus = EventBus::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(move |e| sink.borrow_mut().push(e.event_type));

        bus.publish(EventType::MassAwakening, 2, serde_json::Value::Null);
        bus.publish(EventType::SolidaritySpike, 2, serde_json::Value::Null);

        assert_eq!(
            *seen.borrow(),
            vec![EventType::MassAwakening, EventType::SolidaritySpike]
        );
    }

    #[test]
    fn unsubscribed_observer_is_not_called() {
        let mut bus = EventBus::new();
        let count = Rc::new(RefCell::new(0));
        let c = Rc::clone(&count);
        let id = bus.subscribe(move |_| *c.borrow_mut() += 1);
        bus.publish(EventType::Uprising, 0, serde_json::Value::Null);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(EventType::Uprising, 0, serde_json::Value::Null);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn events_at_filters_by_tick() {
        let mut bus = EventBus::new();
        bus.publish(EventType::SurplusExtraction, 0, serde_json::Value::Null);
        bus.publish(EventType::SuperwageCrisis, 1, serde_json::Value::Null);
        bus.publish(EventType::SurplusExtraction, 1, serde_json::Value::Null);
        bus.publish(EventType::Uprising, 2, serde_json::Value::Null);

        assert_eq!(bus.events_at(1).count(), 2);
        assert!(bus.published_at(EventType::SuperwageCrisis, 1));
        assert!(!bus.published_at(EventType::SuperwageCrisis, 2));
        assert_eq!(bus.events_at(5).count(), 0);
        assert_eq!(bus.count_of(EventType::SurplusExtraction), 2);
    }
}
