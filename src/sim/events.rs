//! Outbound notifications
//!
//! The simulation queues [`GameEvent`]s on the state; the engine hands them
//! to an [`EventBus`], which calls listeners synchronously in registration
//! order.

use serde::{Deserialize, Serialize};

use super::state::GamePhase;

/// Notification raised by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Score changed (new total)
    Score(u64),
    /// Lives changed (new count)
    Lives(u32),
    /// Last life lost
    GameOver,
    /// Play stopped and waits for a start command
    Pause,
    /// Phase changed
    State(GamePhase),
    /// A level was cleared (number of the cleared level)
    LevelCleared(u32),
}

/// Event discriminant used to subscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Score,
    Lives,
    GameOver,
    Pause,
    State,
    LevelCleared,
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::Score(_) => EventKind::Score,
            GameEvent::Lives(_) => EventKind::Lives,
            GameEvent::GameOver => EventKind::GameOver,
            GameEvent::Pause => EventKind::Pause,
            GameEvent::State(_) => EventKind::State,
            GameEvent::LevelCleared(_) => EventKind::LevelCleared,
        }
    }
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Score => "score",
            EventKind::Lives => "lives",
            EventKind::GameOver => "gameover",
            EventKind::Pause => "pause",
            EventKind::State => "state",
            EventKind::LevelCleared => "levelCleared",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "score" => Some(EventKind::Score),
            "lives" => Some(EventKind::Lives),
            "gameover" => Some(EventKind::GameOver),
            "pause" => Some(EventKind::Pause),
            "state" => Some(EventKind::State),
            "levelCleared" => Some(EventKind::LevelCleared),
            _ => None,
        }
    }
}

/// Handle returned by [`EventBus::on`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&GameEvent)>;

/// Typed subscriber list
#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, EventKind, Listener)>,
    next_id: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one kind of event
    pub fn on(&mut self, kind: EventKind, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, kind, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was already gone
    pub fn off(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Deliver an event to matching listeners in registration order
    pub fn emit(&mut self, event: &GameEvent) {
        let kind = event.kind();
        for (_, listener_kind, listener) in self.listeners.iter_mut() {
            if *listener_kind == kind {
                listener(event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
