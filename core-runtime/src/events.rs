//! # Event Bus
//!
//! Typed publish/subscribe built on `tokio::sync::broadcast`.
//!
//! Components publish property-change notices on an [`EventBus<E>`] and
//! observers subscribe to an [`EventStream<E>`]. Dropping the stream is the
//! unsubscribe. The bus is generic so each domain crate defines its own
//! event enum and implements [`BusEvent`] for it.
//!
//! ```text
//!  publisher ── emit(E) ──> EventBus<E> ──> EventStream<E> (filter) ──> observer
//!                                      └──> EventStream<E>            ──> observer
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{BusEvent, EventBus, EventSeverity};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Tick {
//!     Second(u64),
//! }
//!
//! impl BusEvent for Tick {
//!     fn description(&self) -> &str {
//!         "tick"
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut stream = bus.stream();
//! bus.emit(Tick::Second(1)).ok();
//! assert_eq!(stream.recv().await.unwrap(), Tick::Second(1));
//! # }
//! ```
//!
//! ## Lagging
//!
//! A subscriber that falls more than `capacity` events behind receives
//! `RecvError::Lagged(n)` and then resumes with the oldest retained event.
//! Publishers never block.

use core_async::sync::broadcast::{
    self,
    error::{RecvError, SendError, TryRecvError},
    Receiver,
};
use std::fmt;

/// Default per-subscriber buffer.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// How much attention an event deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Payload carried by an [`EventBus`].
pub trait BusEvent: Clone + fmt::Debug + Send + 'static {
    /// Short human-readable label.
    fn description(&self) -> &str;

    fn severity(&self) -> EventSeverity {
        EventSeverity::Info
    }
}

/// Broadcast channel for events of type `E`.
pub struct EventBus<E: BusEvent> {
    sender: broadcast::Sender<E>,
}

impl<E: BusEvent> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<E: BusEvent> EventBus<E> {
    /// `capacity` is the number of events buffered per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish to all current subscribers.
    ///
    /// Returns the number of receivers, or an error carrying the event back
    /// when nobody is listening.
    pub fn emit(&self, event: E) -> Result<usize, SendError<E>> {
        self.sender.send(event)
    }

    /// Raw receiver for every future event.
    pub fn subscribe(&self) -> Receiver<E> {
        self.sender.subscribe()
    }

    /// Filterable stream of every future event.
    pub fn stream(&self) -> EventStream<E> {
        EventStream::new(self.subscribe())
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl<E: BusEvent> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

type EventFilter<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

/// Receiving side of an [`EventBus`], optionally filtered.
pub struct EventStream<E: BusEvent> {
    receiver: Receiver<E>,
    filter: Option<EventFilter<E>>,
}

impl<E: BusEvent> EventStream<E> {
    pub fn new(receiver: Receiver<E>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only yield events matching `predicate`.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &E) -> bool {
        self.filter.as_ref().map_or(true, |f| f(event))
    }

    /// Wait for the next matching event.
    pub async fn recv(&mut self) -> Result<E, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Next matching event if one is already buffered.
    pub fn try_recv(&mut self) -> Option<Result<E, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(Ok(event)),
                Ok(_) => continue,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Lagged(n)) => return Some(Err(RecvError::Lagged(n))),
                Err(TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    /// Drain every buffered matching event, skipping over lag gaps.
    pub fn drain(&mut self) -> Vec<E> {
        let mut events = Vec::new();
        while let Some(next) = self.try_recv() {
            match next {
                Ok(event) => events.push(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        events
    }
}

impl<E: BusEvent> fmt::Debug for EventStream<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}
