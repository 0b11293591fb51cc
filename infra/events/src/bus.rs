use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace};

/// Anything that can travel across the bus.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

/// Receiving end handed to the consumer of `T`.
pub type EventReceiver<T> = mpsc::Receiver<Arc<T>>;

#[derive(Debug)]
struct Queue {
    capacity: usize,
    sender: Box<dyn Any + Send + Sync>,
}

/// Registry of bounded queues, one per event type. Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    queues: Arc<RwLock<FxHashMap<TypeId, Queue>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the single consumer of `T` and returns its receiver.
    ///
    /// # Errors
    ///
    /// [`EventBusError::InvalidCapacity`] for zero capacity and
    /// [`EventBusError::AlreadyConsumed`] when `T` already has a consumer.
    pub fn consume<T: Event>(&self, capacity: usize) -> Result<EventReceiver<T>, EventBusError> {
        if capacity == 0 {
            return Err(EventBusError::InvalidCapacity {
                message: "capacity must be at least 1".into(),
                context: Some(type_name::<T>().into()),
            });
        }

        let mut queues = self.queues.write();
        let id = TypeId::of::<T>();
        if let Some(existing) = queues.get(&id) {
            let live = existing
                .sender
                .downcast_ref::<mpsc::Sender<Arc<T>>>()
                .is_some_and(|tx| !tx.is_closed());
            if live {
                return Err(EventBusError::AlreadyConsumed {
                    message: type_name::<T>().into(),
                    context: None,
                });
            }
        }

        let (tx, rx) = mpsc::channel::<Arc<T>>(capacity);
        queues.insert(id, Queue { capacity, sender: Box::new(tx) });
        debug!(event = type_name::<T>(), capacity, "Event consumer registered");
        Ok(rx)
    }

    /// Enqueues `event` without waiting.
    ///
    /// # Errors
    ///
    /// [`EventBusError::NoConsumer`], [`EventBusError::QueueFull`] or
    /// [`EventBusError::QueueClosed`]; the event is dropped in every case.
    pub fn enqueue<T: Event>(&self, event: T) -> Result<(), EventBusError> {
        self.enqueue_arc(Arc::new(event))
    }

    /// Same as [`EventBus::enqueue`] for an already shared event.
    pub fn enqueue_arc<T: Event>(&self, event: Arc<T>) -> Result<(), EventBusError> {
        let sender = self.sender::<T>()?;
        match sender.try_send(event) {
            Ok(()) => {
                trace!(event = type_name::<T>(), "Event enqueued");
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(EventBusError::QueueFull {
                message: type_name::<T>().into(),
                context: None,
            }),
            Err(TrySendError::Closed(_)) => Err(EventBusError::QueueClosed {
                message: type_name::<T>().into(),
                context: None,
            }),
        }
    }

    /// Capacity of the queue for `T`, when a consumer is registered.
    #[must_use]
    pub fn capacity_of<T: Event>(&self) -> Option<usize> {
        self.queues.read().get(&TypeId::of::<T>()).map(|q| q.capacity)
    }

    /// Drops every sender so consumers observe the end of their stream once drained.
    /// Returns how many queues were closed.
    pub fn shutdown(&self) -> usize {
        let mut queues = self.queues.write();
        let closed = queues.len();
        queues.clear();
        debug!(closed, "Event bus shut down");
        closed
    }

    fn sender<T: Event>(&self) -> Result<mpsc::Sender<Arc<T>>, EventBusError> {
        let queues = self.queues.read();
        let queue = queues.get(&TypeId::of::<T>()).ok_or_else(|| EventBusError::NoConsumer {
            message: type_name::<T>().into(),
            context: None,
        })?;
        queue.sender.downcast_ref::<mpsc::Sender<Arc<T>>>().cloned().ok_or_else(|| {
            EventBusError::TypeMismatch { message: type_name::<T>().into(), context: None }
        })
    }
}
