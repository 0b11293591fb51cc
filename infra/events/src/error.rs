use std::borrow::Cow;

/// Event bus failures. Every variant names the event type in `message`.
#[tport_derive::tport_error]
pub enum EventBusError {
    /// Nobody registered a consumer for this event type.
    #[error("No consumer{}: {message}", format_context(.context))]
    NoConsumer { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The bounded queue is at capacity; the event was not enqueued.
    #[error("Queue full{}: {message}", format_context(.context))]
    QueueFull { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The consumer dropped its receiver.
    #[error("Queue closed{}: {message}", format_context(.context))]
    QueueClosed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Consumer already registered{}: {message}", format_context(.context))]
    AlreadyConsumed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The registry holds a sender of a different type under this `TypeId`.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
