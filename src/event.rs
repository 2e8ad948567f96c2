//! Cooperative, single-threaded event dispatch.
//!
//! Everything inside a client talks through named events: the IO loop posts
//! `read_ready`, the parser posts one event per protocol command, the state
//! tracker posts `mode_*` events, and handlers post whatever they like.
//! [`EventQueue::run`] drains the queue to completion, so a handler never
//! runs concurrently with another handler of the same client.
//!
//! # Exit
//!
//! An `exit` event is never dispatched where it sits. The drain pass keeps
//! going until the queue is empty, then the exit handlers run once, the
//! queue is discarded, and [`Drain::Exit`] is returned. Anything posted by
//! an exit handler is dropped. Only the first `exit` of a pass is honoured.
//!
//! # Re-posting
//!
//! Posting always enqueues, even if an event with the same name is already
//! waiting. Handlers for internal signals are written so a redundant
//! dispatch is harmless.

use std::borrow::{Borrow, Cow};
use std::collections::hash_map::{Entry, HashMap};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::message::Message;
use crate::mode::ModeChange;
use crate::response::Response;

/// The name an event is posted and handled under.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventName(Cow<'static, str>);

impl EventName {
    /// The socket has bytes to read.
    pub const READ_READY: EventName = EventName::from_static("read_ready");
    /// The socket can take more output.
    pub const WRITE_READY: EventName = EventName::from_static("write_ready");
    /// Complete lines are waiting in the receive buffer.
    pub const RECVQ_READY: EventName = EventName::from_static("recvq_ready");
    /// The transport failed or our own QUIT was seen.
    pub const DEAD: EventName = EventName::from_static("dead");
    /// Stop the client after the current drain pass.
    pub const EXIT: EventName = EventName::from_static("exit");

    pub const fn from_static(name: &'static str) -> Self {
        EventName(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EventName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        EventName(Cow::Owned(name.to_owned()))
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        EventName(Cow::Owned(name))
    }
}

impl From<&EventName> for EventName {
    fn from(name: &EventName) -> Self {
        name.clone()
    }
}

/// Numerics are handled under their three-digit code.
impl From<Response> for EventName {
    fn from(resp: Response) -> Self {
        EventName(Cow::Owned(resp.to_string()))
    }
}

/// One argument carried by an [`Event`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventArg {
    Message(Arc<Message>),
    Mode(ModeChange),
    Text(String),
}

/// A named event and its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub name: EventName,
    pub args: Vec<EventArg>,
}

impl Event {
    pub fn new(name: impl Into<EventName>, args: Vec<EventArg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The first message argument, if any.
    pub fn message(&self) -> Option<&Message> {
        self.args.iter().find_map(|arg| match arg {
            EventArg::Message(msg) => Some(msg.as_ref()),
            _ => None,
        })
    }

    /// The first mode change argument, if any.
    pub fn mode(&self) -> Option<&ModeChange> {
        self.args.iter().find_map(|arg| match arg {
            EventArg::Mode(change) => Some(change),
            _ => None,
        })
    }

    /// The first text argument, if any.
    pub fn text(&self) -> Option<&str> {
        self.args.iter().find_map(|arg| match arg {
            EventArg::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A registered handler. It gets the owning context mutably, so it can post
/// further events or queue output.
pub type Handler<C> = Box<dyn FnMut(&mut C, &Event) + Send>;

/// How a drain pass ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Drain {
    /// The queue is empty; wait for more input.
    Idle,
    /// An `exit` event was handled; the owner should stop.
    Exit,
}

/// Anything that owns an [`EventQueue`] dispatching to itself.
pub trait Dispatcher: Sized {
    fn event_queue(&mut self) -> &mut EventQueue<Self>;
}

/// FIFO queue of events plus the handlers registered for them.
pub struct EventQueue<C> {
    queue: VecDeque<Event>,
    handlers: HashMap<EventName, Vec<Handler<C>>>,
}

impl<C> Default for EventQueue<C> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
            handlers: HashMap::new(),
        }
    }
}

impl<C> fmt::Debug for EventQueue<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("queue", &self.queue)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<C> EventQueue<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue an event.
    pub fn post(&mut self, name: impl Into<EventName>, args: Vec<EventArg>) {
        self.queue.push_back(Event::new(name, args));
    }

    /// Register a handler. Handlers of one name run in registration order.
    pub fn handle<F>(&mut self, name: impl Into<EventName>, handler: F)
    where
        F: FnMut(&mut C, &Event) + Send + 'static,
    {
        self.handlers
            .entry(name.into())
            .or_default()
            .push(Box::new(handler));
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of handlers registered under `name`.
    pub fn handler_count(&self, name: &str) -> usize {
        self.handlers.get(name).map_or(0, Vec::len)
    }

    /// Drop everything still queued.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl<C: Dispatcher> EventQueue<C> {
    /// Drain `ctx`'s queue, including events posted while draining.
    pub fn run(ctx: &mut C) -> Drain {
        let mut exit = None;

        while let Some(event) = ctx.event_queue().queue.pop_front() {
            if event.name == EventName::EXIT {
                exit.get_or_insert(event);
                continue;
            }
            Self::dispatch(ctx, &event);
        }

        match exit {
            Some(event) => {
                Self::dispatch(ctx, &event);
                ctx.event_queue().clear();
                Drain::Exit
            }
            None => Drain::Idle,
        }
    }

    /// Invoke every handler of `event.name`.
    ///
    /// The handler list is lifted out of the map while it runs, so handlers
    /// may register more handlers; ones added for the same name are kept
    /// and run from the next dispatch on.
    fn dispatch(ctx: &mut C, event: &Event) {
        let Some(mut handlers) = ctx.event_queue().handlers.remove(&event.name) else {
            return;
        };

        for handler in handlers.iter_mut() {
            handler(ctx, event);
        }

        match ctx.event_queue().handlers.entry(event.name.clone()) {
            Entry::Occupied(mut added) => {
                handlers.append(added.get_mut());
                added.insert(handlers);
            }
            Entry::Vacant(slot) => {
                slot.insert(handlers);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Ctx {
        queue: EventQueue<Ctx>,
        seen: Vec<String>,
    }

    impl Dispatcher for Ctx {
        fn event_queue(&mut self) -> &mut EventQueue<Self> {
            &mut self.queue
        }
    }

    fn record(tag: &'static str) -> impl FnMut(&mut Ctx, &Event) + Send {
        move |ctx, event| ctx.seen.push(format!("{tag}:{}", event.name))
    }

    #[test]
    fn test_handlers_run_in_order() {
        let mut ctx = Ctx::default();
        ctx.queue.handle("PING", record("a"));
        ctx.queue.handle("PING", record("b"));
        ctx.queue.post("PING", vec![]);

        assert_eq!(EventQueue::run(&mut ctx), Drain::Idle);
        assert_eq!(ctx.seen, ["a:PING", "b:PING"]);
        assert!(!ctx.queue.has_pending());
    }

    #[test]
    fn test_unknown_events_dropped() {
        let mut ctx = Ctx::default();
        ctx.queue.post("NOBODY", vec![]);
        assert_eq!(EventQueue::run(&mut ctx), Drain::Idle);
        assert!(ctx.seen.is_empty());
    }

    #[test]
    fn test_events_posted_while_draining_run_same_pass() {
        let mut ctx = Ctx::default();
        ctx.queue.handle("first", |ctx: &mut Ctx, _: &Event| {
            ctx.seen.push("first".into());
            ctx.queue.post("second", vec![]);
        });
        ctx.queue.handle("second", record("x"));
        ctx.queue.post("first", vec![]);

        let _ = EventQueue::run(&mut ctx);
        assert_eq!(ctx.seen, ["first", "x:second"]);
    }

    #[test]
    fn test_repost_always_enqueues() {
        let mut ctx = Ctx::default();
        ctx.queue.handle("tick", record("t"));
        ctx.queue.post("tick", vec![]);
        ctx.queue.post("tick", vec![]);
        assert_eq!(ctx.queue.len(), 2);

        let _ = EventQueue::run(&mut ctx);
        assert_eq!(ctx.seen.len(), 2);
    }

    #[test]
    fn test_exit_deferred_to_end() {
        let mut ctx = Ctx::default();
        ctx.queue.handle(EventName::EXIT, |ctx: &mut Ctx, _: &Event| {
            ctx.seen.push("exit".into());
            ctx.queue.post("late", vec![]);
        });
        ctx.queue.handle("a", record("h"));
        ctx.queue.handle("late", record("h"));

        ctx.queue.post(EventName::EXIT, vec![]);
        ctx.queue.post("a", vec![]);
        ctx.queue.post(EventName::EXIT, vec![]);

        assert_eq!(EventQueue::run(&mut ctx), Drain::Exit);
        assert_eq!(ctx.seen, ["h:a", "exit"]);
        assert!(!ctx.queue.has_pending());
    }

    #[test]
    fn test_handler_registered_during_dispatch() {
        let mut ctx = Ctx::default();
        ctx.queue.handle("ev", |ctx: &mut Ctx, _: &Event| {
            ctx.seen.push("orig".into());
            if ctx.queue.handler_count("ev") == 0 {
                ctx.queue.handle("ev", record("new"));
            }
        });

        ctx.queue.post("ev", vec![]);
        let _ = EventQueue::run(&mut ctx);
        assert_eq!(ctx.seen, ["orig"]);
        assert_eq!(ctx.queue.handler_count("ev"), 2);

        ctx.queue.post("ev", vec![]);
        let _ = EventQueue::run(&mut ctx);
        assert_eq!(ctx.seen, ["orig", "orig", "new:ev"]);
    }

    #[test]
    fn test_event_accessors() {
        let msg = Arc::new(Message::parse("PING :x").unwrap());
        let event = Event::new(
            "PING",
            vec![EventArg::Text("t".into()), EventArg::Message(msg.clone())],
        );
        assert_eq!(event.message(), Some(msg.as_ref()));
        assert_eq!(event.text(), Some("t"));
        assert_eq!(event.mode(), None);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(EventName::from(Response::RPL_WELCOME).as_str(), "001");
        assert_eq!(EventName::from("JOIN"), EventName::from("JOIN".to_string()));
        assert_eq!(EventName::DEAD.to_string(), "dead");
    }
}
