use crate::heartbeat::{Heartbeat, HeartbeatResult};

/// The terminal delivery capability: one result per submitted heartbeat in
/// matching order, or a top-level error if the batch could not be attempted.
pub trait Sender {
    fn send_heartbeats(&self, heartbeats: &[Heartbeat]) -> anyhow::Result<Vec<HeartbeatResult>>;
}

/// A processing step over a heartbeat batch.
pub type Handle<'a> = Box<dyn Fn(Vec<Heartbeat>) -> anyhow::Result<Vec<HeartbeatResult>> + 'a>;

/// Wraps a [`Handle`] to produce a new `Handle`, allowing steps to be chained.
pub type HandleOption<'a> = Box<dyn FnOnce(Handle<'a>) -> Handle<'a> + 'a>;

/// Compose `options` around the sender. Options are applied in reverse so
/// the first registered option is the outermost layer: its pre-logic runs
/// first on the way in and its post-logic last on the way out.
pub fn build_handle<'a, S>(sender: &'a S, options: Vec<HandleOption<'a>>) -> Handle<'a>
where
    S: Sender + ?Sized,
{
    let mut handle: Handle<'a> = Box::new(move |heartbeats| sender.send_heartbeats(&heartbeats));
    for option in options.into_iter().rev() {
        handle = option(handle);
    }
    handle
}
