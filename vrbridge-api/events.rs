/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

#[cfg(feature = "ipc")]
use serde::{Deserialize, Serialize};

/// Informational notifications forwarded to the host. Nothing in the
/// session's own state depends on them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "ipc", derive(Serialize, Deserialize))]
pub enum Event {
    /// A tracked device was attached.
    DeviceAttached(usize),
    /// A tracked device was detached.
    DeviceDetached(usize),
    /// A tracked device's properties changed.
    DeviceUpdated(usize),
}

pub trait EventSink: 'static + Send {
    fn notify(&mut self, event: Event);
}

impl<F: FnMut(Event) + 'static + Send> EventSink for F {
    fn notify(&mut self, event: Event) {
        self(event)
    }
}

/// Convenience structure for buffering up events
/// when no event sink has been set.
pub enum EventBuffer {
    Buffered(Vec<Event>),
    Sink(Box<dyn EventSink>),
}

impl Default for EventBuffer {
    fn default() -> Self {
        EventBuffer::Buffered(vec![])
    }
}

impl EventBuffer {
    pub fn callback(&mut self, event: Event) {
        match *self {
            EventBuffer::Buffered(ref mut events) => events.push(event),
            EventBuffer::Sink(ref mut sink) => sink.notify(event),
        }
    }

    pub fn upgrade(&mut self, mut sink: Box<dyn EventSink>) {
        if let EventBuffer::Buffered(ref mut events) = *self {
            for event in events.drain(..) {
                sink.notify(event)
            }
        }
        *self = EventBuffer::Sink(sink)
    }
}
