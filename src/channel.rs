use std::{
    sync::{Condvar, Mutex},
    time::Duration,
};

/// Thread-safe, bounded-to-one, latest-wins rendezvous between exactly one
/// producer and one consumer. Publishing always overwrites any value the
/// consumer hasn't read yet; nothing is ever queued.
pub struct StateChannel<T> {
    state: Mutex<Slot<T>>,
    condvar: Condvar,
}

struct Slot<T> {
    value: Option<T>,
    closed: bool,
}

/// What `get` can hand back.
pub enum Recv<T> {
    Value(T),
    Closed,
}

/// Distinguishes "nothing happened in time" from "the channel closed".
#[derive(Debug, thiserror::Error)]
#[error("state channel `get` timed out")]
pub struct RecvTimeout;

impl<T> Default for StateChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateChannel<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Slot {
                value: None,
                closed: false,
            }),
            condvar: Condvar::new(),
        }
    }

    /// Replace any pending value and wake the (single) waiting consumer.
    /// Never blocks, never fails: the whole point is that a slow consumer
    /// cannot make the solver stall.
    pub fn publish(&self, value: T) {
        let mut slot = self.state.lock().unwrap();
        slot.value = Some(value);
        self.condvar.notify_one();
    }

    /// Mark the channel closed. Idempotent: closing an already-closed
    /// channel is a no-op, not an error, so the solver's cleanup path can
    /// call it unconditionally on every exit.
    pub fn close(&self) {
        let mut slot = self.state.lock().unwrap();
        slot.closed = true;
        self.condvar.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    /// Block until a value is published or the channel closes.
    ///
    /// If a value was published before `close()` was called, that value is
    /// still returned here even if this call only reaches the lock after
    /// `close()` ran. Closing never discards a pending value.
    pub fn get(&self) -> Recv<T> {
        let mut slot = self.state.lock().unwrap();
        loop {
            if let Some(value) = slot.value.take() {
                return Recv::Value(value);
            }
            if slot.closed {
                return Recv::Closed;
            }
            slot = self.condvar.wait(slot).unwrap();
        }
    }

    /// Same as `get`, but gives up after `timeout` with a distinct error
    /// instead of blocking forever. Intended for UI health checks; the
    /// solver itself never calls this.
    pub fn get_timeout(&self, timeout: Duration) -> Result<Recv<T>, RecvTimeout> {
        let slot = self.state.lock().unwrap();
        let (mut slot, result) = self
            .condvar
            .wait_timeout_while(slot, timeout, |slot| slot.value.is_none() && !slot.closed)
            .unwrap();

        if result.timed_out() {
            return Err(RecvTimeout);
        }

        match slot.value.take() {
            Some(value) => Ok(Recv::Value(value)),
            None => Ok(Recv::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, thread, time::Duration};

    #[test]
    fn publish_then_get_returns_value() {
        let channel = StateChannel::new();
        channel.publish(42);
        match channel.get() {
            Recv::Value(v) => assert_eq!(v, 42),
            Recv::Closed => panic!("expected a value"),
        }
    }

    #[test]
    fn publish_overwrites_pending_value() {
        let channel = StateChannel::new();
        channel.publish(1);
        channel.publish(2);
        match channel.get() {
            Recv::Value(v) => assert_eq!(v, 2),
            Recv::Closed => panic!("expected a value"),
        }
    }

    #[test]
    fn get_blocks_until_published() {
        let channel = Arc::new(StateChannel::new());
        let producer = channel.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            producer.publish("hello");
        });

        match channel.get() {
            Recv::Value(v) => assert_eq!(v, "hello"),
            Recv::Closed => panic!("expected a value"),
        }
        handle.join().unwrap();
    }

    #[test]
    fn close_without_pending_value_wakes_consumer_as_closed() {
        let channel: StateChannel<i32> = StateChannel::new();
        channel.close();
        assert!(matches!(channel.get(), Recv::Closed));
    }

    /// Property 6: publish-before-close is observed, never coalesced into
    /// the closed sentinel.
    #[test]
    fn publish_before_close_is_not_lost() {
        let channel: StateChannel<i32> = StateChannel::new();
        channel.publish(7);
        channel.close();
        match channel.get() {
            Recv::Value(v) => assert_eq!(v, 7),
            Recv::Closed => panic!("publish-before-close must be observed"),
        }
        // slot is now empty, further gets observe closure
        assert!(matches!(channel.get(), Recv::Closed));
    }

    #[test]
    fn get_timeout_reports_distinct_error_when_nothing_published() {
        let channel: StateChannel<i32> = StateChannel::new();
        let err = channel.get_timeout(Duration::from_millis(10));
        assert!(err.is_err());
    }

    #[test]
    fn get_timeout_succeeds_once_closed() {
        let channel: StateChannel<i32> = StateChannel::new();
        channel.close();
        let result = channel.get_timeout(Duration::from_millis(10));
        assert!(matches!(result, Ok(Recv::Closed)));
    }
}
