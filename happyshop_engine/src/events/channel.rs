//! Observer notification channels.
//!
//! The hub owns one [`ObserverRegistry`] per observer flavour and publishes a fresh projection event after every
//! committed change. Each registered observer holds an [`ObserverHandle`]: a private, unbounded queue that preserves
//! every published event in commit order. Rendering happens on the observer's own task, never on the thread that
//! drove the hub operation.

use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::sync::mpsc;

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

#[derive(Debug)]
pub struct ObserverRegistry<E: Clone + Send + 'static> {
    senders: Vec<mpsc::UnboundedSender<E>>,
}

impl<E: Clone + Send + 'static> Default for ObserverRegistry<E> {
    fn default() -> Self {
        Self { senders: Vec::new() }
    }
}

impl<E: Clone + Send + 'static> ObserverRegistry<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new observer and immediately queues `initial` on it, so the observer starts from a consistent
    /// snapshot rather than waiting for the next change.
    pub fn subscribe(&mut self, initial: E) -> ObserverHandle<E> {
        let (sender, receiver) = mpsc::unbounded_channel();
        if sender.send(initial).is_err() {
            warn!("📬️ New observer hung up before its initial snapshot was delivered");
        }
        self.senders.push(sender);
        ObserverHandle { receiver }
    }

    /// Sends `event` to every registered observer, in registration order. Observers whose handles have been dropped
    /// are pruned here.
    pub fn publish(&mut self, event: E) {
        self.senders.retain(|sender| match sender.send(event.clone()) {
            Ok(()) => true,
            Err(_) => {
                debug!("📬️ Dropping disconnected observer");
                false
            },
        });
    }

    pub fn observer_count(&self) -> usize {
        self.senders.len()
    }
}

/// The receiving half of an observer registration. Events arrive in the exact order the hub committed them.
pub struct ObserverHandle<E> {
    receiver: mpsc::UnboundedReceiver<E>,
}

impl<E: Send + 'static> ObserverHandle<E> {
    /// Waits for the next event. Returns `None` once the hub (and with it the sending half) has been dropped.
    pub async fn recv(&mut self) -> Option<E> {
        self.receiver.recv().await
    }

    /// Non-blocking poll for an already-queued event.
    pub fn try_recv(&mut self) -> Option<E> {
        self.receiver.try_recv().ok()
    }

    /// Consumes the handle and dispatches every event to `handler`, one at a time. This is the observer's dispatch
    /// loop: the handler runs to completion before the next event is taken, so an observer's view can never be
    /// redrawn out of order.
    pub async fn run_with(mut self, handler: Handler<E>) {
        debug!("📬️ Starting observer dispatch loop");
        while let Some(event) = self.receiver.recv().await {
            trace!("📬️ Dispatching event to observer");
            (handler)(event).await;
        }
        debug!("📬️ Observer dispatch loop has shut down");
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    #[tokio::test]
    async fn subscribers_get_the_initial_snapshot_first() {
        let mut registry = ObserverRegistry::new();
        let mut handle = registry.subscribe(1u64);
        registry.publish(2);
        registry.publish(3);
        assert_eq!(handle.recv().await, Some(1));
        assert_eq!(handle.recv().await, Some(2));
        assert_eq!(handle.recv().await, Some(3));
        assert_eq!(handle.try_recv(), None);
    }

    #[tokio::test]
    async fn dropped_observers_are_pruned_on_publish() {
        let mut registry = ObserverRegistry::new();
        let handle = registry.subscribe(0u64);
        let mut live = registry.subscribe(0u64);
        assert_eq!(registry.observer_count(), 2);
        drop(handle);
        registry.publish(7);
        assert_eq!(registry.observer_count(), 1);
        assert_eq!(live.try_recv(), Some(0));
        assert_eq!(live.try_recv(), Some(7));
    }

    #[tokio::test]
    async fn run_with_dispatches_serially() {
        let total = Arc::new(AtomicU64::new(0));
        let mut registry = ObserverRegistry::new();
        let handle = registry.subscribe(1u64);
        for v in 2..=5u64 {
            registry.publish(v);
        }
        drop(registry);
        let sum = total.clone();
        let handler: Handler<u64> = Arc::new(move |v| {
            let sum = sum.clone();
            Box::pin(async move {
                sum.fetch_add(v, Ordering::SeqCst);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        });
        handle.run_with(handler).await;
        assert_eq!(total.load(Ordering::SeqCst), 15);
    }
}
