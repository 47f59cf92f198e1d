//! The mpsc plumbing behind the engine's event hooks.
//!
//! An [`EventHandler`] owns the receiving end of a bounded channel and a single async hook. Any number of
//! [`EventProducer`]s can be cloned off it before it starts; once the last producer is dropped the handler drains
//! what is left and shuts itself down. Hooks run as spawned tasks, so a slow hook delays its own event only.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{sync::mpsc, task::JoinSet};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub struct EventHandler<E: Send + Sync + 'static> {
    listener: mpsc::Receiver<E>,
    sender: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, handler }
    }

    /// A new producer feeding this handler. Producers are cheap clones of the channel's sending half.
    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.sender.clone())
    }

    /// Consumes the handler and runs it until every producer has been dropped, then waits for any hook invocations
    /// that are still in flight.
    pub async fn start_handler(mut self) {
        debug!("📬️ Event handler running");
        // The handler holds its own sender so that producers can subscribe before startup. It must go now, or the
        // receive loop below would never see the channel close.
        drop(self.sender);
        let mut jobs = JoinSet::new();
        while let Some(event) = self.listener.recv().await {
            let hook = Arc::clone(&self.handler);
            jobs.spawn(async move { (hook)(event).await });
            // Reap finished hook tasks as we go so the set stays small.
            while let Some(finished) = jobs.try_join_next() {
                if let Err(e) = finished {
                    warn!("📬️ An event hook panicked: {e}");
                }
            }
        }
        debug!("📬️ All producers are gone. Draining {} outstanding hook invocations.", jobs.len());
        while let Some(finished) = jobs.join_next().await {
            if let Err(e) = finished {
                warn!("📬️ An event hook panicked: {e}");
            }
        }
        debug!("📬️ Event handler has shut down");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    pub async fn publish_event(&self, event: E) {
        if let Err(e) = self.sender.send(event).await {
            error!("📬️ Failed to send event: {e}");
        }
    }
}
