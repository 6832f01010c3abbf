use super::{AppEvent, EventPublisher};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

pub type Listener = Arc<dyn Fn(&AppEvent) + Send + Sync>;

/// A listener that declares which events it wants.
pub trait EventSubscriber: Send + Sync {
    fn subscribed_events(&self) -> Vec<AppEvent>;

    fn on_event(&self, event: &AppEvent);
}

/// In-process dispatcher. Listeners run in registration order on the
/// publishing thread.
#[derive(Default)]
pub struct EventDispatcher {
    /// `None` matches every event.
    listeners: RwLock<Vec<(Option<AppEvent>, Listener)>>,
    events_published: AtomicU64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener<F>(&self, event: AppEvent, listener: F)
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        self.listeners.write().push((Some(event), Arc::new(listener)));
    }

    /// Listen to every event.
    pub fn add_global_listener<F>(&self, listener: F)
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        self.listeners.write().push((None, Arc::new(listener)));
    }

    pub fn add_subscriber(&self, subscriber: Arc<dyn EventSubscriber>) {
        let mut listeners = self.listeners.write();
        for event in subscriber.subscribed_events() {
            let subscriber = subscriber.clone();
            listeners.push((Some(event), Arc::new(move |e: &AppEvent| subscriber.on_event(e))));
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

impl EventPublisher for EventDispatcher {
    fn publish(&self, event: &AppEvent) {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        // Snapshot so a listener may register further listeners.
        let matching: Vec<Listener> = self
            .listeners
            .read()
            .iter()
            .filter(|(filter, _)| filter.map_or(true, |f| f == *event))
            .map(|(_, listener)| listener.clone())
            .collect();

        trace!(event = event.name(), listeners = matching.len(), "dispatching");
        for listener in matching {
            listener(event);
        }
    }
}

/// Registration surface handed to kernels and bundles during the
/// dispatcher and bundles phases.
#[derive(Clone)]
pub struct EventDispatcherConfigurator {
    dispatcher: Arc<EventDispatcher>,
}

impl EventDispatcherConfigurator {
    pub fn new(dispatcher: Arc<EventDispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn add_listener<F>(&self, event: AppEvent, listener: F)
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        self.dispatcher.add_listener(event, listener);
    }

    pub fn add_global_listener<F>(&self, listener: F)
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        self.dispatcher.add_global_listener(listener);
    }

    pub fn add_subscriber(&self, subscriber: Arc<dyn EventSubscriber>) {
        self.dispatcher.add_subscriber(subscriber);
    }

    pub fn dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.dispatcher
    }
}
