//! Mode change notifications

use std::sync::Arc;

/// Notified after every completed switch
pub trait ModeObserver: Send + Sync {
    /// `previous` is `None` when no mode was active before
    fn on_mode_changed(&self, previous: Option<&str>, current: &str);
}

impl<F> ModeObserver for F
where
    F: Fn(Option<&str>, &str) + Send + Sync,
{
    fn on_mode_changed(&self, previous: Option<&str>, current: &str) {
        self(previous, current)
    }
}

/// Observers in registration order
#[derive(Default, Clone)]
pub struct ObserverList {
    observers: Vec<Arc<dyn ModeObserver>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn ModeObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn notify(&self, previous: Option<&str>, current: &str) {
        for observer in &self.observers {
            observer.on_mode_changed(previous, current);
        }
    }
}
