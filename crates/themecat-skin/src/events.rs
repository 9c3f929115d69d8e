//! Observer channel: lifecycle events, published snapshots, success toasts.

use crate::publish::PublishedState;
use themecat_types::error::CatalogError;

/// Notifications emitted by [`crate::ThemeService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    /// The catalog was created on first run.
    CatalogUpdated,
    ThemeUpdated,
    SkinUpdated,
    /// The catalog store failed; the message is the store error.
    DeviceError(String),
}

/// Colour hints for a success toast, taken from the published theme/skin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastStyle {
    /// Skin `textHighlightColor`.
    pub color: Option<String>,
    /// Theme `notificationBarIconColor`.
    pub icon_color: Option<String>,
    /// Theme `notificationBarBackground`.
    pub bar_background: Option<String>,
}

/// A user-facing success notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub style: ToastStyle,
}

impl Toast {
    pub fn success(message: impl Into<String>, style: ToastStyle) -> Self {
        Self {
            title: "Success".to_string(),
            message: message.into(),
            style,
        }
    }
}

/// Receives everything the service announces. Only [`Observer::on_event`]
/// is required.
pub trait Observer: Send {
    fn on_event(&mut self, event: &CatalogEvent);

    /// A new snapshot was published.
    fn on_publish(&mut self, _state: &PublishedState) {}

    fn on_success(&mut self, _toast: &Toast) {}
}

/// Fan-out to the registered observers, in registration order.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Box<dyn Observer>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn emit(&mut self, event: CatalogEvent) {
        log::debug!("Event: {event:?}");
        for obs in &mut self.observers {
            obs.on_event(&event);
        }
    }

    pub fn publish(&mut self, state: &PublishedState) {
        for obs in &mut self.observers {
            obs.on_publish(state);
        }
    }

    pub fn success(&mut self, toast: Toast) {
        log::info!("{}: {}", toast.title, toast.message);
        for obs in &mut self.observers {
            obs.on_success(&toast);
        }
    }

    /// Report a store failure as [`CatalogEvent::DeviceError`] and hand the
    /// error back for propagation.
    pub(crate) fn device_error(&mut self, err: CatalogError) -> CatalogError {
        log::error!("Catalog store failure: {err}");
        self.emit(CatalogEvent::DeviceError(err.to_string()));
        err
    }
}
