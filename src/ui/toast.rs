use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::Severity;
use crate::ui::surface::UiSurface;

/// One toast notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

/// Owns toast presentation: shows a toast through the surface and
/// schedules its auto-dismiss.
pub struct ToastManager {
    surface: Arc<dyn UiSurface>,
    duration: Duration,
    next_id: AtomicU64,
}

impl ToastManager {
    pub fn new(surface: Arc<dyn UiSurface>, duration: Duration) -> Self {
        Self {
            surface,
            duration,
            next_id: AtomicU64::new(1),
        }
    }

    /// Show a toast; it is dismissed automatically after the configured
    /// duration.
    pub fn show(&self, message: &str, severity: Severity) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.to_string(),
            severity,
        };
        self.surface.show_toast(&toast);

        let surface = Arc::clone(&self.surface);
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            surface.dismiss_toast(id);
        });

        id
    }

    pub fn info(&self, message: &str) -> u64 {
        self.show(message, Severity::Info)
    }

    pub fn success(&self, message: &str) -> u64 {
        self.show(message, Severity::Success)
    }

    pub fn warning(&self, message: &str) -> u64 {
        self.show(message, Severity::Warning)
    }

    pub fn error(&self, message: &str) -> u64 {
        self.show(message, Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::surface::RecordingSurface;

    #[tokio::test]
    async fn toast_is_shown_then_auto_dismissed() {
        let surface = Arc::new(RecordingSurface::new());
        let manager = ToastManager::new(surface.clone(), Duration::from_millis(20));

        let id = manager.success("Login successful!");
        assert_eq!(surface.toasts().len(), 1);
        assert!(surface.dismissed_toasts().is_empty());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(surface.dismissed_toasts(), vec![id]);
    }
}
