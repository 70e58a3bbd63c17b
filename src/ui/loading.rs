use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::ui::surface::UiSurface;

/// Blocking loading indicator used as a scoped acquisition around every
/// asynchronous external call. Counter-based so overlapping operations
/// keep the indicator up until the last one settles; the RAII guard
/// guarantees dismissal on both success and failure paths.
pub struct LoadingGate {
    surface: Arc<dyn UiSurface>,
    active: Arc<AtomicUsize>,
}

impl LoadingGate {
    pub fn new(surface: Arc<dyn UiSurface>) -> Self {
        Self {
            surface,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Show the indicator for the lifetime of the returned guard.
    pub fn acquire(&self) -> LoadingGuard {
        if self.active.fetch_add(1, Ordering::SeqCst) == 0 {
            self.surface.set_loading(true);
        }
        LoadingGuard {
            surface: Arc::clone(&self.surface),
            active: Arc::clone(&self.active),
        }
    }

    /// Whether any guarded operation is still in flight
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }
}

/// Scope guard keeping the loading indicator visible
pub struct LoadingGuard {
    surface: Arc<dyn UiSurface>,
    active: Arc<AtomicUsize>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.surface.set_loading(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::surface::RecordingSurface;

    #[tokio::test]
    async fn guard_dismisses_on_drop() {
        let surface = Arc::new(RecordingSurface::new());
        let gate = LoadingGate::new(surface.clone());

        {
            let _guard = gate.acquire();
            assert!(surface.loading_visible());
            assert!(gate.is_active());
        }
        assert!(!surface.loading_visible());
        assert!(!gate.is_active());
    }

    #[tokio::test]
    async fn overlapping_guards_dismiss_once() {
        let surface = Arc::new(RecordingSurface::new());
        let gate = LoadingGate::new(surface.clone());

        let first = gate.acquire();
        let second = gate.acquire();
        drop(first);
        assert!(surface.loading_visible());
        drop(second);
        assert!(!surface.loading_visible());

        // Exactly one show and one hide for the whole overlap.
        assert_eq!(surface.loading_transitions(), vec![true, false]);
    }
}
