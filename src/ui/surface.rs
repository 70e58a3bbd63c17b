use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::info;

use crate::ui::render::{ChromeView, ManagementView, PanelKind, PanelView};
use crate::ui::toast::Toast;

/// Thin adapter applying rendered views to whatever UI exists.
///
/// The services never build UI directly; they render views and hand
/// them to the surface. Implementations must be cheap and non-blocking.
pub trait UiSurface: Send + Sync {
    /// Apply a freshly rendered panel
    fn apply_panel(&self, kind: PanelKind, view: PanelView);

    /// Apply the authentication chrome
    fn set_chrome(&self, view: ChromeView);

    /// Show a toast
    fn show_toast(&self, toast: &Toast);

    /// Dismiss a toast by id
    fn dismiss_toast(&self, toast_id: u64);

    /// Show or hide the blocking loading indicator
    fn set_loading(&self, visible: bool);

    /// Ask the user to log in (the auth modal in the original UI)
    fn prompt_login(&self);

    /// Show the subscription-management surface
    fn show_management(&self, view: &ManagementView);
}

/// Surface printing to the terminal through the log pipeline.
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSurface for TerminalSurface {
    fn apply_panel(&self, kind: PanelKind, view: PanelView) {
        match view {
            PanelView::Placeholder(text) => info!("[{:?}] {}", kind, text),
            PanelView::Details(fields) => {
                info!("[{:?}]", kind);
                for (label, value) in fields {
                    info!("  {}: {}", label, value);
                }
            }
            PanelView::Feed(entries) => {
                info!("[{:?}] {} entries", kind, entries.len());
                for entry in entries {
                    info!("  {} [{}] {}", entry.time, entry.tag, entry.message);
                }
            }
        }
    }

    fn set_chrome(&self, view: ChromeView) {
        match view.logout_label {
            Some(label) => info!("[chrome] {}", label),
            None => info!("[chrome] Login | Sign Up"),
        }
    }

    fn show_toast(&self, toast: &Toast) {
        info!("[toast:{}] {}", toast.severity, toast.message);
    }

    fn dismiss_toast(&self, _toast_id: u64) {}

    fn set_loading(&self, visible: bool) {
        info!("[loading] {}", if visible { "shown" } else { "hidden" });
    }

    fn prompt_login(&self) {
        info!("[modal] login prompt opened");
    }

    fn show_management(&self, view: &ManagementView) {
        info!("[modal] {}", view.heading);
        for option in &view.options {
            info!("  - {}", option);
        }
    }
}

/// Surface that records every applied view, for tests and the demo's
/// final dump.
pub struct RecordingSurface {
    panels: Mutex<HashMap<PanelKind, PanelView>>,
    chrome: Mutex<Option<ChromeView>>,
    toasts: Mutex<Vec<Toast>>,
    dismissed: Mutex<Vec<u64>>,
    loading_transitions: Mutex<Vec<bool>>,
    login_prompts: AtomicUsize,
    management_opens: AtomicUsize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            panels: Mutex::new(HashMap::new()),
            chrome: Mutex::new(None),
            toasts: Mutex::new(Vec::new()),
            dismissed: Mutex::new(Vec::new()),
            loading_transitions: Mutex::new(Vec::new()),
            login_prompts: AtomicUsize::new(0),
            management_opens: AtomicUsize::new(0),
        }
    }

    /// Latest view applied to the given panel
    pub fn panel(&self, kind: PanelKind) -> Option<PanelView> {
        self.panels.lock().unwrap().get(&kind).cloned()
    }

    /// Latest chrome view
    pub fn chrome(&self) -> Option<ChromeView> {
        self.chrome.lock().unwrap().clone()
    }

    /// All toasts shown so far
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }

    /// Ids of toasts dismissed so far
    pub fn dismissed_toasts(&self) -> Vec<u64> {
        self.dismissed.lock().unwrap().clone()
    }

    /// Loading show/hide transitions in order
    pub fn loading_transitions(&self) -> Vec<bool> {
        self.loading_transitions.lock().unwrap().clone()
    }

    /// Whether the loading indicator is currently shown
    pub fn loading_visible(&self) -> bool {
        *self.loading_transitions.lock().unwrap().last().unwrap_or(&false)
    }

    pub fn login_prompts(&self) -> usize {
        self.login_prompts.load(Ordering::SeqCst)
    }

    pub fn management_opens(&self) -> usize {
        self.management_opens.load(Ordering::SeqCst)
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl UiSurface for RecordingSurface {
    fn apply_panel(&self, kind: PanelKind, view: PanelView) {
        self.panels.lock().unwrap().insert(kind, view);
    }

    fn set_chrome(&self, view: ChromeView) {
        *self.chrome.lock().unwrap() = Some(view);
    }

    fn show_toast(&self, toast: &Toast) {
        self.toasts.lock().unwrap().push(toast.clone());
    }

    fn dismiss_toast(&self, toast_id: u64) {
        self.dismissed.lock().unwrap().push(toast_id);
    }

    fn set_loading(&self, visible: bool) {
        self.loading_transitions.lock().unwrap().push(visible);
    }

    fn prompt_login(&self) {
        self.login_prompts.fetch_add(1, Ordering::SeqCst);
    }

    fn show_management(&self, _view: &ManagementView) {
        self.management_opens.fetch_add(1, Ordering::SeqCst);
    }
}
