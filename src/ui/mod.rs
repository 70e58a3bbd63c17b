pub mod loading;
pub mod render;
pub mod state;
pub mod surface;
pub mod toast;

pub use loading::{LoadingGate, LoadingGuard};
pub use render::{
    feed_entry_from_activity, feed_entry_from_event, management_view, render_chrome,
    render_subscription_from_profile, render_subscription_from_record, render_user_panel,
    ChromeView, FeedEntryView, ManagementView, PanelKind, PanelView,
};
pub use state::FeedPanel;
pub use surface::{RecordingSurface, TerminalSurface, UiSurface};
pub use toast::{Toast, ToastManager};
