pub mod billing;
pub mod realtime;
pub mod session;

pub use billing::BillingService;
pub use realtime::RealtimeService;
pub use session::{IdentityObserver, IdentityScope, SessionService};
