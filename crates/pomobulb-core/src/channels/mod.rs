mod bulb;
mod desktop;
pub mod traits;

pub use bulb::SmartBulbNotifier;
pub use desktop::DesktopNotifier;
pub use traits::{BulbChannel, DesktopChannel, NoOpBulb, NoOpDesktop};

use crate::payload::PhasePayloads;

/// Title of every desktop popup.
pub const NOTIFICATION_TITLE: &str = "Pomodoro Timer";

/// The notification channels handed to the engine.
///
/// `payloads` is `None` when the bulb is disabled; the engine then skips
/// payload lookup and never calls `apply`.
pub struct Channels {
    pub bulb: Box<dyn BulbChannel>,
    pub desktop: Box<dyn DesktopChannel>,
    pub payloads: Option<PhasePayloads>,
}

impl Channels {
    pub fn new(bulb: Box<dyn BulbChannel>, desktop: Box<dyn DesktopChannel>) -> Self {
        Self {
            bulb,
            desktop,
            payloads: None,
        }
    }

    /// Both channels disabled.
    pub fn silent() -> Self {
        Self::new(Box::new(NoOpBulb), Box::new(NoOpDesktop))
    }

    pub fn with_payloads(mut self, payloads: PhasePayloads) -> Self {
        self.payloads = Some(payloads);
        self
    }
}

impl std::fmt::Debug for Channels {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channels")
            .field("bulb", &self.bulb.name())
            .field("payloads", &self.payloads.is_some())
            .finish_non_exhaustive()
    }
}
