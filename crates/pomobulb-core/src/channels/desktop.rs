use notify_rust::Notification;

use super::traits::DesktopChannel;
use crate::error::NotifyError;

const APP_NAME: &str = "pomobulb";
const DEFAULT_SOUND: &str = "message-new-instant";

/// Desktop popups through the platform notification service, each with a
/// freedesktop sound.
#[derive(Debug, Clone, Copy)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DesktopChannel for DesktopNotifier {
    fn notify(&mut self, title: &str, message: &str) -> Result<(), NotifyError> {
        Notification::new()
            .appname(APP_NAME)
            .summary(title)
            .body(message)
            .sound_name(DEFAULT_SOUND)
            .show()
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}
