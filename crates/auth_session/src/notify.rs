use log::{error, info};

/// User-facing alerts raised by store operations.
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn confirm(&self, message: &str);

    fn error(&self, title: &str, message: &str);
}

/// Forwards alerts to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn confirm(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, title: &str, message: &str) {
        error!("{title}: {message}");
    }
}
