/// Message shown to the user when a photo contains no faces.
pub const NO_FACE_MESSAGE: &str = "No face detected";

/// Receives user-facing messages from the pipeline.
///
/// The only message today is [`NO_FACE_MESSAGE`], sent once per photo with no faces.
/// Any `Fn(&str)` closure works as a notifier.
pub trait Notifier: Send + Sync {
    /// Show `message` to the user.
    fn notify(&self, message: &str);
}

impl<F> Notifier for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, message: &str) {
        self(message)
    }
}

/// Default notifier: logs the message at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::info!("{message}");
    }
}
