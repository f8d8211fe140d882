//! User-facing notices emitted by the pipeline.

/// A user-visible condition the embedding application should surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A completed request produced zero usable records. The map was left
    /// unchanged; without a notice this would be indistinguishable from data
    /// that has not loaded yet.
    EmptyResult {
        /// Key of the overlay the request targeted.
        overlay: String,
    },
}

/// Channel through which the pipeline surfaces notices to the user.
///
/// How a notice is presented (toast, status bar, log line) is up to the
/// embedding application.
pub trait Messenger: Send + Sync {
    /// Delivers a notice to the user.
    fn notice(&self, notice: &Notice);
}

impl<T: Messenger + ?Sized> Messenger for std::sync::Arc<T> {
    fn notice(&self, notice: &Notice) {
        (**self).notice(notice)
    }
}

/// Messenger that discards all notices.
pub struct DummyMessenger;

impl Messenger for DummyMessenger {
    fn notice(&self, _notice: &Notice) {}
}
