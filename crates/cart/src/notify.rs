//! User-facing notifications.
//!
//! Cart operations report failures through a [`Notifier`] instead of
//! returning them, the way a storefront shows a toast. Delivery is
//! fire-and-forget: nothing is returned and nothing is retried.

/// A sink for human-readable messages shown to the shopper.
pub trait Notifier {
    /// Show an error message.
    fn error(&self, message: &str);
}
