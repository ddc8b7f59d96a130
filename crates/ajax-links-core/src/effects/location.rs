//! Location effect interface

/// Full-page navigation, the fallback for every unrecoverable navigation
pub trait LocationEffects {
    /// Navigate the whole page to `url`
    fn assign(&self, url: &str);
}
