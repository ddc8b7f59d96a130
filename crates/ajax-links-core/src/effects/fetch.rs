//! Fetch effect interface

use crate::errors::FetchError;
use async_trait::async_trait;

/// HTTP transport used for fragment fetches
#[async_trait(?Send)]
pub trait FetchEffects {
    /// Issue a GET to `url` and return the response body as text
    async fn get_html(&self, url: &str) -> Result<String, FetchError>;
}
