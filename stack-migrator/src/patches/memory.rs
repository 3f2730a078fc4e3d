//! In-memory patch source.

use super::{PatchError, PatchSource};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

/// Serves patches from memory and records requested URLs (for testing).
///
/// URLs without a registered patch answer with [`PatchError::Download`].
#[derive(Default)]
pub struct MemoryPatchSource {
    patches: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
    delay: Option<Duration>,
}

impl MemoryPatchSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the body served at `url`.
    #[must_use]
    pub fn with_patch(mut self, url: &str, body: &str) -> Self {
        self.patches.insert(url.to_string(), body.to_string());
        self
    }

    /// Delays every download by `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs requested so far, in order.
    pub fn requested(&self) -> Vec<String> {
        self.requested
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait::async_trait]
impl PatchSource for MemoryPatchSource {
    async fn download(&self, url: &Url) -> Result<String, PatchError> {
        self.requested
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.patches
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| PatchError::Download {
                url: url.to_string(),
                message: "server answered 404 Not Found".to_string(),
            })
    }
}
