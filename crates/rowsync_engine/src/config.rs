//! Configuration for loader runs.

/// Configuration for a [`crate::DataLoader`].
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Whether to resume from the last checkpointed cursor.
    ///
    /// When false the loader explicitly resets the pair's sync status and
    /// starts a full sync from the beginning.
    pub resume: bool,
    /// Maximum number of pages to process in one run, if bounded.
    pub max_pages: Option<u32>,
}

impl LoaderConfig {
    /// Creates the default configuration: resume enabled, unbounded pages.
    pub fn new() -> Self {
        Self {
            resume: true,
            max_pages: None,
        }
    }

    /// Disables resume; the run starts from the beginning.
    pub fn with_fresh_start(mut self) -> Self {
        self.resume = false;
        self
    }

    /// Bounds the number of pages processed in one run.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = Some(max_pages);
        self
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = LoaderConfig::new().with_fresh_start().with_max_pages(3);
        assert!(!config.resume);
        assert_eq!(config.max_pages, Some(3));

        let config = LoaderConfig::default();
        assert!(config.resume);
        assert_eq!(config.max_pages, None);
    }
}
