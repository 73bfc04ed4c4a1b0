/// When the per-cluster index tables are loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Load on the first query that needs them
    #[default]
    OnFirstAccess,
    /// Load while opening, so index errors surface immediately
    OnOpen,
}

/// Configuration for reading triMS5 files
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// When index tables are loaded
    pub load_policy: LoadPolicy,
}

impl ReaderConfig {
    /// Load index tables while opening (builder pattern)
    pub fn eager() -> Self {
        Self {
            load_policy: LoadPolicy::OnOpen,
        }
    }
}
