use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// Invalidates cached renderings of a view so the next request rebuilds it
#[async_trait]
pub trait PathRevalidator: Send + Sync {
    async fn revalidate(&self, path: &str);
}

/// Process-local revalidation: every call bumps a per-path generation.
/// Renderers compare the generation they cached against the current one.
#[derive(Debug, Default)]
pub struct InMemoryRevalidator {
    generations: RwLock<HashMap<String, u64>>,
}

impl InMemoryRevalidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current generation of a path; zero if it was never revalidated
    pub async fn generation(&self, path: &str) -> u64 {
        self.generations.read().await.get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl PathRevalidator for InMemoryRevalidator {
    async fn revalidate(&self, path: &str) {
        let mut generations = self.generations.write().await;
        let generation = generations.entry(path.to_string()).or_insert(0);
        *generation += 1;
        debug!("Revalidated {} (generation {})", path, generation);
    }
}
