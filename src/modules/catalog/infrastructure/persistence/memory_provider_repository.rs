use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::modules::catalog::domain::{Provider, ProviderRepository};
use crate::shared::errors::{AppError, AppResult};

/// Provider catalog held in memory, seeded at start-up
#[derive(Default)]
pub struct InMemoryProviderRepository {
    providers: RwLock<BTreeMap<String, Provider>>,
}

impl InMemoryProviderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_providers(providers: impl IntoIterator<Item = Provider>) -> Self {
        let providers = providers
            .into_iter()
            .map(|provider| (provider.slug.clone(), provider))
            .collect();
        Self {
            providers: RwLock::new(providers),
        }
    }

    pub async fn save(&self, provider: Provider) {
        self.providers
            .write()
            .await
            .insert(provider.slug.clone(), provider);
    }
}

#[async_trait]
impl ProviderRepository for InMemoryProviderRepository {
    async fn find(&self, slug: &str) -> AppResult<Provider> {
        self.providers
            .read()
            .await
            .get(slug)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("provider '{}'", slug)))
    }

    async fn find_all(&self) -> AppResult<Vec<Provider>> {
        Ok(self.providers.read().await.values().cloned().collect())
    }

    async fn find_active(&self) -> AppResult<Vec<Provider>> {
        Ok(self
            .providers
            .read()
            .await
            .values()
            .filter(|provider| provider.active)
            .cloned()
            .collect())
    }
}
