use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::gateway::Translator;
use crate::store::{Page, PageRequest, QueryMode, TranslationStore};

/// Operations the grid needs from the rest of the system
#[async_trait]
pub trait GridBackend: Send + Sync {
    async fn fetch_page(&self, request: PageRequest, mode: QueryMode) -> Result<Page>;

    async fn update_draft(&self, id: i32, text: &str) -> Result<()>;

    async fn finalize(&self, ids: &[i32]) -> Result<u64>;

    async fn translate(&self, text: &str, model_id: &str) -> Result<String>;
}

/// In-process backend over the store and the translation gateway
#[derive(Clone)]
pub struct LocalBackend {
    store: TranslationStore,
    translator: Arc<dyn Translator>,
}

impl LocalBackend {
    pub fn new(store: TranslationStore, translator: Arc<dyn Translator>) -> Self {
        Self { store, translator }
    }
}

#[async_trait]
impl GridBackend for LocalBackend {
    async fn fetch_page(&self, request: PageRequest, mode: QueryMode) -> Result<Page> {
        self.store.page(&request, &mode).await
    }

    async fn update_draft(&self, id: i32, text: &str) -> Result<()> {
        self.store.update_draft(id, text).await
    }

    async fn finalize(&self, ids: &[i32]) -> Result<u64> {
        self.store.finalize(ids).await
    }

    async fn translate(&self, text: &str, model_id: &str) -> Result<String> {
        Ok(self.translator.translate(text, model_id).await?)
    }
}
