//! Persistence seam between the engine and a concrete store.
//!
//! Implemented by the adapters in `maskfill-store`.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{ResponseRecord, Sentence};

/// A backend that supplies sentences and accepts responses.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// Human-readable store name (e.g. "supabase").
    fn name(&self) -> &str;

    /// Fetch the full, ordered sentence collection for a dataset.
    ///
    /// An unknown dataset is not an error; it yields an empty collection.
    async fn fetch_sentences(&self, dataset: &str) -> Result<Vec<Sentence>, StoreError>;

    /// Insert or overwrite a response keyed on `(sentence_id, dataset, round)`.
    async fn upsert_response(&self, record: &ResponseRecord) -> Result<(), StoreError>;
}
