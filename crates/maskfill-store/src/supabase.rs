//! Supabase (PostgREST) store implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use maskfill_core::error::StoreError;
use maskfill_core::model::{ResponseRecord, Sentence};
use maskfill_core::traits::SurveyStore;

pub const DEFAULT_SENTENCES_TABLE: &str = "sentences";
pub const DEFAULT_RESPONSES_TABLE: &str = "responses";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Columns forming the upsert natural key of the responses table.
const RESPONSE_CONFLICT_KEY: &str = "sentence_id,dataset,round";

/// Store backed by a hosted Supabase project's REST API.
pub struct SupabaseStore {
    url: String,
    anon_key: String,
    sentences_table: String,
    responses_table: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl SupabaseStore {
    pub fn new(url: &str, anon_key: &str) -> Result<Self, StoreError> {
        Self::with_options(
            url,
            anon_key,
            DEFAULT_SENTENCES_TABLE,
            DEFAULT_RESPONSES_TABLE,
            DEFAULT_TIMEOUT_SECS,
        )
    }

    pub fn with_options(
        url: &str,
        anon_key: &str,
        sentences_table: &str,
        responses_table: &str,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| StoreError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            sentences_table: sentences_table.to_string(),
            responses_table: responses_table.to_string(),
            timeout_secs,
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    fn send_error(&self, e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Timeout(self.timeout_secs * 1000)
        } else {
            StoreError::Network(e.to_string())
        }
    }
}

/// Map a non-success response to a `StoreError`, passing successes through.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status().as_u16();
    if status >= 400 {
        let message = response.text().await.unwrap_or_default();
        return Err(StoreError::Http { status, message });
    }
    Ok(response)
}

#[async_trait]
impl SurveyStore for SupabaseStore {
    fn name(&self) -> &str {
        "supabase"
    }

    #[instrument(skip(self), fields(table = %self.sentences_table))]
    async fn fetch_sentences(&self, dataset: &str) -> Result<Vec<Sentence>, StoreError> {
        let dataset_filter = format!("eq.{dataset}");
        let request = self
            .client
            .get(self.table_url(&self.sentences_table))
            .query(&[
                ("select", "id,masked"),
                ("dataset", dataset_filter.as_str()),
                ("order", "id.asc"),
            ])
            .header("Accept", "application/json");

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        let response = check_status(response).await?;

        response
            .json::<Vec<Sentence>>()
            .await
            .map_err(|e| StoreError::Decode(format!("failed to parse sentences: {e}")))
    }

    #[instrument(skip(self, record), fields(sentence_id = %record.sentence_id))]
    async fn upsert_response(&self, record: &ResponseRecord) -> Result<(), StoreError> {
        let request = self
            .client
            .post(self.table_url(&self.responses_table))
            .query(&[("on_conflict", RESPONSE_CONFLICT_KEY)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[record]);

        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;
        check_status(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, headers, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_sentences_for_dataset() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/sentences"))
            .and(query_param("select", "id,masked"))
            .and(query_param("dataset", "eq.d1"))
            .and(header("apikey", "anon"))
            .and(header("Authorization", "Bearer anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "masked": "The [MASK] sat on the [MASK]."},
                {"id": 2, "masked": "I like [MASK]."}
            ])))
            .mount(&server)
            .await;

        let store = SupabaseStore::new(&server.uri(), "anon").unwrap();
        let sentences = store.fetch_sentences("d1").await.unwrap();
        assert_eq!(sentences.len(), 2);
        assert_eq!(sentences[0].id, 1.into());
        assert_eq!(sentences[1].blank_count(), 1);
    }

    #[tokio::test]
    async fn unknown_dataset_yields_empty_collection() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/sentences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let store = SupabaseStore::new(&server.uri(), "anon").unwrap();
        assert!(store.fetch_sentences("nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn upsert_posts_record_with_conflict_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/answers"))
            .and(query_param("on_conflict", "sentence_id,dataset,round"))
            .and(headers("Prefer", vec!["resolution=merge-duplicates", "return=minimal"]))
            .and(body_json(serde_json::json!([{
                "sentence_id": 1,
                "dataset": "d1",
                "round": "r1",
                "response_values": ["cat", "mat"]
            }])))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let store =
            SupabaseStore::with_options(&server.uri(), "anon", "sentences", "answers", 5).unwrap();
        let record = ResponseRecord {
            sentence_id: 1.into(),
            dataset: "d1".into(),
            round: "r1".into(),
            response_values: vec!["cat".into(), "mat".into()],
        };
        store.upsert_response(&record).await.unwrap();
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/responses"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let store = SupabaseStore::new(&server.uri(), "anon").unwrap();
        let record = ResponseRecord {
            sentence_id: "s-1".into(),
            dataset: "d1".into(),
            round: "r1".into(),
            response_values: vec![],
        };
        let err = store.upsert_response(&record).await.unwrap_err();
        assert!(matches!(err, StoreError::Http { status: 500, .. }));
        assert!(err.to_string().contains("internal error"));
    }

    #[tokio::test]
    async fn malformed_rows_are_a_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/sentences"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([{"text": "x"}])),
            )
            .mount(&server)
            .await;

        let store = SupabaseStore::new(&server.uri(), "anon").unwrap();
        let err = store.fetch_sentences("d1").await.unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }

    #[tokio::test]
    async fn slow_response_is_a_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/sentences"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let store =
            SupabaseStore::with_options(&server.uri(), "anon", "sentences", "responses", 1).unwrap();
        let err = store.fetch_sentences("d1").await.unwrap_err();
        assert!(matches!(err, StoreError::Timeout(1000)));
    }

    #[tokio::test]
    async fn trailing_slash_in_url_is_ignored() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/sentences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let store = SupabaseStore::new(&format!("{}/", server.uri()), "anon").unwrap();
        store.fetch_sentences("d1").await.unwrap();
    }
}
