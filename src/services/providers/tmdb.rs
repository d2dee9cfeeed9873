/// TMDB catalog provider
///
/// API flow:
/// 1. Search: /search/multi → movies, TV shows and people mixed; people are
///    dropped, the rest become CatalogItems.
/// 2. Related items: /{movie|tv}/{id}/recommendations → rank-ordered list with
///    popularity. TMDB omits media_type here, so the seed's type is carried
///    through as the fallback.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{CatalogItem, MediaType, TmdbListResponse},
    services::providers::CatalogProvider,
};
use reqwest::Client as HttpClient;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const RELATED_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    image_base: String,
    cache: Cache,
}

impl TmdbProvider {
    pub fn new(cache: Cache, api_key: String, api_url: String, image_base: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            image_base,
            cache,
        }
    }

    async fn fetch_list(&self, url: &str, query: &[(&str, &str)]) -> AppResult<TmdbListResponse> {
        let response = self
            .http_client
            .get(url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn search(&self, query: &str) -> AppResult<Vec<CatalogItem>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        cached!(
            self.cache,
            CacheKey::CatalogSearch(query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let url = format!("{}/search/multi", self.api_url);
                let response = self
                    .fetch_list(&url, &[("query", query), ("include_adult", "false")])
                    .await?;

                let items: Vec<CatalogItem> = response
                    .results
                    .into_iter()
                    .filter_map(|entry| entry.into_catalog_item(None, &self.image_base))
                    .collect();

                tracing::info!(
                    query = %query,
                    results = items.len(),
                    provider = "tmdb",
                    "Catalog search completed"
                );

                Ok::<_, AppError>(items)
            }
        )
    }

    async fn related(
        &self,
        media_type: MediaType,
        external_id: u64,
    ) -> AppResult<Vec<CatalogItem>> {
        let key = CacheKey::RelatedItems(format!(
            "{}:{}",
            media_type.tmdb_segment(),
            external_id
        ));

        cached!(self.cache, key, RELATED_CACHE_TTL, async move {
            let url = format!(
                "{}/{}/{}/recommendations",
                self.api_url,
                media_type.tmdb_segment(),
                external_id
            );
            let response = self.fetch_list(&url, &[]).await?;

            // The recommendations endpoint does not echo media_type; related
            // entries inherit the seed's type.
            let items: Vec<CatalogItem> = response
                .results
                .into_iter()
                .filter_map(|entry| entry.into_catalog_item(Some(media_type), &self.image_base))
                .collect();

            tracing::info!(
                external_id = external_id,
                media_type = %media_type,
                results = items.len(),
                provider = "tmdb",
                "Related items fetched"
            );

            Ok::<_, AppError>(items)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Dummy Redis client; nothing connects until a command is issued
    async fn create_test_provider() -> TmdbProvider {
        let client = redis::Client::open("redis://127.0.0.1").unwrap();
        let (cache, _handle) = Cache::new(client).await;
        TmdbProvider::new(
            cache,
            "test_key".to_string(),
            "http://test.local".to_string(),
            "http://images.test.local".to_string(),
        )
    }

    #[tokio::test]
    async fn test_empty_query_short_circuits() {
        let provider = create_test_provider().await;

        // No cache lookup, no network call
        assert!(provider.search("").await.unwrap().is_empty());
        assert!(provider.search("   ").await.unwrap().is_empty());
    }

    #[test]
    fn test_tmdb_list_response_deserialization() {
        let json = r#"{
            "page": 1,
            "results": [
                {
                    "id": 27205,
                    "media_type": "movie",
                    "title": "Inception",
                    "popularity": 83.5,
                    "poster_path": "/inception.jpg"
                },
                {
                    "id": 1396,
                    "media_type": "tv",
                    "name": "Breaking Bad",
                    "popularity": 245.0
                }
            ],
            "total_pages": 1,
            "total_results": 2
        }"#;

        let response: TmdbListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 2);
        assert_eq!(response.results[0].id, 27205);
        assert_eq!(response.results[1].name.as_deref(), Some("Breaking Bad"));
    }

    #[test]
    fn test_tmdb_list_response_missing_results() {
        let response: TmdbListResponse = serde_json::from_str("{}").unwrap();
        assert!(response.results.is_empty());
    }
}
