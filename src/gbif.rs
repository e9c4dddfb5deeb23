//! Occurrence fetching from the GBIF REST API.
//!
//! A search resolves the typed name against the species backbone, pages
//! through coordinate-bearing occurrences up to the configured cap, and
//! reshapes the records into an [`OccurrenceTable`].

use std::future::Future;

use crate::config::{FetchConfig, GBIF_PAGE_LIMIT};
use crate::data::{NameMatch, OccurrencePage, OccurrenceRecord, OccurrenceTable};
use crate::errors::FetchError;

pub type FetchResult = Result<OccurrenceTable, FetchError>;

/// Anything that can turn a species name into an occurrence table.
pub trait OccurrenceSource: Send + Sync + 'static {
    fn fetch(&self, species: &str) -> impl Future<Output = FetchResult> + Send;
}

#[derive(Clone, Debug)]
pub struct GbifClient {
    config: FetchConfig,
}

impl GbifClient {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    async fn resolve_name(&self, http: &reqwest::Client, name: &str) -> Result<u64, FetchError> {
        let url = name_match_url(&self.config.api_url, name);
        tracing::debug!(%url, "resolving species name");

        let matched: NameMatch = http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match matched.usage_key {
            Some(key) => {
                tracing::info!(
                    name,
                    key,
                    matched = matched.scientific_name.as_deref().unwrap_or(""),
                    "resolved species name"
                );
                Ok(key)
            }
            None => {
                tracing::info!(name, match_type = ?matched.match_type, "species name not found");
                Err(FetchError::NotFound {
                    name: name.to_string(),
                })
            }
        }
    }

    async fn search_occurrences(
        &self,
        http: &reqwest::Client,
        taxon_key: u64,
    ) -> Result<Vec<OccurrenceRecord>, FetchError> {
        let mut records = Vec::new();

        for (offset, limit) in page_plan(self.config.record_limit) {
            let url = occurrence_search_url(&self.config, taxon_key, offset, limit);
            tracing::debug!(%url, "fetching occurrence page");

            let page: OccurrencePage = http
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let received = page.results.len();
            records.extend(page.results);

            if page.end_of_records || received < limit {
                tracing::debug!(total = ?page.count, received = records.len(), "reached end of records");
                break;
            }
        }

        Ok(records)
    }
}

impl OccurrenceSource for GbifClient {
    async fn fetch(&self, species: &str) -> FetchResult {
        let name = species.trim();
        if name.is_empty() {
            return Err(FetchError::NotFound {
                name: String::new(),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(self.config.timeout())
            .build()?;

        let taxon_key = self.resolve_name(&http, name).await?;
        let records = self.search_occurrences(&http, taxon_key).await?;

        if records.is_empty() {
            return Err(FetchError::EmptyResult {
                name: name.to_string(),
            });
        }

        tracing::info!(name, taxon_key, records = records.len(), "fetched occurrences");
        let table = OccurrenceTable::from_records(taxon_key, &records);
        for field in table.fields() {
            tracing::debug!(field, values = table.column(field).len(), "occurrence column");
        }
        Ok(table)
    }
}

pub fn name_match_url(api_url: &str, name: &str) -> String {
    format!(
        "{}/species/match?name={}&rank=SPECIES",
        api_url,
        urlencoding::encode(name)
    )
}

pub fn occurrence_search_url(config: &FetchConfig, taxon_key: u64, offset: usize, limit: usize) -> String {
    let mut url = format!(
        "{}/occurrence/search?taxonKey={}&hasCoordinate=true&limit={}&offset={}",
        config.api_url, taxon_key, limit, offset
    );
    if config.human_observation_only {
        url.push_str("&basisOfRecord=HUMAN_OBSERVATION");
    }
    url
}

/// Splits a record cap into `(offset, limit)` requests no larger than one page.
pub fn page_plan(record_limit: usize) -> Vec<(usize, usize)> {
    (0..record_limit)
        .step_by(GBIF_PAGE_LIMIT)
        .map(|offset| (offset, GBIF_PAGE_LIMIT.min(record_limit - offset)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    type Responder = Arc<dyn Fn(&str) -> String + Send + Sync>;

    /// Local HTTP server that answers every request path with JSON from
    /// `responder`. Returns its base URL and the number of occurrence page
    /// requests it has seen.
    async fn serve_gbif(responder: Responder) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let pages = Arc::new(AtomicUsize::new(0));
        let counter = pages.clone();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let n = stream.read(&mut buf).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                if path.contains("/occurrence/search") {
                    counter.fetch_add(1, Ordering::SeqCst);
                }

                let body = responder(&path);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}"), pages)
    }

    fn client_for(api_url: String) -> GbifClient {
        GbifClient::new(FetchConfig {
            api_url,
            timeout_secs: 5,
            ..FetchConfig::default()
        })
    }

    fn page(results: Vec<serde_json::Value>, end_of_records: bool) -> String {
        json!({ "endOfRecords": end_of_records, "count": results.len(), "results": results })
            .to_string()
    }

    fn matched(path: &str) -> Option<String> {
        path.starts_with("/species/match")
            .then(|| json!({ "usageKey": 5, "matchType": "EXACT" }).to_string())
    }

    fn located(count: usize) -> Vec<serde_json::Value> {
        (0..count)
            .map(|i| json!({ "decimalLatitude": i as f64, "decimalLongitude": 1.0 }))
            .collect()
    }

    #[test]
    fn name_is_url_encoded() {
        assert_eq!(
            name_match_url("https://api.gbif.org/v1", "Engraulis ringens"),
            "https://api.gbif.org/v1/species/match?name=Engraulis%20ringens&rank=SPECIES"
        );
    }

    #[test]
    fn occurrence_url_filters_on_coordinates() {
        let config = FetchConfig::default();
        let url = occurrence_search_url(&config, 2_417_839, 300, 200);
        assert_eq!(
            url,
            "https://api.gbif.org/v1/occurrence/search?taxonKey=2417839&hasCoordinate=true&limit=200&offset=300"
        );
    }

    #[test]
    fn human_observation_filter_is_opt_in() {
        let config = FetchConfig {
            human_observation_only: true,
            ..FetchConfig::default()
        };
        let url = occurrence_search_url(&config, 1, 0, 300);
        assert!(url.ends_with("&basisOfRecord=HUMAN_OBSERVATION"));
    }

    #[test]
    fn page_plan_caps_at_record_limit() {
        assert_eq!(page_plan(500), vec![(0, 300), (300, 200)]);
        assert_eq!(page_plan(300), vec![(0, 300)]);
        assert_eq!(page_plan(10), vec![(0, 10)]);
        assert!(page_plan(0).is_empty());
    }

    #[tokio::test]
    async fn blank_name_is_rejected_without_network() {
        let client = GbifClient::new(FetchConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            ..FetchConfig::default()
        });
        let result = client.fetch("   ").await;
        assert_eq!(result, Err(FetchError::NotFound { name: String::new() }));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let client = GbifClient::new(FetchConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..FetchConfig::default()
        });
        let result = client.fetch("Engraulis ringens").await;
        assert!(matches!(result, Err(FetchError::Transport(_))), "{result:?}");
    }

    #[tokio::test]
    async fn unmatched_name_is_not_found() {
        let (api_url, pages) =
            serve_gbif(Arc::new(|_: &str| json!({ "matchType": "NONE" }).to_string())).await;

        let result = client_for(api_url).fetch("Nonexistus fakeus").await;

        assert_eq!(
            result,
            Err(FetchError::NotFound {
                name: "Nonexistus fakeus".to_string()
            })
        );
        assert_eq!(pages.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn end_of_records_stops_after_one_page() {
        let (api_url, pages) = serve_gbif(Arc::new(|path: &str| {
            matched(path).unwrap_or_else(|| {
                page(
                    vec![
                        json!({ "decimalLatitude": 1.0, "decimalLongitude": 2.0 }),
                        json!({ "decimalLatitude": 3.0 }),
                    ],
                    true,
                )
            })
        }))
        .await;

        let table = client_for(api_url).fetch("Engraulis ringens").await.unwrap();

        assert_eq!(pages.load(Ordering::SeqCst), 1);
        assert_eq!(table.taxon_key, 5);
        assert_eq!(table.record_count, 2);
        assert_eq!(table.numbers("decimalLatitude"), vec![1.0, 3.0]);
        assert_eq!(table.numbers("decimalLongitude"), vec![2.0]);
    }

    #[tokio::test]
    async fn short_page_stops_paging() {
        let (api_url, pages) = serve_gbif(Arc::new(|path: &str| {
            matched(path).unwrap_or_else(|| page(located(12), false))
        }))
        .await;

        let table = client_for(api_url).fetch("Engraulis ringens").await.unwrap();

        assert_eq!(pages.load(Ordering::SeqCst), 1);
        assert_eq!(table.record_count, 12);
    }

    #[tokio::test]
    async fn full_pages_are_fetched_up_to_the_cap() {
        let (api_url, pages) = serve_gbif(Arc::new(|path: &str| {
            matched(path).unwrap_or_else(|| {
                if path.contains("offset=300") {
                    page(located(200), false)
                } else {
                    page(located(300), false)
                }
            })
        }))
        .await;

        let table = client_for(api_url).fetch("Engraulis ringens").await.unwrap();

        assert_eq!(pages.load(Ordering::SeqCst), 2);
        assert_eq!(table.record_count, 500);
    }

    #[tokio::test]
    async fn empty_results_are_reported() {
        let (api_url, pages) = serve_gbif(Arc::new(|path: &str| {
            matched(path).unwrap_or_else(|| page(Vec::new(), true))
        }))
        .await;

        let result = client_for(api_url).fetch("Engraulis ringens").await;

        assert_eq!(
            result,
            Err(FetchError::EmptyResult {
                name: "Engraulis ringens".to_string()
            })
        );
        assert_eq!(pages.load(Ordering::SeqCst), 1);
    }
}
