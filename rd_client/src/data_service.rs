//! Research data API: paper search, analysis, reports and the saved-search
//! inventory.
//!
//! The service runs out of process. Every call carries the session token as a
//! bearer credential; a 401 surfaces as [`ClientError::Unauthorized`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use research_desk::auth::UserId;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use uuid::Uuid;

use crate::error::{ClientResult, error_from_response};

/// A paper as returned by the search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub link: String,
}

/// Papers matching a query, each with its own summary, plus a summary of all
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResults {
    pub papers: Vec<Paper>,
    #[serde(default)]
    pub summaries: Vec<String>,
    #[serde(rename = "consolidatedSummary", default)]
    pub consolidated_summary: String,
}

/// A paper paired with its analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperAnalysis {
    pub paper: Paper,
    pub analysis: String,
}

/// Generated research report
#[derive(Debug, Clone, Deserialize)]
pub struct Report {
    pub report: String,
    pub papers: Vec<PaperAnalysis>,
    #[serde(rename = "savedReport", default)]
    pub saved_report: Option<serde_json::Value>,
}

/// Search result set to store in the inventory
#[derive(Debug, Clone, Serialize)]
pub struct NewSavedSearch {
    pub title: String,
    pub papers: Vec<PaperAnalysis>,
    pub consolidated_summary: String,
    pub user_id: UserId,
}

impl NewSavedSearch {
    /// Pair each paper of `results` with its summary.
    pub fn from_results(title: impl Into<String>, results: SearchResults, user_id: UserId) -> Self {
        let mut summaries = results.summaries.into_iter();
        let papers = results
            .papers
            .into_iter()
            .map(|paper| PaperAnalysis {
                paper,
                analysis: summaries.next().unwrap_or_default(),
            })
            .collect();

        Self {
            title: title.into(),
            papers,
            consolidated_summary: results.consolidated_summary,
            user_id,
        }
    }
}

/// Search result set stored in the inventory
#[derive(Debug, Clone, Deserialize)]
pub struct SavedSearch {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub title: String,
    pub papers: Vec<PaperAnalysis>,
    pub consolidated_summary: String,
    pub user_id: UserId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Out-of-process collaborator providing research data
#[async_trait]
pub trait ExternalDataService: Send + Sync {
    /// Search papers for `query`
    async fn search_papers(&self, token: &str, query: &str) -> ClientResult<SearchResults>;

    /// Summarize a single abstract
    async fn analyze_paper(&self, token: &str, abstract_text: &str) -> ClientResult<String>;

    /// Generate a full report for `query`
    async fn generate_report(&self, token: &str, query: &str) -> ClientResult<Report>;

    /// Store a search in the inventory
    async fn save_search(&self, token: &str, search: &NewSavedSearch) -> ClientResult<SavedSearch>;

    /// List stored searches
    async fn list_searches(&self, token: &str) -> ClientResult<Vec<SavedSearch>>;
}

/// `ExternalDataService` over HTTP
#[derive(Debug, Clone)]
pub struct HttpDataService {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct SummaryResponse {
    summary: String,
}

impl HttpDataService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    async fn post<B, T>(&self, token: &str, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn get<T: DeserializeOwned>(&self, token: &str, path: &str) -> ClientResult<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        if !response.status().is_success() {
            return Err(error_from_response(response, true).await);
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl ExternalDataService for HttpDataService {
    async fn search_papers(&self, token: &str, query: &str) -> ClientResult<SearchResults> {
        self.post(token, "/api/search-papers", &json!({ "query": query }))
            .await
    }

    async fn analyze_paper(&self, token: &str, abstract_text: &str) -> ClientResult<String> {
        let response: SummaryResponse = self
            .post(token, "/api/analyze-paper", &json!({ "abstract": abstract_text }))
            .await?;
        Ok(response.summary)
    }

    async fn generate_report(&self, token: &str, query: &str) -> ClientResult<Report> {
        self.post(token, "/api/generate-report", &json!({ "query": query }))
            .await
    }

    async fn save_search(&self, token: &str, search: &NewSavedSearch) -> ClientResult<SavedSearch> {
        self.post(token, "/api/inventory/searches", search).await
    }

    async fn list_searches(&self, token: &str) -> ClientResult<Vec<SavedSearch>> {
        self.get(token, "/api/inventory/searches").await
    }
}
