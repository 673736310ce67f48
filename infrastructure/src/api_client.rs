use crate::config::Config;
use async_trait::async_trait;
use domain::backend::BillBackend;
use domain::error::ApiError;
use domain::models::{Bill, BillPage, MeetingPage};
use domain::vote::VoteChoice;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error};

const BILLS: &str = "/api/bills";
const BILLS_PAGE: &str = "/api/bills/page";
const BILLS_PAGE_BY_VOTES: &str = "/api/bills/page/by-votes";
const BILLS_SEARCH: &str = "/api/bills/search";
const BILLS_TOP_N_BY_VOTES: &str = "/api/bills/topN/by-votes";
const MEETINGS: &str = "/api/meetings";

/// JSON client for the bill and meeting endpoints.
#[derive(Clone)]
pub struct ApiClient {
    client: Arc<Client>,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn bills_page(&self, page: u32) -> Result<BillPage, ApiError> {
        self.get_json(BILLS_PAGE, &[("page", page.to_string())]).await
    }

    pub async fn bills_page_by_votes(&self, page: u32) -> Result<BillPage, ApiError> {
        self.get_json(BILLS_PAGE_BY_VOTES, &[("page", page.to_string())])
            .await
    }

    pub async fn search_bills(&self, keyword: &str, page: u32) -> Result<BillPage, ApiError> {
        self.get_json(
            BILLS_SEARCH,
            &[("keyword", keyword.to_string()), ("page", page.to_string())],
        )
        .await
    }

    pub async fn top_bills_by_votes(&self, n: u32) -> Result<Vec<Bill>, ApiError> {
        self.get_json(BILLS_TOP_N_BY_VOTES, &[("n", n.to_string())])
            .await
    }

    pub async fn meetings(
        &self,
        cursor: Option<i64>,
        size: Option<u32>,
    ) -> Result<MeetingPage, ApiError> {
        let mut query = Vec::new();
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        if let Some(size) = size {
            query.push(("size", size.to_string()));
        }
        self.get_json(MEETINGS, &query).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "GET");
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let response = Self::check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), %body, "API response error");
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl BillBackend for ApiClient {
    async fn get_bill(&self, id: i64) -> Result<Bill, ApiError> {
        match self.get_json::<Bill>(&format!("{BILLS}/{id}"), &[]).await {
            Err(ApiError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(ApiError::not_found("bill", id))
            }
            other => other,
        }
    }

    async fn cast_vote(&self, id: i64, choice: VoteChoice) -> Result<(), ApiError> {
        let url = format!("{}{BILLS}/{id}/votes/{}", self.base_url, choice.as_str());
        debug!(%url, "POST vote");
        let response = self
            .client
            .post(&url)
            .query(&[("n", "1")])
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Self::check_status(response).await?;
        Ok(())
    }
}
