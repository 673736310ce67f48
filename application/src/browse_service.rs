use domain::backend::BillBackend;
use domain::error::ApiError;
use domain::models::{Bill, BillPage, MeetingPage};
use infrastructure::api_client::ApiClient;

/// Which bill listing to fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BillQuery {
    #[default]
    Latest,
    ByVotes,
    Search(String),
}

pub struct BrowseService {
    api: ApiClient,
}

impl BrowseService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn bills(&self, query: &BillQuery, page: u32) -> Result<BillPage, ApiError> {
        match query {
            BillQuery::Latest => self.api.bills_page(page).await,
            BillQuery::ByVotes => self.api.bills_page_by_votes(page).await,
            BillQuery::Search(keyword) if keyword.trim().is_empty() => {
                self.api.bills_page(page).await
            }
            BillQuery::Search(keyword) => self.api.search_bills(keyword.trim(), page).await,
        }
    }

    pub async fn top_bills(&self, n: u32) -> Result<Vec<Bill>, ApiError> {
        self.api.top_bills_by_votes(n).await
    }

    pub async fn bill(&self, id: i64) -> Result<Bill, ApiError> {
        self.api.get_bill(id).await
    }

    pub async fn meetings(&self, cursor: Option<i64>, size: Option<u32>) -> Result<MeetingPage, ApiError> {
        self.api.meetings(cursor, size).await
    }
}
