use crate::error::ApiError;
use crate::models::Bill;
use crate::vote::VoteChoice;
use async_trait::async_trait;

/// The part of the bill REST backend the vote flow depends on.
#[async_trait]
pub trait BillBackend: Send + Sync {
    async fn get_bill(&self, id: i64) -> Result<Bill, ApiError>;

    /// Adds one vote on the chosen side. The backend also remembers the
    /// caller's session so later reads report `hasVoted`.
    async fn cast_vote(&self, id: i64, choice: VoteChoice) -> Result<(), ApiError>;
}
