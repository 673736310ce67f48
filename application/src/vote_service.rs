use domain::backend::BillBackend;
use domain::error::VoteError;
use domain::models::Bill;
use domain::vote::{VoteChoice, VoteStatus, VoteTally};
use domain::vote_policy::VotePolicy;
use infrastructure::vote_storage::VoteGuard;
use std::sync::Arc;
use tracing::{error, info, warn};

/// What the vote controls of one bill should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteView {
    pub locked: bool,
    pub local: VoteStatus,
    pub tally: VoteTally,
}

pub struct VoteService {
    backend: Arc<dyn BillBackend>,
    guard: VoteGuard,
    policy: VotePolicy,
}

impl VoteService {
    pub fn new(backend: Arc<dyn BillBackend>, guard: VoteGuard) -> Self {
        Self {
            backend,
            guard,
            policy: VotePolicy::new(),
        }
    }

    pub fn guard(&self) -> &VoteGuard {
        &self.guard
    }

    pub fn view(&self, bill: &Bill) -> VoteView {
        let local = self.guard.get_vote_status(bill.id);
        VoteView {
            locked: self.policy.is_locked(bill.has_voted, local),
            local,
            tally: VoteTally::new(bill.counts()),
        }
    }

    pub fn can_vote(&self, bill: &Bill) -> bool {
        self.policy.can_vote(bill, self.guard.get_vote_status(bill.id))
    }

    /// Casts one vote.
    ///
    /// `tally` carries the pending vote while the request is in flight. It is
    /// rolled back if the backend refuses, and confirmed from a fresh read
    /// otherwise. The local record is only written after the backend accepted
    /// the vote. Returns the refreshed bill when the re-read succeeded.
    pub async fn cast_vote(
        &self,
        bill: &Bill,
        choice: VoteChoice,
        tally: &mut VoteTally,
    ) -> Result<Option<Bill>, VoteError> {
        if !self.can_vote(bill) {
            return Err(VoteError::AlreadyVoted(bill.id));
        }

        tally.apply_pending(choice);
        if let Err(err) = self.backend.cast_vote(bill.id, choice).await {
            error!(bill_id = bill.id, error = %err, "vote rejected");
            tally.rollback();
            return Err(err.into());
        }
        info!(bill_id = bill.id, %choice, "vote accepted");

        if let Err(err) = self.guard.set_vote_status(bill.id, choice) {
            // The server has the vote; a lost local record only weakens the
            // repeat-vote lock for anonymous sessions.
            warn!(bill_id = bill.id, error = %err, "could not persist local vote record");
        }

        match self.backend.get_bill(bill.id).await {
            Ok(fresh) => {
                tally.confirm(fresh.counts());
                Ok(Some(fresh))
            }
            Err(err) => {
                warn!(bill_id = bill.id, error = %err, "refresh after vote failed, keeping local projection");
                Ok(None)
            }
        }
    }
}
