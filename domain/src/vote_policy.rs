use crate::models::Bill;
use crate::vote::VoteStatus;

/// Decides whether this device may still vote on a bill.
///
/// The server flag wins when set. A local record can only lock voting, never
/// unlock it, so a stale local entry keeps the controls disabled even if the
/// server forgot the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct VotePolicy;

impl VotePolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn is_locked(&self, server_has_voted: bool, local: VoteStatus) -> bool {
        server_has_voted || local.voted
    }

    pub fn can_vote(&self, bill: &Bill, local: VoteStatus) -> bool {
        !self.is_locked(bill.has_voted, local)
    }
}
