use serde::Serialize;
use utoipa::ToSchema;

use crate::entitlement::EntitlementStatus;

/// Round allowance of an account for the current UTC day.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EntitlementResponse {
    pub subscriber: bool,
    pub rounds_today: u32,
    /// Absent for subscribers, who are not limited.
    pub daily_limit: Option<u32>,
    pub can_start_round: bool,
}

impl From<EntitlementStatus> for EntitlementResponse {
    fn from(status: EntitlementStatus) -> Self {
        Self {
            subscriber: status.subscriber,
            rounds_today: status.rounds_today,
            daily_limit: status.daily_limit,
            can_start_round: status.can_start_round(),
        }
    }
}
