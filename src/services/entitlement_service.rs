use crate::{dto::entitlement::EntitlementResponse, error::ServiceError, state::SharedState};

/// Round allowance of the account for the current day.
pub async fn status(
    state: &SharedState,
    account_id: &str,
) -> Result<EntitlementResponse, ServiceError> {
    let status = state.entitlements().status(account_id).await;
    Ok(status.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::round::StartRoundRequest,
        services::{round_service, tests::test_state},
    };

    #[tokio::test]
    async fn started_rounds_consume_the_allowance() {
        let state = test_state(2).await;
        let before = status(&state, "uid-1").await.unwrap();
        assert_eq!(before.rounds_today, 0);
        assert_eq!(before.daily_limit, Some(2));
        assert!(before.can_start_round);

        for _ in 0..2 {
            let request = StartRoundRequest {
                movie_a_id: 1,
                movie_b_id: 2,
            };
            round_service::start_round(&state, "uid-1", request)
                .await
                .unwrap();
        }

        let after = status(&state, "uid-1").await.unwrap();
        assert_eq!(after.rounds_today, 2);
        assert!(!after.can_start_round);
    }
}
