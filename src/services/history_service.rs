use tracing::info;
use uuid::Uuid;

use crate::{
    dto::history::{CompletedConnectionSummary, HistoryResponse},
    error::ServiceError,
    state::SharedState,
};

/// Completed connections of the account, oldest first.
pub async fn list(state: &SharedState, account_id: &str) -> Result<HistoryResponse, ServiceError> {
    let store = state.require_history_store().await?;
    let connections = store
        .list(account_id)
        .await?
        .into_iter()
        .map(CompletedConnectionSummary::from)
        .collect();

    Ok(HistoryResponse { connections })
}

/// Delete one of the account's completed connections.
///
/// Records owned by another account are reported as missing.
pub async fn delete(state: &SharedState, account_id: &str, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_history_store().await?;
    let not_found = || ServiceError::NotFound(format!("connection `{id}` not found"));

    let owned = store
        .find(id)
        .await?
        .is_some_and(|record| record.account_id == account_id);
    if !owned {
        return Err(not_found());
    }

    if !store.remove(id).await? {
        return Err(not_found());
    }

    info!(account = %account_id, connection = %id, "connection deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dao::models::tests::sample_entity, services::tests::test_state};

    #[tokio::test]
    async fn history_is_scoped_to_the_account() {
        let state = test_state(3).await;
        let store = state.require_history_store().await.unwrap();
        let mine = sample_entity("uid-1");
        let theirs = sample_entity("uid-2");
        store.append(mine.clone()).await.unwrap();
        store.append(theirs.clone()).await.unwrap();

        let history = list(&state, "uid-1").await.unwrap();
        assert_eq!(history.connections.len(), 1);
        assert_eq!(history.connections[0].id, mine.id);
        assert_eq!(history.connections[0].path_length, 2);

        let err = delete(&state, "uid-1", theirs.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(list(&state, "uid-2").await.unwrap().connections.len(), 1);

        delete(&state, "uid-1", mine.id).await.unwrap();
        assert!(list(&state, "uid-1").await.unwrap().connections.is_empty());
        assert!(matches!(
            delete(&state, "uid-1", mine.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
