//! Round orchestration: entitlement checks, metadata fetches, and engine transitions.
//!
//! The engine only sees already-resolved data. Fetches happen while no lock is
//! held; the result is applied only if the round did not move in the meantime.

use futures::{future::BoxFuture, try_join};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{
    dao::models::CompletedConnectionEntity,
    dto::{
        history::CompletedConnectionSummary,
        movie::{MovieSummary, RandomPairResponse},
        round::{RoundSnapshot, SelectActorRequest, SelectMovieRequest, StartRoundRequest},
    },
    error::ServiceError,
    metadata::{ProviderError, ProviderResult},
    state::{
        ActiveRound, SharedState,
        game::{ActorId, ActorSelection, MovieId, MovieSelection, NodeKind, Side},
        state_machine::{ConnectionGameEngine, EngineError, GameState, SelectionDefect},
    },
};

/// Propose two distinct random movies to seed a round.
pub async fn random_pair(state: &SharedState) -> Result<RandomPairResponse, ServiceError> {
    let provider = state.metadata();
    let movie_a = fetch(state, provider.random_movie()).await?;

    for attempt in 0..state.config().random_pair_attempts {
        let movie_b = fetch(state, provider.random_movie()).await?;
        if movie_b.id != movie_a.id {
            return Ok(RandomPairResponse {
                movie_a: MovieSummary::from(&movie_a),
                movie_b: MovieSummary::from(&movie_b),
            });
        }
        debug!(attempt, movie = %movie_a.id, "random pair collided; drawing again");
    }

    warn!(movie = %movie_a.id, "could not draw two distinct movies");
    Err(ServiceError::Metadata(ProviderError::NoMovies))
}

/// Start a new round for the account, replacing any round in flight.
pub async fn start_round(
    state: &SharedState,
    account_id: &str,
    request: StartRoundRequest,
) -> Result<RoundSnapshot, ServiceError> {
    let StartRoundRequest {
        movie_a_id,
        movie_b_id,
    } = request;

    if movie_a_id == movie_b_id {
        return Err(ServiceError::InvalidInput(
            "a round needs two different seed movies".into(),
        ));
    }

    let gate = state.entitlements();
    if !gate.try_reserve_round(account_id).await {
        info!(account = %account_id, "round refused: daily allowance used up");
        return Err(ServiceError::Forbidden(
            "daily round allowance used up; subscribe for unlimited rounds".into(),
        ));
    }

    let round = match open_round(state, MovieId(movie_a_id), MovieId(movie_b_id)).await {
        Ok(round) => round,
        Err(err) => {
            gate.release_round(account_id);
            return Err(err);
        }
    };
    let snapshot = RoundSnapshot::from(&round);

    if let Some(previous) = state.rounds().insert(account_id.to_string(), round) {
        debug!(account = %account_id, round = %previous.id, "unfinished round replaced");
    }

    info!(
        account = %account_id,
        round = %snapshot.round_id,
        seed_a = movie_a_id,
        seed_b = movie_b_id,
        "round started"
    );
    Ok(snapshot)
}

async fn open_round(
    state: &SharedState,
    movie_a: MovieId,
    movie_b: MovieId,
) -> Result<ActiveRound, ServiceError> {
    let provider = state.metadata();
    let (seed_a, seed_b) = try_join!(
        fetch(state, provider.movie(movie_a)),
        fetch(state, provider.movie(movie_b)),
    )?;
    let game = ConnectionGameEngine::start_round(seed_a, seed_b)?;
    Ok(ActiveRound::new(game))
}

/// Snapshot of the account's round.
pub async fn current_round(
    state: &SharedState,
    account_id: &str,
) -> Result<RoundSnapshot, ServiceError> {
    let round = state
        .rounds()
        .get(account_id)
        .ok_or_else(|| no_round(account_id))?;
    Ok(RoundSnapshot::from(&*round))
}

/// Move `side` from its movie to one of that movie's cast members.
pub async fn select_actor(
    state: &SharedState,
    account_id: &str,
    request: SelectActorRequest,
) -> Result<RoundSnapshot, ServiceError> {
    let side = Side::from(request.side);
    let actor_id = ActorId(request.actor_id);
    let round = load_round(state, account_id)?;
    ensure_can_move(&round.state, side, NodeKind::Movie)?;

    let frontier = round.state.frontier(side);
    let Some(member) = frontier.cast_member(actor_id).cloned() else {
        return Err(ServiceError::InvalidInput(format!(
            "actor `{actor_id}` is not in the cast of `{}`",
            frontier.title()
        )));
    };

    let filmography = fetch(state, state.metadata().filmography(actor_id)).await?;
    let selection = ActorSelection {
        id: member.id,
        name: member.name,
        photo_path: member.photo_path,
        filmography,
    };

    apply_move(state, account_id, &round, |game| {
        ConnectionGameEngine::select_actor(game, side, selection)
    })
}

/// Move `side` from its actor to one of that actor's films.
pub async fn select_movie(
    state: &SharedState,
    account_id: &str,
    request: SelectMovieRequest,
) -> Result<RoundSnapshot, ServiceError> {
    let side = Side::from(request.side);
    let movie_id = MovieId(request.movie_id);
    let round = load_round(state, account_id)?;
    ensure_can_move(&round.state, side, NodeKind::Actor)?;

    let frontier = round.state.frontier(side);
    if frontier.film(movie_id).is_none() {
        return Err(ServiceError::InvalidInput(format!(
            "movie `{movie_id}` is not in the filmography of `{}`",
            frontier.title()
        )));
    }

    let movie = fetch(state, state.metadata().movie(movie_id)).await?;
    let selection = MovieSelection::from(movie);

    apply_move(state, account_id, &round, |game| {
        ConnectionGameEngine::select_movie(game, side, selection)
    })
}

/// Record the account's won round in its history and clear it.
pub async fn commit_round(
    state: &SharedState,
    account_id: &str,
) -> Result<CompletedConnectionSummary, ServiceError> {
    let store = state.require_history_store().await?;
    let round = load_round(state, account_id)?;
    let Some(entity) = CompletedConnectionEntity::from_won_round(account_id, &round.state) else {
        return Err(ServiceError::InvalidState(
            "only a won round can be committed".into(),
        ));
    };

    // Only one commit can claim a given win.
    let Some((_, claimed)) = state
        .rounds()
        .remove_if(account_id, |_, current| current.id == round.id && current.state.is_won())
    else {
        return Err(ServiceError::InvalidState(
            "round was already committed or replaced".into(),
        ));
    };

    if let Err(err) = store.append(entity.clone()).await {
        warn!(account = %account_id, round = %claimed.id, error = %err, "commit failed; round kept");
        state.rounds().entry(account_id.to_string()).or_insert(claimed);
        return Err(err.into());
    }

    info!(
        account = %account_id,
        round = %round.id,
        connection = %entity.id,
        path_length = entity.path_length,
        "connection committed"
    );
    Ok(entity.into())
}

/// Drop the account's round without recording it.
pub async fn abandon_round(state: &SharedState, account_id: &str) -> Result<(), ServiceError> {
    let (_, round) = state
        .rounds()
        .remove(account_id)
        .ok_or_else(|| no_round(account_id))?;
    info!(account = %account_id, round = %round.id, moves = round.state.move_count(), "round abandoned");
    Ok(())
}

async fn fetch<T>(
    state: &SharedState,
    lookup: BoxFuture<'static, ProviderResult<T>>,
) -> Result<T, ServiceError> {
    let limit = state.config().metadata_timeout;
    match timeout(limit, lookup).await {
        Ok(result) => result.map_err(|err| {
            warn!(error = %err, "metadata lookup failed");
            ServiceError::from(err)
        }),
        Err(_) => {
            let timeout_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
            warn!(timeout_ms, "metadata lookup timed out");
            Err(ServiceError::Timeout)
        }
    }
}

fn no_round(account_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("account `{account_id}` has no round in progress"))
}

fn load_round(state: &SharedState, account_id: &str) -> Result<ActiveRound, ServiceError> {
    state
        .rounds()
        .get(account_id)
        .map(|round| round.clone())
        .ok_or_else(|| no_round(account_id))
}

/// Reject a move before any fetch is spent on it.
fn ensure_can_move(game: &GameState, side: Side, expected: NodeKind) -> Result<(), ServiceError> {
    if game.is_won() {
        return Err(EngineError::StateTerminated.into());
    }
    let actual = game.frontier(side).kind();
    if actual != expected {
        return Err(EngineError::InvalidSelection {
            side,
            defect: SelectionDefect::WrongFrontier { expected, actual },
        }
        .into());
    }
    Ok(())
}

/// Apply an engine transition, provided the round is still the one the move was prepared on.
fn apply_move<F>(
    state: &SharedState,
    account_id: &str,
    prepared: &ActiveRound,
    transition: F,
) -> Result<RoundSnapshot, ServiceError>
where
    F: FnOnce(&GameState) -> Result<GameState, EngineError>,
{
    let mut current = state
        .rounds()
        .get_mut(account_id)
        .ok_or_else(|| no_round(account_id))?;

    if !same_version(&current, prepared) {
        return Err(ServiceError::InvalidState(
            "round changed while the move was being prepared; refresh and retry".into(),
        ));
    }

    let next = transition(&current.state)?;
    if next.is_won() {
        info!(
            account = %account_id,
            round = %current.id,
            moves = next.move_count(),
            "round won"
        );
    }
    current.state = next;
    Ok(RoundSnapshot::from(&*current))
}

fn same_version(current: &ActiveRound, prepared: &ActiveRound) -> bool {
    current.id == prepared.id && current.state.move_count() == prepared.state.move_count()
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use futures::future;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            history_store::{HistoryStore, memory::InMemoryHistoryStore},
            storage::{StorageError, StorageResult},
        },
        dto::{movie::SideDto, round::RoundPhaseDto},
        metadata::MetadataProvider,
        metadata::catalog::{StaticCatalog, tests::catalog},
        services::tests::{test_state, test_state_with},
        state::game::{CastMember, FilmCredit, Movie},
    };

    fn current_round_id(state: &SharedState, account_id: &str) -> Option<Uuid> {
        state.rounds().get(account_id).map(|round| round.id)
    }

    fn start(a: u64, b: u64) -> StartRoundRequest {
        StartRoundRequest {
            movie_a_id: a,
            movie_b_id: b,
        }
    }

    fn actor(side: SideDto, id: u64) -> SelectActorRequest {
        SelectActorRequest { side, actor_id: id }
    }

    fn movie(side: SideDto, id: u64) -> SelectMovieRequest {
        SelectMovieRequest { side, movie_id: id }
    }

    #[tokio::test]
    async fn shared_actor_wins_and_commits() {
        let state = test_state(3).await;

        let snapshot = start_round(&state, "uid-1", start(1, 2)).await.unwrap();
        assert_eq!(snapshot.move_count, 0);
        assert_eq!(snapshot.path.len(), 2);
        assert_eq!(snapshot.frontier_a.candidates.len(), 3);

        let snapshot = select_actor(&state, "uid-1", actor(SideDto::A, 100))
            .await
            .unwrap();
        assert_eq!(snapshot.move_count, 1);
        assert!(matches!(snapshot.phase, RoundPhaseDto::InProgress));
        assert_eq!(snapshot.frontier_a.candidates.len(), 3);

        let snapshot = select_actor(&state, "uid-1", actor(SideDto::B, 100))
            .await
            .unwrap();
        assert!(matches!(snapshot.phase, RoundPhaseDto::Won));
        assert_eq!(snapshot.move_count, 2);

        let committed = commit_round(&state, "uid-1").await.unwrap();
        assert_eq!(committed.path_length, 2);
        assert_eq!(committed.path.len(), 4);
        assert!(current_round_id(&state, "uid-1").is_none());

        let store = state.require_history_store().await.unwrap();
        assert_eq!(store.list("uid-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn shared_movie_wins() {
        let state = test_state(3).await;
        start_round(&state, "uid-1", start(1, 3)).await.unwrap();
        select_actor(&state, "uid-1", actor(SideDto::A, 100))
            .await
            .unwrap();

        let snapshot = select_movie(&state, "uid-1", movie(SideDto::A, 3))
            .await
            .unwrap();
        assert!(matches!(snapshot.phase, RoundPhaseDto::Won));
        assert_eq!(snapshot.move_count, 2);
        assert_eq!(snapshot.frontier_a.id, 3);
    }

    #[tokio::test]
    async fn won_round_rejects_further_moves() {
        let state = test_state(3).await;
        start_round(&state, "uid-1", start(1, 2)).await.unwrap();
        select_actor(&state, "uid-1", actor(SideDto::A, 100))
            .await
            .unwrap();
        select_actor(&state, "uid-1", actor(SideDto::B, 100))
            .await
            .unwrap();

        let err = select_movie(&state, "uid-1", movie(SideDto::A, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        let snapshot = current_round(&state, "uid-1").await.unwrap();
        assert_eq!(snapshot.move_count, 2);
    }

    #[tokio::test]
    async fn moves_are_checked_against_candidates_and_frontier() {
        let state = test_state(3).await;
        start_round(&state, "uid-1", start(1, 2)).await.unwrap();

        let outsider = select_actor(&state, "uid-1", actor(SideDto::A, 102))
            .await
            .unwrap_err();
        assert!(matches!(outsider, ServiceError::InvalidInput(_)));

        let wrong_kind = select_movie(&state, "uid-1", movie(SideDto::A, 3))
            .await
            .unwrap_err();
        assert!(matches!(wrong_kind, ServiceError::InvalidInput(_)));

        let snapshot = current_round(&state, "uid-1").await.unwrap();
        assert_eq!(snapshot.move_count, 0);
    }

    #[tokio::test]
    async fn in_progress_round_cannot_be_committed() {
        let state = test_state(3).await;
        start_round(&state, "uid-1", start(1, 2)).await.unwrap();

        let err = commit_round(&state, "uid-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert!(current_round_id(&state, "uid-1").is_some());
    }

    #[tokio::test]
    async fn degraded_commit_keeps_the_round() {
        let state = test_state_with(AppConfig::default(), Arc::new(catalog()), None).await;
        start_round(&state, "uid-1", start(1, 2)).await.unwrap();
        select_actor(&state, "uid-1", actor(SideDto::A, 100))
            .await
            .unwrap();
        select_actor(&state, "uid-1", actor(SideDto::B, 100))
            .await
            .unwrap();

        let err = commit_round(&state, "uid-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
        assert!(current_round_id(&state, "uid-1").is_some());
    }

    #[tokio::test]
    async fn seeds_must_differ_and_exist() {
        let state = test_state(3).await;

        let same = start_round(&state, "uid-1", start(1, 1)).await.unwrap_err();
        assert!(matches!(same, ServiceError::InvalidInput(_)));

        let unknown = start_round(&state, "uid-1", start(1, 99)).await.unwrap_err();
        assert!(matches!(unknown, ServiceError::NotFound(_)));
        assert!(current_round_id(&state, "uid-1").is_none());
    }

    #[tokio::test]
    async fn allowance_limits_round_starts() {
        let state = test_state(1).await;
        start_round(&state, "uid-1", start(1, 2)).await.unwrap();

        let err = start_round(&state, "uid-1", start(1, 3)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
        assert!(start_round(&state, "uid-2", start(1, 3)).await.is_ok());
    }

    #[tokio::test]
    async fn failed_start_returns_the_reservation() {
        let state = test_state(1).await;
        let unknown = start_round(&state, "uid-1", start(1, 99)).await.unwrap_err();
        assert!(matches!(unknown, ServiceError::NotFound(_)));
        assert_eq!(state.entitlements().status("uid-1").await.rounds_today, 0);

        start_round(&state, "uid-1", start(1, 2)).await.unwrap();
        assert_eq!(state.entitlements().status("uid-1").await.rounds_today, 1);
    }

    #[tokio::test]
    async fn new_round_replaces_the_previous_one() {
        let state = test_state(3).await;
        let first = start_round(&state, "uid-1", start(1, 2)).await.unwrap();
        let second = start_round(&state, "uid-1", start(1, 3)).await.unwrap();

        assert_ne!(first.round_id, second.round_id);
        assert_eq!(current_round_id(&state, "uid-1"), Some(second.round_id));

        abandon_round(&state, "uid-1").await.unwrap();
        assert!(matches!(
            abandon_round(&state, "uid-1").await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn random_pair_is_distinct() {
        let config = AppConfig {
            random_pair_attempts: 64,
            ..AppConfig::default()
        };
        let state = test_state_with(config, Arc::new(catalog()), None).await;
        let pair = random_pair(&state).await.unwrap();
        assert_ne!(pair.movie_a.id, pair.movie_b.id);
    }

    struct StalledProvider;

    impl MetadataProvider for StalledProvider {
        fn movie(&self, _id: MovieId) -> BoxFuture<'static, ProviderResult<Movie>> {
            Box::pin(future::pending())
        }

        fn cast(&self, _id: MovieId) -> BoxFuture<'static, ProviderResult<Vec<CastMember>>> {
            Box::pin(future::pending())
        }

        fn filmography(
            &self,
            _id: ActorId,
        ) -> BoxFuture<'static, ProviderResult<Vec<FilmCredit>>> {
            Box::pin(future::pending())
        }

        fn random_movie(&self) -> BoxFuture<'static, ProviderResult<Movie>> {
            Box::pin(future::pending())
        }
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let config = AppConfig {
            metadata_timeout: Duration::from_millis(20),
            ..AppConfig::default()
        };
        let state = test_state_with(config, Arc::new(StalledProvider), None).await;

        let err = start_round(&state, "uid-1", start(1, 2)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Timeout));
        assert!(current_round_id(&state, "uid-1").is_none());
    }

    /// Catalog whose lookups suspend once before answering, so joined calls interleave.
    struct YieldingProvider(StaticCatalog);

    fn after_yield<T: Send + 'static>(lookup: BoxFuture<'static, T>) -> BoxFuture<'static, T> {
        Box::pin(async move {
            tokio::task::yield_now().await;
            lookup.await
        })
    }

    impl MetadataProvider for YieldingProvider {
        fn movie(&self, id: MovieId) -> BoxFuture<'static, ProviderResult<Movie>> {
            after_yield(self.0.movie(id))
        }

        fn cast(&self, id: MovieId) -> BoxFuture<'static, ProviderResult<Vec<CastMember>>> {
            after_yield(self.0.cast(id))
        }

        fn filmography(&self, id: ActorId) -> BoxFuture<'static, ProviderResult<Vec<FilmCredit>>> {
            after_yield(self.0.filmography(id))
        }

        fn random_movie(&self) -> BoxFuture<'static, ProviderResult<Movie>> {
            after_yield(self.0.random_movie())
        }
    }

    /// In-memory store that suspends once inside `append`, or refuses every append.
    struct SlowStore {
        inner: InMemoryHistoryStore,
        refuse: bool,
    }

    impl HistoryStore for SlowStore {
        fn append(&self, connection: CompletedConnectionEntity) -> BoxFuture<'static, StorageResult<()>> {
            let inner = self.inner.clone();
            let refuse = self.refuse;
            Box::pin(async move {
                tokio::task::yield_now().await;
                if refuse {
                    let source = std::io::Error::other("connection reset");
                    return Err(StorageError::unavailable("append refused".into(), source));
                }
                inner.append(connection).await
            })
        }

        fn remove(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
            self.inner.remove(id)
        }

        fn find(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<CompletedConnectionEntity>>> {
            self.inner.find(id)
        }

        fn list(&self, account_id: &str) -> BoxFuture<'static, StorageResult<Vec<CompletedConnectionEntity>>> {
            self.inner.list(account_id)
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.health_check()
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.inner.try_reconnect()
        }
    }

    async fn won_round(state: &SharedState, account_id: &str) {
        start_round(state, account_id, start(1, 2)).await.unwrap();
        select_actor(state, account_id, actor(SideDto::A, 100))
            .await
            .unwrap();
        select_actor(state, account_id, actor(SideDto::B, 100))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn concurrent_starts_respect_the_allowance() {
        let config = AppConfig {
            daily_round_limit: 1,
            ..AppConfig::default()
        };
        let provider = Arc::new(YieldingProvider(catalog()));
        let state = test_state_with(config, provider, None).await;

        let (first, second, third) = tokio::join!(
            start_round(&state, "uid-1", start(1, 2)),
            start_round(&state, "uid-1", start(1, 3)),
            start_round(&state, "uid-1", start(2, 3)),
        );
        let started = [first, second, third];
        assert_eq!(started.iter().filter(|result| result.is_ok()).count(), 1);
        assert!(
            started
                .iter()
                .filter_map(|result| result.as_ref().err())
                .all(|err| matches!(err, ServiceError::Forbidden(_)))
        );
        assert_eq!(state.entitlements().status("uid-1").await.rounds_today, 1);
    }

    #[tokio::test]
    async fn concurrent_commits_record_the_win_once() {
        let records = InMemoryHistoryStore::new();
        let store: Arc<dyn HistoryStore> = Arc::new(SlowStore {
            inner: records.clone(),
            refuse: false,
        });
        let state = test_state_with(AppConfig::default(), Arc::new(catalog()), Some(store)).await;
        won_round(&state, "uid-1").await;

        let (first, second) = tokio::join!(
            commit_round(&state, "uid-1"),
            commit_round(&state, "uid-1"),
        );
        let commits = [first, second];
        assert_eq!(commits.iter().filter(|result| result.is_ok()).count(), 1);
        assert_eq!(records.len(), 1);
        assert!(current_round_id(&state, "uid-1").is_none());
    }

    #[tokio::test]
    async fn failed_append_keeps_the_round() {
        let store: Arc<dyn HistoryStore> = Arc::new(SlowStore {
            inner: InMemoryHistoryStore::new(),
            refuse: true,
        });
        let state = test_state_with(AppConfig::default(), Arc::new(catalog()), Some(store)).await;
        won_round(&state, "uid-1").await;
        let round_id = current_round_id(&state, "uid-1");

        let err = commit_round(&state, "uid-1").await.unwrap_err();
        assert!(matches!(err, ServiceError::Unavailable(_)));
        assert_eq!(current_round_id(&state, "uid-1"), round_id);
    }

    #[tokio::test]
    async fn overlapping_moves_on_one_side_apply_once() {
        let provider = Arc::new(YieldingProvider(catalog()));
        let state = test_state_with(AppConfig::default(), provider, None).await;
        start_round(&state, "uid-1", start(1, 2)).await.unwrap();

        let (first, second) = tokio::join!(
            select_actor(&state, "uid-1", actor(SideDto::A, 100)),
            select_actor(&state, "uid-1", actor(SideDto::A, 100)),
        );
        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|result| result.is_ok()).count(), 1);
        assert!(
            outcomes
                .iter()
                .filter_map(|result| result.as_ref().err())
                .all(|err| matches!(err, ServiceError::InvalidState(_)))
        );

        let snapshot = current_round(&state, "uid-1").await.unwrap();
        assert_eq!(snapshot.move_count, 1);
        assert_eq!(snapshot.path.len(), 3);
    }
}
