use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the connection game backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::movies::random_pair,
        crate::routes::rounds::start_round,
        crate::routes::rounds::current_round,
        crate::routes::rounds::abandon_round,
        crate::routes::rounds::select_actor,
        crate::routes::rounds::select_movie,
        crate::routes::rounds::commit_round,
        crate::routes::history::list_history,
        crate::routes::history::delete_connection,
        crate::routes::accounts::entitlement,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::movie::SideDto,
            crate::dto::movie::NodeKindDto,
            crate::dto::movie::MovieSummary,
            crate::dto::movie::CandidateSummary,
            crate::dto::movie::NodeSummary,
            crate::dto::movie::RandomPairResponse,
            crate::dto::round::StartRoundRequest,
            crate::dto::round::SelectActorRequest,
            crate::dto::round::SelectMovieRequest,
            crate::dto::round::RoundPhaseDto,
            crate::dto::round::FrontierSnapshot,
            crate::dto::round::RoundSnapshot,
            crate::dto::history::CompletedConnectionSummary,
            crate::dto::history::HistoryResponse,
            crate::dto::entitlement::EntitlementResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "movies", description = "Seed movie discovery"),
        (name = "rounds", description = "Connection rounds played by an account"),
        (name = "history", description = "Completed connections of an account"),
        (name = "accounts", description = "Account allowances"),
    )
)]
pub struct ApiDoc;
