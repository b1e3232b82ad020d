use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the meetup session backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::auth::sign_in,
        crate::routes::auth::sign_out,
        crate::routes::auth::me,
        crate::routes::members::register_member,
        crate::routes::members::list_members,
        crate::routes::members::get_member,
        crate::routes::members::lookup_members,
        crate::routes::session::get_session,
        crate::routes::session::open_session,
        crate::routes::session::close_session,
        crate::routes::session::set_session_members,
        crate::routes::session::check_in,
        crate::routes::session::check_out,
        crate::routes::games::create_game,
        crate::routes::games::list_results,
        crate::routes::games::start_game,
        crate::routes::games::finish_game,
        crate::routes::games::cancel_game,
        crate::routes::sse::session_stream,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::auth::SignInRequest,
            crate::dto::auth::IdentityResponse,
            crate::dto::auth::GooglerResponse,
            crate::dto::auth::SignOutResponse,
            crate::dto::member::MemberSummary,
            crate::dto::member::RoleDto,
            crate::dto::member::RegisterMemberRequest,
            crate::dto::member::LookupMembersRequest,
            crate::dto::session::SessionSnapshot,
            crate::dto::session::SetSessionMembersRequest,
            crate::dto::game::GameCategoryDto,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::FinishGameRequest,
            crate::dto::game::TeamSide,
            crate::dto::game::GameRefResponse,
            crate::dto::game::GameSummary,
            crate::dto::game::GameResultResponse,
            crate::dto::sse::AuthStateEvent,
            crate::dto::sse::SessionStatusEvent,
            crate::dto::sse::GameFinishedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Sign-in state of the kiosk"),
        (name = "members", description = "Member registration and lookups"),
        (name = "session", description = "Session lifecycle and check-ins"),
        (name = "games", description = "Team building and game lifecycle"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
