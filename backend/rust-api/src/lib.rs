use axum::{
    http::{header, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use services::{AppState, PortalStore};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any);

    let api = Router::new()
        .nest("/auth", auth_routes(app_state.clone()))
        .nest("/users", users_routes())
        .route("/leaderboard", get(handlers::users::leaderboard))
        .nest("/projects", projects_routes(app_state.clone()))
        .nest(
            "/tasks",
            tasks_routes().route_layer(middleware::from_fn_with_state(
                app_state.clone(),
                middlewares::auth::session_middleware,
            )),
        )
        .nest(
            "/notifications",
            notifications_routes().route_layer(middleware::from_fn_with_state(
                app_state.clone(),
                middlewares::auth::session_middleware,
            )),
        )
        .nest("/quizzes", quizzes_routes(app_state.clone()))
        .nest(
            "/teams",
            teams_routes().route_layer(middleware::from_fn_with_state(
                app_state.clone(),
                middlewares::auth::session_middleware,
            )),
        )
        .route("/contact", post(handlers::contact::submit_contact))
        .layer(cors);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/v1", api)
        .with_state(app_state)
        .layer(CompressionLayer::new())
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

type AppRouter = Router<Arc<AppState>>;

fn auth_routes(app_state: Arc<AppState>) -> AppRouter {
    let public_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/signup", post(handlers::auth::signup))
        .route("/logout", post(handlers::auth::logout));

    let protected_routes = Router::new()
        .route(
            "/me",
            get(handlers::auth::get_current_user).put(handlers::auth::update_current_user),
        )
        .route_layer(middleware::from_fn_with_state(
            app_state,
            middlewares::auth::session_middleware,
        ));

    public_routes.merge(protected_routes)
}

fn users_routes() -> AppRouter {
    Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/{id}", get(handlers::users::get_user))
}

fn projects_routes(app_state: Arc<AppState>) -> AppRouter {
    let public_routes = Router::new()
        .route("/", get(handlers::projects::list_projects))
        .route("/{id}", get(handlers::projects::get_project));

    let protected_routes = Router::new()
        .route("/", post(handlers::projects::create_project))
        .route("/{id}", delete(handlers::projects::delete_project))
        .route("/{id}/comments", post(handlers::projects::add_comment))
        .route("/{id}/rating", put(handlers::projects::rate_project))
        .route_layer(middleware::from_fn_with_state(
            app_state,
            middlewares::auth::session_middleware,
        ));

    public_routes.merge(protected_routes)
}

fn tasks_routes() -> AppRouter {
    Router::new()
        .route(
            "/",
            get(handlers::tasks::list_tasks).post(handlers::tasks::add_task),
        )
        .route("/{id}/toggle", post(handlers::tasks::toggle_task))
        .route("/{id}", delete(handlers::tasks::delete_task))
}

fn notifications_routes() -> AppRouter {
    Router::new()
        .route(
            "/",
            get(handlers::notifications::list_notifications)
                .delete(handlers::notifications::clear_notifications),
        )
        .route(
            "/read-all",
            post(handlers::notifications::mark_all_read),
        )
        .route("/{id}/read", post(handlers::notifications::mark_read))
        .route(
            "/{id}",
            delete(handlers::notifications::delete_notification),
        )
}

fn quizzes_routes(app_state: Arc<AppState>) -> AppRouter {
    let public_routes = Router::new()
        .route("/", get(handlers::quizzes::list_quizzes))
        .route("/{id}", get(handlers::quizzes::get_quiz))
        .route("/{id}/attempts", post(handlers::quizzes::submit_attempt));

    // Authoring: session first, then the role guard
    let enseignant_routes = Router::new()
        .route("/", post(handlers::quizzes::create_quiz))
        .route(
            "/{id}",
            put(handlers::quizzes::update_quiz).delete(handlers::quizzes::delete_quiz),
        )
        .route("/{id}/publish", post(handlers::quizzes::toggle_publish))
        .route("/{id}/attempts", get(handlers::quizzes::list_attempts))
        .route_layer(middleware::from_fn(
            middlewares::auth::enseignant_guard_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            app_state,
            middlewares::auth::session_middleware,
        ));

    public_routes.merge(enseignant_routes)
}

fn teams_routes() -> AppRouter {
    Router::new().route(
        "/",
        get(handlers::teams::list_teams).post(handlers::teams::create_team),
    )
}
