use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::queries::{LeagueView, PlayerSearch, RankingView, SearchHit, SquadView, TeamView};
use crate::service::{PlayerLookup, StatsService};

type AppState = Arc<StatsService>;

/// Routes are mounted at the root and again under `/api`.
pub fn router(service: Arc<StatsService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes = Router::new()
        .route("/leagues", get(list_leagues))
        .route("/teams/:league_id", get(league_teams))
        .route("/squad/:team_id", get(squad))
        .route("/rankings/:league_id/:kind", get(rankings))
        .route("/player/:person_id", get(player))
        .route("/search/players", post(search_players));

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

pub async fn serve(service: Arc<StatsService>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("football data API listening on {}", addr);
    axum::serve(listener, router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

/// Gate checks, scrapes and SQLite reads all block, so they run off the async workers.
async fn blocking<T, F>(service: AppState, work: F) -> Result<T, StatusCode>
where
    T: Send + 'static,
    F: FnOnce(&StatsService) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || work(&service))
        .await
        .map_err(|err| {
            error!("request worker panicked: {err}");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn list_leagues(State(service): State<AppState>) -> Result<Json<Vec<LeagueView>>, StatusCode> {
    blocking(service, |s| s.leagues()).await.map(Json)
}

async fn league_teams(
    State(service): State<AppState>,
    Path(league_id): Path<u32>,
) -> Result<Json<Vec<TeamView>>, StatusCode> {
    blocking(service, move |s| s.league_teams(league_id))
        .await
        .map(Json)
}

async fn squad(
    State(service): State<AppState>,
    Path(team_id): Path<String>,
) -> Result<Json<Vec<SquadView>>, StatusCode> {
    blocking(service, move |s| s.squad(&team_id)).await.map(Json)
}

async fn rankings(
    State(service): State<AppState>,
    Path((league_id, kind)): Path<(u32, String)>,
) -> Result<Json<Vec<RankingView>>, StatusCode> {
    blocking(service, move |s| s.rankings(league_id, &kind))
        .await
        .map(Json)
}

async fn player(
    State(service): State<AppState>,
    Path(person_id): Path<String>,
) -> Result<Response, StatusCode> {
    let lookup = blocking(service, move |s| s.player(&person_id)).await?;
    Ok(match lookup {
        PlayerLookup::Found(view) => Json(view).into_response(),
        PlayerLookup::NotFound => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
        PlayerLookup::StoreUnavailable => Json(json!({})).into_response(),
    })
}

async fn search_players(
    State(service): State<AppState>,
    Json(filter): Json<PlayerSearch>,
) -> Result<Json<Vec<SearchHit>>, StatusCode> {
    blocking(service, move |s| s.search_players(&filter))
        .await
        .map(Json)
}
