use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::report;
use crate::repository::{ClientQuery, ClientRepository};
use crate::score_cache::ScoreCache;
use crate::scoring::{compute_score, score_factors, Grade};

/// Shared application state injected into handlers.
pub struct AppState {
    /// Client storage backend (PostgreSQL or in-memory).
    pub store: Arc<dyn ClientRepository>,
    /// Application configuration.
    pub config: Config,
    /// User registry and session cache.
    pub auth: auth::AuthService,
    /// Content-hash keyed score cache fronting the report path.
    pub score_cache: ScoreCache,
}

/// Assembles the application router.
///
/// Auth routes and the health check stay open; everything under `/api/v1`
/// requires a bearer token.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/v1/clients", get(list_clients).post(create_client))
        .route("/api/v1/clients/export", get(export_clients))
        .route("/api/v1/clients/import", post(import_clients))
        .route("/api/v1/scoring/simulate", post(simulate_score))
        .route(
            "/api/v1/clients/:id",
            get(get_client).patch(update_client).delete(delete_client),
        )
        .route("/api/v1/clients/:id/credit-score", get(client_credit_score))
        .route("/api/v1/clients/:id/report", get(client_report))
        .route("/api/v1/statistics", get(statistics))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/profile", patch(auth::update_profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/signup", post(auth::signup))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-credit-api",
            "version": "0.1.0"
        })),
    )
}

fn with_score(client: Client) -> ClientWithScore {
    let score = compute_score(&client);
    ClientWithScore { client, score }
}

/// GET /api/v1/clients
///
/// Paginated client listing with optional search and filters. Every item
/// carries its computed score for list rendering.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `params` - Query parameters (search, credit_mix, credit_score, page,
///   pageSize, sortBy, sortOrder).
///
/// # Returns
///
/// * `Result<Json<PaginatedResponse<ClientWithScore>>, AppError>` - The page or an error.
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClientQueryParams>,
) -> Result<Json<PaginatedResponse<ClientWithScore>>, AppError> {
    tracing::info!("GET /clients - params: {:?}", params);

    let query = ClientQuery::from_params(&params)?;
    let page = state.store.list(&query).await?;

    Ok(Json(PaginatedResponse {
        data: page.data.into_iter().map(with_score).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
    }))
}

/// POST /api/v1/clients
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientWithScore>), AppError> {
    tracing::info!("POST /clients");

    let client = state.store.create(payload).await?;
    Ok((StatusCode::CREATED, Json(with_score(client))))
}

/// GET /api/v1/clients/:id
pub async fn get_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientWithScore>, AppError> {
    tracing::info!("GET /clients/{}", id);

    let client = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client with id {} not found", id)))?;

    Ok(Json(with_score(client)))
}

/// PATCH /api/v1/clients/:id
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<Json<ClientWithScore>, AppError> {
    tracing::info!("PATCH /clients/{}", id);

    let client = state
        .store
        .update(id, payload)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client with id {} not found", id)))?;

    Ok(Json(with_score(client)))
}

/// DELETE /api/v1/clients/:id
pub async fn delete_client(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!("DELETE /clients/{}", id);

    if !state.store.delete(id).await? {
        return Err(AppError::NotFound(format!(
            "Client with id {} not found",
            id
        )));
    }

    Ok(Json(json!({ "success": true })))
}

/// GET /api/v1/clients/:id/credit-score
///
/// Computed score plus the per-factor breakdown.
pub async fn client_credit_score(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    tracing::info!("GET /clients/{}/credit-score", id);

    let client = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client with id {} not found", id)))?;

    let score = compute_score(&client);
    let factors = score_factors(&client);

    Ok(Json(json!({
        "score": score.score,
        "grade": score.grade,
        "riskLevel": score.risk_level,
        "factors": factors,
    })))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>,
}

/// GET /api/v1/clients/:id/report
///
/// Full credit report as JSON, or a plain-text rendering with
/// `?format=text`. The score is served through the content-hash cache since
/// reports are re-requested for unchanged profiles.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `id` - The UUID of the client.
/// * `query` - Optional `format` selector (`json` or `text`).
pub async fn client_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    tracing::info!("GET /clients/{}/report - format: {:?}", id, query.format);

    let client = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Client with id {} not found", id)))?;

    let score = state.score_cache.get_or_compute(&client).await;
    let credit_report = report::build_report(&client, score);

    match query.format.as_deref() {
        Some("text") => {
            let filename = format!(
                "rapport-credit-{}-{}.txt",
                credit_report.client.prenom.as_deref().unwrap_or("client"),
                credit_report.client.nom.as_deref().unwrap_or("")
            );
            let body = report::render_text(&credit_report);
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                body,
            )
                .into_response())
        }
        Some(other) if other != "json" => Err(AppError::BadRequest(format!(
            "Unknown report format '{}'",
            other
        ))),
        _ => Ok(Json(credit_report).into_response()),
    }
}

/// GET /api/v1/clients/export
///
/// CSV export of all clients with their computed scores.
pub async fn export_clients(
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    tracing::info!("GET /clients/export");

    let clients = state.store.list_all().await?;
    let scored: Vec<_> = clients
        .into_iter()
        .map(|c| {
            let score = compute_score(&c);
            (c, score)
        })
        .collect();

    let body = report::render_csv(&scored);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"clients-export.csv\"".to_string(),
            ),
        ],
        body,
    )
        .into_response())
}

/// POST /api/v1/clients/import
///
/// Bulk import of client profiles from a JSON array.
///
/// # Returns
///
/// * `Result<Json<ImportResult>, AppError>` - Count of imported profiles and
///   per-record errors for the ones that failed.
pub async fn import_clients(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Vec<CreateClientRequest>>,
) -> Result<Json<ImportResult>, AppError> {
    tracing::info!("POST /clients/import - {} records", payload.len());

    let mut imported = 0usize;
    let mut errors = Vec::new();

    for (index, record) in payload.into_iter().enumerate() {
        match state.store.create(record).await {
            Ok(_) => imported += 1,
            Err(e) => errors.push(format!("record {}: {}", index, e)),
        }
    }

    Ok(Json(ImportResult { imported, errors }))
}

/// POST /api/v1/scoring/simulate
///
/// What-if simulation: applies hypothetical changes over the stored profile
/// and reports the projected score next to the current one, with the factors
/// that moved. The stored profile is never modified.
pub async fn simulate_score(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SimulateRequest>,
) -> Result<Json<ScoreSimulation>, AppError> {
    tracing::info!("POST /scoring/simulate - client: {}", payload.client_id);

    let client = state.store.get(payload.client_id).await?.ok_or_else(|| {
        AppError::NotFound(format!("Client with id {} not found", payload.client_id))
    })?;

    let projected_client = crate::repository::apply_update(client.clone(), payload.changes);

    let current_score = compute_score(&client);
    let projected_score = compute_score(&projected_client);

    let current_factors = score_factors(&client);
    let projected_factors = score_factors(&projected_client);

    let changes = current_factors
        .iter()
        .zip(projected_factors.iter())
        .filter(|(current, projected)| current.points != projected.points)
        .map(|(current, projected)| FactorDelta {
            factor: current.name,
            current_points: current.points,
            new_points: projected.points,
            score_impact: projected.points - current.points,
        })
        .collect();

    Ok(Json(ScoreSimulation {
        current_score,
        projected_score,
        changes,
    }))
}

/// GET /api/v1/statistics
///
/// Dashboard aggregates computed over all clients with the scoring engine.
///
/// # Returns
///
/// * `Result<Json<DashboardStats>, AppError>` - Totals, average score, risk
///   counts, grade distribution and the five most recent clients.
pub async fn statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, AppError> {
    tracing::info!("GET /statistics");

    let clients = state.store.list_all().await?;
    let total_clients = clients.len() as u64;

    let mut distribution = GradeDistribution::default();
    let mut score_sum: i64 = 0;

    let scored: Vec<ClientWithScore> = clients.into_iter().map(with_score).collect();
    for item in &scored {
        score_sum += i64::from(item.score.score);
        match item.score.grade {
            Grade::A => distribution.a += 1,
            Grade::B => distribution.b += 1,
            Grade::C => distribution.c += 1,
            Grade::D => distribution.d += 1,
            Grade::E => distribution.e += 1,
        }
    }

    let average_score = if total_clients > 0 {
        (score_sum as f64 / total_clients as f64).round() as i32
    } else {
        0
    };

    // list_all is newest-first, so the first five are the recent ones
    let recent_clients: Vec<ClientWithScore> = scored.iter().take(5).cloned().collect();

    Ok(Json(DashboardStats {
        total_clients,
        average_score,
        low_risk: distribution.a,
        high_risk: distribution.d + distribution.e,
        grade_distribution: distribution,
        recent_clients,
    }))
}
