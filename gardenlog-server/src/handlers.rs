use actix_web::{web, HttpResponse};
use base64::Engine as _;
use gardenlog::corrections::{CorrectionPatch, NewCorrection};
use gardenlog::journal::{self, UpdateAction};
use gardenlog::{meta, GardenLogError};
use serde::Deserialize;

use crate::AppState;

/// Configure all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/api")
            // Plants
            .route("/plants", web::get().to(list_plants))
            .route("/plants/{id}", web::get().to(get_plant))
            .route("/plants/{id}/journal", web::post().to(update_journal))
            // Dashboard
            .route("/dashboard", web::get().to(dashboard))
            // Photos
            .route("/photos/{id}", web::get().to(list_photos))
            .route("/photos/{id}", web::post().to(upload_photos))
            // Corrections
            .route("/corrections", web::get().to(list_corrections))
            .route("/corrections", web::post().to(create_correction))
            .route("/corrections/{id}", web::put().to(update_correction))
            .route(
                "/corrections/{id}/increment",
                web::post().to(increment_correction),
            ),
    );
}

// ── Helpers ─────────────────────────────────────────────────────────

fn ok_json(value: serde_json::Value) -> HttpResponse {
    HttpResponse::Ok().json(value)
}

fn created_json(value: serde_json::Value) -> HttpResponse {
    HttpResponse::Created().json(value)
}

fn err_response(e: GardenLogError) -> HttpResponse {
    match &e {
        GardenLogError::NotFound { .. } => HttpResponse::NotFound().json(serde_json::json!({
            "error": e.to_string()
        })),
        GardenLogError::Validation(_) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": e.to_string()
        })),
        _ => {
            log::error!("Internal error: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

// ── Health ──────────────────────────────────────────────────────────

async fn health() -> HttpResponse {
    ok_json(serde_json::json!({ "status": "OK" }))
}

// ── Plants ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum StatusParam {
    Active,
    Inactive,
}

#[derive(Deserialize)]
struct PlantsQuery {
    status: Option<StatusParam>,
}

async fn list_plants(
    state: web::Data<AppState>,
    query: web::Query<PlantsQuery>,
) -> HttpResponse {
    let plants = match query.status {
        None => state.store.list(),
        Some(StatusParam::Active) => state.store.list_active(),
        Some(StatusParam::Inactive) => state.store.list_inactive(),
    };
    match plants.and_then(|p| Ok(serde_json::to_value(p)?)) {
        Ok(v) => ok_json(v),
        Err(e) => err_response(e),
    }
}

async fn get_plant(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match state.store.get(&path) {
        Ok(plant) => match serde_json::to_value(plant) {
            Ok(v) => ok_json(v),
            Err(e) => err_response(e.into()),
        },
        // An unreadable document reads as absent here; the parse failure is
        // still logged.
        Err(e @ GardenLogError::Parse { .. }) => {
            log::warn!("Treating unreadable plant document as absent: {e}");
            HttpResponse::NotFound().json(serde_json::json!({
                "error": format!("plant not found: {}", path.as_str())
            }))
        }
        Err(e) => err_response(e),
    }
}

#[derive(Deserialize)]
struct JournalUpdate {
    action: UpdateAction,
    fragment: serde_json::Value,
}

async fn update_journal(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<JournalUpdate>,
) -> HttpResponse {
    let JournalUpdate { action, fragment } = body.into_inner();
    match journal::apply_update(&state.store, &path, action, fragment) {
        Ok(plant) => match serde_json::to_value(plant) {
            Ok(v) => ok_json(v),
            Err(e) => err_response(e.into()),
        },
        Err(e) => err_response(e),
    }
}

// ── Dashboard ───────────────────────────────────────────────────────

async fn dashboard(state: web::Data<AppState>) -> HttpResponse {
    let metadata = meta::load(&state.meta_file);
    let garden_name = metadata
        .garden_name
        .unwrap_or_else(|| "Master Garden Dashboard".to_string());

    match state.resolver.resolve(&state.store) {
        Ok(categories) => ok_json(serde_json::json!({
            "garden_name": garden_name,
            "categories": categories,
        })),
        Err(e) => err_response(e),
    }
}

// ── Photos ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PhotoUpload {
    filename: String,
    /// Base64-encoded file contents
    data: String,
}

async fn list_photos(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match state.photos.list(&path) {
        Ok(names) => ok_json(serde_json::json!({ "photos": names })),
        Err(e) => err_response(e),
    }
}

async fn upload_photos(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<Vec<PhotoUpload>>,
) -> HttpResponse {
    let mut results = Vec::with_capacity(body.len());

    for upload in body.into_inner() {
        let outcome = base64::engine::general_purpose::STANDARD
            .decode(&upload.data)
            .map_err(|e| GardenLogError::Validation(format!("invalid base64 payload: {e}")))
            .and_then(|bytes| state.photos.store(&path, &upload.filename, &bytes));

        results.push(match outcome {
            Ok(_) => serde_json::json!({ "filename": upload.filename, "ok": true }),
            Err(e) => serde_json::json!({
                "filename": upload.filename,
                "ok": false,
                "error": e.to_string(),
            }),
        });
    }

    ok_json(serde_json::json!({ "results": results }))
}

// ── Corrections ─────────────────────────────────────────────────────

async fn list_corrections(state: web::Data<AppState>) -> HttpResponse {
    match state
        .corrections
        .list()
        .and_then(|c| Ok(serde_json::to_value(c)?))
    {
        Ok(v) => ok_json(v),
        Err(e) => err_response(e),
    }
}

async fn create_correction(
    state: web::Data<AppState>,
    body: web::Json<NewCorrection>,
) -> HttpResponse {
    match state.corrections.create(body.into_inner()) {
        Ok(id) => created_json(serde_json::json!({ "id": id })),
        Err(e) => err_response(e),
    }
}

async fn update_correction(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CorrectionPatch>,
) -> HttpResponse {
    match state.corrections.update(&path, body.into_inner()) {
        Ok(()) => ok_json(serde_json::json!({ "ok": true, "id": path.as_str() })),
        Err(e) => err_response(e),
    }
}

async fn increment_correction(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    match state.corrections.increment(&path) {
        Ok(true) => ok_json(serde_json::json!({ "ok": true, "id": path.as_str() })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("correction not found: {}", path.as_str())
        })),
        Err(e) => err_response(e),
    }
}
