//! Single binary web server: REST API over the bracket engine with an in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, RESOLVE_BYES (true/false, default true).

use actix_web::{
    get, post,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use double_elim_web::{
    advance_match, read_participants_csv, start_tournament, BracketError, BracketStore, Match, MatchId,
    MemoryStore, Participant, Tournament, TournamentId, UserId,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shared store: every tournament, participant and match.
type AppState = Data<MemoryStore>;

/// Tournaments not touched for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// How often the cleanup task runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Server settings read from the environment.
#[derive(Clone, Debug)]
struct ServerConfig {
    host: String,
    port: u16,
    resolve_byes: bool,
}

impl ServerConfig {
    fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);
        let resolve_byes = std::env::var("RESOLVE_BYES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(true);
        Self { host, port, resolve_byes }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct ParticipantBody {
    user_id: UserId,
    seed: u32,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    participants: Vec<ParticipantBody>,
}

#[derive(Deserialize)]
struct ImportQuery {
    name: String,
}

#[derive(Deserialize)]
struct MatchResultBody {
    winner_id: UserId,
    loser_id: UserId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segment: match id (e.g. /api/matches/{id}/result)
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

/// Full read model of one tournament.
#[derive(Serialize)]
struct TournamentView {
    tournament: Tournament,
    participants: Vec<Participant>,
    matches: Vec<Match>,
}

fn error_response(e: &BracketError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        BracketError::NotFound(_) => HttpResponse::NotFound().json(body),
        BracketError::Conflict(_) => HttpResponse::Conflict().json(body),
        BracketError::Storage(_) => {
            log::error!("{}", e);
            HttpResponse::InternalServerError().json(body)
        }
        BracketError::InvalidBracket { .. } | BracketError::InvalidResult { .. } | BracketError::Import(_) => {
            HttpResponse::BadRequest().json(body)
        }
    }
}

/// Full view of one tournament. Viewing it counts as activity.
fn tournament_view(state: &MemoryStore, id: TournamentId) -> Result<TournamentView, BracketError> {
    state.touch(id)?;
    state.read(|tables| {
        Ok(TournamentView {
            tournament: tables.load_tournament(id)?,
            participants: tables.list_participants(id)?,
            matches: tables.list_tournament_matches(id)?,
        })
    })
}

/// Start a tournament and answer with its full view.
fn start_and_respond(state: &AppState, config: &ServerConfig, name: &str, participants: Vec<Participant>) -> HttpResponse {
    match start_tournament(state.get_ref(), name, participants, config.resolve_byes)
        .and_then(|id| tournament_view(state, id))
    {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "double-elim-web",
    })
}

/// Create and start a tournament from a JSON participant list.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    config: Data<ServerConfig>,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let participants = body
        .participants
        .into_iter()
        .map(|p| Participant::new(p.user_id, p.seed))
        .collect();
    start_and_respond(&state, &config, &body.name, participants)
}

/// Create and start a tournament from a CSV body (`user_id,seed`).
#[post("/api/tournaments/import")]
async fn api_import_tournament(
    state: AppState,
    config: Data<ServerConfig>,
    query: Query<ImportQuery>,
    body: String,
) -> HttpResponse {
    match read_participants_csv(body.as_bytes()) {
        Ok(participants) => start_and_respond(&state, &config, &query.name, participants),
        Err(e) => error_response(&e),
    }
}

/// Tournament row, participants and all matches (404 if not found).
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    match tournament_view(&state, path.id) {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => error_response(&e),
    }
}

#[get("/api/tournaments/{id}/matches")]
async fn api_list_matches(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    let matches = state
        .touch(path.id)
        .and_then(|_| state.read(|tables| tables.list_tournament_matches(path.id)));
    match matches {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => error_response(&e),
    }
}

/// Report a match result. Conflicts (already resolved, slot taken) answer 409.
#[post("/api/matches/{id}/result")]
async fn api_report_result(state: AppState, path: Path<MatchPath>, body: Json<MatchResultBody>) -> HttpResponse {
    match advance_match(state.get_ref(), path.id, body.winner_id, body.loser_id) {
        Ok(outcome) => {
            if outcome.bracket_reset_activated {
                log::info!("match {}: bracket reset activated", path.id);
            }
            HttpResponse::Ok().json(outcome)
        }
        Err(e) => error_response(&e),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    let bind = (config.host.clone(), config.port);
    log::info!(
        "Starting server at http://{}:{} (resolve byes: {})",
        bind.0,
        bind.1,
        config.resolve_byes
    );

    let state = Data::new(MemoryStore::new());
    let config = Data::new(config);

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            match state_cleanup.evict_inactive(INACTIVITY_TIMEOUT) {
                Ok(0) => {}
                Ok(removed) => log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed),
                Err(e) => log::warn!("Tournament cleanup skipped: {}", e),
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(config.clone())
            .service(api_health)
            .service(api_create_tournament)
            .service(api_import_tournament)
            .service(api_get_tournament)
            .service(api_list_matches)
            .service(api_report_result)
    })
    .bind(bind)?
    .run()
    .await
}
