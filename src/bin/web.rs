//! Single binary web server: tournaments, rosters and knockout brackets via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.
//! Brackets are kept in memory unless DATA_DIR is set, then saved as one JSON file per tournament.
//! COOKIE_SECURE=1 marks the organizer session cookie as HTTPS-only.

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{NaiveDate, Utc};
use knockout_tournament_web::{
    build_bracket, clear_score, load_bracket, record_score, reorganize, save_bracket, Bracket,
    DrawOrder, FileRecord, MemoryStore, Slot, Team, TeamStore, Tournament, TournamentError,
    TournamentId, TournamentRecord,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Session key holding the ids of tournaments this client created.
const ORGANIZER_KEY: &str = "organizes";

/// Inactivity threshold: tournaments not accessed for this long are removed.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Per-tournament bookkeeping next to the store.
struct TournamentEntry {
    /// Bracket whose save failed; served instead of the stored one until a save succeeds.
    pending: Option<Bracket>,
    last_activity: Instant,
}

struct AppState {
    store: MemoryStore,
    entries: HashMap<TournamentId, TournamentEntry>,
    /// When set, brackets go to disk instead of the in-memory store.
    files: Option<FileRecord>,
}

impl AppState {
    fn new(files: Option<FileRecord>) -> Self {
        Self {
            store: MemoryStore::new(),
            entries: HashMap::new(),
            files,
        }
    }

    /// Refresh last activity; fails if the tournament does not exist.
    fn touch(&mut self, id: TournamentId) -> Result<(), TournamentError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(TournamentError::TournamentNotFound(id))?;
        entry.last_activity = Instant::now();
        Ok(())
    }

    fn current_bracket(&self, id: TournamentId) -> Result<Option<Bracket>, TournamentError> {
        if let Some(bracket) = self.entries.get(&id).and_then(|e| e.pending.clone()) {
            return Ok(Some(bracket));
        }
        match &self.files {
            Some(files) => load_bracket(files, id),
            None => load_bracket(&self.store, id),
        }
    }

    /// Save the bracket. On failure it is kept as pending so nothing is lost.
    fn commit(&mut self, id: TournamentId, bracket: Bracket) -> Result<(), TournamentError> {
        let result = match &mut self.files {
            Some(files) => save_bracket(files, id, &bracket),
            None => save_bracket(&mut self.store, id, &bracket),
        };
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.pending = match &result {
                Ok(()) => None,
                Err(e) => {
                    log::error!("Saving bracket for tournament {} failed: {}", id, e);
                    Some(bracket)
                }
            };
        }
        result
    }

    fn cleanup(&mut self) -> usize {
        let expired: Vec<TournamentId> = self
            .entries
            .iter()
            .filter(|(_, e)| e.last_activity.elapsed() >= INACTIVITY_TIMEOUT)
            .map(|(id, _)| *id)
            .collect();
        for id in &expired {
            self.entries.remove(id);
            self.store.remove_tournament(*id);
            if let Some(files) = &mut self.files {
                if let Err(e) = files.remove(*id) {
                    log::warn!("Could not remove bracket of tournament {}: {}", id, e);
                }
            }
        }
        expired.len()
    }
}

type SharedState = Data<RwLock<AppState>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Serialize)]
struct TeamSummary {
    id: String,
    name: String,
    players: usize,
}

#[derive(Serialize)]
struct TournamentView<'a> {
    tournament: &'a Tournament,
    teams: Vec<TeamSummary>,
    bracket: Option<Bracket>,
    champion: Option<Team>,
    /// The bracket has changes that could not be saved yet.
    unsaved: bool,
    organizer: bool,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
    sport: String,
    #[serde(default)]
    start_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct NameBody {
    name: String,
}

#[derive(Deserialize)]
struct DrawBody {
    #[serde(default)]
    order: DrawOrder,
}

#[derive(Deserialize)]
struct ScoreBody {
    round: usize,
    match_index: usize,
    slot: Slot,
    /// `null` removes the score.
    score: Option<u32>,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segments: tournament id and team id (e.g. /api/tournaments/{id}/teams/{team_id})
#[derive(Deserialize)]
struct TournamentTeamPath {
    id: TournamentId,
    team_id: String,
}

fn organized_ids(session: &Session) -> Vec<TournamentId> {
    session
        .get::<Vec<TournamentId>>(ORGANIZER_KEY)
        .ok()
        .flatten()
        .unwrap_or_default()
}

fn is_organizer(session: &Session, id: TournamentId) -> bool {
    organized_ids(session).contains(&id)
}

fn forbidden() -> HttpResponse {
    HttpResponse::Forbidden().json(serde_json::json!({ "error": "Only the organizer can do this" }))
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn error_response(e: &TournamentError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        TournamentError::TournamentNotFound(_)
        | TournamentError::TeamNotFound(_)
        | TournamentError::PlayerNotFound => HttpResponse::NotFound().json(body),
        TournamentError::PersistenceFailure(_) => HttpResponse::ServiceUnavailable().json(body),
        _ => HttpResponse::BadRequest().json(body),
    }
}

/// Full tournament view: record, team summaries and current bracket.
fn view(state: &AppState, id: TournamentId, organizer: bool) -> HttpResponse {
    let Some(tournament) = state.store.get(id) else {
        return error_response(&TournamentError::TournamentNotFound(id));
    };
    let teams = match state.store.teams(id) {
        Ok(teams) => teams,
        Err(e) => return error_response(&e),
    };
    let teams = teams
        .into_iter()
        .map(|t| TeamSummary {
            players: state.store.player_count(id, &t.id).unwrap_or(0),
            id: t.id,
            name: t.name,
        })
        .collect();
    let bracket = match state.current_bracket(id) {
        Ok(b) => b,
        Err(e) => return error_response(&e),
    };
    let unsaved = state.entries.get(&id).map_or(false, |e| e.pending.is_some());
    HttpResponse::Ok().json(TournamentView {
        tournament,
        teams,
        champion: bracket.as_ref().and_then(|b| b.champion().cloned()),
        bracket,
        unsaved,
        organizer,
    })
}

/// Save the bracket and answer with the tournament view (503 if the save failed).
fn commit_and_view(state: &mut AppState, id: TournamentId, bracket: Bracket) -> HttpResponse {
    match state.commit(id, bracket) {
        Ok(()) => view(state, id, true),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "knockout-tournament-web",
    })
}

/// Create a tournament; this session becomes its organizer.
#[post("/api/tournaments")]
async fn api_create_tournament(
    state: SharedState,
    session: Session,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    let start_date = body.start_date.unwrap_or_else(|| Utc::now().date_naive());
    let tournament = match Tournament::new(body.name.as_str(), body.sport.as_str(), start_date) {
        Ok(t) => t,
        Err(e) => return error_response(&e),
    };
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    let id = g.store.insert(tournament);
    g.entries.insert(
        id,
        TournamentEntry {
            pending: None,
            last_activity: Instant::now(),
        },
    );

    let mut organizes = organized_ids(&session);
    organizes.push(id);
    if let Err(e) = session.insert(ORGANIZER_KEY, organizes) {
        log::warn!("Could not remember organizer of tournament {}: {}", id, e);
    }
    log::info!("Created tournament {}", id);
    view(&g, id, true)
}

/// Get a tournament with its teams and bracket. Touching it refreshes last_activity.
#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.touch(path.id) {
        return error_response(&e);
    }
    view(&g, path.id, is_organizer(&session, path.id))
}

/// Register a team.
#[post("/api/tournaments/{id}/teams")]
async fn api_add_team(
    state: SharedState,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.touch(path.id) {
        return error_response(&e);
    }
    let result = match g.store.get_mut(path.id) {
        Some(t) => t.add_team(body.name.as_str()),
        None => Err(TournamentError::TournamentNotFound(path.id)),
    };
    match result {
        Ok(_) => view(&g, path.id, is_organizer(&session, path.id)),
        Err(e) => error_response(&e),
    }
}

/// Remove a team (organizer only). An existing bracket is unaffected until reorganized.
#[delete("/api/tournaments/{id}/teams/{team_id}")]
async fn api_remove_team(state: SharedState, session: Session, path: Path<TournamentTeamPath>) -> HttpResponse {
    if !is_organizer(&session, path.id) {
        return forbidden();
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.touch(path.id) {
        return error_response(&e);
    }
    let result = match g.store.get_mut(path.id) {
        Some(t) => t.remove_team(&path.team_id),
        None => Err(TournamentError::TournamentNotFound(path.id)),
    };
    match result {
        Ok(()) => view(&g, path.id, true),
        Err(e) => error_response(&e),
    }
}

/// Add a player to a team's roster.
#[post("/api/tournaments/{id}/teams/{team_id}/players")]
async fn api_add_player(
    state: SharedState,
    session: Session,
    path: Path<TournamentTeamPath>,
    body: Json<NameBody>,
) -> HttpResponse {
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.touch(path.id) {
        return error_response(&e);
    }
    let result = match g.store.get_mut(path.id) {
        Some(t) => t.add_player(&path.team_id, body.name.as_str()),
        None => Err(TournamentError::TournamentNotFound(path.id)),
    };
    match result {
        Ok(()) => view(&g, path.id, is_organizer(&session, path.id)),
        Err(e) => error_response(&e),
    }
}

/// Import teams and players from a `team,player` CSV body (organizer only).
#[post("/api/tournaments/{id}/teams/import")]
async fn api_import_teams(
    state: SharedState,
    session: Session,
    path: Path<TournamentPath>,
    body: String,
) -> HttpResponse {
    if !is_organizer(&session, path.id) {
        return forbidden();
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.touch(path.id) {
        return error_response(&e);
    }
    let result = match g.store.get_mut(path.id) {
        Some(t) => t.import_teams_csv(body.as_bytes()),
        None => Err(TournamentError::TournamentNotFound(path.id)),
    };
    match result {
        Ok(_) => view(&g, path.id, true),
        Err(e) => error_response(&e),
    }
}

/// Generate the first bracket (organizer only). 409 if one already exists; use reorganize.
#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(
    state: SharedState,
    session: Session,
    path: Path<TournamentPath>,
    body: Option<Json<DrawBody>>,
) -> HttpResponse {
    if !is_organizer(&session, path.id) {
        return forbidden();
    }
    let order = body.map(|b| b.order).unwrap_or_default();
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.touch(path.id) {
        return error_response(&e);
    }
    match g.current_bracket(path.id) {
        Ok(Some(_)) => {
            return HttpResponse::Conflict()
                .json(serde_json::json!({ "error": "Bracket already exists" }))
        }
        Ok(None) => {}
        Err(e) => return error_response(&e),
    }
    let bracket = match g.store.teams(path.id) {
        Ok(teams) => build_bracket(&order.arrange(teams)).map_err(TournamentError::from),
        Err(e) => Err(e),
    };
    match bracket {
        Ok(bracket) => commit_and_view(&mut g, path.id, bracket),
        Err(e) => error_response(&e),
    }
}

/// Discard the bracket and draw a new one from the current teams (organizer only).
#[post("/api/tournaments/{id}/bracket/reorganize")]
async fn api_reorganize_bracket(
    state: SharedState,
    session: Session,
    path: Path<TournamentPath>,
    body: Option<Json<DrawBody>>,
) -> HttpResponse {
    if !is_organizer(&session, path.id) {
        return forbidden();
    }
    let order = body
        .map(|b| b.order)
        .unwrap_or(DrawOrder::Shuffled { seed: None });
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.touch(path.id) {
        return error_response(&e);
    }
    let bracket = match g.store.teams(path.id) {
        Ok(teams) => reorganize(&order.arrange(teams)).map_err(TournamentError::from),
        Err(e) => Err(e),
    };
    match bracket {
        Ok(bracket) => commit_and_view(&mut g, path.id, bracket),
        Err(e) => error_response(&e),
    }
}

/// Set or clear one side's score (organizer only). Winners propagate through later rounds.
#[put("/api/tournaments/{id}/bracket/score")]
async fn api_record_score(
    state: SharedState,
    session: Session,
    path: Path<TournamentPath>,
    body: Json<ScoreBody>,
) -> HttpResponse {
    if !is_organizer(&session, path.id) {
        return forbidden();
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.touch(path.id) {
        return error_response(&e);
    }
    let mut bracket = match g.current_bracket(path.id) {
        Ok(Some(b)) => b,
        Ok(None) => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No bracket" })),
        Err(e) => return error_response(&e),
    };
    let result = match body.score {
        Some(score) => record_score(&mut bracket, body.round, body.match_index, body.slot, score),
        None => clear_score(&mut bracket, body.round, body.match_index, body.slot),
    };
    match result {
        Ok(()) => commit_and_view(&mut g, path.id, bracket),
        Err(e) => error_response(&TournamentError::from(e)),
    }
}

/// Retry saving a bracket whose last save failed (organizer only).
#[post("/api/tournaments/{id}/bracket/save")]
async fn api_save_bracket(state: SharedState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    if !is_organizer(&session, path.id) {
        return forbidden();
    }
    let mut g = match state.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    if let Err(e) = g.touch(path.id) {
        return error_response(&e);
    }
    let pending = g.entries.get(&path.id).and_then(|e| e.pending.clone());
    match pending {
        Some(bracket) => commit_and_view(&mut g, path.id, bracket),
        None => view(&g, path.id, true),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let files = std::env::var("DATA_DIR").ok().map(FileRecord::new);
    let cookie_secure = std::env::var("COOKIE_SECURE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let bind = (host.as_str(), port);
    match &files {
        Some(f) => log::info!("Saving brackets to {}", f.dir().display()),
        None => log::info!("Keeping brackets in memory (set DATA_DIR to save to disk)"),
    }
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state = Data::new(RwLock::new(AppState::new(files)));
    // Sessions only need to survive this process.
    let key = Key::generate();

    // Background task: every 30 minutes, remove tournaments inactive for 12+ hours
    let state_cleanup = state.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match state_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let removed = g.cleanup();
            if removed > 0 {
                log::info!("Cleaned up {} inactive tournament(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(cookie_secure)
                    .build(),
            )
            .service(api_health)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_import_teams)
            .service(api_add_team)
            .service(api_remove_team)
            .service(api_add_player)
            .service(api_generate_bracket)
            .service(api_reorganize_bracket)
            .service(api_record_score)
            .service(api_save_bracket)
    })
    .bind(bind)?
    .run()
    .await
}
