//! Per-browser grid state, keyed by the `grid_session` cookie.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::api::AppState;
use crate::gateway::DEFAULT_MODEL_ID;
use crate::grid::{GridController, GridError, LocalBackend};

pub const SESSION_COOKIE: &str = "grid_session";

/// One-shot banner shown on the next grid render
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: &'static str,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: "success",
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: "error",
            message: message.into(),
        }
    }
}

pub struct GridSession {
    pub grid: GridController<LocalBackend>,
    pub model_id: String,
    pub notice: Option<Notice>,
}

impl GridSession {
    fn new(state: &AppState) -> Self {
        Self {
            grid: GridController::new(
                state.grid_backend(),
                state.config.grid.page_size,
                state.config.grid.filter_debounce,
            ),
            model_id: DEFAULT_MODEL_ID.to_string(),
            notice: None,
        }
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::success(message));
    }

    /// Report invalid form input
    pub fn reject(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::error(message));
    }

    pub fn fail(&mut self, err: &GridError) {
        tracing::warn!("Grid action failed: {}", err);
        self.notice = Some(Notice::error(notice_message(err)));
    }
}

/// User-facing text for a grid error. Storage details stay in the log.
pub fn notice_message(err: &GridError) -> String {
    match err {
        GridError::Backend(e) => e.public_message(),
        GridError::BulkHalted {
            id,
            completed,
            source,
        } => format!(
            "Translation stopped at row {} after {} rows: {}",
            id,
            completed,
            source.public_message()
        ),
        other => other.to_string(),
    }
}

struct SessionSlot {
    session: Arc<Mutex<GridSession>>,
    touched: Instant,
}

/// Grid sessions issued by this process. Sessions idle for longer than the
/// configured limit are dropped whenever a new one is started.
pub struct SessionStore {
    sessions: DashMap<Uuid, SessionSlot>,
    idle: Duration,
}

impl SessionStore {
    pub fn new(idle: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            idle,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    fn is_idle(&self, slot: &SessionSlot, now: Instant) -> bool {
        now.duration_since(slot.touched) >= self.idle
    }

    /// Mark a live session as used. Unknown and expired ids yield `None`.
    fn touch(&self, id: &Uuid, now: Instant) -> Option<Arc<Mutex<GridSession>>> {
        let mut slot = self.sessions.get_mut(id)?;
        if self.is_idle(&slot, now) {
            return None;
        }
        slot.touched = now;
        Some(slot.session.clone())
    }

    fn evict_idle(&self, now: Instant) {
        self.sessions.retain(|id, slot| {
            let keep = !self.is_idle(slot, now);
            if !keep {
                tracing::debug!("Dropping idle grid session {}", id);
            }
            keep
        });
    }

    fn start(&self, session: GridSession, now: Instant) -> (Uuid, Arc<Mutex<GridSession>>) {
        self.evict_idle(now);

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(session));
        tracing::debug!("Starting grid session {}", id);
        self.sessions.insert(
            id,
            SessionSlot {
                session: session.clone(),
                touched: now,
            },
        );
        (id, session)
    }
}

/// Session resolved for a request, plus whether the cookie still has to be set
pub struct SessionHandle {
    pub id: Uuid,
    pub is_new: bool,
    pub session: Arc<Mutex<GridSession>>,
}

impl SessionHandle {
    /// Look up the caller's session. A missing, unknown or expired cookie gets
    /// a freshly issued id; ids chosen by the client are never adopted.
    pub fn resolve(state: &AppState, headers: &HeaderMap) -> Self {
        let now = Instant::now();
        if let Some(id) = session_id(headers) {
            if let Some(session) = state.sessions.touch(&id, now) {
                return Self {
                    id,
                    is_new: false,
                    session,
                };
            }
        }

        let (id, session) = state.sessions.start(GridSession::new(state), now);
        Self {
            id,
            is_new: true,
            session,
        }
    }

    pub fn attach_cookie(&self, mut response: Response) -> Response {
        if self.is_new {
            let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, self.id);
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    let prefix = format!("{}=", SESSION_COOKIE);
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|part| part.trim().strip_prefix(prefix.as_str()))
        .find_map(|id| Uuid::parse_str(id).ok())
}
