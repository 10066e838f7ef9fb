//! Event handlers.

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use event_blog_core::{EventStatus, EventWindow, UserId};

use super::{optional, parse_id, payload, required};
use crate::db::EventRepository;
use crate::error::{AppError, Result};
use crate::models::event::{Event, NewEvent};
use crate::state::AppState;

/// Body of `POST /api/events`. Times are RFC 3339.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub owner_id: Option<String>,
    pub title: Option<String>,
    pub start_at: Option<String>,
    pub end_at: Option<String>,
    pub location: Option<String>,
    pub status: Option<String>,
}

impl CreateEventRequest {
    fn validate(self) -> Result<NewEvent> {
        let owner_id: UserId = parse_id(&required(self.owner_id, "owner_id")?, "owner_id")?;
        let title = required(self.title, "title")?;
        let start_at = timestamp(required(self.start_at, "start_at")?, "start_at")?;
        let end_at = timestamp(required(self.end_at, "end_at")?, "end_at")?;

        let window = EventWindow::new(start_at, end_at)
            .map_err(|_| AppError::BadRequest("end_at must not be before start_at".to_string()))?;

        let status = match optional(self.status) {
            Some(raw) => raw
                .parse::<EventStatus>()
                .map_err(AppError::BadRequest)?,
            None => EventStatus::default(),
        };

        Ok(NewEvent {
            owner_id,
            title,
            window,
            location: optional(self.location),
            status,
        })
    }
}

fn timestamp(raw: String, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| AppError::BadRequest(format!("{field} must be an RFC 3339 timestamp")))
}

/// `GET /api/events`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Event>>> {
    let events = EventRepository::new(state.provisioner()).list().await?;
    Ok(Json(events))
}

/// `POST /api/events`
pub async fn create(
    State(state): State<AppState>,
    body: std::result::Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>)> {
    let new = payload(body)?.validate()?;
    let event = EventRepository::new(state.provisioner()).create(new).await?;
    Ok((StatusCode::CREATED, Json(event)))
}
