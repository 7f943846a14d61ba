//! HTTP route handlers.

use askama::Template;
use axum::body::Bytes;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::domain::{BookingDetails, BookingError, BookingFormData, BookingId, BookingStatus};
use crate::session::{GuardDecision, GuardedView, SessionClaims};

use super::dto::*;
use super::error::AppError;
use super::state::AppState;
use super::templates::*;

/// Header carrying the user id set by the upstream identity provider.
pub const USER_ID_HEADER: &str = "x-user-id";

const DEFAULT_PLACE_LIMIT: usize = 5;
const MAX_PLACE_LIMIT: usize = 20;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/api/places/search", get(search_places))
        .route("/api/fares/estimate", get(estimate_fare))
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/:id", get(get_booking))
        .route("/api/bookings/:id/cancel", post(cancel_booking))
        .route("/api/bookings/:id/start", post(start_journey))
        .route("/api/bookings/:id/complete", post(complete_journey))
        .route("/api/bookings/:id/reprice", post(reprice_booking))
        .route("/api/payments/intent", post(create_payment_intent))
        .route("/api/payments/confirm", post(confirm_payment))
        .route("/booking/confirmation", get(confirmation_page))
        .route("/booking/track", get(tracking_page))
        .route("/logout", post(logout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Booking entry page.
async fn index_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let config = state.bookings.config();
    render(&IndexTemplate {
        per_km: config.rates.per_km,
        per_stop: config.rates.per_stop,
        return_discount_pct: (config.rates.return_discount * 100.0).round() as u32,
        max_passengers: config.rules.max_passengers,
    })
}

fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    template.render().map(Html).map_err(|e| AppError::Internal {
        message: format!("Template error: {e}"),
    })
}

/// Parse a JSON body, logging it on failure.
fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!(error = %e, body = %String::from_utf8_lossy(body), "rejected JSON body");
        AppError::BadRequest {
            message: format!("Invalid JSON: {e}"),
            field: None,
        }
    })
}

/// User id from the identity provider, if the request is authenticated.
fn user_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Suggest places for a partially typed location.
async fn search_places(
    State(state): State<AppState>,
    Query(req): Query<PlaceSearchRequest>,
) -> Result<Json<PlaceSearchResponse>, AppError> {
    let query = req.q.trim();
    if query.is_empty() {
        return Ok(Json(PlaceSearchResponse { places: Vec::new() }));
    }

    let limit = req.limit.unwrap_or(DEFAULT_PLACE_LIMIT).min(MAX_PLACE_LIMIT);
    let places = state.places.search_places(query, limit).await?;
    Ok(Json(PlaceSearchResponse { places }))
}

/// Price a leg at the current rates without creating a booking.
async fn estimate_fare(
    State(state): State<AppState>,
    Query(req): Query<FareEstimateRequest>,
) -> Result<Response, AppError> {
    let breakdown = state.bookings.rates().quote(
        req.distance_km,
        req.stops.unwrap_or(0),
        req.return_journey.unwrap_or(false),
    )?;
    Ok(Json(breakdown).into_response())
}

async fn create_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let form: BookingFormData = parse_json(&body)?;
    let booking = state
        .bookings
        .submit_booking(&form, user_id(&headers))
        .await?;
    Ok((StatusCode::CREATED, Json(booking)).into_response())
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingDetails>, AppError> {
    let booking = state.bookings.get_booking(&BookingId::new(id)).await?;
    Ok(Json(booking))
}

async fn cancel_booking(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let booking = state.bookings.cancel_booking(&BookingId::new(id)).await?;
    Ok(ending_session(&state, &headers, booking))
}

async fn complete_journey(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let booking = state.bookings.complete_journey(&BookingId::new(id)).await?;
    Ok(ending_session(&state, &headers, booking))
}

/// Respond with a booking that has finished, removing the session cookie if it referred to it.
fn ending_session(state: &AppState, headers: &HeaderMap, booking: BookingDetails) -> Response {
    let holds_booking = state
        .sessions
        .current(headers)
        .is_some_and(|claims| claims.is_for(&booking.id));

    if holds_booking {
        ([(header::SET_COOKIE, state.sessions.clear_cookie())], Json(booking)).into_response()
    } else {
        Json(booking).into_response()
    }
}

async fn start_journey(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let booking = state.bookings.start_journey(&BookingId::new(id)).await?;

    let claims = session_for(&state, &headers, &booking.id).with_journey_in_progress(&booking.id);
    let cookie = state.sessions.set_cookie(&claims)?;
    Ok(([(header::SET_COOKIE, cookie)], Json(booking)).into_response())
}

async fn reprice_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BookingDetails>, AppError> {
    let booking = state.bookings.reprice_booking(&BookingId::new(id)).await?;
    Ok(Json(booking))
}

/// The request's session if it is unbound or already refers to `id`, otherwise a fresh one.
///
/// Paying for a second booking replaces the session for the first.
fn session_for(state: &AppState, headers: &HeaderMap, id: &BookingId) -> SessionClaims {
    let now = Utc::now();
    match state.sessions.current(headers) {
        Some(claims) if claims.booking_id.is_none() || claims.is_for(id) => claims,
        _ => state.sessions.start(user_id(headers), now),
    }
}

/// Create a payment intent for a pending booking's total.
async fn create_payment_intent(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CreateIntentResponse>, AppError> {
    let req: CreateIntentRequest = parse_json(&body)?;
    let booking = state
        .bookings
        .get_booking(&BookingId::new(req.booking_id))
        .await?;

    if booking.status != BookingStatus::Pending {
        return Err(AppError::Conflict {
            message: format!("booking {} is {}, not awaiting payment", booking.id, booking.status),
        });
    }

    let intent = state
        .payments
        .create_intent(booking.id.as_str(), booking.total_fare_minor())
        .await?;
    debug!(booking_id = %booking.id, intent_id = %intent.id, "payment intent created");

    Ok(Json(intent.into()))
}

/// Confirm a booking using the processor's record of the payment.
async fn confirm_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let req: ConfirmPaymentRequest = parse_json(&body)?;
    let id = BookingId::new(req.booking_id);

    // Never trust the browser's word for the amount: ask the processor
    let signal = state.payments.retrieve_signal(&req.payment_intent_id).await?;

    match state.bookings.confirm_payment(&id, &signal).await {
        Ok(booking) => {
            let claims = session_for(&state, &headers, &booking.id).with_payment_confirmed(&booking.id);
            let cookie = state.sessions.set_cookie(&claims)?;
            Ok((
                [(header::SET_COOKIE, cookie)],
                Json(ConfirmPaymentResponse::confirmed(booking)),
            )
                .into_response())
        }
        Err(e @ (BookingError::NotFound(_) | BookingError::Store(_))) => Err(e.into()),
        Err(e) => {
            let status = state.bookings.get_booking(&id).await.ok().map(|b| b.status);
            let err = AppError::from(e);
            Ok((
                err.status(),
                Json(ConfirmPaymentResponse::failed(status, err.message())),
            )
                .into_response())
        }
    }
}

async fn confirmation_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    guarded_page(&state, &headers, GuardedView::Confirmation).await
}

async fn tracking_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    guarded_page(&state, &headers, GuardedView::Tracking).await
}

/// Render `view` if the session allows it and the booking is still in a fitting state.
async fn guarded_page(
    state: &AppState,
    headers: &HeaderMap,
    view: GuardedView,
) -> Result<Response, AppError> {
    let Some(id) = state.sessions.gate(view, headers) else {
        return Ok(redirect_home(state, false));
    };

    let booking = match state.bookings.get_booking(&id).await {
        Ok(booking) => booking,
        Err(BookingError::NotFound(_)) => return Ok(redirect_home(state, true)),
        Err(e) => return Err(e.into()),
    };

    match view.decide(id, booking.status) {
        GuardDecision::Allow(_) => {
            let booking = BookingView::from_booking(&booking);
            let html = match view {
                GuardedView::Confirmation => render(&ConfirmationTemplate { booking })?,
                GuardedView::Tracking => render(&TrackingTemplate { booking })?,
            };
            Ok(html.into_response())
        }
        GuardDecision::Redirect { clear } => Ok(redirect_home(state, clear)),
    }
}

/// 303 to the booking entry page, optionally removing the session cookie.
fn redirect_home(state: &AppState, clear: bool) -> Response {
    if clear {
        (
            [(header::SET_COOKIE, state.sessions.clear_cookie())],
            Redirect::to("/"),
        )
            .into_response()
    } else {
        Redirect::to("/").into_response()
    }
}

async fn logout(State(state): State<AppState>) -> Response {
    redirect_home(&state, true)
}
