use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};

use ecomm_core::{Envelope, RequestId, ResponseMessage, ServiceError};

use crate::api::cookie::{expired_cookie, read_cookie, session_cookie};
use crate::api::AppState;
use crate::model::{LoginRequest, SessionValue};

type Reply<T> = Result<(HeaderMap, Json<Envelope<T>>), ServiceError>;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/users/login", post(login))
        .route("/api/v1/users/logout", post(logout))
        .route("/api/v1/users/session", get(session))
}

fn cookie_error(e: axum::http::header::InvalidHeaderValue) -> ServiceError {
    ServiceError::Internal(format!("invalid cookie header: {}", e))
}

/// POST /api/v1/users/login: check credentials and set the session cookie.
async fn login(
    State(svc): State<AppState>,
    request_id: RequestId,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Reply<ResponseMessage> {
    let ctx = svc.request_context(request_id.as_str());
    let Json(req) = payload.map_err(|rejection| {
        let e = ServiceError::BadRequest(rejection.body_text());
        svc.reporter().report(ctx.request_id(), &e);
        e
    })?;

    let outcome = svc.login(&ctx, &req).await?;

    let mut headers = HeaderMap::new();
    let cookie = session_cookie(&svc.config().cookie, &outcome.session_id).map_err(|e| {
        let e = cookie_error(e);
        svc.reporter().report(ctx.request_id(), &e);
        e
    })?;
    headers.insert(SET_COOKIE, cookie);
    Ok((headers, Json(Envelope::ok(ResponseMessage::new("successfully login")))))
}

/// POST /api/v1/users/logout: drop the cached session and expire the cookie.
async fn logout(
    State(svc): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
) -> Reply<ResponseMessage> {
    let ctx = svc.request_context(request_id.as_str());
    let session_id = read_cookie(&headers, &svc.config().cookie.name);
    svc.logout(&ctx, session_id.as_deref()).await?;

    let mut out = HeaderMap::new();
    let cookie = expired_cookie(&svc.config().cookie).map_err(|e| {
        let e = cookie_error(e);
        svc.reporter().report(ctx.request_id(), &e);
        e
    })?;
    out.insert(SET_COOKIE, cookie);
    Ok((out, Json(Envelope::ok(ResponseMessage::new("successfully logout")))))
}

/// GET /api/v1/users/session: the caller's cached session state.
async fn session(
    State(svc): State<AppState>,
    request_id: RequestId,
    headers: HeaderMap,
) -> Reply<SessionValue> {
    let ctx = svc.request_context(request_id.as_str());
    let session_id = read_cookie(&headers, &svc.config().cookie.name);
    let session = svc.current_session(&ctx, session_id.as_deref()).await?;
    Ok((HeaderMap::new(), Json(Envelope::ok(session))))
}
