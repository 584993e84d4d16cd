//! Reservation HTTP handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::application::reservations::{billable_days, ReservationService};
use crate::domain::{ReservationEvent, ReservationStatus, ValidationError};
use crate::interfaces::http::common::{ApiError, ApiPath, ApiQuery, ApiResponse, ValidatedJson};

use super::dto::*;

/// Application state for reservation handlers.
#[derive(Clone)]
pub struct ReservationAppState {
    pub service: Arc<ReservationService>,
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn to_dtos(reservations: Vec<crate::domain::Reservation>) -> Vec<ReservationDto> {
    reservations.into_iter().map(ReservationDto::from).collect()
}

fn parse_status(raw: &str) -> Result<ReservationStatus, ValidationError> {
    ReservationStatus::ALL
        .into_iter()
        .find(|s| s.as_str().eq_ignore_ascii_case(raw))
        .ok_or_else(|| ValidationError::UnknownStatus(raw.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    params(ListReservationsQuery),
    responses(
        (status = 200, description = "Reservations, optionally filtered by status", body = ApiResponse<Vec<ReservationDto>>),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_reservations(
    State(state): State<ReservationAppState>,
    ApiQuery(query): ApiQuery<ListReservationsQuery>,
) -> ApiResult<Vec<ReservationDto>> {
    let reservations = match query.status.as_deref() {
        Some(raw) => state.service.by_status(&[parse_status(raw)?]).await?,
        None => state.service.all().await?,
    };
    Ok(Json(ApiResponse::success(to_dtos(reservations))))
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created, awaiting payment", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown car"),
        (status = 409, description = "Car already booked for an overlapping period"),
        (status = 503, description = "Store unavailable")
    )
)]
pub async fn create_reservation(
    State(state): State<ReservationAppState>,
    ValidatedJson(request): ValidatedJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReservationDto>>), ApiError> {
    let created = state.service.create(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(ReservationDto::from(created))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/reservations/{reservation_id}",
    tag = "Reservations",
    params(("reservation_id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation details", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_reservation(
    State(state): State<ReservationAppState>,
    ApiPath(reservation_id): ApiPath<i32>,
) -> ApiResult<ReservationDto> {
    let reservation = state
        .service
        .by_id(reservation_id)
        .await?
        .ok_or_else(|| crate::domain::DomainError::reservation_not_found(reservation_id))?;
    Ok(Json(ApiResponse::success(reservation.into())))
}

#[utoipa::path(
    put,
    path = "/api/v1/reservations/{reservation_id}",
    tag = "Reservations",
    params(("reservation_id" = i32, Path, description = "Reservation ID")),
    request_body = UpdateReservationRequest,
    responses(
        (status = 200, description = "Reservation rescheduled and repriced", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Overlap, or reservation already finished")
    )
)]
pub async fn update_reservation(
    State(state): State<ReservationAppState>,
    ApiPath(reservation_id): ApiPath<i32>,
    ValidatedJson(request): ValidatedJson<UpdateReservationRequest>,
) -> ApiResult<ReservationDto> {
    let updated = state.service.update(reservation_id, request.into()).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/reservations/{reservation_id}",
    tag = "Reservations",
    params(("reservation_id" = i32, Path, description = "Reservation ID")),
    responses(
        (status = 200, description = "Reservation cancelled", body = ApiResponse<ReservationDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Reservation can no longer be cancelled")
    )
)]
pub async fn cancel_reservation(
    State(state): State<ReservationAppState>,
    ApiPath(reservation_id): ApiPath<i32>,
) -> ApiResult<ReservationDto> {
    let cancelled = state.service.cancel(reservation_id).await?;
    Ok(Json(ApiResponse::success(cancelled.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/reservations/{reservation_id}/transitions",
    tag = "Reservations",
    params(("reservation_id" = i32, Path, description = "Reservation ID")),
    request_body = TransitionRequest,
    responses(
        (status = 200, description = "Event applied", body = ApiResponse<ReservationDto>),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Event not allowed in the current status")
    )
)]
pub async fn transition_reservation(
    State(state): State<ReservationAppState>,
    ApiPath(reservation_id): ApiPath<i32>,
    ValidatedJson(request): ValidatedJson<TransitionRequest>,
) -> ApiResult<ReservationDto> {
    let event = ReservationEvent::try_from(request)?;
    let updated = state.service.transition(reservation_id, event).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/cars/{car_id}/reservations",
    tag = "Cars",
    params(("car_id" = i32, Path, description = "Car ID")),
    responses(
        (status = 200, description = "All reservations of the car", body = ApiResponse<Vec<ReservationDto>>)
    )
)]
pub async fn list_car_reservations(
    State(state): State<ReservationAppState>,
    ApiPath(car_id): ApiPath<i32>,
) -> ApiResult<Vec<ReservationDto>> {
    let reservations = state.service.by_car(car_id).await?;
    Ok(Json(ApiResponse::success(to_dtos(reservations))))
}

#[utoipa::path(
    get,
    path = "/api/v1/cars/{car_id}/availability",
    tag = "Cars",
    params(("car_id" = i32, Path, description = "Car ID"), PeriodQuery),
    responses(
        (status = 200, description = "Whether the car is free for the period", body = ApiResponse<AvailabilityDto>),
        (status = 400, description = "Invalid period")
    )
)]
pub async fn car_availability(
    State(state): State<ReservationAppState>,
    ApiPath(car_id): ApiPath<i32>,
    ApiQuery(period): ApiQuery<PeriodQuery>,
) -> ApiResult<AvailabilityDto> {
    let available = state
        .service
        .is_available(car_id, period.start, period.end, period.exclude)
        .await?;
    Ok(Json(ApiResponse::success(AvailabilityDto {
        car_id,
        start: period.start,
        end: period.end,
        available,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/cars/{car_id}/quote",
    tag = "Cars",
    params(("car_id" = i32, Path, description = "Car ID"), PeriodQuery),
    responses(
        (status = 200, description = "Price for the period", body = ApiResponse<QuoteDto>),
        (status = 400, description = "Invalid period"),
        (status = 404, description = "Unknown car")
    )
)]
pub async fn car_quote(
    State(state): State<ReservationAppState>,
    ApiPath(car_id): ApiPath<i32>,
    ApiQuery(period): ApiQuery<PeriodQuery>,
) -> ApiResult<QuoteDto> {
    let total_price = state.service.quote(car_id, period.start, period.end).await?;
    Ok(Json(ApiResponse::success(QuoteDto {
        car_id,
        start: period.start,
        end: period.end,
        billable_days: billable_days(period.start, period.end)?,
        total_price,
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}/reservations",
    tag = "Users",
    params(("user_id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "All reservations of the user", body = ApiResponse<Vec<ReservationDto>>)
    )
)]
pub async fn list_user_reservations(
    State(state): State<ReservationAppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> ApiResult<Vec<ReservationDto>> {
    let reservations = state.service.by_user(user_id).await?;
    Ok(Json(ApiResponse::success(to_dtos(reservations))))
}
