use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use axum_helpers::{
    JsonBody,
    errors::responses::{
        BadRequestInvalidIdResponse, BadRequestJsonResponse, ConflictResponse,
        InternalServerErrorResponse, InvalidCredentialsResponse, NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{UserError, UserResult};
use crate::models::{ActivateAccount, CreateUser, UpdateUser, User, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

const TAG: &str = "Users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_user,
        list_users,
        list_active_users,
        get_user,
        get_user_by_email,
        update_user,
        delete_user,
        activate_account,
    ),
    components(
        schemas(UserResponse, CreateUser, UpdateUser, ActivateAccount),
        responses(
            NotFoundResponse,
            BadRequestInvalidIdResponse,
            BadRequestJsonResponse,
            InvalidCredentialsResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User account endpoints")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/active", get(list_active_users))
        .route("/activate", put(activate_account))
        .route("/email/{email}", get(get_user_by_email))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .with_state(shared_service)
}

fn respond(users: Vec<User>) -> Json<Vec<UserResponse>> {
    Json(users.into_iter().map(UserResponse::from).collect())
}

/// Register a new (inactive) user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = BadRequestJsonResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    JsonBody(input): JsonBody<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// List all users in creation order
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
) -> UserResult<Json<Vec<UserResponse>>> {
    Ok(respond(service.find_all().await?))
}

/// List activated users
#[utoipa::path(
    get,
    path = "/active",
    tag = TAG,
    responses(
        (status = 200, description = "Active users", body = Vec<UserResponse>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_active_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
) -> UserResult<Json<Vec<UserResponse>>> {
    Ok(respond(service.find_active().await?))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID (24 hex characters)")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestInvalidIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
) -> UserResult<Json<UserResponse>> {
    let user = service.find_one_by_id(&id).await?;
    Ok(Json(user.into()))
}

/// Get a user by email
#[utoipa::path(
    get,
    path = "/email/{email}",
    tag = TAG,
    params(
        ("email" = String, Path, description = "Exact email address")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user_by_email<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(email): Path<String>,
) -> UserResult<Json<UserResponse>> {
    match service.find_one_by_email(&email).await? {
        Some(user) => Ok(Json(user.into())),
        None => Err(UserError::NotFound(email)),
    }
}

/// Update a user's email and/or password
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID (24 hex characters)")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 422, response = BadRequestJsonResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update(&id, input).await?;
    Ok(Json(user.into()))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = String, Path, description = "User ID (24 hex characters)")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(id): Path<String>,
) -> UserResult<StatusCode> {
    service.remove(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Activate an account by proving knowledge of its password
#[utoipa::path(
    put,
    path = "/activate",
    tag = TAG,
    request_body = ActivateAccount,
    responses(
        (status = 200, description = "Account active", body = UserResponse),
        (status = 400, response = InvalidCredentialsResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = BadRequestJsonResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn activate_account<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    JsonBody(input): JsonBody<ActivateAccount>,
) -> UserResult<Json<UserResponse>> {
    let user = service
        .activate_account(&input.email, &input.password)
        .await?;
    Ok(Json(user.into()))
}
