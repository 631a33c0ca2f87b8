//! OpenAPI document and Swagger UI.

use axum::Router;
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use super::dto::{
    FileDetailResponse, FileEditRequest, FileResponse, FolderDetailResponse, FolderRequest,
    FolderResponse, LoginRequest, LoginResponse, MessageResponse, SharedFileResponse,
    SignupRequest, UserInfo, VisibilityResponse,
};
use super::handlers;

/// API documentation.
#[derive(OpenApi)]
#[openapi(
    info(title = "fileshare API", description = "Image sharing with folders and public links"),
    paths(
        handlers::auth::signup,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::visibility::list_visibilities,
        handlers::folder::list_folders,
        handlers::folder::create_folder,
        handlers::folder::get_folder,
        handlers::folder::update_folder,
        handlers::folder::delete_folder,
        handlers::file::upload_file,
        handlers::file::get_file,
        handlers::file::update_file,
        handlers::file::delete_file,
        handlers::share::shared_folder,
        handlers::share::shared_file,
    ),
    components(schemas(
        SignupRequest,
        LoginRequest,
        FolderRequest,
        FileEditRequest,
        handlers::file::FileUploadForm,
        UserInfo,
        LoginResponse,
        MessageResponse,
        VisibilityResponse,
        FolderResponse,
        FileResponse,
        FolderDetailResponse,
        FileDetailResponse,
        SharedFileResponse,
    )),
    modifiers(&SessionAuth),
    tags(
        (name = "auth", description = "Accounts and sessions"),
        (name = "visibilities", description = "Visibility options"),
        (name = "folders", description = "Folder management"),
        (name = "files", description = "Image management"),
        (name = "share", description = "Public links")
    )
)]
pub struct ApiDoc;

/// Session auth: bearer token or the `session` cookie.
struct SessionAuth;

impl Modify for SessionAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
            components.add_security_scheme(
                "session_cookie",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(
                    crate::auth::SESSION_COOKIE,
                ))),
            );
        }
    }
}

/// Swagger UI at `/swagger-ui`, document at `/api-docs/openapi.json`.
pub fn create_swagger_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
