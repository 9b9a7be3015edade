#![allow(clippy::unused_async)]
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use kernel::{Credentials, Reply, Status, UploadRecord, Uploaded};
use utoipa::ToSchema;

use crate::error::{Error, Result};
use crate::file_reply::FileReply;
use crate::service::Payload;
use crate::Host;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "filebox.sid";

const FILE_FIELD: &str = "file";

/// Multipart form accepted by the upload endpoint.
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    /// File content, the part's file name provides the extension
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

/// Credentials read from either a JSON or an urlencoded form body.
///
/// Malformed bodies are reported as [`Error::InvalidInput`] so the reply keeps
/// the `{success, message}` shape.
pub struct CredentialsBody(pub Credentials);

#[async_trait]
impl<S> FromRequest<S> for CredentialsBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let urlencoded = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/x-www-form-urlencoded"));

        let credentials = if urlencoded {
            let Form(credentials) = Form::<Credentials>::from_request(req, state)
                .await
                .map_err(|e| Error::InvalidInput(e.body_text()))?;
            credentials
        } else {
            let Json(credentials) = Json::<Credentials>::from_request(req, state)
                .await
                .map_err(|e| Error::InvalidInput(e.body_text()))?;
            credentials
        };
        Ok(Self(credentials))
    }
}

/// Reports whether the presented session belongs to a user.
#[utoipa::path(
    get,
    path = "/status",
    tag = "auth",
    responses(
        (status = 200, description = "Session state", body = Status),
    ),
)]
pub async fn status(State(host): State<Arc<Host>>, jar: CookieJar) -> Json<Status> {
    Json(host.status(session_token(&jar)).await)
}

/// Registers a new user.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "auth",
    request_body(content(
        (Credentials = "application/json"),
        (Credentials = "application/x-www-form-urlencoded")
    )),
    responses(
        (status = 200, description = "User registered", body = Reply),
        (status = 400, description = "Malformed body, missing field or username taken", body = Reply)
    ),
)]
pub async fn signup(
    State(host): State<Arc<Host>>,
    CredentialsBody(credentials): CredentialsBody,
) -> Result<Json<Reply>> {
    host.signup(credentials).await?;
    Ok(Json(Reply::ok("Sign-up successful! Please log in.")))
}

/// Opens a session and hands its token back in a cookie.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body(content(
        (Credentials = "application/json"),
        (Credentials = "application/x-www-form-urlencoded")
    )),
    responses(
        (status = 200, description = "Logged in, session cookie set", body = Reply),
        (status = 400, description = "Malformed body", body = Reply),
        (status = 401, description = "Invalid credentials", body = Reply)
    ),
)]
pub async fn login(
    State(host): State<Arc<Host>>,
    jar: CookieJar,
    CredentialsBody(credentials): CredentialsBody,
) -> Result<(CookieJar, Json<Reply>)> {
    let token = host.login(&credentials).await?;
    host.logout(session_token(&jar)).await;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true);
    Ok((jar.add(cookie), Json(Reply::ok("Login successful!"))))
}

/// Closes the current session. Always succeeds.
#[utoipa::path(
    post,
    path = "/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logged out", body = Reply),
    ),
)]
pub async fn logout(State(host): State<Arc<Host>>, jar: CookieJar) -> (CookieJar, Json<Reply>) {
    host.logout(session_token(&jar)).await;
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(Reply::ok("Logged out successfully.")))
}

/// Stores the uploaded file and records it for the logged in user.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = Uploaded),
        (status = 400, description = "No file uploaded", body = Reply),
        (status = 401, description = "Not logged in", body = Reply),
        (status = 413, description = "Upload exceeds the size limit", body = Reply),
        (status = 500, description = "Server error", body = Reply)
    ),
)]
pub async fn upload(
    State(host): State<Arc<Host>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<Json<Uploaded>> {
    let token = session_token(&jar);
    host.authorize(token).await?;

    let mut payload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // a plain text part named `file` is not a file
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let data = field.bytes().await?;
        payload = Some(Payload {
            original_name,
            data: data.to_vec(),
        });
        break;
    }

    let record = host.upload(token, payload).await?;
    Ok(Json(Uploaded {
        success: true,
        record,
    }))
}

/// Lists every stored file in upload order.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "All upload records", body = [UploadRecord]),
        (status = 401, description = "Not logged in", body = Reply)
    ),
)]
pub async fn files(
    State(host): State<Arc<Host>>,
    jar: CookieJar,
) -> Result<Json<Vec<UploadRecord>>> {
    Ok(Json(host.list(session_token(&jar)).await?))
}

/// Deletes a stored file and its record.
#[utoipa::path(
    delete,
    path = "/delete/{filename}",
    tag = "files",
    responses(
        (status = 200, description = "File deleted", body = Reply),
        (status = 401, description = "Not logged in", body = Reply),
        (status = 404, description = "File not found", body = Reply)
    ),
    params(
        ("filename" = String, Path, description = "Generated file name")
    ),
)]
pub async fn delete_file(
    State(host): State<Arc<Host>>,
    jar: CookieJar,
    Path(filename): Path<String>,
) -> Result<Json<Reply>> {
    host.delete(session_token(&jar), &filename).await?;
    Ok(Json(Reply::ok("File deleted successfully.")))
}

/// Streams a stored file. Public: no session needed.
#[utoipa::path(
    get,
    path = "/uploads/{filename}",
    tag = "files",
    responses(
        (status = 200, description = "File content", body = String, content_type = "application/octet-stream"),
        (status = 404, description = "File not found", body = Reply)
    ),
    params(
        ("filename" = String, Path, description = "Generated file name")
    ),
)]
pub async fn download(
    State(host): State<Arc<Host>>,
    Path(filename): Path<String>,
) -> Result<FileReply> {
    let (file, size) = host.read(&filename).await?;
    tracing::debug!("serving {filename} size {size}");
    Ok(FileReply::new(file, size, filename))
}

fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(Cookie::value)
}
