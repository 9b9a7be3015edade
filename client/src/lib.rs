use std::path::Path;

use comfy_table::{presets::UTF8_HORIZONTAL_ONLY, Attribute, Cell, ContentArrangement, Table};
use kernel::{Credentials, Reply, Status, UploadRecord, Uploaded};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use resource::Resource;
use thiserror::Error;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

pub mod resource;

/// Client side failures.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid server URI: {0}")]
    InvalidUri(String),

    /// The local file to upload cannot be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with an error reply.
    #[error("{0}: {1}")]
    Rejected(reqwest::StatusCode, String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Registers a new account.
pub async fn signup(uri: &str, username: &str, password: &str) -> Result<Reply> {
    let base = base(uri)?;
    let response = Client::new()
        .post(base.join("signup").to_string())
        .json(&Credentials::new(username, password))
        .send()
        .await?;
    read_json(response).await
}

/// Logged in connection to a filebox server.
///
/// The session cookie issued at login is kept in the client's cookie store
/// and sent with every following request.
pub struct Session {
    base: Resource,
    client: Client,
}

impl Session {
    pub async fn login(uri: &str, username: &str, password: &str) -> Result<Self> {
        let base = base(uri)?;
        let client = Client::builder().cookie_store(true).build()?;
        let response = client
            .post(base.join("login").to_string())
            .json(&Credentials::new(username, password))
            .send()
            .await?;
        let _: Reply = read_json(response).await?;
        Ok(Self { base, client })
    }

    pub async fn status(&self) -> Result<Status> {
        let response = self
            .client
            .get(self.base.join("status").to_string())
            .send()
            .await?;
        read_json(response).await
    }

    /// Streams a local file to the server.
    pub async fn upload(&self, file: &Path) -> Result<UploadRecord> {
        let file_name = file
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_owned();
        let f = File::open(file).await?;
        let len = f.metadata().await?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(f));
        let part = Part::stream_with_length(body, len).file_name(file_name);

        let response = self
            .client
            .post(self.base.join("upload").to_string())
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        let uploaded: Uploaded = read_json(response).await?;
        Ok(uploaded.record)
    }

    pub async fn files(&self) -> Result<Vec<UploadRecord>> {
        let response = self
            .client
            .get(self.base.join("files").to_string())
            .send()
            .await?;
        read_json(response).await
    }

    pub async fn delete(&self, filename: &str) -> Result<Reply> {
        let mut resource = self.base.join("delete");
        resource.append_segment(filename);
        let response = self.client.delete(resource.to_string()).send().await?;
        read_json(response).await
    }

    pub async fn logout(self) -> Result<Reply> {
        let response = self
            .client
            .post(self.base.join("logout").to_string())
            .send()
            .await?;
        read_json(response).await
    }

    /// Absolute URL a stored file can be downloaded from.
    #[must_use]
    pub fn public_url(&self, record: &UploadRecord) -> String {
        self.base.join(&record.path).to_string()
    }
}

/// Renders upload records as a table.
#[must_use]
pub fn files_table(records: &[UploadRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_HORIZONTAL_ONLY)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120)
        .set_header(vec![
            Cell::new("File").add_attribute(Attribute::Bold),
            Cell::new("Path").add_attribute(Attribute::Bold),
            Cell::new("Uploaded at").add_attribute(Attribute::Bold),
            Cell::new("Uploaded by").add_attribute(Attribute::Bold),
        ]);

    for r in records {
        table.add_row(vec![
            Cell::new(&r.filename),
            Cell::new(&r.path),
            Cell::new(r.uploaded_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&r.uploaded_by),
        ]);
    }
    table
}

fn base(uri: &str) -> Result<Resource> {
    Resource::new(uri).ok_or_else(|| Error::InvalidUri(uri.to_owned()))
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }
    let message = match response.json::<Reply>().await {
        Ok(reply) => reply.message,
        Err(_) => status.canonical_reason().unwrap_or_default().to_owned(),
    };
    Err(Error::Rejected(status, message))
}
