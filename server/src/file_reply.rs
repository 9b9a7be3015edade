use axum::{
    body::Body,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Streams a stored blob back to the client.
pub struct FileReply {
    file: File,
    size: u64,
    filename: String,
}

impl FileReply {
    #[must_use]
    pub fn new(file: File, size: u64, filename: String) -> Self {
        Self {
            file,
            size,
            filename,
        }
    }

    fn content_type(&self) -> HeaderValue {
        let mime = mime_guess::from_path(&self.filename).first_or_octet_stream();
        HeaderValue::from_str(mime.essence_str())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
    }
}

impl IntoResponse for FileReply {
    fn into_response(self) -> Response {
        let content_type = self.content_type();
        let disposition = format!(r#"inline; filename="{}""#, self.filename);
        let len = self.size.to_string();

        let mut res = Body::from_stream(ReaderStream::new(self.file)).into_response();
        res.headers_mut().insert(header::CONTENT_TYPE, content_type);
        if let Ok(val) = HeaderValue::from_str(&disposition) {
            res.headers_mut().insert(header::CONTENT_DISPOSITION, val);
        }
        if let Ok(val) = HeaderValue::from_str(&len) {
            res.headers_mut().insert(header::CONTENT_LENGTH, val);
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1700000000000.png", "image/png")]
    #[case("1700000000000.txt", "text/plain")]
    #[case("1700000000000.json", "application/json")]
    #[case("1700000000000", "application/octet-stream")]
    #[case("1700000000000.zzzz", "application/octet-stream")]
    #[trace]
    #[tokio::test]
    async fn content_type_from_extension(#[case] filename: &str, #[case] expected: &str) {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(filename);
        std::fs::write(&path, b"abc").unwrap();
        let file = File::open(&path).await.unwrap();
        let reply = FileReply::new(file, 3, filename.to_owned());

        // Act
        let response = reply.into_response();

        // Assert
        assert_eq!(response.headers()[header::CONTENT_TYPE], expected);
        assert_eq!(response.headers()[header::CONTENT_LENGTH], "3");
    }
}
