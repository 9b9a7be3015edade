use core::fmt;

use url::Url;

const SEP: char = '/';

/// Base URI of a filebox server plus the path being built on top of it.
#[derive(Clone)]
pub struct Resource {
    url: Url,
}

impl Resource {
    #[must_use]
    pub fn new(uri: &str) -> Option<Resource> {
        let url = Url::parse(uri).ok()?;
        if url.cannot_be_a_base() {
            return None;
        }
        Some(Resource { url })
    }

    /// Appends slash separated segments, keeping a trailing slash when the
    /// appended path has one. Empty segments are dropped.
    pub fn append_path(&mut self, path: &str) -> &mut Self {
        let segments: Vec<String> = self
            .url
            .path_segments()
            .into_iter()
            .flatten()
            .chain(path.split(SEP))
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();

        let mut joined = segments.join("/");
        if path.ends_with(SEP) {
            joined.push(SEP);
        }
        self.url.set_path(&joined);
        self
    }

    /// Appends a single segment, percent-encoding anything that would
    /// otherwise be read as a separator.
    pub fn append_segment(&mut self, segment: &str) -> &mut Self {
        let encoded = urlencoding::encode(segment);
        self.append_path(&encoded)
    }

    /// Resource for `path` relative to this one, leaving `self` untouched.
    #[must_use]
    pub fn join(&self, path: &str) -> Resource {
        let mut r = self.clone();
        r.append_path(path);
        r
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn new_correct_some() {
        // Arrange

        // Act
        let r = Resource::new("http://localhost:3000");

        // Assert
        assert!(r.is_some());
    }

    #[rstest]
    #[case("http/localhost")]
    #[case("mailto:alice@example.com")]
    #[trace]
    fn new_incorrect_none(#[case] uri: &str) {
        // Arrange

        // Act
        let r = Resource::new(uri);

        // Assert
        assert!(r.is_none());
    }

    #[rstest]
    #[case("http://localhost", "files", "http://localhost/files")]
    #[case("http://localhost", "/files", "http://localhost/files")]
    #[case("http://localhost", "/files/", "http://localhost/files/")]
    #[case("http://localhost/", "delete/1.png", "http://localhost/delete/1.png")]
    #[case("http://localhost/", "/delete/1.png", "http://localhost/delete/1.png")]
    #[case("http://localhost/app", "status", "http://localhost/app/status")]
    #[case("http://localhost/app/", "/status", "http://localhost/app/status")]
    #[case("http://localhost:3000", "uploads/1.txt", "http://localhost:3000/uploads/1.txt")]
    #[trace]
    fn append_path_tests(#[case] base: &str, #[case] path: &str, #[case] expected: &str) {
        // Arrange
        let mut r = Resource::new(base).unwrap();

        // Act
        r.append_path(path);

        // Assert
        assert_eq!(r.to_string().as_str(), expected);
    }

    #[test]
    fn append_path_twice() {
        // Arrange
        let mut r = Resource::new("http://localhost").unwrap();

        // Act
        r.append_path("delete").append_path("1.png");

        // Assert
        assert_eq!(r.to_string().as_str(), "http://localhost/delete/1.png");
    }

    #[rstest]
    #[case("1.png", "http://localhost/delete/1.png")]
    #[case("a b.png", "http://localhost/delete/a%20b.png")]
    #[case("../users.json", "http://localhost/delete/..%2Fusers.json")]
    #[trace]
    fn append_segment_encodes(#[case] segment: &str, #[case] expected: &str) {
        // Arrange
        let mut r = Resource::new("http://localhost").unwrap();

        // Act
        r.append_path("delete").append_segment(segment);

        // Assert
        assert_eq!(r.to_string().as_str(), expected);
    }

    #[test]
    fn join_leaves_base_untouched() {
        // Arrange
        let base = Resource::new("http://localhost").unwrap();

        // Act
        let files = base.join("files");

        // Assert
        assert_eq!(files.to_string(), "http://localhost/files");
        assert_eq!(base.to_string(), "http://localhost/");
    }
}
