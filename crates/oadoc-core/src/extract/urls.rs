use url::Url;

/// Origin used to resolve every base path; stripped again after joining.
const PLACEHOLDER_ORIGIN: &str = "http://placeholder.invalid";

/// Resolve `path` against `base` per RFC 3986.
///
/// An absolute-path `path` replaces the base's path and drops its query and
/// fragment. Without a base the path is returned unchanged. The base's
/// `scheme://authority` is kept as written, so server templates such as
/// `https://example.com:{port}/v1` still join. Template braces
/// (`/pets/{petId}`) stay literal; any other character the URL path grammar
/// disallows, such as a space, comes back percent-encoded.
pub fn join_url(base: Option<&str>, path: &str) -> String {
    let Some(base) = base.filter(|b| !b.is_empty()) else {
        return path.to_string();
    };

    let (origin, base_path) = split_origin(base);
    let braces = BraceMarkers::avoiding(&[base_path, path]);

    match resolve_path(&braces.protect(base_path), &braces.protect(path)) {
        Some(Resolved::Path(resolved)) => {
            let resolved = braces.restore(&resolved);
            if origin.is_empty() && !base_path.starts_with('/') {
                resolved.trim_start_matches('/').to_string()
            } else {
                format!("{origin}{resolved}")
            }
        }
        Some(Resolved::Absolute(url)) => braces.restore(&url),
        None => path.to_string(),
    }
}

enum Resolved {
    /// Path, query and fragment below the base origin.
    Path(String),
    /// `path` carried its own origin.
    Absolute(String),
}

fn resolve_path(base_path: &str, path: &str) -> Option<Resolved> {
    let origin = Url::parse(PLACEHOLDER_ORIGIN).ok()?;
    let joined = origin.join(base_path).ok()?.join(path).ok()?;
    let serialized = joined.to_string();
    if joined.host_str() == origin.host_str() && joined.scheme() == origin.scheme() {
        serialized
            .strip_prefix(PLACEHOLDER_ORIGIN)
            .map(|rest| Resolved::Path(rest.to_string()))
    } else {
        Some(Resolved::Absolute(serialized))
    }
}

/// Split `scheme://authority` off the front of `base`. Bases without a
/// scheme have an empty origin.
fn split_origin(base: &str) -> (&str, &str) {
    let Some(scheme_end) = base.find("://") else {
        return ("", base);
    };
    let scheme = &base[..scheme_end];
    if scheme.is_empty() || scheme.contains(['/', '?', '#']) {
        return ("", base);
    }
    let authority_start = scheme_end + "://".len();
    let authority_end = base[authority_start..]
        .find(['/', '?', '#'])
        .map_or(base.len(), |offset| authority_start + offset);
    base.split_at(authority_end)
}

/// Stand-ins for template braces that survive URL serialization untouched,
/// chosen so they occur in none of the inputs.
struct BraceMarkers {
    open: String,
    close: String,
}

impl BraceMarkers {
    fn avoiding(inputs: &[&str]) -> Self {
        let mut n = 0usize;
        loop {
            let markers = Self {
                open: format!("~{n}o~"),
                close: format!("~{n}c~"),
            };
            let clashes = inputs
                .iter()
                .any(|input| input.contains(&markers.open) || input.contains(&markers.close));
            if !clashes {
                return markers;
            }
            n += 1;
        }
    }

    fn protect(&self, text: &str) -> String {
        text.replace('{', &self.open).replace('}', &self.close)
    }

    fn restore(&self, text: &str) -> String {
        text.replace(&self.open, "{").replace(&self.close, "}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_replaces_base_path() {
        assert_eq!(
            join_url(Some("https://api.example.com/v1"), "/pets"),
            "https://api.example.com/pets"
        );
    }

    #[test]
    fn test_trailing_slash_base_with_root_path() {
        assert_eq!(join_url(Some("https://c/"), "/pets"), "https://c/pets");
    }

    #[test]
    fn test_relative_path_appends() {
        assert_eq!(
            join_url(Some("https://api.example.com/v1/"), "pets"),
            "https://api.example.com/v1/pets"
        );
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        assert_eq!(
            join_url(Some("https://a.test/base?key=1#frag"), "/pets"),
            "https://a.test/pets"
        );
    }

    #[test]
    fn test_template_braces_survive() {
        assert_eq!(
            join_url(Some("https://a.test/"), "/pets/{petId}"),
            "https://a.test/pets/{petId}"
        );
    }

    #[test]
    fn test_no_base() {
        assert_eq!(join_url(None, "/pets/{petId}"), "/pets/{petId}");
        assert_eq!(join_url(Some(""), "/pets"), "/pets");
    }

    #[test]
    fn test_relative_bases() {
        assert_eq!(join_url(Some("/api/v1/"), "pets"), "/api/v1/pets");
        assert_eq!(join_url(Some("/api/v1/"), "/pets"), "/pets");
        assert_eq!(join_url(Some("api/v1/"), "pets"), "api/v1/pets");
    }

    #[test]
    fn test_templated_port_keeps_base() {
        assert_eq!(
            join_url(Some("https://example.com:{port}/v1"), "/pets"),
            "https://example.com:{port}/pets"
        );
        assert_eq!(
            join_url(Some("https://example.com:{port}/v1/"), "pets/{petId}"),
            "https://example.com:{port}/v1/pets/{petId}"
        );
    }

    #[test]
    fn test_templated_scheme_and_host_keep_base() {
        assert_eq!(
            join_url(Some("{scheme}://example.com/v1"), "/pets"),
            "{scheme}://example.com/pets"
        );
        assert_eq!(
            join_url(Some("https://{region}.example.com/v1"), "/pets"),
            "https://{region}.example.com/pets"
        );
        assert_eq!(join_url(Some("https://example.com"), "/pets"), "https://example.com/pets");
    }

    #[test]
    fn test_templated_base_path() {
        assert_eq!(
            join_url(Some("https://a.test/{basePath}/"), "pets"),
            "https://a.test/{basePath}/pets"
        );
    }

    #[test]
    fn test_encoded_braces_stay_encoded() {
        assert_eq!(join_url(Some("https://a/"), "/a%7Bb"), "https://a/a%7Bb");
        assert_eq!(
            join_url(Some("https://a/"), "/a%7Bb/{id}%7D"),
            "https://a/a%7Bb/{id}%7D"
        );
    }

    #[test]
    fn test_disallowed_path_characters_are_encoded() {
        assert_eq!(join_url(Some("https://a/"), "/my pets"), "https://a/my%20pets");
        assert_eq!(join_url(Some("https://a/"), "/caf\u{e9}"), "https://a/caf%C3%A9");
    }

    #[test]
    fn test_marker_lookalikes_in_input() {
        assert_eq!(
            join_url(Some("https://a/"), "/~0o~/{id}"),
            "https://a/~0o~/{id}"
        );
    }

    #[test]
    fn test_absolute_path_reference() {
        assert_eq!(
            join_url(Some("https://a/v1/"), "https://other.test/pets/{id}"),
            "https://other.test/pets/{id}"
        );
    }
}
