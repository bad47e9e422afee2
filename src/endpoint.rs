// src/endpoint.rs
use url::Url;

/// Append `segments` below the base URL's own path, so a dashboard mounted at
/// `https://host/dash/` keeps its `/dash` prefix. Segments are
/// percent-encoded. `None` when the base cannot carry a path.
pub fn under_base<I, S>(base: &Url, segments: I) -> Option<Url>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut url = base.clone();
    url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
    Some(url)
}

/// Like [`under_base`] for a slash-separated path such as
/// `/api/refresh-csrf`; a leading slash does not escape the base path.
pub fn path_under_base(base: &Url, path: &str) -> Option<Url> {
    under_base(base, path.split('/').filter(|s| !s.is_empty()))
}
