use crate::UrlError;
use url::Url;

/// Parses a crawl entry point such as the seed URL
///
/// The URL must be absolute, use HTTP or HTTPS and carry a host. The result is
/// already canonical.
///
/// # Examples
///
/// ```
/// use site_atlas::url::parse_seed;
///
/// let url = parse_seed("https://Site.TEST/#top").unwrap();
/// assert_eq!(url.as_str(), "https://site.test/");
/// ```
pub fn parse_seed(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(canonicalize(url))
}

/// Resolves a reference found in a document against the page it appeared on
///
/// Returns `UrlError::Parse` for references that cannot be resolved, which
/// callers treat as a skipped reference rather than a failure.
pub fn resolve_reference(base: &Url, reference: &str) -> Result<Url, UrlError> {
    base.join(reference.trim())
        .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))
}

/// Turns an absolute URL into the form used as a dedup key
///
/// The `url` crate already lowercases the host, removes dot segments and
/// drops default ports. The only extra step is removing the fragment, since
/// `/page#a` and `/page#b` fetch the same document.
pub fn canonicalize(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}
