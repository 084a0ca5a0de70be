use url::Url;

/// Returns the host key of a URL as used by the resource registry
///
/// The key is the lowercase host, followed by `:port` when the URL carries an
/// explicit non-default port. URLs without a host (`mailto:`, `data:`) yield
/// `None`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use site_atlas::url::host_key;
///
/// let url = Url::parse("https://CDN.example.com/app.css").unwrap();
/// assert_eq!(host_key(&url), Some("cdn.example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(host_key(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Same-domain policy: scheme and host (including port) must match exactly
///
/// Subdomains are distinct hosts, so `blog.site.test` is not the same site as
/// `site.test`.
pub fn same_site(candidate: &Url, page: &Url) -> bool {
    candidate.scheme() == page.scheme()
        && candidate.port_or_known_default() == page.port_or_known_default()
        && match (host_key(candidate), host_key(page)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
}

/// Returns the host of an asset when it lives outside the page's host
pub fn asset_host(asset: &Url, page: &Url) -> Option<String> {
    let host = host_key(asset)?;
    if host_key(page).as_deref() == Some(host.as_str()) {
        return None;
    }
    Some(host)
}
