use url::Url;

/// Extracts the crawl boundary domain from a URL
///
/// This is the lowercase host, followed by `:port` when the URL carries an explicit
/// non-default port. Two URLs belong to the same crawl only if these strings are equal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use product_scout::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(extract_domain(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Returns true if `link` lies inside the crawl boundary `base_domain`
///
/// Subdomains are different domains: `blog.example.com` is outside `example.com`.
pub fn is_same_domain(link: &Url, base_domain: &str) -> bool {
    extract_domain(link).is_some_and(|domain| domain == base_domain)
}
