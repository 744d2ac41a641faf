use url::Url;

/// Prefixes `https://` to a seed that carries no scheme
///
/// Only `http://` and `https://` count as an existing scheme; anything else is
/// treated as a bare host (and path) and gets the default scheme.
///
/// # Examples
///
/// ```
/// use product_scout::url::ensure_scheme;
///
/// assert_eq!(ensure_scheme("example-shop.com"), "https://example-shop.com");
/// assert_eq!(ensure_scheme("http://example-shop.com/"), "http://example-shop.com/");
/// ```
pub fn ensure_scheme(seed: &str) -> String {
    let seed = seed.trim();
    if seed.starts_with("http://") || seed.starts_with("https://") {
        seed.to_string()
    } else {
        format!("https://{}", seed)
    }
}

/// Builds the visited-set key for a URL
///
/// The key is scheme + host (+ explicit port) + path with trailing slashes removed.
/// Query strings and fragments are ignored, so `/shop/?page=2` and `/shop` share a key.
///
/// # Examples
///
/// ```
/// use product_scout::url::visit_key;
/// use url::Url;
///
/// let url = Url::parse("https://Example.com/shoes/?sort=price#top").unwrap();
/// assert_eq!(visit_key(&url), "https://example.com/shoes");
/// ```
pub fn visit_key(url: &Url) -> String {
    let mut key = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());

    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }

    key.push_str(url.path().trim_end_matches('/'));
    key
}
