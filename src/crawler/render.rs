//! Headless-browser tiers
//!
//! Both tiers share one Chromium process, launched on first use. A launch
//! failure is remembered so that every later call fails fast instead of trying
//! to start the browser again for each URL.

use crate::config::RenderConfig;
use crate::crawler::parser::{extract_links, resolve_link};
use crate::crawler::tiers::{LinkTier, TierOutcome};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use url::Url;

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";
const HEIGHT_SCRIPT: &str = "document.body.scrollHeight";
const LINKS_SCRIPT: &str =
    "JSON.stringify(Array.from(document.querySelectorAll('a[href]')).map(a => a.href))";

const ROOT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Path segments that never lead to product pages
const EXCLUDED_SEGMENTS: &[&str] = &[
    "cart",
    "checkout",
    "login",
    "register",
    "account",
    "wishlist",
    "help",
    "contact",
    "faq",
    "privacy",
    "terms",
    "returns",
    "track-order",
    "store-locator",
];

/// File extensions of resources that are not HTML pages
const NON_HTML_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "svg", "ico", "bmp", "avif", "mp4", "webm", "mp3",
    "wav", "ogg", "zip", "rar", "gz", "tar", "7z", "pdf", "doc", "docx", "xls", "xlsx", "ppt",
    "pptx", "csv", "js", "mjs", "css", "woff", "woff2", "ttf", "otf", "eot", "json", "xml",
];

/// Lazily launched Chromium shared by the rendering tiers
#[derive(Clone, Default)]
pub struct BrowserHandle {
    cell: Arc<OnceCell<Option<Arc<Browser>>>>,
}

impl BrowserHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared browser, launching it on the first call
    ///
    /// `None` means Chromium could not be started; the failure was logged once.
    pub async fn get(&self) -> Option<Arc<Browser>> {
        self.cell
            .get_or_init(|| async {
                match launch_browser().await {
                    Ok(browser) => Some(Arc::new(browser)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Headless browser unavailable, rendering tiers disabled");
                        None
                    }
                }
            })
            .await
            .clone()
    }
}

async fn launch_browser() -> Result<Browser, String> {
    let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();

    if let Some(bin) = find_chrome_binary() {
        tracing::info!("Using Chrome binary: {}", bin.display());
        builder = builder.chrome_executable(bin);
    }

    let config = builder
        .arg("--headless=new")
        .arg("--disable-gpu")
        .arg("--disable-dev-shm-usage")
        .arg("--disable-extensions")
        .arg("--no-first-run")
        .build()
        .map_err(|e| format!("Browser config error: {e}"))?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|e| format!("Failed to launch browser: {e}"))?;

    // The CDP handler has to be polled for the connection to make progress
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::warn!(error = %e, "Browser CDP handler error");
                break;
            }
        }
    });

    tracing::info!("Headless browser launched");
    Ok(browser)
}

/// `CHROME_BIN` wins; otherwise the first well-known install path that exists
fn find_chrome_binary() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
    }

    [
        "/usr/bin/google-chrome-stable",
        "/usr/bin/google-chrome",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}

/// Opens `url` in a new tab, runs `work` against it and always closes the tab
///
/// `timeout` bounds navigation and `work` together. The tab is closed on the
/// timeout branch too.
async fn with_page<T, F, Fut>(
    handle: &BrowserHandle,
    url: &Url,
    timeout: Duration,
    work: F,
) -> Result<T, String>
where
    F: FnOnce(Page) -> Fut,
    Fut: std::future::Future<Output = Result<T, String>>,
{
    let deadline = Instant::now() + timeout;
    let timed_out = || format!("page timeout after {}s", timeout.as_secs());

    let browser = handle
        .get()
        .await
        .ok_or_else(|| "browser unavailable".to_string())?;

    let page = tokio::time::timeout_at(deadline, browser.new_page(url.as_str()))
        .await
        .map_err(|_| timed_out())?
        .map_err(|e| format!("navigation failed: {e}"))?;

    let work = work(page.clone());
    let close = async move {
        if let Err(e) = page.close().await {
            tracing::debug!(url = %url, error = %e, "Failed to close tab");
        }
    };

    run_then_close(deadline, work, close)
        .await
        .unwrap_or_else(|| Err(timed_out()))
}

/// Runs `work` until `deadline`, then `close` whether or not `work` finished
///
/// Returns `None` when the deadline cut `work` short.
async fn run_then_close<T, W, C>(deadline: Instant, work: W, close: C) -> Option<T>
where
    W: std::future::Future<Output = T>,
    C: std::future::Future<Output = ()>,
{
    let result = tokio::time::timeout_at(deadline, work).await.ok();
    close.await;
    result
}

/// Second tier: rendered DOM of a headless tab
pub struct SessionTier {
    handle: BrowserHandle,
    page_timeout: Duration,
}

impl SessionTier {
    pub fn new(handle: BrowserHandle, config: &RenderConfig) -> Self {
        Self {
            handle,
            page_timeout: Duration::from_secs(config.page_timeout_secs),
        }
    }

    async fn render(&self, url: &Url) -> Result<BTreeSet<String>, String> {
        with_page(&self.handle, url, self.page_timeout, |page| async move {
            page.find_element("body")
                .await
                .map_err(|e| format!("page did not render body: {e}"))?;
            let html = page
                .content()
                .await
                .map_err(|e| format!("failed to read page content: {e}"))?;
            Ok(extract_links(&html, url))
        })
        .await
    }
}

#[async_trait]
impl LinkTier for SessionTier {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn discover(&self, url: &Url) -> TierOutcome {
        match self.render(url).await {
            Ok(links) => TierOutcome::from_links(links),
            Err(reason) => TierOutcome::Failed(reason),
        }
    }
}

/// Third tier: full render with root wait, lazy-load scrolling and link filtering
pub struct BrowserTier {
    handle: BrowserHandle,
    page_timeout: Duration,
    root_wait: Duration,
    root_selector: String,
    scroll: bool,
    max_scroll_attempts: u32,
    stable_height_checks: u32,
    scroll_pause: Duration,
}

impl BrowserTier {
    pub fn new(handle: BrowserHandle, config: &RenderConfig) -> Self {
        Self {
            handle,
            page_timeout: Duration::from_secs(config.page_timeout_secs),
            root_wait: Duration::from_secs(config.root_wait_secs),
            root_selector: config.root_selector.clone(),
            scroll: config.scroll,
            max_scroll_attempts: config.max_scroll_attempts,
            stable_height_checks: config.stable_height_checks,
            scroll_pause: Duration::from_millis(config.scroll_pause_ms),
        }
    }

    async fn render(&self, url: &Url) -> Result<BTreeSet<String>, String> {
        with_page(&self.handle, url, self.page_timeout, |page| async move {
            if !wait_for_root(&page, &self.root_selector, self.root_wait).await {
                tracing::debug!(url = %url, selector = %self.root_selector, "Root selector not found, continuing");
            }
            if self.scroll {
                self.scroll_to_bottom(&page).await;
            }
            let hrefs = collect_hrefs(&page).await?;
            Ok(retain_crawlable(
                hrefs.iter().filter_map(|href| resolve_link(href, url)),
            ))
        })
        .await
    }

    async fn scroll_to_bottom(&self, page: &Page) {
        let mut tracker = ScrollTracker::new(self.max_scroll_attempts, self.stable_height_checks);

        loop {
            let height = match page_height(page).await {
                Some(h) => h,
                None => break,
            };
            if !tracker.should_scroll(height) {
                break;
            }
            if let Err(e) = page.evaluate(SCROLL_SCRIPT).await {
                tracing::debug!(error = %e, "Scroll script failed");
                break;
            }
            tokio::time::sleep(self.scroll_pause).await;
        }
    }
}

#[async_trait]
impl LinkTier for BrowserTier {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn discover(&self, url: &Url) -> TierOutcome {
        match self.render(url).await {
            Ok(links) => TierOutcome::from_links(links),
            Err(reason) => TierOutcome::Failed(reason),
        }
    }
}

/// Polls for `selector` until it appears or `wait` elapses
async fn wait_for_root(page: &Page, selector: &str, wait: Duration) -> bool {
    let deadline = Instant::now() + wait;
    loop {
        if page.find_element(selector).await.is_ok() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(ROOT_POLL_INTERVAL).await;
    }
}

async fn page_height(page: &Page) -> Option<u64> {
    let result = page.evaluate(HEIGHT_SCRIPT).await.ok()?;
    result.into_value::<f64>().ok().map(|h| h as u64)
}

async fn collect_hrefs(page: &Page) -> Result<Vec<String>, String> {
    let json = page
        .evaluate(LINKS_SCRIPT)
        .await
        .map_err(|e| format!("link script failed: {e}"))?
        .into_value::<String>()
        .map_err(|e| format!("link script returned no string: {e}"))?;

    serde_json::from_str(&json).map_err(|e| format!("link script returned invalid JSON: {e}"))
}

/// Stop condition for the lazy-load scroll loop
#[derive(Debug)]
pub(crate) struct ScrollTracker {
    max_attempts: u32,
    stable_target: u32,
    attempts: u32,
    stable: u32,
    last_height: Option<u64>,
}

impl ScrollTracker {
    pub(crate) fn new(max_attempts: u32, stable_target: u32) -> Self {
        Self {
            max_attempts,
            stable_target: stable_target.max(1),
            attempts: 0,
            stable: 0,
            last_height: None,
        }
    }

    /// Records the current page height and says whether to scroll again
    ///
    /// Stops after `stable_target` consecutive unchanged heights or once
    /// `max_attempts` scrolls have been made.
    pub(crate) fn should_scroll(&mut self, height: u64) -> bool {
        if self.last_height == Some(height) {
            self.stable += 1;
        } else {
            self.stable = 0;
            self.last_height = Some(height);
        }

        if self.stable >= self.stable_target || self.attempts >= self.max_attempts {
            return false;
        }

        self.attempts += 1;
        true
    }
}

/// Drops links to account pages, policies and non-HTML resources
pub(crate) fn retain_crawlable<I>(links: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
{
    links
        .into_iter()
        .filter(|link| Url::parse(link).map(|u| is_crawlable(&u)).unwrap_or(false))
        .collect()
}

fn is_crawlable(url: &Url) -> bool {
    if url.scheme() != "http" && url.scheme() != "https" {
        return false;
    }

    let segments: Vec<String> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).map(str::to_lowercase).collect())
        .unwrap_or_default();

    if segments
        .iter()
        .any(|seg| EXCLUDED_SEGMENTS.contains(&seg.as_str()))
    {
        return false;
    }

    match segments.last().and_then(|last| last.rsplit_once('.')) {
        Some((_, ext)) => !NON_HTML_EXTENSIONS.contains(&ext),
        None => true,
    }
}
