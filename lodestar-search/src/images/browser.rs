//! Shared headless Chromium instance for rendering script-heavy pages.
//!
//! One browser process is launched lazily on first use and shared by all
//! callers. Each render takes a [`PageLease`]: a fresh tab that is closed
//! when the render finishes, whether it succeeded, failed or timed out.
//! The lease count lets callers see how many renders are in flight.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::SearchError;
use crate::http;

use super::PageRenderer;

/// Interval between checks for the ready selector.
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A launched browser plus the task that drives its CDP connection.
struct BrowserInstance {
    browser: Browser,
    handler: JoinHandle<()>,
}

/// Lazily launched, shared headless browser.
pub struct BrowserPool {
    executable: Option<PathBuf>,
    user_agent: Option<String>,
    instance: Mutex<Option<BrowserInstance>>,
    leases: Arc<AtomicUsize>,
}

impl BrowserPool {
    /// Create a pool. No browser is started until the first render.
    ///
    /// `executable` overrides Chromium discovery; `user_agent` overrides the
    /// randomly chosen browser UA.
    pub fn new(executable: Option<PathBuf>, user_agent: Option<String>) -> Self {
        Self {
            executable,
            user_agent,
            instance: Mutex::new(None),
            leases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of pages currently leased out.
    pub fn active_leases(&self) -> usize {
        self.leases.load(Ordering::SeqCst)
    }

    /// Open a fresh page, launching the browser if needed.
    ///
    /// A browser that fails to open a page (for example after a crash) is
    /// discarded and relaunched once.
    async fn lease(&self) -> Result<PageLease, SearchError> {
        let mut slot = self.instance.lock().await;

        if let Some(instance) = slot.as_ref() {
            match instance.browser.new_page("about:blank").await {
                Ok(page) => return Ok(PageLease::new(page, Arc::clone(&self.leases))),
                Err(e) => {
                    tracing::warn!(error = %e, "browser unresponsive, relaunching");
                    if let Some(stale) = slot.take() {
                        close_instance(stale).await;
                    }
                }
            }
        }

        let instance = self.launch().await?;
        let page = instance
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SearchError::Browser(format!("failed to open page: {e}")))?;
        *slot = Some(instance);

        Ok(PageLease::new(page, Arc::clone(&self.leases)))
    }

    async fn launch(&self) -> Result<BrowserInstance, SearchError> {
        let user_agent = self
            .user_agent
            .clone()
            .unwrap_or_else(|| http::random_user_agent().to_owned());

        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg(format!("--user-agent={user_agent}"))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");
        if let Some(ref path) = self.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| SearchError::Browser(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| SearchError::Browser(format!("failed to launch browser: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!("headless browser launched");
        Ok(BrowserInstance { browser, handler })
    }

    /// Close the shared browser, if one is running.
    ///
    /// A later render launches a new one.
    pub async fn shutdown(&self) {
        let mut slot = self.instance.lock().await;
        if let Some(instance) = slot.take() {
            close_instance(instance).await;
            tracing::info!("headless browser closed");
        }
    }
}

async fn close_instance(mut instance: BrowserInstance) {
    if let Err(e) = instance.browser.close().await {
        tracing::debug!(error = %e, "browser close failed");
    }
    if let Err(e) = instance.browser.wait().await {
        tracing::debug!(error = %e, "browser wait failed");
    }
    instance.handler.abort();
}

/// The whole render, browser acquisition included, shares one deadline.
///
/// Running out of time before a page is leased means the browser is not
/// usable, so that case is a [`SearchError::Browser`]; running out while the
/// page loads is a [`SearchError::Timeout`].
#[async_trait]
impl PageRenderer for BrowserPool {
    async fn render(
        &self,
        url: &str,
        ready_selector: &str,
        timeout: Duration,
    ) -> Result<String, SearchError> {
        let deadline = Instant::now() + timeout;

        let mut lease = match tokio::time::timeout_at(deadline, self.lease()).await {
            Ok(lease) => lease?,
            Err(_) => {
                tracing::warn!(timeout_secs = timeout.as_secs(), "browser acquisition timed out");
                return Err(SearchError::Browser(format!(
                    "browser not ready within {}s",
                    timeout.as_secs()
                )));
            }
        };

        let outcome = tokio::time::timeout_at(deadline, lease.load(url, ready_selector)).await;
        lease.release().await;

        match outcome {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout(format!(
                "page render exceeded {}s",
                timeout.as_secs()
            ))),
        }
    }
}

/// A single browser tab held for one render.
///
/// Dropping a lease without calling [`PageLease::release`] still closes the
/// tab, on a background task.
struct PageLease {
    page: Option<Page>,
    leases: Arc<AtomicUsize>,
}

impl PageLease {
    fn new(page: Page, leases: Arc<AtomicUsize>) -> Self {
        leases.fetch_add(1, Ordering::SeqCst);
        Self {
            page: Some(page),
            leases,
        }
    }

    /// Navigate to `url`, wait for `ready_selector` and return the DOM.
    ///
    /// Polls until the selector matches; the caller bounds the total time.
    async fn load(&mut self, url: &str, ready_selector: &str) -> Result<String, SearchError> {
        let page = self
            .page
            .as_ref()
            .ok_or_else(|| SearchError::Browser("page already released".into()))?;

        page.goto(url)
            .await
            .map_err(|e| SearchError::Http(format!("navigation failed: {e}")))?;

        loop {
            match page.find_elements(ready_selector).await {
                Ok(found) if !found.is_empty() => break,
                _ => tokio::time::sleep(READY_POLL_INTERVAL).await,
            }
        }

        page.content()
            .await
            .map_err(|e| SearchError::Parse(format!("failed to read page content: {e}")))
    }

    async fn release(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::debug!(error = %e, "page close failed");
            }
        }
    }
}

impl Drop for PageLease {
    fn drop(&mut self) {
        self.leases.fetch_sub(1, Ordering::SeqCst);
        if let Some(page) = self.page.take() {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                runtime.spawn(async move {
                    if let Err(e) = page.close().await {
                        tracing::debug!(error = %e, "page close after drop failed");
                    }
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pool_has_no_leases() {
        let pool = BrowserPool::new(None, None);
        assert_eq!(pool.active_leases(), 0);
    }

    #[tokio::test]
    async fn stalled_acquisition_is_bounded_by_render_timeout() {
        let pool = BrowserPool::new(None, None);
        // Another render holds the pool mid-launch and never finishes.
        let _held = pool.instance.lock().await;

        let started = std::time::Instant::now();
        let err = pool
            .render("about:blank", "body", Duration::from_millis(100))
            .await
            .unwrap_err();

        assert!(matches!(err, SearchError::Browser(_)), "got {err:?}");
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(pool.active_leases(), 0);
    }

    #[tokio::test]
    async fn shutdown_without_launch_is_noop() {
        let pool = BrowserPool::new(None, None);
        pool.shutdown().await;
        assert_eq!(pool.active_leases(), 0);
    }

    #[tokio::test]
    async fn missing_executable_is_browser_error() {
        let pool = BrowserPool::new(
            Some(PathBuf::from("/nonexistent/lodestar-test/chromium")),
            None,
        );
        let err = pool
            .render("about:blank", "body", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Browser(_)), "got {err:?}");
        assert_eq!(pool.active_leases(), 0);
    }

    #[tokio::test]
    #[ignore] // Needs a local Chromium: run with `cargo test -- --ignored`
    async fn live_render_closes_page() {
        let pool = BrowserPool::new(None, None);
        let html = pool
            .render(
                "data:text/html,<p id=ready>hi</p>",
                "#ready",
                Duration::from_secs(15),
            )
            .await
            .expect("render should succeed");
        assert!(html.contains("ready"));
        assert_eq!(pool.active_leases(), 0);
        pool.shutdown().await;
    }
}
