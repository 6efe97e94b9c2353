//! Page automation capability consumed by the extractors.
//!
//! The traits mirror a headless-browser driver: a [`Launcher`] starts a
//! [`Browser`], which hands out one [`PageHandle`] per visited page. The
//! HTTP implementation below fetches the document with reqwest and answers
//! queries against a parsed `scraper::Html` snapshot.

use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::ScrapeError;
use crate::fetcher;

/// Wait applied when a caller does not bound `wait_for_selector` itself.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(30);
const POLL_INTERVAL: Duration = Duration::from_secs(2);
/// Upper bound on lazily loaded batches followed by one `auto_scroll`.
const MAX_BATCHES: usize = 50;

/// When `goto` considers the navigation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    /// Network has been (almost) idle for a moment.
    NetworkIdle,
}

/// How a page announces its next lazily loaded batch.
///
/// Scrolling fetches the URL held in `attr` of the last `marker` element,
/// and keeps going while each new batch carries a marker of its own. Batches
/// are wrapped in an element with `container_id` so selectors scoped to the
/// original list still match them.
#[derive(Debug, Clone, Copy)]
pub struct Continuation {
    pub marker: &'static str,
    pub attr: &'static str,
    pub container_id: &'static str,
}

pub trait Launcher {
    type Browser: Browser;

    fn launch(&self) -> Result<Self::Browser, ScrapeError>;
}

pub trait Browser {
    type Page: PageHandle;

    fn new_page(&self) -> Result<Self::Page, ScrapeError>;

    fn close(self) -> Result<(), ScrapeError>;
}

/// A single loaded page. Owned by one extraction at a time.
pub trait PageHandle {
    fn goto(&mut self, url: &str, wait: WaitUntil) -> Result<(), ScrapeError>;

    /// Block until `selector` matches, or fail with
    /// [`ScrapeError::SelectorTimeout`] once `timeout` (default
    /// [`DEFAULT_WAIT`]) has elapsed.
    fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> Result<(), ScrapeError>;

    /// Raw text content of the first match, `None` when nothing matches.
    fn query_text(&self, selector: &str) -> Result<Option<String>, ScrapeError>;

    /// `href` attribute of every matching element, in document order.
    fn query_all_hrefs(&self, selector: &str) -> Result<Vec<String>, ScrapeError>;

    /// Load everything the page only renders once scrolled into view.
    fn auto_scroll(&mut self) -> Result<(), ScrapeError>;

    fn close(self) -> Result<(), ScrapeError>
    where
        Self: Sized;
}

pub struct HttpLauncher {
    user_agent: String,
    timeout: Duration,
    continuation: Option<Continuation>,
}

impl HttpLauncher {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            timeout,
            continuation: None,
        }
    }

    pub fn with_continuation(mut self, continuation: Continuation) -> Self {
        self.continuation = Some(continuation);
        self
    }
}

impl Launcher for HttpLauncher {
    type Browser = HttpBrowser;

    fn launch(&self) -> Result<HttpBrowser, ScrapeError> {
        let client = fetcher::build_client(&self.user_agent, self.timeout)?;
        Ok(HttpBrowser {
            client,
            continuation: self.continuation,
        })
    }
}

pub struct HttpBrowser {
    client: Client,
    continuation: Option<Continuation>,
}

impl Browser for HttpBrowser {
    type Page = HtmlPage;

    fn new_page(&self) -> Result<HtmlPage, ScrapeError> {
        Ok(HtmlPage {
            client: Some(self.client.clone()),
            url: None,
            continuation: self.continuation,
            document: None,
            batches: Vec::new(),
        })
    }

    fn close(self) -> Result<(), ScrapeError> {
        debug!("closing browser");
        Ok(())
    }
}

pub struct HtmlPage {
    client: Option<Client>,
    url: Option<String>,
    continuation: Option<Continuation>,
    document: Option<Html>,
    /// Lazily loaded batches, in load order.
    batches: Vec<Html>,
}

#[cfg(test)]
impl HtmlPage {
    /// A page already holding `html`, with no way to navigate elsewhere.
    pub fn from_html(html: &str) -> Self {
        Self {
            client: None,
            url: None,
            continuation: None,
            document: Some(Html::parse_document(html)),
            batches: Vec::new(),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn with_continuation(mut self, continuation: Continuation) -> Self {
        self.continuation = Some(continuation);
        self
    }
}

impl HtmlPage {
    fn document(&self) -> Result<&Html, ScrapeError> {
        self.document.as_ref().ok_or(ScrapeError::NotLoaded)
    }

    fn documents(&self) -> Result<impl Iterator<Item = &Html>, ScrapeError> {
        Ok(std::iter::once(self.document()?).chain(self.batches.iter()))
    }

    fn reload(&mut self) -> Result<(), ScrapeError> {
        let (Some(client), Some(url)) = (&self.client, &self.url) else {
            return Err(ScrapeError::NotLoaded);
        };
        let html = fetcher::fetch_html(client, url)?;
        self.document = Some(Html::parse_document(&html));
        self.batches.clear();
        Ok(())
    }

    fn matches(&self, selector: &str) -> Result<bool, ScrapeError> {
        let selector = parse_selector(selector)?;
        Ok(self.documents()?.any(|d| d.select(&selector).next().is_some()))
    }

    /// Follow the continuation marker, loading each batch with `fetch`.
    ///
    /// A batch that fails to load ends scrolling; what was loaded so far is
    /// kept.
    pub(crate) fn scroll_with<F>(&mut self, mut fetch: F) -> Result<(), ScrapeError>
    where
        F: FnMut(&str) -> Result<String, ScrapeError>,
    {
        let Some(continuation) = self.continuation else {
            return self.document().map(|_| ());
        };
        let base = self.url.as_deref().and_then(|u| Url::parse(u).ok());
        let last = self.batches.last().map_or_else(|| self.document(), Ok)?;
        let mut next = next_batch_url(last, &continuation, base.as_ref())?;
        let mut seen = HashSet::new();

        while let Some(url) = next.take() {
            if !seen.insert(url.clone()) {
                debug!("batch {} already loaded", url);
                break;
            }
            if seen.len() > MAX_BATCHES {
                warn!("stopped scrolling after {} batches", MAX_BATCHES);
                break;
            }
            let html = match fetch(&url) {
                Ok(html) => html,
                Err(e) => {
                    warn!("loading batch {} failed: {}", url, e);
                    break;
                }
            };
            let batch = Html::parse_document(&format!(
                r#"<div id="{}">{}</div>"#,
                continuation.container_id, html
            ));
            next = next_batch_url(&batch, &continuation, base.as_ref())?;
            self.batches.push(batch);
        }

        debug!("{} lazily loaded batches", self.batches.len());
        Ok(())
    }
}

impl PageHandle for HtmlPage {
    fn goto(&mut self, url: &str, wait: WaitUntil) -> Result<(), ScrapeError> {
        info!("trying go to {}", url);
        debug!(?wait, "navigating");
        self.url = Some(url.to_string());
        self.document = None;
        self.reload()
    }

    fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Option<Duration>,
    ) -> Result<(), ScrapeError> {
        let timeout = timeout.unwrap_or(DEFAULT_WAIT);
        let started = Instant::now();
        loop {
            if self.matches(selector)? {
                return Ok(());
            }
            let waited = started.elapsed();
            if self.client.is_none() || waited + POLL_INTERVAL > timeout {
                return Err(ScrapeError::SelectorTimeout {
                    selector: selector.to_string(),
                    waited,
                });
            }
            thread::sleep(POLL_INTERVAL);
            // A fetched document never changes, so polling means fetching again.
            if let Err(e) = self.reload() {
                warn!("reload while waiting for {} failed: {}", selector, e);
            }
        }
    }

    fn query_text(&self, selector: &str) -> Result<Option<String>, ScrapeError> {
        let selector = parse_selector(selector)?;
        Ok(self
            .documents()?
            .find_map(|d| d.select(&selector).next())
            .map(|e| e.text().collect::<String>()))
    }

    fn query_all_hrefs(&self, selector: &str) -> Result<Vec<String>, ScrapeError> {
        let selector = parse_selector(selector)?;
        Ok(self
            .documents()?
            .flat_map(|d| d.select(&selector))
            .filter_map(|e| e.value().attr("href").map(String::from))
            .collect())
    }

    fn auto_scroll(&mut self) -> Result<(), ScrapeError> {
        let client = self.client.clone();
        self.scroll_with(|url| match &client {
            Some(client) => fetcher::fetch_html(client, url),
            None => Err(ScrapeError::NotLoaded),
        })
    }

    fn close(self) -> Result<(), ScrapeError> {
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(selector).map_err(|e| ScrapeError::InvalidSelector(format!("{selector}: {e}")))
}

/// Absolute URL of the next batch announced in `doc`, if any.
fn next_batch_url(
    doc: &Html,
    continuation: &Continuation,
    base: Option<&Url>,
) -> Result<Option<String>, ScrapeError> {
    let marker = parse_selector(continuation.marker)?;
    let Some(value) = doc
        .select(&marker)
        .filter_map(|e| e.value().attr(continuation.attr))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .last()
    else {
        return Ok(None);
    };
    let url = match base {
        Some(base) => base.join(value)?,
        None => Url::parse(value)?,
    };
    Ok(Some(url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"
        <div id="list">
            <a class="item" href="/dp/1">One</a>
            <a class="item" href="/dp/2">Two</a>
            <a class="item">No href</a>
        </div>
    "#;

    #[test]
    fn query_text_returns_first_match() {
        let page = HtmlPage::from_html(HTML);
        assert_eq!(page.query_text("a.item").unwrap().as_deref(), Some("One"));
        assert_eq!(page.query_text("#missing").unwrap(), None);
    }

    #[test]
    fn query_all_hrefs_skips_anchors_without_href() {
        let page = HtmlPage::from_html(HTML);
        assert_eq!(page.query_all_hrefs("a.item").unwrap(), vec!["/dp/1", "/dp/2"]);
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let page = HtmlPage::from_html(HTML);
        assert!(matches!(
            page.query_text("li:("),
            Err(ScrapeError::InvalidSelector(_))
        ));
    }

    #[test]
    fn wait_for_missing_selector_times_out_on_static_page() {
        let mut page = HtmlPage::from_html(HTML);
        assert!(page.wait_for_selector("#list", Some(Duration::from_millis(10))).is_ok());
        let err = page
            .wait_for_selector("#g-items", Some(Duration::from_millis(10)))
            .unwrap_err();
        assert!(matches!(err, ScrapeError::SelectorTimeout { .. }));
    }

    #[test]
    fn unloaded_page_reports_not_loaded() {
        let browser = HttpBrowser {
            client: Client::new(),
            continuation: None,
        };
        let page = browser.new_page().unwrap();
        assert!(matches!(page.query_text("a"), Err(ScrapeError::NotLoaded)));
    }

    const MORE: Continuation = Continuation {
        marker: r#"input[name="showMoreUrl"]"#,
        attr: "value",
        container_id: "list",
    };

    fn batch(hrefs: &[&str], more: Option<&str>) -> String {
        let mut html: String = hrefs
            .iter()
            .map(|href| format!(r#"<a class="item" href="{href}">x</a>"#))
            .collect();
        if let Some(more) = more {
            html.push_str(&format!(r#"<input type="hidden" name="showMoreUrl" value="{more}">"#));
        }
        html
    }

    fn first_page(more: &str) -> HtmlPage {
        HtmlPage::from_html(&format!(r#"<div id="list">{}</div>"#, batch(&["/dp/1"], Some(more))))
            .with_url("https://www.amazon.com.br/hz/wishlist/ls/X")
            .with_continuation(MORE)
    }

    #[test]
    fn scroll_follows_batches_until_marker_disappears() {
        let mut page = first_page("/more?page=2");
        let mut fetched = Vec::new();
        page.scroll_with(|url| {
            fetched.push(url.to_string());
            Ok(match url {
                "https://www.amazon.com.br/more?page=2" => batch(&["/dp/2"], Some("/more?page=3")),
                _ => batch(&["/dp/3"], None),
            })
        })
        .unwrap();

        assert_eq!(
            fetched,
            vec![
                "https://www.amazon.com.br/more?page=2",
                "https://www.amazon.com.br/more?page=3",
            ]
        );
        assert_eq!(
            page.query_all_hrefs("#list a.item").unwrap(),
            vec!["/dp/1", "/dp/2", "/dp/3"]
        );
    }

    #[test]
    fn scroll_stops_on_repeated_batch_url() {
        let mut page = first_page("/more?page=2");
        let mut calls = 0;
        page.scroll_with(|_| {
            calls += 1;
            Ok(batch(&["/dp/2"], Some("/more?page=2")))
        })
        .unwrap();

        assert_eq!(calls, 1);
        assert_eq!(page.query_all_hrefs("#list a.item").unwrap().len(), 2);
    }

    #[test]
    fn failed_batch_keeps_what_was_loaded() {
        let mut page = first_page("/more?page=2");
        page.scroll_with(|_| Err(ScrapeError::NotLoaded)).unwrap();
        assert_eq!(page.query_all_hrefs("#list a.item").unwrap(), vec!["/dp/1"]);
    }

    #[test]
    fn scroll_without_continuation_fetches_nothing() {
        let mut page = HtmlPage::from_html(HTML);
        page.scroll_with(|_| panic!("no batch to fetch")).unwrap();
        assert_eq!(page.query_all_hrefs("a.item").unwrap().len(), 2);
    }

    #[test]
    fn query_text_searches_batches_after_main_document() {
        let mut page = first_page("/more?page=2");
        page.scroll_with(|_| Ok(r#"<p id="late">arrived</p>"#.to_string())).unwrap();
        assert_eq!(page.query_text("#list #late").unwrap().as_deref(), Some("arrived"));
    }
}
