// Dashboard search/filter controller
//
// Keeps the dashboard URL in sync with the search box and the sport type
// selector. Search keystrokes are debounced; category changes navigate at once.
// Navigation always preserves unrelated query parameters.
//
// The debounce timer is a tokio task owned by the controller. A new keystroke
// aborts the pending task, and so does dropping the controller, so no stale
// navigation fires after teardown. Methods that schedule the timer must be
// called from within a tokio runtime.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use url::form_urlencoded;

use crate::event::ALL_SPORTS;

/// Inactivity window before a search value is committed to the URL
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(500);

/// Page the filter controls
pub const DASHBOARD_PATH: &str = "/dashboard";

pub const SEARCH_PARAM: &str = "search";
pub const SPORT_TYPE_PARAM: &str = "sport_type";

/// Options passed along with a navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Whether the page should scroll to top after navigating
    pub scroll: bool,
}

/// Client-side router abstraction
pub trait Navigator: Send + Sync + 'static {
    fn push(&self, href: &str, options: NavigateOptions);
}

/// Build a query string from `params` with `name` set to `value`.
///
/// An empty value or `"all"` removes the parameter instead. Other parameters
/// keep their order; the first occurrence of `name` is replaced in place and
/// any duplicates are dropped.
pub fn build_query_string(params: &[(String, String)], name: &str, value: &str) -> String {
    let keep = !value.is_empty() && value != ALL_SPORTS;
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut replaced = false;

    for (key, existing) in params {
        if key != name {
            serializer.append_pair(key, existing);
        } else if keep && !replaced {
            serializer.append_pair(name, value);
            replaced = true;
        }
    }
    if keep && !replaced {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn dashboard_href(query: &str) -> String {
    if query.is_empty() {
        DASHBOARD_PATH.to_string()
    } else {
        format!("{}?{}", DASHBOARD_PATH, query)
    }
}

// ============================================================================
// Controller
// ============================================================================

#[derive(Debug, Default)]
struct FilterState {
    /// Current URL query parameters, in order
    params: Vec<(String, String)>,
    /// What the user has typed so far
    search_input: String,
    /// Last search value that survived the debounce window
    debounced_search: String,
    /// Selected category ("all" when unfiltered)
    sport_type: String,
}

impl FilterState {
    fn sync_from_params(&mut self) {
        let search = param(&self.params, SEARCH_PARAM).unwrap_or_default().to_string();
        self.search_input = search.clone();
        self.debounced_search = search;
        self.sport_type = param(&self.params, SPORT_TYPE_PARAM)
            .unwrap_or(ALL_SPORTS)
            .to_string();
    }
}

struct Shared {
    navigator: Arc<dyn Navigator>,
    state: Mutex<FilterState>,
}

impl Shared {
    /// Apply a debounced search value, navigating only if it differs from the URL
    fn commit_search(&self, value: String) {
        let href = {
            let mut state = self.state.lock();
            state.debounced_search = value;
            let current = param(&state.params, SEARCH_PARAM).unwrap_or_default();
            if state.debounced_search == current {
                return;
            }
            let query = build_query_string(&state.params, SEARCH_PARAM, &state.debounced_search);
            state.params = parse_query(&query);
            dashboard_href(&query)
        };
        tracing::debug!(href = %href, "search filter navigating");
        self.navigator.push(&href, NavigateOptions { scroll: false });
    }
}

/// Debounced search and category filter bound to the dashboard URL
pub struct SearchFilter {
    shared: Arc<Shared>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl SearchFilter {
    /// Create a controller for the given navigator, seeded from the current
    /// URL query string (with or without the leading `?`)
    pub fn new(navigator: Arc<dyn Navigator>, current_query: &str) -> Self {
        let mut state = FilterState {
            params: parse_query(current_query),
            ..Default::default()
        };
        state.sync_from_params();
        Self {
            shared: Arc::new(Shared {
                navigator,
                state: Mutex::new(state),
            }),
            timer: Mutex::new(None),
        }
    }

    /// Value currently shown in the search box
    pub fn search_input(&self) -> String {
        self.shared.state.lock().search_input.clone()
    }

    pub fn debounced_search(&self) -> String {
        self.shared.state.lock().debounced_search.clone()
    }

    /// Selected sport type, `"all"` when unfiltered
    pub fn sport_type(&self) -> String {
        self.shared.state.lock().sport_type.clone()
    }

    /// Whether a debounced search commit is still pending
    pub fn has_pending_search(&self) -> bool {
        self.timer
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Record a keystroke and restart the debounce window
    pub fn on_search_change(&self, value: impl Into<String>) {
        let value = value.into();
        self.shared.state.lock().search_input = value.clone();

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE_DELAY).await;
            shared.commit_search(value);
        });

        if let Some(previous) = self.timer.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Select a sport type and navigate immediately
    pub fn on_sport_change(&self, value: impl Into<String>) {
        let value = value.into();
        let href = {
            let mut state = self.shared.state.lock();
            let query = build_query_string(&state.params, SPORT_TYPE_PARAM, &value);
            state.sport_type = if value.is_empty() {
                ALL_SPORTS.to_string()
            } else {
                value
            };
            state.params = parse_query(&query);
            dashboard_href(&query)
        };
        tracing::debug!(href = %href, "sport filter navigating");
        self.shared
            .navigator
            .push(&href, NavigateOptions { scroll: false });
    }

    /// Re-sync with a URL change that happened outside this controller
    /// (back button, link). Cancels any pending search commit.
    pub fn on_location_change(&self, query: &str) {
        if let Some(pending) = self.timer.lock().take() {
            pending.abort();
        }
        let mut state = self.shared.state.lock();
        state.params = parse_query(query);
        state.sync_from_params();
    }
}

impl Drop for SearchFilter {
    fn drop(&mut self) {
        if let Some(pending) = self.timer.get_mut().take() {
            pending.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_build_query_string_sets_and_removes() {
        let params = pairs(&[("search", "cup"), ("page", "2")]);
        assert_eq!(
            build_query_string(&params, "sport_type", "Golf"),
            "search=cup&page=2&sport_type=Golf"
        );
        assert_eq!(build_query_string(&params, "search", ""), "page=2");
        assert_eq!(
            build_query_string(&params, "search", "final four"),
            "search=final+four&page=2"
        );

        let params = pairs(&[("sport_type", "Golf")]);
        assert_eq!(build_query_string(&params, "sport_type", "all"), "");
    }

    #[test]
    fn test_build_query_string_drops_duplicates() {
        let params = pairs(&[("search", "a"), ("x", "1"), ("search", "b")]);
        assert_eq!(build_query_string(&params, "search", "c"), "search=c&x=1");
    }

    #[test]
    fn test_dashboard_href_without_query() {
        assert_eq!(dashboard_href(""), "/dashboard");
        assert_eq!(dashboard_href("search=x"), "/dashboard?search=x");
    }
}
