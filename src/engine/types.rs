//! Shared engine constants: URLs, selectors, and timing knobs.

use std::time::Duration;

/// Desktop Chrome user agent passed on the browser command line at launch.
/// Page hardening separately strips the Headless marker from whatever UA the
/// browser actually reports (see `stealth`).
pub const CHROME_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/132.0.6834.160 Safari/537.36";

pub const GOOGLE_HOME: &str = "https://www.google.com";
pub const DUCKDUCKGO_HOME: &str = "https://duckduckgo.com";

/// Query input on both engines' home pages. Google has shipped the box as a
/// textarea and as an input at different times, so match either.
pub const SEARCH_BOX_SELECTOR: &str = "textarea[name='q'], input[name='q']";

/// Maximum wait for a results container after submitting or paginating.
pub const RESULTS_WAIT: Duration = Duration::from_secs(12);

/// Spacing between checks inside bounded waits.
pub const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Pause after each pagination action so late-loading results can land.
pub const SETTLE_DELAY: Duration = Duration::from_millis(600);

/// Consecutive no-progress cycles before an engine gives up.
pub const STAGNATION_LIMIT: u32 = 3;

/// Final pause before closing the Google session, letting any straggling
/// result tiles render and be collected.
pub const GOOGLE_DRAIN_PAUSE: Duration = Duration::from_millis(1500);

/// Final pause before closing the DuckDuckGo session.
pub const DUCKDUCKGO_DRAIN_PAUSE: Duration = Duration::from_millis(1000);

/// Settle time after clicking through a consent wall.
pub const CONSENT_SETTLE: Duration = Duration::from_millis(300);

/// Brief pause after nudging focus onto a search box before typing starts.
pub const FOCUS_SETTLE: Duration = Duration::from_millis(100);

/// Consent dismissal buttons seen across Google's regional variants, tried
/// in order. Button text differs by rollout, ids less so.
pub const GOOGLE_CONSENT_XPATHS: &[&str] = &[
    "//button[@id='L2AGLb']",
    "//button[.//div[contains(text(), 'Accept all')]]",
    "//button[contains(., 'Accept all')]",
    "//button[contains(., 'I agree')]",
];

/// Result card containers, most specific first.
pub const GOOGLE_CARD_SELECTORS: &[&str] =
    &["div.g", "div[data-sokoban-container]", "div#search div"];

/// Title anchor inside a result card.
pub const GOOGLE_TITLE_LINK_SELECTOR: &str = "div.yuRUbf > a[href^='http']";

/// Fallback anchor when the card layout changed under us.
pub const GOOGLE_ANY_LINK_SELECTOR: &str = "a[href^='http']";

pub const GOOGLE_RESULTS_CONTAINER: &str = "div#search";

/// "More results" button on the continuous-scroll layout. The predicate
/// excludes the unrelated "More results from ..." site grouping link.
pub const GOOGLE_MORE_RESULTS_XPATH: &str =
    "//span[contains(text(), 'More results') and not(contains(text(), 'More results from'))]";

/// Classic pagination controls, current layout first.
pub const GOOGLE_NEXT_PAGE_SELECTORS: &[&str] = &["#pnnext", "a[aria-label='Next page']"];

pub const GOOGLE_RECAPTCHA_XPATH: &str =
    "//div[@id='recaptcha' and contains(@class, 'g-recaptcha')]";

pub const DUCKDUCKGO_RESULTS_CONTAINER: &str = "ol.react-results--main";

/// Result anchors on the React serp, most specific first.
pub const DUCKDUCKGO_LINK_SELECTORS: &[&str] = &[
    "a[data-testid='result-title-a'][href^='http']",
    "a[data-testid='result-extras-url-link'][href^='http']",
    "ol.react-results--main a[href^='http']",
];

pub const DUCKDUCKGO_MORE_RESULTS_SELECTOR: &str = "#more-results";
