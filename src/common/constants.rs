/// Source name constants to ensure consistency across the codebase.
/// CLI/config names are lowercase; catalog names are what the listing shows.

// Source names (used in CLI and config)
pub const PAVE_API: &str = "pave";
pub const WORLDATWORK_API: &str = "worldatwork";
pub const SYNDIO_API: &str = "syndio";

// Source names as written to the catalog
pub const PAVE_SOURCE_NAME: &str = "Pave";
pub const WORLDATWORK_SOURCE_NAME: &str = "WorldAtWork";
pub const SYNDIO_SOURCE_NAME: &str = "Syndio";

// Listing pages
pub const PAVE_URL: &str = "https://www.pave.com/insights/events-and-webinars";
pub const WORLDATWORK_URL: &str = "https://worldatwork.org/webinars?delivery=virtuallive+ondemand";
pub const SYNDIO_URL: &str = "https://synd.io/resources/?_type=webinar";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

// Record bounds
pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

// Published artifacts
pub const CATALOG_FILE_NAME: &str = "webinars.json";
pub const CSV_FILE_NAME: &str = "webinars.csv";
pub const CSV_HEADER: &str = "source,title,status,airDate,description,link";

/// Shown in place of a missing date.
pub const DATE_PLACEHOLDER: &str = "—";

/// Get all supported source names, in the fixed call order
pub fn get_supported_apis() -> Vec<&'static str> {
    vec![PAVE_API, WORLDATWORK_API, SYNDIO_API]
}
