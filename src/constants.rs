/// Source identifiers used on the command line and in config.toml
pub const UIPATH_API: &str = "uipath";
pub const NVIDIA_API: &str = "nvidia";
pub const AWS_API: &str = "aws";

// Values written to the `source` column
pub const UIPATH_SOURCE_NAME: &str = "UiPath";
pub const NVIDIA_SOURCE_NAME: &str = "NVIDIA";
pub const AWS_SOURCE_NAME: &str = "AWS";

// Public endpoints
pub const UIPATH_URL: &str =
    "https://www.uipath.com/steam-resources/page-data/resources/automation-webinars/page-data.json";
pub const NVIDIA_URL: &str =
    "https://www.nvidia.com/content/dam/en-zz/Solutions/about-nvidia/calendar/en-us.json";
pub const AWS_URL: &str = "https://aws.amazon.com/api/dirs/items/search?item.directoryId=alias%23events-webinars-interactive-cards&item.locale=en_US&tags.id=%21GLOBAL%23local-tags-events-master-series%23third-party&tags.id=%21GLOBAL%23local-tags-series%23third-party&tags.id=%21GLOBAL%23local-tags-flag%23archived&sort_by=item.dateCreated&sort_order=desc&size=8";

/// Origin prepended to relative UiPath resource paths.
pub const UIPATH_BASE_ORIGIN: &str = "https://www.uipath.com";

// Category used when a record carries none
pub const UIPATH_DEFAULT_CATEGORY: &str = "Webinar";
pub const NVIDIA_DEFAULT_CATEGORY: &str = "Conference";
pub const AWS_DEFAULT_CATEGORY: &str = "Webinar";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_DB_PATH: &str = "data/partner_events.db";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_SNAPSHOT_PREFIX: &str = "all_partner_events";
pub const DEFAULT_RUN_LOG: &str = "scraper_log.txt";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "partner_events.log";
pub const DEFAULT_LOG_FILTER: &str = "partner_events=info,warn";
pub const DEFAULT_METRICS_JOB: &str = "partner_events";

// Read API paging
pub const EVENTS_PER_PAGE: u32 = 16;
pub const PAGE_WINDOW: u32 = 10;

/// Get all supported source identifiers, in run order
pub fn get_supported_apis() -> Vec<&'static str> {
    vec![UIPATH_API, NVIDIA_API, AWS_API]
}
