// Server configuration
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "8080";
pub const DEFAULT_DATA_PATH: &str = "data";
pub const DATABASE_FILE_NAME: &str = "subscriptions.db";
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 5;

// Pagination defaults
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIST_LIMIT: i64 = 10;
pub const MAX_LIST_LIMIT: i64 = 1000;

// Validation limits
pub const MAX_SERVICE_NAME_LENGTH: usize = 255;
pub const MIN_PRICE: i64 = 1;

// Wire format for month-granularity dates
pub const MONTH_YEAR_FORMAT: &str = "MM-YYYY";

// Response messages
pub const MSG_SUBSCRIPTION_UPDATED: &str = "Subscription updated successfully";
pub const MSG_SUBSCRIPTION_DELETED: &str = "Subscription deleted successfully";
pub const ERR_INVALID_BODY: &str = "Invalid request body";
