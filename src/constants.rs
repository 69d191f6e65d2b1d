/// Maximum page size for workout listings
pub const MAX_PAGE_SIZE: i64 = 30;

/// Default page size for workout listings
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Minimum accepted password length at registration
pub const MIN_PASSWORD_LEN: usize = 8;

/// Default token lifetime in seconds (24 hours)
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

// =============================================================================
// Error Messages
// =============================================================================

/// Error message for an out-of-range limit parameter
pub const ERR_LIMIT_RANGE: &str = "limit must be between 1 and 30";

/// Error message for an out-of-range page parameter
pub const ERR_PAGE_RANGE: &str = "page must be greater or equal than 1";

/// Error message for unparseable date bounds
pub const ERR_INVALID_DATE: &str = "dates must be RFC3339 timestamps";
