pub const API_PREFIX: &str = "/api";
pub const PRIZES_ENDPOINT: &str = "/prizes";
pub const SEND_DISCOUNT_ENDPOINT: &str = "/send-discount";
pub const HEALTH_CHECK_ENDPOINT: &str = "/health_check";

pub const MISSING_FIELDS_ERROR: &str = "Missing required fields";
pub const INVALID_EMAIL_ERROR: &str = "Please enter a valid email address";
pub const INVALID_NAME_ERROR: &str = "Please enter your name";
pub const UNKNOWN_PRIZE_ERROR: &str = "Unknown prize";
pub const DUPLICATE_EMAIL_ERROR: &str = "This email has already been used to claim a discount code.";
pub const INVALID_BODY_ERROR: &str = "Invalid request body";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const DISCOUNT_SENT_MESSAGE: &str = "Discount code sent successfully";

pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_NAME_LENGTH: usize = 100;
