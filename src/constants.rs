pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const MONGO_MIN_POOL_SIZE: u32 = 5;
pub const MONGO_MAX_POOL_SIZE: u32 = 10;
pub const MONGO_CONN_TIMEOUT: u64 = 3;
pub const DEFAULT_PORT: u16 = 3000;

pub const OTP_LENGTH: u32 = 6;
pub const OTP_MIN_LENGTH: u32 = 4;
pub const OTP_MAX_LENGTH: u32 = 6;
pub const OTP_VALIDITY_MINS: u64 = 10;
// a consumed otp proves control of the phone for this long
pub const VERIFICATION_WINDOW_MINS: u64 = 10;
pub const OTP_UNDELIVERED_MSG: &str = "Otp generated but the sms could not be sent";

pub const RETRY_MAX_ATTEMPTS: u32 = 3;
pub const RETRY_BACKOFF_MS: u64 = 1000;

pub const COUNTRY_CODE: &str = "91";
pub const WORKER_ID_PREFIX: &str = "MWAP";
pub const WORKER_ID_SUFFIX_LEN: usize = 5;
pub const MIN_REGISTRATION_AGE: u32 = 18;

pub const FAST2SMS_ENDPOINT: &str = "https://www.fast2sms.com/dev/bulkV2";
pub const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";
pub const SMS_TIMEOUT_SECS: u64 = 4;
// every sms attempt and backoff together, kept well below REQUEST_TIMEOUT_SECS
pub const SMS_DELIVERY_BUDGET_SECS: u64 = 10;

pub const SESSION_EVENT_CAPACITY: usize = 16;
pub const REGISTRANT_CACHE_CAPACITY: usize = 10_000;

pub const DB_NAME: &str = "mwap";

pub const COLL_WORKERS: &str = "workers";
pub const COLL_OTP_CHALLENGES: &str = "otpChallenges";

pub const INDEX_WORKER_MOBILE: &str = "uniq_worker_mobile";
pub const INDEX_WORKER_NATIONAL_ID: &str = "uniq_worker_national_id";
pub const INDEX_OTP_LOOKUP: &str = "otp_phone_code_created";
