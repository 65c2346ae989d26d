pub mod auth_error;
pub mod error_handler;
pub mod misc;
pub mod phone;
pub mod retry;
pub mod validation;
pub mod worker_id;

pub use auth_error::{AuthError, ConflictField};
pub use error_handler::AppError;
pub use misc::*;
pub use phone::{local_number, normalize_phone};
pub use retry::{RetryPolicy, Transient};
pub use validation::{
    validate_otp_code, validate_phonenumber, validate_worker_id, ValidatedBody,
};
pub use worker_id::{format_worker_id, generate_worker_id, is_worker_id};
