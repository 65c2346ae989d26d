pub mod helper;
pub mod sms;
pub mod worker;

pub use helper::build_get_request;
pub use helper::build_post_request;
pub use helper::read_json;
pub use helper::spawn_server;
pub use helper::state_with;
pub use helper::test_state;

pub use sms::{HangingSms, RejectingSms};

pub use worker::register_worker;
pub use worker::registrant_json;
pub use worker::send_otp;
pub use worker::verify_mobile;
pub use worker::verify_otp;
