pub mod default;
pub mod global_404;
pub mod login;
pub mod otp;
pub mod ping;
pub mod registration;

pub use default::default_route_handler;

pub use global_404::global_404_handler;

pub use login::login_handler;

pub use otp::send::send_otp_handler;
pub use otp::verify::verify_otp_handler;

pub use ping::ping_handler;

pub use registration::check::check_registration_handler;
pub use registration::commit::commit_registration_handler;
