pub mod otp;
pub mod registrant;
pub mod request_schema;
pub mod response_schema;
pub mod worker;

pub use otp::*;
pub use registrant::*;
pub use request_schema::*;
pub use response_schema::*;
pub use worker::*;
