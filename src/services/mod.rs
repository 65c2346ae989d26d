pub mod cache;
pub mod otp_issuer;
pub mod otp_verifier;
pub mod registration;
pub mod uniqueness;

pub use cache::RegistrantCache;
pub use otp_issuer::{DeliveryStatus, IssuedOtp, OtpIssuer};
pub use otp_verifier::OtpVerifier;
pub use registration::RegistrationService;
pub use uniqueness::{UniquenessChecker, UniquenessReport};
