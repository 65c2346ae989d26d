use std::env;

use crate::{constants::*, utils::parse_flag};

/// Backing store for workers and otp challenges
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

/// SMS gateway credentials, the provider is picked from SMS_PROVIDER
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsConfig {
    Log,
    Fast2Sms {
        api_key: String,
    },
    Twilio {
        account_sid: String,
        auth_token: String,
        from_number: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpConfig {
    pub length: u32,
    /// return the generated code in the send otp response, never enable in production
    pub expose_code: bool,
    /// treat an undelivered otp as a failed issuance
    pub require_delivery: bool,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            length: OTP_LENGTH,
            expose_code: false,
            require_delivery: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub store: StoreBackend,
    pub sms: SmsConfig,
    pub otp: OtpConfig,
}

impl AppConfig {
    /// Read the configuration from the environment.
    /// Missing values fall back to the defaults in constants.rs
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT").unwrap_or_default();
        let port = port.parse::<u16>().unwrap_or(DEFAULT_PORT);
        let store = match env_or("STORE_BACKEND", "mongo").to_ascii_lowercase().as_str() {
            "memory" => StoreBackend::Memory,
            "mongo" | "mongodb" => StoreBackend::Mongo,
            other => anyhow::bail!("Unknown STORE_BACKEND: {other}"),
        };
        let sms = sms_config_from_env()?;
        let otp = otp_config_from_env()?;
        Ok(Self {
            port,
            store,
            sms,
            otp,
        })
    }

    /// Configuration for local runs and tests: in memory store and logged sms
    pub fn local() -> Self {
        Self {
            port: DEFAULT_PORT,
            store: StoreBackend::Memory,
            sms: SmsConfig::Log,
            otp: OtpConfig::default(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn required_env(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("{key} not found in environment"))
}

fn sms_config_from_env() -> anyhow::Result<SmsConfig> {
    let provider = env_or("SMS_PROVIDER", "log").to_ascii_lowercase();
    let config = match provider.as_str() {
        "log" | "simulated" => SmsConfig::Log,
        "fast2sms" => SmsConfig::Fast2Sms {
            api_key: required_env("FAST2SMS_API_KEY")?,
        },
        "twilio" => SmsConfig::Twilio {
            account_sid: required_env("TWILIO_ACCOUNT_SID")?,
            auth_token: required_env("TWILIO_AUTH_TOKEN")?,
            from_number: required_env("TWILIO_FROM_NUMBER")?,
        },
        other => anyhow::bail!("Unknown SMS_PROVIDER: {other}"),
    };
    Ok(config)
}

fn otp_config_from_env() -> anyhow::Result<OtpConfig> {
    let length = env::var("OTP_LENGTH").unwrap_or_default();
    let length = length.parse::<u32>().unwrap_or(OTP_LENGTH);
    if !(OTP_MIN_LENGTH..=OTP_MAX_LENGTH).contains(&length) {
        anyhow::bail!("OTP_LENGTH must be between {OTP_MIN_LENGTH} and {OTP_MAX_LENGTH}");
    }
    let expose_code = parse_flag(&env::var("OTP_EXPOSE_CODE").unwrap_or_default());
    let require_delivery = parse_flag(&env::var("OTP_REQUIRE_DELIVERY").unwrap_or_default());
    if expose_code {
        tracing::warn!("OTP_EXPOSE_CODE is enabled, generated codes are returned to callers");
    }
    Ok(OtpConfig {
        length,
        expose_code,
        require_delivery,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_config() {
        let config = AppConfig::local();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.sms, SmsConfig::Log);
        assert_eq!(config.otp.length, 6);
        assert_eq!(config.otp.expose_code, false);
        assert_eq!(config.otp.require_delivery, false);
    }
}
