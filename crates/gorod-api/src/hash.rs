// Password digests for the auth endpoints.
//
// The backend never sees the raw password: password auth posts two digests
// plus the timestamp they were computed against. Both formulas come from
// the vendor's mobile app and must match byte-for-byte.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use md5::Md5;
use sha1::{Digest, Sha1};

const HASH_PREFIX: &str = "DigitalHomeNTK";
const HASH_SECRET: &str = "789sdgHJs678wertv34712376";

/// `hash1`: base64 of the SHA-1 digest of the UTF-8 password bytes.
pub fn hash_password(password: &str) -> String {
    STANDARD.encode(Sha1::digest(password.as_bytes()))
}

/// `hash2`: lowercase hex MD5 over the salted concatenation
/// `prefix + "password" + login + password + timestamp + secret`,
/// where `timestamp` is the `YYYYMMDDHHMMSS` rendering of the same
/// instant sent in the request body.
pub fn hash_password_timestamp(login: &str, password: &str, simple_timestamp: &str) -> String {
    let message =
        format!("{HASH_PREFIX}password{login}{password}{simple_timestamp}{HASH_SECRET}");
    hex::encode(Md5::digest(message.as_bytes()))
}

/// One auth instant, rendered in the two formats the password endpoint
/// expects: ISO-8601 with millisecond precision in the payload, and the
/// compact form inside `hash2`.
#[derive(Debug, Clone, Copy)]
pub struct AuthTimestamp(DateTime<Utc>);

impl AuthTimestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// ISO-8601, millisecond precision, trailing `Z`.
    pub fn isoformat(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }

    /// `YYYYMMDDHHMMSS`.
    pub fn simple(&self) -> String {
        self.0.format("%Y%m%d%H%M%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;

    use super::{AuthTimestamp, hash_password, hash_password_timestamp};

    #[test]
    fn hash_password_golden_value() {
        // sha1("secret") base64-encoded, stable across calls.
        assert_eq!(hash_password("secret"), "5en6G6MezRroT3XKqkdPOmY/BfQ=");
        assert_eq!(hash_password("secret"), hash_password("secret"));
    }

    #[test]
    fn hash_password_other_input() {
        assert_eq!(hash_password("p@ssw0rd"), "V7KtmQRNM3GXwMOf04I1aP+B5Io=");
    }

    #[test]
    fn hash_password_timestamp_golden_value() {
        assert_eq!(
            hash_password_timestamp("79991234567", "secret", "20240102030405"),
            "768109ed5180f1de71b5f29383b8dec1"
        );
        assert_eq!(
            hash_password_timestamp("79990000001", "hunter2", "20231231235959"),
            "e8e52df2d4714cbb3d88c00e7d52e1e2"
        );
    }

    #[test]
    fn timestamp_formats() {
        let instant = chrono::Utc
            .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
            .unwrap()
            + chrono::Duration::milliseconds(678);
        let ts = AuthTimestamp::from_datetime(instant);
        assert_eq!(ts.isoformat(), "2024-01-02T03:04:05.678Z");
        assert_eq!(ts.simple(), "20240102030405");
    }
}
