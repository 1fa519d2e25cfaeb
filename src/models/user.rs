use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use pbkdf2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use pbkdf2::{Params, Pbkdf2};

const HASH_ROUNDS: u32 = 100_000;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub date_joined: DateTime<Utc>,
}

impl User {
    /// Two-letter avatar shown on the leaderboard.
    pub fn initials(&self) -> String {
        self.username.chars().take(2).collect::<String>().to_uppercase()
    }
}

/// PBKDF2-SHA256 in PHC string form, `$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())?;
    let params = Params {
        rounds: HASH_ROUNDS,
        output_length: 32,
    };
    Pbkdf2
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map(|hash| hash.to_string())
}

/// Constant-time check against a stored PHC string; unparsable hashes never match.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    PasswordHash::new(encoded)
        .map(|parsed| Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_only_the_same_password() {
        let encoded = hash_password("demo12345").unwrap();
        assert!(encoded.starts_with("$pbkdf2-sha256$"));
        assert!(encoded.contains("i=100000"));
        assert!(verify_password("demo12345", &encoded));
        assert!(!verify_password("demo12346", &encoded));
        assert!(!verify_password("demo12345", "md5$1$salt$abc"));
        assert!(!verify_password("demo12345", ""));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(
            hash_password("same").unwrap(),
            hash_password("same").unwrap()
        );
    }
}
