use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::UserId;

/// Who the local session is, fixed for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub user_id: UserId,
    /// Account identifier (an email address) as reported by the auth provider.
    pub account: String,
    /// Avatar color, `#` followed by lowercase hex. Picked once per session.
    pub color: String,
    pub display_name: String,
}

impl SessionIdentity {
    /// Identity with a freshly rolled session color.
    pub fn new(user_id: UserId, account: impl Into<String>) -> Self {
        Self::with_rng(user_id, account, &mut rand::thread_rng())
    }

    pub fn with_rng(user_id: UserId, account: impl Into<String>, rng: &mut impl Rng) -> Self {
        let account = account.into();
        let display_name = display_name_from_account(&account).to_owned();
        Self {
            user_id,
            account,
            color: random_session_color(rng),
            display_name,
        }
    }
}

/// Local part of an account identifier: everything before the first `@`.
pub fn display_name_from_account(account: &str) -> &str {
    account.split('@').next().unwrap_or(account)
}

/// A random `#rrggbb`-style color.
///
/// The value is drawn from `[0, 0xFFFFFF)` and printed without zero padding,
/// so dark colors come out shorter than six digits. Consumers accept that.
pub fn random_session_color(rng: &mut impl Rng) -> String {
    let value: u32 = rng.gen_range(0..0xFF_FFFF);
    format!("#{value:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn display_name_is_local_part() {
        assert_eq!(display_name_from_account("ana@example.com"), "ana");
        assert_eq!(display_name_from_account("no-at-sign"), "no-at-sign");
        assert_eq!(display_name_from_account("@host"), "");
    }

    #[test]
    fn color_is_hash_prefixed_hex() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let c = random_session_color(&mut rng);
            assert!(c.starts_with('#'));
            let digits = &c[1..];
            assert!(!digits.is_empty() && digits.len() <= 6);
            assert!(u32::from_str_radix(digits, 16).unwrap() < 0xFF_FFFF);
        }
    }

    #[test]
    fn identity_derives_display_name() {
        let mut rng = StdRng::seed_from_u64(1);
        let id = SessionIdentity::with_rng(UserId::from("u1"), "borges@biblioteca.ar", &mut rng);
        assert_eq!(id.display_name, "borges");
        assert_eq!(id.account, "borges@biblioteca.ar");
        assert!(id.color.starts_with('#'));
    }
}
