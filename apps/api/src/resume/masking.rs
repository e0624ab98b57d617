//! One-way display masking for contact details.
//!
//! Raw values stay on the profile for internal use; only these masked forms are rendered.

/// Minimum digit count before a phone number can be masked safely.
const MIN_MASKABLE_DIGITS: usize = 10;
const VISIBLE_LOCAL_CHARS: usize = 3;

/// `john.doe@example.com` → `joh***@example.com`.
///
/// Inputs without a local part or a domain are returned unchanged.
pub fn mask_email(email: &str) -> String {
    let mut parts = email.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() {
        return email.to_string();
    }

    let visible: String = local.chars().take(VISIBLE_LOCAL_CHARS).collect();
    format!("{visible}***@{domain}")
}

/// `+91-9876543210` → `+91-****-***-3210`.
///
/// Numbers with fewer than ten digits are returned unchanged.
pub fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < MIN_MASKABLE_DIGITS {
        return phone.to_string();
    }

    let prefix = if phone.starts_with("+91") { "+91" } else { "" };
    let last_four: String = digits[digits.len() - 4..].iter().collect();
    format!("{prefix}-****-***-{last_four}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_email_keeps_three_chars() {
        assert_eq!(mask_email("john.doe@example.com"), "joh***@example.com");
        assert_eq!(mask_email("john@example.com"), "joh***@example.com");
    }

    #[test]
    fn test_mask_email_short_local_part() {
        assert_eq!(mask_email("ab@test.com"), "ab***@test.com");
        assert_eq!(mask_email("a@test.com"), "a***@test.com");
    }

    #[test]
    fn test_mask_email_malformed_is_unchanged() {
        assert_eq!(mask_email("not-an-email"), "not-an-email");
        assert_eq!(mask_email("@example.com"), "@example.com");
        assert_eq!(mask_email("john@"), "john@");
    }

    #[test]
    fn test_mask_email_domain_is_preserved() {
        for email in ["x.y.z@sub.domain.co.in", "first.last@corp.io"] {
            let domain = email.split('@').nth(1).unwrap();
            assert!(mask_email(email).ends_with(&format!("@{domain}")));
        }
    }

    #[test]
    fn test_mask_phone_with_country_code() {
        assert_eq!(mask_phone("+91-9876543210"), "+91-****-***-3210");
    }

    #[test]
    fn test_mask_phone_without_country_code() {
        assert_eq!(mask_phone("(555) 123-4567"), "-****-***-4567");
    }

    #[test]
    fn test_mask_phone_too_short_is_unchanged() {
        assert_eq!(mask_phone("123"), "123");
        assert_eq!(mask_phone("555-1234"), "555-1234");
    }

    #[test]
    fn test_mask_phone_reveals_only_last_four() {
        let masked = mask_phone("+1 415 555 0199");
        assert!(masked.contains("****"));
        assert!(masked.ends_with("0199"));
        assert!(!masked.contains("415"));
    }
}
