//! Credential validation
//!
//! Pure syntactic checks on submitted emails and passwords. The password
//! rules live in [`PasswordPolicy`] so deployments can tune them without
//! touching the login and registration flows.

/// Special characters accepted by the default policy
pub const DEFAULT_SPECIAL_CHARACTERS: &str = "!@#$%^&*()_+-=[]{}:,.?";

/// Minimum password length of the default policy
pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

/// bcrypt only reads the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

/// A single password rule that was not met
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordViolation {
    #[error("Password is required")]
    Empty,

    #[error("Password must be at least {0} characters")]
    TooShort(usize),

    #[error("Password must be at most {0} bytes")]
    TooLong(usize),

    #[error("Password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("Password must contain at least one number")]
    MissingDigit,

    #[error("Password must contain at least one special character")]
    MissingSpecial,
}

/// Password composition rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_bytes: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    /// `None` disables the special character rule
    pub special_characters: Option<String>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_MIN_PASSWORD_LENGTH,
            max_bytes: MAX_PASSWORD_BYTES,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            special_characters: Some(DEFAULT_SPECIAL_CHARACTERS.to_string()),
        }
    }
}

impl PasswordPolicy {
    /// Set minimum length (in characters)
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = min;
        self
    }

    /// Enable or disable the special character rule
    pub fn require_special(mut self, required: bool) -> Self {
        self.special_characters = required.then(|| DEFAULT_SPECIAL_CHARACTERS.to_string());
        self
    }

    /// Check a password, reporting the first rule it breaks
    pub fn check(&self, password: &str) -> Result<(), PasswordViolation> {
        if password.is_empty() {
            return Err(PasswordViolation::Empty);
        }

        if password.chars().count() < self.min_length {
            return Err(PasswordViolation::TooShort(self.min_length));
        }

        if password.len() > self.max_bytes {
            return Err(PasswordViolation::TooLong(self.max_bytes));
        }

        if self.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
            return Err(PasswordViolation::MissingUppercase);
        }

        if self.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
            return Err(PasswordViolation::MissingLowercase);
        }

        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordViolation::MissingDigit);
        }

        if let Some(specials) = &self.special_characters
            && !password.chars().any(|c| specials.contains(c))
        {
            return Err(PasswordViolation::MissingSpecial);
        }

        Ok(())
    }
}

/// Trim and lower-case an email so lookups and inserts agree
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Check `local@domain.tld` shape: one `@`, no whitespace, dotted domain
/// with non-empty labels.
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Email Tests
    // ========================================================================

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@example.com"));
        assert!(is_valid_email("user+tag@example.co.uk"));
        assert!(is_valid_email("a@b.co"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example."));
        assert!(!is_valid_email("us er@example.com"));
        assert!(!is_valid_email("user@exa\tmple.com"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
        assert_eq!(normalize_email("new@x.com"), "new@x.com");
    }

    // ========================================================================
    // Password Policy Tests
    // ========================================================================

    #[test]
    fn test_default_policy_accepts_strong_password() {
        let policy = PasswordPolicy::default();
        assert!(policy.check("Str0ng!Pass").is_ok());
        assert!(policy.check("MyP@ssw0rd").is_ok());
    }

    #[test]
    fn test_default_policy_reports_first_violation() {
        let policy = PasswordPolicy::default();

        assert_eq!(policy.check(""), Err(PasswordViolation::Empty));
        assert_eq!(policy.check("Ab1!"), Err(PasswordViolation::TooShort(8)));
        assert_eq!(
            policy.check("password1!"),
            Err(PasswordViolation::MissingUppercase)
        );
        assert_eq!(
            policy.check("PASSWORD1!"),
            Err(PasswordViolation::MissingLowercase)
        );
        assert_eq!(
            policy.check("Password!!"),
            Err(PasswordViolation::MissingDigit)
        );
        assert_eq!(
            policy.check("Password12"),
            Err(PasswordViolation::MissingSpecial)
        );
    }

    #[test]
    fn test_policy_rejects_input_bcrypt_would_truncate() {
        let policy = PasswordPolicy::default();
        let long = format!("Aa1!{}", "x".repeat(MAX_PASSWORD_BYTES));
        assert_eq!(
            policy.check(&long),
            Err(PasswordViolation::TooLong(MAX_PASSWORD_BYTES))
        );
    }

    #[test]
    fn test_policy_is_configurable() {
        let relaxed = PasswordPolicy::default()
            .min_length(12)
            .require_special(false);

        assert_eq!(
            relaxed.check("Password12"),
            Err(PasswordViolation::TooShort(12))
        );
        assert!(relaxed.check("Password1234").is_ok());
    }

    #[test]
    fn test_violation_messages() {
        assert_eq!(
            PasswordViolation::TooShort(8).to_string(),
            "Password must be at least 8 characters"
        );
        assert_eq!(
            PasswordViolation::MissingSpecial.to_string(),
            "Password must contain at least one special character"
        );
    }
}
