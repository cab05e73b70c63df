//! Email address parsing (RFC 5322 §3.4) and owner matching.

/// A parsed email address.
///
/// # Examples
/// - `"Juan García <juan@ejemplo.com>"` → `display_name = "Juan García"`, `address = "juan@ejemplo.com"`
/// - `"user@example.com"` → `display_name = ""`, `address = "user@example.com"`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailAddress {
    /// Human-readable display name (may be empty).
    pub display_name: String,
    /// The bare email address (`user@domain`).
    pub address: String,
}

impl EmailAddress {
    /// Parse a single email address from a (decoded) header value.
    ///
    /// Supported formats:
    /// - `"user@domain.com"`
    /// - `"<user@domain.com>"`
    /// - `"Display Name <user@domain.com>"`
    /// - `"\"Display, Name\" <user@domain.com>"`
    /// - `"user@domain.com (Display Name)"`
    ///
    /// Anything else is kept verbatim as `address`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }

        if let (Some(open), Some(close)) = (trimmed.rfind('<'), trimmed.rfind('>')) {
            if close > open {
                return Self {
                    display_name: strip_quotes(&trimmed[..open]),
                    address: trimmed[open + 1..close].trim().to_string(),
                };
            }
        }

        // RFC 5322 comment form: the trailing `(...)` is a name, not part of the address.
        if let Some(inner) = trimmed.strip_suffix(')') {
            if let Some(open) = inner.rfind('(') {
                let address = inner[..open].trim();
                if !address.is_empty() {
                    return Self {
                        display_name: inner[open + 1..].trim().to_string(),
                        address: address.to_string(),
                    };
                }
            }
        }

        Self {
            display_name: String::new(),
            address: trimmed.to_string(),
        }
    }

    /// `true` when no address could be recovered from the header.
    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
    }

    /// Compare bare addresses, ignoring case and display names.
    ///
    /// Two empty addresses never match: a message without an author is
    /// nobody's reply.
    pub fn same_person(&self, other: &EmailAddress) -> bool {
        !self.is_empty() && self.address.eq_ignore_ascii_case(&other.address)
    }
}

/// Strip surrounding double-quotes and trim whitespace.
fn strip_quotes(s: &str) -> String {
    let trimmed = s.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}
