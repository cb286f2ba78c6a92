//! Session cookie serialization.

/// Builds `Set-Cookie` values for the session cookie.
///
/// Every cookie carries `Path=/; HttpOnly; Secure; SameSite=Lax`. A clearing
/// cookie has an empty value and `Max-Age=0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookie {
    name: String,
}

impl SessionCookie {
    /// Create a cookie builder for the given cookie name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The cookie name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie carrying `sid` that lives for `max_age_secs`.
    pub fn issue(&self, sid: &str, max_age_secs: i64) -> String {
        format!(
            "{}={sid}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Lax",
            self.name,
            max_age_secs.max(0)
        )
    }

    /// Cookie that removes the session from the client.
    pub fn clear(&self) -> String {
        self.issue("", 0)
    }
}
