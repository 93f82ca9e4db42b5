use chrono::{DateTime, Utc};

/// The bearer token bound to the current browser session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    /// `None` when the expiry is enforced by the browser and not visible to us.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn session_without_known_expiry_never_expires_locally() {
        let session = Session {
            token: "t".to_string(),
            expires_at: None,
        };
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn session_past_expiry_is_expired() {
        let now = Utc::now();
        let session = Session {
            token: "t".to_string(),
            expires_at: Some(now - Duration::seconds(1)),
        };
        assert!(session.is_expired(now));
        assert!(!Session { expires_at: Some(now + Duration::minutes(30)), ..session }.is_expired(now));
    }
}
