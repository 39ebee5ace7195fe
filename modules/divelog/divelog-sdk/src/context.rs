use uuid::Uuid;

/// Identity of an authenticated caller.
///
/// Built from a validated session token; `session_version` is the counter
/// snapshot the token was issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityContext {
    subject_id: Uuid,
    session_version: i64,
}

impl SecurityContext {
    #[must_use]
    pub fn new(subject_id: Uuid, session_version: i64) -> Self {
        Self {
            subject_id,
            session_version,
        }
    }

    /// The authenticated user's id.
    #[must_use]
    pub fn subject_id(&self) -> Uuid {
        self.subject_id
    }

    #[must_use]
    pub fn session_version(&self) -> i64 {
        self.session_version
    }
}
