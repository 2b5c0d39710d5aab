use serde::{Deserialize, Serialize};

/// Who is calling a session operation.
///
/// Authenticated callers carry a user id (and optionally the display name of
/// their profile); guests carry a client-generated guest id and the nickname
/// they chose.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub authenticated_user_id: Option<String>,
    pub guest_id: Option<String>,
    pub guest_username: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,
}

impl CallerIdentity {
    pub fn user(user_id: impl Into<String>, profile_name: Option<&str>) -> Self {
        Self {
            authenticated_user_id: Some(user_id.into()),
            profile_name: profile_name.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn guest(guest_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            guest_id: Some(guest_id.into()),
            guest_username: Some(username.into()),
            ..Default::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated_user_id.is_some()
    }

    /// First non-blank name among the supplied nickname, the profile name and
    /// the guest username.
    pub fn resolve_nickname(&self, supplied: Option<&str>) -> Option<String> {
        [
            supplied,
            self.profile_name.as_deref(),
            self.guest_username.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
    }
}
