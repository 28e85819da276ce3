use crate::identity::{Identity, OpaqueToken, Role};
use crate::quiz::Quiz;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Page {
    #[default]
    Login,
    Dashboard,
    Quiz,
}

/// Per-chat state carried from one page to the next.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Session {
    pub page: Page,
    pub user_id: String,
    pub role: Role,
    pub display_name: String,
    pub email: String,
    pub credentials: Option<OpaqueToken>,
    /// `state` of an external login waiting for its redirect.
    pub pending_login: Option<String>,
    pub quiz: Quiz,
}

impl Session {
    pub fn sign_in(&mut self, identity: Identity, credentials: Option<OpaqueToken>) {
        self.user_id = identity.user_id;
        self.role = identity.role;
        self.display_name = identity.display_name;
        self.email = identity.email;
        self.credentials = credentials;
        self.pending_login = None;
        self.page = Page::Dashboard;
    }
}
