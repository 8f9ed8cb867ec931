use serde::{Deserialize, Serialize};
use std::sync::Arc;

///
/// AuthInfo
///
/// Authentication resolved for the caller before the wrapper runs.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AuthInfo {
    pub uid: String,

    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl AuthInfo {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            data: None,
        }
    }
}

///
/// Context
///
/// Caller context threaded into begin-request and the endpoint handler.
/// Cheap to clone. Wrappers never add deadlines or cancel it; that is left
/// to the caller and the handler.
///

#[derive(Clone, Debug, Default)]
pub struct Context {
    auth: Option<Arc<AuthInfo>>,
}

impl Context {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthInfo) -> Self {
        self.auth = Some(Arc::new(auth));
        self
    }

    #[must_use]
    pub fn auth(&self) -> Option<&AuthInfo> {
        self.auth.as_deref()
    }

    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.auth().map(|auth| auth.uid.as_str())
    }
}
