use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// EndpointId
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{service}.{endpoint}")]
pub struct EndpointId {
    pub service: &'static str,
    pub endpoint: &'static str,
}

impl EndpointId {
    #[must_use]
    pub const fn new(service: &'static str, endpoint: &'static str) -> Self {
        Self { service, endpoint }
    }
}

///
/// RequestKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum RequestKind {
    #[display("RPC call")]
    RpcCall,
}
