//! Operations and envelopes exchanged between tree clients and the tree
//! state machine. Node values travel as bytes already encoded by the
//! client's serializer.

use super::DocumentPath;
use serde::{Deserialize, Serialize};
use tessera_primitive::OperationId;
use tessera_types::{Version, Versioned};

pub(crate) const GET: OperationId = OperationId::query("get");
pub(crate) const SET: OperationId = OperationId::command("set");
pub(crate) const CREATE: OperationId = OperationId::command("create");
pub(crate) const REPLACE: OperationId = OperationId::command("replace");
pub(crate) const REMOVE: OperationId = OperationId::command("remove");
pub(crate) const CHILDREN: OperationId = OperationId::query("children");

/// Event published with the written path after every successful write.
pub(crate) const CHANGED: &str = "changed";

/// An encoded node value, absent for missing or valueless nodes.
pub(crate) type RawNode = Option<Versioned<Vec<u8>>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PathRequest {
    pub path: DocumentPath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WriteRequest {
    pub path: DocumentPath,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateRequest {
    pub path: DocumentPath,
    pub value: Vec<u8>,
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ReplaceRequest {
    pub path: DocumentPath,
    pub value: Vec<u8>,
    pub version: Version,
}
