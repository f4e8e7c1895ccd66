//! Document tree state machine.

use super::DocumentPath;
use super::protocol::{CHANGED, CreateRequest, PathRequest, RawNode, ReplaceRequest, WriteRequest};
use serde::Serialize;
use std::collections::HashMap;
use tessera_primitive::local::{PrimitiveService, ServiceContext, ServiceResponse};
use tessera_primitive::{Operation, Ordering, PrimitiveError, PrimitiveEvent, PrimitiveResult};
use tessera_types::{Version, Versioned};
use tracing::{debug, warn};

struct Node {
    value: Option<Vec<u8>>,
    version: Version,
    /// Child names in creation order.
    children: Vec<String>,
}

impl Node {
    fn new(value: Option<Vec<u8>>, version: Version) -> Self {
        Self {
            value,
            version,
            children: Vec::new(),
        }
    }

    fn raw(&self) -> RawNode {
        self.value
            .as_ref()
            .map(|value| Versioned::new(value.clone(), self.version))
    }
}

/// State machine backing [`DOCUMENT_TREE_TYPE`](super::DOCUMENT_TREE_TYPE)
/// and its ordered variants.
///
/// The root node always exists and never carries a value.
pub struct DocumentTreeService {
    ordering: Option<Ordering>,
    nodes: HashMap<DocumentPath, Node>,
    version: Version,
}

impl DocumentTreeService {
    pub fn new(ordering: Option<Ordering>) -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(DocumentPath::root(), Node::new(None, Version::INITIAL));
        Self {
            ordering,
            nodes,
            version: Version::INITIAL,
        }
    }

    pub fn ordering(&self) -> Option<Ordering> {
        self.ordering
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn next_version(&mut self) -> Version {
        self.version = self.version.next();
        self.version
    }

    fn get(&self, path: &DocumentPath) -> RawNode {
        self.nodes.get(path).and_then(Node::raw)
    }

    fn set(&mut self, path: &DocumentPath, value: Vec<u8>) -> PrimitiveResult<RawNode> {
        let parent = writable_parent("set", path)?;
        if !self.nodes.contains_key(&parent) {
            return Err(PrimitiveError::rejected(
                "set",
                format!("parent of {path} does not exist"),
            ));
        }
        let version = self.next_version();
        if let Some(node) = self.nodes.get_mut(path) {
            let previous = node.raw();
            node.value = Some(value);
            node.version = version;
            return Ok(previous);
        }
        self.insert(&parent, path, Some(value), version);
        Ok(None)
    }

    fn create(&mut self, request: CreateRequest) -> PrimitiveResult<bool> {
        let CreateRequest {
            path,
            value,
            recursive,
        } = request;
        let parent = writable_parent("create", &path)?;
        if self.nodes.contains_key(&path) {
            return Ok(false);
        }
        if !self.nodes.contains_key(&parent) {
            if !recursive {
                return Err(PrimitiveError::rejected(
                    "create",
                    format!("parent of {path} does not exist"),
                ));
            }
            self.create_ancestors(&parent);
        }
        let version = self.next_version();
        self.insert(&parent, &path, Some(value), version);
        Ok(true)
    }

    /// Creates every missing node from the root down to `path`, without values.
    fn create_ancestors(&mut self, path: &DocumentPath) {
        let mut missing = Vec::new();
        let mut current = Some(path.clone());
        while let Some(candidate) = current {
            if self.nodes.contains_key(&candidate) {
                break;
            }
            current = candidate.parent();
            missing.push(candidate);
        }
        for ancestor in missing.into_iter().rev() {
            if let Some(parent) = ancestor.parent() {
                let version = self.next_version();
                self.insert(&parent, &ancestor, None, version);
            }
        }
    }

    fn replace(&mut self, request: ReplaceRequest) -> PrimitiveResult<bool> {
        writable_parent("replace", &request.path)?;
        let Some(current) = self.nodes.get(&request.path).map(|node| node.version) else {
            return Ok(false);
        };
        if current != request.version {
            return Ok(false);
        }
        let version = self.next_version();
        if let Some(node) = self.nodes.get_mut(&request.path) {
            node.value = Some(request.value);
            node.version = version;
        }
        Ok(true)
    }

    fn remove(&mut self, path: &DocumentPath) -> PrimitiveResult<RawNode> {
        let parent = writable_parent("remove", path)?;
        let Some(node) = self.nodes.get(path) else {
            return Ok(None);
        };
        if !node.children.is_empty() {
            return Err(PrimitiveError::rejected(
                "remove",
                format!("{path} has {} children", node.children.len()),
            ));
        }
        let removed = self.nodes.remove(path).and_then(|node| node.raw());
        if let (Some(parent), Some(name)) = (self.nodes.get_mut(&parent), path.name()) {
            parent.children.retain(|child| child != name);
        }
        Ok(removed)
    }

    fn children(&self, path: &DocumentPath) -> PrimitiveResult<Vec<(String, RawNode)>> {
        let node = self.nodes.get(path).ok_or_else(|| {
            PrimitiveError::rejected("children", format!("{path} does not exist"))
        })?;
        let mut names = node.children.clone();
        if self.ordering == Some(Ordering::Natural) {
            names.sort();
        }
        names
            .into_iter()
            .map(|name| {
                let child = path.child(&name)?;
                let raw = self.get(&child);
                Ok((name, raw))
            })
            .collect()
    }

    fn insert(
        &mut self,
        parent: &DocumentPath,
        path: &DocumentPath,
        value: Option<Vec<u8>>,
        version: Version,
    ) {
        if let (Some(parent), Some(name)) = (self.nodes.get_mut(parent), path.name()) {
            parent.children.push(name.to_string());
        }
        self.nodes.insert(path.clone(), Node::new(value, version));
    }
}

/// The parent of a writable path. The root cannot be written.
fn writable_parent(operation: &str, path: &DocumentPath) -> PrimitiveResult<DocumentPath> {
    path.parent()
        .ok_or_else(|| PrimitiveError::rejected(operation, "the root node cannot be modified"))
}

fn respond<T: Serialize>(
    context: &ServiceContext<'_>,
    path: &DocumentPath,
    result: PrimitiveResult<T>,
    changed: impl FnOnce(&T) -> bool,
) -> ServiceResponse {
    if let Ok(value) = &result {
        if changed(value) {
            match PrimitiveEvent::encode(CHANGED, path) {
                Ok(event) => context.publish(event),
                Err(e) => warn!(%path, "failed to encode change event: {e}"),
            }
        }
    }
    ServiceResponse::from_result(result)
}

impl PrimitiveService for DocumentTreeService {
    fn apply(
        &mut self,
        context: &mut ServiceContext<'_>,
        operation: &Operation,
    ) -> ServiceResponse {
        let name = operation.id().name();
        match name {
            "get" => match operation.decode::<PathRequest>() {
                Ok(request) => ServiceResponse::ok(&self.get(&request.path)),
                Err(e) => ServiceResponse::err(e),
            },
            "children" => match operation.decode::<PathRequest>() {
                Ok(request) => ServiceResponse::from_result(self.children(&request.path)),
                Err(e) => ServiceResponse::err(e),
            },
            "set" => match operation.decode::<WriteRequest>() {
                Ok(WriteRequest { path, value }) => {
                    let result = self.set(&path, value);
                    debug!(%path, session = %context.session(), ok = result.is_ok(), "tree set");
                    respond(context, &path, result, |_| true)
                }
                Err(e) => ServiceResponse::err(e),
            },
            "create" => match operation.decode::<CreateRequest>() {
                Ok(request) => {
                    let path = request.path.clone();
                    let result = self.create(request);
                    debug!(%path, session = %context.session(), created = ?result.as_ref().ok(), "tree create");
                    respond(context, &path, result, |created| *created)
                }
                Err(e) => ServiceResponse::err(e),
            },
            "replace" => match operation.decode::<ReplaceRequest>() {
                Ok(request) => {
                    let path = request.path.clone();
                    let result = self.replace(request);
                    respond(context, &path, result, |replaced| *replaced)
                }
                Err(e) => ServiceResponse::err(e),
            },
            "remove" => match operation.decode::<PathRequest>() {
                Ok(request) => {
                    let result = self.remove(&request.path);
                    debug!(path = %request.path, session = %context.session(), "tree remove");
                    respond(context, &request.path, result, |removed| removed.is_some())
                }
                Err(e) => ServiceResponse::err(e),
            },
            other => ServiceResponse::err(PrimitiveError::UnknownOperation(other.to_string())),
        }
    }
}
