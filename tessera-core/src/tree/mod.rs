//! Document tree.
//!
//! A hierarchy of nodes addressed by slash-separated paths. Nodes hold
//! versioned values and list their children either sorted by name
//! ([`Ordering::Natural`]) or in creation order. The ordering is part of the
//! primitive's type, so two trees with the same name but different orderings
//! are distinct primitives.

mod async_tree;
mod blocking;
mod path;
mod protocol;
mod service;

pub use async_tree::AsyncDocumentTree;
pub use blocking::DocumentTree;
pub use path::DocumentPath;
pub use service::DocumentTreeService;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tessera_primitive::{
    OrderedKind, Ordering, PrimitiveBuilder, PrimitiveContext, PrimitiveKind, PrimitiveResult,
    PrimitiveType,
};
use tokio::runtime::Handle;

pub const DOCUMENT_TREE_TYPE: PrimitiveType = PrimitiveType::new("document-tree");

/// Values storable in a document tree.
pub trait TreeValue: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> TreeValue for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Builder options for document trees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeOptions {
    pub ordering: Option<Ordering>,
}

/// Construction strategy for document trees holding `V`.
pub struct DocumentTreeKind<V>(PhantomData<fn() -> V>);

impl<V: TreeValue> PrimitiveKind for DocumentTreeKind<V> {
    type Options = TreeOptions;
    type Async = AsyncDocumentTree<V>;
    type Sync = DocumentTree<V>;

    fn base_type() -> PrimitiveType {
        DOCUMENT_TREE_TYPE
    }

    fn primitive_type(options: &TreeOptions) -> PrimitiveType {
        match options.ordering {
            Some(ordering) => DOCUMENT_TREE_TYPE.ordered(ordering),
            None => DOCUMENT_TREE_TYPE,
        }
    }

    fn wrap(
        context: PrimitiveContext,
        _options: &TreeOptions,
    ) -> PrimitiveResult<AsyncDocumentTree<V>> {
        AsyncDocumentTree::new(context)
    }

    fn synchronize(primitive: AsyncDocumentTree<V>, runtime: Handle) -> DocumentTree<V> {
        primitive.sync(runtime)
    }
}

impl<V: TreeValue> OrderedKind for DocumentTreeKind<V> {
    fn ordering(options: &TreeOptions) -> Option<Ordering> {
        options.ordering
    }

    fn set_ordering(options: &mut TreeOptions, ordering: Option<Ordering>) {
        options.ordering = ordering;
    }
}

/// Builder for [`DocumentTree`].
pub type DocumentTreeBuilder<V> = PrimitiveBuilder<DocumentTreeKind<V>>;
