use super::{AsyncDocumentTree, DocumentPath, TreeValue};
use std::fmt;
use tessera_primitive::{AsyncPrimitive, Blocking, PrimitiveResult};
use tessera_types::{Version, Versioned};

/// Blocking document tree.
///
/// Wraps an [`AsyncDocumentTree`]; see it for the semantics of each
/// operation. Must not be used from inside an asynchronous task.
pub struct DocumentTree<V> {
    inner: Blocking<AsyncDocumentTree<V>>,
}

impl<V: TreeValue> DocumentTree<V> {
    pub(crate) fn new(inner: Blocking<AsyncDocumentTree<V>>) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.get().name()
    }

    pub fn get(&self, path: &DocumentPath) -> PrimitiveResult<Option<Versioned<V>>> {
        self.inner.wait(self.inner.get().get(path))
    }

    pub fn set(&self, path: &DocumentPath, value: &V) -> PrimitiveResult<Option<Versioned<V>>> {
        self.inner.wait(self.inner.get().set(path, value))
    }

    pub fn create(&self, path: &DocumentPath, value: &V) -> PrimitiveResult<bool> {
        self.inner.wait(self.inner.get().create(path, value))
    }

    pub fn create_recursive(&self, path: &DocumentPath, value: &V) -> PrimitiveResult<bool> {
        self.inner.wait(self.inner.get().create_recursive(path, value))
    }

    pub fn replace(&self, path: &DocumentPath, value: &V, version: Version) -> PrimitiveResult<bool> {
        self.inner.wait(self.inner.get().replace(path, value, version))
    }

    pub fn remove(&self, path: &DocumentPath) -> PrimitiveResult<Option<Versioned<V>>> {
        self.inner.wait(self.inner.get().remove(path))
    }

    pub fn children(
        &self,
        path: &DocumentPath,
    ) -> PrimitiveResult<Vec<(String, Option<Versioned<V>>)>> {
        self.inner.wait(self.inner.get().children(path))
    }

    pub fn close(&self) -> PrimitiveResult<()> {
        self.inner.wait(self.inner.get().close())
    }

    pub fn async_primitive(&self) -> &AsyncDocumentTree<V> {
        self.inner.get()
    }
}

impl<V> Clone for DocumentTree<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V> fmt::Debug for DocumentTree<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentTree")
            .field("inner", &self.inner)
            .finish()
    }
}
