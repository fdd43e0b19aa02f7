//! Growing the binding tree from declared paths.

use alloc::boxed::Box;

use super::Session;
use crate::{
    BindError, Error, Nested, PathElement, Scalar, Source, StructureKind, display_path,
    path::OUT_OF_RANGE,
    tree::{BindingTree, Callback, NodeId},
};

impl<'cb, S: Source> Session<'_, 'cb, S> {
    /// Binds `destination` to `path`. When the scan reaches the path, the
    /// value there is decoded as `T` and stored.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if the path is already bound, passes through
    /// a bound value, or conflicts with the container kinds registered so
    /// far. An index built from a negative integer is
    /// [`BindError::IndexOutOfRange`].
    pub fn bind_variable<T>(
        &mut self,
        path: impl AsRef<[PathElement]>,
        destination: &'cb mut T,
    ) -> Result<(), BindError>
    where
        T: Scalar + 'cb,
    {
        self.bind_callback(path, move |nested| {
            *destination = nested.decode()?;
            Ok(())
        })
    }

    /// Binds `callback` to `path`. When the scan reaches the path, the
    /// callback is invoked with a [`Nested`] handle positioned at the value.
    ///
    /// # Errors
    ///
    /// Same as [`bind_variable`](Self::bind_variable).
    pub fn bind_callback<F>(
        &mut self,
        path: impl AsRef<[PathElement]>,
        callback: F,
    ) -> Result<(), BindError>
    where
        F: FnMut(&mut Nested<'_, S>) -> Result<(), Error> + 'cb,
    {
        let path = path.as_ref();
        insert(&mut self.tree, path, Box::new(callback))?;
        tracing::debug!(path = %display_path(path), "bound");
        Ok(())
    }
}

/// Walks `path` from the root, creating or promoting nodes as the elements
/// require, and hangs `callback` in the final slot.
fn insert<'cb, S>(
    tree: &mut BindingTree<'cb, S>,
    path: &[PathElement],
    callback: Callback<'cb, S>,
) -> Result<NodeId, BindError> {
    if let Some(depth) = path
        .iter()
        .position(|element| *element == PathElement::Index(OUT_OF_RANGE))
    {
        return Err(BindError::IndexOutOfRange {
            path: display_path(path),
            depth,
        });
    }

    // `parent` and the element leading out of it name the slot `node` sits in.
    let mut parent: Option<(NodeId, &PathElement)> = None;
    let mut node = Some(NodeId::ROOT);

    for (depth, element) in path.iter().enumerate() {
        let implied = element.structure();
        let id = match node {
            Some(id) => {
                reconcile(tree, id, implied).map_err(|conflict| conflict.into_error(path, depth))?;
                id
            }
            None => {
                let Some((slot_parent, slot)) = parent else {
                    unreachable!("only the root slot has no parent, and it is never empty");
                };
                let id = tree.alloc_container(slot_parent, implied);
                tree.set_slot(slot_parent, slot, id);
                id
            }
        };
        node = tree.slot(id, element);
        parent = Some((id, element));
    }

    if node.is_some() {
        return Err(BindError::AlreadyBound {
            path: display_path(path),
        });
    }
    let Some((slot_parent, slot)) = parent else {
        unreachable!("an empty path ends at the root, which always exists");
    };
    let leaf = tree.alloc_leaf(slot_parent, callback);
    tree.set_slot(slot_parent, slot, leaf);
    Ok(leaf)
}

enum Conflict {
    Leaf,
    Kind {
        existing: StructureKind,
        requested: StructureKind,
    },
}

impl Conflict {
    fn into_error(self, path: &[PathElement], depth: usize) -> BindError {
        let path = display_path(path);
        match self {
            Conflict::Leaf => BindError::ThroughLeaf { path, depth },
            Conflict::Kind {
                existing,
                requested,
            } => BindError::KindConflict {
                path,
                depth,
                existing,
                requested,
            },
        }
    }
}

/// Makes the node at `id` able to take an element implying `implied`.
fn reconcile<S>(
    tree: &mut BindingTree<'_, S>,
    id: NodeId,
    implied: StructureKind,
) -> Result<(), Conflict> {
    match (tree.kind(id), implied) {
        (StructureKind::Callback, _) => Err(Conflict::Leaf),
        (StructureKind::Incomplete, StructureKind::Array | StructureKind::Object) => {
            tracing::trace!(kind = %implied, "promoting incomplete node");
            tree.promote(id, implied).map_err(|_| Conflict::Leaf)
        }
        (_, StructureKind::Incomplete) => Ok(()),
        (existing, requested) if existing == requested => Ok(()),
        (existing, requested) => Err(Conflict::Kind {
            existing,
            requested,
        }),
    }
}
