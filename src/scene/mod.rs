//! Retained scene graph.
//!
//! Primitives live in an id-keyed registry; the tree structure lives in a
//! separate node table. Callers only ever hold [`ItemId`]s.
//!
//! ```text
//!   root
//!    ├── A            global(A) = local(A)
//!    │    └── B       global(B) = global(A) * local(B)
//!    └── C
//! ```
//!
//! Global transforms are recomputed for the whole tree whenever any node's
//! stamp disagrees with its primitive's version. Removing a node destroys its
//! whole subtree; children are never re-parented.

mod id;
mod node;

use std::collections::HashMap;
use std::ops::Mul;

pub use id::{IdGenerator, ItemId};
pub use node::SceneNode;

use crate::error::SceneError;

/// What the scene graph needs from a primitive.
pub trait SceneItem {
    type Transform: Copy + Mul<Output = Self::Transform>;

    fn identity() -> Self::Transform;

    /// Placement version; changes whenever the local transform may have.
    fn version(&self) -> u64;

    /// Local transform, recomputed through the primitive's own cache.
    fn local_transform(&mut self) -> Self::Transform;
}

/// One entry of a draw queue.
pub struct DrawItem<'a, P: SceneItem> {
    pub id: ItemId,
    pub item: &'a P,
    pub transform: P::Transform,
}

pub struct SceneGraph<P: SceneItem> {
    items: HashMap<ItemId, P>,
    nodes: HashMap<ItemId, SceneNode<P::Transform>>,
    root: SceneNode<P::Transform>,
}

impl<P: SceneItem> Default for SceneGraph<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: SceneItem> SceneGraph<P> {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
            nodes: HashMap::new(),
            root: SceneNode::root(P::identity()),
        }
    }

    // ============ Registry ============

    /// Registers `item` under a fresh id. The item is not drawn until it is
    /// attached with [`SceneGraph::add_item`].
    pub fn insert(&mut self, ids: &mut IdGenerator, item: P) -> ItemId {
        let id = ids.next_id();
        self.items.insert(id, item);
        id
    }

    pub fn get(&self, id: ItemId) -> Option<&P> {
        self.items.get(&id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut P> {
        self.items.get_mut(&id)
    }

    pub fn is_registered(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Detaches `id` and drops its primitive from the registry.
    pub fn discard(&mut self, id: ItemId) -> Option<P> {
        self.remove_item(id);
        self.items.remove(&id)
    }

    // ============ Tree ============

    /// Attaches `id` under `parent` (or the root). A no-op if `id` is already
    /// attached anywhere.
    pub fn add_item(&mut self, id: ItemId, parent: Option<ItemId>) -> Result<(), SceneError> {
        if !self.items.contains_key(&id) {
            return Err(SceneError::UnknownItem(id));
        }
        if self.nodes.contains_key(&id) {
            return Ok(());
        }

        match parent {
            Some(parent_id) => self
                .nodes
                .get_mut(&parent_id)
                .ok_or(SceneError::UnknownParent(parent_id))?
                .attach_child(id),
            None => self.root.attach_child(id),
        }
        self.nodes.insert(id, SceneNode::new(id, parent, P::identity()));
        log::debug!("attached {} under {:?}", id, parent);
        Ok(())
    }

    /// Detaches `id` and evicts its whole subtree from the node table.
    ///
    /// Returns the number of nodes removed. Registered primitives stay valid
    /// and can be attached again.
    pub fn remove_item(&mut self, id: ItemId) -> usize {
        let Some(node) = self.nodes.get(&id) else {
            return 0;
        };
        match node.parent() {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.detach_child(id);
                }
            }
            None => self.root.detach_child(id),
        }

        let mut removed = 0;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(mut node) = self.nodes.remove(&next) {
                pending.extend(node.take_children());
                removed += 1;
            }
        }
        log::debug!("removed {} ({} nodes)", id, removed);
        removed
    }

    /// Drops every node. The registry is kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root.clear_children();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// `true` if `id` is attached to the tree.
    pub fn contains(&self, id: ItemId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: ItemId) -> Option<&SceneNode<P::Transform>> {
        self.nodes.get(&id)
    }

    /// Parent of an attached node; `Some(None)` means the root.
    pub fn parent(&self, id: ItemId) -> Option<Option<ItemId>> {
        self.nodes.get(&id).map(SceneNode::parent)
    }

    pub fn children(&self, id: ItemId) -> Option<&[ItemId]> {
        self.nodes.get(&id).map(SceneNode::children)
    }

    pub fn root_children(&self) -> &[ItemId] {
        self.root.children()
    }

    /// Global transform as of the last recompute.
    pub fn global_transform(&self, id: ItemId) -> Option<P::Transform> {
        self.nodes.get(&id).map(SceneNode::global_transform)
    }

    // ============ Transforms ============

    fn is_stale(&self) -> bool {
        self.nodes
            .iter()
            .any(|(id, node)| node.stamp() != self.items.get(id).map(P::version))
    }

    /// Recomputes every global transform if any node is stale.
    ///
    /// Returns `true` when a recompute ran.
    pub fn update_global_transforms(&mut self) -> bool {
        if !self.is_stale() {
            return false;
        }

        let mut pending: Vec<(ItemId, P::Transform)> = self
            .root
            .children()
            .iter()
            .rev()
            .map(|&id| (id, P::identity()))
            .collect();

        while let Some((id, parent_global)) = pending.pop() {
            let Some(item) = self.items.get_mut(&id) else {
                continue;
            };
            let global = parent_global * item.local_transform();
            let version = item.version();
            if let Some(node) = self.nodes.get_mut(&id) {
                node.update(global, version);
                pending.extend(node.children().iter().rev().map(|&child| (child, global)));
            }
        }
        log::trace!("recomputed {} global transforms", self.nodes.len());
        true
    }

    /// Every attached primitive with its global transform.
    ///
    /// Order follows the node table and is unspecified; callers sort.
    pub fn draw_queue(&mut self) -> Vec<DrawItem<'_, P>> {
        self.update_global_transforms();
        self.nodes
            .iter()
            .filter_map(|(id, node)| {
                let item_id = node.item()?;
                self.items.get(&item_id).map(|item| DrawItem {
                    id: *id,
                    item,
                    transform: node.global_transform(),
                })
            })
            .collect()
    }
}
