use super::ItemId;

/// One entry of the scene tree.
///
/// Nodes reference their primitive, parent and children by id only. The root
/// node carries no primitive.
#[derive(Debug, Clone)]
pub struct SceneNode<T> {
    item: Option<ItemId>,
    parent: Option<ItemId>,
    children: Vec<ItemId>,
    global: T,
    /// Primitive version seen by the last recompute. `None` until the first one.
    stamp: Option<u64>,
}

impl<T: Copy> SceneNode<T> {
    pub(crate) fn root(identity: T) -> Self {
        Self {
            item: None,
            parent: None,
            children: Vec::new(),
            global: identity,
            stamp: None,
        }
    }

    pub(crate) fn new(item: ItemId, parent: Option<ItemId>, identity: T) -> Self {
        Self {
            item: Some(item),
            parent,
            children: Vec::new(),
            global: identity,
            stamp: None,
        }
    }

    pub fn item(&self) -> Option<ItemId> {
        self.item
    }

    /// Parent id, or `None` when attached directly under the root.
    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    pub fn global_transform(&self) -> T {
        self.global
    }

    pub fn stamp(&self) -> Option<u64> {
        self.stamp
    }

    pub(crate) fn attach_child(&mut self, child: ItemId) {
        self.children.push(child);
    }

    pub(crate) fn detach_child(&mut self, child: ItemId) {
        self.children.retain(|&c| c != child);
    }

    pub(crate) fn take_children(&mut self) -> Vec<ItemId> {
        std::mem::take(&mut self.children)
    }

    pub(crate) fn clear_children(&mut self) {
        self.children.clear();
    }

    pub(crate) fn update(&mut self, global: T, version: u64) {
        self.global = global;
        self.stamp = Some(version);
    }
}
