use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;

use crate::{
    mesh::Mesh,
    packed::PackedScene,
    physics::{ColliderShape, PhysicsBody},
    transform::Transform,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("node {0:?} does not exist")]
    MissingNode(NodeId),
    #[error("node {0:?} cannot be attached to itself")]
    AttachToSelf(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCreateCycle { parent: NodeId, child: NodeId },
    #[error("packed scene {0} has no nodes")]
    EmptyScene(String),
}

#[derive(Debug, Clone, Serialize)]
pub enum NodeKind {
    /// Plain grouping node without a transform of its own (level and world roots)
    Group,
    Spatial,
    Mesh(Mesh),
    Body(PhysicsBody),
    Collider(ColliderShape),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    // Serialization root. Never an ownership edge.
    owner: Option<NodeId>,
    // Set on the root of an instantiated packed scene
    scene_source: Option<Rc<PackedScene>>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    pub fn scene_source(&self) -> Option<&Rc<PackedScene>> {
        self.scene_source.as_ref()
    }
}

/// Arena holding every node built during an import.
///
/// Slots are never reused, so a `NodeId` of a removed node stays invalid
/// instead of silently pointing at a newer node.
#[derive(Debug, Default)]
pub struct SceneTree {
    slots: Vec<Option<Node>>,
    alive: usize,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        self.spawn_with_transform(name, Transform::default(), kind)
    }

    pub fn spawn_with_transform(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Some(Node {
            name: name.into(),
            transform,
            kind,
            parent: None,
            children: Vec::new(),
            owner: None,
            scene_source: None,
        }));
        self.alive += 1;
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.get(id).ok_or(SceneError::MissingNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.get_mut(id).ok_or(SceneError::MissingNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.alive
    }

    pub fn is_empty(&self) -> bool {
        self.alive == 0
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    pub fn owner(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::owner)
    }

    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> Result<(), SceneError> {
        self.node_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.node_mut(id)?.transform = transform;
        Ok(())
    }

    /// Marks `id` as the root of an already-persisted unit.
    pub fn set_scene_source(
        &mut self,
        id: NodeId,
        scene: Rc<PackedScene>,
    ) -> Result<(), SceneError> {
        self.node_mut(id)?.scene_source = Some(scene);
        Ok(())
    }

    pub fn is_persisted_unit(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.scene_source.is_some())
    }

    fn is_ancestor(&self, ancestor: NodeId, mut id: NodeId) -> bool {
        while let Some(parent) = self.parent(id) {
            if parent == ancestor {
                return true;
            }
            id = parent;
        }
        false
    }

    /// Removes `child` from its parent and clears its owner.
    pub fn detach(&mut self, child: NodeId) -> Result<(), SceneError> {
        let node = self.node_mut(child)?;
        let old_parent = node.parent.take();
        node.owner = None;
        if let Some(parent) = old_parent {
            if let Some(p) = self.get_mut(parent) {
                p.children.retain(|&c| c != child);
            }
        }
        Ok(())
    }

    /// Re-parents `child` under `parent` and propagates ownership.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if parent == child {
            return Err(SceneError::AttachToSelf(child));
        }
        self.node(parent)?;
        if self.is_ancestor(child, parent) {
            return Err(SceneError::WouldCreateCycle { parent, child });
        }
        if self.node(child)?.parent.is_some() {
            self.detach(child)?;
        }

        self.node_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.take_ownership(parent, child);
        Ok(())
    }

    // Every node of the attached subtree is serialized with the parent's
    // scene, except nodes owned by a nested persisted unit: re-owning those
    // would inline the unit instead of keeping it a reference.
    fn take_ownership(&mut self, parent: NodeId, child: NodeId) {
        let scene_owner = self.owner(parent).unwrap_or(parent);
        let mut stack = vec![child];
        while let Some(id) = stack.pop() {
            let current = self.owner(id);
            let keep = current.is_some_and(|o| o != scene_owner && self.is_persisted_unit(o));
            if let Some(node) = self.get_mut(id) {
                if !keep {
                    node.owner = Some(scene_owner);
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    /// First descendant of `root` named `name`, depth-first preorder.
    /// `root` itself is not considered.
    pub fn find_descendant(&self, root: NodeId, name: &str) -> Option<NodeId> {
        for &child in self.children(root) {
            if self.name(child) == Some(name) {
                return Some(child);
            }
            if let Some(found) = self.find_descendant(child, name) {
                return Some(found);
            }
        }
        None
    }

    /// `root` followed by all of its descendants, preorder
    pub fn walk(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Destroys `root` and everything below it.
    pub fn remove_subtree(&mut self, root: NodeId) -> Result<usize, SceneError> {
        self.detach(root)?;
        let ids = self.walk(root);
        for id in &ids {
            if let Some(slot) = self.slots.get_mut(id.0) {
                if slot.take().is_some() {
                    self.alive -= 1;
                }
            }
        }
        Ok(ids.len())
    }
}
