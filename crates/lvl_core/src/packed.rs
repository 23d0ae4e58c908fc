use std::rc::Rc;

use serde::{Serialize, Serializer};

use crate::{
    transform::Transform,
    tree::{NodeId, NodeKind, SceneError, SceneTree},
};

/// Persisted, instantiable snapshot of a subtree.
///
/// Nodes are stored preorder, so a parent index is always smaller than the
/// index of its children. Roots of nested persisted units are stored as a
/// reference to that unit rather than inlined.
#[derive(Debug, Default, Serialize)]
pub struct PackedScene {
    pub path: String,
    nodes: Vec<PackedNode>,
}

#[derive(Debug, Serialize)]
pub struct PackedNode {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub parent: Option<usize>,
    #[serde(serialize_with = "serialize_instance")]
    pub instance: Option<Rc<PackedScene>>,
}

fn serialize_instance<S: Serializer>(
    instance: &Option<Rc<PackedScene>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    instance.as_ref().map(|scene| scene.path.as_str()).serialize(serializer)
}

impl PackedScene {
    /// Packs `root` and every descendant it owns.
    pub fn pack(
        tree: &SceneTree,
        root: NodeId,
        path: impl Into<String>,
    ) -> Result<Self, SceneError> {
        let mut scene = PackedScene {
            path: path.into(),
            nodes: Vec::new(),
        };
        let root_node = tree.get(root).ok_or(SceneError::MissingNode(root))?;
        scene.nodes.push(PackedNode {
            name: root_node.name.clone(),
            transform: root_node.transform,
            kind: root_node.kind.clone(),
            parent: None,
            instance: None,
        });
        scene.pack_children(tree, root, root, 0);
        Ok(scene)
    }

    fn pack_children(&mut self, tree: &SceneTree, root: NodeId, id: NodeId, index: usize) {
        for &child in tree.children(id) {
            let Some(node) = tree.get(child) else {
                continue;
            };
            // Nodes not owned by this scene belong to someone else
            if node.owner() != Some(root) {
                continue;
            }
            let child_index = self.nodes.len();
            match node.scene_source() {
                Some(source) => {
                    self.nodes.push(PackedNode {
                        name: node.name.clone(),
                        transform: node.transform,
                        kind: NodeKind::Group,
                        parent: Some(index),
                        instance: Some(Rc::clone(source)),
                    });
                }
                None => {
                    self.nodes.push(PackedNode {
                        name: node.name.clone(),
                        transform: node.transform,
                        kind: node.kind.clone(),
                        parent: Some(index),
                        instance: None,
                    });
                    self.pack_children(tree, root, child, child_index);
                }
            }
        }
    }

    pub fn nodes(&self) -> &[PackedNode] {
        &self.nodes
    }

    /// Builds a fresh copy of this scene in `tree` and returns its root.
    /// The root is marked with this scene as its source.
    pub fn instantiate(self: &Rc<Self>, tree: &mut SceneTree) -> Result<NodeId, SceneError> {
        if self.nodes.is_empty() {
            return Err(SceneError::EmptyScene(self.path.clone()));
        }

        let mut ids: Vec<NodeId> = Vec::with_capacity(self.nodes.len());
        for packed in &self.nodes {
            let id = match &packed.instance {
                Some(nested) => {
                    let id = nested.instantiate(tree)?;
                    tree.rename(id, packed.name.clone())?;
                    tree.set_transform(id, packed.transform)?;
                    id
                }
                None => tree.spawn_with_transform(
                    packed.name.clone(),
                    packed.transform,
                    packed.kind.clone(),
                ),
            };
            if let Some(parent) = packed.parent {
                tree.attach(ids[parent], id)?;
            }
            ids.push(id);
        }

        let root = ids[0];
        tree.set_scene_source(root, Rc::clone(self))?;
        Ok(root)
    }
}
