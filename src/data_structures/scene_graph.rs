//! Scene graph and hierarchical scene organization.
//!
//! A [`SceneNode`] has a local transform, optionally something to draw, and
//! children that inherit its transform. The graph is only a description:
//! [`SceneNode::collect_batches`] flattens it into world-space instance lists,
//! one per (mesh, material) pair, ready to be uploaded for instanced drawing.

use std::collections::BTreeMap;

use crate::data_structures::instance::Instance;

/// Identifies a piece of shared geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshKey {
    SkySphere,
    Ground,
    /// A 5x5 box of the given height; towers of equal height share it.
    Tower(u32),
    Ring,
}

/// Identifies a shared material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaterialKey {
    Sky,
    Ground,
    Tower,
    Ring,
}

/// What a node draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Drawable {
    pub mesh: MeshKey,
    pub material: MaterialKey,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub local: Instance,
    pub drawable: Option<Drawable>,
    pub children: Vec<SceneNode>,
}

pub type Batches = BTreeMap<Drawable, Vec<Instance>>;

impl SceneNode {
    /// An invisible node that only groups its children.
    pub fn container(name: &str) -> Self {
        Self {
            name: name.to_string(),
            local: Instance::default(),
            drawable: None,
            children: Vec::new(),
        }
    }

    pub fn mesh(name: &str, mesh: MeshKey, material: MaterialKey, local: Instance) -> Self {
        Self {
            name: name.to_string(),
            local,
            drawable: Some(Drawable { mesh, material }),
            children: Vec::new(),
        }
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    pub fn get_children(&self) -> &Vec<SceneNode> {
        &self.children
    }

    /// Visit every node depth-first together with its world transform.
    pub fn walk<'a>(&'a self, parent: &Instance, visit: &mut dyn FnMut(&'a SceneNode, &Instance)) {
        let world = parent * &self.local;
        visit(self, &world);
        for child in &self.children {
            child.walk(&world, visit);
        }
    }

    /// Group the world transforms of all drawable nodes by what they draw.
    ///
    /// Within a batch, instances keep depth-first order.
    pub fn collect_batches(&self) -> Batches {
        let mut batches = Batches::new();
        self.walk(&Instance::default(), &mut |node, world| {
            if let Some(drawable) = node.drawable {
                batches.entry(drawable).or_default().push(*world);
            }
        });
        batches
    }

    /// Total number of nodes including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::count).sum::<usize>()
    }
}
