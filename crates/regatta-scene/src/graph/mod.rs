pub mod animation;

use crate::mesh::Mesh;
use crate::SceneError;
use self::animation::{animation_transforms, Animation, AnimationState};
use rayon::prelude::*;
use regatta_math::*;
use std::collections::HashMap;

/// A node of the decoded scene hierarchy.
///
/// Nodes live in an arena addressed by dense index; `children` holds
/// indices into the owning model's node list. `local_bind_transform` never
/// changes after load. `animated_transform` is the one per-frame slot: it
/// is fully overwritten by [`Model::set_pose`] and read back by the
/// propagation pass within the same frame.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: usize,
    pub name: String,
    pub children: Vec<usize>,
    pub local_bind_transform: Mat4,
    pub animated_transform: Option<Mat4>,
    pub mesh: Option<usize>,
    pub skin: Option<usize>,
}

/// Joint list of one skin with the matching inverse bind matrices.
///
/// `joints[i]` corresponds to `inverse_bind_transforms[i]`; a skin decoded
/// from an asset without inverse bind data has an empty matrix list.
#[derive(Debug, Clone, Default)]
pub struct Skin {
    pub joints: Vec<usize>,
    pub inverse_bind_transforms: Vec<Mat4>,
}

/// A fully decoded model: geometry, node hierarchy, skins and animation
/// clips. Immutable after load except for each node's animated transform.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<Node>,
    pub root_node: usize,
    pub animations: HashMap<String, Animation>,
    pub skins: Vec<Skin>,
}

impl Model {
    /// Overwrites every node's animated-transform slot with this frame's
    /// sampled local transforms. Nodes absent from the map are cleared and
    /// contribute nothing to the traversal.
    pub fn set_pose(&mut self, local_transforms: &HashMap<usize, Mat4>) {
        for node in &mut self.nodes {
            node.animated_transform = local_transforms.get(&node.id).copied();
        }
    }

    /// Samples and blends the given playback state, refreshing every
    /// node's animated transform for this frame.
    pub fn update_pose(&mut self, state: &AnimationState) {
        let transforms = animation_transforms(self, state.active(), state.blend_time());
        self.set_pose(&transforms);
    }

    /// Computes one matrix per joint of `skin`, ordered by joint position.
    ///
    /// The hierarchy is walked depth-first from the model root, parent
    /// before child, accumulating each node's animated transform onto its
    /// parent's world transform. With `inverse_bind` set the result is the
    /// skinning matrix `world * inverse_bind`; without it the raw world
    /// transform, which is what bone attachments want. Joints never reached
    /// or lacking an inverse bind entry keep an identity slot.
    pub fn skin_transforms(&self, skin: &Skin, inverse_bind: bool) -> Vec<Mat4> {
        let mut applied = vec![Mat4::IDENTITY; skin.joints.len()];
        self.apply_transform(skin, self.root_node, Mat4::IDENTITY, inverse_bind, &mut applied);
        applied
    }

    /// Joint matrices for every skin of the model. Skins are independent,
    /// so they are posed in parallel.
    pub fn pose(&self, inverse_bind: bool) -> Vec<Vec<Mat4>> {
        self.skins
            .par_iter()
            .map(|skin| self.skin_transforms(skin, inverse_bind))
            .collect()
    }

    fn apply_transform(
        &self,
        skin: &Skin,
        node_index: usize,
        parent_transform: Mat4,
        inverse_bind: bool,
        applied: &mut [Mat4],
    ) {
        let node = &self.nodes[node_index];
        let world = match node.animated_transform {
            Some(local) => parent_transform * local,
            None => parent_transform,
        };

        if let Some(joint) = skin.joints.iter().position(|&j| j == node.id) {
            if inverse_bind {
                if let Some(ibt) = skin.inverse_bind_transforms.get(joint) {
                    applied[joint] = world * *ibt;
                }
            } else {
                applied[joint] = world;
            }
        }

        for &child in &node.children {
            self.apply_transform(skin, child, world, inverse_bind, applied);
        }
    }

    /// Rejects dangling node references and cycles. The traversal recurses
    /// along `children`, so the decoder runs this before handing a model
    /// out.
    pub(crate) fn validate_graph(&self) -> Result<(), SceneError> {
        let len = self.nodes.len();
        if self.root_node >= len {
            return Err(SceneError::InvalidIndex {
                kind: "node",
                index: self.root_node,
            });
        }
        for node in &self.nodes {
            for &child in &node.children {
                if child >= len {
                    return Err(SceneError::InvalidIndex {
                        kind: "node",
                        index: child,
                    });
                }
            }
        }
        for skin in &self.skins {
            for &joint in &skin.joints {
                if joint >= len {
                    return Err(SceneError::InvalidIndex {
                        kind: "joint",
                        index: joint,
                    });
                }
            }
        }

        // 0 = unvisited, 1 = on the current path, 2 = finished.
        let mut state = vec![0u8; len];
        for start in 0..len {
            if state[start] != 0 {
                continue;
            }
            let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
            state[start] = 1;
            while !stack.is_empty() {
                let last = stack.len() - 1;
                let (node, cursor) = stack[last];
                let children = &self.nodes[node].children;
                if cursor == children.len() {
                    state[node] = 2;
                    stack.pop();
                    continue;
                }
                stack[last].1 += 1;

                let child = children[cursor];
                match state[child] {
                    0 => {
                        state[child] = 1;
                        stack.push((child, 0));
                    }
                    1 => return Err(SceneError::MalformedSceneGraph(child)),
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
