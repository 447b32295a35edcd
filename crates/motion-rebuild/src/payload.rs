// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Motion payload cloning.
//!
//! | Source payload | Clone |
//! |---|---|
//! | Clip | shared `Arc` if the clip library resolves it, otherwise dropped |
//! | Blend tree | new tree, attributes copied, children cloned recursively |
//!
//! Blend trees have no back-references, so no identity map is involved.

use std::sync::Arc;

use motion_cas::ClipStore;
use motion_graph::{BlendChild, BlendTree, Motion};

use crate::ledger::{IssueKind, Ledger};

/// Clones motion payloads against a clip library.
#[derive(Clone, Copy)]
pub struct PayloadCloner<'a> {
    clips: &'a dyn ClipStore,
}

impl<'a> PayloadCloner<'a> {
    /// Cloner resolving clip references in `clips`.
    pub fn new(clips: &'a dyn ClipStore) -> Self {
        Self { clips }
    }

    /// Clones `motion`. `None` means the payload was dropped (and recorded).
    ///
    /// `context` names the owning state for diagnostics.
    pub fn clone_motion(&self, motion: &Motion, ledger: &mut Ledger, context: &str) -> Option<Motion> {
        match motion {
            Motion::Clip(clip) => {
                if self.clips.has(&clip.hash) {
                    Some(Motion::Clip(Arc::clone(clip)))
                } else {
                    ledger.record(
                        IssueKind::PayloadFieldSkipped,
                        format!(
                            "{context}: clip {:?} ({}) is not in the clip library; motion left empty",
                            clip.name, clip.hash
                        ),
                    );
                    None
                }
            }
            Motion::BlendTree(tree) => Some(Motion::BlendTree(Box::new(
                self.clone_blend_tree(tree, ledger, context),
            ))),
        }
    }

    /// Deep-copies `tree`. Dangling children keep their slot with no motion.
    pub fn clone_blend_tree(&self, tree: &BlendTree, ledger: &mut Ledger, context: &str) -> BlendTree {
        let children = tree
            .children
            .iter()
            .enumerate()
            .map(|(index, child)| {
                let slot = format!("{context}/{}[{index}]", tree.name);
                self.clone_blend_child(child, ledger, &slot)
            })
            .collect();
        BlendTree {
            name: tree.name.clone(),
            blend_type: tree.blend_type,
            blend_parameter: tree.blend_parameter.clone(),
            blend_parameter_y: tree.blend_parameter_y.clone(),
            min_threshold: tree.min_threshold,
            max_threshold: tree.max_threshold,
            use_automatic_thresholds: tree.use_automatic_thresholds,
            children,
        }
    }

    fn clone_blend_child(&self, child: &BlendChild, ledger: &mut Ledger, slot: &str) -> BlendChild {
        BlendChild {
            motion: child
                .motion
                .as_ref()
                .and_then(|m| self.clone_motion(m, ledger, slot)),
            threshold: child.threshold,
            position: child.position,
            time_scale: child.time_scale,
            cycle_offset: child.cycle_offset,
            direct_blend_parameter: child.direct_blend_parameter.clone(),
            mirror: child.mirror,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use motion_cas::{clip_hash, MemoryClipStore};
    use motion_graph::BlendType;

    fn library() -> (MemoryClipStore, Motion) {
        let mut clips = MemoryClipStore::new();
        let hash = clips.put(b"walk");
        (clips, Motion::clip(hash, "Walk"))
    }

    #[test]
    fn resolvable_clip_is_shared() {
        let (clips, walk) = library();
        let mut ledger = Ledger::new();
        let cloned = PayloadCloner::new(&clips)
            .clone_motion(&walk, &mut ledger, "Base/Walk")
            .unwrap();
        assert!(Arc::ptr_eq(cloned.as_clip().unwrap(), walk.as_clip().unwrap()));
        assert!(ledger.is_clean());
    }

    #[test]
    fn dangling_clip_is_dropped_and_counted() {
        let clips = MemoryClipStore::new();
        let mut ledger = Ledger::new();
        let dangling = Motion::clip(clip_hash(b"never stored"), "Ghost");
        let cloned = PayloadCloner::new(&clips).clone_motion(&dangling, &mut ledger, "Base/Ghost");
        assert!(cloned.is_none());
        assert_eq!(ledger.payload_fields_skipped(), 1);
    }

    #[test]
    fn nested_trees_are_new_objects_with_exact_scalars() {
        let (clips, walk) = library();
        let inner = BlendTree {
            name: "Inner".into(),
            blend_type: BlendType::FreeformCartesian2D,
            blend_parameter: "X".into(),
            blend_parameter_y: "Y".into(),
            min_threshold: -0.1,
            max_threshold: 0.3,
            use_automatic_thresholds: false,
            children: vec![BlendChild::new(Some(walk.clone()), 0.1)],
        };
        let outer = BlendTree {
            name: "Outer".into(),
            blend_parameter: "Speed".into(),
            children: vec![
                BlendChild::new(Some(Motion::BlendTree(Box::new(inner))), 0.5),
                BlendChild::new(None, 1.0),
            ],
            ..BlendTree::default()
        };
        let mut ledger = Ledger::new();
        let cloned = PayloadCloner::new(&clips).clone_blend_tree(&outer, &mut ledger, "Base/Move");
        assert_eq!(cloned, outer);
        assert!(!std::ptr::eq(&cloned, &outer));
        assert!(ledger.is_clean());
    }
}
