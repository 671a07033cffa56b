use super::vdom::VNode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single surface update. Paths are child indices from the surface
/// container; for `CreateNode` the last index is the insertion point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Patch {
    ReplaceChildren { path: Vec<usize>, children: Vec<VNode> },
    CreateNode { path: Vec<usize>, node: VNode },
    RemoveNode { path: Vec<usize> },
    ReplaceNode { path: Vec<usize>, node: VNode },
    UpdateAttributes { path: Vec<usize>, attributes: BTreeMap<String, String> },
    UpdateText { path: Vec<usize>, content: String },
}

/// Diff two child lists rendered into the same container.
///
/// Ids are ignored: only what a surface can observe is compared. Removals
/// are emitted last-first so each path is valid when its patch is applied.
pub fn diff_children(old: &[VNode], new: &[VNode], path: &[usize]) -> Vec<Patch> {
    let mut patches = Vec::new();

    let common = old.len().min(new.len());
    for i in 0..common {
        let mut child_path = path.to_vec();
        child_path.push(i);
        patches.extend(diff_vnode(&old[i], &new[i], child_path));
    }

    for (i, node) in new.iter().enumerate().skip(common) {
        let mut child_path = path.to_vec();
        child_path.push(i);
        patches.push(Patch::CreateNode {
            path: child_path,
            node: node.clone(),
        });
    }

    for i in (common..old.len()).rev() {
        let mut child_path = path.to_vec();
        child_path.push(i);
        patches.push(Patch::RemoveNode { path: child_path });
    }

    patches
}

fn diff_vnode(old: &VNode, new: &VNode, path: Vec<usize>) -> Vec<Patch> {
    let mut patches = Vec::new();

    match (old, new) {
        (
            VNode::Element {
                tag: old_tag,
                attributes: old_attrs,
                children: old_children,
                ..
            },
            VNode::Element {
                tag: new_tag,
                attributes: new_attrs,
                children: new_children,
                ..
            },
        ) => {
            if old_tag != new_tag {
                // Tag changed - replace entire node
                patches.push(Patch::ReplaceNode {
                    path,
                    node: new.clone(),
                });
                return patches;
            }

            if old_attrs != new_attrs {
                patches.push(Patch::UpdateAttributes {
                    path: path.clone(),
                    attributes: new_attrs.clone(),
                });
            }

            patches.extend(diff_children(old_children, new_children, &path));
        }
        (VNode::Text { content: old_text, .. }, VNode::Text { content: new_text, .. }) => {
            if old_text != new_text {
                patches.push(Patch::UpdateText {
                    path,
                    content: new_text.clone(),
                });
            }
        }
        _ => {
            // Different types - replace entire node
            patches.push(Patch::ReplaceNode {
                path,
                node: new.clone(),
            });
        }
    }

    patches
}
