//! Children reconciliation - the keyed double-ended differ.
//!
//! `patch_children` dispatches over the nine combinations of old and new
//! children shape (none/text/list squared). The list↔list case is the
//! algorithmic core: a four-pointer double-ended diff that recognizes
//! retained prefixes, retained suffixes and the two head↔tail move
//! patterns in O(1) each, and falls back to a keyed linear search only when
//! no positional shortcut applies. Host moves are bounded by the number of
//! out-of-order keys; the search fallback is O(n²) for adversarial
//! permutations, an accepted limit for realistic sibling counts.
//!
//! Keys are the only identity signal. Children without keys are never
//! matched by the search fallback; for fully unkeyed lists the head/tail
//! shortcuts (where `None == None`) degrade into index-based in-place
//! patching, which is correct but makes no minimal-move promise.

use crate::host::NodeRef;
use crate::renderer::Renderer;
use crate::vnode::{Children, VNode};

impl Renderer {
    /// Reconcile the children of `prev`/`next` inside `container` (the
    /// element's own host node, or the surrounding container for
    /// fragments).
    pub(crate) fn patch_children(&self, prev: &VNode, next: &VNode, container: &NodeRef) {
        match (&prev.children, &next.children) {
            (Children::Nodes(old), Children::Text(content)) => {
                for child in old {
                    self.unmount(child);
                }
                self.host.set_element_text(container, content);
            }
            (Children::Text(old), Children::Text(new)) => {
                if old != new {
                    self.host.set_element_text(container, new);
                }
            }
            (Children::None, Children::Text(new)) => {
                self.host.set_element_text(container, new);
            }
            (Children::Nodes(old), Children::Nodes(new)) => {
                self.patch_keyed_children(old, new, container);
            }
            (Children::Text(_), Children::Nodes(new)) => {
                self.host.set_element_text(container, "");
                self.mount_children(new, container, None);
            }
            (Children::None, Children::Nodes(new)) => {
                self.mount_children(new, container, None);
            }
            (Children::Nodes(old), Children::None) => {
                for child in old {
                    self.unmount(child);
                }
            }
            (Children::Text(_), Children::None) => {
                self.host.set_element_text(container, "");
            }
            (Children::None, Children::None) => {}
        }
    }

    /// The double-ended diff. Four cursors walk the two lists inwards;
    /// slots consumed out of order are nulled and skipped when a cursor
    /// reaches them (symmetrically on both ends).
    fn patch_keyed_children(&self, old: &[VNode], new: &[VNode], container: &NodeRef) {
        // Old slots are consumed destructively; the caller's list stays
        // intact because vnode clones alias their mount slots.
        let mut old_slots: Vec<Option<VNode>> = old.iter().cloned().map(Some).collect();

        let mut old_start: isize = 0;
        let mut old_end: isize = old_slots.len() as isize - 1;
        let mut new_start: isize = 0;
        let mut new_end: isize = new.len() as isize - 1;

        while old_start <= old_end && new_start <= new_end {
            // A nulled slot marks a child already matched out of order.
            let Some(old_head) = old_slots[old_start as usize].clone() else {
                old_start += 1;
                continue;
            };
            let Some(old_tail) = old_slots[old_end as usize].clone() else {
                old_end -= 1;
                continue;
            };

            let new_head = &new[new_start as usize];
            let new_tail = &new[new_end as usize];

            if old_head.key == new_head.key {
                // Retained at the head: patch in place.
                self.patch(Some(&old_head), new_head, container, None);
                old_start += 1;
                new_start += 1;
            } else if old_tail.key == new_tail.key {
                // Retained at the tail: patch in place.
                self.patch(Some(&old_tail), new_tail, container, None);
                old_end -= 1;
                new_end -= 1;
            } else if old_head.key == new_tail.key {
                // Old head became the new tail: move it behind the current
                // old tail.
                self.patch(Some(&old_head), new_tail, container, None);
                let anchor = old_tail
                    .host_node()
                    .and_then(|node| self.host.next_sibling(&node));
                if let Some(node) = new_tail.host_node() {
                    self.host.insert(&node, container, anchor.as_ref());
                }
                old_start += 1;
                new_end -= 1;
            } else if old_tail.key == new_head.key {
                // Old tail became the new head: move it in front of the
                // current old head.
                self.patch(Some(&old_tail), new_head, container, None);
                if let Some(node) = new_head.host_node() {
                    self.host
                        .insert(&node, container, old_head.host_node().as_ref());
                }
                old_end -= 1;
                new_start += 1;
            } else {
                // No positional shortcut. Search the remaining old children
                // for the new head's key - keyed children only.
                let found = new_head.key.as_ref().and_then(|key| {
                    (old_start as usize..=old_end as usize).find(|&index| {
                        old_slots[index]
                            .as_ref()
                            .is_some_and(|slot| slot.key.as_ref() == Some(key))
                    })
                });
                match found {
                    Some(index) => {
                        if let Some(matched) = old_slots[index].take() {
                            self.patch(Some(&matched), new_head, container, None);
                            if let Some(node) = new_head.host_node() {
                                self.host
                                    .insert(&node, container, old_head.host_node().as_ref());
                            }
                        }
                    }
                    None => {
                        // Genuinely new: mount in front of the current old
                        // head.
                        self.patch(None, new_head, container, old_head.host_node().as_ref());
                    }
                }
                new_start += 1;
            }
        }

        if old_start > old_end && new_start <= new_end {
            // Old side exhausted: everything left on the new side mounts,
            // anchored before the slot that follows the processed range.
            let anchor = new
                .get((new_end + 1) as usize)
                .and_then(VNode::host_node);
            for index in new_start..=new_end {
                self.patch(None, &new[index as usize], container, anchor.as_ref());
            }
        } else if new_start > new_end && old_start <= old_end {
            // New side exhausted: everything left on the old side goes.
            for index in old_start..=old_end {
                if let Some(stale) = &old_slots[index as usize] {
                    self.unmount(stale);
                }
            }
        }
    }
}
