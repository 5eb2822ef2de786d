//! Retained scene tree
//!
//! Nodes live in an arena and are addressed by generational [`NodeId`]s, so
//! a handle to a node that has been destroyed is detected instead of silently
//! aliasing whatever reuses the slot.
//!
//! # Coordinates
//!
//! Every node has an offset relative to its parent and a size. A point in a
//! node's local space maps to its parent's space by adding the node's offset;
//! [`Tree::map_point`] repeats that up the parent chain.
//!
//! # Hover tracking
//!
//! Each node remembers which of its children the pointer is currently over.
//! Changing that child exits the old one (and, recursively, whatever the old
//! one was hovering, deepest first) and enters the new one. The resulting
//! [`HoverTransition`]s are queued on the tree for the caller to act on.

use crate::render::{Bounds, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverChange {
    Entered,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverTransition {
    pub node: NodeId,
    pub change: HoverChange,
}

#[derive(Debug)]
pub struct Node<T> {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    hovered: Option<NodeId>,
    mouse_inside: bool,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub payload: T,
}

impl<T> Node<T> {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in paint order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Child the pointer is currently over
    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn mouse_inside(&self) -> bool {
        self.mouse_inside
    }

    /// Box in the parent's coordinate space
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    node: Option<Node<T>>,
}

#[derive(Debug)]
pub struct Tree<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    transitions: Vec<HoverTransition>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Tree {
            slots: Vec::new(),
            free: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Create a node, appended to `parent`'s children when given
    pub fn insert(&mut self, payload: T, parent: Option<NodeId>) -> NodeId {
        let node = Node {
            parent: None,
            children: Vec::new(),
            hovered: None,
            mouse_inside: false,
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            payload,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        if let Some(parent) = parent {
            self.add(parent, id);
        }
        id
    }

    /// Whether `id` still refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index as usize)
            .is_some_and(|slot| slot.generation == id.generation && slot.node.is_some())
    }

    /// Panics on a stale or foreign id
    pub fn get(&self, id: NodeId) -> &Node<T> {
        match self.slots.get(id.index as usize) {
            Some(Slot {
                generation,
                node: Some(node),
            }) if *generation == id.generation => node,
            _ => panic!("Stale scene node {:?}", id),
        }
    }

    /// Panics on a stale or foreign id
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match self.slots.get_mut(id.index as usize) {
            Some(Slot {
                generation,
                node: Some(node),
            }) if *generation == id.generation => node,
            _ => panic!("Stale scene node {:?}", id),
        }
    }

    pub fn payload(&self, id: NodeId) -> &T {
        &self.get(id).payload
    }

    pub fn payload_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.get_mut(id).payload
    }

    /// Append `child` to `parent`, detaching it from its previous parent first
    pub fn add(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.get(child).parent {
            self.remove(old, child);
        }
        self.get_mut(parent).children.push(child);
        self.get_mut(child).parent = Some(parent);
    }

    /// Detach `child` from `parent`
    ///
    /// # Panics
    ///
    /// If `child` is not currently a child of `parent`.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) {
        assert!(
            self.get(child).parent == Some(parent),
            "{:?} is not a child of {:?}",
            child,
            parent
        );
        if self.get(parent).hovered == Some(child) {
            self.set_hovered(parent, None);
        }
        self.get_mut(child).parent = None;
        self.get_mut(parent).children.retain(|c| *c != child);
    }

    /// Detach `id` from its parent and free it together with its subtree
    pub fn destroy(&mut self, id: NodeId) {
        if let Some(parent) = self.get(id).parent {
            self.remove(parent, id);
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let slot = &mut self.slots[next.index as usize];
            if let Some(node) = slot.node.take() {
                pending.extend(node.children);
            }
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(next.index);
        }
    }

    /// Translate `point` from `id`'s local space into `ancestor`'s space
    /// (root space when `ancestor` is `None`)
    ///
    /// # Panics
    ///
    /// If `ancestor` is given but is not an ancestor of `id`.
    pub fn map_point(&self, id: NodeId, mut point: Point, ancestor: Option<NodeId>) -> Point {
        let mut current = Some(id);
        while current != ancestor {
            let Some(node_id) = current else {
                panic!("{:?} is not an ancestor of {:?}", ancestor, id);
            };
            let node = self.get(node_id);
            point.x += node.x;
            point.y += node.y;
            current = node.parent;
        }
        point
    }

    /// Bounds of `id` in root space
    pub fn root_bounds(&self, id: NodeId) -> Bounds {
        let origin = self.map_point(id, Point::default(), None);
        let node = self.get(id);
        Bounds::new(origin.x, origin.y, node.width, node.height)
    }

    /// Topmost root of the tree `id` currently belongs to
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.get(current).parent {
            current = parent;
        }
        current
    }

    /// Nearest ancestor (starting at `id` itself) whose payload matches
    pub fn find_ancestor(&self, id: NodeId, pred: impl Fn(&T) -> bool) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id);
            if pred(&node.payload) {
                return Some(node_id);
            }
            current = node.parent;
        }
        None
    }

    /// `id` and all its descendants, parents before children
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            out.push(next);
            pending.extend(self.get(next).children.iter().rev());
        }
        out
    }

    /// First child (in list order) whose box contains the local `point`
    pub fn child_at(&self, id: NodeId, point: Point) -> Option<NodeId> {
        self.get(id)
            .children
            .iter()
            .copied()
            .find(|child| self.get(*child).bounds().contains(point))
    }

    /// Make `child` the hovered child of `id`, firing exit/enter transitions
    pub fn set_hovered(&mut self, id: NodeId, child: Option<NodeId>) {
        let current = self.get(id).hovered;
        if current == child {
            return;
        }
        if let Some(old) = current {
            self.exit(old);
        }
        if let Some(new) = child {
            self.get_mut(new).mouse_inside = true;
            self.transitions.push(HoverTransition {
                node: new,
                change: HoverChange::Entered,
            });
        }
        self.get_mut(id).hovered = child;
    }

    fn exit(&mut self, id: NodeId) {
        if self.get(id).hovered.is_some() {
            self.set_hovered(id, None);
        }
        self.get_mut(id).mouse_inside = false;
        self.transitions.push(HoverTransition {
            node: id,
            change: HoverChange::Exited,
        });
    }

    /// Drain transitions queued since the last call
    pub fn take_transitions(&mut self) -> Vec<HoverTransition> {
        std::mem::take(&mut self.transitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(tree: &mut Tree<&'static str>, name: &'static str, parent: Option<NodeId>, b: Bounds) -> NodeId {
        let id = tree.insert(name, parent);
        let node = tree.get_mut(id);
        node.x = b.x;
        node.y = b.y;
        node.width = b.width;
        node.height = b.height;
        id
    }

    #[test]
    fn test_add_reparents() {
        let mut tree = Tree::new();
        let a = tree.insert("a", None);
        let b = tree.insert("b", None);
        let c = tree.insert("c", Some(a));

        tree.add(b, c);
        assert!(tree.get(a).children().is_empty());
        assert_eq!(tree.get(b).children(), &[c]);
        assert_eq!(tree.get(c).parent(), Some(b));
    }

    #[test]
    #[should_panic(expected = "is not a child of")]
    fn test_remove_from_wrong_parent_panics() {
        let mut tree = Tree::new();
        let a = tree.insert("a", None);
        let b = tree.insert("b", None);
        let c = tree.insert("c", Some(a));
        tree.remove(b, c);
    }

    #[test]
    fn test_map_point_round_trip() {
        let mut tree = Tree::new();
        let root = placed(&mut tree, "root", None, Bounds::new(0, 0, 500, 500));
        let mid = placed(&mut tree, "mid", Some(root), Bounds::new(10, 20, 200, 200));
        let leaf = placed(&mut tree, "leaf", Some(mid), Bounds::new(5, 7, 50, 50));

        for p in [Point::new(0, 0), Point::new(49, 49), Point::new(12, 30)] {
            let in_root = tree.map_point(leaf, p, None);
            let origin = tree.map_point(leaf, Point::default(), None);
            assert_eq!(in_root - origin, p);

            let in_mid = tree.map_point(leaf, p, Some(mid));
            assert_eq!(in_mid, Point::new(p.x + 5, p.y + 7));
        }
        assert_eq!(tree.root_bounds(leaf), Bounds::new(15, 27, 50, 50));
    }

    #[test]
    #[should_panic(expected = "is not an ancestor")]
    fn test_map_point_to_non_ancestor_panics() {
        let mut tree = Tree::new();
        let a = tree.insert("a", None);
        let b = tree.insert("b", None);
        tree.map_point(a, Point::default(), Some(b));
    }

    #[test]
    fn test_child_at_takes_first_match() {
        let mut tree = Tree::new();
        let root = placed(&mut tree, "root", None, Bounds::new(0, 0, 100, 100));
        let first = placed(&mut tree, "first", Some(root), Bounds::new(0, 0, 50, 50));
        let _second = placed(&mut tree, "second", Some(root), Bounds::new(0, 0, 50, 50));

        assert_eq!(tree.child_at(root, Point::new(10, 10)), Some(first));
        assert_eq!(tree.child_at(root, Point::new(60, 60)), None);
    }

    #[test]
    fn test_exits_fire_deepest_first() {
        let mut tree = Tree::new();
        let root = placed(&mut tree, "root", None, Bounds::new(0, 0, 100, 100));
        let a = placed(&mut tree, "a", Some(root), Bounds::new(0, 0, 50, 50));
        let b = placed(&mut tree, "b", Some(a), Bounds::new(0, 0, 20, 20));

        tree.set_hovered(root, Some(a));
        tree.set_hovered(a, Some(b));
        tree.take_transitions();

        tree.set_hovered(root, None);
        let transitions = tree.take_transitions();
        assert_eq!(
            transitions,
            vec![
                HoverTransition {
                    node: b,
                    change: HoverChange::Exited
                },
                HoverTransition {
                    node: a,
                    change: HoverChange::Exited
                },
            ]
        );
        assert!(!tree.get(a).mouse_inside());
        assert!(!tree.get(b).mouse_inside());
        assert_eq!(tree.get(a).hovered(), None);
    }

    #[test]
    fn test_removing_hovered_child_clears_hover() {
        let mut tree = Tree::new();
        let root = tree.insert("root", None);
        let a = tree.insert("a", Some(root));
        tree.set_hovered(root, Some(a));
        tree.remove(root, a);

        assert_eq!(tree.get(root).hovered(), None);
        assert!(!tree.get(a).mouse_inside());
    }

    #[test]
    fn test_destroyed_ids_go_stale() {
        let mut tree = Tree::new();
        let root = tree.insert("root", None);
        let a = tree.insert("a", Some(root));
        let b = tree.insert("b", Some(a));

        tree.destroy(a);
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
        assert!(tree.get(root).children().is_empty());

        let reused = tree.insert("c", None);
        assert!(tree.contains(reused));
        assert!(!tree.contains(a));
        assert!(!tree.contains(b));
    }
}
