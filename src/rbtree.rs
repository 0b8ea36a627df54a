use log::trace;
use smallvec::SmallVec;
use std::{
    collections::VecDeque,
    error::Error,
    fmt::{self, Debug, Display},
    iter::FusedIterator,
    marker::PhantomData,
    mem,
    ptr::NonNull,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

type Link<T> = Option<NonNull<Node<T>>>;
type Parent<T> = Option<NonNull<Node<T>>>;

struct Node<T> {
    parent: Parent<T>,
    key: T,
    color: Color,
    left: Link<T>,
    right: Link<T>,
}

impl<T> Node<T> {
    fn new_with_parent(key: T, color: Color, parent: Parent<T>) -> Box<Self> {
        Box::new(Self {
            parent,
            key,
            color,
            left: None,
            right: None,
        })
    }

    fn drop_children(mut self) {
        for child in [self.left.take(), self.right.take()].into_iter().flatten() {
            let child = *unsafe { Box::from_raw(child.as_ptr()) };
            child.drop_children();
        }
    }
}

/// Absent children count as black leaves.
fn color_of<T>(link: Link<T>) -> Color {
    link.map(|n| unsafe { n.as_ref().color })
        .unwrap_or(Color::Black)
}

/// A red-black tree over totally ordered keys.
///
/// Equal keys are kept as separate nodes. A new key equal to an existing
/// one is routed into that node's left subtree, but rotations may later
/// lift a duplicate above its twin, so an equal key can sit on either side.
/// Left subtrees hold keys `<=` their ancestor, right subtrees keys `>=`.
pub struct RbTree<T: Ord> {
    root: Link<T>,
    len: usize,
    marker: PhantomData<Box<Node<T>>>,
}

impl<T: Ord> RbTree<T> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns a view of the root node, if any.
    pub fn root(&self) -> Option<NodeRef<'_, T>> {
        self.root.map(NodeRef::new)
    }

    pub fn insert(&mut self, key: T) {
        let node = self.attach(key);
        unsafe { self.insert_fixup(node) };
    }

    /// Plain BST descent. The new node is a red leaf unless it becomes the
    /// root, in which case it is black.
    fn attach(&mut self, key: T) -> NonNull<Node<T>> {
        self.len += 1;
        let Some(mut node) = self.root else {
            let root = NonNull::from(Box::leak(Node::new_with_parent(key, Color::Black, None)));
            self.root = Some(root);
            return root;
        };
        loop {
            let current = unsafe { node.as_mut() };
            let slot = if key <= current.key {
                &mut current.left
            } else {
                &mut current.right
            };
            match *slot {
                Some(child) => node = child,
                None => {
                    let leaf = Node::new_with_parent(key, Color::Red, Some(node));
                    let leaf = NonNull::from(Box::leak(leaf));
                    *slot = Some(leaf);
                    return leaf;
                }
            }
        }
    }

    /// Restores the red-black properties after `z` was attached as a red leaf.
    ///
    /// Each pass either resolves the double red outright (black uncle) or
    /// pushes it two levels up (red uncle), so the loop runs at most
    /// `height / 2` times.
    ///
    /// # Safety
    /// `z` must be a node owned by this tree.
    unsafe fn insert_fixup(&mut self, mut z: NonNull<Node<T>>) {
        loop {
            let Some(mut parent) = (unsafe { z.as_ref() }).parent else {
                break;
            };
            if unsafe { parent.as_ref() }.color == Color::Black {
                break;
            }
            let mut grandparent = unsafe { parent.as_ref() }
                .parent
                .expect("a red node is never the root");
            let parent_is_left = unsafe { grandparent.as_ref() }.left == Some(parent);
            let uncle = unsafe {
                if parent_is_left {
                    grandparent.as_ref().right
                } else {
                    grandparent.as_ref().left
                }
            };

            match uncle {
                Some(mut uncle) if color_of(Some(uncle)) == Color::Red => {
                    trace!("insert fixup: red uncle, recoloring and moving up");
                    unsafe {
                        parent.as_mut().color = Color::Black;
                        uncle.as_mut().color = Color::Black;
                        grandparent.as_mut().color = Color::Red;
                    }
                    z = grandparent;
                }
                _ => {
                    let z_is_left = unsafe { parent.as_ref() }.left == Some(z);
                    if z_is_left != parent_is_left {
                        trace!("insert fixup: black uncle, straightening triangle");
                        unsafe {
                            if parent_is_left {
                                self.rotate_left(parent);
                            } else {
                                self.rotate_right(parent);
                            }
                        }
                        mem::swap(&mut z, &mut parent);
                    }
                    trace!("insert fixup: black uncle, rotating grandparent");
                    unsafe {
                        parent.as_mut().color = Color::Black;
                        grandparent.as_mut().color = Color::Red;
                        if parent_is_left {
                            self.rotate_right(grandparent);
                        } else {
                            self.rotate_left(grandparent);
                        }
                    }
                    break;
                }
            }
        }
        if let Some(mut root) = self.root {
            unsafe { root.as_mut() }.color = Color::Black;
        }
    }

    //      p              p
    //     / \            / \
    //    x   *   ->     y   *
    //   / \            / \
    //  a   y          x   c
    //     / \        / \
    //    b   c      a   b
    unsafe fn rotate_left(&mut self, mut x: NonNull<Node<T>>) {
        let x_ref = unsafe { x.as_mut() };
        let Some(mut y) = x_ref.right else {
            panic!("rotate_left on a node without a right child");
        };
        let y_ref = unsafe { y.as_mut() };
        x_ref.right = y_ref.left;
        if let Some(mut b) = y_ref.left {
            unsafe { b.as_mut() }.parent = Some(x);
        }
        y_ref.parent = x_ref.parent;
        unsafe { self.replace_child(x_ref.parent, x, y) };
        y_ref.left = Some(x);
        x_ref.parent = Some(y);
    }

    //        p            p
    //       / \          / \
    //      y   *  ->    x   *
    //     / \          / \
    //    x   c        a   y
    //   / \              / \
    //  a   b            b   c
    unsafe fn rotate_right(&mut self, mut y: NonNull<Node<T>>) {
        let y_ref = unsafe { y.as_mut() };
        let Some(mut x) = y_ref.left else {
            panic!("rotate_right on a node without a left child");
        };
        let x_ref = unsafe { x.as_mut() };
        y_ref.left = x_ref.right;
        if let Some(mut b) = x_ref.right {
            unsafe { b.as_mut() }.parent = Some(y);
        }
        x_ref.parent = y_ref.parent;
        unsafe { self.replace_child(y_ref.parent, y, x) };
        x_ref.right = Some(y);
        y_ref.parent = Some(x);
    }

    /// Points whatever referenced `old` (its parent, or the tree root) at `new`.
    unsafe fn replace_child(
        &mut self,
        parent: Parent<T>,
        old: NonNull<Node<T>>,
        new: NonNull<Node<T>>,
    ) {
        match parent {
            None => self.root = Some(new),
            Some(mut p) => {
                let p = unsafe { p.as_mut() };
                if p.left == Some(old) {
                    p.left = Some(new);
                } else {
                    p.right = Some(new);
                }
            }
        }
    }

    /// The node holding the smallest key, found by following left children
    /// from the root.
    pub fn minimum(&self) -> Option<NodeRef<'_, T>> {
        let mut node = self.root?;
        while let Some(left) = unsafe { node.as_ref() }.left {
            node = left;
        }
        Some(NodeRef::new(node))
    }

    pub fn maximum(&self) -> Option<NodeRef<'_, T>> {
        let mut node = self.root?;
        while let Some(right) = unsafe { node.as_ref() }.right {
            node = right;
        }
        Some(NodeRef::new(node))
    }

    pub fn contains(&self, needle: &T) -> bool {
        let mut link = self.root;
        while let Some(node) = link {
            let node = unsafe { node.as_ref() };
            if *needle == node.key {
                return true;
            }
            link = if *needle < node.key {
                node.left
            } else {
                node.right
            };
        }
        false
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        fn height_of<T>(link: Link<T>) -> usize {
            match link {
                None => 0,
                Some(node) => {
                    let node = unsafe { node.as_ref() };
                    1 + height_of(node.left).max(height_of(node.right))
                }
            }
        }
        height_of(self.root)
    }

    /// Breadth-first walk from the root yielding each node's key and color
    /// together with the keys of its children.
    pub fn traverse_levels(&self) -> Levels<'_, T> {
        let mut queue = VecDeque::new();
        if let Some(root) = self.root {
            queue.push_back(unsafe { root.as_ref() });
        }
        Levels { queue }
    }

    /// In-order (sorted) iteration over the keys.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            stack: SmallVec::new(),
            remaining: self.len,
        };
        iter.push_left_spine(self.root);
        iter
    }

    /// Checks every red-black property and the parent links, returning the
    /// black-height of the root.
    pub fn validate(&self) -> Result<usize, InvariantViolation> {
        if color_of(self.root) == Color::Red {
            return Err(InvariantViolation::RedRoot);
        }
        check_subtree(self.root, None, None, None)
    }
}

fn check_subtree<T: Ord>(
    link: Link<T>,
    parent: Parent<T>,
    lower: Option<&T>,
    upper: Option<&T>,
) -> Result<usize, InvariantViolation> {
    let Some(ptr) = link else {
        return Ok(0);
    };
    let node = unsafe { ptr.as_ref() };
    if node.parent != parent {
        return Err(InvariantViolation::BrokenParentLink);
    }
    // left subtrees hold keys <= their ancestor, right subtrees keys >=
    if lower.is_some_and(|l| node.key < *l) || upper.is_some_and(|u| node.key > *u) {
        return Err(InvariantViolation::OrderViolation);
    }
    if node.color == Color::Red
        && (color_of(node.left) == Color::Red || color_of(node.right) == Color::Red)
    {
        return Err(InvariantViolation::RedRedEdge);
    }
    let left = check_subtree(node.left, link, lower, Some(&node.key))?;
    let right = check_subtree(node.right, link, Some(&node.key), upper)?;
    if left != right {
        return Err(InvariantViolation::BlackHeightMismatch { left, right });
    }
    Ok(left + usize::from(node.color == Color::Black))
}

impl<T: Ord> Default for RbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> Drop for RbTree<T> {
    fn drop(&mut self) {
        if let Some(root) = self.root.take() {
            let root = *unsafe { Box::from_raw(root.as_ptr()) };
            root.drop_children();
        }
    }
}

impl<T: Ord> Extend<T> for RbTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<T: Ord> FromIterator<T> for RbTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, T: Ord> IntoIterator for &'a RbTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Ord + Debug> Debug for RbTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbTree")
            .field("len", &self.len)
            .field("levels", &self.traverse_levels().collect::<Vec<_>>())
            .finish()
    }
}

/// Read-only view of a single node.
pub struct NodeRef<'a, T> {
    node: &'a Node<T>,
}

impl<'a, T> NodeRef<'a, T> {
    fn new(ptr: NonNull<Node<T>>) -> Self {
        Self {
            node: unsafe { ptr.as_ref() },
        }
    }

    pub fn key(&self) -> &'a T {
        &self.node.key
    }

    pub fn color(&self) -> Color {
        self.node.color
    }

    pub fn left(&self) -> Option<NodeRef<'a, T>> {
        self.node.left.map(NodeRef::new)
    }

    pub fn right(&self) -> Option<NodeRef<'a, T>> {
        self.node.right.map(NodeRef::new)
    }

    pub fn parent(&self) -> Option<NodeRef<'a, T>> {
        self.node.parent.map(NodeRef::new)
    }
}

impl<T> Clone for NodeRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<'_, T> {}

impl<T: Debug> Debug for NodeRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", &self.node.key)
            .field("color", &self.node.color)
            .field("has_parent", &self.node.parent.is_some())
            .finish()
    }
}

pub type LevelEntry<'a, T> = (&'a T, Color, Option<&'a T>, Option<&'a T>);

pub struct Levels<'a, T> {
    queue: VecDeque<&'a Node<T>>,
}

impl<'a, T> Iterator for Levels<'a, T> {
    type Item = LevelEntry<'a, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        let left = node.left.map(|l| unsafe { l.as_ref() });
        let right = node.right.map(|r| unsafe { r.as_ref() });
        self.queue.extend(left);
        self.queue.extend(right);
        Some((
            &node.key,
            node.color,
            left.map(|l| &l.key),
            right.map(|r| &r.key),
        ))
    }
}

impl<T> FusedIterator for Levels<'_, T> {}

pub struct Iter<'a, T> {
    // inline up to 32 levels, deeper trees spill to the heap
    stack: SmallVec<[&'a Node<T>; 32]>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn push_left_spine(&mut self, mut link: Link<T>) {
        while let Some(node) = link {
            let node = unsafe { node.as_ref() };
            self.stack.push(node);
            link = node.left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right);
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    RedRoot,
    RedRedEdge,
    BlackHeightMismatch { left: usize, right: usize },
    OrderViolation,
    BrokenParentLink,
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot => f.write_str("root node is red"),
            Self::RedRedEdge => f.write_str("red node has a red child"),
            Self::BlackHeightMismatch { left, right } => write!(
                f,
                "black-height differs between subtrees (left {left}, right {right})"
            ),
            Self::OrderViolation => f.write_str("key is out of search tree order"),
            Self::BrokenParentLink => f.write_str("child does not point back at its parent"),
        }
    }
}

impl Error for InvariantViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(tree: &RbTree<i32>) -> Vec<(i32, Color, Option<i32>, Option<i32>)> {
        tree.traverse_levels()
            .map(|(k, c, l, r)| (*k, c, l.copied(), r.copied()))
            .collect()
    }

    fn attach_all(tree: &mut RbTree<i32>, keys: &[i32]) -> Vec<NonNull<Node<i32>>> {
        keys.iter().map(|k| tree.attach(*k)).collect()
    }

    #[test]
    fn test_rotate_left_then_right_restores_structure() {
        let mut tree = RbTree::new();
        let nodes = attach_all(&mut tree, &[10, 5, 20, 15, 25]);
        let before = shape(&tree);

        unsafe { tree.rotate_left(nodes[0]) };
        assert_eq!(tree.root().map(|r| *r.key()), Some(20));
        let pivot = tree.root().unwrap();
        assert_eq!(pivot.left().map(|l| *l.key()), Some(10));
        assert_eq!(pivot.left().unwrap().right().map(|r| *r.key()), Some(15));
        assert_eq!(
            pivot.left().unwrap().right().unwrap().parent().map(|p| *p.key()),
            Some(10)
        );
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [5, 10, 15, 20, 25]);

        unsafe { tree.rotate_right(nodes[2]) };
        assert_eq!(shape(&tree), before);
        assert!(tree.root().unwrap().parent().is_none());
    }

    #[test]
    fn test_rotate_inner_node_relinks_parent() {
        let mut tree = RbTree::new();
        let nodes = attach_all(&mut tree, &[50, 30, 70, 20, 40]);
        unsafe { tree.rotate_right(nodes[1]) };
        let root = tree.root().unwrap();
        assert_eq!(*root.key(), 50);
        let new_left = root.left().unwrap();
        assert_eq!(*new_left.key(), 20);
        assert_eq!(new_left.parent().map(|p| *p.key()), Some(50));
        assert_eq!(new_left.right().map(|r| *r.key()), Some(30));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [20, 30, 40, 50, 70]);
    }

    #[test]
    #[should_panic]
    fn test_rotate_left_without_right_child_panics() {
        let mut tree = RbTree::new();
        let nodes = attach_all(&mut tree, &[10, 5]);
        unsafe { tree.rotate_left(nodes[0]) };
    }

    #[test]
    fn test_fixup_red_uncle_recolors() {
        let mut tree = RbTree::new();
        let nodes = attach_all(&mut tree, &[20, 10, 30, 5]);
        unsafe { tree.insert_fixup(nodes[3]) };
        assert_eq!(
            shape(&tree),
            [
                (20, Color::Black, Some(10), Some(30)),
                (10, Color::Black, Some(5), None),
                (30, Color::Black, None, None),
                (5, Color::Red, None, None),
            ]
        );
        assert_eq!(tree.validate(), Ok(2));
    }

    #[test]
    fn test_fixup_triangle_rotates_twice() {
        let mut tree = RbTree::new();
        let nodes = attach_all(&mut tree, &[30, 10, 20]);
        unsafe { tree.insert_fixup(nodes[2]) };
        assert_eq!(
            shape(&tree),
            [
                (20, Color::Black, Some(10), Some(30)),
                (10, Color::Red, None, None),
                (30, Color::Red, None, None),
            ]
        );
        assert_eq!(tree.validate(), Ok(1));
    }

    #[test]
    fn test_fixup_mirrored_triangle() {
        let mut tree = RbTree::new();
        let nodes = attach_all(&mut tree, &[10, 30, 20]);
        unsafe { tree.insert_fixup(nodes[2]) };
        assert_eq!(
            shape(&tree),
            [
                (20, Color::Black, Some(10), Some(30)),
                (10, Color::Red, None, None),
                (30, Color::Red, None, None),
            ]
        );
    }

    #[test]
    fn test_fixup_line_rotates_grandparent() {
        let mut tree = RbTree::new();
        let nodes = attach_all(&mut tree, &[30, 20, 10]);
        unsafe { tree.insert_fixup(nodes[2]) };
        assert_eq!(
            shape(&tree),
            [
                (20, Color::Black, Some(10), Some(30)),
                (10, Color::Red, None, None),
                (30, Color::Red, None, None),
            ]
        );
    }

    #[test]
    fn test_fixup_stops_under_black_parent() {
        let mut tree = RbTree::new();
        let nodes = attach_all(&mut tree, &[20, 10]);
        let before = shape(&tree);
        unsafe { tree.insert_fixup(nodes[1]) };
        assert_eq!(shape(&tree), before);
    }

    #[test]
    fn test_validate_detects_broken_properties() {
        let mut tree = RbTree::new();
        let nodes = attach_all(&mut tree, &[30, 20, 10]);
        assert_eq!(tree.validate(), Err(InvariantViolation::RedRedEdge));

        unsafe { tree.insert_fixup(nodes[2]) };
        let mut root = tree.root.unwrap();
        unsafe { root.as_mut() }.color = Color::Red;
        assert_eq!(tree.validate(), Err(InvariantViolation::RedRoot));
        unsafe { root.as_mut() }.color = Color::Black;

        let mut left = unsafe { root.as_ref() }.left.unwrap();
        unsafe { left.as_mut() }.color = Color::Black;
        assert_eq!(
            tree.validate(),
            Err(InvariantViolation::BlackHeightMismatch { left: 1, right: 0 })
        );
        unsafe { left.as_mut() }.key = 25;
        assert_eq!(tree.validate(), Err(InvariantViolation::OrderViolation));
    }

    #[test]
    fn test_validate_allows_equal_keys_on_the_right() {
        let mut tree = RbTree::new();
        let nodes = attach_all(&mut tree, &[20, 10, 30]);
        let mut right = nodes[2];
        unsafe { right.as_mut() }.key = 20;
        assert_eq!(tree.validate(), Ok(1));
        unsafe { right.as_mut() }.key = 15;
        assert_eq!(tree.validate(), Err(InvariantViolation::OrderViolation));
    }
}
