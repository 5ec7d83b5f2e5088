use std::{
    cmp::{Ord, Ordering},
    fmt::{self, Debug, Display},
    mem,
};

use log::{debug, trace};

use crate::depth::Depth;
use crate::error::RbError;

/// Position of a node inside the tree's arena.
type NodeId = usize;

/// Color tag carried by every [`Node`]. Empty links count as black.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

// Local shape seen by the fixup loop, for a red node whose parent is red.
#[derive(Debug)]
enum Case {
    // uncle is red, push the violation two levels up.
    RedUncle(NodeId),
    // uncle is black and node is on the uncle's side of its parent.
    BlackUncleInner,
    // uncle is black and node is on the far side from the uncle.
    BlackUncleOuter,
}

/// RbTree manage a single instance of in-memory index using
/// [red-black][rbtree] tree. Values are kept in sort order, duplicate
/// values are allowed and descend to the right.
///
/// Nodes live in an arena owned by the tree. Child links are the
/// downward relation, the parent link is a plain index used to walk
/// upwards during rebalancing.
///
/// [rbtree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
#[derive(Clone)]
pub struct RbTree<T>
where
    T: Ord,
{
    name: String,
    nodes: Vec<Node<T>>,
    root: Option<NodeId>,
}

/// Different ways to construct a new RbTree instance.
impl<T> RbTree<T>
where
    T: Ord,
{
    /// Create an empty instance of RbTree, identified by `name`.
    /// Applications can choose unique names.
    pub fn new<S>(name: S) -> RbTree<T>
    where
        S: AsRef<str>,
    {
        RbTree {
            name: name.as_ref().to_string(),
            nodes: Default::default(),
            root: Default::default(),
        }
    }

    /// Create a new instance of RbTree with `value` as its black root.
    pub fn with_seed<S>(name: S, value: T) -> RbTree<T>
    where
        S: AsRef<str>,
    {
        let mut tree = RbTree::new(name);
        let mut root = Node::new(value, None);
        root.set_black();
        tree.nodes.push(root);
        tree.root = Some(0);
        tree
    }

    /// Create a new instance of RbTree and load it with values
    /// from `iter`, inserted in iteration order.
    pub fn load_from<S, I>(name: S, iter: I) -> RbTree<T>
    where
        S: AsRef<str>,
        I: Iterator<Item = T>,
    {
        let mut tree = RbTree::new(name);
        iter.for_each(|value| tree.insert(value));
        tree
    }
}

impl<T> Default for RbTree<T>
where
    T: Ord,
{
    fn default() -> RbTree<T> {
        RbTree::new("")
    }
}

/// Maintenance API.
impl<T> RbTree<T>
where
    T: Ord,
{
    /// Identify this instance. Applications can choose unique names while
    /// creating RbTree instances.
    #[inline]
    pub fn id(&self) -> String {
        self.name.clone()
    }

    /// Return number of values in this instance, duplicates included.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether this index is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Return the root node, if any.
    pub fn root(&self) -> Option<&Node<T>> {
        self.root.map(|id| &self.nodes[id])
    }

    /// Return number of nodes on the longest path from root to leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            let node = &self.nodes[id];
            stack.extend(node.left.map(|l| (l, depth + 1)));
            stack.extend(node.right.map(|r| (r, depth + 1)));
        }
        height
    }

    /// Return quickly with basic statisics, only entries() and node_size()
    /// are valid with this statisics.
    pub fn stats(&self) -> Stats {
        Stats::new(self.len(), mem::size_of::<Node<T>>())
    }

    /// Validate red-black tree with following rules:
    ///
    /// * Root node is black.
    /// * From root to any leaf, no consecutive reds allowed in its path.
    /// * Number of blacks should be same under left child and right child.
    /// * Values are in sorted order, equal values may sit on either side.
    /// * Every child link is mirrored by the child's parent link.
    ///
    /// Additionally return full statistics on the tree. Refer to [`Stats`]
    /// for more information.
    pub fn validate(&self) -> Result<Stats, RbError<T>>
    where
        T: Clone + Debug,
    {
        let mut stats = Stats::new(self.len(), mem::size_of::<Node<T>>());
        stats.set_depths(Depth::for_entries(self.len()));

        if self.is_red(self.root) {
            return Err(RbError::RedRoot);
        }

        let mut visited = 0;
        let bounds = (None, None);
        let blacks = self.validate_tree(self.root, None, false, 0, 0, bounds, &mut visited, &mut stats)?;
        if visited != self.len() {
            let err = format!("reachable {} of {} nodes", visited, self.len());
            return Err(RbError::BrokenLink(err));
        }
        stats.set_blacks(blacks);
        debug!(
            "{}: validated {} entries, blacks:{} height:{}",
            self.name,
            stats.entries(),
            blacks,
            stats.depths.as_ref().map_or(0, |d| d.max())
        );
        Ok(stats)
    }
}

/// Write operations on RbTree instance.
impl<T> RbTree<T>
where
    T: Ord,
{
    /// Insert `value` into the index. Values equal to an existing one
    /// are kept, they descend into the right subtree.
    pub fn insert(&mut self, value: T) {
        let (mut parent, mut link) = (None, self.root);
        while let Some(id) = link {
            parent = Some(id);
            link = match value.cmp(&self.nodes[id].value) {
                Ordering::Less => self.nodes[id].left,
                Ordering::Equal | Ordering::Greater => self.nodes[id].right,
            };
        }

        let z = self.nodes.len();
        self.nodes.push(Node::new(value, parent));
        match parent {
            None => self.root = Some(z),
            Some(p) => {
                // re-derive the side against the final parent.
                let side = match self.nodes[z].value.cmp(&self.nodes[p].value) {
                    Ordering::Less => Side::Left,
                    Ordering::Equal | Ordering::Greater => Side::Right,
                };
                trace!("{}: attach node {} {:?} of {}", self.name, z, side, p);
                self.set_child(p, side, Some(z));
            }
        }

        self.fixup(z);
    }

    fn fixup(&mut self, mut z: NodeId) {
        while let Some(p) = self.nodes[z].parent {
            if self.nodes[p].is_black() {
                break;
            }
            // root is black, a red parent always has a parent.
            let g = match self.nodes[p].parent {
                Some(g) => g,
                None => panic!("fixup(): red node {} at root ? Call the programmer", p),
            };
            let p_side = self.side_of(g, p);
            let u_side = p_side.opposite();

            let case = match self.child(g, u_side) {
                Some(u) if self.nodes[u].is_red() => Case::RedUncle(u),
                _ if self.child(p, u_side) == Some(z) => Case::BlackUncleInner,
                _ => Case::BlackUncleOuter,
            };
            trace!("{}: fixup node {} {:?} parent-{:?}", self.name, z, case, p_side);

            match (case, p_side) {
                (Case::RedUncle(u), _) => {
                    self.nodes[p].set_black();
                    self.nodes[u].set_black();
                    self.nodes[g].set_red();
                    z = g;
                }
                (Case::BlackUncleInner, Side::Left) => {
                    z = p;
                    self.rotate_left(z);
                }
                (Case::BlackUncleInner, Side::Right) => {
                    z = p;
                    self.rotate_right(z);
                }
                (Case::BlackUncleOuter, Side::Left) => {
                    self.nodes[p].set_black();
                    self.nodes[g].set_red();
                    self.rotate_right(g);
                }
                (Case::BlackUncleOuter, Side::Right) => {
                    self.nodes[p].set_black();
                    self.nodes[g].set_red();
                    self.rotate_left(g);
                }
            }
        }

        if let Some(root) = self.root {
            self.nodes[root].set_black();
        }
    }

    //              (i)                       (i)
    //               |                         |
    //               x                         y
    //              / \                       / \
    //             /   \                     /   \
    //            /     \                   /     \
    //          xl       y                 x       yr
    //                  / \               / \
    //                yl   yr           xl   yl
    //
    pub(crate) fn rotate_left(&mut self, x: NodeId) -> NodeId {
        self.rotate(x, Side::Left)
    }

    //              (i)                       (i)
    //               |                         |
    //               y                         x
    //              / \                       / \
    //             /   \                     /   \
    //            /     \                   /     \
    //           x       yr               xl       y
    //          / \                               / \
    //        xl   xr                           xr   yr
    //
    pub(crate) fn rotate_right(&mut self, y: NodeId) -> NodeId {
        self.rotate(y, Side::Right)
    }

    // Move `node` down towards `down`, its child on the opposite side takes
    // its place. Colors are untouched. Return the promoted node.
    fn rotate(&mut self, node: NodeId, down: Side) -> NodeId {
        let up = down.opposite();
        let promoted = match self.child(node, up) {
            Some(promoted) => promoted,
            None => match down {
                Side::Left => panic!("rotate_left(): empty right child ? Call the programmer"),
                Side::Right => panic!("rotate_right(): empty left child ? Call the programmer"),
            },
        };

        let inner = self.child(promoted, down);
        self.set_child(node, up, inner);
        if let Some(inner) = inner {
            self.nodes[inner].parent = Some(node);
        }

        let parent = self.nodes[node].parent;
        self.nodes[promoted].parent = parent;
        match parent {
            None => self.root = Some(promoted),
            Some(parent) => {
                let side = self.side_of(parent, node);
                self.set_child(parent, side, Some(promoted));
            }
        }

        self.set_child(promoted, down, Some(node));
        self.nodes[node].parent = Some(promoted);
        promoted
    }
}

impl<T> RbTree<T>
where
    T: Ord,
{
    #[inline]
    fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.nodes[id].left,
            Side::Right => self.nodes[id].right,
        }
    }

    #[inline]
    fn set_child(&mut self, id: NodeId, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.nodes[id].left = child,
            Side::Right => self.nodes[id].right = child,
        }
    }

    // side on which `child` hangs under `parent`.
    #[inline]
    fn side_of(&self, parent: NodeId, child: NodeId) -> Side {
        if self.nodes[parent].left == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    #[inline]
    fn is_red(&self, id: Option<NodeId>) -> bool {
        id.map_or(false, |id| self.nodes[id].is_red())
    }

    #[allow(clippy::too_many_arguments)]
    fn validate_tree(
        &self,
        node: Option<NodeId>,
        parent: Option<NodeId>,
        fromred: bool,
        mut nb: usize,
        depth: usize,
        (low, high): (Option<&T>, Option<&T>),
        visited: &mut usize,
        stats: &mut Stats,
    ) -> Result<usize, RbError<T>>
    where
        T: Clone + Debug,
    {
        let id = match node {
            None => {
                if let Some(depths) = stats.depths.as_mut() {
                    depths.sample(depth);
                }
                return Ok(nb);
            }
            Some(id) => id,
        };
        *visited += 1;

        let nref = &self.nodes[id];
        if nref.parent != parent {
            let err = format!("node {} parent {:?} expected {:?}", id, nref.parent, parent);
            return Err(RbError::BrokenLink(err));
        }

        let red = nref.is_red();
        if fromred && red {
            return Err(RbError::ConsecutiveReds);
        }
        if !red {
            nb += 1;
        }

        if let Some(low) = low {
            if nref.value.lt(low) {
                return Err(RbError::SortError(nref.value.clone(), low.clone()));
            }
        }
        if let Some(high) = high {
            if nref.value.gt(high) {
                return Err(RbError::SortError(nref.value.clone(), high.clone()));
            }
        }

        let (left, right) = (nref.left, nref.right);
        let value = Some(&nref.value);
        let lblacks =
            self.validate_tree(left, node, red, nb, depth + 1, (low, value), visited, stats)?;
        let rblacks =
            self.validate_tree(right, node, red, nb, depth + 1, (value, high), visited, stats)?;
        if lblacks != rblacks {
            let err = format!("left: {} right: {}", lblacks, rblacks);
            return Err(RbError::UnbalancedBlacks(err));
        }
        Ok(lblacks)
    }

    fn fmt_tree(&self, node: Option<NodeId>, f: &mut fmt::Formatter) -> fmt::Result
    where
        T: Display,
    {
        match node {
            None => Ok(()),
            Some(id) => {
                let nref = &self.nodes[id];
                write!(f, "({}", nref.value)?;
                self.fmt_tree(nref.left, f)?;
                self.fmt_tree(nref.right, f)?;
                write!(f, ")")
            }
        }
    }
}

/// Diagnostic pre-order form, `(value<left><right>)` per node, empty
/// subtrees contribute nothing.
impl<T> Display for RbTree<T>
where
    T: Ord + Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_tree(self.root, f)
    }
}

/// Node corresponds to a single value in RbTree instance.
#[derive(Clone, Debug)]
pub struct Node<T> {
    value: T,
    color: Color,
    parent: Option<NodeId>, // back link, not owned
    left: Option<NodeId>,   // store: left child
    right: Option<NodeId>,  // store: right child
}

// Primary operations on a single node.
impl<T> Node<T> {
    // CREATE operation, new nodes are always red leaves.
    fn new(value: T, parent: Option<NodeId>) -> Node<T> {
        Node {
            value,
            color: Color::Red,
            parent,
            left: None,
            right: None,
        }
    }

    /// Return the value held by this node.
    #[inline]
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Return the color of this node.
    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    #[inline]
    fn set_red(&mut self) {
        self.color = Color::Red
    }

    #[inline]
    fn set_black(&mut self) {
        self.color = Color::Black
    }

    #[inline]
    fn is_red(&self) -> bool {
        self.color == Color::Red
    }

    #[inline]
    fn is_black(&self) -> bool {
        self.color == Color::Black
    }
}

/// Statistics on [`RbTree`] tree. Serves two purpose:
///
/// * To get partial but quick statistics via [`RbTree::stats`] method.
/// * To get full statisics via [`RbTree::validate`] method.
#[derive(Default, Debug)]
pub struct Stats {
    entries: usize, // number of entries in the tree.
    node_size: usize,
    blacks: Option<usize>,
    depths: Option<Depth>,
}

impl Stats {
    fn new(entries: usize, node_size: usize) -> Stats {
        Stats {
            entries,
            node_size,
            blacks: Default::default(),
            depths: Default::default(),
        }
    }

    #[inline]
    fn set_blacks(&mut self, blacks: usize) {
        self.blacks = Some(blacks)
    }

    #[inline]
    fn set_depths(&mut self, depths: Depth) {
        self.depths = Some(depths)
    }

    /// Return number entries in [`RbTree`] instance.
    #[inline]
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Return node-size, including over-head for `RbTree<T>`. Although
    /// the node overhead is constant, the node size varies based on
    /// value type. EG:
    ///
    /// ```
    /// use rb_index::RbTree;
    /// let tree: RbTree<u64> = RbTree::new("myinstance");
    ///
    /// // size of value: 8 bytes
    /// // overhead is 56 bytes
    /// assert_eq!(tree.stats().node_size(), 64);
    /// ```
    #[inline]
    pub fn node_size(&self) -> usize {
        self.node_size
    }

    /// Return number of black nodes from root to leaf, identical on
    /// every path.
    #[inline]
    pub fn blacks(&self) -> Option<usize> {
        self.blacks
    }

    /// Return [`Depth`] statistics.
    pub fn depths(&self) -> Option<Depth> {
        match self.depths.as_ref() {
            Some(depths) if depths.samples() > 0 => Some(depths.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "rbtree_test.rs"]
mod rbtree_test;
