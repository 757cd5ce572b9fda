use crate::error::{PfResult, PictoForgeError};
use std::collections::{HashMap, VecDeque};
use std::sync::OnceLock;

pub type NodeId = usize;

const UNVISITED: usize = usize::MAX;

#[derive(Debug, Clone)]
pub struct PageNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub depth: usize,
}

/// Euler sequence of the tree plus a sparse table over its depth array.
///
/// `first[n]` is the position of the first visit of node `n` (or
/// `usize::MAX` for nodes that are not reachable from the root).
#[derive(Debug, Clone)]
pub struct EulerTour {
    pub nodes: Vec<NodeId>,
    pub depths: Vec<usize>,
    pub first: Vec<usize>,
    // sparse[k][i] = position of the shallowest entry in [i, i + 2^k)
    sparse: Vec<Vec<usize>>,
}

impl EulerTour {
    fn build(tree: &PageTree) -> Self {
        let n = tree.nodes.len();
        let mut nodes = Vec::with_capacity(2 * n);
        let mut depths = Vec::with_capacity(2 * n);
        let mut first = vec![UNVISITED; n];

        let mut visit = |id: NodeId| {
            if first[id] == UNVISITED {
                first[id] = nodes.len();
            }
            nodes.push(id);
            depths.push(tree.nodes[id].depth);
        };

        // Iterative DFS: (node, index of the next child to descend into)
        let mut stack: Vec<(NodeId, usize)> = vec![(tree.root, 0)];
        visit(tree.root);
        while let Some(top) = stack.last_mut() {
            let (node, next) = *top;
            if let Some(&child) = tree.nodes[node].children.get(next) {
                top.1 += 1;
                visit(child);
                stack.push((child, 0));
            } else {
                stack.pop();
                if let Some(&(parent, _)) = stack.last() {
                    visit(parent);
                }
            }
        }

        let sparse = build_sparse_table(&depths);

        Self {
            nodes,
            depths,
            first,
            sparse,
        }
    }

    /// Position of the shallowest entry in `[lo, hi]`, first occurrence on ties.
    pub fn min_depth_position(&self, lo: usize, hi: usize) -> usize {
        let len = hi - lo + 1;
        let k = (usize::BITS - 1 - len.leading_zeros()) as usize;
        let a = self.sparse[k][lo];
        let b = self.sparse[k][hi + 1 - (1 << k)];
        if self.depths[b] < self.depths[a] {
            b
        } else {
            a
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn build_sparse_table(depths: &[usize]) -> Vec<Vec<usize>> {
    let len = depths.len();
    let mut sparse = vec![(0..len).collect::<Vec<usize>>()];
    let mut k = 1;
    while (1usize << k) <= len {
        let half = 1usize << (k - 1);
        let prev = &sparse[k - 1];
        let row: Vec<usize> = (0..=len - (1 << k))
            .map(|i| {
                let (a, b) = (prev[i], prev[i + half]);
                if depths[b] < depths[a] {
                    b
                } else {
                    a
                }
            })
            .collect();
        sparse.push(row);
        k += 1;
    }
    sparse
}

/// Result of an LCA query over the Euler tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcaQuery {
    pub lo: usize,
    pub hi: usize,
    pub position: usize,
    pub node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedPath {
    pub nodes: Vec<NodeId>,
    pub distance: usize,
}

/// Rooted, ordered page hierarchy stored as an arena.
///
/// Parent links are plain indices; the arena owns every node. The Euler tour
/// is built on first use and dropped by every topology change.
#[derive(Debug, Clone)]
pub struct PageTree {
    nodes: Vec<PageNode>,
    index: HashMap<String, NodeId>,
    root: NodeId,
    tour: OnceLock<EulerTour>,
}

impl PageTree {
    pub fn new(root_name: &str) -> Self {
        let mut index = HashMap::new();
        index.insert(root_name.to_string(), 0);
        Self {
            nodes: vec![PageNode {
                name: root_name.to_string(),
                parent: None,
                children: Vec::new(),
                depth: 0,
            }],
            index,
            root: 0,
            tour: OnceLock::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&PageNode> {
        self.nodes.get(id)
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(id).map(|n| n.name.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn depth(&self, id: NodeId) -> Option<usize> {
        self.nodes.get(id).map(|n| n.depth)
    }

    /// Creates a detached node. It joins the hierarchy through `insert_child`.
    pub fn add_node(&mut self, name: &str) -> PfResult<NodeId> {
        if self.index.contains_key(name) {
            return Err(PictoForgeError::Structure(format!(
                "Page '{}' already exists in the tree",
                name
            )));
        }
        let id = self.nodes.len();
        self.nodes.push(PageNode {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            depth: 0,
        });
        self.index.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Depth-first search restricted to the subtree rooted at `from`.
    pub fn find_in_subtree(&self, from: NodeId, name: &str) -> Option<NodeId> {
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            let node = self.nodes.get(id)?;
            if node.name == name {
                return Some(id);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// True when `ancestor` lies on the path from `node` to its root (inclusive).
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn insert_child(&mut self, parent: NodeId, child: NodeId) -> PfResult<()> {
        self.check_id(parent)?;
        self.check_id(child)?;
        if child == self.root {
            return Err(PictoForgeError::Structure(
                "The root page cannot become a child".to_string(),
            ));
        }
        if self.nodes[child].parent.is_some() {
            return Err(PictoForgeError::Structure(format!(
                "Page '{}' already has a parent",
                self.nodes[child].name
            )));
        }
        if self.is_ancestor(child, parent) {
            return Err(PictoForgeError::Structure(format!(
                "Attaching '{}' under '{}' would create a cycle",
                self.nodes[child].name, self.nodes[parent].name
            )));
        }

        self.nodes[parent].children.push(child);
        self.nodes[child].parent = Some(parent);
        let depth = self.nodes[parent].depth + 1;
        self.update_depths(child, depth);
        self.invalidate();
        Ok(())
    }

    /// Removes `child` from its parent's child list. Returns the former parent.
    pub fn detach(&mut self, child: NodeId) -> PfResult<Option<NodeId>> {
        self.check_id(child)?;
        let parent = self.nodes[child].parent.take();
        if let Some(p) = parent {
            self.nodes[p].children.retain(|&c| c != child);
            self.update_depths(child, 0);
            self.invalidate();
        }
        Ok(parent)
    }

    pub fn reparent(&mut self, child: NodeId, new_parent: NodeId) -> PfResult<()> {
        self.check_id(child)?;
        self.check_id(new_parent)?;
        if child == self.root || self.is_ancestor(child, new_parent) {
            return Err(PictoForgeError::Structure(format!(
                "Cannot move '{}' under '{}'",
                self.nodes[child].name, self.nodes[new_parent].name
            )));
        }
        self.detach(child)?;
        self.insert_child(new_parent, child)
    }

    fn update_depths(&mut self, start: NodeId, depth: usize) {
        let mut stack = vec![(start, depth)];
        while let Some((id, d)) = stack.pop() {
            self.nodes[id].depth = d;
            for &c in &self.nodes[id].children {
                stack.push((c, d + 1));
            }
        }
    }

    pub fn invalidate(&mut self) {
        self.tour = OnceLock::new();
    }

    pub fn has_cached_tour(&self) -> bool {
        self.tour.get().is_some()
    }

    pub fn euler_tour(&self) -> &EulerTour {
        self.tour.get_or_init(|| EulerTour::build(self))
    }

    pub fn find_lca(&self, start: NodeId, end: NodeId) -> PfResult<LcaQuery> {
        self.check_id(start)?;
        self.check_id(end)?;
        let tour = self.euler_tour();
        let (a, b) = (tour.first[start], tour.first[end]);
        if a == UNVISITED || b == UNVISITED {
            return Err(PictoForgeError::Structure(format!(
                "Page '{}' or '{}' is not reachable from the root",
                self.nodes[start].name, self.nodes[end].name
            )));
        }
        let (lo, hi) = (a.min(b), a.max(b));
        let position = tour.min_depth_position(lo, hi);
        Ok(LcaQuery {
            lo,
            hi,
            position,
            node: tour.nodes[position],
        })
    }

    pub fn distance(&self, start: NodeId, end: NodeId) -> PfResult<usize> {
        if start == end {
            self.check_id(start)?;
            return Ok(0);
        }
        let lca = self.find_lca(start, end)?.node;
        let d_lca = self.nodes[lca].depth;
        Ok((self.nodes[start].depth - d_lca) + (self.nodes[end].depth - d_lca))
    }

    pub fn path_finding(&self, start: NodeId, end: NodeId) -> PfResult<WeightedPath> {
        if start == end {
            self.check_id(start)?;
            return Ok(WeightedPath {
                nodes: vec![start],
                distance: 0,
            });
        }
        let lca = self.find_lca(start, end)?.node;

        let mut nodes = self.climb(start, lca)?;
        let mut down = self.climb(end, lca)?;
        // Both climbs end on the LCA; keep it once.
        down.pop();
        down.reverse();
        nodes.extend(down);

        Ok(WeightedPath {
            distance: nodes.len() - 1,
            nodes,
        })
    }

    // [from, parent(from), ..., to]
    fn climb(&self, from: NodeId, to: NodeId) -> PfResult<Vec<NodeId>> {
        let mut path = vec![from];
        let mut current = from;
        while current != to {
            current = self.parent(current).ok_or_else(|| {
                PictoForgeError::Structure(format!(
                    "'{}' is not an ancestor of '{}'",
                    self.nodes[to].name, self.nodes[from].name
                ))
            })?;
            path.push(current);
        }
        Ok(path)
    }

    /// Preorder listing of the subtree rooted at `id`.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev());
        }
        out
    }

    pub fn nodes_bfs(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([self.root]);
        while let Some(n) = queue.pop_front() {
            out.push(n);
            queue.extend(self.children(n));
        }
        out
    }

    fn check_id(&self, id: NodeId) -> PfResult<()> {
        if id < self.nodes.len() {
            Ok(())
        } else {
            Err(PictoForgeError::Structure(format!("Unknown page node #{}", id)))
        }
    }
}
