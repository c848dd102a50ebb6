//! Tidy top-down tree placement (Buchheim–Walker, as in d3's `tree()`).

use crate::data::ItemDatum;
use crate::item::ItemPath;
use crate::scene::{Point, format_number};

/// Where a node's children came from in the dataset.
///
/// `Nested` children live in the datum's own `children`; `Flat` children are
/// the items following the root in the top-level list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildSource {
    Nested,
    Flat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNodeInput {
    pub path: ItemPath,
    pub source: ChildSource,
    pub children: Vec<TreeNodeInput>,
}

impl TreeNodeInput {
    pub fn leaf(path: ItemPath) -> Self {
        Self {
            path,
            source: ChildSource::Nested,
            children: Vec::new(),
        }
    }

    fn nested(datum: &ItemDatum, path: ItemPath) -> Self {
        let children = datum
            .children
            .iter()
            .enumerate()
            .map(|(index, child)| {
                let mut child_path = path.clone();
                child_path.push(index);
                Self::nested(child, child_path)
            })
            .collect();
        Self {
            path,
            source: ChildSource::Nested,
            children,
        }
    }

    fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// Builds the hierarchy rooted at the first item.
///
/// When the first item carries children the dataset is treated as nested;
/// otherwise every remaining top-level item becomes a direct child of it.
pub fn build_hierarchy(items: &[ItemDatum]) -> Option<TreeNodeInput> {
    let root = items.first()?;
    if !root.children.is_empty() {
        return Some(TreeNodeInput::nested(root, vec![0]));
    }
    let children = items[1..]
        .iter()
        .enumerate()
        .map(|(index, datum)| TreeNodeInput::nested(datum, vec![index + 1]))
        .collect();
    Some(TreeNodeInput {
        path: vec![0],
        source: ChildSource::Flat,
        children,
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeOptions {
    pub item_width: f32,
    pub item_height: f32,
    pub node_gap: f32,
    pub level_gap: f32,
    pub btn_width: f32,
    pub btn_height: f32,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            item_width: 100.0,
            item_height: 60.0,
            node_gap: 60.0,
            level_gap: 80.0,
            btn_width: 20.0,
            btn_height: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTreeNode {
    pub path: ItemPath,
    pub depth: usize,
    /// Top-left corner of the item box.
    pub x: f32,
    pub y: f32,
    pub parent: Option<usize>,
}

impl PlacedTreeNode {
    pub fn top_center(&self, options: &TreeOptions) -> Point {
        Point::new(self.x + options.item_width / 2.0, self.y)
    }

    pub fn bottom_center(&self, options: &TreeOptions) -> Point {
        Point::new(self.x + options.item_width / 2.0, self.y + options.item_height)
    }
}

/// Orthogonal parent-to-child elbow.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub points: [Point; 4],
}

impl Connector {
    fn elbow(from: Point, to: Point) -> Self {
        let mid_y = from.y + (to.y - from.y) / 2.0;
        Self {
            points: [
                from,
                Point::new(from.x, mid_y),
                Point::new(to.x, mid_y),
                to,
            ],
        }
    }

    pub fn path_data(&self) -> String {
        let [a, b, c, d] = &self.points;
        format!(
            "M {} {} L {} {} L {} {} L {} {}",
            format_number(a.x),
            format_number(a.y),
            format_number(b.x),
            format_number(b.y),
            format_number(c.x),
            format_number(c.y),
            format_number(d.x),
            format_number(d.y)
        )
    }
}

/// An "add" affordance: the path a new item would take, and the button's
/// top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct AddSlot {
    pub path: ItemPath,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeLayout {
    /// Nodes in pre-order; index 0 is the root.
    pub nodes: Vec<PlacedTreeNode>,
    /// One per non-root node, in the same order as `nodes[1..]`.
    pub connectors: Vec<Connector>,
    pub add_slots: Vec<AddSlot>,
}

pub fn layout_tree(root: &TreeNodeInput, options: &TreeOptions) -> TreeLayout {
    let dx = options.item_width + options.node_gap;
    let dy = options.item_height + options.level_gap;

    let mut walker = Walker::new(root);
    walker.run();

    let raw: Vec<(f32, f32)> = walker.nodes[1..]
        .iter()
        .map(|node| (node.prelim * dx, node.depth as f32 * dy))
        .collect();
    let min_x = raw.iter().map(|(x, _)| *x).fold(f32::INFINITY, f32::min);
    let min_y = raw.iter().map(|(_, y)| *y).fold(f32::INFINITY, f32::min);
    let offset_x = (-min_x + options.item_width / 2.0).max(0.0);
    let offset_y = (-min_y + options.btn_height + 10.0).max(0.0);

    let nodes: Vec<PlacedTreeNode> = walker.nodes[1..]
        .iter()
        .zip(&raw)
        .map(|(node, (x, y))| PlacedTreeNode {
            path: node.path.clone(),
            depth: node.depth,
            x: x + offset_x - options.item_width / 2.0,
            y: y + offset_y,
            parent: (node.parent > 0).then(|| node.parent - 1),
        })
        .collect();

    let connectors = nodes
        .iter()
        .filter_map(|node| {
            let parent = &nodes[node.parent?];
            Some(Connector::elbow(
                parent.bottom_center(options),
                node.top_center(options),
            ))
        })
        .collect();

    let add_slots = add_slots(&walker, &nodes, options);
    TreeLayout {
        nodes,
        connectors,
        add_slots,
    }
}

fn add_slots(walker: &Walker, nodes: &[PlacedTreeNode], options: &TreeOptions) -> Vec<AddSlot> {
    let half_btn = options.btn_width / 2.0;
    let half_step = (options.item_width + options.node_gap) / 2.0;
    let center_x = |node: &PlacedTreeNode| node.x + options.item_width / 2.0;
    let mut slots = Vec::new();

    let Some(root) = nodes.first() else {
        return slots;
    };
    slots.push(AddSlot {
        path: root.path.clone(),
        x: center_x(root) - half_btn,
        y: root.y - options.btn_height - 5.0,
    });

    for (index, node) in nodes.iter().enumerate() {
        let arena = &walker.nodes[index + 1];
        let slot_path = |position: usize| match arena.source {
            ChildSource::Flat => vec![position + 1],
            ChildSource::Nested => {
                let mut path = node.path.clone();
                path.push(position);
                path
            }
        };
        let children: Vec<&PlacedTreeNode> =
            arena.children.iter().map(|child| &nodes[child - 1]).collect();

        let (Some(&first), Some(&last)) = (children.first(), children.last()) else {
            if index == 0 {
                let row_top = node.y + options.item_height + options.level_gap;
                slots.push(AddSlot {
                    path: slot_path(0),
                    x: center_x(node) - half_btn,
                    y: row_top - options.btn_height - 5.0,
                });
            }
            continue;
        };
        let y = first.y - options.btn_height - 5.0;
        slots.push(AddSlot {
            path: slot_path(0),
            x: center_x(first) - half_step - half_btn,
            y,
        });
        for (position, pair) in children.windows(2).enumerate() {
            slots.push(AddSlot {
                path: slot_path(position + 1),
                x: (center_x(pair[0]) + center_x(pair[1])) / 2.0 - half_btn,
                y,
            });
        }
        slots.push(AddSlot {
            path: slot_path(children.len()),
            x: center_x(last) + half_step - half_btn,
            y,
        });
    }
    slots
}

struct WalkNode {
    path: ItemPath,
    source: ChildSource,
    depth: usize,
    parent: usize,
    children: Vec<usize>,
    /// Position among siblings.
    number: usize,
    ancestor: usize,
    default_ancestor: Option<usize>,
    prelim: f32,
    modifier: f32,
    change: f32,
    shift: f32,
    thread: Option<usize>,
}

/// Arena over the input tree. Slot 0 is a synthetic parent of the root so
/// the root can be walked like any other node.
struct Walker {
    nodes: Vec<WalkNode>,
}

impl Walker {
    fn new(root: &TreeNodeInput) -> Self {
        let mut walker = Self {
            nodes: Vec::with_capacity(root.count() + 1),
        };
        walker.push(ItemPath::new(), ChildSource::Nested, 0, 0, 0);
        walker.insert(root, 0, 0, 0);
        walker
    }

    fn push(&mut self, path: ItemPath, source: ChildSource, depth: usize, parent: usize, number: usize) -> usize {
        let id = self.nodes.len();
        self.nodes.push(WalkNode {
            path,
            source,
            depth,
            parent,
            children: Vec::new(),
            number,
            ancestor: id,
            default_ancestor: None,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
        });
        id
    }

    fn insert(&mut self, input: &TreeNodeInput, parent: usize, depth: usize, number: usize) {
        let id = self.push(input.path.clone(), input.source, depth, parent, number);
        self.nodes[parent].children.push(id);
        for (position, child) in input.children.iter().enumerate() {
            self.insert(child, id, depth + 1, position);
        }
    }

    fn run(&mut self) {
        self.post_order(1);
        self.nodes[0].modifier = -self.nodes[1].prelim;
        for id in 1..self.nodes.len() {
            // Pre-order: parents were pushed before their children.
            let parent = self.nodes[id].parent;
            let parent_modifier = self.nodes[parent].modifier;
            let node = &mut self.nodes[id];
            node.prelim += parent_modifier;
            node.modifier += parent_modifier;
        }
    }

    fn post_order(&mut self, id: usize) {
        for position in 0..self.nodes[id].children.len() {
            let child = self.nodes[id].children[position];
            self.post_order(child);
        }
        self.first_walk(id);
    }

    fn left_sibling(&self, v: usize) -> Option<usize> {
        let node = &self.nodes[v];
        (node.number > 0).then(|| self.nodes[node.parent].children[node.number - 1])
    }

    fn first_walk(&mut self, v: usize) {
        let parent = self.nodes[v].parent;
        let w = self.left_sibling(v);
        let children = &self.nodes[v].children;
        let ends = children.first().copied().zip(children.last().copied());
        if let Some((first, last)) = ends {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            match w {
                Some(w) => {
                    let prelim = self.nodes[w].prelim + 1.0;
                    self.nodes[v].prelim = prelim;
                    self.nodes[v].modifier = prelim - midpoint;
                }
                None => self.nodes[v].prelim = midpoint,
            }
        } else if let Some(w) = w {
            self.nodes[v].prelim = self.nodes[w].prelim + 1.0;
        }
        let default_ancestor = self.nodes[parent]
            .default_ancestor
            .unwrap_or(self.nodes[parent].children[0]);
        let ancestor = self.apportion(v, w, default_ancestor);
        self.nodes[parent].default_ancestor = Some(ancestor);
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.first().copied().or(self.nodes[v].thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.nodes[v].children.last().copied().or(self.nodes[v].thread)
    }

    fn apportion(&mut self, v: usize, w: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = w else {
            return ancestor;
        };
        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.nodes[self.nodes[v].parent].children[0];
        let mut sip = self.nodes[vip].modifier;
        let mut sop = self.nodes[vop].modifier;
        let mut sim = self.nodes[vim].modifier;
        let mut som = self.nodes[vom].modifier;

        let (inner_left, inner_right) = loop {
            match (self.next_right(vim), self.next_left(vip)) {
                (Some(next_im), Some(next_ip)) => {
                    vim = next_im;
                    vip = next_ip;
                }
                other => break other,
            }
            vom = self.next_left(vom).unwrap_or(vom);
            vop = self.next_right(vop).unwrap_or(vop);
            self.nodes[vop].ancestor = v;
            let shift = self.nodes[vim].prelim + sim - self.nodes[vip].prelim - sip + 1.0;
            if shift > 0.0 {
                let from = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(from, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.nodes[vim].modifier;
            sip += self.nodes[vip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;
        };

        if let Some(vim) = inner_left
            && self.next_right(vop).is_none()
        {
            self.nodes[vop].thread = Some(vim);
            self.nodes[vop].modifier += sim - sop;
        }
        if let Some(vip) = inner_right
            && self.next_left(vom).is_none()
        {
            self.nodes[vom].thread = Some(vip);
            self.nodes[vom].modifier += sip - som;
            ancestor = v;
        }
        ancestor
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.nodes[vim].ancestor;
        if self.nodes[candidate].parent == self.nodes[v].parent {
            candidate
        } else {
            ancestor
        }
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f32) {
        let subtrees = (self.nodes[wp].number - self.nodes[wm].number) as f32;
        let change = shift / subtrees;
        self.nodes[wp].change -= change;
        self.nodes[wp].shift += shift;
        self.nodes[wm].change += change;
        self.nodes[wp].prelim += shift;
        self.nodes[wp].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let children = self.nodes[v].children.clone();
        for &w in children.iter().rev() {
            let node = &mut self.nodes[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> TreeOptions {
        TreeOptions {
            item_width: 100.0,
            item_height: 40.0,
            node_gap: 20.0,
            level_gap: 60.0,
            btn_width: 20.0,
            btn_height: 20.0,
        }
    }

    fn flat(count: usize) -> Vec<ItemDatum> {
        (0..count)
            .map(|index| ItemDatum::labeled(&format!("item {index}")))
            .collect()
    }

    #[test]
    fn flat_items_hang_below_first() {
        let root = build_hierarchy(&flat(4)).expect("root");
        assert_eq!(root.source, ChildSource::Flat);
        let paths: Vec<_> = root.children.iter().map(|child| child.path.clone()).collect();
        assert_eq!(paths, vec![vec![1], vec![2], vec![3]]);
        assert!(build_hierarchy(&[]).is_none());
    }

    #[test]
    fn nested_children_keep_their_paths() {
        let mut items = flat(1);
        items[0].children = flat(2);
        items[0].children[1].children = flat(1);
        let root = build_hierarchy(&items).expect("root");
        assert_eq!(root.source, ChildSource::Nested);
        assert_eq!(root.children[1].children[0].path, vec![0, 1, 0]);
    }

    #[test]
    fn root_is_centered_over_children() {
        let opts = options();
        let layout = layout_tree(&build_hierarchy(&flat(4)).expect("root"), &opts);
        let xs: Vec<f32> = layout.nodes.iter().map(|node| node.x).collect();
        assert_eq!(xs, vec![120.0, 0.0, 120.0, 240.0]);
        assert_eq!(layout.nodes[0].y, 30.0);
        assert_eq!(layout.nodes[1].y, 130.0);
    }

    #[test]
    fn connectors_touch_parent_and_child() {
        let mut items = flat(1);
        items[0].children = flat(3);
        items[0].children[0].children = flat(2);
        let opts = options();
        let layout = layout_tree(&build_hierarchy(&items).expect("root"), &opts);
        assert_eq!(layout.connectors.len(), layout.nodes.len() - 1);
        for (node, connector) in layout.nodes[1..].iter().zip(&layout.connectors) {
            let parent = &layout.nodes[node.parent.expect("parent")];
            assert_eq!(connector.points[0], parent.bottom_center(&opts));
            assert_eq!(connector.points[3], node.top_center(&opts));
            assert_eq!(connector.points[1].y, connector.points[2].y);
        }
    }

    #[test]
    fn subtrees_do_not_overlap() {
        let mut items = flat(1);
        items[0].children = flat(2);
        items[0].children[0].children = flat(2);
        items[0].children[1].children = flat(2);
        let opts = options();
        let layout = layout_tree(&build_hierarchy(&items).expect("root"), &opts);
        let mut leaves: Vec<f32> = layout
            .nodes
            .iter()
            .filter(|node| node.depth == 2)
            .map(|node| node.x)
            .collect();
        leaves.sort_by(f32::total_cmp);
        for pair in leaves.windows(2) {
            assert_eq!(pair[1] - pair[0], 120.0);
        }
        let root = &layout.nodes[0];
        assert_eq!(root.x, (leaves[0] + leaves[3]) / 2.0);
    }

    #[test]
    fn add_slots_surround_each_sibling_group() {
        let opts = options();
        let layout = layout_tree(&build_hierarchy(&flat(3)).expect("root"), &opts);
        let paths: Vec<_> = layout.add_slots.iter().map(|slot| slot.path.clone()).collect();
        assert_eq!(paths, vec![vec![0], vec![1], vec![2], vec![3]]);
        let children = &layout.nodes[1..];
        let between = &layout.add_slots[2];
        let expected = (children[0].x + children[1].x) / 2.0 + 50.0 - 10.0;
        assert_eq!(between.x, expected);
        assert_eq!(between.y, children[0].y - 25.0);
    }

    #[test]
    fn lone_root_offers_first_child_slot() {
        let opts = options();
        let layout = layout_tree(&build_hierarchy(&flat(1)).expect("root"), &opts);
        assert_eq!(layout.add_slots.len(), 2);
        assert_eq!(layout.add_slots[1].path, vec![1]);
        assert_eq!(layout.add_slots[1].y, 30.0 + 40.0 + 60.0 - 25.0);
    }
}
