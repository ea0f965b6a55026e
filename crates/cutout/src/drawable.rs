//! Scene-graph nodes stored in an arena.
//!
//! Nodes are addressed by `DrawableId`. A node's children list holds
//! owning ids; the parent link is a non-owning back-reference. Ids are
//! never reused within one arena.

use crate::channel::{Channel, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawableId(usize);

/// One articulated part: local transform, placed transform, and the
/// channels that can drive it.
#[derive(Debug, Clone)]
pub struct Drawable {
    name: String,
    position: Point,
    rotation: f32,
    placed_position: Point,
    placed_rotation: f32,
    angle_channel: Channel<f32>,
    position_channel: Option<Channel<Point>>,
    parent: Option<DrawableId>,
    children: Vec<DrawableId>,
}

impl Drawable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Point::ZERO,
            rotation: 0.0,
            placed_position: Point::ZERO,
            placed_rotation: 0.0,
            angle_channel: Channel::new(),
            position_channel: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    /// Opt this node into position animation.
    pub fn with_position_channel(mut self) -> Self {
        self.position_channel = Some(Channel::new());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
    }

    pub fn placed_position(&self) -> Point {
        self.placed_position
    }

    pub fn placed_rotation(&self) -> f32 {
        self.placed_rotation
    }

    pub fn angle_channel(&self) -> &Channel<f32> {
        &self.angle_channel
    }

    pub fn angle_channel_mut(&mut self) -> &mut Channel<f32> {
        &mut self.angle_channel
    }

    pub fn position_channel(&self) -> Option<&Channel<Point>> {
        self.position_channel.as_ref()
    }

    pub fn position_channel_mut(&mut self) -> Option<&mut Channel<Point>> {
        self.position_channel.as_mut()
    }

    pub(crate) fn ensure_position_channel(&mut self) -> &mut Channel<Point> {
        self.position_channel.get_or_insert_with(Channel::new)
    }

    pub fn parent(&self) -> Option<DrawableId> {
        self.parent
    }

    pub fn children(&self) -> &[DrawableId] {
        &self.children
    }

    /// Drive local state from the channels at `frame`. A channel with no
    /// keyframes leaves its part of the state alone.
    pub fn animate(&mut self, frame: i32) {
        self.angle_channel.set_frame(frame);
        if let Some(angle) = self.angle_channel.value() {
            self.rotation = angle;
        }
        if let Some(channel) = &mut self.position_channel {
            channel.set_frame(frame);
            if let Some(position) = channel.value() {
                self.position = position;
            }
        }
    }

    /// Capture the current local state as keyframes at `frame`.
    pub fn set_keyframes(&mut self, frame: i32) {
        self.angle_channel.set_keyframe(frame, self.rotation);
        let position = self.position;
        if let Some(channel) = &mut self.position_channel {
            channel.set_keyframe(frame, position);
        }
    }

    pub fn delete_keyframes(&mut self, frame: i32) {
        self.angle_channel.delete_keyframe(frame);
        if let Some(channel) = &mut self.position_channel {
            channel.delete_keyframe(frame);
        }
    }
}

/// Rotate `point` by `angle` radians on the pixel grid, truncating the
/// rotated coordinates to integers. The y axis points down.
pub fn rotate_point(point: Point, angle: f32) -> Point {
    let (sin, cos) = angle.sin_cos();
    Point::new(
        (cos * point.x as f32 + sin * point.y as f32) as i32,
        (-sin * point.x as f32 + cos * point.y as f32) as i32,
    )
}

#[derive(Debug, Clone, Default)]
pub struct DrawableArena {
    nodes: Vec<Drawable>,
}

impl DrawableArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, drawable: Drawable) -> DrawableId {
        let id = DrawableId(self.nodes.len());
        self.nodes.push(drawable);
        id
    }

    pub fn get(&self, id: DrawableId) -> Option<&Drawable> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: DrawableId) -> Option<&mut Drawable> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DrawableId, &Drawable)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (DrawableId(index), node))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (DrawableId, &mut Drawable)> {
        self.nodes
            .iter_mut()
            .enumerate()
            .map(|(index, node)| (DrawableId(index), node))
    }

    /// Link `child` under `parent`. Both ids must belong to this arena;
    /// unknown ids are ignored.
    pub fn add_child(&mut self, parent: DrawableId, child: DrawableId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() || parent == child {
            return;
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Place `id` at `offset` rotated by `rotate`, then its subtree with
    /// the resulting transform.
    pub fn place(&mut self, id: DrawableId, offset: Point, rotate: f32) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        node.placed_position = offset + rotate_point(node.position, rotate);
        node.placed_rotation = node.rotation + rotate;
        let placed_position = node.placed_position;
        let placed_rotation = node.placed_rotation;

        let children = node.children.clone();
        for child in children {
            self.place(child, placed_position, placed_rotation);
        }
    }

    /// Depth-first walk from `id` in tree order.
    pub fn visit(&self, id: DrawableId, visitor: &mut impl FnMut(&Drawable)) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        visitor(node);
        for child in &node.children {
            self.visit(*child, visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::FRAC_PI_2;

    use super::*;

    #[test]
    fn rotate_point_quarter_turn() {
        let turned = rotate_point(Point::new(10, 0), FRAC_PI_2);
        // cos ~ 0, sin ~ 1: x lands near 0, y near -10.
        assert!(turned.x.abs() <= 1);
        assert!((turned.y + 10).abs() <= 1);
    }

    #[test]
    fn place_offsets_root_and_chains_children() {
        let mut arena = DrawableArena::new();
        let torso = arena.insert(Drawable::new("torso"));
        let arm = arena.insert(Drawable::new("arm").with_position(Point::new(0, 20)));
        arena.add_child(torso, arm);

        arena.place(torso, Point::new(100, 200), 0.0);

        let torso_node = arena.get(torso).expect("torso");
        assert_eq!(torso_node.placed_position(), Point::new(100, 200));
        let arm_node = arena.get(arm).expect("arm");
        assert_eq!(arm_node.placed_position(), Point::new(100, 220));
        assert_eq!(arm_node.parent(), Some(torso));
    }

    #[test]
    fn parent_rotation_swings_the_child() {
        let mut arena = DrawableArena::new();
        let torso = arena.insert(Drawable::new("torso"));
        let arm = arena.insert(Drawable::new("arm").with_position(Point::new(10, 0)));
        arena.add_child(torso, arm);

        arena
            .get_mut(torso)
            .expect("torso")
            .set_rotation(FRAC_PI_2);
        arena.place(torso, Point::ZERO, 0.0);

        let arm_node = arena.get(arm).expect("arm");
        // The child offset rotates with the parent's placed rotation.
        assert!(arm_node.placed_position().x.abs() <= 1);
        assert!((arm_node.placed_position().y + 10).abs() <= 1);
        assert!((arm_node.placed_rotation() - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn animate_overrides_state_only_from_valid_channels() {
        let mut node = Drawable::new("arm").with_position(Point::new(5, 5));
        node.set_rotation(1.0);

        // No keyframes anywhere: state untouched.
        node.animate(10);
        assert_eq!(node.rotation(), 1.0);
        assert_eq!(node.position(), Point::new(5, 5));

        node.angle_channel_mut().set_keyframe(0, 0.0);
        node.angle_channel_mut().set_keyframe(10, 2.0);
        node.animate(5);
        assert_eq!(node.rotation(), 1.0);
        node.animate(10);
        assert_eq!(node.rotation(), 2.0);
        // Position stays manual without a position channel.
        assert_eq!(node.position(), Point::new(5, 5));
    }

    #[test]
    fn set_keyframes_captures_current_state() {
        let mut node = Drawable::new("leg").with_position_channel();
        node.set_rotation(0.5);
        node.set_position(Point::new(3, 4));
        node.set_keyframes(12);

        node.set_rotation(0.0);
        node.set_position(Point::ZERO);
        node.animate(12);
        assert_eq!(node.rotation(), 0.5);
        assert_eq!(node.position(), Point::new(3, 4));

        node.delete_keyframes(12);
        assert!(!node.angle_channel().is_valid());
    }

    #[test]
    fn visit_walks_in_tree_order() {
        let mut arena = DrawableArena::new();
        let root = arena.insert(Drawable::new("root"));
        let a = arena.insert(Drawable::new("a"));
        let b = arena.insert(Drawable::new("b"));
        let a_child = arena.insert(Drawable::new("a-child"));
        arena.add_child(root, a);
        arena.add_child(root, b);
        arena.add_child(a, a_child);

        let mut names = Vec::new();
        arena.visit(root, &mut |node| names.push(node.name().to_string()));
        assert_eq!(names, vec!["root", "a", "a-child", "b"]);
    }
}
