//! An actor: one drawable tree plus its own animated root position.

use crate::channel::{Channel, Point};
use crate::drawable::{Drawable, DrawableArena, DrawableId};

pub struct Actor {
    name: String,
    position: Point,
    position_channel: Channel<Point>,
    arena: DrawableArena,
    root: Option<DrawableId>,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Point::ZERO,
            position_channel: Channel::new(),
            arena: DrawableArena::new(),
            root: None,
        }
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

    pub fn position_channel(&self) -> &Channel<Point> {
        &self.position_channel
    }

    pub fn position_channel_mut(&mut self) -> &mut Channel<Point> {
        &mut self.position_channel
    }

    pub fn arena(&self) -> &DrawableArena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut DrawableArena {
        &mut self.arena
    }

    pub fn root(&self) -> Option<DrawableId> {
        self.root
    }

    pub fn add_drawable(&mut self, drawable: Drawable) -> DrawableId {
        self.arena.insert(drawable)
    }

    /// Make `id` the root of this actor's tree.
    pub fn set_root(&mut self, id: DrawableId) {
        self.root = Some(id);
    }

    /// Drive the actor position and every node from the channels at
    /// `frame`.
    pub fn animate(&mut self, frame: i32) {
        self.position_channel.set_frame(frame);
        if let Some(position) = self.position_channel.value() {
            self.position = position;
        }
        for (_, node) in self.arena.iter_mut() {
            node.animate(frame);
        }
    }

    /// Recompute placed transforms from the root down.
    pub fn place(&mut self) {
        if let Some(root) = self.root {
            self.arena.place(root, self.position, 0.0);
        }
    }

    /// Capture the current pose as keyframes at `frame`.
    pub fn set_keyframes(&mut self, frame: i32) {
        self.position_channel.set_keyframe(frame, self.position);
        for (_, node) in self.arena.iter_mut() {
            node.set_keyframes(frame);
        }
    }

    pub fn delete_keyframes(&mut self, frame: i32) {
        self.position_channel.delete_keyframe(frame);
        for (_, node) in self.arena.iter_mut() {
            node.delete_keyframes(frame);
        }
    }

    /// Visit this actor's nodes in tree order.
    pub fn visit(&self, visitor: &mut impl FnMut(&Drawable)) {
        if let Some(root) = self.root {
            self.arena.visit(root, visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harold() -> Actor {
        let mut actor = Actor::new("harold");
        let torso = actor.add_drawable(Drawable::new("torso"));
        let arm = actor.add_drawable(
            Drawable::new("arm").with_position(Point::new(0, 30)),
        );
        actor.arena_mut().add_child(torso, arm);
        actor.set_root(torso);
        actor
    }

    #[test]
    fn position_channel_overrides_actor_position() {
        let mut actor = harold();
        actor.set_position(Point::new(1, 1));
        actor.position_channel_mut().set_keyframe(0, Point::new(100, 200));
        actor.position_channel_mut().set_keyframe(10, Point::new(200, 200));

        actor.animate(5);
        actor.place();
        assert_eq!(actor.position(), Point::new(150, 200));

        let root = actor.root().expect("root");
        let torso = actor.arena().get(root).expect("torso");
        assert_eq!(torso.placed_position(), Point::new(150, 200));
    }

    #[test]
    fn pose_round_trips_through_keyframes() {
        let mut actor = harold();
        actor.set_position(Point::new(50, 60));
        let root = actor.root().expect("root");
        actor
            .arena_mut()
            .get_mut(root)
            .expect("torso")
            .set_rotation(0.25);
        actor.set_keyframes(8);

        actor.set_position(Point::ZERO);
        actor
            .arena_mut()
            .get_mut(root)
            .expect("torso")
            .set_rotation(0.0);

        actor.animate(8);
        assert_eq!(actor.position(), Point::new(50, 60));
        let torso = actor.arena().get(root).expect("torso");
        assert_eq!(torso.rotation(), 0.25);
    }

    #[test]
    fn visit_covers_the_whole_tree() {
        let actor = harold();
        let mut names = Vec::new();
        actor.visit(&mut |node| names.push(node.name().to_string()));
        assert_eq!(names, vec!["torso", "arm"]);
    }
}
