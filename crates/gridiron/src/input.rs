/// Discrete movement intents for one tick. An embedding shell translates
/// raw device input into this before calling `World::update`; the core
/// never reads devices itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intents {
    left: bool,
    right: bool,
    jump: bool,
}

impl Intents {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_left(mut self, left: bool) -> Self {
        self.left = left;
        self
    }

    pub fn with_right(mut self, right: bool) -> Self {
        self.right = right;
        self
    }

    pub fn with_jump(mut self, jump: bool) -> Self {
        self.jump = jump;
        self
    }

    pub fn left(&self) -> bool {
        self.left
    }

    pub fn right(&self) -> bool {
        self.right
    }

    pub fn jump(&self) -> bool {
        self.jump
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_individual_intents() {
        let intents = Intents::empty().with_right(true).with_jump(true);
        assert!(!intents.left());
        assert!(intents.right());
        assert!(intents.jump());
    }
}
