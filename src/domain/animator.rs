// Animation drivers: units that override an entity's sprite per tick.

use super::behavior::{Behavior, Capability, Context};
use super::math::Rect;

/// Read side of an animation driver, consulted by the entity's sprite getters.
pub trait Animator {
    fn sprite(&self) -> Option<&str>;
    fn sprite_rect(&self) -> Option<Rect>;
}

/// Steps through sprite-sheet frames, holding each one for a number of ticks.
#[derive(Debug, Clone)]
pub struct SpriteAnimator {
    sprite: String,
    frames: Vec<Rect>,
    ticks_per_frame: u64,
    looping: bool,
    playing: bool,
    frame: usize,
    elapsed: u64,
}

impl SpriteAnimator {
    pub fn new(sprite: impl Into<String>, frames: Vec<Rect>, ticks_per_frame: u64) -> Self {
        Self {
            sprite: sprite.into(),
            frames,
            ticks_per_frame: ticks_per_frame.max(1),
            looping: true,
            playing: true,
            frame: 0,
            elapsed: 0,
        }
    }

    /// Stop on the last frame instead of wrapping around.
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    /// Restarts from the first frame.
    pub fn play(&mut self) {
        self.frame = 0;
        self.elapsed = 0;
        self.playing = true;
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn current_frame(&self) -> usize {
        self.frame
    }

    /// True once a non-looping animation has reached its last frame.
    pub fn is_finished(&self) -> bool {
        !self.looping && self.frame + 1 >= self.frames.len()
    }

    fn advance(&mut self) {
        if !self.playing || self.frames.is_empty() {
            return;
        }
        self.elapsed += 1;
        if self.elapsed < self.ticks_per_frame {
            return;
        }
        self.elapsed = 0;
        if self.frame + 1 < self.frames.len() {
            self.frame += 1;
        } else if self.looping {
            self.frame = 0;
        } else {
            self.playing = false;
        }
    }
}

impl Animator for SpriteAnimator {
    fn sprite(&self) -> Option<&str> {
        Some(&self.sprite)
    }

    fn sprite_rect(&self) -> Option<Rect> {
        self.frames.get(self.frame).copied()
    }
}

impl Behavior for SpriteAnimator {
    fn capabilities(&self) -> &'static [Capability] {
        &[Capability::Animator]
    }

    fn animator(&self) -> Option<&dyn Animator> {
        Some(self)
    }

    fn update(&mut self, _ctx: &mut Context<'_>, _tick: u64) {
        self.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(count: usize) -> Vec<Rect> {
        (0..count)
            .map(|i| Rect::new(i as f32 * 16.0, 0.0, 16.0, 16.0))
            .collect()
    }

    #[test]
    fn when_ticks_per_frame_elapse_then_frame_advances_and_loops() {
        let mut animator = SpriteAnimator::new("ship", frames(2), 2);

        animator.advance();
        assert_eq!(animator.current_frame(), 0);
        animator.advance();
        assert_eq!(animator.current_frame(), 1);
        animator.advance();
        animator.advance();
        assert_eq!(animator.current_frame(), 0);
    }

    #[test]
    fn when_playing_once_then_animation_holds_last_frame() {
        let mut animator = SpriteAnimator::new("explosion", frames(3), 1).once();

        for _ in 0..10 {
            animator.advance();
        }

        assert_eq!(animator.current_frame(), 2);
        assert!(animator.is_finished());
        assert_eq!(animator.sprite_rect(), Some(Rect::new(32.0, 0.0, 16.0, 16.0)));
    }

    #[test]
    fn when_stopped_then_frame_does_not_change() {
        let mut animator = SpriteAnimator::new("ship", frames(4), 1);
        animator.stop();
        animator.advance();
        assert_eq!(animator.current_frame(), 0);

        animator.play();
        animator.advance();
        assert_eq!(animator.current_frame(), 1);
    }
}
