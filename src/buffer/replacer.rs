//! Clock (second-chance) victim selection.

use tracing::trace;

use super::error::{BufferError, BufferResult};
use super::frame::{FrameDesc, FrameId};

/// Clock hand over the frame table
///
/// The hand rests on the last frame it selected, so every scan starts one
/// position past it. It is never reset; only wraparound moves it back to 0.
pub struct ClockReplacer {
    hand: FrameId,
    num_frames: usize,
}

impl ClockReplacer {
    /// The hand starts on the last frame so the first probe is frame 0
    pub fn new(num_frames: usize) -> Self {
        debug_assert!(num_frames > 0);
        Self {
            hand: num_frames - 1,
            num_frames,
        }
    }

    pub fn hand(&self) -> FrameId {
        self.hand
    }

    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.num_frames;
    }

    /// Pick the next frame to reuse.
    ///
    /// An invalid frame is taken as soon as the hand reaches it. A valid frame
    /// with its reference bit set loses the bit and is skipped; a pinned frame
    /// is skipped. The first unpinned frame with a clear reference bit is the
    /// victim. The caller is responsible for writing it back and unmapping it.
    ///
    /// The scan covers at most two revolutions: the first can only clear
    /// reference bits, so if the second still finds nothing every frame is
    /// pinned.
    pub fn select_victim(&mut self, frames: &mut [FrameDesc]) -> BufferResult<FrameId> {
        debug_assert_eq!(frames.len(), self.num_frames);

        for _ in 0..2 * self.num_frames {
            self.advance();
            let frame = &mut frames[self.hand];

            if !frame.valid {
                trace!(frame = self.hand, "clock picked free frame");
                return Ok(self.hand);
            }
            if frame.ref_bit {
                frame.ref_bit = false;
                continue;
            }
            if frame.pin_count > 0 {
                continue;
            }

            trace!(
                frame = self.hand,
                page = frame.page_number,
                dirty = frame.dirty,
                "clock picked victim"
            );
            return Ok(self.hand);
        }

        Err(BufferError::BufferExceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::FileId;

    fn frames(n: usize) -> Vec<FrameDesc> {
        (0..n).map(FrameDesc::new).collect()
    }

    #[test]
    fn test_free_frames_taken_in_order() {
        let mut frames = frames(3);
        let mut clock = ClockReplacer::new(3);

        for expected in 0..3 {
            let frame = clock.select_victim(&mut frames).unwrap();
            assert_eq!(frame, expected);
            frames[frame].set(FileId(1), expected as u32 + 1);
        }
        assert_eq!(clock.hand(), 2);
    }

    #[test]
    fn test_all_pinned_exceeds() {
        let mut frames = frames(3);
        for (i, frame) in frames.iter_mut().enumerate() {
            frame.set(FileId(1), i as u32 + 1);
        }
        let mut clock = ClockReplacer::new(3);

        assert!(matches!(
            clock.select_victim(&mut frames),
            Err(BufferError::BufferExceeded)
        ));
        // The failed scan still consumed every reference bit
        assert!(frames.iter().all(|f| !f.ref_bit()));
    }

    #[test]
    fn test_second_chance() {
        let mut frames = frames(3);
        for (i, frame) in frames.iter_mut().enumerate() {
            frame.set(FileId(1), i as u32 + 1);
            frame.unpin();
        }
        // Frame 0 keeps its reference bit, frame 1 does not
        frames[1].ref_bit = false;
        frames[2].ref_bit = false;

        let mut clock = ClockReplacer::new(3);
        assert_eq!(clock.select_victim(&mut frames).unwrap(), 1);
        assert!(!frames[0].ref_bit());
    }

    #[test]
    fn test_pinned_frames_skipped() {
        let mut frames = frames(4);
        for (i, frame) in frames.iter_mut().enumerate() {
            frame.set(FileId(1), i as u32 + 1);
        }
        frames[2].unpin();

        let mut clock = ClockReplacer::new(4);
        assert_eq!(clock.select_victim(&mut frames).unwrap(), 2);
        assert_eq!(clock.hand(), 2);
    }

    #[test]
    fn test_hand_persists_across_calls() {
        let mut frames = frames(3);
        for (i, frame) in frames.iter_mut().enumerate() {
            frame.set(FileId(1), i as u32 + 1);
            frame.unpin();
            frame.ref_bit = false;
        }

        let mut clock = ClockReplacer::new(3);
        assert_eq!(clock.select_victim(&mut frames).unwrap(), 0);
        assert_eq!(clock.select_victim(&mut frames).unwrap(), 1);
        assert_eq!(clock.select_victim(&mut frames).unwrap(), 2);
        assert_eq!(clock.select_victim(&mut frames).unwrap(), 0);
    }
}
