use crate::{FRAME_HEIGHT, FRAME_WIDTH};

/// Stacked grayscale frames of shape `[84, 84, n_stack]`, channel last.
///
/// Channel `n_stack - 1` is the newest frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AtariObs {
    frames: Vec<u8>,
    n_stack: usize,
}

impl AtariObs {
    /// Interleaves frames, oldest first, into a channel-last buffer.
    pub(crate) fn from_frames<'a>(frames: impl ExactSizeIterator<Item = &'a Vec<u8>>) -> Self {
        let n_stack = frames.len();
        let mut buf = vec![0u8; FRAME_WIDTH * FRAME_HEIGHT * n_stack];
        for (k, frame) in frames.enumerate() {
            for (p, &v) in frame.iter().enumerate() {
                buf[p * n_stack + k] = v;
            }
        }
        Self {
            frames: buf,
            n_stack,
        }
    }

    /// Shape of the observation.
    pub fn shape(&self) -> [usize; 3] {
        [FRAME_HEIGHT, FRAME_WIDTH, self.n_stack]
    }

    /// Raw buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.frames
    }

    /// Extracts the `k`-th frame of the stack.
    pub fn frame(&self, k: usize) -> Vec<u8> {
        assert!(k < self.n_stack);
        self.frames
            .iter()
            .skip(k)
            .step_by(self.n_stack)
            .copied()
            .collect()
    }
}

impl From<AtariObs> for Vec<u8> {
    fn from(obs: AtariObs) -> Self {
        obs.frames
    }
}
