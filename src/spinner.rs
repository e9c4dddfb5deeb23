use std::time::Duration;

/// Glyphs cycled by the loading indicator.
pub const SPINNER_FRAMES: &[&str] = &["|", "/", "--", "\\"];

/// Delay between spinner frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(330);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spinner {
    frames: &'static [&'static str],
    index: usize,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new(SPINNER_FRAMES)
    }
}

impl Spinner {
    pub fn new(frames: &'static [&'static str]) -> Self {
        Self { frames, index: 0 }
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn glyph(&self) -> &'static str {
        self.frames.get(self.index).copied().unwrap_or("")
    }

    /// Advances one frame, wrapping at the end of the sequence.
    pub fn tick(&mut self) -> &'static str {
        if !self.frames.is_empty() {
            self.index = (self.index + 1) % self.frames.len();
        }
        self.glyph()
    }
}
