/// How the left/right margin bytes of each row header are filled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarginMode {
    /// Count the blank pixels at each edge of the row.
    #[default]
    Computed,
    /// Always send 0/0, for firmware that ignores the margin bytes.
    Zeroed,
}

/// Controls row generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RasterOptions {
    pub margin_mode: MarginMode,
}

impl RasterOptions {
    pub fn with_margin_mode(mut self, margin_mode: MarginMode) -> Self {
        self.margin_mode = margin_mode;
        self
    }
}
