/// Runtime knobs. Defaults are what a mounted root uses when nothing is passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Upper bound on render+commit rounds within one flush. A component that
    /// sets state on every render or every effect run trips this.
    pub max_render_passes: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_render_passes: 64,
        }
    }
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_render_passes(mut self, passes: usize) -> Self {
        self.max_render_passes = passes.max(1);
        self
    }
}
