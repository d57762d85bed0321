//! Viewport width → items-per-view classification

use madrasa_common::config::BreakpointConfig;

/// Sorted breakpoint table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakpoints {
    entries: Vec<BreakpointConfig>,
}

impl Breakpoints {
    /// Build from config entries (any order; zero sizes become 1)
    ///
    /// An empty list classifies every width as 1 item per view.
    pub fn new(entries: &[BreakpointConfig]) -> Self {
        let mut entries: Vec<BreakpointConfig> = entries
            .iter()
            .map(|bp| BreakpointConfig {
                min_width: bp.min_width,
                items_per_view: bp.items_per_view.max(1),
            })
            .collect();
        entries.sort_by_key(|bp| bp.min_width);
        Self { entries }
    }

    /// Items per view for a viewport `width` pixels wide
    ///
    /// Uses the widest breakpoint whose `min_width` fits; widths below the
    /// smallest breakpoint use the smallest one.
    pub fn classify(&self, width: u32) -> usize {
        self.entries
            .iter()
            .rev()
            .find(|bp| bp.min_width <= width)
            .or_else(|| self.entries.first())
            .map_or(1, |bp| bp.items_per_view)
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::new(&madrasa_common::config::RotationConfig::default().breakpoints)
    }
}
