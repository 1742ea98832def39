use serde::{Deserialize, Serialize};

/// Tokens handed out to main-passenger groups, in hand-out order. The
/// dashboards render them as row tints; the engine treats them as opaque
/// strings.
pub const DEFAULT_GROUP_COLORS: [&str; 8] = [
    "red", "blue", "green", "orange", "purple", "teal", "pink", "brown",
];

/// An ordered palette of distinct color tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupPalette {
    colors: Vec<String>,
}

impl GroupPalette {
    pub fn new(colors: Vec<String>) -> Self {
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn color_at(&self, idx: usize) -> &str {
        &self.colors[idx]
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.colors.iter().map(|c| c.as_str())
    }
}

impl Default for GroupPalette {
    fn default() -> Self {
        Self {
            colors: DEFAULT_GROUP_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_palette_tokens_are_distinct() {
        let palette = GroupPalette::default();
        let mut seen = std::collections::HashSet::new();
        for color in palette.iter() {
            assert!(seen.insert(color.to_string()), "duplicate token {}", color);
        }
        assert_eq!(seen.len(), palette.len());
    }
}
