//! The three base color families and their alias map.
//!
//! Each family is 12 pre-vibrated `(r, g, b)` swatches, tuned warm to cool
//! across saturation and value, so a consumer can walk a family without
//! ever landing on a washed-out or near-achromatic entry.

/// One of the three base hue families a selection ultimately resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Red,
    Green,
    Blue,
}

impl Family {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        }
    }

    /// Resolve a free-form family/alias name (`"magenta"`, `"amber"`, ...)
    /// to its base family. Case-insensitive.
    #[must_use]
    pub fn resolve_alias(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "red" | "magenta" | "purple" | "pink" => Some(Self::Red),
            "green" | "amber" | "yellow" | "lime" => Some(Self::Green),
            "blue" | "cyan" | "aqua" | "teal" => Some(Self::Blue),
            _ => None,
        }
    }
}

/// 12 swatches per family, `(r, g, b)`, ordered warm-to-cool within family.
pub const RED_FAMILY: [(u8, u8, u8); 12] = [
    (255, 32, 24),
    (255, 64, 16),
    (244, 24, 90),
    (235, 10, 140),
    (210, 16, 180),
    (178, 24, 220),
    (150, 20, 230),
    (255, 90, 60),
    (220, 0, 60),
    (190, 40, 160),
    (255, 120, 90),
    (230, 60, 110),
];

pub const GREEN_FAMILY: [(u8, u8, u8); 12] = [
    (255, 220, 20),
    (255, 190, 10),
    (210, 255, 20),
    (150, 255, 30),
    (70, 255, 60),
    (20, 255, 110),
    (10, 230, 160),
    (255, 240, 120),
    (190, 230, 10),
    (40, 220, 90),
    (255, 205, 60),
    (120, 255, 150),
];

pub const BLUE_FAMILY: [(u8, u8, u8); 12] = [
    (20, 255, 230),
    (10, 220, 255),
    (20, 170, 255),
    (30, 120, 255),
    (40, 80, 255),
    (70, 50, 255),
    (110, 30, 255),
    (0, 255, 200),
    (15, 190, 230),
    (60, 140, 255),
    (0, 200, 255),
    (90, 100, 255),
];

#[must_use]
pub fn family_swatches(family: Family) -> &'static [(u8, u8, u8); 12] {
    match family {
        Family::Red => &RED_FAMILY,
        Family::Green => &GREEN_FAMILY,
        Family::Blue => &BLUE_FAMILY,
    }
}

#[cfg(test)]
mod tests {
    use super::{family_swatches, Family};

    #[test]
    fn alias_resolution_covers_documented_names() {
        assert_eq!(Family::resolve_alias("magenta"), Some(Family::Red));
        assert_eq!(Family::resolve_alias("PURPLE"), Some(Family::Red));
        assert_eq!(Family::resolve_alias("amber"), Some(Family::Green));
        assert_eq!(Family::resolve_alias("teal"), Some(Family::Blue));
        assert_eq!(Family::resolve_alias("nonsense"), None);
    }

    #[test]
    fn every_family_has_twelve_swatches() {
        assert_eq!(family_swatches(Family::Red).len(), 12);
        assert_eq!(family_swatches(Family::Green).len(), 12);
        assert_eq!(family_swatches(Family::Blue).len(), 12);
    }
}
