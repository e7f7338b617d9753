/// One of the eight fixed resize grips on an overlay's bounding box, named by
/// compass direction. The direction decides which edges a resize moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Class name the host markup tags handle elements with (`"nw"`, `"se"`).
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::North => "n",
            Self::NorthEast => "ne",
            Self::East => "e",
            Self::SouthEast => "se",
            Self::South => "s",
            Self::SouthWest => "sw",
            Self::West => "w",
            Self::NorthWest => "nw",
        }
    }

    pub fn from_css_class(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|handle| handle.css_class() == value)
    }

    pub const fn moves_left_edge(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    pub const fn moves_right_edge(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub const fn moves_top_edge(self) -> bool {
        matches!(self, Self::North | Self::NorthWest | Self::NorthEast)
    }

    pub const fn moves_bottom_edge(self) -> bool {
        matches!(self, Self::South | Self::SouthWest | Self::SouthEast)
    }
}
