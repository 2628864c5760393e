//! Named box-face regions of the block.

use std::fmt;
use std::str::FromStr;

/// One of the six faces of the block.
///
/// Naming follows the usual box convention: Left/Right bound `x`,
/// Near/Far bound `y`, Bottom/Top bound `z`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoxFace {
    Left,
    Right,
    Near,
    Far,
    Bottom,
    Top,
}

impl BoxFace {
    pub const ALL: [BoxFace; 6] = [
        BoxFace::Left,
        BoxFace::Right,
        BoxFace::Near,
        BoxFace::Far,
        BoxFace::Bottom,
        BoxFace::Top,
    ];

    /// Coordinate axis normal to the face.
    pub fn axis(self) -> usize {
        match self {
            BoxFace::Left | BoxFace::Right => 0,
            BoxFace::Near | BoxFace::Far => 1,
            BoxFace::Bottom | BoxFace::Top => 2,
        }
    }

    /// True for the face at the maximum coordinate.
    pub fn is_max(self) -> bool {
        matches!(self, BoxFace::Right | BoxFace::Far | BoxFace::Top)
    }

    pub fn name(self) -> &'static str {
        match self {
            BoxFace::Left => "Left",
            BoxFace::Right => "Right",
            BoxFace::Near => "Near",
            BoxFace::Far => "Far",
            BoxFace::Bottom => "Bottom",
            BoxFace::Top => "Top",
        }
    }
}

impl fmt::Display for BoxFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BoxFace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoxFace::ALL
            .iter()
            .copied()
            .find(|face| face.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown box face '{}'", s))
    }
}
