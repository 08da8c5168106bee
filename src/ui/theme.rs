/// Tile colour schemes (256-colour palette).
///
/// Each scheme is a table of (background, foreground) pairs indexed by
/// rank. Ranks past the end of the table reuse the last entry.

use crossterm::style::Color;
use serde::Deserialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    #[default]
    Original,
    Blackwhite,
    Bluered,
}

const ORIGINAL: [(u8, u8); 16] = [
    (8, 255), (1, 255), (2, 255), (3, 255), (4, 255), (5, 255), (6, 255), (7, 255),
    (9, 0), (10, 0), (11, 0), (12, 0), (13, 0), (14, 0), (255, 0), (255, 0),
];

const BLACKWHITE: [(u8, u8); 16] = [
    (232, 255), (234, 255), (236, 255), (238, 255), (240, 255), (242, 255), (244, 255), (246, 0),
    (248, 0), (249, 0), (250, 0), (251, 0), (252, 0), (253, 0), (254, 0), (255, 0),
];

const BLUERED: [(u8, u8); 16] = [
    (235, 255), (63, 255), (57, 255), (93, 255), (129, 255), (165, 255), (201, 255), (200, 255),
    (199, 255), (198, 255), (197, 255), (196, 255), (196, 255), (196, 255), (196, 255), (196, 255),
];

impl Scheme {
    pub fn from_name(s: &str) -> Option<Scheme> {
        match s.to_lowercase().as_str() {
            "original" => Some(Scheme::Original),
            "blackwhite" => Some(Scheme::Blackwhite),
            "bluered" => Some(Scheme::Bluered),
            _ => None,
        }
    }

    fn table(self) -> &'static [(u8, u8); 16] {
        match self {
            Scheme::Original => &ORIGINAL,
            Scheme::Blackwhite => &BLACKWHITE,
            Scheme::Bluered => &BLUERED,
        }
    }

    /// (background, foreground) for a tile of this rank.
    pub fn tile_colors(self, rank: u8) -> (Color, Color) {
        let table = self.table();
        let (bg, fg) = table[(rank as usize).min(table.len() - 1)];
        (Color::AnsiValue(bg), Color::AnsiValue(fg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tile_colors() {
        assert_eq!(
            Scheme::Original.tile_colors(0),
            (Color::AnsiValue(8), Color::AnsiValue(255))
        );
        assert_eq!(
            Scheme::Bluered.tile_colors(0),
            (Color::AnsiValue(235), Color::AnsiValue(255))
        );
    }

    #[test]
    fn dark_text_on_light_tiles() {
        // 256 = rank 8 switches to black text in the original scheme
        assert_eq!(Scheme::Original.tile_colors(8).1, Color::AnsiValue(0));
        assert_eq!(Scheme::Blackwhite.tile_colors(7).1, Color::AnsiValue(0));
    }

    #[test]
    fn high_ranks_clamp_to_last_entry() {
        assert_eq!(Scheme::Blackwhite.tile_colors(15), Scheme::Blackwhite.tile_colors(30));
        assert_eq!(Scheme::Original.tile_colors(20).0, Color::AnsiValue(255));
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Scheme::from_name("BlueRed"), Some(Scheme::Bluered));
        assert_eq!(Scheme::from_name("sepia"), None);
    }
}
