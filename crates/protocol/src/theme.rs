use serde::{Deserialize, Serialize};

/// Semantic color tokens resolved by the renderer's active theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThemeToken {
    // Event bars, cycled by position within the track.
    Palette0,
    Palette1,
    Palette2,
    Palette3,
    Palette4,
    Palette5,

    SelectionHighlight,

    Background,
    RowBackground,

    EventLabelText,
    TrackLabelBackground,
    TrackLabelText,

    AxisBackground,
    AxisTick,
    AxisText,
}

impl ThemeToken {
    /// The repeating event palette, in cycle order.
    pub const PALETTE: [ThemeToken; 6] = [
        ThemeToken::Palette0,
        ThemeToken::Palette1,
        ThemeToken::Palette2,
        ThemeToken::Palette3,
        ThemeToken::Palette4,
        ThemeToken::Palette5,
    ];

    /// Palette color for the event painted at `slot` within its track.
    pub fn palette(slot: usize) -> ThemeToken {
        Self::PALETTE[slot % Self::PALETTE.len()]
    }
}
