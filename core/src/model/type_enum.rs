use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Entity-kind selector shared by the store operations and the routes.
///
/// Parses from both the display name (`Venue`) and the path segment
/// (`venues`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr, Serialize,
)]
pub enum EntityKind {
    #[strum(serialize = "venues", to_string = "Venue")]
    Venue,
    #[strum(serialize = "artists", to_string = "Artist")]
    Artist,
    #[strum(serialize = "shows", to_string = "Show")]
    Show,
}

impl EntityKind {
    pub fn path_segment(&self) -> &'static str {
        match self {
            EntityKind::Venue => "venues",
            EntityKind::Artist => "artists",
            EntityKind::Show => "shows",
        }
    }
}
