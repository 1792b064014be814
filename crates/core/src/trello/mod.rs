//! Pure half of the Trello board import translator.
//!
//! Converting a Trello export into local entities happens in two layers:
//! this module (and its children) hold everything that needs no database
//! access -- structural validation of the untrusted payload, a single
//! replay pass over the action log, foreign-to-local identity mapping,
//! and the color/permission translation tables -- while the API crate's
//! `import` module drives the actual entity materialization.

pub mod actions;
pub mod identity;
pub mod schema;

/// Foreign system name recorded in import provenance.
pub const SYSTEM_NAME: &str = "Trello";

/// The local board color palette. The first entry is the default used
/// for unrecognized foreign background colors.
pub const BOARD_COLORS: &[&str] = &[
    "belize",
    "nephritis",
    "pomegranate",
    "pumpkin",
    "wisteria",
    "midnight",
];

/// Translate a Trello background color name to a local palette name.
///
/// Unrecognized colors (Trello also allows arbitrary background images)
/// fall back to the first palette entry.
pub fn board_color(trello_color: &str) -> &'static str {
    match trello_color {
        "blue" | "sky" => "belize",
        "green" | "lime" => "nephritis",
        "red" | "pink" => "pomegranate",
        "orange" => "pumpkin",
        "purple" => "wisteria",
        "grey" => "midnight",
        _ => BOARD_COLORS[0],
    }
}

/// Board visibility, the local counterpart of Trello's `permissionLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPermission {
    Public,
    Private,
}

impl BoardPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// Translate a Trello permission level.
///
/// There is no organization tier locally, so `org` collapses to private
/// along with everything that is not explicitly public.
pub fn board_permission(trello_permission: &str) -> BoardPermission {
    if trello_permission == "public" {
        BoardPermission::Public
    } else {
        BoardPermission::Private
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_colors_translate() {
        assert_eq!(board_color("blue"), "belize");
        assert_eq!(board_color("orange"), "pumpkin");
        assert_eq!(board_color("green"), "nephritis");
        assert_eq!(board_color("red"), "pomegranate");
        assert_eq!(board_color("purple"), "wisteria");
        assert_eq!(board_color("pink"), "pomegranate");
        assert_eq!(board_color("lime"), "nephritis");
        assert_eq!(board_color("sky"), "belize");
        assert_eq!(board_color("grey"), "midnight");
    }

    #[test]
    fn unknown_color_falls_back_to_palette_default() {
        assert_eq!(board_color("chartreuse"), BOARD_COLORS[0]);
        assert_eq!(board_color(""), BOARD_COLORS[0]);
    }

    #[test]
    fn public_stays_public() {
        assert_eq!(board_permission("public"), BoardPermission::Public);
    }

    #[test]
    fn org_collapses_to_private() {
        assert_eq!(board_permission("org"), BoardPermission::Private);
        assert_eq!(board_permission("private"), BoardPermission::Private);
    }
}
