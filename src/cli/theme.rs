use std::fmt::{Display, Formatter};

/// Display-mode preference, persisted under its own storage key and cycled
/// cosmic -> neon -> vintage -> cosmic. Unrecognized stored values fall back
/// to cosmic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Cosmic,
    Neon,
    Vintage,
}

impl Theme {
    pub fn from_wire(s: &str) -> Theme {
        match s {
            "neon" => Theme::Neon,
            "vintage" => Theme::Vintage,
            _ => Theme::Cosmic,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            Theme::Cosmic => "cosmic",
            Theme::Neon => "neon",
            Theme::Vintage => "vintage",
        }
    }

    pub fn cycle(self) -> Theme {
        match self {
            Theme::Cosmic => Theme::Neon,
            Theme::Neon => Theme::Vintage,
            Theme::Vintage => Theme::Cosmic,
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}
