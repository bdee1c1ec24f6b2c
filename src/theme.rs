use catppuccin::PALETTE;
use ratatui::style::Color;

const fn rgb(c: &catppuccin::Color) -> Color {
    Color::Rgb(c.rgb.r, c.rgb.g, c.rgb.b)
}

/// Colour palette used by every component.
///
/// Components never hard-code colours; they ask the theme for a role
/// (`header()`, `error()`, `selection_bg()`) or a raw palette entry.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    base: Color,
    mantle: Color,
    surface0: Color,
    surface1: Color,
    surface2: Color,
    overlay0: Color,
    overlay1: Color,
    text: Color,
    subtext0: Color,
    subtext1: Color,
    mauve: Color,
    red: Color,
    peach: Color,
    yellow: Color,
    green: Color,
    teal: Color,
    blue: Color,
    lavender: Color,
}

impl Theme {
    const fn from_catppuccin(flavor: &catppuccin::Flavor) -> Self {
        let c = &flavor.colors;
        Self {
            base: rgb(&c.base),
            mantle: rgb(&c.mantle),
            surface0: rgb(&c.surface0),
            surface1: rgb(&c.surface1),
            surface2: rgb(&c.surface2),
            overlay0: rgb(&c.overlay0),
            overlay1: rgb(&c.overlay1),
            text: rgb(&c.text),
            subtext0: rgb(&c.subtext0),
            subtext1: rgb(&c.subtext1),
            mauve: rgb(&c.mauve),
            red: rgb(&c.red),
            peach: rgb(&c.peach),
            yellow: rgb(&c.yellow),
            green: rgb(&c.green),
            teal: rgb(&c.teal),
            blue: rgb(&c.blue),
            lavender: rgb(&c.lavender),
        }
    }

    #[must_use]
    pub fn catppuccin_mocha() -> Self {
        Self::from_catppuccin(&PALETTE.mocha)
    }

    #[must_use]
    pub fn catppuccin_macchiato() -> Self {
        Self::from_catppuccin(&PALETTE.macchiato)
    }

    #[must_use]
    pub fn catppuccin_frappe() -> Self {
        Self::from_catppuccin(&PALETTE.frappe)
    }

    #[must_use]
    pub fn catppuccin_latte() -> Self {
        Self::from_catppuccin(&PALETTE.latte)
    }

    #[must_use]
    pub const fn base(&self) -> Color {
        self.base
    }

    #[must_use]
    pub const fn mantle(&self) -> Color {
        self.mantle
    }

    #[must_use]
    pub const fn surface0(&self) -> Color {
        self.surface0
    }

    #[must_use]
    pub const fn surface1(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn surface2(&self) -> Color {
        self.surface2
    }

    #[must_use]
    pub const fn overlay0(&self) -> Color {
        self.overlay0
    }

    #[must_use]
    pub const fn overlay1(&self) -> Color {
        self.overlay1
    }

    #[must_use]
    pub const fn text(&self) -> Color {
        self.text
    }

    #[must_use]
    pub const fn subtext0(&self) -> Color {
        self.subtext0
    }

    #[must_use]
    pub const fn subtext1(&self) -> Color {
        self.subtext1
    }

    #[must_use]
    pub const fn mauve(&self) -> Color {
        self.mauve
    }

    #[must_use]
    pub const fn peach(&self) -> Color {
        self.peach
    }

    #[must_use]
    pub const fn yellow(&self) -> Color {
        self.yellow
    }

    #[must_use]
    pub const fn teal(&self) -> Color {
        self.teal
    }

    #[must_use]
    pub const fn blue(&self) -> Color {
        self.blue
    }

    #[must_use]
    pub const fn lavender(&self) -> Color {
        self.lavender
    }

    // Semantic roles

    #[must_use]
    pub const fn success(&self) -> Color {
        self.green
    }

    #[must_use]
    pub const fn error(&self) -> Color {
        self.red
    }

    #[must_use]
    pub const fn info(&self) -> Color {
        self.blue
    }

    #[must_use]
    pub const fn border(&self) -> Color {
        self.surface2
    }

    #[must_use]
    pub const fn selection_bg(&self) -> Color {
        self.surface1
    }

    #[must_use]
    pub const fn header(&self) -> Color {
        self.yellow
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::catppuccin_mocha()
    }
}

/// Names accepted by `theme.name` in the config file.
pub const THEME_NAMES: &[&str] = &[
    "Catppuccin Mocha",
    "Catppuccin Macchiato",
    "Catppuccin Frappé",
    "Catppuccin Latte",
];

/// Look up a theme by name, falling back to the default theme.
pub fn theme_from_name(name: &str) -> Theme {
    match name {
        "Catppuccin Macchiato" => Theme::catppuccin_macchiato(),
        "Catppuccin Frappé" | "Catppuccin Frappe" => Theme::catppuccin_frappe(),
        "Catppuccin Latte" => Theme::catppuccin_latte(),
        "Catppuccin Mocha" => Theme::catppuccin_mocha(),
        other => {
            tracing::warn!("Unknown theme {other:?}, using {}", THEME_NAMES[0]);
            Theme::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_name_resolves_to_its_flavor() {
        let latte = theme_from_name("Catppuccin Latte");
        assert_eq!(latte.base(), Theme::catppuccin_latte().base());
        for name in THEME_NAMES {
            // a known name never hits the fallback branch
            let theme = theme_from_name(name);
            assert_ne!(theme.base(), Color::Reset);
        }
    }

    #[test]
    fn unknown_name_falls_back_to_mocha() {
        let theme = theme_from_name("Solarized");
        assert_eq!(theme.base(), Theme::catppuccin_mocha().base());
    }
}
