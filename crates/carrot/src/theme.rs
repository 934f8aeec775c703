use carrot_core::Highlight;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub border: Color,
    pub focus: Color,
    pub different: Color,
    pub one_sided: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub deleted_bg: Color,
    pub inserted_bg: Color,
    pub status_bg: Color,
    pub accent: Color,
}

pub const DARK: Palette = Palette {
    background: Color::Rgb(30, 30, 30),
    foreground: Color::Rgb(212, 212, 212),
    muted: Color::Rgb(128, 128, 128),
    border: Color::Rgb(70, 70, 70),
    focus: Color::Rgb(0, 122, 204),
    different: Color::Rgb(244, 71, 71),
    one_sided: Color::Rgb(86, 156, 214),
    selected_bg: Color::Rgb(38, 79, 120),
    selected_fg: Color::White,
    deleted_bg: Color::Rgb(75, 24, 24),
    inserted_bg: Color::Rgb(24, 64, 34),
    status_bg: Color::Rgb(0, 122, 204),
    accent: Color::Rgb(255, 140, 0),
};

pub const LIGHT: Palette = Palette {
    background: Color::Rgb(255, 255, 255),
    foreground: Color::Rgb(30, 30, 30),
    muted: Color::Rgb(110, 110, 110),
    border: Color::Rgb(200, 200, 200),
    focus: Color::Rgb(0, 95, 184),
    different: Color::Rgb(205, 49, 49),
    one_sided: Color::Rgb(0, 92, 197),
    selected_bg: Color::Rgb(173, 214, 255),
    selected_fg: Color::Black,
    deleted_bg: Color::Rgb(255, 220, 220),
    inserted_bg: Color::Rgb(220, 255, 220),
    status_bg: Color::Rgb(0, 95, 184),
    accent: Color::Rgb(214, 93, 14),
};

pub const HIGH_CONTRAST: Palette = Palette {
    background: Color::Black,
    foreground: Color::White,
    muted: Color::Rgb(200, 200, 200),
    border: Color::White,
    focus: Color::Yellow,
    different: Color::Rgb(255, 80, 80),
    one_sided: Color::Cyan,
    selected_bg: Color::Yellow,
    selected_fg: Color::Black,
    deleted_bg: Color::Rgb(120, 0, 0),
    inserted_bg: Color::Rgb(0, 100, 0),
    status_bg: Color::Blue,
    accent: Color::Yellow,
};

pub fn palette(theme_name: &str) -> Palette {
    match theme_name {
        "light" => LIGHT,
        "high-contrast" => HIGH_CONTRAST,
        _ => DARK,
    }
}

impl Palette {
    pub fn base(&self) -> Style {
        Style::new().fg(self.foreground).bg(self.background)
    }

    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::new().fg(self.focus)
        } else {
            Style::new().fg(self.border)
        }
    }

    pub fn selected(&self) -> Style {
        Style::new()
            .bg(self.selected_bg)
            .fg(self.selected_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn header(&self) -> Style {
        Style::new().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn highlight(&self, highlight: Highlight) -> Style {
        match highlight {
            Highlight::Red => Style::new().fg(self.different),
            Highlight::Blue => Style::new().fg(self.one_sided),
            Highlight::None => Style::new().fg(self.foreground),
        }
    }
}

pub mod icons {
    pub const EXPANDED: &str = "v";
    pub const COLLAPSED: &str = ">";
    pub const FOLDED: &str = "...";
}
