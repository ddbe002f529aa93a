use ratatui::style::Color;

use crate::render::Ink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameTheme {
    #[default]
    Monokai,
    Solarized,
    Dracula,
    GruvboxDark,
    Nord,
    OneDark,
    HighContrast,
}

pub struct ThemeColors {
    pub background: Color,
    pub border: Color,
    pub text: Color,
    pub accent: Color,
    pub paddle: Color,
    pub ball: Color,
    pub divider: Color,
    /// Trajectory overlay and hit counter
    pub highlight: Color,
}

impl ThemeColors {
    pub fn ink(&self, ink: Ink) -> Color {
        match ink {
            Ink::Paddle => self.paddle,
            Ink::Ball => self.ball,
            Ink::Divider => self.divider,
            Ink::Score | Ink::Text => self.text,
            Ink::Trajectory | Ink::HitCounter => self.highlight,
        }
    }
}

impl GameTheme {
    const ALL: [GameTheme; 7] = [
        GameTheme::Monokai,
        GameTheme::Solarized,
        GameTheme::Dracula,
        GameTheme::GruvboxDark,
        GameTheme::Nord,
        GameTheme::OneDark,
        GameTheme::HighContrast,
    ];

    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            GameTheme::Monokai => "Monokai",
            GameTheme::Solarized => "Solarized",
            GameTheme::Dracula => "Dracula",
            GameTheme::GruvboxDark => "Gruvbox Dark",
            GameTheme::Nord => "Nord",
            GameTheme::OneDark => "One Dark",
            GameTheme::HighContrast => "High Contrast",
        }
    }

    pub fn colors(&self) -> ThemeColors {
        match self {
            GameTheme::Monokai => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(249, 38, 114),
                text: Color::Rgb(248, 248, 242),
                accent: Color::Rgb(166, 226, 46),
                paddle: Color::Rgb(102, 217, 239),
                ball: Color::Rgb(255, 95, 135),
                divider: Color::Rgb(117, 113, 94),
                highlight: Color::Rgb(230, 219, 116),
            },
            GameTheme::Solarized => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(38, 139, 210),
                text: Color::Rgb(147, 161, 161),
                accent: Color::Rgb(42, 161, 152),
                paddle: Color::Rgb(133, 153, 0),
                ball: Color::Rgb(220, 50, 47),
                divider: Color::Rgb(88, 110, 117),
                highlight: Color::Rgb(181, 137, 0),
            },
            GameTheme::Dracula => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(255, 121, 198),
                text: Color::Rgb(248, 248, 242),
                accent: Color::Rgb(189, 147, 249),
                paddle: Color::Rgb(80, 250, 123),
                ball: Color::Rgb(255, 85, 85),
                divider: Color::Rgb(98, 114, 164),
                highlight: Color::Rgb(241, 250, 140),
            },
            GameTheme::GruvboxDark => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(250, 189, 47),
                text: Color::Rgb(235, 219, 178),
                accent: Color::Rgb(184, 187, 38),
                paddle: Color::Rgb(131, 165, 152),
                ball: Color::Rgb(251, 73, 52),
                divider: Color::Rgb(146, 131, 116),
                highlight: Color::Rgb(254, 128, 25),
            },
            GameTheme::Nord => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(136, 192, 208),
                text: Color::Rgb(216, 222, 233),
                accent: Color::Rgb(143, 188, 187),
                paddle: Color::Rgb(94, 129, 172),
                ball: Color::Rgb(191, 97, 106),
                divider: Color::Rgb(76, 86, 106),
                highlight: Color::Rgb(235, 203, 139),
            },
            GameTheme::OneDark => ThemeColors {
                background: Color::Reset,
                border: Color::Rgb(198, 120, 221),
                text: Color::Rgb(171, 178, 191),
                accent: Color::Rgb(97, 175, 239),
                paddle: Color::Rgb(152, 195, 121),
                ball: Color::Rgb(224, 108, 117),
                divider: Color::Rgb(92, 99, 112),
                highlight: Color::Rgb(229, 192, 123),
            },
            // true black for max contrast
            GameTheme::HighContrast => ThemeColors {
                background: Color::Black,
                border: Color::White,
                text: Color::White,
                accent: Color::Yellow,
                paddle: Color::Rgb(0, 255, 255),
                ball: Color::Rgb(255, 255, 255),
                divider: Color::Gray,
                highlight: Color::Rgb(255, 0, 0),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_visits_every_theme() {
        let mut theme = GameTheme::default();
        let mut seen = Vec::new();
        for _ in 0..GameTheme::ALL.len() {
            seen.push(theme.name());
            theme = theme.next();
        }
        assert_eq!(theme, GameTheme::Monokai);
        assert_eq!(seen.len(), 7);
        assert!(seen.contains(&"Nord"));
    }
}
