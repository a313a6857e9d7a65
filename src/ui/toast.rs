/// Transient toast notifications
///
/// Success, error, and info banners shown at the bottom of the screen. The
/// update loop dismisses them after a fixed duration.

use std::time::Duration;

use iced::widget::{container, text};
use iced::{border, Color, Element, Theme};

/// How long a toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: Kind,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: Kind::Info,
            message: message.into(),
        }
    }
}

/// Render a toast as a padded, rounded banner
pub fn view<'a, Message: 'a>(toast: &'a Toast) -> Element<'a, Message> {
    let background = match toast.kind {
        Kind::Success => Color::from_rgb8(0x2e, 0x7d, 0x32),
        Kind::Error => Color::from_rgb8(0xc6, 0x28, 0x28),
        Kind::Info => Color::from_rgb8(0x45, 0x4d, 0x5d),
    };

    container(text(&toast.message).size(14))
        .padding(10)
        .style(move |_theme: &Theme| container::Style {
            background: Some(background.into()),
            text_color: Some(Color::WHITE),
            border: border::rounded(6.0),
            ..container::Style::default()
        })
        .into()
}
