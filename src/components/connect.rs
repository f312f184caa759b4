use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::chain::TARGET_CHAIN;
use crate::events::AppEvent;
use crate::theme::THEME;

/// Shown while no account is connected.
pub struct ConnectPrompt {
    pub connecting: bool,
}

impl ConnectPrompt {
    pub fn new() -> Self {
        Self { connecting: false }
    }
}

impl Component for ConnectPrompt {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Enter | KeyCode::Char('c') if !self.connecting => {
                self.connecting = true;
                Some(AppEvent::ConnectRequested)
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.min(50);
        let height = 7;
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let popup_area = Rect::new(x, y, width, height);

        let block = Block::default()
            .title(" Buy me a coffee ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style())
            .style(Style::default().bg(THEME.surface));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let action = if self.connecting {
            Span::styled("Waiting for the wallet...", THEME.muted_style())
        } else {
            Span::styled(
                "[ Press Enter to connect your wallet ]",
                THEME.accent_style().add_modifier(Modifier::BOLD),
            )
        };

        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Tip the author on {}", TARGET_CHAIN.name),
                Style::default().fg(THEME.text),
            ))
            .alignment(Alignment::Center),
            Line::from(""),
            Line::from(action).alignment(Alignment::Center),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
