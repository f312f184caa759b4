use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::contract::COFFEE_PRICE_WEI;
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Message,
}

/// The tip form: two draft fields edited in place, submitted with Enter.
/// The draft survives a failed submission; a confirmed one clears it.
pub struct CoffeeForm {
    pub name: String,
    pub message: String,
    focus: Field,
    pub submitting: bool,
}

impl CoffeeForm {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            message: String::new(),
            focus: Field::Name,
            submitting: false,
        }
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.message.clear();
        self.focus = Field::Name;
        self.submitting = false;
    }

    fn focused_input(&mut self) -> &mut String {
        match self.focus {
            Field::Name => &mut self.name,
            Field::Message => &mut self.message,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Field::Name => Field::Message,
            Field::Message => Field::Name,
        };
    }

    fn field_line<'a>(&self, label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
        let cursor = if focused { "_" } else { "" };
        let style = if focused {
            Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(THEME.text)
        };
        Line::from(vec![
            Span::styled(format!("  {label}: "), THEME.muted_style()),
            Span::styled(format!("{value}{cursor}"), style),
        ])
    }
}

impl Component for CoffeeForm {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab => {
                self.toggle_focus();
                None
            }
            KeyCode::Enter => {
                if self.submitting {
                    return None;
                }
                Some(AppEvent::SubmitRequested {
                    name: self.name.clone(),
                    message: self.message.clone(),
                })
            }
            KeyCode::Backspace => {
                self.focused_input().pop();
                None
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.focused_input().clear();
                None
            }
            KeyCode::Char(c) => {
                self.focused_input().push(c);
                None
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Buy a coffee ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let action = if self.submitting {
            Line::from(Span::styled(
                "  Sending transaction...",
                THEME.muted_style(),
            ))
        } else {
            Line::from(vec![
                Span::styled("  [Enter] ", THEME.accent_style()),
                Span::styled("Send 1 coffee for ", Style::default().fg(THEME.text)),
                Span::styled(utils::format_eth(COFFEE_PRICE_WEI), THEME.eth_style()),
                Span::styled("   [Tab] ", THEME.accent_style()),
                Span::styled("Switch field", Style::default().fg(THEME.text)),
            ])
        };

        let lines = vec![
            self.field_line("Name", &self.name, self.focus == Field::Name),
            Line::from(""),
            self.field_line("Message", &self.message, self.focus == Field::Message),
            Line::from(""),
            action,
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
