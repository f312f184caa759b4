use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::types::MemoFeed;
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;

/// Read-only view over the memo feed, newest at the bottom.
pub struct MemoList {
    pub feed: MemoFeed,
    selected: usize,
    list_state: ListState,
}

impl MemoList {
    pub fn new() -> Self {
        Self {
            feed: MemoFeed::new(),
            selected: 0,
            list_state: ListState::default(),
        }
    }

    fn select_next(&mut self) {
        if self.feed.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.feed.len() - 1);
        self.list_state.select(Some(self.selected));
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
        self.list_state.select(Some(self.selected));
    }
}

impl Component for MemoList {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Down => self.select_next(),
            KeyCode::Up => self.select_prev(),
            KeyCode::Home => {
                self.selected = 0;
                self.list_state.select(Some(0));
            }
            KeyCode::End => {
                if !self.feed.is_empty() {
                    self.selected = self.feed.len() - 1;
                    self.list_state.select(Some(self.selected));
                }
            }
            _ => {}
        }
        None
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Memos received ({}) ", self.feed.len()))
            .borders(Borders::ALL)
            .border_style(THEME.border_style());

        if self.feed.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let empty = Paragraph::new("No memos yet - be the first to buy a coffee")
                .style(THEME.muted_style())
                .alignment(Alignment::Center);
            frame.render_widget(empty, inner);
            return;
        }

        let items: Vec<ListItem> = self
            .feed
            .entries()
            .iter()
            .map(|memo| {
                ListItem::new(vec![
                    Line::from(Span::styled(
                        memo.message.clone(),
                        Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(vec![
                        Span::styled("From ", THEME.muted_style()),
                        Span::styled(memo.name.clone(), THEME.accent_style()),
                        Span::styled(
                            format!(" ({})", utils::truncate_address(&memo.from)),
                            THEME.address_style(),
                        ),
                        Span::styled(
                            format!(" at {}", utils::format_memo_time(&memo.timestamp)),
                            THEME.muted_style(),
                        ),
                    ]),
                    Line::from(""),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(THEME.selected_style());

        frame.render_stateful_widget(list, area, &mut self.list_state);
    }
}
