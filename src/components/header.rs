use alloy::primitives::Address;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::data::chain::TARGET_CHAIN;
use crate::theme::THEME;
use crate::utils;

pub struct Header {
    pub account: Option<Address>,
}

impl Header {
    pub fn new() -> Self {
        Self { account: None }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        // Background for the entire header bar
        let header_block = Block::default().style(THEME.header_style());
        frame.render_widget(header_block, area);

        // Left (title), center (tagline), right (network + account)
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(12),
                Constraint::Min(0),
                Constraint::Length(44),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            " coffee-tui",
            Style::default()
                .fg(THEME.text_accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        let tagline = Paragraph::new(Span::styled("Buy me a coffee", THEME.muted_style()))
            .alignment(Alignment::Center)
            .style(THEME.header_style());
        frame.render_widget(tagline, chunks[1]);

        let account = match &self.account {
            Some(account) => Span::styled(utils::truncate_address(account), THEME.address_style()),
            None => Span::styled("not connected", THEME.muted_style()),
        };
        let network_info = Line::from(vec![
            Span::styled(TARGET_CHAIN.name, Style::default().fg(THEME.text)),
            Span::styled(" | ", THEME.muted_style()),
            account,
            Span::raw(" "),
        ]);
        let network_paragraph = Paragraph::new(network_info)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(network_paragraph, chunks[2]);
    }
}
