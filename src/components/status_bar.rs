use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

pub struct StatusBar {
    pub connected: bool,
    pub loading: bool,
    pub error_message: Option<String>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            connected: false,
            loading: false,
            error_message: None,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        // Background
        let bg = Block::default().style(THEME.header_style());
        frame.render_widget(bg, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(18)])
            .split(area);

        // --- Left side: error beats loading beats key hints ---
        let left_content = if let Some(ref err) = self.error_message {
            Line::from(vec![
                Span::styled(
                    " ! ",
                    Style::default()
                        .fg(THEME.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(err.as_str(), Style::default().fg(THEME.warning)),
            ])
        } else if self.loading {
            Line::from(Span::styled(
                " Loading...",
                Style::default().fg(THEME.text_accent),
            ))
        } else if self.connected {
            Line::from(vec![
                Span::styled(" Tab", Style::default().fg(THEME.text_accent)),
                Span::styled(":Field  ", Style::default().fg(THEME.text_muted)),
                Span::styled("Enter", Style::default().fg(THEME.text_accent)),
                Span::styled(":Send  ", Style::default().fg(THEME.text_muted)),
                Span::styled("\u{2191}\u{2193}", Style::default().fg(THEME.text_accent)),
                Span::styled(":Scroll  ", Style::default().fg(THEME.text_muted)),
                Span::styled("Esc", Style::default().fg(THEME.text_accent)),
                Span::styled(":Quit", Style::default().fg(THEME.text_muted)),
            ])
        } else {
            Line::from(vec![
                Span::styled(" Enter", Style::default().fg(THEME.text_accent)),
                Span::styled(":Connect  ", Style::default().fg(THEME.text_muted)),
                Span::styled("q", Style::default().fg(THEME.text_accent)),
                Span::styled(":Quit", Style::default().fg(THEME.text_muted)),
            ])
        };

        let left = Paragraph::new(left_content).style(THEME.header_style());
        frame.render_widget(left, chunks[0]);

        // --- Right side: wallet connection status ---
        let (dot_color, status_text) = if self.connected {
            (THEME.success, "Connected")
        } else {
            (THEME.error, "Disconnected")
        };

        let right_content = Line::from(vec![
            Span::styled("\u{25cf} ", Style::default().fg(dot_color)),
            Span::styled(status_text, Style::default().fg(dot_color)),
            Span::raw(" "),
        ]);

        let right = Paragraph::new(right_content)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(right, chunks[1]);
    }
}
