use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;

use crate::components::Component;
use crate::components::coffee_form::CoffeeForm;
use crate::components::connect::ConnectPrompt;
use crate::components::header::Header;
use crate::components::memo_list::MemoList;
use crate::components::status_bar::StatusBar;
use crate::data::CoffeeService;
use crate::data::subscription::MemoSubscription;
use crate::events::AppEvent;
use crate::theme::THEME;

pub struct App {
    // Connection state; everything the view shows derives from it
    account: Option<Address>,

    // Components
    header: Header,
    connect: ConnectPrompt,
    form: CoffeeForm,
    memo_list: MemoList,
    status_bar: StatusBar,

    // Data
    service: Arc<CoffeeService>,
    subscription: Option<MemoSubscription>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn with_service(
        service: Arc<CoffeeService>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        tick_rate_ms: u64,
    ) -> Self {
        Self {
            account: None,
            header: Header::new(),
            connect: ConnectPrompt::new(),
            form: CoffeeForm::new(),
            memo_list: MemoList::new(),
            status_bar: StatusBar::new(),
            service,
            subscription: None,
            event_rx,
            should_quit: false,
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        // Initial load: account check, memo history, live event stream
        self.service.check_connection();
        self.status_bar.loading = true;
        self.service.load_memos();
        self.subscription = Some(self.service.subscribe_memos());

        let mut interval = tokio::time::interval(self.tick_rate);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    terminal.draw(|frame| self.render(frame))?;
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        // The subscription must not outlive the view it feeds.
        if let Some(mut subscription) = self.subscription.take() {
            subscription.stop();
        }

        Ok(())
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Fill background
        frame.render_widget(
            Block::default().style(Style::default().bg(THEME.bg)),
            area,
        );

        // Layout: header (1) | content (fill) | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.render(frame, chunks[0]);

        if self.account.is_some() {
            let content = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(9), Constraint::Min(0)])
                .split(chunks[1]);
            self.form.render(frame, content[0]);
            self.memo_list.render(frame, content[1]);
        } else {
            self.connect.render(frame, chunks[1]);
        }

        self.status_bar.render(frame, chunks[2]);
    }

    fn handle_terminal_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only handle key press events (not release/repeat) for cross-platform compat
            if key.kind != KeyEventKind::Press {
                return;
            }

            // Global keys
            match key.code {
                KeyCode::Esc => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('q') if self.account.is_none() => {
                    self.should_quit = true;
                    return;
                }
                _ => {}
            }

            // Delegate: the feed owns scrolling, the form owns everything else
            let app_event = if self.account.is_none() {
                self.connect.handle_key(key)
            } else {
                match key.code {
                    KeyCode::Up | KeyCode::Down | KeyCode::Home | KeyCode::End => {
                        self.memo_list.handle_key(key)
                    }
                    _ => self.form.handle_key(key),
                }
            };

            if let Some(event) = app_event {
                self.handle_app_event(event);
            }
        }
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ConnectRequested => {
                self.status_bar.loading = true;
                self.service.connect_wallet();
            }
            AppEvent::SubmitRequested { name, message } => {
                if self.account.is_some() {
                    self.form.submitting = true;
                }
                self.service.buy_coffee(self.account, name, message);
            }
            AppEvent::WalletConnected(account) => {
                self.account = Some(account);
                self.header.account = Some(account);
                self.connect.connecting = false;
                self.status_bar.connected = true;
                self.status_bar.loading = false;
            }
            AppEvent::MemosLoaded(memos) => {
                self.memo_list.feed.replace(memos);
                self.status_bar.loading = false;
            }
            AppEvent::MemoReceived(memo) => {
                self.memo_list.feed.push(memo);
            }
            AppEvent::CoffeePending(_) => {
                // Form already shows the in-flight state
            }
            AppEvent::CoffeeConfirmed(_) => {
                self.form.clear();
            }
            AppEvent::Error(message) => {
                self.status_bar.error_message = Some(message);
                self.status_bar.loading = false;
                self.form.submitting = false;
                self.connect.connecting = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{B256, address};
    use chrono::DateTime;

    use super::*;
    use crate::data::rpc::testing::FakeWallet;
    use crate::data::types::Memo;

    fn make_app() -> App {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let service = Arc::new(CoffeeService::new(
            FakeWallet::new(),
            event_tx,
            Duration::from_millis(10),
            crate::data::log_sink(),
        ));
        App::with_service(service, event_rx, 100)
    }

    fn make_memo(name: &str) -> Memo {
        Memo {
            from: address!("00000000000000000000000000000000000Abc00"),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            name: name.to_string(),
            message: "M".to_string(),
        }
    }

    #[test]
    fn test_connected_event_sets_account() {
        let mut app = make_app();
        let account = address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045");

        app.handle_app_event(AppEvent::WalletConnected(account));

        assert_eq!(app.account, Some(account));
        assert!(app.status_bar.connected);
    }

    #[test]
    fn test_confirmed_coffee_clears_the_form() {
        let mut app = make_app();
        app.form.name = "N".to_string();
        app.form.message = "M".to_string();
        app.form.submitting = true;

        app.handle_app_event(AppEvent::CoffeeConfirmed(B256::ZERO));

        assert_eq!(app.form.name, "");
        assert_eq!(app.form.message, "");
        assert!(!app.form.submitting);
    }

    #[test]
    fn test_live_memo_appends_to_feed() {
        let mut app = make_app();
        app.handle_app_event(AppEvent::MemosLoaded(vec![make_memo("a")]));
        app.handle_app_event(AppEvent::MemoReceived(make_memo("b")));

        let names: Vec<&str> = app
            .memo_list
            .feed
            .entries()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_error_resets_transient_flags_but_keeps_draft() {
        let mut app = make_app();
        app.form.name = "N".to_string();
        app.form.submitting = true;
        app.status_bar.loading = true;

        app.handle_app_event(AppEvent::Error("boom".to_string()));

        assert_eq!(app.status_bar.error_message.as_deref(), Some("boom"));
        assert!(!app.form.submitting);
        assert_eq!(app.form.name, "N");
    }
}
