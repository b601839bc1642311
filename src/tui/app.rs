use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::{Alignment, Constraint, Layout};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{ApiError, CarApi};
use crate::form::{Completion, FormHost, Notifier, Severity, SubmitPolicy, SubmitRequest};
use crate::model::{CarRecord, Field};

use super::action::{Action, ScreenState};
use super::error::AppError;
use super::screens::{CarFormScreen, draw_car_form};
use super::widgets::{ToastBar, draw_toast};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

type Outcome = (SubmitRequest, Result<CarRecord, ApiError>);

/// Stand-in for the car list behind the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Listing {
    pub page: u32,
    pub refreshes: u32,
}

impl Default for Listing {
    fn default() -> Self {
        Self {
            page: 1,
            refreshes: 0,
        }
    }
}

impl FormHost for Listing {
    fn refresh_data(&mut self) {
        self.refreshes += 1;
        tracing::debug!(refreshes = self.refreshes, "listing refreshed");
    }

    fn set_page(&mut self, page: u32) {
        self.page = page;
    }
}

/// Top-level application state.
pub struct App {
    screen: CarFormScreen,
    listing: Listing,
    toasts: ToastBar,
    api: Arc<dyn CarApi>,
    runtime: Handle,
    completions_tx: UnboundedSender<Outcome>,
    completions_rx: UnboundedReceiver<Outcome>,
    last_record: Option<CarRecord>,
    should_quit: bool,
}

impl App {
    /// Creates an `App` with the dialog closed. Requests run on `runtime`.
    pub fn new(api: Arc<dyn CarApi>, runtime: Handle, policy: SubmitPolicy) -> Self {
        Self::with_screen(api, runtime, CarFormScreen::new(policy))
    }

    pub fn with_screen(api: Arc<dyn CarApi>, runtime: Handle, screen: CarFormScreen) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            screen,
            listing: Listing::default(),
            toasts: ToastBar::new(),
            api,
            runtime,
            completions_tx,
            completions_rx,
            last_record: None,
            should_quit: false,
        }
    }

    /// Opens the car dialog for `target`, or for a new car when `None`.
    pub fn open_dialog(&mut self, target: Option<CarRecord>) {
        self.toasts.dismiss();
        if let Some(record) = &target {
            self.last_record = Some(record.clone());
        }
        self.screen.open(target);
    }

    /// Main event loop: draw → apply finished requests → poll input.
    #[cfg_attr(coverage_nightly, coverage(off))]
    #[mutants::skip]
    pub fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            self.drain_completions();
            if event::poll(POLL_INTERVAL)?
                && let Event::Key(key) = event::read()?
            {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    #[cfg_attr(coverage_nightly, coverage(off))]
    #[mutants::skip]
    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        let block = Block::default()
            .title(" carform ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [body, hints, toast] = Layout::vertical([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(inner);

        let last = match &self.last_record {
            Some(record) => format!("Last saved: {}", describe(record)),
            None => String::from("Nothing saved yet"),
        };
        let lines = vec![
            Line::from(""),
            Line::from(format!(
                "Page {} \u{b7} refreshed {} times",
                self.listing.page, self.listing.refreshes
            )),
            Line::from(last),
        ];
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            body,
        );

        frame.render_widget(
            Paragraph::new("n: new car  e: edit last saved  q: quit")
                .style(Style::default().fg(Color::DarkGray)),
            hints,
        );
        draw_toast(&self.toasts, frame, toast);
        draw_car_form(&self.screen, frame, area);
    }

    /// Handles a key event: the dialog takes every key while open.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.screen.is_open() {
            let action = self.screen.handle_key(key);
            self.apply(action);
            return;
        }

        match key.code {
            KeyCode::Char('n') => self.open_dialog(None),
            KeyCode::Char('e') => match self.last_record.clone() {
                Some(record) => self.open_dialog(Some(record)),
                None => self.toasts.notify(Severity::Info, "No saved car to edit yet"),
            },
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Dispatch(request) => self.dispatch(request),
            Action::Cancel => tracing::debug!("car dialog cancelled"),
        }
    }

    /// Runs `request` in the background; the outcome arrives via
    /// [`drain_completions`](Self::drain_completions).
    fn dispatch(&self, request: SubmitRequest) {
        tracing::debug!(mode = %request.mode(), "dispatching car submit");
        let api = Arc::clone(&self.api);
        let tx = self.completions_tx.clone();
        self.runtime.spawn(async move {
            let result = request.execute(api.as_ref()).await;
            if tx.send((request, result)).is_err() {
                tracing::debug!("app gone before submit finished");
            }
        });
    }

    /// Applies every finished request to the dialog.
    pub fn drain_completions(&mut self) {
        while let Ok((request, result)) = self.completions_rx.try_recv() {
            let completion =
                self.screen
                    .complete(&request, result, &mut self.listing, &mut self.toasts);
            if let Completion::Succeeded(record) = completion
                && !record.id.is_empty()
            {
                self.last_record = Some(record);
            }
        }
    }

    pub fn screen(&self) -> &CarFormScreen {
        &self.screen
    }

    pub fn listing(&self) -> Listing {
        self.listing
    }

    pub fn toasts(&self) -> &ToastBar {
        &self.toasts
    }

    pub fn last_record(&self) -> Option<&CarRecord> {
        self.last_record.as_ref()
    }

    /// Returns `true` if the app should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}

fn describe(record: &CarRecord) -> String {
    let text = |field: Field| {
        record
            .fields
            .get(field.key())
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    format!("{} {} ({})", text(Field::Name), text(Field::Model), record.id)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
    use tokio::runtime::Runtime;

    use super::*;
    use crate::model::Car;
    use crate::tui::widgets::YearPicker;

    #[derive(Default)]
    struct FakeApi {
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeApi {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, call: String, id: &str, car: &Car) -> Result<CarRecord, ApiError> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                Err(ApiError::Server {
                    status: 500,
                    message: "boom".into(),
                })
            } else {
                Ok(CarRecord::from_car(id, car))
            }
        }
    }

    #[async_trait]
    impl CarApi for FakeApi {
        async fn create(&self, car: &Car) -> Result<CarRecord, ApiError> {
            self.answer("create".into(), "car-1", car)
        }

        async fn update(&self, id: &str, car: &Car) -> Result<CarRecord, ApiError> {
            self.answer(format!("update {id}"), id, car)
        }

        async fn get(&self, id: &str) -> Result<CarRecord, ApiError> {
            Err(ApiError::Server {
                status: 404,
                message: format!("{id} not found"),
            })
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn release(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        }
    }

    fn make_app(api: Arc<FakeApi>) -> (Runtime, App) {
        let runtime = Runtime::new().unwrap();
        let picker = YearPicker::new(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap());
        let screen = CarFormScreen::with_picker(SubmitPolicy::default(), picker);
        let app = App::with_screen(api, runtime.handle().clone(), screen);
        (runtime, app)
    }

    fn type_string(app: &mut App, s: &str) {
        for ch in s.chars() {
            app.handle_key(press(KeyCode::Char(ch)));
        }
    }

    /// Fills Golf / GTI / MANUAL / Compact / Hatchback / 2020 / 30000.
    fn fill_valid_form(app: &mut App) {
        type_string(app, "Golf");
        app.handle_key(press(KeyCode::Tab));
        type_string(app, "GTI");
        app.handle_key(press(KeyCode::Tab));
        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Tab));
        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Tab));
        type_string(app, "Hatchback");
        app.handle_key(press(KeyCode::Tab));
        app.handle_key(press(KeyCode::Right));
        app.handle_key(press(KeyCode::Tab));
        type_string(app, "30000");
    }

    /// Polls until `done` holds or a second has passed.
    fn wait_for(app: &mut App, done: impl Fn(&App) -> bool) {
        for _ in 0..100 {
            app.drain_completions();
            if done(app) {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("timed out waiting for completion");
    }

    mod keys {
        use super::*;

        #[test]
        fn new_starts_closed() {
            let (_rt, app) = make_app(Arc::new(FakeApi::default()));
            assert!(!app.screen().is_open());
            assert!(!app.should_quit());
            assert!(app.last_record().is_none());
            assert_eq!(app.listing(), Listing::default());
        }

        #[test]
        fn q_quits_when_closed() {
            let (_rt, mut app) = make_app(Arc::new(FakeApi::default()));
            app.handle_key(press(KeyCode::Char('q')));
            assert!(app.should_quit());
        }

        #[test]
        fn esc_quits_when_closed() {
            let (_rt, mut app) = make_app(Arc::new(FakeApi::default()));
            app.handle_key(press(KeyCode::Esc));
            assert!(app.should_quit());
        }

        #[test]
        fn release_events_are_ignored() {
            let (_rt, mut app) = make_app(Arc::new(FakeApi::default()));
            app.handle_key(release(KeyCode::Char('q')));
            assert!(!app.should_quit());
        }

        #[test]
        fn n_opens_create_dialog() {
            let (_rt, mut app) = make_app(Arc::new(FakeApi::default()));
            app.handle_key(press(KeyCode::Char('n')));
            assert_eq!(
                app.screen().dialog().mode(),
                Some(crate::form::DialogMode::Create)
            );
        }

        #[test]
        fn q_is_typed_while_dialog_open() {
            let (_rt, mut app) = make_app(Arc::new(FakeApi::default()));
            app.handle_key(press(KeyCode::Char('n')));
            app.handle_key(press(KeyCode::Char('q')));
            assert!(!app.should_quit());
            assert_eq!(app.screen().dialog().form().text(Field::Name), "q");
        }

        #[test]
        fn esc_closes_dialog_without_quitting() {
            let (_rt, mut app) = make_app(Arc::new(FakeApi::default()));
            app.handle_key(press(KeyCode::Char('n')));
            app.handle_key(press(KeyCode::Esc));
            assert!(!app.screen().is_open());
            assert!(!app.should_quit());
        }

        #[test]
        fn e_reopens_loaded_record() {
            let (_rt, mut app) = make_app(Arc::new(FakeApi::default()));
            let record = CarRecord {
                id: "abc".into(),
                fields: serde_json::Map::new(),
            };
            app.open_dialog(Some(record));
            app.handle_key(press(KeyCode::Esc));
            app.handle_key(press(KeyCode::Char('e')));
            assert_eq!(app.screen().dialog().key(), Some("abc"));
            assert_eq!(
                app.screen().dialog().mode(),
                Some(crate::form::DialogMode::Edit)
            );
        }

        #[test]
        fn e_without_saved_car_shows_hint() {
            let (_rt, mut app) = make_app(Arc::new(FakeApi::default()));
            app.handle_key(press(KeyCode::Char('e')));
            assert!(!app.screen().is_open());
            assert_eq!(
                app.toasts().current().map(|t| t.severity),
                Some(Severity::Info)
            );
        }
    }

    mod submit {
        use super::*;

        #[test]
        fn invalid_submit_sends_nothing() {
            let api = Arc::new(FakeApi::default());
            let (_rt, mut app) = make_app(Arc::clone(&api));
            app.handle_key(press(KeyCode::Char('n')));
            app.handle_key(press(KeyCode::Enter));
            app.drain_completions();
            assert!(api.calls().is_empty());
            assert!(!app.screen().dialog().form().errors().is_empty());
        }

        #[test]
        fn create_then_edit_round_trip() {
            let api = Arc::new(FakeApi::default());
            let (_rt, mut app) = make_app(Arc::clone(&api));
            app.handle_key(press(KeyCode::Char('n')));
            fill_valid_form(&mut app);
            app.handle_key(press(KeyCode::Enter));
            wait_for(&mut app, |app| app.last_record().is_some());

            assert_eq!(api.calls(), vec!["create".to_string()]);
            assert!(!app.screen().is_open());
            assert_eq!(app.listing(), Listing { page: 1, refreshes: 1 });
            let toast = app.toasts().current().unwrap();
            assert_eq!(toast.severity, Severity::Success);
            assert_eq!(toast.message, "Create Car Success");

            app.handle_key(press(KeyCode::Char('e')));
            assert_eq!(app.screen().dialog().key(), Some("car-1"));
            assert_eq!(app.screen().dialog().form().text(Field::Model), "GTI");
            app.handle_key(press(KeyCode::Enter));
            wait_for(&mut app, |app| {
                app.toasts().current().map(|t| t.severity) == Some(Severity::Info)
            });
            assert_eq!(
                api.calls(),
                vec!["create".to_string(), "update car-1".to_string()]
            );
            assert_eq!(app.listing().refreshes, 2);
        }

        #[test]
        fn failure_keeps_dialog_and_input() {
            let api = Arc::new(FakeApi::failing());
            let (_rt, mut app) = make_app(Arc::clone(&api));
            app.handle_key(press(KeyCode::Char('n')));
            fill_valid_form(&mut app);
            app.handle_key(press(KeyCode::Enter));
            wait_for(&mut app, |app| app.toasts().current().is_some());

            let toast = app.toasts().current().unwrap();
            assert_eq!(toast.severity, Severity::Error);
            assert!(toast.message.contains("Your input was kept"));
            assert!(app.screen().is_open());
            assert!(!app.screen().dialog().is_submitting());
            assert_eq!(app.screen().dialog().form().text(Field::Name), "Golf");
            assert!(app.last_record().is_none());
            assert_eq!(app.listing().refreshes, 0);
        }

        #[test]
        fn cancel_while_in_flight_drops_outcome() {
            let api = Arc::new(FakeApi::default());
            let (_rt, mut app) = make_app(Arc::clone(&api));
            app.handle_key(press(KeyCode::Char('n')));
            fill_valid_form(&mut app);
            app.handle_key(press(KeyCode::Enter));
            app.handle_key(press(KeyCode::Esc));

            for _ in 0..100 {
                if !api.calls().is_empty() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(10));
            }
            std::thread::sleep(Duration::from_millis(20));
            app.drain_completions();

            assert_eq!(api.calls().len(), 1);
            assert!(app.toasts().current().is_none());
            assert!(app.last_record().is_none());
            assert_eq!(app.listing().refreshes, 0);
        }
    }
}
