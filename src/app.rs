use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::{
    bingo::BingoRoller,
    config::Config,
    countdown::{Countdown, TickOutcome},
    display::Event,
    file::SharedStore,
    mirror::DisplayMirror,
    spinner::Spinner,
    tick::Ticker,
    time_format::DigitBuffer,
};

const SECOND: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Timer,
    Spinner,
    Bingo,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Timer => Focus::Spinner,
            Focus::Spinner => Focus::Bingo,
            Focus::Bingo => Focus::Timer,
        }
    }

    fn previous(self) -> Self {
        match self {
            Focus::Timer => Focus::Bingo,
            Focus::Spinner => Focus::Timer,
            Focus::Bingo => Focus::Spinner,
        }
    }
}

/// Text entry for the spinner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Form {
    AddLabel(String),
    AddWeight { label: String, weight: String },
    EditWeight { index: usize, weight: String },
}

pub struct App {
    pub countdown: Countdown,
    pub spinner: Spinner,
    pub bingo: BingoRoller,
    pub focus: Focus,
    pub selected: usize,
    pub form: Option<Form>,
    pub show_settings: bool,
    pub exit: bool,
    ticker: Option<Ticker>,
    generation: u64,
    tx: UnboundedSender<Event>,
    rng: StdRng,
    started: Instant,
}

impl App {
    pub fn new(
        config: &Config,
        store: SharedStore,
        mirror: Box<dyn DisplayMirror>,
        tx: UnboundedSender<Event>,
        rng: StdRng,
    ) -> Self {
        let digits = DigitBuffer::parse(&config.default_digits).unwrap_or_default();
        let countdown = Countdown::new(store.clone(), mirror, digits);
        let spinner = Spinner::new(store, config.spin.settings());
        let bingo = BingoRoller::new(&config.bingo.catalog, &config.bingo.asset_dir);

        let mut app = Self {
            countdown,
            spinner,
            bingo,
            focus: Focus::Timer,
            selected: 0,
            form: None,
            show_settings: false,
            exit: false,
            ticker: None,
            generation: 0,
            tx,
            rng,
            started: Instant::now(),
        };
        // a restored running countdown resumes right away
        app.sync_ticker();
        app
    }

    pub fn now(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    #[cfg(test)]
    pub fn ticker_active(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Input(key) => self.handle_key(key),
            Event::Tick => {
                let now = self.now();
                self.spinner.animate(now);
            }
            Event::Second(generation) => self.handle_second(generation),
            Event::Exit => self.exit = true,
        }
    }

    fn handle_second(&mut self, generation: u64) {
        match &self.ticker {
            Some(ticker) if ticker.generation() == generation => {}
            _ => {
                debug!(generation, "stale tick dropped");
                return;
            }
        }
        if self.countdown.tick() == TickOutcome::Expired {
            info!("countdown reached zero");
        }
        self.sync_ticker();
    }

    /// Holds a ticker exactly while the countdown runs.
    fn sync_ticker(&mut self) {
        match (self.countdown.is_running(), self.ticker.is_some()) {
            (true, false) => {
                self.generation += 1;
                self.ticker = Some(Ticker::spawn(
                    self.generation,
                    SECOND,
                    self.tx.clone(),
                    Event::Second,
                ));
            }
            (false, true) => self.ticker = None,
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.exit = true;
            return;
        }
        if let Some(form) = self.form.take() {
            self.form = self.handle_form(form, key.code);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.exit = true,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            code => match self.focus {
                Focus::Timer => self.timer_key(code),
                Focus::Spinner => self.spinner_key(code),
                Focus::Bingo => self.bingo_key(code),
            },
        }
    }

    fn timer_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(' ') => {
                self.countdown.toggle();
            }
            KeyCode::Char('r') => self.countdown.reset(),
            KeyCode::Char('s') => self.show_settings = !self.show_settings,
            KeyCode::Char('c') if self.show_settings => self.countdown.clear_digits(),
            KeyCode::Char(c) if self.show_settings => {
                self.countdown.push_digit(c);
            }
            KeyCode::Backspace if self.show_settings => self.countdown.pop_digit(),
            _ => {}
        }
        self.sync_ticker();
    }

    fn spinner_key(&mut self, code: KeyCode) {
        let count = self.spinner.choices().len();
        match code {
            KeyCode::Enter => {
                let now = self.now();
                if let Some(outcome) = self.spinner.spin(&mut self.rng, now) {
                    debug!(label = %outcome.label, target = outcome.target, "spinning");
                    self.selected = outcome.index;
                }
            }
            KeyCode::Char('e') => self.spinner.toggle_edit_mode(),
            KeyCode::Char('a') => self.form = Some(Form::AddLabel(String::new())),
            KeyCode::Char('w') if self.spinner.edit_mode() && self.selected < count => {
                let weight = self.spinner.choices()[self.selected].weight.to_string();
                self.form = Some(Form::EditWeight {
                    index: self.selected,
                    weight,
                });
            }
            KeyCode::Char('d') => {
                self.spinner.remove_choice(self.selected);
            }
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') if self.selected + 1 < count => self.selected += 1,
            _ => {}
        }
        self.selected = self
            .selected
            .min(self.spinner.choices().len().saturating_sub(1));
    }

    fn bingo_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter if self.bingo.can_draw() => {
                self.bingo.draw(&mut self.rng);
            }
            KeyCode::Char('r') => self.bingo.reset(),
            _ => {}
        }
    }

    fn handle_form(&mut self, form: Form, code: KeyCode) -> Option<Form> {
        if code == KeyCode::Esc {
            return None;
        }
        match form {
            Form::AddLabel(mut label) => match code {
                KeyCode::Enter if !label.trim().is_empty() => Some(Form::AddWeight {
                    label,
                    weight: String::new(),
                }),
                code => {
                    edit_text(&mut label, code);
                    Some(Form::AddLabel(label))
                }
            },
            Form::AddWeight { label, mut weight } => match code {
                KeyCode::Enter => {
                    if self.spinner.add_choice(&label, &weight) {
                        None
                    } else {
                        // rejected weight, let the user fix it
                        Some(Form::AddWeight {
                            label,
                            weight: String::new(),
                        })
                    }
                }
                code => {
                    edit_text(&mut weight, code);
                    Some(Form::AddWeight { label, weight })
                }
            },
            Form::EditWeight { index, mut weight } => match code {
                KeyCode::Enter => {
                    if self.spinner.set_weight(index, &weight) {
                        None
                    } else {
                        Some(Form::EditWeight {
                            index,
                            weight: String::new(),
                        })
                    }
                }
                code => {
                    edit_text(&mut weight, code);
                    Some(Form::EditWeight { index, weight })
                }
            },
        }
    }
}

fn edit_text(text: &mut String, code: KeyCode) {
    match code {
        KeyCode::Char(c) => text.push(c),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => {}
    }
}
