mod events;

pub use self::events::{Event, EventConfig, Events};

mod terminal;

pub use self::terminal::TerminalApp;
