use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::collections::VecDeque;
use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::render::{measure_height, strip_styles};

/// The terminal surface a modal menu draws on.
///
/// Implementations are only ever driven from the UI-owning thread.
pub trait Console {
    /// Visible (columns, rows)
    fn size(&self) -> io::Result<(u16, u16)>;

    fn enter_alternate(&mut self) -> io::Result<()>;

    fn leave_alternate(&mut self) -> io::Result<()>;

    /// Replaces the visible frame with `lines`. Lines may carry style escapes
    /// and embedded newlines.
    fn draw(&mut self, lines: &[String]) -> io::Result<()>;

    /// Waits up to `timeout` for a key press. `None` when none arrived.
    fn read_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>>;
}

pub struct CrosstermConsole {
    stdout: Stdout,
}

impl CrosstermConsole {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }
}

impl Default for CrosstermConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for CrosstermConsole {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn enter_alternate(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(self.stdout, EnterAlternateScreen, Hide)?;
        Ok(())
    }

    fn leave_alternate(&mut self) -> io::Result<()> {
        execute!(self.stdout, Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        Ok(())
    }

    fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        let (columns, _) = self.size()?;
        queue_frame(&mut self.stdout, lines, columns)?;
        self.stdout.flush()
    }

    fn read_key(&mut self, timeout: Duration) -> io::Result<Option<KeyEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            // Windows reports releases as well
            Event::Key(key) if key.kind != KeyEventKind::Release => Ok(Some(key)),
            _ => Ok(None),
        }
    }
}

/// Queues a full-screen redraw of `lines`.
///
/// Raw mode neither wraps the row counter nor returns to column 0 on a
/// newline, so every physical line is placed explicitly, below the rows the
/// previous ones wrapped into.
fn queue_frame(out: &mut impl Write, lines: &[String], columns: u16) -> io::Result<()> {
    let columns = usize::from(columns.max(1));
    queue!(out, Clear(ClearType::All))?;

    let mut row = 0usize;
    for segment in lines.iter().flat_map(|line| line.split('\n')) {
        let y = u16::try_from(row).unwrap_or(u16::MAX);
        queue!(out, MoveTo(0, y), Print(segment))?;
        row += measure_height(&strip_styles(segment), columns);
    }
    Ok(())
}

/// Headless console driven by a queue of key presses. Every drawn frame is
/// kept so callers can inspect what the user would have seen.
///
/// Clones share state, so a host can hand one clone to the UI context and
/// keep another for inspection.
#[derive(Clone)]
pub struct ScriptedConsole {
    state: Arc<Mutex<ScriptState>>,
}

struct ScriptState {
    size: (u16, u16),
    keys: VecDeque<KeyEvent>,
    frames: Vec<Vec<String>>,
    in_alternate: bool,
    alternate_entries: usize,
}

impl ScriptedConsole {
    pub fn new(columns: u16, rows: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                size: (columns, rows),
                keys: VecDeque::new(),
                frames: Vec::new(),
                in_alternate: false,
                alternate_entries: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_keys(self, keys: impl IntoIterator<Item = KeyEvent>) -> Self {
        self.lock().keys.extend(keys);
        self
    }

    pub fn push_key(&self, key: KeyEvent) {
        self.lock().keys.push_back(key);
    }

    /// Queues one key press per character of `text`
    pub fn type_text(&self, text: &str) {
        self.lock()
            .keys
            .extend(text.chars().map(|c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)));
    }

    pub fn frames(&self) -> Vec<Vec<String>> {
        self.lock().frames.clone()
    }

    pub fn last_frame(&self) -> Option<Vec<String>> {
        self.lock().frames.last().cloned()
    }

    pub fn in_alternate(&self) -> bool {
        self.lock().in_alternate
    }

    /// How many times a menu took over the alternate buffer
    pub fn alternate_entries(&self) -> usize {
        self.lock().alternate_entries
    }

    pub fn remaining_keys(&self) -> usize {
        self.lock().keys.len()
    }
}

impl Console for ScriptedConsole {
    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(self.lock().size)
    }

    fn enter_alternate(&mut self) -> io::Result<()> {
        let mut state = self.lock();
        state.in_alternate = true;
        state.alternate_entries += 1;
        Ok(())
    }

    fn leave_alternate(&mut self) -> io::Result<()> {
        self.lock().in_alternate = false;
        Ok(())
    }

    fn draw(&mut self, lines: &[String]) -> io::Result<()> {
        self.lock().frames.push(lines.to_vec());
        Ok(())
    }

    fn read_key(&mut self, _timeout: Duration) -> io::Result<Option<KeyEvent>> {
        match self.lock().keys.pop_front() {
            Some(key) => Ok(Some(key)),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no scripted keys left",
            )),
        }
    }
}

pub fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}
