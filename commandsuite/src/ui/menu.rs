//! Modal console menus.
//!
//! A menu takes over the alternate screen buffer for the duration of
//! `bind()`, redraws itself after every key press and hands back a typed
//! result once the user confirms or cancels.

use super::colors::{fg, reset, Palette};
use super::console::Console;
use super::messages::{AlternateBufferLease, MessageSink};
use super::render::{fit_to_height, measure_height, strip_styles};
use crate::error::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fmt::Display;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const FOOTER: &str = "Up/Down select | type to filter | Enter confirm | Esc cancel";
const INPUT_FOOTER: &str = "Enter confirm | Esc cancel";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOptions {
    /// Prefix drawn in front of the highlighted item
    pub highlight_marker: String,
    /// Upper bound on the rows a menu may use, below the terminal height
    pub max_rows: Option<u16>,
    /// How long a key wait lasts before cancellation is checked again
    pub poll_interval: Duration,
}

impl Default for MenuOptions {
    fn default() -> Self {
        Self {
            highlight_marker: "> ".to_string(),
            max_rows: None,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Scoped ownership of the alternate screen buffer.
///
/// Leaving the scope by any path restores the primary buffer first and then
/// releases the sink lease, which replays messages queued meanwhile.
pub struct MenuSession<'a> {
    console: &'a mut dyn Console,
    _lease: AlternateBufferLease<'a>,
}

impl<'a> MenuSession<'a> {
    pub fn begin(console: &'a mut dyn Console, sink: &'a MessageSink) -> Result<Self> {
        let lease = sink.acquire_alternate()?;
        console.enter_alternate()?;
        Ok(Self {
            console,
            _lease: lease,
        })
    }

    pub fn console(&mut self) -> &mut dyn Console {
        &mut *self.console
    }

    /// Waits for the next key press. `None` once `token` fires.
    pub fn next_key(
        &mut self,
        poll_interval: Duration,
        token: &CancellationToken,
    ) -> Result<Option<KeyEvent>> {
        loop {
            if token.is_cancelled() {
                return Ok(None);
            }
            if let Some(key) = self.console.read_key(poll_interval)? {
                return Ok(Some(key));
            }
        }
    }
}

impl Drop for MenuSession<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.console.leave_alternate() {
            tracing::error!("Failed to restore primary screen buffer: {}", e);
        }
    }
}

/// What a key press did to a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Redraw,
    Confirm,
    Cancel,
    Ignore,
}

fn is_cancel(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

type Selector<T> = Box<dyn Fn(usize, &T) -> String + Send>;

/// Navigation and filtering state of a single-choice menu
#[derive(Debug, Clone)]
pub struct MenuState {
    labels: Vec<String>,
    descriptions: Vec<Option<String>>,
    filter: String,
    visible: Vec<usize>,
    highlighted: usize,
    top: usize,
    viewport_height: usize,
}

impl MenuState {
    pub fn new(labels: Vec<String>, descriptions: Vec<Option<String>>) -> Self {
        let visible = (0..labels.len()).collect();
        Self {
            labels,
            descriptions,
            filter: String::new(),
            visible,
            highlighted: 0,
            top: 0,
            viewport_height: 0,
        }
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    /// Item indices that pass the current filter, in original order
    pub fn visible(&self) -> &[usize] {
        &self.visible
    }

    /// Rows used by the item list in the last rendered frame
    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// Original index of the highlighted item
    pub fn selected(&self) -> Option<usize> {
        self.visible.get(self.highlighted).copied()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> MenuAction {
        if is_cancel(&key) {
            return MenuAction::Cancel;
        }

        let count = self.visible.len();
        match key.code {
            KeyCode::Enter if count > 0 => MenuAction::Confirm,
            KeyCode::Enter => MenuAction::Ignore,
            KeyCode::Down | KeyCode::Tab if count > 0 => {
                self.highlighted = (self.highlighted + 1) % count;
                MenuAction::Redraw
            }
            KeyCode::Up | KeyCode::BackTab if count > 0 => {
                self.highlighted = (self.highlighted + count - 1) % count;
                MenuAction::Redraw
            }
            KeyCode::Home if count > 0 => {
                self.highlighted = 0;
                MenuAction::Redraw
            }
            KeyCode::End if count > 0 => {
                self.highlighted = count - 1;
                MenuAction::Redraw
            }
            KeyCode::Backspace => {
                if self.filter.pop().is_none() {
                    return MenuAction::Ignore;
                }
                self.refilter();
                MenuAction::Redraw
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.filter.push(c);
                self.refilter();
                MenuAction::Redraw
            }
            _ => MenuAction::Ignore,
        }
    }

    fn refilter(&mut self) {
        let needle = self.filter.to_lowercase();
        self.visible = self
            .labels
            .iter()
            .enumerate()
            .filter(|(_, label)| label.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        self.highlighted = 0;
        self.top = 0;
    }

    /// Builds the frame for a `columns` x `rows` terminal. Header lines may
    /// carry style escapes; their heights are measured without them.
    pub fn render(
        &mut self,
        header: &[String],
        columns: usize,
        rows: usize,
        options: &MenuOptions,
    ) -> Vec<String> {
        let rows = rows.max(1);
        let mut frame = Vec::new();
        let mut used = 0;

        for line in header {
            let height = measure_height(&strip_styles(line), columns);
            if used + height > rows {
                break;
            }
            used += height;
            frame.push(line.clone());
        }

        if !self.filter.is_empty() && used < rows {
            let line = format!("Filter: {}", self.filter);
            let line = fit_to_height(&line, columns, 1).to_string();
            used += 1;
            frame.push(line);
        }

        let description = self
            .selected()
            .and_then(|i| self.descriptions.get(i).cloned().flatten());
        let description_height = description
            .as_deref()
            .map(|d| measure_height(d, columns) + 1)
            .unwrap_or(0);
        let footer_height = measure_height(FOOTER, columns) + 1;

        let mut available = rows.saturating_sub(used);
        let reserved = description_height + footer_height;
        if available > reserved {
            available -= reserved;
        } else {
            available = available.min(1);
        }

        let marker = &options.highlight_marker;
        let blank: String = " ".repeat(marker.chars().count());
        let item_text = |i: usize, highlighted: bool| {
            let prefix = if highlighted { marker.as_str() } else { blank.as_str() };
            format!("{}{}", prefix, self.labels[i])
        };

        let heights: Vec<usize> = self
            .visible
            .iter()
            .enumerate()
            .map(|(pos, &i)| measure_height(&item_text(i, pos == self.highlighted), columns))
            .collect();
        let (top, end) = scroll_window(&heights, self.highlighted, self.top, available);
        self.top = top;

        let mut list_height = 0;
        if self.visible.is_empty() && available > 0 {
            frame.push("  (no matches)".to_string());
            list_height = 1;
        }
        for pos in top..end {
            let i = self.visible[pos];
            let highlighted = pos == self.highlighted;
            let text = item_text(i, highlighted);
            let text = fit_to_height(&text, columns, available - list_height);
            list_height += measure_height(text, columns);
            if highlighted {
                frame.push(format!("{}{}{}", fg(Palette::SELECTION), text, reset()));
            } else {
                frame.push(text.to_string());
            }
        }
        self.viewport_height = list_height;
        used += list_height;

        if let Some(description) = description {
            if used + description_height <= rows {
                frame.push(String::new());
                frame.push(description);
                used += description_height;
            }
        }

        if used + footer_height <= rows {
            frame.push(String::new());
            frame.push(format!("{}{}{}", fg(Palette::PARAMETER), FOOTER, reset()));
        }

        frame
    }
}

/// First and one-past-last item positions to draw so that `highlighted` is
/// visible and the summed heights stay within `available` rows.
pub fn scroll_window(
    heights: &[usize],
    highlighted: usize,
    top: usize,
    available: usize,
) -> (usize, usize) {
    if heights.is_empty() || available == 0 {
        return (0, 0);
    }

    let highlighted = highlighted.min(heights.len() - 1);
    let mut top = top.min(highlighted);
    while top < highlighted && heights[top..=highlighted].iter().sum::<usize>() > available {
        top += 1;
    }

    let mut end = top;
    let mut used = 0;
    while end < heights.len() {
        if end > top && used + heights[end] > available {
            break;
        }
        used += heights[end];
        end += 1;
    }

    (top, end)
}

fn header_lines(caption: &str, message: &str, preview: Option<&str>) -> Vec<String> {
    let mut header = vec![format!("{}{}{}", fg(Palette::INFORMATION), caption, reset())];
    if !message.is_empty() {
        header.push(message.to_string());
    }
    if let Some(preview) = preview {
        header.push(String::new());
        header.push(preview.to_string());
    }
    header.push(String::new());
    header
}

fn terminal_bounds(console: &dyn Console, options: &MenuOptions) -> Result<(usize, usize)> {
    let (columns, rows) = console.size()?;
    let rows = match options.max_rows {
        Some(max) => rows.min(max),
        None => rows,
    };
    Ok((usize::from(columns.max(1)), usize::from(rows.max(1))))
}

/// Single-choice list menu
pub struct SelectItemMenu<T> {
    caption: String,
    message: String,
    items: Vec<T>,
    label: Selector<T>,
    description: Option<Selector<T>>,
    preview: Option<String>,
    options: MenuOptions,
    cancellation: CancellationToken,
}

impl<T: Display> SelectItemMenu<T> {
    pub fn new(caption: impl Into<String>, message: impl Into<String>, items: Vec<T>) -> Self {
        Self {
            caption: caption.into(),
            message: message.into(),
            items,
            label: Box::new(|_, item: &T| item.to_string()),
            description: None,
            preview: None,
            options: MenuOptions::default(),
            cancellation: CancellationToken::new(),
        }
    }
}

impl<T> SelectItemMenu<T> {
    pub fn render_item(mut self, label: impl Fn(usize, &T) -> String + Send + 'static) -> Self {
        self.label = Box::new(label);
        self
    }

    pub fn render_item_description(
        mut self,
        description: impl Fn(usize, &T) -> String + Send + 'static,
    ) -> Self {
        self.description = Some(Box::new(description));
        self
    }

    /// Styled text shown between the message and the item list
    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    pub fn with_options(mut self, options: MenuOptions) -> Self {
        self.options = options;
        self
    }

    /// Closes the menu as cancelled when `token` fires while waiting for a key
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    fn state(&self) -> MenuState {
        let labels = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| (self.label)(i, item))
            .collect();
        let descriptions = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                self.description
                    .as_ref()
                    .map(|d| d(i, item))
                    .filter(|d| !d.is_empty())
            })
            .collect();
        MenuState::new(labels, descriptions)
    }

    /// Runs the menu until the user confirms (`Some(item)`) or cancels
    /// (`None`). Must be called on the thread that owns the console.
    pub fn bind(mut self, console: &mut dyn Console, sink: &MessageSink) -> Result<Option<T>> {
        let mut state = self.state();
        let header = header_lines(&self.caption, &self.message, self.preview.as_deref());
        let mut session = MenuSession::begin(console, sink)?;

        loop {
            let (columns, rows) = terminal_bounds(session.console(), &self.options)?;
            let frame = state.render(&header, columns, rows, &self.options);
            session.console().draw(&frame)?;

            let Some(key) = session.next_key(self.options.poll_interval, &self.cancellation)?
            else {
                tracing::debug!("Menu '{}' closed by cancellation", self.caption);
                return Ok(None);
            };
            match state.handle_key(key) {
                MenuAction::Confirm => {
                    let selected = state.selected();
                    tracing::debug!("Menu '{}' confirmed {:?}", self.caption, selected);
                    return Ok(selected.map(|i| self.items.swap_remove(i)));
                }
                MenuAction::Cancel => {
                    tracing::debug!("Menu '{}' cancelled", self.caption);
                    return Ok(None);
                }
                MenuAction::Redraw | MenuAction::Ignore => {}
            }
        }
    }
}

/// Single-line text input menu
pub struct InputPrompt {
    caption: String,
    message: String,
    input: String,
    options: MenuOptions,
    cancellation: CancellationToken,
}

impl InputPrompt {
    pub fn new(caption: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            caption: caption.into(),
            message: message.into(),
            input: String::new(),
            options: MenuOptions::default(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_initial(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    pub fn with_options(mut self, options: MenuOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> MenuAction {
        if is_cancel(&key) {
            return MenuAction::Cancel;
        }

        match key.code {
            KeyCode::Enter => MenuAction::Confirm,
            KeyCode::Backspace => {
                if self.input.pop().is_some() {
                    MenuAction::Redraw
                } else {
                    MenuAction::Ignore
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                MenuAction::Redraw
            }
            _ => MenuAction::Ignore,
        }
    }

    fn render(&self, columns: usize, rows: usize) -> Vec<String> {
        let mut frame = Vec::new();
        let mut used = 0;
        let header = header_lines(&self.caption, &self.message, None);
        // keep the input line on screen before anything else
        let budget = rows.saturating_sub(1);
        for line in header {
            let height = measure_height(&strip_styles(&line), columns);
            if used + height > budget {
                break;
            }
            used += height;
            frame.push(line);
        }

        let input_line = format!("{}{}_", self.options.highlight_marker, self.input);
        let input_line = fit_to_height(&input_line, columns, rows - used).to_string();
        used += measure_height(&input_line, columns);
        frame.push(input_line);

        if used + 2 <= rows {
            frame.push(String::new());
            frame.push(format!("{}{}{}", fg(Palette::PARAMETER), INPUT_FOOTER, reset()));
        }
        frame
    }

    pub fn bind(mut self, console: &mut dyn Console, sink: &MessageSink) -> Result<Option<String>> {
        let mut session = MenuSession::begin(console, sink)?;

        loop {
            let (columns, rows) = terminal_bounds(session.console(), &self.options)?;
            let frame = self.render(columns, rows);
            session.console().draw(&frame)?;

            let Some(key) = session.next_key(self.options.poll_interval, &self.cancellation)?
            else {
                return Ok(None);
            };
            match self.handle_key(key) {
                MenuAction::Confirm => return Ok(Some(std::mem::take(&mut self.input))),
                MenuAction::Cancel => return Ok(None),
                MenuAction::Redraw | MenuAction::Ignore => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SuiteError;
    use crate::ui::console::{key, ScriptedConsole};
    use crate::ui::messages::tests::SharedBuffer;

    fn ctrl_c() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
    }

    fn frame_height(frame: &[String], columns: usize) -> usize {
        frame
            .iter()
            .map(|line| measure_height(&strip_styles(line), columns))
            .sum()
    }

    #[test]
    fn test_navigation_wraps_around() {
        let mut state = MenuState::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![None, None, None],
        );
        assert_eq!(state.handle_key(key(KeyCode::Up)), MenuAction::Redraw);
        assert_eq!(state.highlighted(), 2);
        state.handle_key(key(KeyCode::Down));
        assert_eq!(state.highlighted(), 0);
        state.handle_key(key(KeyCode::Tab));
        state.handle_key(key(KeyCode::Tab));
        assert_eq!(state.selected(), Some(2));
    }

    #[test]
    fn test_filter_narrows_and_resets_highlight() {
        let mut state = MenuState::new(
            vec!["Change string".into(), "Splat command".into(), "Surround lines".into()],
            vec![None, None, None],
        );
        state.handle_key(key(KeyCode::Down));
        state.handle_key(key(KeyCode::Down));
        assert_eq!(state.highlighted(), 2);

        state.handle_key(key(KeyCode::Char('S')));
        state.handle_key(key(KeyCode::Char('u')));
        assert_eq!(state.visible(), &[2]);
        assert_eq!(state.highlighted(), 0);
        assert_eq!(state.selected(), Some(2));

        state.handle_key(key(KeyCode::Backspace));
        assert_eq!(state.visible(), &[1, 2]);
        assert_eq!(state.highlighted(), 0);
    }

    #[test]
    fn test_enter_on_empty_filter_result_is_ignored() {
        let mut state = MenuState::new(vec!["a".into()], vec![None]);
        state.handle_key(key(KeyCode::Char('z')));
        assert!(state.visible().is_empty());
        assert_eq!(state.handle_key(key(KeyCode::Enter)), MenuAction::Ignore);
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_scroll_window_keeps_highlight_visible() {
        let heights = vec![1; 10];
        assert_eq!(scroll_window(&heights, 0, 0, 4), (0, 4));
        assert_eq!(scroll_window(&heights, 6, 0, 4), (3, 7));
        assert_eq!(scroll_window(&heights, 2, 3, 4), (2, 6));
        assert_eq!(scroll_window(&heights, 9, 0, 4), (6, 10));
    }

    #[test]
    fn test_scroll_window_accounts_for_wrapped_items() {
        let heights = vec![2, 3, 1, 1];
        assert_eq!(scroll_window(&heights, 0, 0, 4), (0, 1));
        assert_eq!(scroll_window(&heights, 2, 0, 4), (1, 3));
    }

    #[test]
    fn test_render_never_exceeds_terminal_rows() {
        let labels: Vec<String> = (0..40)
            .map(|i| format!("Refactor option number {} with a long label", i))
            .collect();
        let descriptions = labels.iter().map(|l| Some(format!("About {}", l))).collect();
        let mut state = MenuState::new(labels, descriptions);
        let header = header_lines("Caption", "Message", None);

        for _ in 0..25 {
            state.handle_key(key(KeyCode::Down));
            let frame = state.render(&header, 20, 12, &MenuOptions::default());
            assert!(frame_height(&frame, 20) <= 12);
            let highlighted = format!("> {}", state.labels[state.selected().unwrap()]);
            let shown = strip_styles(&frame.join("\n"));
            assert!(shown.contains(fit_to_height(&highlighted, 20, 1)));
        }
    }

    #[test]
    fn test_select_menu_returns_chosen_item() {
        let sink = MessageSink::new(SharedBuffer::default());
        let mut console = ScriptedConsole::new(80, 24)
            .with_keys([key(KeyCode::Down), key(KeyCode::Enter)]);

        let result = SelectItemMenu::new("Pick", "Choose one", vec!["alpha", "beta", "gamma"])
            .bind(&mut console, &sink)
            .unwrap();

        assert_eq!(result, Some("beta"));
        assert!(!console.in_alternate());
        assert!(!sink.is_alternate_active());
        assert_eq!(console.frames().len(), 2);
    }

    #[test]
    fn test_select_menu_uses_selectors() {
        let sink = MessageSink::new(SharedBuffer::default());
        let mut console = ScriptedConsole::new(80, 24).with_keys([key(KeyCode::Esc)]);

        let result = SelectItemMenu::new("Pick", "", vec![1, 2])
            .render_item(|_, n| format!("number {}", n))
            .render_item_description(|i, _| format!("index {}", i))
            .bind(&mut console, &sink)
            .unwrap();

        assert_eq!(result, None);
        let frame = strip_styles(&console.frames()[0].join("\n"));
        assert!(frame.contains("> number 1"));
        assert!(frame.contains("  number 2"));
        assert!(frame.contains("index 0"));
    }

    #[test]
    fn test_messages_flush_after_menu_closes() {
        let buffer = SharedBuffer::default();
        let sink = MessageSink::new(buffer.clone()).with_color(false);
        let mut console = ScriptedConsole::new(80, 24);

        {
            let _session = MenuSession::begin(&mut console, &sink).unwrap();
            sink.warn("queued during menu").unwrap();
            assert_eq!(buffer.contents(), "");
        }
        assert_eq!(buffer.contents(), "\nwarning: queued during menu\n");
        assert!(!console.in_alternate());
    }

    #[test]
    fn test_ctrl_c_cancels_input_prompt() {
        let sink = MessageSink::new(SharedBuffer::default());
        let mut console = ScriptedConsole::new(80, 24).with_keys([ctrl_c()]);

        let result = InputPrompt::new("Name", "").bind(&mut console, &sink).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_nested_menu_is_rejected() {
        let sink = MessageSink::new(SharedBuffer::default());
        let mut outer = ScriptedConsole::new(80, 24);
        let mut inner = ScriptedConsole::new(80, 24).with_keys([key(KeyCode::Enter)]);

        let _session = MenuSession::begin(&mut outer, &sink).unwrap();
        let result = SelectItemMenu::new("Inner", "", vec!["x"]).bind(&mut inner, &sink);
        assert!(matches!(result, Err(SuiteError::MenuActive)));
        assert_eq!(inner.alternate_entries(), 0);
    }

    #[test]
    fn test_error_inside_bind_restores_buffer() {
        let sink = MessageSink::new(SharedBuffer::default());
        // runs out of keys, read_key fails
        let mut console = ScriptedConsole::new(80, 24).with_keys([key(KeyCode::Down)]);

        let result = SelectItemMenu::new("Pick", "", vec!["a", "b"]).bind(&mut console, &sink);
        assert!(result.is_err());
        assert!(!console.in_alternate());
        assert!(!sink.is_alternate_active());
    }

    #[test]
    fn test_input_prompt_collects_text() {
        let sink = MessageSink::new(SharedBuffer::default());
        let mut console = ScriptedConsole::new(40, 10);
        console.type_text("Get-Itm");
        console.push_key(key(KeyCode::Backspace));
        console.type_text("em");
        console.push_key(key(KeyCode::Enter));

        let result = InputPrompt::new("Command", "Enter a command name")
            .bind(&mut console, &sink)
            .unwrap();

        assert_eq!(result.as_deref(), Some("Get-Item"));
        let last = strip_styles(&console.last_frame().unwrap().join("\n"));
        assert!(last.contains("> Get-Item_"));
    }

    /// A terminal nobody types into
    struct IdleConsole;

    impl Console for IdleConsole {
        fn size(&self) -> std::io::Result<(u16, u16)> {
            Ok((80, 24))
        }

        fn enter_alternate(&mut self) -> std::io::Result<()> {
            Ok(())
        }

        fn leave_alternate(&mut self) -> std::io::Result<()> {
            Ok(())
        }

        fn draw(&mut self, _lines: &[String]) -> std::io::Result<()> {
            Ok(())
        }

        fn read_key(&mut self, timeout: Duration) -> std::io::Result<Option<KeyEvent>> {
            std::thread::sleep(timeout);
            Ok(None)
        }
    }

    fn fast_options() -> MenuOptions {
        MenuOptions {
            poll_interval: Duration::from_millis(5),
            ..MenuOptions::default()
        }
    }

    #[test]
    fn test_menu_closes_when_token_fires_without_keys() {
        let sink = MessageSink::new(SharedBuffer::default());
        let token = CancellationToken::new();
        let trigger = token.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let result = SelectItemMenu::new("Pick", "", vec!["a", "b"])
            .with_options(fast_options())
            .with_cancellation(token)
            .bind(&mut IdleConsole, &sink)
            .unwrap();
        canceller.join().unwrap();

        assert_eq!(result, None);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(!sink.is_alternate_active());
    }

    #[test]
    fn test_input_prompt_closes_on_cancelled_token() {
        let sink = MessageSink::new(SharedBuffer::default());
        let token = CancellationToken::new();
        token.cancel();

        let result = InputPrompt::new("Name", "")
            .with_options(fast_options())
            .with_cancellation(token)
            .bind(&mut IdleConsole, &sink)
            .unwrap();
        assert_eq!(result, None);
    }
}
