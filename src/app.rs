use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::contacts::ContactBook;
use crate::gesture::{GestureAdapter, InputMode, Move, Pointer};
use crate::pyramid::{position_at, row_of, PyramidState};
use crate::share::desktop::Desktop;
use crate::share::{self, Delivery, PendingImage, ShareError, ShareGuard};
use crate::store::{self, KeyValueStore};

/// How long shifted slots stay highlighted after a move
const HIGHLIGHT: Duration = Duration::from_millis(300);

/// Status messages clear after this long
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Rename,     // Edit the label under the cursor
    Share,      // Contact picker for the captured image
    AddContact, // Name + phone form (opened from Share)
    Help,
    Alert,      // Blocking error message
}

pub struct App {
    pub popup: Popup,

    // Pyramid state (persisted after every change)
    pub pyramid: PyramidState,
    pub cursor: usize, // 1-based position under the keyboard cursor
    pub changed: Option<(RangeInclusive<usize>, Instant)>,
    pub gesture: Box<dyn GestureAdapter>,

    // Contacts (persisted after every change)
    pub contacts: ContactBook,
    pub selected_contact: usize,

    pub config: AppConfig,
    store: Box<dyn KeyValueStore>,
    data_dir: PathBuf,

    // Input buffers
    pub input_buffer: String,  // Rename text, or contact name
    pub phone_buffer: String,  // Contact phone
    pub contact_field: usize,  // 0 = name, 1 = phone

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
    pub alert: Option<String>,

    // Sharing
    share_guard: ShareGuard,
    pub pending_image: Option<PendingImage>,
    desktop: Box<dyn Desktop>,

    /// Terminal area of the last frame, for mouse hit-testing
    pub viewport: Rect,
}

impl App {
    pub fn new(
        config: AppConfig,
        mut store: Box<dyn KeyValueStore>,
        desktop: Box<dyn Desktop>,
        data_dir: PathBuf,
    ) -> Self {
        let pyramid = store::load_pyramid(store.as_mut());
        let contacts = ContactBook::new(store::load_contacts(store.as_ref()));
        tracing::info!(
            rows = pyramid.row_count,
            contacts = contacts.len(),
            "Loaded pyramid"
        );

        Self {
            popup: Popup::None,

            pyramid,
            cursor: 1,
            changed: None,
            gesture: config.input_mode.adapter(),

            contacts,
            selected_contact: 0,

            config,
            store,
            data_dir,

            input_buffer: String::new(),
            phone_buffer: String::new(),
            contact_field: 0,

            status_message: None,
            status_message_time: None,
            alert: None,

            share_guard: ShareGuard::default(),
            pending_image: None,
            desktop,

            viewport: Rect::default(),
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Show a blocking alert
    fn show_alert(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::error!("{}", msg);
        self.alert = Some(msg);
        self.popup = Popup::Alert;
    }

    fn save_pyramid(&mut self) {
        if let Err(e) = store::save_pyramid(self.store.as_mut(), &self.pyramid) {
            tracing::error!("Failed to save pyramid: {}", e);
            self.set_status(format!("Not saved: {}", e));
        }
    }

    fn save_contacts(&mut self) {
        if let Err(e) = store::save_contacts(self.store.as_mut(), self.contacts.contacts()) {
            tracing::error!("Failed to save contacts: {}", e);
            self.set_status(format!("Contacts not saved: {}", e));
        }
    }

    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }

        // Handle normal key input
        self.handle_normal_key(key).await
    }

    async fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            // Cursor movement (reading order left/right, rows up/down)
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor_to(self.cursor.saturating_sub(1)),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor_to(self.cursor + 1),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor_row(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor_row(1),

            // Select / pick up / drop at the cursor
            KeyCode::Char(' ') | KeyCode::Enter => self.press_at_cursor(),

            KeyCode::Esc => {
                self.gesture.feed(Pointer::Cancel);
            }

            KeyCode::Char('e') => self.start_rename(),

            KeyCode::Char('+') | KeyCode::Char('=') => self.add_row(),
            KeyCode::Char('-') | KeyCode::Char('_') => self.remove_row(),

            KeyCode::Char('m') => self.toggle_input_mode(),

            KeyCode::Char('s') => self.start_share().await,

            // Help (? or F1)
            KeyCode::Char('?') | KeyCode::F(1) => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.popup {
            Popup::Rename => self.handle_rename_key(key),
            Popup::Share => self.handle_share_key(key),
            Popup::AddContact => self.handle_add_contact_key(key),
            Popup::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')) {
                    self.popup = Popup::None;
                }
            }
            Popup::Alert => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('q')) {
                    self.alert = None;
                    self.popup = Popup::None;
                }
            }
            Popup::None => {}
        }
        Ok(())
    }

    /// Mouse input: presses, drags and releases over pyramid slots
    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.popup != Popup::None {
            return;
        }

        let slot = crate::ui::slot_at(self.viewport, self.pyramid.row_count, mouse.column, mouse.row);

        let event = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => match slot {
                Some(position) => {
                    self.cursor = position;
                    Pointer::Down { position }
                }
                // Pressing empty court keeps any selection
                None => return,
            },
            MouseEventKind::Drag(MouseButton::Left) => match slot {
                Some(position) => Pointer::Over { position },
                None => return,
            },
            MouseEventKind::Up(MouseButton::Left) => Pointer::Up { position: slot },
            _ => return,
        };

        if let Some(mv) = self.gesture.feed(event) {
            self.apply_move(mv);
        }
    }

    fn move_cursor_to(&mut self, position: usize) {
        self.cursor = position.clamp(1, self.pyramid.total());
        if self.gesture.selected().is_some() {
            self.gesture.feed(Pointer::Over { position: self.cursor });
        }
    }

    fn move_cursor_row(&mut self, delta: isize) {
        let row = row_of(self.cursor);
        let column = self.cursor - position_at(row, 0).unwrap_or(1);
        let target = row as isize + delta;
        if target < 1 || target as usize > self.pyramid.row_count {
            return;
        }
        let target = target as usize;
        // Rows above are narrower; stay within them
        let column = column.min(target - 1);
        if let Some(position) = position_at(target, column) {
            self.move_cursor_to(position);
        }
    }

    /// Keyboard equivalent of a click (or of pick-up/drop while dragging)
    fn press_at_cursor(&mut self) {
        let position = self.cursor;

        let mv = match self.gesture.mode() {
            InputMode::Click => {
                self.gesture.feed(Pointer::Down { position });
                self.gesture.feed(Pointer::Up { position: Some(position) })
            }
            // Space picks up, the next Space drops
            InputMode::Drag if self.gesture.selected().is_some() => {
                self.gesture.feed(Pointer::Up { position: Some(position) })
            }
            InputMode::Drag => self.gesture.feed(Pointer::Down { position }),
        };

        if let Some(mv) = mv {
            self.apply_move(mv);
        }
    }

    /// Run a completed gesture through the pyramid and persist it
    fn apply_move(&mut self, mv: Move) {
        let label = self.pyramid.label(mv.from).unwrap_or_default().to_string();
        match self.pyramid.reposition(mv.from, mv.to) {
            Ok(Some(range)) => {
                tracing::info!(from = mv.from, to = mv.to, "Repositioned {}", label);
                self.changed = Some((range, Instant::now()));
                self.cursor = mv.to;
                self.save_pyramid();
                self.set_status(format!("{} moved to #{}", label, mv.to));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Rejected move {:?}: {}", mv, e);
                self.set_status(format!("Error: {}", e));
            }
        }
    }

    fn add_row(&mut self) {
        if self.pyramid.add_row() {
            self.save_pyramid();
            self.set_status(format!("Rows: {}", self.pyramid.row_count));
        }
    }

    fn remove_row(&mut self) {
        if self.pyramid.remove_row() {
            // Anything referring to the dropped row is stale now
            self.gesture.feed(Pointer::Cancel);
            self.changed = None;
            self.cursor = self.cursor.min(self.pyramid.total());
            self.save_pyramid();
            self.set_status(format!("Rows: {}", self.pyramid.row_count));
        }
    }

    fn toggle_input_mode(&mut self) {
        let mode = self.gesture.mode().toggled();
        self.gesture = mode.adapter();
        self.config.input_mode = mode;
        if let Err(e) = self.config.save() {
            tracing::warn!("Could not save input mode: {}", e);
        }
        self.set_status(format!("Input mode: {}", mode.label()));
    }

    fn start_rename(&mut self) {
        self.input_buffer = self.pyramid.label(self.cursor).unwrap_or_default().to_string();
        self.popup = Popup::Rename;
    }

    fn handle_rename_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_buffer.clear();
                self.popup = Popup::None;
            }
            KeyCode::Enter => {
                let label = std::mem::take(&mut self.input_buffer);
                self.popup = Popup::None;
                match self.pyramid.rename_slot(self.cursor, &label) {
                    Ok(()) => {
                        self.save_pyramid();
                        self.set_status(format!("Renamed #{}", self.cursor));
                    }
                    Err(e) => self.set_status(format!("Error: {}", e)),
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    /// Capture the pyramid and open the contact picker
    async fn start_share(&mut self) {
        let options = self.config.capture_options();
        match share::prepare(&self.share_guard, &self.pyramid, options).await {
            Ok(pending) => {
                self.pending_image = Some(pending);
                self.selected_contact = 0;
                self.popup = Popup::Share;
            }
            Err(ShareError::InFlight) => self.set_status("Share already in progress"),
            Err(e) => self.show_alert(e.to_string()),
        }
    }

    fn handle_share_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.pending_image = None;
                self.popup = Popup::None;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if !self.contacts.is_empty() {
                    self.selected_contact = (self.selected_contact + 1) % self.contacts.len();
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if !self.contacts.is_empty() {
                    self.selected_contact = self
                        .selected_contact
                        .checked_sub(1)
                        .unwrap_or(self.contacts.len() - 1);
                }
            }
            KeyCode::Enter => {
                if let Some(phone) = self.contacts.get(self.selected_contact).map(|c| c.phone.clone()) {
                    self.deliver(Some(&phone));
                }
            }
            KeyCode::Char('w') => self.deliver(None),
            KeyCode::Char('a') => {
                self.input_buffer.clear();
                self.phone_buffer.clear();
                self.contact_field = 0;
                self.popup = Popup::AddContact;
            }
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected_contact(),
            _ => {}
        }
    }

    /// Send the pending image to `phone` (or just open WhatsApp Web)
    fn deliver(&mut self, phone: Option<&str>) {
        let Some(pending) = self.pending_image.take() else {
            self.popup = Popup::None;
            return;
        };
        self.popup = Popup::None;

        let download_dir = self.config.download_dir(&self.data_dir);
        match share::deliver(self.desktop.as_mut(), &pending, phone, &download_dir) {
            Ok(Delivery::Downloaded(path)) => {
                self.set_status(format!("{} ({})", share::DOWNLOADED_MESSAGE, path.display()))
            }
            Ok(delivery) => self.set_status(delivery.message()),
            Err(e) => self.show_alert(e.to_string()),
        }
    }

    fn delete_selected_contact(&mut self) {
        let Some(contact) = self.contacts.get(self.selected_contact).cloned() else {
            return;
        };
        if self.contacts.delete(contact.id) {
            self.save_contacts();
            self.selected_contact = self.selected_contact.min(self.contacts.len().saturating_sub(1));
            self.set_status(format!("Deleted {}", contact.name));
        }
    }

    fn handle_add_contact_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.popup = Popup::Share,
            KeyCode::Tab | KeyCode::BackTab => self.contact_field = 1 - self.contact_field,
            KeyCode::Enter => {
                let name = self.input_buffer.clone();
                let phone = self.phone_buffer.clone();
                match self.contacts.add(&name, &phone) {
                    Ok(_) => {
                        self.save_contacts();
                        self.selected_contact = self.contacts.len() - 1;
                        self.input_buffer.clear();
                        self.phone_buffer.clear();
                        self.set_status(format!("Saved {}", name.trim()));
                        self.popup = Popup::Share;
                    }
                    Err(e) => self.set_status(format!("Error: {}", e)),
                }
            }
            KeyCode::Backspace => {
                self.active_contact_buffer().pop();
            }
            KeyCode::Char(c) => self.active_contact_buffer().push(c),
            _ => {}
        }
    }

    fn active_contact_buffer(&mut self) -> &mut String {
        if self.contact_field == 0 {
            &mut self.input_buffer
        } else {
            &mut self.phone_buffer
        }
    }

    /// Positions to highlight as just shifted
    pub fn changed_range(&self) -> Option<&RangeInclusive<usize>> {
        self.changed.as_ref().map(|(range, _)| range)
    }

    pub fn is_sharing(&self) -> bool {
        self.share_guard.in_flight()
    }

    /// Periodic housekeeping: expire highlights and status messages
    pub fn tick(&mut self) {
        if let Some((_, at)) = &self.changed {
            if at.elapsed() >= HIGHLIGHT {
                self.changed = None;
            }
        }

        if let Some(at) = self.status_message_time {
            if at.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::share::capture::PyramidImage;
    use crate::store::{MemoryStore, PYRAMID_KEY};
    use crossterm::event::{KeyModifiers, MouseEventKind};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder {
        opened: Arc<Mutex<Vec<String>>>,
    }

    impl Desktop for Recorder {
        fn copy_image(&mut self, _image: &PyramidImage) -> Result<(), ShareError> {
            Ok(())
        }

        fn open_url(&mut self, url: &str) -> Result<(), ShareError> {
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }

        fn notify(&mut self, _message: &str) {}
    }

    fn app_with(mode: InputMode, store: MemoryStore) -> (App, Recorder) {
        let recorder = Recorder::default();
        let config = AppConfig {
            input_mode: mode,
            ..Default::default()
        };
        let app = App::new(
            config,
            Box::new(store),
            Box::new(recorder.clone()),
            std::env::temp_dir(),
        );
        (app, recorder)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press(app: &mut App, codes: &[KeyCode]) {
        for code in codes {
            app.handle_key(key(*code)).await.unwrap();
        }
    }

    fn saved(app: &App) -> PyramidState {
        store::read(app.store.as_ref(), PYRAMID_KEY).unwrap().unwrap()
    }

    fn type_text(text: &str) -> Vec<KeyCode> {
        text.chars().map(KeyCode::Char).collect()
    }

    #[tokio::test]
    async fn test_click_mode_moves_and_persists() {
        let (mut app, _) = app_with(InputMode::Click, MemoryStore::default());

        // Select #1, walk to #4, select again
        press(&mut app, &[KeyCode::Char(' '), KeyCode::Down, KeyCode::Down, KeyCode::Char(' ')]).await;

        assert_eq!(app.pyramid.label(4), Some("Player 1"));
        assert_eq!(app.pyramid.label(1), Some("Player 2"));
        assert_eq!(app.changed_range(), Some(&(1..=4)));
        assert_eq!(app.cursor, 4);
        assert_eq!(saved(&app), app.pyramid);
    }

    #[tokio::test]
    async fn test_drag_mode_keyboard_pick_and_drop() {
        let (mut app, _) = app_with(InputMode::Drag, MemoryStore::default());

        // Cursor to #6, pick up, carry to #2, drop
        press(&mut app, &[KeyCode::Down, KeyCode::Down, KeyCode::Right, KeyCode::Right]).await;
        assert_eq!(app.cursor, 6);
        press(&mut app, &[KeyCode::Char(' ')]).await;
        assert_eq!(app.gesture.selected(), Some(6));

        // Up from the end of row 3 lands on the end of row 2
        press(&mut app, &[KeyCode::Up]).await;
        assert_eq!(app.cursor, 3);
        assert_eq!(app.gesture.target(), Some(3));

        press(&mut app, &[KeyCode::Left, KeyCode::Char(' ')]).await;
        assert_eq!(app.cursor, 2);
        assert_eq!(app.pyramid.label(2), Some("Player 6"));
        assert_eq!(app.pyramid.label(3), Some("Player 2"));
        assert_eq!(saved(&app), app.pyramid);
    }

    #[tokio::test]
    async fn test_drag_dropped_on_origin_is_noop() {
        let (mut app, _) = app_with(InputMode::Drag, MemoryStore::default());
        press(&mut app, &[KeyCode::Char(' '), KeyCode::Char(' ')]).await;
        assert_eq!(app.gesture.selected(), None);
        assert_eq!(app.pyramid, PyramidState::default());
    }

    #[tokio::test]
    async fn test_rename_persists_immediately() {
        let (mut app, _) = app_with(InputMode::Click, MemoryStore::default());

        press(&mut app, &[KeyCode::Right, KeyCode::Char('e')]).await;
        assert_eq!(app.popup, Popup::Rename);
        assert_eq!(app.input_buffer, "Player 2");

        // Clear the old label and type a new one
        let mut codes = vec![KeyCode::Backspace; 8];
        codes.extend(type_text("Ana"));
        codes.push(KeyCode::Enter);
        press(&mut app, &codes).await;

        assert_eq!(app.popup, Popup::None);
        assert_eq!(app.pyramid.label(2), Some("Ana"));
        assert_eq!(saved(&app).label(2), Some("Ana"));
    }

    #[tokio::test]
    async fn test_rows_change_and_clamp_cursor() {
        let (mut app, _) = app_with(InputMode::Click, MemoryStore::default());
        for _ in 0..8 {
            press(&mut app, &[KeyCode::Char('+')]).await;
        }
        assert_eq!(app.pyramid.row_count, 10);
        assert_eq!(saved(&app).slots.len(), 55);

        // Cursor on the last slot, then shrink under it
        for _ in 0..60 {
            press(&mut app, &[KeyCode::Right]).await;
        }
        assert_eq!(app.cursor, 55);
        press(&mut app, &[KeyCode::Char('-')]).await;
        assert_eq!(app.cursor, 45);
        assert_eq!(saved(&app).row_count, 9);
    }

    #[tokio::test]
    async fn test_share_to_new_contact() {
        let (mut app, recorder) = app_with(InputMode::Click, MemoryStore::default());

        press(&mut app, &[KeyCode::Char('s')]).await;
        assert_eq!(app.popup, Popup::Share);
        assert!(app.pending_image.is_some());
        assert!(!app.is_sharing());

        let mut codes = vec![KeyCode::Char('a')];
        codes.extend(type_text("Ana"));
        codes.push(KeyCode::Tab);
        codes.extend(type_text("091 234 567"));
        codes.push(KeyCode::Enter);
        press(&mut app, &codes).await;

        assert_eq!(app.popup, Popup::Share);
        assert_eq!(app.contacts.get(0).unwrap().phone, "+091234567");

        press(&mut app, &[KeyCode::Enter]).await;
        assert_eq!(app.popup, Popup::None);
        assert!(app.pending_image.is_none());
        assert_eq!(
            *recorder.opened.lock().unwrap(),
            vec!["https://web.whatsapp.com/send?phone=091234567".to_string()]
        );
        assert_eq!(app.status_message.as_deref(), Some(share::COPIED_MESSAGE));
    }

    #[tokio::test]
    async fn test_share_popup_delete_contact() {
        let mut store = MemoryStore::default();
        store
            .set(
                crate::store::CONTACTS_KEY,
                r#"[{"id":1,"name":"Ana","phone":"+1"},{"id":2,"name":"Ivo","phone":"+2"}]"#,
            )
            .unwrap();
        let (mut app, _) = app_with(InputMode::Click, store);
        assert_eq!(app.contacts.len(), 2);

        press(&mut app, &[KeyCode::Char('s'), KeyCode::Down, KeyCode::Char('d')]).await;
        assert_eq!(app.contacts.len(), 1);
        assert_eq!(app.contacts.get(0).unwrap().name, "Ana");
        assert_eq!(app.selected_contact, 0);
        assert_eq!(store::load_contacts(app.store.as_ref()).len(), 1);
    }

    #[test]
    fn test_mouse_drag_between_slots() {
        let (mut app, _) = app_with(InputMode::Drag, MemoryStore::default());
        app.viewport = Rect::new(0, 0, 120, 40);

        let rects = crate::ui::slot_rects(app.viewport, app.pyramid.row_count);
        let center = |r: Rect| (r.x + r.width / 2, r.y + r.height / 2);
        let mouse = |kind, (column, row): (u16, u16)| MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), center(rects[9])));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), center(rects[4])));
        app.handle_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), center(rects[0])));
        app.handle_mouse(mouse(MouseEventKind::Up(MouseButton::Left), center(rects[0])));

        assert_eq!(app.pyramid.label(1), Some("Player 10"));
        assert_eq!(app.pyramid.label(10), Some("Player 9"));
        assert_eq!(saved(&app), app.pyramid);
    }

    #[test]
    fn test_mouse_click_outside_keeps_selection() {
        let (mut app, _) = app_with(InputMode::Click, MemoryStore::default());
        app.viewport = Rect::new(0, 0, 120, 40);

        let rects = crate::ui::slot_rects(app.viewport, app.pyramid.row_count);
        let center = |r: Rect| (r.x + r.width / 2, r.y + r.height / 2);
        let click = |app: &mut App, (column, row): (u16, u16)| {
            for kind in [
                MouseEventKind::Down(MouseButton::Left),
                MouseEventKind::Up(MouseButton::Left),
            ] {
                app.handle_mouse(MouseEvent {
                    kind,
                    column,
                    row,
                    modifiers: KeyModifiers::NONE,
                });
            }
        };

        click(&mut app, center(rects[2]));
        assert_eq!(app.gesture.selected(), Some(3));

        // Info line, outside every slot
        click(&mut app, (0, 0));
        assert_eq!(app.gesture.selected(), Some(3));

        click(&mut app, center(rects[0]));
        assert_eq!(app.pyramid.label(1), Some("Player 3"));
        assert_eq!(app.gesture.selected(), None);
    }

    #[test]
    fn test_tick_expires_highlight() {
        let (mut app, _) = app_with(InputMode::Click, MemoryStore::default());
        app.changed = Some((1..=3, Instant::now() - Duration::from_secs(1)));
        app.set_status("hello");
        app.tick();
        assert!(app.changed.is_none());
        assert_eq!(app.status_message.as_deref(), Some("hello"));
    }
}
