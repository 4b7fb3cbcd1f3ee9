//! Per-session page state machine.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Block, Padding, Paragraph, Widget};
use ratatui::Frame;
use tracing::{debug, warn};

use super::input::Key;
use super::pages::{self, about, education, feed, menu, privacy, projects, splash};
use super::rain::Rain;
use super::theme::{next_theme_index, theme_at, ThemeStyles};
use super::wrap_lines;
use crate::error::Result;
use crate::feed::{FeedItem, FeedService, FeedSnapshot};
use crate::storage::{CountryStats, VisitorStore};

/// Splash animation step.
pub const SPLASH_TICK: Duration = Duration::from_millis(40);
/// Logo snake step.
pub const MENU_TICK: Duration = Duration::from_millis(50);
/// About-page typewriter step.
pub const TYPEWRITER_TICK: Duration = Duration::from_millis(40);

const BLINK_WRAP: usize = 1_000_000;
const MAX_BOX_WIDTH: u16 = 70;

/// The page being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Welcome animation.
    Splash,
    /// Main menu.
    Menu,
    /// Biography.
    About,
    /// Project list.
    Projects,
    /// Education timeline.
    Education,
    /// Contact handles.
    Contact,
    /// Latest posts.
    Feed,
    /// Tracking choice and stats.
    Privacy,
}

impl Page {
    /// The page opened by menu entry `index`.
    #[must_use]
    pub fn from_menu_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::About),
            1 => Some(Self::Projects),
            2 => Some(Self::Education),
            3 => Some(Self::Contact),
            4 => Some(Self::Feed),
            5 => Some(Self::Privacy),
            _ => None,
        }
    }
}

/// What the session loop must do after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing; keep any pending tick.
    None,
    /// Close the session.
    Quit,
    /// Deliver [`App::on_tick`] after this delay, replacing any pending tick.
    Tick(Duration),
    /// Fetch the feed and deliver the result to [`App::on_feed`].
    FetchFeed,
    /// Compute country statistics off the session task and deliver them
    /// to [`App::on_stats`].
    LoadStats,
}

/// Everything a session knows about its visitor when it starts.
#[derive(Debug, Clone, Default)]
pub struct SessionInfo {
    /// Unique visitors counted so far.
    pub visitor_count: usize,
    /// The visitor's IP address, when known.
    pub remote_ip: Option<String>,
    /// Whether the visitor is currently tracked.
    pub tracking_enabled: bool,
    /// Shared visitor store; `None` when counting is disabled.
    pub store: Option<Arc<VisitorStore>>,
    /// Shared feed service.
    pub feed: Option<Arc<FeedService>>,
    /// GeoLite2 database for country statistics.
    pub geolite_path: Option<PathBuf>,
}

/// Per-session UI model.
#[derive(Debug)]
pub struct App {
    page: Page,
    width: u16,
    height: u16,

    splash_reveal: usize,
    splash_blink: usize,
    logo_sweep: usize,
    about_reveal: usize,
    about_scramble: usize,

    menu_cursor: usize,
    project_cursor: usize,
    education_cursor: usize,
    privacy_cursor: usize,
    feed_cursor: usize,
    feed_offset: usize,

    theme_index: usize,
    styles: ThemeStyles,

    visitor_count: usize,
    remote_ip: Option<String>,
    tracking_enabled: bool,
    store: Option<Arc<VisitorStore>>,
    geolite_path: Option<PathBuf>,
    privacy_stats: Option<std::result::Result<CountryStats, String>>,

    feed: Option<Arc<FeedService>>,
    feed_items: Vec<FeedItem>,
    feed_loading: bool,
    feed_error: Option<String>,
    feed_fetched_at: Option<Instant>,
}

impl App {
    /// A new session starting on the splash page.
    #[must_use]
    pub fn new(info: SessionInfo) -> Self {
        Self {
            page: Page::Splash,
            width: 80,
            height: 24,
            splash_reveal: 0,
            splash_blink: 0,
            logo_sweep: 0,
            about_reveal: 0,
            about_scramble: 0,
            menu_cursor: 0,
            project_cursor: 0,
            education_cursor: 0,
            privacy_cursor: 0,
            feed_cursor: 0,
            feed_offset: 0,
            theme_index: 0,
            styles: ThemeStyles::from(theme_at(0)),
            visitor_count: info.visitor_count,
            remote_ip: info.remote_ip.filter(|ip| !ip.is_empty()),
            tracking_enabled: info.tracking_enabled,
            store: info.store,
            geolite_path: info.geolite_path,
            privacy_stats: None,
            feed: info.feed,
            feed_items: Vec::new(),
            feed_loading: false,
            feed_error: None,
            feed_fetched_at: None,
        }
    }

    /// The first action: start the splash animation.
    #[must_use]
    pub fn init(&self) -> Action {
        Action::Tick(SPLASH_TICK)
    }

    /// The current page.
    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    /// Unique visitors as last reported by the store.
    #[must_use]
    pub fn visitor_count(&self) -> usize {
        self.visitor_count
    }

    /// Whether the visitor is tracked.
    #[must_use]
    pub fn tracking_enabled(&self) -> bool {
        self.tracking_enabled
    }

    /// The shared feed service, if any.
    #[must_use]
    pub fn feed_service(&self) -> Option<Arc<FeedService>> {
        self.feed.clone()
    }

    /// The store and GeoLite2 database behind the privacy statistics.
    #[must_use]
    pub fn stats_request(&self) -> Option<(Arc<VisitorStore>, PathBuf)> {
        Some((self.store.clone()?, self.geolite_path.clone()?))
    }

    /// Advance the current page's animation.
    pub fn on_tick(&mut self) -> Action {
        match self.page {
            Page::Splash => {
                self.splash_blink = (self.splash_blink + 1) % BLINK_WRAP;
                if self.splash_reveal < splash::intro_rune_count() {
                    self.splash_reveal += 1;
                }
                Action::Tick(SPLASH_TICK)
            }
            Page::Menu => {
                self.logo_sweep = self.logo_sweep.wrapping_add(1);
                Action::Tick(MENU_TICK)
            }
            Page::About => {
                if self.about_reveal < about::rune_count() {
                    self.about_reveal += 1;
                    self.about_scramble += 1;
                    Action::Tick(TYPEWRITER_TICK)
                } else if self.about_scramble < self.about_reveal + about::settle_ticks() {
                    self.about_scramble += 1;
                    Action::Tick(TYPEWRITER_TICK)
                } else {
                    Action::None
                }
            }
            _ => Action::None,
        }
    }

    /// Record a new terminal size.
    pub fn on_resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// The terminal size last reported.
    #[must_use]
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Handle a keystroke.
    pub fn on_key(&mut self, key: Key) -> Action {
        match key {
            Key::CtrlC | Key::Char('q') => {
                if matches!(self.page, Page::Splash | Page::Menu) {
                    return Action::Quit;
                }
                self.go_to_menu()
            }
            Key::Esc | Key::Backspace => {
                if self.page == Page::Splash {
                    return Action::None;
                }
                self.go_to_menu()
            }
            Key::Up | Key::Char('k') => {
                self.move_cursor(false);
                Action::None
            }
            Key::Down | Key::Char('j') => {
                self.move_cursor(true);
                Action::None
            }
            Key::Enter | Key::Space => self.select(),
            Key::Char('t' | 'T') => {
                let current = isize::try_from(self.theme_index).unwrap_or(-1);
                self.theme_index = next_theme_index(current);
                self.styles = ThemeStyles::from(theme_at(self.theme_index));
                Action::None
            }
            _ => Action::None,
        }
    }

    /// Store the outcome of a feed fetch.
    pub fn on_feed(&mut self, result: Result<FeedSnapshot>) {
        self.feed_loading = false;
        match result {
            Err(e) => {
                debug!("Feed fetch failed: {}", e);
                self.feed_error = Some(e.to_string());
            }
            Ok(snapshot) => {
                self.feed_error = None;
                self.feed_items = snapshot.items;
                self.feed_fetched_at = Some(snapshot.fetched_at);
                if self.feed_items.is_empty() || self.feed_cursor >= self.feed_items.len() {
                    self.feed_cursor = 0;
                }
                self.adjust_feed_window();
            }
        }
    }

    /// Store the outcome of a country statistics pass.
    pub fn on_stats(&mut self, result: Result<CountryStats>) {
        if let Err(e) = &result {
            debug!("Country stats failed: {}", e);
        }
        self.privacy_stats = Some(result.map_err(|e| e.to_string()));
    }

    fn go_to_menu(&mut self) -> Action {
        self.page = Page::Menu;
        Action::Tick(MENU_TICK)
    }

    fn move_cursor(&mut self, down: bool) {
        let (cursor, len) = match self.page {
            Page::Menu => (&mut self.menu_cursor, menu::item_count()),
            Page::Projects => (&mut self.project_cursor, projects::count()),
            Page::Education => (&mut self.education_cursor, education::count()),
            Page::Privacy => (&mut self.privacy_cursor, privacy::OPTIONS.len()),
            Page::Feed => (&mut self.feed_cursor, self.feed_items.len()),
            _ => return,
        };
        if down {
            if *cursor + 1 < len {
                *cursor += 1;
            }
        } else {
            *cursor = cursor.saturating_sub(1);
        }
        if self.page == Page::Feed {
            self.adjust_feed_window();
        }
    }

    fn select(&mut self) -> Action {
        match self.page {
            Page::Splash => {
                self.page = Page::Menu;
                self.logo_sweep = 0;
                Action::Tick(MENU_TICK)
            }
            Page::Menu => self.open(Page::from_menu_index(self.menu_cursor).unwrap_or(Page::Menu)),
            Page::Privacy => {
                self.set_tracking(self.privacy_cursor == 0);
                self.go_to_menu()
            }
            _ => Action::None,
        }
    }

    fn open(&mut self, page: Page) -> Action {
        self.page = page;
        match page {
            Page::About => {
                self.about_reveal = 0;
                self.about_scramble = 0;
                Action::Tick(TYPEWRITER_TICK)
            }
            Page::Feed => {
                self.feed_cursor = 0;
                self.feed_offset = 0;
                if self.should_fetch_feed() {
                    self.feed_loading = true;
                    self.feed_error = None;
                    Action::FetchFeed
                } else {
                    Action::None
                }
            }
            Page::Privacy => {
                self.privacy_cursor = 0;
                self.privacy_stats = None;
                if self.stats_request().is_some() {
                    Action::LoadStats
                } else {
                    Action::None
                }
            }
            _ => Action::None,
        }
    }

    fn should_fetch_feed(&self) -> bool {
        let Some(service) = &self.feed else {
            return false;
        };
        !self.feed_loading
            && (self.feed_items.is_empty()
                || self.feed_fetched_at.is_none()
                || !service.is_fresh())
    }

    fn adjust_feed_window(&mut self) {
        self.feed_offset = feed::adjust_offset(
            self.feed_cursor,
            self.feed_offset,
            self.feed_items.len(),
            feed::PAGE_SIZE,
        );
    }

    fn tracking_available(&self) -> bool {
        self.store.is_some() && self.remote_ip.is_some()
    }

    fn set_tracking(&mut self, enabled: bool) {
        let (Some(store), Some(ip)) = (&self.store, &self.remote_ip) else {
            return;
        };
        if enabled == self.tracking_enabled {
            return;
        }
        match store.set_opt_out(ip, !enabled) {
            Ok(count) => {
                self.tracking_enabled = enabled;
                self.visitor_count = count;
            }
            Err(e) => warn!("Failed to update tracking for {}: {}", ip, e),
        }
    }

    fn page_lines(&self) -> Vec<Line<'static>> {
        let label = pages::theme_label(self.theme_index);
        let styles = &self.styles;
        match self.page {
            Page::Splash => splash::render(styles, self.splash_reveal, self.splash_blink),
            Page::Menu => menu::render(
                styles,
                self.menu_cursor,
                self.logo_sweep,
                &label,
                self.visitor_count,
            ),
            Page::About => about::render(styles, self.about_reveal, self.about_scramble, &label),
            Page::Projects => projects::render(styles, self.project_cursor, &label),
            Page::Education => education::render(styles, self.education_cursor, &label),
            Page::Contact => pages::contact::render(styles, &label),
            Page::Feed => feed::render(
                styles,
                &feed::FeedView {
                    items: &self.feed_items,
                    cursor: self.feed_cursor,
                    offset: self.feed_offset,
                    loading: self.feed_loading,
                    error: self.feed_error.as_deref(),
                },
                &label,
            ),
            Page::Privacy => privacy::render(
                styles,
                &privacy::PrivacyView {
                    cursor: self.privacy_cursor,
                    tracking_enabled: self.tracking_enabled,
                    tracking_available: self.tracking_available(),
                    stats: self.privacy_stats.as_ref(),
                },
                &label,
            ),
        }
    }

    /// Draw the current page centered in the frame.
    pub fn render(&self, frame: &mut Frame<'_>) {
        let area = frame.area();
        let box_width = area.width.saturating_sub(4).min(MAX_BOX_WIDTH);
        let lines = wrap_lines(self.page_lines(), usize::from(box_width.saturating_sub(4)));
        let box_height = u16::try_from(lines.len() + 2)
            .unwrap_or(u16::MAX)
            .min(area.height);
        let box_area = Rect {
            x: area.x + (area.width - box_width) / 2,
            y: area.y + (area.height - box_height) / 2,
            width: box_width,
            height: box_height,
        };
        let paragraph = Paragraph::new(lines).block(Block::default().padding(Padding::new(2, 2, 1, 1)));

        if self.page != Page::Splash {
            frame.render_widget(paragraph, box_area);
            return;
        }

        frame.render_widget(
            Rain::new(self.splash_blink, &self.styles).soft_rows(box_area.y..box_area.bottom()),
            area,
        );
        let mut overlay = Buffer::empty(box_area);
        paragraph.render(box_area, &mut overlay);
        overlay_text(&overlay, frame.buffer_mut());
    }
}

/// Copy each row's non-blank span of `overlay` onto `buf`, leaving the rain
/// visible around the text.
fn overlay_text(overlay: &Buffer, buf: &mut Buffer) {
    let area = overlay.area;
    for y in area.top()..area.bottom() {
        let filled: Vec<u16> = (area.left()..area.right())
            .filter(|&x| overlay.cell((x, y)).is_some_and(|c| c.symbol() != " "))
            .collect();
        let (Some(&first), Some(&last)) = (filled.first(), filled.last()) else {
            continue;
        };
        for x in first..=last {
            if let (Some(src), Some(dst)) = (overlay.cell((x, y)), buf.cell_mut((x, y))) {
                *dst = src.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app() -> App {
        App::new(SessionInfo::default())
    }

    fn tracked_app(store: &Arc<VisitorStore>) -> App {
        let ip = "203.0.113.5";
        let count = store.record_visit(ip).unwrap();
        App::new(SessionInfo {
            visitor_count: count,
            remote_ip: Some(ip.to_string()),
            tracking_enabled: true,
            store: Some(Arc::clone(store)),
            ..SessionInfo::default()
        })
    }

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        let buf = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf.cell((x, y)).map_or(" ", |c| c.symbol()))
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn snapshot(n: usize) -> FeedSnapshot {
        FeedSnapshot {
            items: (0..n)
                .map(|i| FeedItem {
                    title: format!("Post {i}"),
                    link: String::new(),
                    date: String::new(),
                })
                .collect(),
            fetched_at: Instant::now(),
        }
    }

    fn open_menu_entry(app: &mut App, index: usize) -> Action {
        app.on_key(Key::Enter);
        for _ in 0..index {
            app.on_key(Key::Down);
        }
        app.on_key(Key::Enter)
    }

    #[test]
    fn test_starts_on_splash() {
        let app = app();
        assert_eq!(app.page(), Page::Splash);
        assert_eq!(app.init(), Action::Tick(SPLASH_TICK));
    }

    #[test]
    fn test_splash_tick_reveals_and_reschedules() {
        let mut app = app();
        for _ in 0..3 {
            assert_eq!(app.on_tick(), Action::Tick(SPLASH_TICK));
        }
        assert_eq!(app.splash_reveal, 3);
        assert_eq!(app.splash_blink, 3);

        for _ in 0..500 {
            app.on_tick();
        }
        assert_eq!(app.splash_reveal, splash::intro_rune_count());
    }

    #[test]
    fn test_splash_blink_wraps() {
        let mut app = app();
        app.splash_blink = BLINK_WRAP - 1;
        app.on_tick();
        assert_eq!(app.splash_blink, 0);
    }

    #[test]
    fn test_quit_and_back_keys() {
        let mut app = app();
        assert_eq!(app.on_key(Key::Esc), Action::None);
        assert_eq!(app.page(), Page::Splash);
        assert_eq!(app.on_key(Key::Char('q')), Action::Quit);

        app.on_key(Key::Enter);
        assert_eq!(app.page(), Page::Menu);
        assert_eq!(app.on_key(Key::CtrlC), Action::Quit);

        app.on_key(Key::Down);
        app.on_key(Key::Enter);
        assert_eq!(app.page(), Page::Projects);
        assert_eq!(app.on_key(Key::Char('q')), Action::Tick(MENU_TICK));
        assert_eq!(app.page(), Page::Menu);

        app.on_key(Key::Enter);
        assert_eq!(app.on_key(Key::Backspace), Action::Tick(MENU_TICK));
        assert_eq!(app.page(), Page::Menu);
    }

    #[test]
    fn test_splash_enter_resets_sweep() {
        let mut app = app();
        app.logo_sweep = 9;
        assert_eq!(app.on_key(Key::Space), Action::Tick(MENU_TICK));
        assert_eq!(app.logo_sweep, 0);
        assert_eq!(app.on_tick(), Action::Tick(MENU_TICK));
        assert_eq!(app.logo_sweep, 1);
    }

    #[test]
    fn test_menu_cursor_clamps() {
        let mut app = app();
        app.on_key(Key::Enter);
        app.on_key(Key::Up);
        assert_eq!(app.menu_cursor, 0);
        for _ in 0..20 {
            app.on_key(Key::Char('j'));
        }
        assert_eq!(app.menu_cursor, menu::item_count() - 1);
        app.on_key(Key::Char('k'));
        assert_eq!(app.menu_cursor, menu::item_count() - 2);
    }

    #[test]
    fn test_menu_opens_each_page() {
        let expected = [
            Page::About,
            Page::Projects,
            Page::Education,
            Page::Contact,
            Page::Feed,
            Page::Privacy,
        ];
        for (i, page) in expected.into_iter().enumerate() {
            let mut app = app();
            open_menu_entry(&mut app, i);
            assert_eq!(app.page(), page);
        }
    }

    #[test]
    fn test_about_animation_runs_to_completion() {
        let mut app = app();
        assert_eq!(open_menu_entry(&mut app, 0), Action::Tick(TYPEWRITER_TICK));

        let mut ticks = 0;
        while app.on_tick() != Action::None {
            ticks += 1;
            assert!(ticks < 10_000, "animation never stopped");
        }

        let total = about::rune_count();
        assert_eq!(ticks, total + about::settle_ticks());
        assert_eq!(app.about_reveal, total);
        assert!(about::is_settled(app.about_reveal, app.about_scramble));
    }

    #[test]
    fn test_reopening_about_restarts_animation() {
        let mut app = app();
        open_menu_entry(&mut app, 0);
        app.on_tick();
        app.on_tick();
        app.on_key(Key::Esc);
        app.on_key(Key::Enter);
        assert_eq!(app.about_reveal, 0);
        assert_eq!(app.about_scramble, 0);
    }

    #[test]
    fn test_other_pages_stop_ticking() {
        let mut app = app();
        open_menu_entry(&mut app, 3);
        assert_eq!(app.on_tick(), Action::None);
    }

    #[test]
    fn test_theme_cycles() {
        let mut app = app();
        for _ in 0..4 {
            app.on_key(Key::Char('t'));
        }
        assert_eq!(app.theme_index, 4);
        app.on_key(Key::Char('T'));
        assert_eq!(app.theme_index, 0);
        assert_eq!(app.styles, ThemeStyles::from(theme_at(0)));
    }

    #[test]
    fn test_feed_without_service_does_not_fetch() {
        let mut app = app();
        assert_eq!(open_menu_entry(&mut app, 4), Action::None);
        assert!(!app.feed_loading);
    }

    #[test]
    fn test_feed_with_stale_service_fetches() {
        let service = FeedService::new(crate::config::FeedConfig::default()).unwrap();
        let mut app = App::new(SessionInfo {
            feed: Some(Arc::new(service)),
            ..SessionInfo::default()
        });

        assert_eq!(open_menu_entry(&mut app, 4), Action::FetchFeed);
        assert!(app.feed_loading);

        // A second request while loading is suppressed.
        app.on_key(Key::Esc);
        app.on_key(Key::Enter);
        assert!(!app.should_fetch_feed());
    }

    #[test]
    fn test_on_feed_windowing() {
        let mut app = app();
        open_menu_entry(&mut app, 4);
        app.on_feed(Ok(snapshot(20)));

        for _ in 0..10 {
            app.on_key(Key::Down);
        }
        assert_eq!(app.feed_cursor, 10);
        assert_eq!(app.feed_offset, 3);
        assert!(app.feed_offset <= app.feed_cursor);
        assert!(app.feed_cursor < app.feed_offset + feed::PAGE_SIZE);

        for _ in 0..4 {
            app.on_key(Key::Up);
        }
        assert_eq!(app.feed_cursor, 6);
        assert_eq!(app.feed_offset, 3);

        // A shorter result resets an out-of-range cursor.
        app.feed_cursor = 15;
        app.on_feed(Ok(snapshot(5)));
        assert_eq!(app.feed_cursor, 0);
        assert_eq!(app.feed_offset, 0);
    }

    #[test]
    fn test_on_feed_error_keeps_items() {
        let mut app = app();
        app.on_feed(Ok(snapshot(3)));
        app.on_feed(Err(Error::FeedStatus {
            status: "503 Service Unavailable".to_string(),
        }));

        assert_eq!(app.feed_items.len(), 3);
        assert_eq!(
            app.feed_error.as_deref(),
            Some("feed request failed: 503 Service Unavailable")
        );
    }

    #[test]
    fn test_privacy_opt_out_and_back_in() {
        let store = Arc::new(VisitorStore::open_in_memory().unwrap());
        let mut app = tracked_app(&store);
        assert_eq!(app.visitor_count(), 1);

        // Cursor 1 = do not track.
        open_menu_entry(&mut app, 5);
        app.on_key(Key::Down);
        assert_eq!(app.on_key(Key::Enter), Action::Tick(MENU_TICK));
        assert_eq!(app.page(), Page::Menu);
        assert!(!app.tracking_enabled());
        assert_eq!(app.visitor_count(), 0);
        assert!(store.is_opted_out("203.0.113.5").unwrap());

        // Cursor resets to 0 = track.
        app.on_key(Key::Enter);
        assert_eq!(app.privacy_cursor, 0);
        app.on_key(Key::Enter);
        assert!(app.tracking_enabled());
        assert_eq!(app.visitor_count(), 1);
    }

    #[test]
    fn test_privacy_same_choice_is_noop() {
        let store = Arc::new(VisitorStore::open_in_memory().unwrap());
        let mut app = tracked_app(&store);
        store.record_visit("198.51.100.1").unwrap();

        open_menu_entry(&mut app, 5);
        app.on_key(Key::Enter);

        // Count is not refreshed because nothing changed.
        assert_eq!(app.visitor_count(), 1);
        assert!(app.tracking_enabled());
    }

    #[test]
    fn test_privacy_without_store() {
        let mut app = App::new(SessionInfo {
            remote_ip: Some("203.0.113.5".to_string()),
            tracking_enabled: true,
            ..SessionInfo::default()
        });
        open_menu_entry(&mut app, 5);
        app.on_key(Key::Down);
        app.on_key(Key::Enter);
        assert!(app.tracking_enabled());
    }

    #[test]
    fn test_privacy_stats_error_is_shown() {
        let store = Arc::new(VisitorStore::open_in_memory().unwrap());
        let mut app = App::new(SessionInfo {
            store: Some(store),
            geolite_path: Some(PathBuf::from("/nonexistent/GeoLite2-Country.mmdb")),
            ..SessionInfo::default()
        });
        assert_eq!(open_menu_entry(&mut app, 5), Action::LoadStats);
        assert_eq!(app.privacy_stats, None);

        let (store, path) = app.stats_request().unwrap();
        app.on_stats(store.country_stats(&path));
        assert_eq!(
            app.privacy_stats,
            Some(Err("geolite db not found".to_string()))
        );
        assert!(screen(&app, 100, 40).contains("Unavailable: geolite db not found"));
    }

    #[test]
    fn test_render_splash_over_rain() {
        let mut app = app();
        for _ in 0..200 {
            app.on_tick();
        }
        let text = screen(&app, 100, 30);
        assert!(text.contains(&splash::intro_text()));
        assert!(text.contains("enter: continue"));
    }

    #[test]
    fn test_render_menu() {
        let mut app = App::new(SessionInfo {
            visitor_count: 12,
            ..SessionInfo::default()
        });
        app.on_key(Key::Enter);
        let text = screen(&app, 100, 40);

        assert!(text.contains("→ About"));
        assert!(text.contains("Visits: 12"));
        assert!(text.contains(menu::HELP));
        assert!(text.contains("t: theme (Tokyo Night)"));
    }

    #[test]
    fn test_render_about_wraps_in_narrow_terminal() {
        let mut app = app();
        open_menu_entry(&mut app, 0);
        while app.on_tick() != Action::None {}

        let text = screen(&app, 50, 40);
        assert!(text.contains("About Me"));
        assert!(text.contains("Hey there,"));
        for line in text.lines() {
            assert!(line.chars().count() <= 50);
        }
    }

    #[test]
    fn test_render_tiny_terminal_does_not_panic() {
        let mut app = app();
        screen(&app, 3, 2);
        app.on_key(Key::Enter);
        screen(&app, 1, 1);
        open_menu_entry(&mut app, 1);
        screen(&app, 10, 3);
    }

    #[test]
    fn test_resize() {
        let mut app = app();
        app.on_resize(120, 50);
        assert_eq!(app.size(), (120, 50));
    }
}
