use std::{
    cell::RefCell,
    io,
    rc::Rc,
    thread::sleep,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Flex, Layout, Margin},
    style::{Color, Style, Stylize},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    DefaultTerminal, Frame,
};
use tui_big_text::{BigText, PixelSize};

use super::{
    canvas::render_scene,
    input::HeldKeys,
    layout::{centered_rect, centered_rect_with_percentage, framed_field},
    theme::GameTheme,
};
use crate::{
    audio::AudioSink,
    config::Config,
    game_loop::{MatchController, Phase},
    network::Network,
    policy::{HeuristicPolicy, KeyboardPolicy, NetworkPolicy, Policy},
    render::{Overlay, Scene},
    sim::{Match, Side},
};

const MIN_WIDTH: u16 = 64;
const MIN_HEIGHT: u16 = 24;
const WIN_OPTIONS: [&str; 2] = ["Restart", "Main Menu"];

/// Who holds the right paddle. The left paddle is always a human on W/S.
#[derive(Debug, Clone)]
pub enum Opponent {
    /// Second human on the arrow keys
    Human,
    Computer,
    Network(Network),
}

impl Opponent {
    fn name(&self) -> &'static str {
        match self {
            Opponent::Human => "Player 2",
            Opponent::Computer => "Computer",
            Opponent::Network(_) => "Trained AI",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuEntry {
    pub label: &'static str,
    pub opponent: Opponent,
}

#[derive(Debug)]
struct MainMenu {
    entries: Vec<MenuEntry>,
    selected: usize,
}

impl MainMenu {
    /// Entries plus the trailing "Exit".
    fn len(&self) -> usize {
        self.entries.len() + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppScreen {
    MainMenu,
    Game,
    WinScreen { selected: usize },
}

/// Outcome of the last finished round, for the goodbye message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    pub winner: Option<Side>,
    pub scores: [u32; 2],
}

pub struct App {
    exit: bool,
    config: Config,
    main_menu: MainMenu,
    screen: AppScreen,
    current: Option<(usize, MatchController)>,
    keys: Rc<RefCell<HeldKeys>>,
    audio: Box<dyn AudioSink>,
    theme: GameTheme,
    overlay: Overlay,
    paused: bool,
    tick: Duration,
    last_update: Instant,
    scene: Scene,
    matches: u64,
    last_result: Option<RoundResult>,
}

impl App {
    pub fn new(
        config: Config,
        entries: Vec<MenuEntry>,
        audio: Box<dyn AudioSink>,
        key_releases: bool,
    ) -> Self {
        let tick = config
            .tick_duration()
            .unwrap_or(Duration::from_secs_f64(1.0 / 60.0));
        Self {
            exit: false,
            config,
            main_menu: MainMenu {
                entries,
                selected: 0,
            },
            screen: AppScreen::MainMenu,
            current: None,
            keys: Rc::new(RefCell::new(HeldKeys::new(key_releases))),
            audio,
            theme: GameTheme::default(),
            overlay: Overlay::default(),
            paused: false,
            tick,
            last_update: Instant::now(),
            scene: Scene::new(),
            matches: 0,
            last_result: None,
        }
    }

    pub fn with_trajectory(mut self, on: bool) -> Self {
        self.overlay.trajectory = on;
        self
    }

    pub fn last_result(&self) -> Option<RoundResult> {
        self.last_result
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        self.audio.start_music();
        let mut too_small = false;

        while !self.exit {
            let size = terminal.size()?;
            if size.width < MIN_WIDTH || size.height < MIN_HEIGHT {
                too_small = true;
                self.handle_menu_events()?;
                terminal.draw(|frame| self.show_terminal_resize_warning(frame))?;
                continue;
            }
            if too_small {
                sleep(Duration::from_millis(100));
                too_small = false;
            }

            match self.screen {
                AppScreen::MainMenu => {
                    self.handle_menu_events()?;
                    terminal.draw(|frame| self.draw_menu(frame))?;
                }
                AppScreen::Game => {
                    self.game_loop()?;
                    terminal.draw(|frame| self.draw_game(frame))?;
                }
                AppScreen::WinScreen { selected } => {
                    self.handle_win_events(selected)?;
                    terminal.draw(|frame| {
                        self.draw_game(frame);
                        self.draw_win_popup(frame);
                    })?;
                }
            }
        }

        self.audio.stop_music();
        Ok(())
    }

    /// Starts the round for menu entry `index`, reusing the last match when
    /// the same entry is picked again.
    fn play(&mut self, index: usize) {
        let reuse = matches!(&self.current, Some((current, _)) if *current == index);
        if reuse {
            if let Some((_, controller)) = self.current.as_mut() {
                controller.start();
            }
        } else {
            let mut controller = self.build_match(index);
            controller.start();
            self.current = Some((index, controller));
        }
        self.keys.borrow_mut().clear();
        self.paused = false;
        self.last_update = Instant::now();
        self.screen = AppScreen::Game;
    }

    fn build_match(&mut self, index: usize) -> MatchController {
        let seed = self
            .config
            .seed
            .unwrap_or_else(rand::random)
            .wrapping_add(self.matches);
        self.matches += 1;
        let mut game = Match::new(&self.config, seed);

        let left = Box::new(KeyboardPolicy::left(Rc::clone(&self.keys)));
        let right: Box<dyn Policy> = match &self.main_menu.entries[index].opponent {
            Opponent::Human => Box::new(KeyboardPolicy::right(Rc::clone(&self.keys))),
            Opponent::Computer => {
                game.paddle_mut(Side::Right).speed = self.config.ai.level;
                Box::new(HeuristicPolicy::from_config(&self.config))
            }
            Opponent::Network(network) => Box::new(NetworkPolicy::new(network.clone())),
        };
        log::info!(
            "new match: {} (seed {seed})",
            self.main_menu.entries[index].label
        );
        MatchController::new(game, self.config.rules, left, right)
    }

    fn game_loop(&mut self) -> io::Result<()> {
        let wait = if self.paused {
            Duration::from_millis(50)
        } else {
            self.tick.saturating_sub(self.last_update.elapsed())
        };
        self.handle_game_events(wait)?;
        if self.screen != AppScreen::Game || self.paused {
            return Ok(());
        }
        if self.last_update.elapsed() >= self.tick {
            self.last_update = Instant::now();
            self.advance();
        }
        Ok(())
    }

    /// One tick of the current match; moves to the win screen when the round ends.
    fn advance(&mut self) {
        let Some((_, controller)) = self.current.as_mut() else {
            self.screen = AppScreen::MainMenu;
            return;
        };
        self.keys.borrow_mut().advance(Instant::now());
        controller.tick(self.audio.as_mut());

        if let Phase::RoundOver { winner } = controller.phase() {
            let scores = controller.game().scores;
            log::info!("round over: winner {:?}, score {}-{}", winner, scores[0], scores[1]);
            self.last_result = Some(RoundResult { winner, scores });
            self.screen = AppScreen::WinScreen { selected: 0 };
        }
    }

    fn leave_to_menu(&mut self) {
        if let Some((_, controller)) = self.current.as_mut() {
            controller.exit_to_menu();
        }
        self.screen = AppScreen::MainMenu;
    }

    fn handle_game_events(&mut self, wait: Duration) -> io::Result<()> {
        // Drain everything pending so held keys stay current
        let mut timeout = wait;
        while event::poll(timeout)? {
            if let Event::Key(key_event) = event::read()? {
                self.handle_game_key(key_event);
            }
            timeout = Duration::ZERO;
        }
        Ok(())
    }

    fn handle_game_key(&mut self, key_event: KeyEvent) {
        if self.keys.borrow_mut().handle(key_event) || key_event.kind != KeyEventKind::Press {
            return;
        }
        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') => self.leave_to_menu(),
            KeyCode::Char('p') => self.paused = !self.paused,
            KeyCode::Char('t') => self.overlay.trajectory = !self.overlay.trajectory,
            KeyCode::Char('d') => self.theme = self.theme.next(),
            _ => {}
        }
    }

    fn handle_menu_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key_event) = event::read()? {
                self.on_menu_key(key_event);
            }
        }
        Ok(())
    }

    fn on_menu_key(&mut self, key_event: KeyEvent) {
        if key_event.kind != KeyEventKind::Press {
            return;
        }
        let last = self.main_menu.len() - 1;
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => self.exit(),
            KeyCode::Up => {
                self.main_menu.selected = if self.main_menu.selected > 0 {
                    self.main_menu.selected - 1
                } else {
                    last
                };
            }
            KeyCode::Down => {
                self.main_menu.selected = if self.main_menu.selected < last {
                    self.main_menu.selected + 1
                } else {
                    0
                };
            }
            KeyCode::Enter if self.main_menu.selected == last => self.exit(),
            KeyCode::Enter => self.play(self.main_menu.selected),
            _ => {}
        }
    }

    fn handle_win_events(&mut self, selected: usize) -> io::Result<()> {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key_event) = event::read()? {
                self.on_win_key(selected, key_event);
            }
        }
        Ok(())
    }

    fn on_win_key(&mut self, selected: usize, key_event: KeyEvent) {
        if key_event.kind != KeyEventKind::Press {
            return;
        }
        match key_event.code {
            KeyCode::Up | KeyCode::Down | KeyCode::Tab => {
                self.screen = AppScreen::WinScreen {
                    selected: (selected + 1) % WIN_OPTIONS.len(),
                };
            }
            KeyCode::Enter if selected == 0 => {
                if let Some((_, controller)) = self.current.as_mut() {
                    controller.restart();
                }
                self.keys.borrow_mut().clear();
                self.last_update = Instant::now();
                self.screen = AppScreen::Game;
            }
            KeyCode::Enter | KeyCode::Esc => self.leave_to_menu(),
            KeyCode::Char('q') => self.exit(),
            _ => {}
        }
    }

    fn exit(&mut self) {
        self.exit = true;
    }

    fn show_terminal_resize_warning(&mut self, frame: &mut Frame) {
        let colors = self.theme.colors();
        let area = frame.area();
        let popup_area = centered_rect_with_percentage(60, 20, area.width, area.height);
        let popup = Paragraph::new("Terminal too small!\nPlease resize.")
            .block(
                Block::default()
                    .title("Warning")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Thick),
            )
            .style(Style::default().fg(colors.ball))
            .alignment(Alignment::Center);
        frame.render_widget(popup, popup_area);
    }

    fn draw_menu(&mut self, frame: &mut Frame) {
        let vertical_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(12), Constraint::Length(9)])
            .flex(Flex::Center)
            .split(frame.area());

        let big_text = BigText::builder()
            .pixel_size(PixelSize::Sextant)
            .style(Style::new().blue())
            .lines(vec![
                "".into(),
                "terminal".cyan().into(),
                "PONG".white().into(),
                "~~~~~".light_green().into(),
            ])
            .alignment(Alignment::Center)
            .build();
        frame.render_widget(big_text, vertical_layout[0]);

        let [options_area] = Layout::horizontal([Constraint::Percentage(30)])
            .flex(Flex::Center)
            .areas(vertical_layout[1]);
        frame.render_widget(
            Block::default()
                .style(Style::default().fg(Color::Cyan))
                .borders(Borders::ALL)
                .border_type(BorderType::Double),
            options_area,
        );

        let labels = self
            .main_menu
            .entries
            .iter()
            .map(|entry| entry.label)
            .chain(std::iter::once("Exit"));
        let rows = Layout::vertical(vec![Constraint::Length(2); self.main_menu.len()])
            .flex(Flex::Center)
            .split(options_area.inner(Margin::new(1, 1)));
        for (i, label) in labels.enumerate() {
            let style = if i == self.main_menu.selected {
                Style::default().bg(Color::Reset).fg(Color::White).bold().italic()
            } else {
                Style::default().fg(Color::Green).bold()
            };
            frame.render_widget(
                Paragraph::new(label).style(style).alignment(Alignment::Center),
                rows[i],
            );
        }
    }

    fn get_block_title(&self, app_name: &'static str, width: u16) -> String {
        let Some((index, controller)) = &self.current else {
            return format!(" {app_name} ");
        };
        let scores = controller.game().scores;
        let p1_text = format!("Player 1 ({})", scores[0]);
        let p2_text = format!(
            "({}) {}",
            scores[1],
            self.main_menu.entries[*index].opponent.name()
        );

        let used = p1_text.len() + app_name.len() + p2_text.len() + 6;
        let dashes = (width as usize).saturating_sub(used) / 2;
        format!(
            " {} {} {} {} {} ",
            p1_text,
            "─".repeat(dashes),
            app_name,
            "─".repeat(dashes),
            p2_text,
        )
    }

    fn draw_game(&mut self, frame: &mut Frame) {
        let colors = self.theme.colors();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Fill(1), Constraint::Length(3)])
            .split(frame.area());

        let field = self.config.field;
        let game_area = framed_field(layout[0], &field);

        let block = Block::default()
            .title(self.get_block_title("terminal.pong", game_area.width))
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .style(Style::default().fg(colors.border).bg(colors.background))
            .title_alignment(Alignment::Center);

        if let Some((_, controller)) = &self.current {
            self.scene.clear();
            controller.render(&mut self.scene, &self.overlay);
        }
        frame.render_widget(Clear, game_area);
        render_scene(frame, game_area, block, &self.scene, &field, &colors);

        let versus_human = matches!(
            self.current
                .as_ref()
                .map(|(index, _)| &self.main_menu.entries[*index].opponent),
            Some(Opponent::Human)
        );
        let controls_text = if versus_human {
            " Player 1: W/S  |  Player 2: ↑/↓  |  P=Pause  T=Trajectory  D=Theme  |  Esc=Menu "
        } else {
            " Player 1: W/S  |  P=Pause  T=Trajectory  D=Theme  |  Esc=Menu "
        };
        let controls = Paragraph::new(controls_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .style(Style::default().fg(colors.border)),
            )
            .style(Style::default().fg(colors.text))
            .alignment(Alignment::Center);
        frame.render_widget(controls, layout[1]);

        if self.paused {
            let popup_area = centered_rect(40, 7, frame.area());
            let popup = Paragraph::new(format!(
                "\nTheme: {}\n[P] Resume  [D] Theme  [Esc] Menu",
                self.theme.name()
            ))
            .block(
                Block::default()
                    .title("Paused")
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .title_alignment(Alignment::Center),
            )
            .style(Style::default().fg(colors.accent))
            .alignment(Alignment::Center);
            frame.render_widget(Clear, popup_area);
            frame.render_widget(popup, popup_area);
        }
    }

    fn draw_win_popup(&self, frame: &mut Frame) {
        let AppScreen::WinScreen { selected } = self.screen else {
            return;
        };
        let colors = self.theme.colors();
        let headline = match self.last_result.and_then(|result| result.winner) {
            Some(side) => format!("Player {} Wins!", side.player()),
            None => "Round over".to_string(),
        };

        let popup_area = centered_rect(32, 9, frame.area());
        frame.render_widget(Clear, popup_area);
        frame.render_widget(
            Block::default()
                .title(headline)
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(colors.accent)),
            popup_area,
        );

        let rows = Layout::vertical(vec![Constraint::Length(2); WIN_OPTIONS.len()])
            .flex(Flex::Center)
            .split(popup_area.inner(Margin::new(1, 1)));
        for (i, option) in WIN_OPTIONS.iter().enumerate() {
            let (text, style) = if i == selected {
                (format!("> {} <", option), Style::default().fg(Color::White).bold())
            } else {
                (format!("  {}  ", option), Style::default().fg(colors.text))
            };
            frame.render_widget(
                Paragraph::new(text).style(style).alignment(Alignment::Center),
                rows[i],
            );
        }
    }
}
