use arboard::Clipboard;
use macroquad::prelude::*;
use mazechase::config::init_tracing;
use mazechase::session::{SessionEvent, SessionStatus};
use mazechase::{Behavior, Config, Direction, Grid, LevelError, SessionState};
use ::rand::rngs::StdRng;
use ::rand::SeedableRng;
use tracing::{error, info, warn};

/// Level used when the configured level file cannot be read
const BUILTIN_LEVEL: &str = "\
#####################
#.........#.........#
#.###.###.#.###.###.#
#.#W.............W#.#
#.#.##.#######.##.#.#
#.....#...W...#.....#
###.#.#.#####.#.#.###
#...#...........#...#
#.#####.##.##.#####.#
#.........W.........#
#.###.#.#####.#.###.#
#...#.#...#...#.#...#
###.#.###.#.###.#.###
#W.........W.......W#
#####################
";

/// Cap on catch-up ticks per frame after a stall
const MAX_TICKS_PER_FRAME: u32 = 10;

fn load_level(config: &Config) -> Result<Grid, LevelError> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.grid.level_file.clone());

    match Grid::from_file(&path, config.grid.cell_size) {
        Ok(grid) => {
            info!(%path, rows = grid.rows, cols = grid.cols, "level loaded");
            Ok(grid)
        }
        Err(e) => {
            warn!(%path, "{e}; using built-in level");
            Grid::parse(BUILTIN_LEVEL, config.grid.cell_size)
        }
    }
}

fn new_session(grid: Grid, config: &Config) -> Result<SessionState, LevelError> {
    SessionState::new(grid, config, StdRng::from_entropy())
}

/// Viewer state wrapped around the simulation
struct Viewer {
    config: Config,
    session: SessionState,
    accumulator: f64,
    message: String,
}

impl Viewer {
    fn new(config: Config, session: SessionState) -> Self {
        Viewer {
            config,
            session,
            accumulator: 0.0,
            message: "Arrows steer, click a pickup to walk there".to_string(),
        }
    }

    fn handle_input(&mut self) {
        let keys = [
            (KeyCode::Up, Direction::Up),
            (KeyCode::Down, Direction::Down),
            (KeyCode::Left, Direction::Left),
            (KeyCode::Right, Direction::Right),
        ];
        for (key, dir) in keys {
            if is_key_pressed(key) {
                self.session.request_direction(dir);
            }
        }

        if is_mouse_button_pressed(MouseButton::Left) {
            let (mx, my) = mouse_position();
            let (ox, oy) = self.origin();
            // Clicks on bare floor are ignored
            if let Some(cell) = self.session.collectible_at(mx - ox, my - oy) {
                let accepting = self.session.is_running() && !self.session.is_teleporting();
                if accepting && !self.session.request_target(cell) {
                    self.message = "No route there".to_string();
                }
            }
        }

        if is_key_pressed(KeyCode::R) {
            self.session.restart();
            self.message = "Restarted".to_string();
        }
        if is_key_pressed(KeyCode::C) {
            self.copy_layout();
        }
        if is_key_pressed(KeyCode::V) {
            self.paste_layout();
        }
        if is_key_pressed(KeyCode::S) {
            self.save_snapshot();
        }
    }

    fn run_ticks(&mut self, frame_time: f64) {
        let dt = self.config.tick_secs();
        self.accumulator += frame_time;

        let mut ticks = 0;
        while self.accumulator >= dt && ticks < MAX_TICKS_PER_FRAME {
            self.accumulator -= dt;
            ticks += 1;
            for event in self.session.tick(dt) {
                self.on_event(event);
            }
        }
        if ticks == MAX_TICKS_PER_FRAME {
            self.accumulator = 0.0;
        }
    }

    fn on_event(&mut self, event: SessionEvent) {
        self.message = match event {
            SessionEvent::TargetCollected { score, .. } => format!("Correct! Score {score}"),
            SessionEvent::DecoyCollected { .. } => "Wrong pickup".to_string(),
            SessionEvent::CaughtByGhost { behavior } => format!("Caught by the {behavior:?}"),
            SessionEvent::GhostsIncreased { count } => format!("Ghosts: {count}"),
            SessionEvent::Teleported => return,
            SessionEvent::RoundStarted => "New round".to_string(),
            SessionEvent::TimeUp => "Time's up".to_string(),
        };
    }

    fn copy_layout(&mut self) {
        let layout = self.session.grid.to_layout_string();
        match Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_text(layout) {
                    error!("failed to copy to clipboard: {e}");
                } else {
                    self.message = "Layout copied to clipboard".to_string();
                    // Clipboard managers read from the owner, which must outlive the write briefly
                    std::thread::sleep(std::time::Duration::from_millis(100));
                }
            }
            Err(e) => error!("failed to access clipboard: {e}"),
        }
    }

    fn paste_layout(&mut self) {
        let text = match Clipboard::new().and_then(|mut c| c.get_text()) {
            Ok(text) => text,
            Err(e) => {
                error!("failed to read clipboard: {e}");
                return;
            }
        };

        let loaded = Grid::parse(&text, self.config.grid.cell_size)
            .and_then(|grid| new_session(grid, &self.config));
        match loaded {
            Ok(session) => {
                info!(rows = session.grid.rows, cols = session.grid.cols, "pasted level");
                self.session = session;
                self.message = "Level pasted".to_string();
            }
            Err(e) => {
                warn!("clipboard does not hold a level: {e}");
                self.message = format!("Paste failed: {e}");
            }
        }
    }

    fn save_snapshot(&mut self) {
        let path = self.config.logging.snapshot_path.clone();
        match self.session.snapshot().save_to_file(&path) {
            Ok(()) => {
                info!(%path, "snapshot written");
                self.message = format!("Snapshot saved to {path}");
            }
            Err(e) => error!("{e}"),
        }
    }

    /// Screen offset that centres the maze
    fn origin(&self) -> (f32, f32) {
        let ox = ((screen_width() - self.session.grid.world_width()) / 2.0).max(0.0);
        let oy = ((screen_height() - self.session.grid.world_height()) / 2.0).max(40.0);
        (ox, oy)
    }

    fn draw(&self) {
        let visual = &self.config.visual;
        clear_background(Color::from_rgba(
            visual.background_r,
            visual.background_g,
            visual.background_b,
            255,
        ));

        let (ox, oy) = self.origin();
        let grid = &self.session.grid;
        let size = grid.cell_size;

        for wall in grid.walls() {
            let px = ox + wall.x as f32 * size;
            let py = oy + wall.y as f32 * size;
            draw_rectangle(px, py, size, size, Color::from_rgba(26, 26, 110, 255));
            draw_rectangle_lines(px, py, size, size, 2.0, Color::from_rgba(51, 51, 255, 255));
        }

        for c in self.session.collectibles.iter().filter(|c| !c.collected) {
            let (cx, cy) = grid.cell_center(c.cell);
            draw_circle(ox + cx, oy + cy, size * 0.35, Color::from_rgba(76, 175, 80, 255));
        }

        if visual.show_path {
            if let Some(path) = &self.session.player.path {
                let mut from = (ox + self.session.player.x, oy + self.session.player.y);
                for &cell in path.remaining() {
                    let (cx, cy) = grid.cell_center(cell);
                    let to = (ox + cx, oy + cy);
                    draw_line(from.0, from.1, to.0, to.1, 2.0, Color::new(1.0, 1.0, 0.0, 0.3));
                    draw_circle(to.0, to.1, 3.0, Color::new(1.0, 1.0, 0.0, 0.7));
                    from = to;
                }
            }
        }

        for g in &self.session.ghosts {
            let color = match g.behavior() {
                Some(Behavior::Chaser) => RED,
                Some(Behavior::Ambusher) => GREEN,
                Some(Behavior::Random) => BLUE,
                Some(Behavior::Patroller) => MAGENTA,
                None => WHITE,
            };
            draw_circle(ox + g.x, oy + g.y, g.radius, color);
        }

        let player = &self.session.player;
        let shrink = match self.session.teleport {
            Some(t) => 1.0 - t.progress(self.session.clock) as f32,
            None => 1.0,
        };
        draw_circle(
            ox + player.x,
            oy + player.y,
            player.radius * shrink,
            Color::from_rgba(255, 204, 0, 255),
        );

        let secs = self.session.time_left.ceil() as u32;
        let status = match self.session.status {
            SessionStatus::Running => String::new(),
            SessionStatus::Over(reason) => format!("  GAME OVER ({reason:?}) - R to restart"),
        };
        let hud = format!(
            "Score {}  Time {}:{:02}  {}{}",
            self.session.score,
            secs / 60,
            secs % 60,
            self.message,
            status
        );
        draw_text(&hud, 10.0, 24.0, 22.0, WHITE);
        draw_text(
            "Arrows: steer  Click: path  R: restart  C/V: copy/paste level  S: snapshot  Esc: quit",
            10.0,
            screen_height() - 10.0,
            18.0,
            GRAY,
        );
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: Config::load().visual.window_title,
        window_width: 900,
        window_height: 700,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = Config::load();
    init_tracing(&config.logging.filter);

    let session = match load_level(&config).and_then(|grid| new_session(grid, &config)) {
        Ok(session) => session,
        Err(e) => {
            error!("cannot start a session: {e}");
            return;
        }
    };

    let mut viewer = Viewer::new(config, session);

    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        viewer.handle_input();
        viewer.run_ticks(f64::from(get_frame_time()));
        viewer.draw();

        next_frame().await
    }
}
