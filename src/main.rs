use arboard::Clipboard;
use macroquad::prelude::*;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use warehouse_sim::{
    Cell, Config, InteractionMode, LocalBackend, ObstacleKind, Simulation, StatusKind,
};

const CONFIG_PATH: &str = "config.toml";
const GRID_X: f32 = 20.0;
const GRID_Y: f32 = 70.0;
const PANEL_WIDTH: f32 = 380.0;

fn window_conf() -> Conf {
    let config = Config::load(CONFIG_PATH);
    Conf {
        window_title: config.visual.window_title,
        window_width: 1280,
        window_height: 820,
        ..Default::default()
    }
}

fn obstacle_color(kind: ObstacleKind) -> Color {
    match kind {
        ObstacleKind::Crate => Color::from_rgba(160, 110, 60, 255),
        ObstacleKind::Shelf => Color::from_rgba(90, 90, 110, 255),
        ObstacleKind::Restricted => Color::from_rgba(200, 60, 60, 255),
        ObstacleKind::Wall => Color::from_rgba(50, 50, 50, 255),
        ObstacleKind::Human => Color::from_rgba(230, 180, 40, 255),
        ObstacleKind::Box => Color::from_rgba(190, 140, 90, 255),
    }
}

fn status_color(kind: StatusKind) -> Color {
    match kind {
        StatusKind::Info => DARKGRAY,
        StatusKind::Success => DARKGREEN,
        StatusKind::Error => RED,
    }
}

fn copy_to_clipboard(text: &str, what: &str) {
    match Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(text) {
                warn!("Failed to copy to clipboard: {}", e);
            } else {
                info!("{} copied to clipboard", what);
                // Clipboard managers need the owner alive briefly
                std::thread::sleep(Duration::from_millis(100));
            }
        }
        Err(e) => warn!("Failed to access clipboard: {}", e),
    }
}

struct View {
    sim: Simulation<LocalBackend>,
    max_cell_size: f32,
    init_width: i32,
    init_height: i32,
    background: Color,
}

impl View {
    fn new(config: &Config) -> Self {
        View {
            sim: Simulation::new(config, LocalBackend::new()),
            max_cell_size: config.grid.cell_size,
            init_width: config.grid.width,
            init_height: config.grid.height,
            background: Color::from_rgba(
                config.visual.background_r,
                config.visual.background_g,
                config.visual.background_b,
                255,
            ),
        }
    }

    /// Largest cell size that keeps the grid inside the window
    fn cell_size(&self) -> f32 {
        let model = self.sim.model();
        if !model.is_initialized() {
            return self.max_cell_size;
        }
        let avail_w = screen_width() - PANEL_WIDTH - GRID_X * 2.0;
        let avail_h = screen_height() - GRID_Y - 20.0;
        let fit = (avail_w / model.width() as f32).min(avail_h / model.height() as f32);
        fit.min(self.max_cell_size).max(4.0)
    }

    fn handle_click(&mut self, mouse_x: f32, mouse_y: f32) {
        if mouse_x < GRID_X || mouse_y < GRID_Y || mouse_x > screen_width() - PANEL_WIDTH {
            return;
        }
        let size = self.cell_size();
        let x = ((mouse_x - GRID_X) / size).floor() as i32;
        let y = ((mouse_y - GRID_Y) / size).floor() as i32;
        // Status log already carries the reason
        let _ = self.sim.click(x, y);
    }

    fn handle_keys(&mut self) {
        let modes = [
            (KeyCode::S, InteractionMode::SetStart),
            (KeyCode::E, InteractionMode::SetEnd),
            (KeyCode::O, InteractionMode::ToggleObstacle),
            (KeyCode::M, InteractionMode::PlaceMultiCell),
        ];
        for (key, mode) in modes {
            if is_key_pressed(key) {
                let _ = self.sim.enter_mode(mode);
            }
        }

        let kinds = [
            (KeyCode::Key1, ObstacleKind::Crate),
            (KeyCode::Key2, ObstacleKind::Shelf),
            (KeyCode::Key3, ObstacleKind::Restricted),
        ];
        for (key, kind) in kinds {
            if is_key_pressed(key) {
                self.sim.select_obstacle_kind(kind);
            }
        }

        if is_key_pressed(KeyCode::I) {
            let _ = self.sim.initialize(self.init_width, self.init_height);
        }
        if is_key_pressed(KeyCode::P) {
            let _ = self.sim.request_route();
        }
        if is_key_pressed(KeyCode::X) {
            self.sim.cancel_animation();
        }
        if is_key_pressed(KeyCode::R) {
            self.sim.reset();
        }

        let preset_keys = [KeyCode::F1, KeyCode::F2, KeyCode::F3];
        for (key, index) in preset_keys.into_iter().zip(0..) {
            if is_key_pressed(key) {
                if let Some(name) = self.sim.presets().get(index).map(|p| p.name.clone()) {
                    let _ = self.sim.load_preset(&name);
                }
            }
        }

        if is_key_pressed(KeyCode::C) {
            copy_to_clipboard(&self.sim.model().to_text(), "Warehouse layout");
        }
        if is_key_pressed(KeyCode::L) {
            match self.sim.status().to_json() {
                Ok(json) => copy_to_clipboard(&json, "Status log"),
                Err(e) => warn!("Failed to export status log: {}", e),
            }
        }
    }

    fn draw_cell(&self, cell: Cell, color: Color, inset: f32) {
        let size = self.cell_size();
        draw_rectangle(
            GRID_X + cell.x as f32 * size + inset,
            GRID_Y + cell.y as f32 * size + inset,
            size - 1.0 - inset * 2.0,
            size - 1.0 - inset * 2.0,
            color,
        );
    }

    fn draw_grid(&self) {
        let model = self.sim.model();
        if !model.is_initialized() {
            draw_text("Press I to initialize or F1-F3 to load a preset", GRID_X, GRID_Y + 30.0, 24.0, DARKGRAY);
            return;
        }

        for y in 0..model.height() {
            for x in 0..model.width() {
                self.draw_cell(Cell::new(x, y), WHITE, 0.0);
            }
        }

        for &cell in model.obstacles() {
            if model.multi_cell_at(cell).is_none() {
                self.draw_cell(cell, GRAY, 0.0);
            }
        }
        for obstacle in model.multi_cell_obstacles() {
            for cell in obstacle.cells() {
                self.draw_cell(cell, obstacle_color(obstacle.kind), 0.0);
            }
        }

        let size = self.cell_size();
        let center = |c: Cell| {
            vec2(
                GRID_X + c.x as f32 * size + size / 2.0,
                GRID_Y + c.y as f32 * size + size / 2.0,
            )
        };
        for pair in model.route().windows(2) {
            let (a, b) = (center(pair[0]), center(pair[1]));
            draw_line(a.x, a.y, b.x, b.y, (size / 6.0).max(2.0), SKYBLUE);
        }

        if let Some(start) = model.start() {
            self.draw_cell(start, GREEN, 0.0);
        }
        if let Some(end) = model.end() {
            self.draw_cell(end, ORANGE, 0.0);
        }
        if let Some(robot) = model.robot_position() {
            let c = center(robot);
            draw_circle(c.x, c.y, size * 0.35, BLUE);
        }
    }

    fn draw_panel(&self) {
        let x = screen_width() - PANEL_WIDTH;
        let mut y = 30.0;
        let model = self.sim.model();

        let header = match self.sim.loaded_preset() {
            Some(name) => format!("Preset: {}", name),
            None if model.is_initialized() => format!("Grid {}x{}", model.width(), model.height()),
            None => "No warehouse".to_string(),
        };
        draw_text(&header, x, y, 22.0, BLACK);
        y += 24.0;
        draw_text(&format!("Mode: {}", self.sim.mode_description()), x, y, 18.0, BLACK);
        y += 20.0;
        draw_text(&format!("Obstacle type: {}", self.sim.obstacle_kind()), x, y, 18.0, BLACK);
        y += 20.0;
        draw_text(&format!("Robot: {:?}", self.sim.animator_state()), x, y, 18.0, BLACK);
        y += 30.0;

        let help = [
            "S start  E end  O obstacles  M multi-cell",
            "1 crate  2 shelf  3 restricted",
            "I init  P route  X stop  R reset",
            "F1-F3 presets  C copy layout  L copy log",
            "Esc quit",
        ];
        for line in help {
            draw_text(line, x, y, 16.0, DARKGRAY);
            y += 18.0;
        }
        y += 12.0;
        draw_text(&self.sim.status().summary(), x, y, 16.0, BLACK);
        y += 22.0;

        for entry in self.sim.status().entries() {
            if y > screen_height() - 10.0 {
                break;
            }
            draw_text(&entry.to_string(), x, y, 16.0, status_color(entry.kind));
            y += 18.0;
        }
    }

    fn draw(&self) {
        clear_background(self.background);
        if let Some(current) = self.sim.status().current() {
            draw_text(&current.message, GRID_X, 35.0, 22.0, status_color(current.kind));
        }
        self.draw_grid();
        self.draw_panel();
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = Config::load(CONFIG_PATH);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    info!("Starting {}", config.visual.window_title);

    let mut view = View::new(&config);

    loop {
        if is_mouse_button_pressed(MouseButton::Left) {
            let (mouse_x, mouse_y) = mouse_position();
            view.handle_click(mouse_x, mouse_y);
        }

        view.handle_keys();

        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        view.sim.advance(Duration::from_secs_f32(get_frame_time()));
        view.draw();

        next_frame().await
    }
}
