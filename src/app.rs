use egui::{
    emath::Rot2, vec2, Align2, Color32, FontId, Key, Rounding, Sense, Shape, Stroke, Vec2, Widget,
};

use crate::{
    difficulty::Difficulty,
    game::GameState,
    session::{CellView, GameSession},
    stats::StatsStore,
};

const WIN_COLOR: Color32 = Color32::from_rgb(0, 200, 0);
const LOSS_COLOR: Color32 = Color32::from_rgb(220, 0, 0);

/// We derive Deserialize/Serialize so we can persist the chosen difficulty on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Minesweeper {
    #[serde(skip)] // This how you opt-out of serialization of a field
    session: GameSession,
    difficulty: Difficulty,
    #[serde(skip)]
    selected: Option<(usize, usize)>,
}

impl Default for Minesweeper {
    fn default() -> Self {
        let difficulty = Difficulty::default();
        Self {
            session: GameSession::new(difficulty, StatsStore::default())
                .expect("initializing session using fixed presets"),
            difficulty,
            selected: None,
        }
    }
}

impl Minesweeper {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous app state (if any).
        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        if app.session.difficulty() != app.difficulty {
            app.change_difficulty(app.difficulty);
        }
        app
    }

    fn restart(&mut self) {
        if let Err(err) = self.session.new_game() {
            log::error!("could not start a new game: {err}");
        }
        self.clamp_selection();
    }

    fn change_difficulty(&mut self, difficulty: Difficulty) {
        match self.session.set_difficulty(difficulty) {
            Ok(()) => self.difficulty = difficulty,
            Err(err) => log::error!("could not switch to {difficulty}: {err}"),
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let (rows, cols) = self.session.board().size();
        if let Some((row, col)) = self.selected.as_mut() {
            *row = (*row).min(rows - 1);
            *col = (*col).min(cols - 1);
        }
    }
}

impl eframe::App for Minesweeper {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.add_space(16.0);

                egui::widgets::global_dark_light_mode_switch(ui);
            });
        });

        let mut difficulty = self.difficulty;
        let mut restart = false;

        egui::SidePanel::left("left_panel").show(ctx, |ui| {
            let stats = self.session.statistics();
            ui.label(format!("Wins: {}", stats.wins));
            ui.label(format!("Losses: {}", stats.losses));
            ui.separator();

            egui::ComboBox::from_label("Difficulty")
                .selected_text(difficulty.label())
                .show_ui(ui, |ui| {
                    for option in Difficulty::ALL {
                        ui.selectable_value(&mut difficulty, option, option.label());
                    }
                });
            if ui.button("New Game").clicked() {
                restart = true;
            }
            ui.label(format!("Mines: {}", self.session.board().mine_count()));
        });

        if difficulty != self.difficulty {
            self.change_difficulty(difficulty);
        } else if restart {
            self.restart();
        }

        let mut cleared = Vec::new();
        let state = self.session.state();

        {
            let ([up, down, left, right], [space, esc, restart]) = ctx.input(|inp| {
                (
                    [
                        [Key::ArrowUp, Key::W, Key::K],
                        [Key::ArrowDown, Key::S, Key::J],
                        [Key::ArrowLeft, Key::A, Key::H],
                        [Key::ArrowRight, Key::D, Key::L],
                    ]
                    .map(|keys| keys.into_iter().any(|key| inp.key_pressed(key))),
                    [Key::Space, Key::Escape, Key::R].map(|key| inp.key_pressed(key)),
                )
            });

            if restart {
                self.restart();
            } else if let Some((row, col)) = self.selected.as_mut() {
                let (rows, cols) = self.session.board().size();
                if esc {
                    self.selected = None;
                } else if space {
                    cleared.push((*row, *col));
                } else {
                    if up && *row > 0 {
                        *row -= 1;
                    }
                    if down && *row < rows - 1 {
                        *row += 1;
                    }
                    if left && *col > 0 {
                        *col -= 1;
                    }
                    if right && *col < cols - 1 {
                        *col += 1;
                    }
                }
            } else if up || down || left || right || space {
                self.selected = Some((0, 0));
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let grid_size = ui.available_size();
            let (rows, cols) = self.session.board().size();
            let cell_size = f32::min(grid_size.x / cols as f32, grid_size.y / rows as f32);
            let final_grid_size = vec2(cols as f32, rows as f32) * cell_size;

            ui.scope(|ui| {
                ui.spacing_mut().interact_size = Vec2::ZERO;
                let response = egui::Grid::new("field").spacing((0.0, 0.0)).show(ui, |ui| {
                    for row in 0..rows {
                        for col in 0..cols {
                            let Some(view) = self.session.cell_view((row, col)) else {
                                continue;
                            };
                            let response = ui.add(view.show(
                                cell_size,
                                self.selected == Some((row, col)),
                            ));
                            if !state.is_finished() && response.clicked() {
                                cleared.push((row, col));
                            }
                        }
                        ui.end_row();
                    }
                });

                let banner = match state {
                    GameState::InProgress => None,
                    GameState::Won => Some(("YOU\nWIN", WIN_COLOR)),
                    GameState::Lost => Some(("GAME\nOVER", LOSS_COLOR)),
                };
                if let Some((text, color)) = banner {
                    ui.painter().text(
                        response.response.rect.center(),
                        Align2::CENTER_CENTER,
                        text,
                        FontId::proportional(final_grid_size.x.min(final_grid_size.y) / 4.0),
                        color,
                    );
                }
            });
        });

        for pos in cleared {
            if let Some(index) = self.session.board().index_of(pos) {
                self.session.click(index);
            }
        }
    }
}

impl CellView {
    fn show(self, size: f32, selected: bool) -> CellWidget {
        CellWidget {
            view: self,
            size,
            selected,
        }
    }
}

struct CellWidget {
    view: CellView,
    size: f32,
    selected: bool,
}

impl Widget for CellWidget {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(Vec2::splat(self.size), Sense::click());

        let stroke = Stroke::from((rect.width() / 16.0, ui.style().visuals.strong_text_color()));

        let painter = ui.painter();

        let fill = match self.view {
            CellView::Hidden => ui.style().visuals.extreme_bg_color,
            CellView::Mine { won: true } => WIN_COLOR,
            CellView::Mine { won: false } => LOSS_COLOR,
            _ => ui.style().visuals.window_fill(),
        };
        painter.rect(
            rect.shrink(stroke.width / 2.0),
            Rounding::ZERO,
            fill,
            (
                stroke.width,
                if self.selected {
                    Color32::BLUE
                } else {
                    ui.style().visuals.window_stroke().color
                },
            ),
        );

        let draw_text = |text: String| {
            painter.text(
                rect.center() + vec2(0.0, rect.height() / 20.0),
                Align2::CENTER_CENTER,
                text,
                FontId::monospace(rect.height() * 0.8),
                stroke.color,
            );
        };

        match self.view {
            CellView::Hidden => {
                painter.rect_stroke(
                    rect.shrink(stroke.width * 1.5),
                    Rounding::ZERO,
                    (
                        stroke.width,
                        match (self.selected, response.hovered()) {
                            (true, false) => Color32::BLUE,
                            (_, true) => Color32::LIGHT_BLUE,
                            _ => stroke.color,
                        },
                    ),
                );
            }
            CellView::Number(count) => draw_text(count.to_string()),
            CellView::Mine { .. } => draw_text("X".to_owned()),
            CellView::Exploded => {
                let draw_starburst = |radius, color| {
                    let outer_rad = vec2(0.0, radius);
                    let inner_rad = outer_rad * 0.75;

                    let points = (0..=16)
                        .map(|r| {
                            let v = if r % 2 == 0 { inner_rad } else { outer_rad };
                            let rot = Rot2::from_angle(r as f32 / -16.0 * std::f32::consts::TAU);
                            rect.center() + (rot * v)
                        })
                        .collect();
                    painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
                };

                draw_starburst(rect.height() / 2.5, Color32::YELLOW);
                draw_starburst(rect.height() / 4.0, Color32::LIGHT_RED);
            }
            CellView::Empty => {}
        }

        response
    }
}
