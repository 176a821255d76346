//! egui viewer for a single card pile: sliders drive the controls and every
//! card is painted from the transforms the engine pushes to it.

use std::collections::{BTreeMap, VecDeque};

use cardpile_core::{PileEngine, PileSettings, VisualFactory};
use cardpile_platform::{ChannelListener, PileEvent, Result};
use crossbeam_channel::Receiver;
use egui::{Align2, Color32, FontId, Pos2, Sense, Stroke};
use glam::{Affine2, Vec2};
use tracing::{debug, info};

const CARD_SIZE: Vec2 = Vec2::new(70.0, 100.0);
const EVENT_LOG_LEN: usize = 64;
const BASELINE_MARGIN: f32 = 160.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CardId(u64);

#[derive(Debug, Clone, Copy)]
struct CardSprite {
    position: Vec2,
    rotation: f32,
}

/// In-memory visuals: one sprite per live handle, drawn in handle order.
#[derive(Default)]
pub struct CardVisuals {
    next_id: u64,
    sprites: BTreeMap<CardId, CardSprite>,
}

impl CardVisuals {
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl VisualFactory for CardVisuals {
    type Handle = CardId;

    fn create_visual(&mut self) -> CardId {
        let id = CardId(self.next_id);
        self.next_id += 1;
        self.sprites.insert(
            id,
            CardSprite {
                position: Vec2::ZERO,
                rotation: 0.0,
            },
        );
        debug!("viewer: created card {}", id.0);
        id
    }

    fn destroy_visual(&mut self, handle: CardId) {
        self.sprites.remove(&handle);
        debug!("viewer: destroyed card {}", handle.0);
    }

    fn set_local_position(&mut self, handle: &CardId, position: Vec2) {
        if let Some(sprite) = self.sprites.get_mut(handle) {
            sprite.position = position;
        }
    }

    fn set_local_rotation(&mut self, handle: &CardId, degrees: f32) {
        if let Some(sprite) = self.sprites.get_mut(handle) {
            sprite.rotation = degrees;
        }
    }
}

pub fn run_viewer(settings: PileSettings) -> Result<()> {
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Cardpile",
        native_options,
        Box::new(move |_creation_context| Ok(Box::new(CardpileApp::new(settings)))),
    )
    .map_err(|e| e.to_string().into())
}

pub struct CardpileApp {
    engine: PileEngine<CardId>,
    visuals: CardVisuals,
    listener: ChannelListener,
    event_receiver: Receiver<PileEvent>,
    event_log: VecDeque<String>,
    selected: usize,
    lift: f32,
}

impl CardpileApp {
    pub fn new(settings: PileSettings) -> Self {
        let (event_sender, event_receiver) = crossbeam_channel::unbounded::<PileEvent>();
        info!(
            "viewer: starting with up to {} cards",
            settings.pile.max_node_count
        );
        Self {
            engine: PileEngine::with_controls(settings.pile, settings.controls),
            visuals: CardVisuals::default(),
            listener: ChannelListener::new(event_sender),
            event_receiver,
            event_log: VecDeque::with_capacity(EVENT_LOG_LEN),
            selected: 0,
            lift: 0.0,
        }
    }

    fn drain_events(&mut self) {
        for event in self.event_receiver.try_iter() {
            let line = match event {
                PileEvent::Added { index, node } => format!(
                    "+ {index} at ({:.0}, {:.0}) {:.1}°",
                    node.position.x, node.position.y, node.rotation
                ),
                PileEvent::Removing { index, .. } => format!("~ {index}"),
                PileEvent::Removed { index } => format!("- {index}"),
            };
            if self.event_log.len() == EVENT_LOG_LEN {
                self.event_log.pop_front();
            }
            self.event_log.push_back(line);
        }
    }

    /// Keeps the lifted card pointing at a live node after the pile shrinks.
    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.engine.len().saturating_sub(1));
    }

    fn controls_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Pile");

        let mut nodes = self.engine.controls().nodes_amount();
        if ui
            .add(egui::Slider::new(&mut nodes, 0.0..=1.0).text("Nodes"))
            .changed()
        {
            self.engine.controls_mut().set_nodes_amount(nodes);
        }
        let mut spacing = self.engine.controls().node_spacing_amount();
        if ui
            .add(egui::Slider::new(&mut spacing, 0.0..=1.0).text("Spacing"))
            .changed()
        {
            self.engine.controls_mut().set_node_spacing_amount(spacing);
        }
        let mut curvature = self.engine.controls().curvature_amount();
        if ui
            .add(egui::Slider::new(&mut curvature, -1.0..=1.0).text("Curvature"))
            .changed()
        {
            self.engine.controls_mut().set_curvature_amount(curvature);
        }

        ui.horizontal(|ui| {
            if ui.button("Grow").clicked() {
                self.engine.request_grow();
            }
            if ui.button("Shrink").clicked() {
                self.engine.request_shrink();
            }
            if ui.button("Respawn").clicked() {
                self.engine.clear(&mut self.visuals, &mut self.listener);
            }
        });
        ui.label(format!(
            "{} cards (target {}, max {})",
            self.engine.len(),
            self.engine.current_node_count(),
            self.engine.config().max_node_count
        ));

        ui.separator();
        ui.label("Lift card");
        let last = self.engine.len().saturating_sub(1);
        ui.add(egui::DragValue::new(&mut self.selected).range(0..=last));
        if ui
            .add(egui::Slider::new(&mut self.lift, 0.0..=80.0).text("Offset"))
            .changed()
        {
            self.engine
                .set_position_offset(self.selected, Vec2::new(0.0, self.lift));
        }

        ui.separator();
        ui.label("Events");
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &self.event_log {
                    ui.monospace(line);
                }
            });
    }

    fn paint_pile(&self, painter: &egui::Painter, anchor: Pos2) {
        // pile space is y-up, screen space is y-down
        let to_screen = |p: Vec2| Pos2::new(anchor.x + p.x, anchor.y - p.y);
        let half = CARD_SIZE / 2.0;
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ];
        for (slot, (id, sprite)) in self.visuals.sprites.iter().enumerate() {
            let transform =
                Affine2::from_angle_translation(sprite.rotation.to_radians(), sprite.position);
            let points: Vec<Pos2> = corners
                .iter()
                .map(|c| to_screen(transform.transform_point2(*c)))
                .collect();
            let fill = if slot == self.selected {
                Color32::from_rgb(250, 236, 190)
            } else {
                Color32::from_rgb(245, 245, 240)
            };
            painter.add(egui::Shape::convex_polygon(
                points,
                fill,
                Stroke::new(1.5, Color32::from_gray(40)),
            ));
            painter.text(
                to_screen(sprite.position),
                Align2::CENTER_CENTER,
                id.0.to_string(),
                FontId::proportional(16.0),
                Color32::from_gray(60),
            );
        }
    }
}

impl eframe::App for CardpileApp {
    fn update(&mut self, context: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("controls")
            .resizable(false)
            .show(context, |ui| self.controls_panel(ui));

        egui::CentralPanel::default().show(context, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
            let rect = response.rect;
            let anchor = Pos2::new(rect.center().x, rect.bottom() - BASELINE_MARGIN);

            self.engine
                .update(Vec2::ZERO, &mut self.visuals, &mut self.listener);
            self.clamp_selection();
            self.drain_events();
            self.paint_pile(&painter, anchor);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardpile_core::{PileConfig, PileControls};

    #[test]
    fn test_visuals_track_engine() {
        let mut visuals = CardVisuals::default();
        let mut engine: PileEngine<CardId> =
            PileEngine::with_controls(PileConfig::default(), PileControls::new(0.4, 1.0, 0.5));
        engine.update(Vec2::ZERO, &mut visuals, &mut ());
        assert_eq!(visuals.len(), 4);

        let id = *engine.visual_handle(3).unwrap();
        let sprite = visuals.sprites[&id];
        assert_eq!(sprite.position, engine.position(3));
        assert_eq!(sprite.rotation, engine.rotation(3));

        engine.clear(&mut visuals, &mut ());
        assert!(visuals.is_empty());
    }

    #[test]
    fn test_event_log_is_bounded() {
        let mut app = CardpileApp::new(PileSettings::default());
        for _ in 0..(EVENT_LOG_LEN / 2) {
            app.engine.controls_mut().set_nodes_amount(1.0);
            app.engine
                .update(Vec2::ZERO, &mut app.visuals, &mut app.listener);
            app.engine.controls_mut().set_nodes_amount(0.0);
            app.engine
                .update(Vec2::ZERO, &mut app.visuals, &mut app.listener);
            app.drain_events();
        }
        assert_eq!(app.event_log.len(), EVENT_LOG_LEN);
        assert_eq!(app.event_log.back().map(String::as_str), Some("- 0"));
    }

    #[test]
    fn test_selection_follows_shrinking_pile() {
        let mut app = CardpileApp::new(PileSettings::default());
        app.engine.controls_mut().set_nodes_amount(1.0);
        app.engine
            .update(Vec2::ZERO, &mut app.visuals, &mut app.listener);
        app.selected = 9;
        app.clamp_selection();
        assert_eq!(app.selected, 9);

        app.engine.controls_mut().set_nodes_amount(0.3);
        app.engine
            .update(Vec2::ZERO, &mut app.visuals, &mut app.listener);
        app.clamp_selection();
        assert_eq!(app.selected, 2);
        assert!(app.engine.visual_handle(app.selected).is_some());

        app.engine.controls_mut().set_nodes_amount(0.0);
        app.engine
            .update(Vec2::ZERO, &mut app.visuals, &mut app.listener);
        app.clamp_selection();
        assert_eq!(app.selected, 0);
    }
}
