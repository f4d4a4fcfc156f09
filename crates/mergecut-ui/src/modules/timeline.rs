// crates/mergecut-ui/src/modules/timeline.rs
use super::EditorModule;
use super::playback::PlaybackModule;
use mergecut_core::commands::EditorCommand;
use mergecut_core::helpers::time::{format_clock, format_duration};
use mergecut_core::state::{InsertPosition, ProjectState, TimelineItem};
use crate::theme::{ACCENT, DARK_BORDER, DARK_TEXT_DIM, ROW_AUDIO, ROW_PAUSE, ROW_SELECTED};
use egui::{Color32, Id, RichText, Sense, Stroke, Ui};
use uuid::Uuid;

pub struct TimelineModule {
    /// Index being dragged by its handle, if a reorder drag is in progress.
    drag_from: Option<usize>,
    /// Row the pointer is currently over during the drag — the drop target.
    drag_hover: Option<usize>,
}

impl TimelineModule {
    pub fn new() -> Self {
        Self {
            drag_from:  None,
            drag_hover: None,
        }
    }
}

/// Standard row action button — small, icon-forward.
fn row_btn(label: impl Into<egui::WidgetText>) -> egui::Button<'static> {
    egui::Button::new(label).min_size(egui::vec2(26.0, 22.0))
}

impl EditorModule for TimelineModule {
    fn name(&self) -> &str { "Timeline" }

    fn ui(
        &mut self,
        ui:       &mut Ui,
        state:    &ProjectState,
        playback: &PlaybackModule,
        cmd:      &mut Vec<EditorCommand>,
    ) {
        ui.horizontal(|ui| {
            ui.heading("Timeline");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(format!(
                        "{} items · {}",
                        state.items().len(),
                        format_duration(state.total_duration()),
                    ))
                    .size(11.0)
                    .color(DARK_TEXT_DIM),
                );
            });
        });
        ui.separator();

        if state.items().is_empty() {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                ui.label(RichText::new("No clips yet").color(DARK_TEXT_DIM));
                ui.label(
                    RichText::new("Import audio files to start arranging")
                        .size(11.0)
                        .color(DARK_TEXT_DIM),
                );
            });
            return;
        }

        self.drag_hover = None;

        egui::ScrollArea::vertical()
            .id_salt("timeline_rows")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (index, item) in state.items().iter().enumerate() {
                    self.row(ui, state, playback, index, item, cmd);
                }
            });

        // Commit a handle drag when the pointer is released over another row.
        if self.drag_from.is_some() && ui.input(|i| i.pointer.any_released()) {
            if let (Some(from), Some(to)) = (self.drag_from, self.drag_hover) {
                if from != to {
                    cmd.push(EditorCommand::Reorder { from, to });
                }
            }
            self.drag_from = None;
        }
    }
}

impl TimelineModule {
    fn row(
        &mut self,
        ui:       &mut Ui,
        state:    &ProjectState,
        playback: &PlaybackModule,
        index:    usize,
        item:     &TimelineItem,
        cmd:      &mut Vec<EditorCommand>,
    ) {
        let id          = item.id();
        let is_selected = state.selected_item == Some(id);
        let is_dropping = self.drag_from.is_some() && self.drag_hover == Some(index);

        let fill = if is_selected {
            ROW_SELECTED
        } else {
            match item {
                TimelineItem::Audio(_) => ROW_AUDIO,
                TimelineItem::Pause(_) => ROW_PAUSE,
            }
        };
        let stroke = if is_dropping {
            Stroke::new(1.5, ACCENT)
        } else {
            Stroke::new(1.0, DARK_BORDER)
        };

        // Sensed scope: clicks not consumed by an inner widget select the row,
        // while the play button and sliders keep winning their own areas.
        let row_resp = ui
            .scope_builder(
                egui::UiBuilder::new()
                    .id_salt(("timeline_row", id))
                    .sense(Sense::click()),
                |ui| {
                    egui::Frame::new()
                        .fill(fill)
                        .stroke(stroke)
                        .corner_radius(egui::CornerRadius::same(4))
                        .inner_margin(egui::Margin::same(6))
                        .show(ui, |ui| {
                            ui.set_min_width(ui.available_width());
                            ui.horizontal(|ui| {
                                self.drag_handle(ui, index, id);
                                ui.label(
                                    RichText::new(format!("{:>2}", index + 1))
                                        .monospace()
                                        .size(10.0)
                                        .color(DARK_TEXT_DIM),
                                );
                                match item {
                                    TimelineItem::Audio(a) => {
                                        audio_row(ui, playback, a.id, &a.name, a.duration, cmd);
                                    }
                                    TimelineItem::Pause(p) => {
                                        pause_row(ui, p.id, p.duration, cmd);
                                    }
                                }
                            });
                        });
                },
            )
            .response;

        if row_resp.clicked() {
            cmd.push(EditorCommand::SelectItem(Some(id)));
        }
        row_resp.context_menu(|ui| {
            ui.set_min_width(170.0);
            if ui.button("⏸  Insert pause above").clicked() {
                cmd.push(EditorCommand::InsertPause { index, position: InsertPosition::Above });
                ui.close_menu();
            }
            if ui.button("⏸  Insert pause below").clicked() {
                cmd.push(EditorCommand::InsertPause { index, position: InsertPosition::Below });
                ui.close_menu();
            }
            ui.separator();
            if ui.button("⎘  Duplicate").clicked() {
                cmd.push(EditorCommand::DuplicateItem(id));
                ui.close_menu();
            }
            if ui.button("🗑  Delete").clicked() {
                cmd.push(EditorCommand::DeleteItem(id));
                ui.close_menu();
            }
        });

        // Track the drop target while a handle drag is live.
        if self.drag_from.is_some() {
            if let Some(ptr) = ui.input(|i| i.pointer.hover_pos()) {
                if row_resp.rect.contains(ptr) {
                    self.drag_hover = Some(index);
                }
            }
        }
    }

    fn drag_handle(&mut self, ui: &mut Ui, index: usize, id: Uuid) {
        let label_rect = ui.label(RichText::new("≡").size(14.0).color(DARK_TEXT_DIM)).rect;
        let handle = ui.interact(
            label_rect,
            Id::new(("row_handle", id)),
            Sense::drag(),
        );
        if handle.drag_started() {
            self.drag_from = Some(index);
        }
        if handle.hovered() || handle.dragged() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
        }
    }
}

fn audio_row(
    ui:       &mut Ui,
    playback: &PlaybackModule,
    id:       Uuid,
    name:     &str,
    duration: f64,
    cmd:      &mut Vec<EditorCommand>,
) {
    let view = playback.preview_view(id);

    if view.playing {
        if ui.add(row_btn("⏹")).on_hover_text("Stop preview").clicked() {
            cmd.push(EditorCommand::StopPreview(id));
        }
    } else {
        let resp = ui
            .add_enabled(view.available, row_btn("▶"))
            .on_hover_text("Preview this clip")
            .on_disabled_hover_text(if view.failed {
                "This file could not be decoded"
            } else {
                "Decoding…"
            });
        if resp.clicked() {
            cmd.push(EditorCommand::PlayPreview { id, offset: view.position });
        }
    }

    ui.label(RichText::new(name).size(12.0));
    if view.failed {
        ui.label(RichText::new("decode failed").size(10.0).color(Color32::from_rgb(230, 120, 110)));
    }

    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        if ui.add(row_btn("🗑")).on_hover_text("Delete").clicked() {
            cmd.push(EditorCommand::DeleteItem(id));
        }
        if ui.add(row_btn("⎘")).on_hover_text("Duplicate").clicked() {
            cmd.push(EditorCommand::DuplicateItem(id));
        }
        ui.label(
            RichText::new(format_duration(duration))
                .monospace()
                .size(10.0)
                .color(DARK_TEXT_DIM),
        );

        // Seek bar — live while the preview plays, scrub-to-seek anytime
        // a buffer exists.
        if view.available && view.duration > 0.0 {
            ui.label(
                RichText::new(format_clock(view.position))
                    .monospace()
                    .size(10.0)
                    .color(DARK_TEXT_DIM),
            );
            let mut pos = view.position;
            let slider = egui::Slider::new(&mut pos, 0.0..=view.duration)
                .show_value(false);
            if ui.add_sized([140.0, 16.0], slider).changed() {
                cmd.push(EditorCommand::SeekPreview { id, time: pos });
            }
        }
    });
}

fn pause_row(ui: &mut Ui, id: Uuid, duration: f64, cmd: &mut Vec<EditorCommand>) {
    ui.label(RichText::new("⏸").size(13.0).color(DARK_TEXT_DIM));
    ui.label(RichText::new("Pause").size(12.0));

    let mut secs = duration;
    let drag = egui::DragValue::new(&mut secs)
        .speed(0.1)
        .range(0.0..=3600.0)
        .suffix(" s")
        .max_decimals(2);
    if ui.add(drag).changed() {
        cmd.push(EditorCommand::SetPauseDuration { id, seconds: secs });
    }
}
