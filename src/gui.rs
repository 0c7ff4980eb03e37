// src/gui.rs
use eframe::egui;
use egui::{Color32, RichText};
use egui_plot::{Corner, Legend, Line, Plot, PlotPoints};
use log::{info, warn};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;
use crate::config::MonitorConfig;
use crate::drivers::{
    default_export_path, save_frame_png, EegBand, PlotFrame, PlotStyle, SourceWaker,
};
use crate::engine;
use crate::types::*;

const MAX_LOG_LINES: usize = 8;
// Height split between the amplitude chart and the voltage chart
const TOP_SHARE: f32 = 0.9;

pub struct EegMonitorApp {
    status: EngineStatus,
    frame: Option<PlotFrame>,
    frames_received: u64,
    reset_views: bool,
    refresh: Duration,
    log_messages: Vec<String>,

    // engine link
    rx: Receiver<EngineMessage>,
    tx_cmd: Sender<GuiCommand>,
    engine: Option<JoinHandle<()>>,
    waker: Option<SourceWaker>,
}

impl EegMonitorApp {
    pub fn new(config: MonitorConfig) -> Self {
        let (tx, rx) = channel();
        let (tx_cmd, rx_cmd) = channel();
        let refresh = Duration::from_millis(config.refresh_interval_ms);
        let engine = engine::spawn_thread(tx, rx_cmd, config);
        Self {
            status: EngineStatus::Opening,
            frame: None,
            frames_received: 0,
            reset_views: false,
            refresh,
            log_messages: vec!["EEG monitor ready.".to_owned()],
            rx,
            tx_cmd,
            engine: Some(engine),
            waker: None,
        }
    }

    fn log(&mut self, msg: &str) {
        self.log_messages.push(format!("> {}", msg));
        if self.log_messages.len() > MAX_LOG_LINES {
            self.log_messages.remove(0);
        }
    }

    fn drain_messages(&mut self) {
        // Only the newest frame is drawn; older ones are dropped on the floor.
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                EngineMessage::Frame(frame) => {
                    self.frames_received += 1;
                    self.frame = Some(frame);
                }
                EngineMessage::Log(s) => self.log(&s),
                EngineMessage::Error(s) => self.log(&format!("⚠ {s}")),
                EngineMessage::Status(s) => self.status = s,
                EngineMessage::Waker(w) => self.waker = Some(w),
            }
        }
    }

    fn send(&mut self, cmd: GuiCommand) {
        if self.tx_cmd.send(cmd).is_err() && cmd != GuiCommand::Shutdown {
            self.log("Engine is not running");
        }
    }

    fn shutdown(&mut self) {
        let Some(handle) = self.engine.take() else {
            return;
        };
        self.drain_messages();
        self.tx_cmd.send(GuiCommand::Shutdown).ok();
        // A read blocked on the device would otherwise hold the join.
        if let Some(waker) = &self.waker {
            waker.wake();
        }
        if handle.join().is_err() {
            warn!("Engine thread panicked");
        }
        info!("Audio capture released");
    }

    fn save_png(&mut self) {
        let Some(frame) = &self.frame else {
            self.log("Nothing to save yet");
            return;
        };
        let path = default_export_path();
        match save_frame_png(frame, &PlotStyle::default(), &path) {
            Ok(path) => self.log(&format!("💾 Saved {}", path.display())),
            Err(err) => self.log(&format!("⚠ Save failed: {err}")),
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("🏠 Home").on_hover_text("Reset both views").clicked() {
                self.reset_views = true;
            }
            let streaming = self.status == EngineStatus::Streaming;
            let paused = self.status == EngineStatus::Paused;
            if ui
                .add_enabled(streaming || paused, egui::Button::new(if paused { "▶ Resume" } else { "⏸ Pause" }))
                .clicked()
            {
                self.send(if paused { GuiCommand::Resume } else { GuiCommand::Pause });
            }
            if ui
                .add_enabled(self.frame.is_some(), egui::Button::new("💾 Save PNG"))
                .clicked()
            {
                self.save_png();
            }
            ui.separator();
            ui.label("Drag to pan, scroll to zoom, double-click to fit");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (text, color) = match self.status {
                    EngineStatus::Opening => ("OPENING", Color32::YELLOW),
                    EngineStatus::Streaming => ("LIVE", Color32::GREEN),
                    EngineStatus::Paused => ("PAUSED", Color32::LIGHT_BLUE),
                    EngineStatus::Failed => ("DEVICE ERROR", Color32::RED),
                    EngineStatus::Stopped => ("STOPPED", Color32::GRAY),
                };
                ui.label(RichText::new(text).strong().color(color));
                ui.label(format!("frames: {}", self.frames_received));
            });
        });
    }

    fn band_power_line(&self, ui: &mut egui::Ui) {
        let Some(frame) = &self.frame else {
            return;
        };
        ui.horizontal(|ui| {
            for (band, power) in &frame.band_power {
                let [r, g, b] = band.rgb();
                ui.label(
                    RichText::new(format!("{} {:.2e}", band.name(), power))
                        .monospace()
                        .color(Color32::from_rgb(r, g, b)),
                );
            }
        });
    }

    fn charts(&mut self, ui: &mut egui::Ui) {
        let reset = std::mem::take(&mut self.reset_views);
        let avail = (ui.available_height() - 40.0).max(100.0);

        ui.label(RichText::new("Real-Time Frequency and mV Values").heading());
        let mut top = Plot::new("amplitude_plot")
            .height(avail * TOP_SHARE)
            .legend(Legend::default().position(Corner::RightTop))
            .x_axis_label("Frequency (Hz)")
            .y_axis_label("Intensity (dB)")
            .include_y(0.0)
            .auto_bounds_x();
        if reset {
            top = top.reset();
        }
        top.show(ui, |plot_ui| {
            if let Some(frame) = &self.frame {
                plot_ui.line(Line::new(PlotPoints::new(frame.amplitude_points())));
                for fill in &frame.band_fills {
                    let [r, g, b] = fill.band.rgb();
                    plot_ui.line(
                        Line::new(PlotPoints::new(fill.points.clone()))
                            .color(Color32::from_rgb(r, g, b))
                            .width(2.0)
                            .fill(0.0)
                            .name(fill.band.label()),
                    );
                }
            } else {
                // Keep the legend visible before the first chunk arrives.
                for band in EegBand::ALL {
                    let [r, g, b] = band.rgb();
                    plot_ui.line(
                        Line::new(PlotPoints::new(Vec::new()))
                            .color(Color32::from_rgb(r, g, b))
                            .name(band.label()),
                    );
                }
            }
        });

        let mut bottom = Plot::new("voltage_plot")
            .height(avail * (1.0 - TOP_SHARE))
            .x_axis_label("Time")
            .y_axis_label("Voltage (mV)")
            .include_y(0.0)
            .auto_bounds_x();
        if reset {
            bottom = bottom.reset();
        }
        bottom.show(ui, |plot_ui| {
            if let Some(frame) = &self.frame {
                plot_ui.line(Line::new(PlotPoints::new(frame.voltage_points())));
            }
        });
    }
}

impl eframe::App for EegMonitorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown();
        }

        // 1. engine messages
        self.drain_messages();
        match self.status {
            EngineStatus::Streaming => ctx.request_repaint_after(self.refresh),
            EngineStatus::Opening => ctx.request_repaint_after(Duration::from_millis(100)),
            _ => {}
        }

        // 2. UI
        let mut visuals = egui::Visuals::dark();
        visuals.widgets.noninteractive.bg_fill = Color32::from_rgb(10, 10, 15);
        ctx.set_visuals(visuals);

        egui::TopBottomPanel::bottom("toolbar").show(ctx, |ui| {
            ui.add_space(4.0);
            self.toolbar(ui);
            ui.add_space(4.0);
        });

        egui::SidePanel::right("log").min_width(220.0).show(ctx, |ui| {
            ui.label("LOG");
            ui.separator();
            egui::ScrollArea::vertical().stick_to_bottom(true).show(ui, |ui| {
                for m in &self.log_messages {
                    ui.monospace(m);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.charts(ui);
            self.band_power_line(ui);
        });
    }
}

impl Drop for EegMonitorApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}
