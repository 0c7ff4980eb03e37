// src/engine.rs
use crate::config::{MonitorConfig, SourceMode};
use crate::drivers::{
    input_device_names, AudioSource, ChunkSource, MonitorError, MonitorPipeline, SimulatedSource,
};
use crate::types::*;
use log::{debug, info, warn};
use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// Pause between retries after a failed read
const ERROR_BACKOFF: Duration = Duration::from_millis(250);

// The device is opened on the engine thread; cpal streams are not Send everywhere.
pub fn spawn_thread(
    tx: Sender<EngineMessage>,
    rx_cmd: Receiver<GuiCommand>,
    config: MonitorConfig,
) -> JoinHandle<()> {
    thread::spawn(move || {
        tx.send(EngineMessage::Status(EngineStatus::Opening)).ok();
        let source = match open_source(&config, &tx) {
            Ok(s) => s,
            Err(err) => {
                warn!("Could not open source: {err}");
                tx.send(EngineMessage::Error(format!("❌ {err}"))).ok();
                tx.send(EngineMessage::Status(EngineStatus::Failed)).ok();
                return;
            }
        };
        let pipeline = match MonitorPipeline::new(source, config.chunk_size, config.voltage_scale) {
            Ok(p) => p,
            Err(err) => {
                tx.send(EngineMessage::Error(format!("❌ {err}"))).ok();
                tx.send(EngineMessage::Status(EngineStatus::Failed)).ok();
                return;
            }
        };
        let interval = Duration::from_millis(config.refresh_interval_ms);
        run_loop(pipeline, &tx, &rx_cmd, interval);
        info!("Engine stopped");
    })
}

fn open_source(
    config: &MonitorConfig,
    tx: &Sender<EngineMessage>,
) -> Result<Box<dyn ChunkSource>, MonitorError> {
    match config.source {
        SourceMode::Hardware => {
            if let Ok(names) = input_device_names() {
                debug!("Input devices: {names:?}");
            }
            let source = AudioSource::open(config)?;
            tx.send(EngineMessage::Log(format!(
                "✅ {} @ {} Hz",
                source.device_name(),
                source.sample_rate_hz()
            )))
            .ok();
            Ok(Box::new(source))
        }
        SourceMode::Simulation => {
            tx.send(EngineMessage::Log("✅ Simulated signal".to_owned())).ok();
            Ok(Box::new(SimulatedSource::new(config.sample_rate_hz, config.chunk_size)))
        }
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Tick until `Shutdown`, a closed channel, or an exhausted source.
/// Dropping the pipeline at the end releases the device.
pub fn run_loop<S: ChunkSource>(
    mut pipeline: MonitorPipeline<S>,
    tx: &Sender<EngineMessage>,
    rx_cmd: &Receiver<GuiCommand>,
    interval: Duration,
) {
    let mut paused = false;
    if let Some(waker) = pipeline.waker() {
        tx.send(EngineMessage::Waker(waker)).ok();
    }
    tx.send(EngineMessage::Status(EngineStatus::Streaming)).ok();
    'ticks: loop {
        // 1. commands
        loop {
            match rx_cmd.try_recv() {
                Ok(cmd) => {
                    if let Flow::Exit = handle_command(cmd, &mut pipeline, tx, &mut paused) {
                        break 'ticks;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'ticks,
            }
        }
        if paused {
            match rx_cmd.recv() {
                Ok(cmd) => {
                    if let Flow::Exit = handle_command(cmd, &mut pipeline, tx, &mut paused) {
                        break 'ticks;
                    }
                }
                Err(_) => break 'ticks,
            }
            continue;
        }

        // 2. read -> transform -> hand to the GUI
        let tick_start = Instant::now();
        match pipeline.pump_once() {
            Ok(frame) => {
                if tx.send(EngineMessage::Frame(frame)).is_err() {
                    break 'ticks;
                }
            }
            Err(MonitorError::SourceExhausted) => {
                info!("Source exhausted after {} chunks", pipeline.chunks_seen());
                break 'ticks;
            }
            // Woken for shutdown; the command is already queued.
            Err(MonitorError::Interrupted) => {
                debug!("Read interrupted");
                continue;
            }
            Err(err) => {
                warn!("Read failed: {err}");
                if tx.send(EngineMessage::Error(err.to_string())).is_err() {
                    break 'ticks;
                }
                thread::sleep(ERROR_BACKOFF);
            }
        }
        if let Some(rest) = interval.checked_sub(tick_start.elapsed()) {
            thread::sleep(rest);
        }
    }
    if let Err(err) = pipeline.stop() {
        warn!("Stopping source failed: {err}");
    }
    tx.send(EngineMessage::Status(EngineStatus::Stopped)).ok();
}

fn handle_command<S: ChunkSource>(
    cmd: GuiCommand,
    pipeline: &mut MonitorPipeline<S>,
    tx: &Sender<EngineMessage>,
    paused: &mut bool,
) -> Flow {
    match cmd {
        GuiCommand::Pause if !*paused => {
            *paused = true;
            if let Err(err) = pipeline.stop() {
                tx.send(EngineMessage::Error(err.to_string())).ok();
            }
            tx.send(EngineMessage::Status(EngineStatus::Paused)).ok();
            tx.send(EngineMessage::Log("⏸ Paused".to_owned())).ok();
        }
        GuiCommand::Resume if *paused => {
            *paused = false;
            if let Err(err) = pipeline.start() {
                tx.send(EngineMessage::Error(err.to_string())).ok();
            }
            tx.send(EngineMessage::Status(EngineStatus::Streaming)).ok();
            tx.send(EngineMessage::Log("▶ Resumed".to_owned())).ok();
        }
        GuiCommand::Shutdown => return Flow::Exit,
        _ => {}
    }
    Flow::Continue
}
