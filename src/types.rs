// src/types.rs
use crate::drivers::{PlotFrame, SourceWaker};

// Engine lifecycle as shown in the status bar
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum EngineStatus {
    Opening,
    Streaming,
    Paused,
    Failed,
    Stopped,
}

// GUI -> engine
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GuiCommand {
    Pause,
    Resume,
    Shutdown,
}

// engine -> GUI
#[derive(Clone, Debug)]
pub enum EngineMessage {
    Log(String),
    Status(EngineStatus),
    Frame(PlotFrame),
    Error(String),
    // lets the GUI cut a blocked read short on shutdown
    Waker(SourceWaker),
}
