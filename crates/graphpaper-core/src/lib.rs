//! GraphPaper Core Library
//!
//! Platform-agnostic drawing engine: gesture routing on the paper, tool
//! handlers, in-place editing and undo/redo over a layered graph.

pub mod config;
pub mod controller;
pub mod drawables;
pub mod edit;
pub mod editor;
pub mod graph;
pub mod history;
pub mod layer;
pub mod paper;
pub mod render;
pub mod storage;
pub mod tools;
pub mod view;

pub use config::{ConfigError, EngineConfig, MAX_ZOOM, MIN_ZOOM};
pub use controller::DrawingController;
pub use drawables::{Color, Drawable, DrawableInfo, DrawableTrait, LineStyle, StraightLine};
pub use edit::EditHandler;
pub use editor::{LineHandle, StraightLineEditor};
pub use graph::{Graph, GraphSummary, ModelError};
pub use history::{Command, CommandKind, History};
pub use layer::Layer;
pub use paper::{Gesture, GesturePoint, Paper, PaperState, PointerEvent, PointerId, PointerPhase};
pub use render::{GraphView, NullView, RecordingView, ViewEvent};
pub use storage::{FileStore, GraphStore, MemoryStore, StorageError, StorageResult};
pub use tools::{PanTool, StraightLineTool, ToolContext, ToolHandler, ToolKind, ZoomTool};
pub use view::ViewTransform;
