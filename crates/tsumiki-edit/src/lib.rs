//! Undoable editing over layered block and model groups.
#![forbid(unsafe_code)]

pub mod command;
pub mod document;
pub mod edits;
pub mod route;
pub mod session;

pub use command::{Command, CommandStack};
pub use document::{DEFAULT_LAYER_NAME, EditDocument, EditLayer, ModelTransform};
pub use edits::EditCommand;
pub use route::{ARC_DIVISIONS, Polyline, RouteEdge, RoutePaths, Walkable};
pub use session::{EditSession, MoveCapture};
