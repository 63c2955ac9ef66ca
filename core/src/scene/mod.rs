//! Scene graph types for representing loaded scenes.
//!
//! These types are format-agnostic and can be produced by any loader
//! or built programmatically.
//!
//! - [`Scene`] - A scene with an ordered list of root nodes
//! - [`SceneNode`] - A node in the scene tree with local and world transforms

mod types;

pub use types::{Scene, SceneNode};
