//! # Social Graph Model
//!
//! Plain data types shared by storage, traversal, export and analytics.
//! No I/O, no state.

pub mod vertex;
pub mod edge;
pub mod path;
pub mod value;
pub mod property_map;

pub use vertex::{Vertex, VertexId, VertexKind, ContainerKind};
pub use edge::{Edge, EdgeId, RelKind, Direction, TOPIC, WEIGHT, COST};
pub use path::GraphPath;
pub use value::Value;
pub use property_map::{PropertyMap, props};
