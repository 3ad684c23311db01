#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod generation;
pub mod handles;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod sync;
pub mod validate;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Direction, LayoutConfig, load_config};
pub use generation::{
    FilterOptions, GenerationInfo, classify_generations, classify_generations_extended,
    filter_visible,
};
pub use handles::{HandleGroup, assign_edge_handles, child_handle_id, resolve_handle_groups};
pub use ir::{EdgeData, FamilyGraph, PersonData, PersonNode, Position, Relationship, RelationshipEdge};
pub use layout::{DagreProvider, LayeredLayoutProvider, LayoutEngine, LayoutError, auto_layout};
pub use sync::sync_relationships;
pub use validate::{RelationshipError, validate_parent_addition, validate_partner_addition};
