//! TaleForge Engine library.
//!
//! Server-side code for the TaleForge role-play chat backend.
//!
//! ## Structure
//!
//! - `entities/` - Entity modules wrapping repository operations
//! - `use_cases/` - User story orchestration across entities
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod entities;
pub mod infrastructure;
pub mod prompt_templates;
pub mod use_cases;

pub use app::App;
