//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod character_repo;
pub mod episode_repo;
pub mod panel_repo;
pub mod portrait_repo;
pub mod series_repo;

pub use character_repo::CharacterRepo;
pub use episode_repo::EpisodeRepo;
pub use panel_repo::PanelRepo;
pub use portrait_repo::PortraitRepo;
pub use series_repo::SeriesRepo;
