// Biblioteca raíz del crate `quickplan`.
// Expone los dos motores del planificador: el organizador de horarios
// (`algorithm`) y el recomendador de mallas (`recommender`).
pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod recommender;

pub use algorithm::{organize_plan, organize_plan_json};
pub use config::OrganizerConfig;
pub use error::{ErrorKind, PlannerError};
pub use recommender::{recommend_classes, Catalog, CurriculumSource, PrereqSource, RecommendRequest};
