// Módulo de alto nivel del organizador de horarios.
// Declarar submódulos (archivos en la carpeta `src/algorithm`)
pub mod combos;
pub mod conflict;
pub mod filters;
pub mod organizer;
pub mod ranking;
pub mod scoring;

// Reexportar la API pública del organizador
pub use combos::{generate_combinations, Combination, CombinationSpace};
pub use conflict::{day_to_index, normalize_time, overlaps, slots_conflict, EventBlock, Slot};
pub use filters::{filter_sections, CandidateSection, CourseSlot, FilteredPlan};
pub use organizer::{organize_plan, organize_plan_json};
pub use ranking::{materialize_plan, rank_combinations, score_combinations, ScoredCombination};
pub use scoring::{rate_combination, rate_sections};
