// organizer.rs - Orquestador del organizador de horarios
//
// Pipeline:
// FASE 1: filter_sections      -> secciones por curso que respetan filtros y eventos
// FASE 2: generate_combinations -> combinaciones curso->sección sin choques
// FASE 3: score_combinations    -> puntaje por combinación (menor es mejor)
// FASE 4: rank_combinations     -> top-K distintos, materializados como copias del plan
use std::time::Instant;

use tracing::info;

use crate::algorithm::combos::generate_combinations;
use crate::algorithm::filters::filter_sections;
use crate::algorithm::ranking::{materialize_plan, rank_combinations, score_combinations};
use crate::config::OrganizerConfig;
use crate::error::PlannerError;
use crate::models::PlanData;

/// Recibe el plan actual y devuelve hasta `config.max_plans` copias con la
/// mejor selección de secciones marcada. El plan recibido no se modifica.
pub fn organize_plan(plan: &PlanData, config: &OrganizerConfig) -> Result<Vec<PlanData>, PlannerError> {
    let start = Instant::now();

    // FASE 1
    let filtered = filter_sections(plan);
    if let Some(course) = filtered.first_empty_course() {
        return Err(PlannerError::FiltersTooRestrictive { course: course.to_string() });
    }

    // FASE 2
    let combinations = generate_combinations(&filtered.courses, config)?;

    // FASE 3 + 4
    let scored = score_combinations(&filtered.courses, combinations, &plan.organizer_settings);
    let best = rank_combinations(scored, &filtered.courses, config.max_plans);

    let plans: Vec<PlanData> = best
        .iter()
        .map(|s| materialize_plan(plan, &s.combination.selections(&filtered.courses)))
        .collect();

    info!(plans = plans.len(), elapsed_ms = start.elapsed().as_millis() as u64, "organizador terminado");
    Ok(plans)
}

/// Igual que `organize_plan` pero parte del JSON del plan.
pub fn organize_plan_json(json_str: &str, config: &OrganizerConfig) -> Result<Vec<PlanData>, PlannerError> {
    let plan: PlanData = serde_json::from_str(json_str)?;
    organize_plan(&plan, config)
}
