use std::collections::HashSet;

use tracing::info;

use crate::algorithm::combos::Combination;
use crate::algorithm::filters::CourseSlot;
use crate::algorithm::scoring::rate_combination;
use crate::models::{OrganizerSettings, PlanData};

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCombination {
    pub combination: Combination,
    pub score: f64,
}

/// Puntúa cada combinación; las que no tienen puntaje (plan vacío) se descartan.
pub fn score_combinations(courses: &[CourseSlot], combinations: Vec<Combination>, settings: &OrganizerSettings) -> Vec<ScoredCombination> {
    combinations
        .into_iter()
        .filter_map(|combination| {
            rate_combination(courses, &combination, settings).map(|score| ScoredCombination { combination, score })
        })
        .collect()
}

/// Ordena ascendente por puntaje (orden estable: ante empate gana la
/// combinación generada primero) y devuelve a lo más `limit` planes distintos.
pub fn rank_combinations(mut scored: Vec<ScoredCombination>, courses: &[CourseSlot], limit: usize) -> Vec<ScoredCombination> {
    scored.sort_by(|a, b| a.score.total_cmp(&b.score));
    info!(similar = scored.len(), "horarios similares");

    let mut seen: HashSet<Vec<(String, String)>> = HashSet::new();
    let mut best = Vec::with_capacity(limit);
    for candidate in scored {
        if best.len() >= limit {
            break;
        }
        if seen.insert(candidate.combination.selections(courses)) {
            best.push(candidate);
        }
    }
    best
}

/// Copia del plan original con las secciones elegidas marcadas `selected`
/// y todas las demás en `false`.
pub fn materialize_plan(original: &PlanData, selections: &[(String, String)]) -> PlanData {
    let mut plan = original.clone();
    for (code, number) in selections {
        if let Some(course) = plan.courses.iter_mut().find(|c| &c.code == code) {
            for section in course.sections.iter_mut() {
                section.selected = &section.section_number == number;
            }
        }
    }
    plan
}
