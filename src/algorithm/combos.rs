// Generador de combinaciones curso -> sección.
//
// El espacio completo tiene Π nᵢ combinaciones. En vez de bucles anidados se
// decodifica cada índice global i con la fórmula cerrada
//     sección(v) = floor(i / rolling[v]) mod n_v
// donde rolling[v] es el producto de las cantidades de secciones de los cursos
// anteriores a v. Así cualquier índice se evalúa de forma independiente y el
// rango [0, Π nᵢ) se puede repartir entre hilos.
use std::ops::Range;
use std::thread;

use tracing::{debug, info};

use crate::algorithm::conflict::{slots_conflict, Slot};
use crate::algorithm::filters::CourseSlot;
use crate::config::OrganizerConfig;
use crate::error::PlannerError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinationSpace {
    sizes: Vec<usize>,
    rolling: Vec<u64>,
    total: Option<u64>,
}

impl CombinationSpace {
    pub fn new(sizes: &[usize]) -> CombinationSpace {
        let mut rolling = Vec::with_capacity(sizes.len());
        let mut total: Option<u64> = Some(1);
        for &n in sizes {
            rolling.push(total.unwrap_or(u64::MAX));
            total = total.and_then(|t| t.checked_mul(n as u64));
        }
        CombinationSpace { sizes: sizes.to_vec(), rolling, total }
    }

    /// Total de combinaciones, `None` si no cabe en u64
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn rolling_products(&self) -> &[u64] {
        &self.rolling
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Índice de sección elegido para cada curso en la combinación `index`
    pub fn decode(&self, index: u64) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.sizes.len());
        self.decode_into(index, &mut out);
        out
    }

    pub fn decode_into(&self, index: u64, out: &mut Vec<usize>) {
        out.clear();
        for (v, &n) in self.sizes.iter().enumerate() {
            out.push(((index / self.rolling[v]) % n as u64) as usize);
        }
    }
}

/// Una elección de sección por curso (índices dentro de cada `CourseSlot`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Combination {
    pub index: u64,
    pub picks: Vec<usize>,
}

impl Combination {
    /// Pares (código de curso, número de sección)
    pub fn selections(&self, courses: &[CourseSlot]) -> Vec<(String, String)> {
        courses
            .iter()
            .zip(self.picks.iter())
            .map(|(course, &pick)| (course.code.clone(), course.sections[pick].section_number().to_string()))
            .collect()
    }
}

fn scan(courses: &[CourseSlot], space: &CombinationSpace, range: Range<u64>) -> Vec<Combination> {
    let mut found = Vec::new();
    let mut picks = Vec::with_capacity(courses.len());
    let mut meetings: Vec<Slot> = Vec::new();
    for i in range {
        space.decode_into(i, &mut picks);
        meetings.clear();
        for (course, &pick) in courses.iter().zip(picks.iter()) {
            meetings.extend_from_slice(&course.sections[pick].slots);
        }
        // Si la combinación tiene un choque se descarta completa
        if slots_conflict(&meetings) {
            continue;
        }
        found.push(Combination { index: i, picks: picks.clone() });
    }
    found
}

/// Enumera todas las combinaciones sin choques, en orden de índice global.
///
/// Errores:
/// - `NoCourses` si el plan no tiene cursos
/// - `TooManyCombinations` si Π nᵢ supera `config.max_combinations`
/// - `NoValidSchedule` si ninguna combinación sobrevive
pub fn generate_combinations(courses: &[CourseSlot], config: &OrganizerConfig) -> Result<Vec<Combination>, PlannerError> {
    if courses.is_empty() {
        return Err(PlannerError::NoCourses);
    }

    let sizes: Vec<usize> = courses.iter().map(|c| c.sections.len()).collect();
    let space = CombinationSpace::new(&sizes);
    let total = match space.total() {
        Some(t) if t <= config.max_combinations => t,
        other => {
            return Err(PlannerError::TooManyCombinations { total: other, limit: config.max_combinations });
        }
    };
    info!(total, "combinaciones a evaluar");

    let workers = config.workers.max(1) as u64;
    let found = if total <= config.parallel_threshold || workers == 1 {
        scan(courses, &space, 0..total)
    } else {
        let chunk = total.div_ceil(workers);
        debug!(workers, chunk, "enumeración en paralelo");
        thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|w| {
                    let start = (w * chunk).min(total);
                    let end = ((w + 1) * chunk).min(total);
                    let space = &space;
                    scope.spawn(move || scan(courses, space, start..end))
                })
                .collect();
            // unir en orden de bloque conserva el orden secuencial
            let mut all = Vec::new();
            for handle in handles {
                match handle.join() {
                    Ok(part) => all.extend(part),
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            all
        })
    };

    if found.is_empty() {
        return Err(PlannerError::NoValidSchedule);
    }
    info!(valid = found.len(), "combinaciones sin choques");
    Ok(found)
}
