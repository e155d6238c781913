// Puntaje de una combinación: menor es mejor.
use crate::algorithm::combos::Combination;
use crate::algorithm::conflict::{DAYS_PER_WEEK, MINUTES_PER_DAY};
use crate::algorithm::filters::CourseSlot;
use crate::models::OrganizerSettings;

/// Umbral de tiempo en clase (minutos) desde el que se evalúan las pausas
pub const BREAK_CHECK_MINUTES: u32 = 3 * 60;
/// Proporción clase / tiempo en campus usada por la heurística de pausas
pub const CLASS_RATIO: f64 = 0.7;
pub const BREAK_PENALTY_FACTOR: f64 = 1000.0;
/// Penalización por día cuando se excede el máximo de días en campus
pub const DAYS_PENALTY: f64 = 9999.0;

/// Resumen por día de una combinación
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayLoad {
    pub earliest_start: u32,
    pub latest_end: u32,
    pub class_minutes: u32,
}

impl DayLoad {
    fn empty() -> DayLoad {
        DayLoad { earliest_start: MINUTES_PER_DAY as u32, latest_end: 0, class_minutes: 0 }
    }

    pub fn is_active(&self) -> bool {
        self.class_minutes > 0
    }

    pub fn on_campus_minutes(&self) -> u32 {
        self.latest_end.saturating_sub(self.earliest_start)
    }
}

/// Carga por día de la semana (0 = domingo) considerando solo las secciones elegidas
pub fn day_loads(courses: &[CourseSlot], picks: &[usize]) -> [DayLoad; DAYS_PER_WEEK] {
    let mut days = [DayLoad::empty(); DAYS_PER_WEEK];
    for (course, &pick) in courses.iter().zip(picks.iter()) {
        let Some(section) = course.sections.get(pick) else { continue };
        for slot in &section.slots {
            let d = &mut days[slot.day];
            d.earliest_start = d.earliest_start.min(slot.start as u32);
            d.latest_end = d.latest_end.max(slot.end as u32);
            d.class_minutes += slot.duration() as u32;
        }
    }
    days
}

/// Puntúa una elección de secciones. Devuelve `None` si el plan no tiene
/// cursos (esa combinación nunca se rankea).
///
/// Por cada día con clases:
/// - suma el tiempo en campus (última salida - primera entrada)
/// - sin `compactPlan`, con más de 3 horas de clase y un tiempo en campus
///   mayor que `clase / 0.7`, suma `1000 * clase / campus`
/// - si el estudiante viaja, suma `horas_de_viaje * 60`
///
/// Si los días activos exceden `daysOnCampus` suma `9999 * días`, lo que
/// domina a cualquier otro factor.
pub fn rate_sections(courses: &[CourseSlot], picks: &[usize], settings: &OrganizerSettings) -> Option<f64> {
    if courses.is_empty() {
        return None;
    }

    let commute_minutes = match (settings.is_commuter, settings.commute_time_hours) {
        (true, Some(hours)) if hours > 0.0 => hours * 60.0,
        _ => 0.0,
    };

    let mut score = 0.0;
    let mut active_days = 0u32;
    for day in day_loads(courses, picks).iter().filter(|d| d.is_active()) {
        active_days += 1;
        let on_campus = day.on_campus_minutes() as f64;
        let in_class = day.class_minutes as f64;

        score += on_campus;

        if !settings.compact_plan && day.class_minutes > BREAK_CHECK_MINUTES && on_campus > in_class / CLASS_RATIO {
            score += BREAK_PENALTY_FACTOR * in_class / on_campus;
        }

        score += commute_minutes;
    }

    if let Some(max_days) = settings.days_on_campus {
        if max_days > 0 && active_days > max_days {
            score += DAYS_PENALTY * active_days as f64;
        }
    }

    Some(score)
}

/// Atajo para puntuar una `Combination`
pub fn rate_combination(courses: &[CourseSlot], combination: &Combination, settings: &OrganizerSettings) -> Option<f64> {
    rate_sections(courses, &combination.picks, settings)
}
