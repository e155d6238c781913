/// Filtro de secciones del organizador.
///
/// Reduce las secciones de cada curso antes de combinar. Los pasos se aplican
/// en este orden porque cada uno depende del anterior:
/// 1. quitar secciones canceladas
/// 2. aplicar los filtros del usuario por curso (y recordar secciones fijadas)
/// 3. normalizar los horarios a minutos
/// 4. dejar a lo más una sección online por curso
/// 5. si `eventPriority` está activo, quitar secciones que chocan con eventos
///
/// Trabaja sobre copias: el plan del llamador no se modifica.

use std::collections::HashSet;

use tracing::debug;

use crate::algorithm::conflict::{EventBlock, Slot};
use crate::models::{CourseFilter, PlanData, Section};

/// Sección candidata con sus bloques ya normalizados.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSection {
    pub section: Section,
    pub slots: Vec<Slot>,
}

impl CandidateSection {
    pub fn from_section(section: Section) -> CandidateSection {
        let slots = section.meeting_times.iter().filter_map(Slot::from_meeting).collect();
        CandidateSection { section, slots }
    }

    pub fn section_number(&self) -> &str {
        &self.section.section_number
    }
}

/// Un curso con las alternativas que sobrevivieron al filtrado.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseSlot {
    pub code: String,
    pub sections: Vec<CandidateSection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilteredPlan {
    pub courses: Vec<CourseSlot>,
    /// Secciones fijadas por el usuario, formato "<curso> <sección>"
    pub locked: HashSet<String>,
}

impl FilteredPlan {
    /// Primer curso que quedó sin secciones, si lo hay
    pub fn first_empty_course(&self) -> Option<&str> {
        self.courses.iter().find(|c| c.sections.is_empty()).map(|c| c.code.as_str())
    }

    /// Número de secciones por curso, en el orden del plan
    pub fn section_counts(&self) -> Vec<usize> {
        self.courses.iter().map(|c| c.sections.len()).collect()
    }
}

pub fn lock_key(code: &str, section: &str) -> String {
    format!("{} {}", code, section)
}

pub fn is_cancelled(section: &Section) -> bool {
    let mentions = |s: &Option<String>| s.as_deref().is_some_and(|v| v.to_lowercase().contains("cancelled"));
    mentions(&section.status) || mentions(&section.comments)
}

/// True si la sección cumple todas las restricciones no nulas del filtro
pub fn matches_filter(section: &Section, filter: &CourseFilter) -> bool {
    if let Some(ref instructor) = filter.instructor {
        if section.instructor.as_deref() != Some(instructor.as_str()) {
            return false;
        }
    }
    if let Some(honors) = filter.honors {
        if section.is_honors != honors {
            return false;
        }
    }
    if let Some(ref modality) = filter.online {
        let kind = section.instruction_type.as_deref().unwrap_or_default().to_lowercase();
        if !kind.contains(&modality.to_lowercase()) {
            return false;
        }
    }
    if let Some(ref number) = filter.section {
        if &section.section_number != number {
            return false;
        }
    }
    true
}

pub fn filter_sections(plan: &PlanData) -> FilteredPlan {
    // 1) canceladas
    let mut courses: Vec<(String, Vec<Section>)> = plan
        .courses
        .iter()
        .map(|c| {
            let sections: Vec<Section> = c.sections.iter().filter(|s| !is_cancelled(s)).cloned().collect();
            (c.code.clone(), sections)
        })
        .collect();

    // 2) filtros del usuario
    let mut locked: HashSet<String> = HashSet::new();
    for filter in &plan.organizer_settings.course_filters {
        for (code, sections) in courses.iter_mut() {
            if *code != filter.course_code {
                continue;
            }
            let before = sections.len();
            sections.retain(|s| matches_filter(s, filter));
            debug!(course = %code, before, after = sections.len(), "filtro de usuario aplicado");
        }
        if let Some(ref number) = filter.section {
            locked.insert(lock_key(&filter.course_code, number));
        }
    }

    // 3) normalizar horarios
    let mut slots: Vec<CourseSlot> = courses
        .into_iter()
        .map(|(code, sections)| CourseSlot {
            code,
            sections: sections.into_iter().map(CandidateSection::from_section).collect(),
        })
        .collect();

    // 4) una sola sección online por curso: diez secciones online equivalen a una
    let mut has_online: HashSet<String> = HashSet::new();
    for course in slots.iter_mut() {
        let code = course.code.clone();
        course.sections.retain(|c| {
            if !c.section.is_online() {
                return true;
            }
            has_online.insert(code.clone())
        });
    }

    // 5) eventos fijos
    if plan.organizer_settings.event_priority {
        let events: Vec<EventBlock> = plan.events.iter().filter_map(EventBlock::from_event).collect();
        for course in slots.iter_mut() {
            let code = course.code.clone();
            let before = course.sections.len();
            course.sections.retain(|c| {
                if locked.contains(&lock_key(&code, c.section_number())) {
                    return true;
                }
                !c.slots.iter().any(|slot| events.iter().any(|e| e.blocks(slot)))
            });
            debug!(course = %code, before, after = course.sections.len(), "secciones que chocan con eventos removidas");
        }
    }

    FilteredPlan { courses: slots, locked }
}
