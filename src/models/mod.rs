// Estructuras de datos principales del organizador.
//
// Los nombres de campo siguen el JSON que entregan las capas externas
// (camelCase). Los campos desconocidos se guardan en `extra` para que la
// copia devuelta al usuario no pierda nada de lo que envió.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod requirement;

pub use requirement::{BranchOperator, Condition, CurriculumNode, GroupNode, PrereqTree, Requisite, RequirementNode};

/// Bloque semanal de una sección. `start_time`/`end_time` vienen como texto
/// (ISO-8601 o "HH:MM"); se normalizan a minutos en `algorithm::conflict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingTime {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub section_number: String,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub instruction_type: Option<String>,
    #[serde(default, rename = "is_honors", alias = "isHonors")]
    pub is_honors: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub meeting_times: Vec<MeetingTime>,
    #[serde(default)]
    pub selected: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Section {
    /// Sección sin bloques de horario (online / asíncrona)
    pub fn is_online(&self) -> bool {
        self.meeting_times.is_empty()
    }
}

/// Un curso del plan con todas sus secciones alternativas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub code: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Bloque ocupado fijo del estudiante (trabajo, deporte, etc).
/// `days_of_week` usa 0 = domingo .. 6 = sábado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub days_of_week: Vec<i32>,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filtro por curso. Cada campo `None` no restringe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseFilter {
    pub course_code: String,
    #[serde(default)]
    pub instructor: Option<String>,
    #[serde(default)]
    pub honors: Option<bool>,
    /// Subcadena de la modalidad ("online", "hybrid", ...)
    #[serde(default)]
    pub online: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizerSettings {
    pub compact_plan: bool,
    /// Máximo de días en campus; `None` o 0 desactiva la penalización
    pub days_on_campus: Option<u32>,
    pub is_commuter: bool,
    pub commute_time_hours: Option<f64>,
    pub course_filters: Vec<CourseFilter>,
    pub event_priority: bool,
}

/// Plan completo tal como lo guarda el usuario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanData {
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub organizer_settings: OrganizerSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlanData {
    pub fn course(&self, code: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.code == code)
    }

    /// Sección marcada como `selected` para un curso, si existe
    pub fn selected_section(&self, code: &str) -> Option<&Section> {
        self.course(code)?.sections.iter().find(|s| s.selected)
    }
}
