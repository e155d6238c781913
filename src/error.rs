//! Errores del planificador.
//!
//! Todos los fallos son síncronos y deterministas: repetir la llamada con la
//! misma entrada produce el mismo error, por lo que ninguno se reintenta.

use thiserror::Error;

/// Clasificación gruesa de los errores, útil para que el llamador elija el
/// código de respuesta o la sugerencia a mostrar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    FiltersTooRestrictive,
    NoValidSchedule,
    TooManyCombinations,
    DataNotFound,
}

#[derive(Debug, Error)]
pub enum PlannerError {
    /// El plan no trae cursos
    #[error("No courses selected. Please add a course to organize a schedule.")]
    NoCourses,

    /// Falta un parámetro obligatorio del recomendador (degree, major, year, courses)
    #[error("No {0} provided!")]
    MissingParameter(&'static str),

    /// Los filtros dejaron a un curso sin secciones
    #[error("Filters are too restrictive. No schedules could be made for {course}, please reduce your preferences.")]
    FiltersTooRestrictive { course: String },

    /// Ninguna combinación quedó libre de choques
    #[error("No valid schedules can be made")]
    NoValidSchedule,

    /// El espacio de combinaciones supera el techo configurado (`None` = desborda u64)
    #[error("Too many combinations to evaluate ({}), limit is {limit}", describe_total(.total))]
    TooManyCombinations { total: Option<u64>, limit: u64 },

    /// No existe malla para la clave (año, carrera, grado)
    #[error("No curricula found given the query parameters")]
    CurriculumNotFound {
        year: String,
        major: String,
        degree: String,
    },

    #[error("Invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe_total(total: &Option<u64>) -> String {
    match total {
        Some(t) => t.to_string(),
        None => "overflow".to_string(),
    }
}

impl PlannerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PlannerError::NoCourses | PlannerError::MissingParameter(_) | PlannerError::Json(_) => {
                ErrorKind::InvalidInput
            }
            PlannerError::FiltersTooRestrictive { .. } => ErrorKind::FiltersTooRestrictive,
            PlannerError::NoValidSchedule => ErrorKind::NoValidSchedule,
            PlannerError::TooManyCombinations { .. } => ErrorKind::TooManyCombinations,
            PlannerError::CurriculumNotFound { .. } => ErrorKind::DataNotFound,
        }
    }

    /// True si el error se debe a la entrada del usuario (y no a un fallo interno).
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PlannerError::Json(_))
    }
}
