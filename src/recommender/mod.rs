// Recomendador de ramos según la malla curricular.
//
// FASE 1: build_tree  -> resuelve $COND, quita legacy y ramos sin prerequisitos
// FASE 2: filter_tree -> consume los ramos aprobados contra el árbol
pub mod build;
pub mod filter;
pub mod prereq;

use std::collections::HashMap;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::PlannerError;
use crate::models::{CurriculumNode, PrereqTree, RequirementNode};

pub use build::{build_tree, evaluate_condition, parse_condition};
pub use filter::{filter_tree, match_wildcard, wildcard_regex};
pub use prereq::{check_prereq_tree, handle_prereq, validate_prereqs};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub degree: Option<String>,
    pub major: Option<String>,
    pub year: Option<String>,
    pub taken_courses: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CurriculumKey {
    pub year: String,
    pub major: String,
    pub degree: String,
}

impl CurriculumKey {
    pub fn new(year: &str, major: &str, degree: &str) -> Self {
        CurriculumKey { year: year.to_string(), major: major.to_string(), degree: degree.to_string() }
    }
}

/// Fuente de mallas por (año, carrera, grado)
pub trait CurriculumSource {
    fn curriculum(&self, key: &CurriculumKey) -> Option<Vec<CurriculumNode>>;
}

/// Fuente de árboles de prerequisitos por código de ramo
pub trait PrereqSource {
    fn prereq_tree(&self, course: &str) -> Option<PrereqTree>;
}

/// Documento de malla tal como se guarda en la colección de currículos
#[derive(Debug, Deserialize)]
struct CurriculumDocument {
    #[serde(rename = "YEAR")]
    year: String,
    #[serde(rename = "MAJOR")]
    major: String,
    #[serde(rename = "DEGREE")]
    degree: String,
    #[serde(rename = "CLASSES", default)]
    classes: Vec<CurriculumNode>,
}

/// Documento estático de un ramo; solo interesa el árbol de prerequisitos
#[derive(Debug, Deserialize)]
struct CourseStaticDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    tree: PrereqTree,
}

/// Catálogo en memoria que sirve de ambas fuentes.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    curricula: HashMap<CurriculumKey, Vec<CurriculumNode>>,
    prereqs: HashMap<String, PrereqTree>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Carga desde JSON: un arreglo de mallas (`YEAR`, `MAJOR`, `DEGREE`, `CLASSES`)
    /// y un arreglo de ramos estáticos (`_id`, `tree`).
    pub fn from_json(curricula_json: &str, courses_json: &str) -> Result<Catalog, PlannerError> {
        let curricula: Vec<CurriculumDocument> = serde_json::from_str(curricula_json)?;
        let courses: Vec<CourseStaticDocument> = serde_json::from_str(courses_json)?;

        let mut catalog = Catalog::new();
        for doc in curricula {
            catalog.insert_curriculum(CurriculumKey { year: doc.year, major: doc.major, degree: doc.degree }, doc.classes);
        }
        for doc in courses {
            catalog.insert_prereqs(&doc.id, doc.tree);
        }
        info!(curricula = catalog.curricula.len(), courses = catalog.prereqs.len(), "catálogo cargado");
        Ok(catalog)
    }

    pub fn insert_curriculum(&mut self, key: CurriculumKey, classes: Vec<CurriculumNode>) {
        if self.curricula.insert(key.clone(), classes).is_some() {
            warn!(year = %key.year, major = %key.major, degree = %key.degree, "malla duplicada, se reemplaza");
        }
    }

    pub fn insert_prereqs(&mut self, course: &str, tree: PrereqTree) {
        self.prereqs.insert(course.to_string(), tree);
    }
}

impl CurriculumSource for Catalog {
    fn curriculum(&self, key: &CurriculumKey) -> Option<Vec<CurriculumNode>> {
        self.curricula.get(key).cloned()
    }
}

impl PrereqSource for Catalog {
    fn prereq_tree(&self, course: &str) -> Option<PrereqTree> {
        self.prereqs.get(course).cloned()
    }
}

/// Un parámetro vacío cuenta como ausente
fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, PlannerError> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(PlannerError::MissingParameter(name)),
    }
}

/// Árbol de requisitos pendientes para el alumno. La lista de ramos del
/// request no se modifica; el filtrado consume una copia.
pub fn recommend_classes<C, P>(request: &RecommendRequest, curricula: &C, prereqs: &P) -> Result<Vec<RequirementNode>, PlannerError>
where
    C: CurriculumSource + ?Sized,
    P: PrereqSource + ?Sized,
{
    let start = Instant::now();

    let degree = required(&request.degree, "degree")?;
    let major = required(&request.major, "major")?;
    let year = required(&request.year, "year")?;
    let taken = request.taken_courses.as_ref().ok_or(PlannerError::MissingParameter("courses"))?;

    let key = CurriculumKey::new(year, major, degree);
    let classes = curricula.curriculum(&key).ok_or_else(|| PlannerError::CurriculumNotFound {
        year: key.year.clone(),
        major: key.major.clone(),
        degree: key.degree.clone(),
    })?;

    // FASE 1
    let built = build_tree(&classes, taken, prereqs);

    // FASE 2
    let mut remaining = taken.clone();
    let recommendations = filter_tree(built, &mut remaining);

    info!(
        major,
        year,
        pending = recommendations.len(),
        unused = remaining.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "recomendación terminada"
    );
    Ok(recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.insert_curriculum(
            CurriculumKey::new("2022", "CS", "BS"),
            CurriculumNode::list_from_value(&json!([
                { "name": "Intro", "course": "CS 100" },
                { "name": "Data Structures", "course": "CS 114" }
            ])),
        );
        catalog.insert_prereqs("CS 114", PrereqTree::from_value(&json!(["&", "CS 100"])));
        catalog
    }

    fn request(taken: &[&str]) -> RecommendRequest {
        RecommendRequest {
            degree: Some("BS".to_string()),
            major: Some("CS".to_string()),
            year: Some("2022".to_string()),
            taken_courses: Some(taken.iter().map(|s| s.to_string()).collect()),
        }
    }

    #[test]
    fn test_prereq_gates_recommendation() {
        let catalog = catalog();
        let none = recommend_classes(&request(&[]), &catalog, &catalog).expect("recommend");
        let courses: Vec<&str> = none.iter().filter_map(|n| n.course()).collect();
        assert_eq!(courses, vec!["CS 100"]);

        let after_intro = recommend_classes(&request(&["CS 100"]), &catalog, &catalog).expect("recommend");
        let courses: Vec<&str> = after_intro.iter().filter_map(|n| n.course()).collect();
        assert_eq!(courses, vec!["CS 114"]);
    }

    #[test]
    fn test_parameters_validated_in_order() {
        let catalog = catalog();
        let mut req = RecommendRequest::default();
        let err = recommend_classes(&req, &catalog, &catalog).unwrap_err();
        assert!(matches!(err, PlannerError::MissingParameter("degree")));

        req.degree = Some("BS".to_string());
        req.major = Some(String::new());
        let err = recommend_classes(&req, &catalog, &catalog).unwrap_err();
        assert!(matches!(err, PlannerError::MissingParameter("major")));

        req.major = Some("CS".to_string());
        req.year = Some("2022".to_string());
        let err = recommend_classes(&req, &catalog, &catalog).unwrap_err();
        assert!(matches!(err, PlannerError::MissingParameter("courses")));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_unknown_curriculum() {
        let catalog = catalog();
        let mut req = request(&[]);
        req.year = Some("1999".to_string());
        let err = recommend_classes(&req, &catalog, &catalog).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataNotFound);
    }

    #[test]
    fn test_request_is_not_mutated() {
        let catalog = catalog();
        let req = request(&["CS 100"]);
        let before = req.taken_courses.clone();
        recommend_classes(&req, &catalog, &catalog).expect("recommend");
        assert_eq!(req.taken_courses, before);
    }
}
