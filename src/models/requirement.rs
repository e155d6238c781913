//! Tipos del recomendador: árbol crudo de malla, árbol de prerequisitos,
//! condiciones `$COND` y el árbol de recomendación resultante.
//!
//! El formato de origen es JSON heterogéneo (objetos para ramos, arreglos
//! para grupos y condicionales). Se clasifica una sola vez al parsear, de
//! modo que el resto del código hace `match` sobre variantes explícitas.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Marcador de ramo comodín, p.ej. "CS 3@"
pub const WILDCARD_MARKER: char = '@';
/// Primer elemento de un nodo condicional
pub const COND_MARKER: &str = "$COND";

// ---------------------------------------------------------------------------
// Prerequisitos
// ---------------------------------------------------------------------------

/// Hoja de un árbol de prerequisitos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requisite {
    /// Ramo concreto, "CS 100"
    Course(String),
    /// Correquisito (contiene '-'); hoy siempre se considera cumplido
    Corequisite(String),
    /// Variable especial con prefijo '$', p.ej. "$GER200"
    Variable(String),
}

impl Requisite {
    pub fn parse(raw: &str) -> Requisite {
        if raw.contains('-') {
            Requisite::Corequisite(raw.to_string())
        } else if raw.contains('$') {
            Requisite::Variable(raw.to_string())
        } else {
            Requisite::Course(raw.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub enum PrereqTree {
    /// Sin datos: se cumple siempre
    Empty,
    Leaf(Requisite),
    All(Vec<PrereqTree>),
    Any(Vec<PrereqTree>),
}

impl Default for PrereqTree {
    fn default() -> Self {
        PrereqTree::Empty
    }
}

impl From<Value> for PrereqTree {
    fn from(v: Value) -> Self {
        PrereqTree::from_value(&v)
    }
}

impl PrereqTree {
    /// Formato anidado: `["&", "CS 100", ["|", "MATH 111", "MATH 113"]]`.
    /// El primer elemento es el operador: "&" es AND, cualquier otro valor es OR.
    pub fn from_value(v: &Value) -> PrereqTree {
        match v {
            Value::String(s) => PrereqTree::Leaf(Requisite::parse(s)),
            Value::Array(items) if !items.is_empty() => {
                let children: Vec<PrereqTree> = items[1..].iter().map(PrereqTree::from_value).collect();
                if items[0].as_str() == Some("&") {
                    PrereqTree::All(children)
                } else {
                    PrereqTree::Any(children)
                }
            }
            _ => PrereqTree::Empty,
        }
    }
}

// ---------------------------------------------------------------------------
// Condiciones $COND
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// "<RAMO> WAS FOUND|PASSED"; el ramo se guarda sin espacios
    Taken(String),
    All(Vec<Condition>),
    Any(Vec<Condition>),
    /// Forma no reconocida: siempre falsa
    Never,
}

fn condition_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(.*) WAS (FOUND|PASSED)").expect("condition pattern is valid"))
}

/// Quita todos los espacios ("CS 100" -> "CS100")
pub fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

impl Condition {
    pub fn from_value(v: &Value) -> Condition {
        match v {
            Value::String(s) => match condition_pattern().captures(s) {
                Some(caps) => Condition::Taken(strip_whitespace(&caps[1])),
                None => Condition::Never,
            },
            Value::Array(items) if !items.is_empty() => {
                let operands = items[1..].iter().map(Condition::from_value).collect();
                match items[0].as_str() {
                    Some("&") => Condition::All(operands),
                    Some("|") => Condition::Any(operands),
                    _ => Condition::Never,
                }
            }
            _ => Condition::Never,
        }
    }
}

// ---------------------------------------------------------------------------
// Malla cruda
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub operator: String,
    pub num_classes: i64,
    pub num_credits: i64,
    pub name: String,
    pub children: Vec<CurriculumNode>,
}

/// Nodo de la malla tal como viene de la base de datos, ya clasificado.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum CurriculumNode {
    Class {
        name: String,
        course: String,
        legacy: bool,
    },
    /// `["$COND", cond1, rama1, cond2, rama2, ..., rama_else]`
    Conditional {
        arms: Vec<(Condition, Vec<CurriculumNode>)>,
        otherwise: Vec<CurriculumNode>,
    },
    /// `[operador, numClases, numCreditos, etiqueta, ...hijos]`
    Group(GroupNode),
    /// Forma desconocida; se descarta al construir
    Unknown,
}

impl From<Value> for CurriculumNode {
    fn from(v: Value) -> Self {
        CurriculumNode::from_value(&v)
    }
}

fn as_count(v: Option<&Value>) -> i64 {
    match v {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

impl CurriculumNode {
    pub fn from_value(v: &Value) -> CurriculumNode {
        match v {
            Value::Object(obj) if obj.contains_key("name") => CurriculumNode::Class {
                name: obj.get("name").and_then(Value::as_str).unwrap_or_default().to_string(),
                course: obj.get("course").and_then(Value::as_str).unwrap_or_default().to_string(),
                legacy: obj.get("legacy").and_then(Value::as_bool).unwrap_or(false),
            },
            Value::Array(items) if items.first().and_then(Value::as_str) == Some(COND_MARKER) => {
                let last = items.len() - 1;
                let mut arms = Vec::new();
                let mut i = 1;
                while i < last {
                    arms.push((Condition::from_value(&items[i]), CurriculumNode::list_from_value(&items[i + 1])));
                    i += 2;
                }
                CurriculumNode::Conditional {
                    arms,
                    otherwise: CurriculumNode::list_from_value(&items[last]),
                }
            }
            Value::Array(items) => match items.first().and_then(Value::as_str) {
                Some(op) if !op.is_empty() => CurriculumNode::Group(GroupNode {
                    operator: op.to_string(),
                    num_classes: as_count(items.get(1)),
                    num_credits: as_count(items.get(2)),
                    name: items.get(3).and_then(Value::as_str).unwrap_or_default().to_string(),
                    children: items.iter().skip(4).map(CurriculumNode::from_value).collect(),
                }),
                _ => CurriculumNode::Unknown,
            },
            _ => CurriculumNode::Unknown,
        }
    }

    /// Lista de nodos (ramas de un `$COND`, o la raíz de una malla)
    pub fn list_from_value(v: &Value) -> Vec<CurriculumNode> {
        match v {
            Value::Array(items) => items.iter().map(CurriculumNode::from_value).collect(),
            _ => Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Árbol de recomendación
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchOperator {
    #[serde(rename = "&")]
    And,
    #[serde(rename = "|")]
    Or,
}

impl BranchOperator {
    pub fn parse(op: &str) -> BranchOperator {
        if op == "&" { BranchOperator::And } else { BranchOperator::Or }
    }
}

/// Nodo del árbol que se devuelve al estudiante.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum RequirementNode {
    Class {
        name: String,
        course: String,
        #[serde(default)]
        legacy: bool,
    },
    /// Acumula cuántos ramos/créditos ya absorbió el comodín
    Wildcard {
        name: String,
        course: String,
        #[serde(default)]
        legacy: bool,
        #[serde(default)]
        courses: i64,
        #[serde(default)]
        credits: i64,
    },
    Branch {
        name: String,
        operator: BranchOperator,
        #[serde(rename = "numClasses", default)]
        num_classes: i64,
        #[serde(rename = "numCredits", default)]
        num_credits: i64,
        classes: Vec<RequirementNode>,
    },
}

impl RequirementNode {
    pub fn course(&self) -> Option<&str> {
        match self {
            RequirementNode::Class { course, .. } | RequirementNode::Wildcard { course, .. } => Some(course),
            RequirementNode::Branch { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prereq_tree_shapes() {
        let t = PrereqTree::from_value(&json!(["&", "CS 100", ["|", "MATH 111", "MATH 113"]]));
        match t {
            PrereqTree::All(children) => {
                assert_eq!(children.len(), 2);
                assert!(matches!(children[1], PrereqTree::Any(_)));
            }
            other => panic!("expected AND node, got {:?}", other),
        }
        assert_eq!(PrereqTree::from_value(&Value::Null), PrereqTree::Empty);
        assert_eq!(PrereqTree::from_value(&json!([])), PrereqTree::Empty);
        assert_eq!(
            PrereqTree::from_value(&json!("CS 114-CO")),
            PrereqTree::Leaf(Requisite::Corequisite("CS 114-CO".to_string()))
        );
    }

    #[test]
    fn test_condition_parsing() {
        assert_eq!(Condition::from_value(&json!("CS 100 WAS PASSED")), Condition::Taken("CS100".to_string()));
        assert_eq!(Condition::from_value(&json!("garbage")), Condition::Never);
        assert_eq!(Condition::from_value(&json!(["^", "A WAS FOUND", "B WAS FOUND"])), Condition::Never);
        assert!(matches!(Condition::from_value(&json!(["|", "A WAS FOUND", "B WAS FOUND"])), Condition::Any(v) if v.len() == 2));
    }

    #[test]
    fn test_curriculum_node_classification() {
        let raw = json!([
            { "name": "Intro to CS", "course": "CS 100" },
            ["$COND", "MATH 111 WAS PASSED", [{ "name": "Calc II", "course": "MATH 112" }], [{ "name": "Calc I", "course": "MATH 111" }]],
            ["|", 2, 0, "Electives", { "name": "A", "course": "CS 301" }, { "name": "B", "course": "CS 3@" }],
            42
        ]);
        let nodes = CurriculumNode::list_from_value(&raw);
        assert!(matches!(nodes[0], CurriculumNode::Class { ref course, legacy: false, .. } if course == "CS 100"));
        match &nodes[1] {
            CurriculumNode::Conditional { arms, otherwise } => {
                assert_eq!(arms.len(), 1);
                assert_eq!(otherwise.len(), 1);
            }
            other => panic!("expected conditional, got {:?}", other),
        }
        match &nodes[2] {
            CurriculumNode::Group(g) => {
                assert_eq!(g.operator, "|");
                assert_eq!(g.num_classes, 2);
                assert_eq!(g.name, "Electives");
                assert_eq!(g.children.len(), 2);
            }
            other => panic!("expected group, got {:?}", other),
        }
        assert_eq!(nodes[3], CurriculumNode::Unknown);
    }

    #[test]
    fn test_requirement_node_serializes_with_type_tag() {
        let node = RequirementNode::Branch {
            name: "Core".to_string(),
            operator: BranchOperator::Or,
            num_classes: 1,
            num_credits: 0,
            classes: vec![RequirementNode::Wildcard {
                name: "Any 300".to_string(),
                course: "CS 3@".to_string(),
                legacy: false,
                courses: 0,
                credits: 0,
            }],
        };
        let v = serde_json::to_value(&node).expect("serialize");
        assert_eq!(v["type"], json!("BRANCH"));
        assert_eq!(v["operator"], json!("|"));
        assert_eq!(v["numClasses"], json!(1));
        assert_eq!(v["classes"][0]["type"], json!("WILDCARD"));
    }
}
