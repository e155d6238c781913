// Fase de construcción: convierte la malla cruda en árbol de recomendación.
// Resuelve los `$COND`, descarta ramos legacy y ramos con prerequisitos
// pendientes, y elimina grupos que quedaron vacíos.
use serde_json::Value;
use tracing::debug;

use crate::models::requirement::{strip_whitespace, WILDCARD_MARKER};
use crate::models::{BranchOperator, Condition, CurriculumNode, RequirementNode};
use crate::recommender::prereq::validate_prereqs;
use crate::recommender::PrereqSource;

/// Evalúa una condición contra los ramos aprobados. La comparación ignora
/// espacios porque las condiciones vienen escritas como "CS100".
pub fn evaluate_condition(condition: &Condition, completed: &[String]) -> bool {
    match condition {
        Condition::Taken(course) => completed.iter().any(|c| strip_whitespace(c) == *course),
        Condition::All(operands) => operands.iter().all(|c| evaluate_condition(c, completed)),
        Condition::Any(operands) => operands.iter().any(|c| evaluate_condition(c, completed)),
        Condition::Never => false,
    }
}

/// Atajo para condiciones en formato JSON crudo
pub fn parse_condition(raw: &Value, completed: &[String]) -> bool {
    evaluate_condition(&Condition::from_value(raw), completed)
}

pub fn build_tree<P: PrereqSource + ?Sized>(nodes: &[CurriculumNode], completed: &[String], prereqs: &P) -> Vec<RequirementNode> {
    nodes.iter().flat_map(|node| parse_tree(node, completed, prereqs)).collect()
}

fn parse_tree<P: PrereqSource + ?Sized>(node: &CurriculumNode, completed: &[String], prereqs: &P) -> Vec<RequirementNode> {
    match node {
        CurriculumNode::Class { name, course, legacy } => {
            // Los ramos ya aprobados se mantienen para quitarlos en el filtrado
            if !completed.contains(course) {
                if *legacy {
                    return Vec::new();
                }
                if !validate_prereqs(prereqs, course, completed) {
                    debug!(course = %course, "prerequisitos pendientes, no se recomienda");
                    return Vec::new();
                }
            }

            if course.contains(WILDCARD_MARKER) {
                vec![RequirementNode::Wildcard {
                    name: name.clone(),
                    course: course.clone(),
                    legacy: *legacy,
                    courses: 0,
                    credits: 0,
                }]
            } else {
                vec![RequirementNode::Class { name: name.clone(), course: course.clone(), legacy: *legacy }]
            }
        }
        CurriculumNode::Conditional { arms, otherwise } => {
            for (condition, branch) in arms {
                if evaluate_condition(condition, completed) {
                    return build_tree(branch, completed, prereqs);
                }
            }
            build_tree(otherwise, completed, prereqs)
        }
        CurriculumNode::Group(group) => {
            let classes = build_tree(&group.children, completed, prereqs);
            if classes.is_empty() {
                return Vec::new();
            }
            vec![RequirementNode::Branch {
                name: group.name.clone(),
                operator: BranchOperator::parse(&group.operator),
                num_classes: group.num_classes,
                num_credits: group.num_credits,
                classes,
            }]
        }
        CurriculumNode::Unknown => {
            debug!("nodo de malla con forma desconocida, se descarta");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::Catalog;
    use serde_json::json;

    fn taken(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_conditions() {
        let completed = taken(&["CS 100", "MATH 111"]);
        assert!(parse_condition(&json!("CS100 WAS FOUND"), &completed));
        assert!(parse_condition(&json!("MATH 111 WAS PASSED"), &completed));
        assert!(!parse_condition(&json!("CS280 WAS PASSED"), &completed));
        assert!(parse_condition(&json!(["&", "CS100 WAS FOUND", "MATH111 WAS FOUND"]), &completed));
        assert!(!parse_condition(&json!(["&", "CS100 WAS FOUND", "CS280 WAS FOUND"]), &completed));
        assert!(parse_condition(&json!(["|", "CS280 WAS FOUND", "MATH111 WAS FOUND"]), &completed));
        assert!(!parse_condition(&json!("CS100"), &completed));
    }

    #[test]
    fn test_legacy_and_prereq_pruning() {
        let mut catalog = Catalog::new();
        catalog.insert_prereqs("CS 280", crate::models::PrereqTree::from_value(&json!(["&", "CS 114"])));
        let nodes = CurriculumNode::list_from_value(&json!([
            { "name": "Old", "course": "CS 101", "legacy": true },
            { "name": "Old but taken", "course": "CS 102", "legacy": true },
            { "name": "Locked", "course": "CS 280" },
            { "name": "Unknown prereqs", "course": "CS 288" },
            { "name": "Any 300", "course": "CS 3@" }
        ]));
        let built = build_tree(&nodes, &taken(&["CS 102"]), &catalog);
        let courses: Vec<&str> = built.iter().filter_map(|n| n.course()).collect();
        assert_eq!(courses, vec!["CS 102", "CS 288", "CS 3@"]);
        assert!(matches!(built[2], RequirementNode::Wildcard { courses: 0, credits: 0, .. }));
    }

    #[test]
    fn test_completed_course_bypasses_prereqs() {
        let mut catalog = Catalog::new();
        catalog.insert_prereqs("CS 280", crate::models::PrereqTree::from_value(&json!("CS 114")));
        let nodes = CurriculumNode::list_from_value(&json!([{ "name": "Taken", "course": "CS 280" }]));
        let built = build_tree(&nodes, &taken(&["CS 280"]), &catalog);
        assert_eq!(built.len(), 1);
    }

    #[test]
    fn test_conditional_picks_first_true_branch_or_else() {
        let catalog = Catalog::new();
        let nodes = CurriculumNode::list_from_value(&json!([
            ["$COND",
                "MATH 111 WAS PASSED", [{ "name": "Calc II", "course": "MATH 112" }],
                "MATH 110 WAS PASSED", [{ "name": "Calc I", "course": "MATH 111" }],
                [{ "name": "Precalc", "course": "MATH 110" }]]
        ]));
        let first = build_tree(&nodes, &taken(&["MATH 111"]), &catalog);
        assert_eq!(first[0].course(), Some("MATH 112"));
        let second = build_tree(&nodes, &taken(&["MATH 110"]), &catalog);
        assert_eq!(second[0].course(), Some("MATH 111"));
        let otherwise = build_tree(&nodes, &[], &catalog);
        assert_eq!(otherwise[0].course(), Some("MATH 110"));
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let catalog = Catalog::new();
        let nodes = CurriculumNode::list_from_value(&json!([
            ["&", 0, 0, "Legacy only", { "name": "Old", "course": "CS 101", "legacy": true }],
            ["|", 1, 0, "Choice", { "name": "A", "course": "CS 301" }, ["&", 0, 0, "Empty", { "name": "Old", "course": "CS 102", "legacy": true }]]
        ]));
        let built = build_tree(&nodes, &[], &catalog);
        assert_eq!(built.len(), 1);
        match &built[0] {
            RequirementNode::Branch { name, operator, num_classes, classes, .. } => {
                assert_eq!(name, "Choice");
                assert_eq!(*operator, BranchOperator::Or);
                assert_eq!(*num_classes, 1);
                assert_eq!(classes.len(), 1);
            }
            other => panic!("expected branch, got {:?}", other),
        }
    }
}
