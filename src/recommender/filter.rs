// Fase de filtrado: quita del árbol lo que el alumno ya cumplió.
//
// Cada ramo aprobado se consume a lo más una vez: al satisfacer un nodo se
// saca de `taken`, así un mismo ramo no cuenta para dos requisitos.
use regex::Regex;
use tracing::debug;

use crate::models::requirement::WILDCARD_MARKER;
use crate::models::{BranchOperator, RequirementNode};

/// Créditos que aporta un ramo cuando el grupo se mide en créditos
pub const CREDITS_PER_COURSE: i64 = 3;

/// "CS 3@" -> `^CS 3(.*)`. Lo literal se escapa; el patrón se ancla al inicio.
pub fn wildcard_regex(pattern: &str) -> Option<Regex> {
    let body = pattern
        .split(WILDCARD_MARKER)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("(.*)");
    Regex::new(&format!("^{}", body)).ok()
}

/// Posición del primer ramo aprobado que calza con el comodín
pub fn match_wildcard(pattern: &str, taken: &[String]) -> Option<usize> {
    let re = wildcard_regex(pattern)?;
    taken.iter().position(|course| re.is_match(course))
}

pub fn filter_tree(nodes: Vec<RequirementNode>, taken: &mut Vec<String>) -> Vec<RequirementNode> {
    nodes.into_iter().flat_map(|node| filter_node(node, taken)).collect()
}

fn filter_node(node: RequirementNode, taken: &mut Vec<String>) -> Vec<RequirementNode> {
    match node {
        RequirementNode::Class { ref course, .. } => match taken.iter().position(|t| t == course) {
            Some(pos) => {
                taken.remove(pos);
                Vec::new()
            }
            None => vec![node],
        },
        RequirementNode::Wildcard { name, course, legacy, courses, credits } => match match_wildcard(&course, taken) {
            Some(pos) => {
                let absorbed = taken.remove(pos);
                debug!(wildcard = %course, absorbed = %absorbed, "comodín absorbe ramo");
                vec![RequirementNode::Wildcard {
                    name,
                    course,
                    legacy,
                    courses: courses + 1,
                    credits: credits + CREDITS_PER_COURSE,
                }]
            }
            None => vec![RequirementNode::Wildcard { name, course, legacy, courses, credits }],
        },
        RequirementNode::Branch { name, operator: BranchOperator::And, num_classes, num_credits, classes } => {
            let classes = filter_tree(classes, taken);
            if classes.is_empty() {
                return Vec::new();
            }
            vec![RequirementNode::Branch { name, operator: BranchOperator::And, num_classes, num_credits, classes }]
        }
        RequirementNode::Branch { name, operator: BranchOperator::Or, num_classes, num_credits, classes } => {
            filter_or_branch(name, num_classes, num_credits, classes, taken)
        }
    }
}

/// Resultado de aplicar un hijo satisfecho (o un comodín con ramos) al contador
enum Progress {
    Pending,
    Satisfied,
}

struct OrCounter {
    by_classes: bool,
    by_credits: bool,
    classes: i64,
    credits: i64,
}

impl OrCounter {
    fn new(num_classes: i64, num_credits: i64) -> Self {
        OrCounter {
            by_classes: num_classes > 0,
            by_credits: num_credits > 0,
            classes: num_classes,
            credits: num_credits,
        }
    }

    fn state(&self) -> (i64, i64) {
        (self.classes, self.credits)
    }

    /// Descuenta `classes` del contador de ramos, o `credits` del de créditos.
    /// Sin contadores el grupo se cumple con cualquier avance.
    fn consume(&mut self, classes: i64, credits: i64) -> Progress {
        if self.by_classes {
            self.classes -= classes;
            if self.classes <= 0 {
                return Progress::Satisfied;
            }
        } else if self.by_credits {
            self.credits -= credits;
            if self.credits <= 0 {
                return Progress::Satisfied;
            }
        } else {
            return Progress::Satisfied;
        }
        Progress::Pending
    }
}

// Cada pasada trabaja sobre los hijos que sobrevivieron la pasada anterior.
// Se repite mientras los contadores sigan bajando.
fn filter_or_branch(
    name: String,
    num_classes: i64,
    num_credits: i64,
    classes: Vec<RequirementNode>,
    taken: &mut Vec<String>,
) -> Vec<RequirementNode> {
    let mut counter = OrCounter::new(num_classes, num_credits);
    let mut children = classes;

    loop {
        let before = counter.state();
        let mut survivors = Vec::with_capacity(children.len());

        for child in children {
            let subset = filter_node(child, taken);
            if subset.is_empty() {
                if let Progress::Satisfied = counter.consume(1, CREDITS_PER_COURSE) {
                    debug!(group = %name, "grupo OR cumplido");
                    return Vec::new();
                }
                continue;
            }

            for node in subset {
                match node {
                    RequirementNode::Wildcard { name: label, course, legacy, courses, credits } => {
                        if courses > 0 || credits > 0 {
                            if let Progress::Satisfied = counter.consume(courses, credits) {
                                debug!(group = %name, "grupo OR cumplido por comodín");
                                return Vec::new();
                            }
                        }
                        // El avance ya quedó en el contador del grupo
                        survivors.push(RequirementNode::Wildcard { name: label, course, legacy, courses: 0, credits: 0 });
                    }
                    other => survivors.push(other),
                }
            }
        }

        children = survivors;
        if counter.state() == before {
            break;
        }
    }

    vec![RequirementNode::Branch {
        name,
        operator: BranchOperator::Or,
        num_classes: counter.classes,
        num_credits: counter.credits,
        classes: children,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn taken(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn tree(v: serde_json::Value) -> Vec<RequirementNode> {
        serde_json::from_value(v).expect("requirement tree")
    }

    #[test]
    fn test_wildcard_regex() {
        let re = wildcard_regex("CS 3@").expect("regex");
        assert!(re.is_match("CS 301"));
        assert!(!re.is_match("CS 280"));
        assert!(!re.is_match("XCS 301"));
        let dotted = wildcard_regex("R.1@").expect("regex");
        assert!(dotted.is_match("R.101"));
        assert!(!dotted.is_match("RX101"));
        assert_eq!(match_wildcard("@", &taken(&["ANY 1"])), Some(0));
    }

    #[test]
    fn test_taken_class_is_consumed_once() {
        let nodes = tree(json!([
            { "type": "CLASS", "name": "Intro", "course": "CS 100" },
            { "type": "CLASS", "name": "Intro again", "course": "CS 100" }
        ]));
        let mut remaining = taken(&["CS 100"]);
        let out = filter_tree(nodes, &mut remaining);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].course(), Some("CS 100"));
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_and_branch_dropped_when_complete() {
        let nodes = tree(json!([
            { "type": "BRANCH", "name": "Core", "operator": "&", "numClasses": 0, "numCredits": 0, "classes": [
                { "type": "CLASS", "name": "A", "course": "CS 100" },
                { "type": "CLASS", "name": "B", "course": "CS 114" }
            ]}
        ]));
        let mut remaining = taken(&["CS 100"]);
        let partial = filter_tree(nodes.clone(), &mut remaining);
        match &partial[0] {
            RequirementNode::Branch { classes, .. } => assert_eq!(classes.len(), 1),
            other => panic!("expected branch, got {:?}", other),
        }

        let mut remaining = taken(&["CS 114", "CS 100"]);
        assert!(filter_tree(nodes, &mut remaining).is_empty());
    }

    #[test]
    fn test_or_branch_with_class_count() {
        let nodes = tree(json!([
            { "type": "BRANCH", "name": "Pick two", "operator": "|", "numClasses": 2, "numCredits": 0, "classes": [
                { "type": "CLASS", "name": "A", "course": "CS 301" },
                { "type": "CLASS", "name": "B", "course": "CS 302" },
                { "type": "CLASS", "name": "C", "course": "CS 303" }
            ]}
        ]));
        let mut remaining = taken(&["CS 301", "CS 303"]);
        assert!(filter_tree(nodes.clone(), &mut remaining).is_empty());

        let mut remaining = taken(&["CS 302"]);
        let out = filter_tree(nodes, &mut remaining);
        match &out[0] {
            RequirementNode::Branch { num_classes, classes, .. } => {
                assert_eq!(*num_classes, 1);
                let courses: Vec<&str> = classes.iter().filter_map(|c| c.course()).collect();
                assert_eq!(courses, vec!["CS 301", "CS 303"]);
            }
            other => panic!("expected branch, got {:?}", other),
        }
    }

    #[test]
    fn test_or_branch_without_counts_satisfied_by_one_child() {
        let nodes = tree(json!([
            { "type": "BRANCH", "name": "Either", "operator": "|", "classes": [
                { "type": "CLASS", "name": "A", "course": "MATH 111" },
                { "type": "CLASS", "name": "B", "course": "MATH 132" }
            ]}
        ]));
        let mut remaining = taken(&["MATH 132"]);
        assert!(filter_tree(nodes, &mut remaining).is_empty());
    }

    #[test]
    fn test_or_branch_credits_with_wildcard() {
        let nodes = tree(json!([
            { "type": "BRANCH", "name": "Electives", "operator": "|", "numClasses": 0, "numCredits": 9, "classes": [
                { "type": "WILDCARD", "name": "Any CS 3xx", "course": "CS 3@" }
            ]}
        ]));
        let mut remaining = taken(&["CS 301", "CS 350", "MATH 111"]);
        let out = filter_tree(nodes, &mut remaining);
        match &out[0] {
            RequirementNode::Branch { num_credits, classes, .. } => {
                assert_eq!(*num_credits, 3);
                assert!(matches!(classes[0], RequirementNode::Wildcard { courses: 0, credits: 0, .. }));
            }
            other => panic!("expected branch, got {:?}", other),
        }
        assert_eq!(remaining, taken(&["MATH 111"]));
    }

    #[test]
    fn test_top_level_wildcard_counts_absorbed_courses() {
        let nodes = tree(json!([{ "type": "WILDCARD", "name": "Humanities", "course": "HUM @" }]));
        let mut remaining = taken(&["HUM 101", "CS 100"]);
        let out = filter_tree(nodes, &mut remaining);
        assert!(matches!(out[0], RequirementNode::Wildcard { courses: 1, credits: 3, .. }));
        assert_eq!(remaining, taken(&["CS 100"]));
    }

    #[test]
    fn test_course_not_double_counted_across_groups() {
        let nodes = tree(json!([
            { "type": "BRANCH", "name": "First", "operator": "|", "numClasses": 1, "classes": [
                { "type": "CLASS", "name": "A", "course": "CS 301" }
            ]},
            { "type": "BRANCH", "name": "Second", "operator": "|", "numClasses": 1, "classes": [
                { "type": "CLASS", "name": "A", "course": "CS 301" }
            ]}
        ]));
        let mut remaining = taken(&["CS 301"]);
        let out = filter_tree(nodes, &mut remaining);
        assert_eq!(out.len(), 1);
        match &out[0] {
            RequirementNode::Branch { name, .. } => assert_eq!(name, "Second"),
            other => panic!("expected branch, got {:?}", other),
        }
    }
}
