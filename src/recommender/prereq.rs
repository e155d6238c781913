//! Evaluación de árboles de prerequisitos contra los ramos aprobados.

use tracing::debug;

use crate::models::{PrereqTree, Requisite};
use crate::recommender::PrereqSource;

/// Variable especial: electivo de historia/humanidades nivel 200
pub const GER200: &str = "$GER200";

/// Prefijos de asignatura que cuentan para `$GER200`
pub const GER200_SUBJECTS: [&str; 9] = ["COM", "LIT", "PHIL", "PSY", "STS", "THTR", "HIST", "R510", "R512"];

/// True si el ramo ("PHIL 334") es de una asignatura de la lista y su número
/// empieza con un dígito >= 2.
fn counts_for_ger200(course: &str) -> bool {
    let mut parts = course.split_whitespace();
    let (Some(subject), Some(number)) = (parts.next(), parts.next()) else {
        return false;
    };
    let level = number.chars().next().and_then(|c| c.to_digit(10));
    GER200_SUBJECTS.contains(&subject) && level.is_some_and(|d| d >= 2)
}

pub fn handle_prereq(requisite: &Requisite, completed: &[String]) -> bool {
    match requisite {
        Requisite::Course(code) => completed.iter().any(|c| c == code),
        // TODO: validar correquisitos contra los ramos inscritos del semestre en curso
        Requisite::Corequisite(_) => true,
        Requisite::Variable(name) => name == GER200 && completed.iter().any(|c| counts_for_ger200(c)),
    }
}

/// AND corta en el primer hijo que falla; OR corta en el primero que se cumple.
/// Un árbol vacío se cumple.
pub fn check_prereq_tree(tree: &PrereqTree, completed: &[String]) -> bool {
    match tree {
        PrereqTree::Empty => true,
        PrereqTree::Leaf(requisite) => handle_prereq(requisite, completed),
        PrereqTree::All(children) => children.iter().all(|c| check_prereq_tree(c, completed)),
        PrereqTree::Any(children) => children.iter().any(|c| check_prereq_tree(c, completed)),
    }
}

/// Busca el árbol del ramo y lo evalúa. Sin datos se asume cumplido.
pub fn validate_prereqs<P: PrereqSource + ?Sized>(source: &P, course: &str, completed: &[String]) -> bool {
    match source.prereq_tree(course) {
        Some(tree) => check_prereq_tree(&tree, completed),
        None => {
            debug!(course, "sin prerequisitos registrados, se asume cumplido");
            true
        }
    }
}
