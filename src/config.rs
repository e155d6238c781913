//! Configuración del organizador.
//!
//! Los valores por defecto sirven para pruebas y uso embebido; en despliegue
//! se pueden sobreescribir con variables de entorno (o un `.env`).

use std::env;
use std::str::FromStr;

use tracing::warn;

pub const ENV_MAX_COMBINATIONS: &str = "QUICKPLAN_MAX_COMBINATIONS";
pub const ENV_MAX_PLANS: &str = "QUICKPLAN_MAX_PLANS";
pub const ENV_WORKERS: &str = "QUICKPLAN_WORKERS";
pub const ENV_PARALLEL_THRESHOLD: &str = "QUICKPLAN_PARALLEL_THRESHOLD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizerConfig {
    /// Techo de combinaciones crudas (Π nᵢ) antes de rechazar la entrada
    pub max_combinations: u64,
    /// Cuántos planes devolver como máximo
    pub max_plans: usize,
    /// Hilos para enumerar combinaciones
    pub workers: usize,
    /// Por debajo de este número de combinaciones se enumera en el hilo actual
    pub parallel_threshold: u64,
}

impl Default for OrganizerConfig {
    fn default() -> Self {
        OrganizerConfig {
            max_combinations: 2_000_000,
            max_plans: 5,
            workers: std::cmp::max(1, num_cpus::get()),
            parallel_threshold: 4096,
        }
    }
}

// load .env if present
fn load_dotenv() {
    let _ = dotenv::dotenv();
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(key, value = %raw, "valor inválido en variable de entorno, usando el valor por defecto");
                default
            }
        },
        Err(_) => default,
    }
}

impl OrganizerConfig {
    /// Lee la configuración desde el entorno, partiendo de `Default`.
    pub fn from_env() -> Self {
        load_dotenv();
        let base = OrganizerConfig::default();
        OrganizerConfig {
            max_combinations: env_or(ENV_MAX_COMBINATIONS, base.max_combinations),
            max_plans: env_or(ENV_MAX_PLANS, base.max_plans).max(1),
            workers: env_or(ENV_WORKERS, base.workers).max(1),
            parallel_threshold: env_or(ENV_PARALLEL_THRESHOLD, base.parallel_threshold),
        }
    }
}
