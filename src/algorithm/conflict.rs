// Modelo de tiempo: normaliza bloques de horario a minutos desde medianoche
// y detecta choques entre bloques del mismo día.
use chrono::{DateTime, NaiveDateTime, NaiveTime, Timelike};
use tracing::{debug, warn};

use crate::models::{Event, MeetingTime};

/// 60 minutos * 24 horas
pub const MINUTES_PER_DAY: u16 = 1440;
pub const DAYS_PER_WEEK: usize = 7;

/// Convierte el código de día (esquema U M T W R F S) a índice, 0 = domingo.
/// Un símbolo desconocido devuelve `None` y el bloque no participa en choques.
pub fn day_to_index(day: &str) -> Option<usize> {
    match day.trim() {
        "U" => Some(0),
        "M" => Some(1),
        "T" => Some(2),
        "W" => Some(3),
        "R" => Some(4),
        "F" => Some(5),
        "S" => Some(6),
        _ => None,
    }
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];
const TIME_FORMATS: [&str; 5] = ["%H:%M:%S%.f", "%H:%M", "%I:%M %p", "%I:%M%p", "%I:%M:%S %p"];

fn minutes_of<T: Timelike>(t: &T) -> u16 {
    (t.hour() * 60 + t.minute()) as u16
}

/// Minutos desde medianoche para un campo de hora. Acepta ISO-8601
/// ("1970-01-01T09:30:00.000Z") o reloj de pared ("09:30", "9:30 AM").
/// La zona horaria se ignora: se toman la hora y el minuto tal como vienen escritos.
pub fn normalize_time(raw: &str) -> Option<u16> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(minutes_of(&dt));
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(minutes_of(&dt));
        }
    }
    let upper = s.to_uppercase();
    for fmt in TIME_FORMATS {
        if let Ok(t) = NaiveTime::parse_from_str(&upper, fmt) {
            return Some(minutes_of(&t));
        }
    }
    None
}

/// Bloque normalizado: intervalo semiabierto [start, end) en un día.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub day: usize,
    pub start: u16,
    pub end: u16,
}

impl Slot {
    pub fn new(day: usize, start: u16, end: u16) -> Slot {
        Slot { day, start, end }
    }

    /// Normaliza un `MeetingTime`. Devuelve `None` si el día no es válido,
    /// si alguna hora no se puede leer o si el intervalo es vacío.
    pub fn from_meeting(meeting: &MeetingTime) -> Option<Slot> {
        let Some(day) = day_to_index(&meeting.day) else {
            debug!(day = %meeting.day, "día desconocido, bloque excluido de choques");
            return None;
        };
        let (Some(start), Some(end)) = (normalize_time(&meeting.start_time), normalize_time(&meeting.end_time)) else {
            warn!(start = %meeting.start_time, end = %meeting.end_time, "hora ilegible, bloque excluido de choques");
            return None;
        };
        if start >= end {
            warn!(start, end, "bloque con inicio >= fin, excluido de choques");
            return None;
        }
        Some(Slot { day, start, end })
    }

    /// Mismo día y `a.start < b.end && b.start < a.end`; los bordes que se tocan no chocan.
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.day == other.day && self.start < other.end && other.start < self.end
    }

    pub fn duration(&self) -> u16 {
        self.end - self.start
    }
}

pub fn overlaps(a: &Slot, b: &Slot) -> bool {
    a.overlaps(b)
}

/// True si algún par de bloques choca (comparación todos contra todos)
pub fn slots_conflict(slots: &[Slot]) -> bool {
    for (i, a) in slots.iter().enumerate() {
        for b in &slots[i + 1..] {
            if a.overlaps(b) {
                return true;
            }
        }
    }
    false
}

/// Evento fijo del estudiante ya normalizado.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBlock {
    pub days: Vec<usize>,
    pub start: u16,
    pub end: u16,
}

impl EventBlock {
    pub fn from_event(event: &Event) -> Option<EventBlock> {
        let (Some(start), Some(end)) = (normalize_time(&event.start_time), normalize_time(&event.end_time)) else {
            warn!(start = %event.start_time, end = %event.end_time, "evento con hora ilegible, se ignora");
            return None;
        };
        let days = event
            .days_of_week
            .iter()
            .filter_map(|d| usize::try_from(*d).ok())
            .filter(|d| *d < DAYS_PER_WEEK)
            .collect();
        Some(EventBlock { days, start, end })
    }

    pub fn blocks(&self, slot: &Slot) -> bool {
        self.days.iter().any(|d| slot.overlaps(&Slot::new(*d, self.start, self.end)))
    }
}
