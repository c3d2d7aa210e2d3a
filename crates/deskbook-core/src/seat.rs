use bitvec::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::DeskbookError;
use crate::models::FreePlace;

/// Named region of the floor plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    A,
    B,
    C,
    D,
    E,
}

/// Kind of seat a zone offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatType {
    Desk,
    Office,
    Meeting,
    Focus,
    Lounge,
}

impl Zone {
    pub const ALL: [Zone; 5] = [Zone::A, Zone::B, Zone::C, Zone::D, Zone::E];

    pub fn letter(&self) -> char {
        match self {
            Zone::A => 'A',
            Zone::B => 'B',
            Zone::C => 'C',
            Zone::D => 'D',
            Zone::E => 'E',
        }
    }

    pub fn from_letter(letter: char) -> Option<Zone> {
        Self::ALL.into_iter().find(|z| z.letter() == letter.to_ascii_uppercase())
    }

    pub fn seat_type(&self) -> SeatType {
        match self {
            Zone::A => SeatType::Desk,
            Zone::B => SeatType::Office,
            Zone::C => SeatType::Meeting,
            Zone::D => SeatType::Focus,
            Zone::E => SeatType::Lounge,
        }
    }

    /// Number of seats laid out in this zone
    pub fn capacity(&self) -> usize {
        match self {
            Zone::A => 30,
            Zone::B => 9,
            Zone::C => 8,
            Zone::D => 12,
            Zone::E => 6,
        }
    }

    /// Title shown in the seat popover
    pub fn title(&self) -> &'static str {
        match self {
            Zone::A => "Open-space desk",
            Zone::B => "Private office",
            Zone::C => "Meeting room",
            Zone::D => "Quiet-zone desk",
            Zone::E => "Lounge seat",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Zone::A => "Shared working area",
            Zone::B => "Individual office",
            Zone::C => "Room for meetings",
            Zone::D => "Area for focused work",
            Zone::E => "Comfortable area to relax",
        }
    }

    /// Static layout coordinates of the seat at 0-based `index`
    pub fn position(&self, index: usize) -> (f64, f64) {
        match self {
            Zone::A => (53.0 + (index % 6) as f64 * 25.0, 60.0 + (index / 6) as f64 * 25.0),
            Zone::B => (280.0 + (index % 3) as f64 * 50.0, 65.0 + (index / 3) as f64 * 50.0),
            Zone::C => (55.0 + (index % 4) as f64 * 40.0, 280.0 + (index / 4) as f64 * 45.0),
            Zone::D => (265.0 + (index % 6) as f64 * 27.0, 285.0 + (index / 6) as f64 * 70.0),
            Zone::E => (490.0 + (index % 2) as f64 * 55.0, 80.0 + (index / 2) as f64 * 40.0),
        }
    }

    /// Offset of the zone's first seat in the plan-wide seat order
    fn first_index(&self) -> usize {
        Self::ALL
            .iter()
            .take_while(|z| *z != self)
            .map(|z| z.capacity())
            .sum()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Zone {
    type Err = DeskbookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Zone::from_letter(c).ok_or_else(|| DeskbookError::UnknownZone(s.to_string())),
            _ => Err(DeskbookError::UnknownZone(s.to_string())),
        }
    }
}

/// Seat view-model handed to the map renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub zone: Zone,
    #[serde(rename = "type")]
    pub seat_type: SeatType,
    pub is_occupied: bool,
}

fn seat_name_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([A-Ea-e])([1-9][0-9]*)$").ok())
        .as_ref()
}

/// Split a seat name such as `B7` into its zone and 0-based index
pub fn parse_seat_name(name: &str) -> Result<(Zone, usize), DeskbookError> {
    let unknown = || DeskbookError::UnknownSeat(name.to_string());
    let caps = seat_name_pattern()
        .and_then(|re| re.captures(name.trim()))
        .ok_or_else(unknown)?;
    let zone = caps[1]
        .chars()
        .next()
        .and_then(Zone::from_letter)
        .ok_or_else(unknown)?;
    let number: usize = caps[2].parse().map_err(|_| unknown())?;
    if number > zone.capacity() {
        return Err(unknown());
    }
    Ok((zone, number - 1))
}

/// The fixed 65-seat layout with an occupancy mask
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorPlan {
    /// One bit per seat in zone order; set means occupied
    occupied: BitVec,
}

impl Default for FloorPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl FloorPlan {
    /// A plan with no free-place answer yet: every seat is occupied
    pub fn new() -> Self {
        Self {
            occupied: bitvec![1; Self::seat_count()],
        }
    }

    pub fn seat_count() -> usize {
        Zone::ALL.iter().map(|z| z.capacity()).sum()
    }

    /// Recompute occupancy from the latest free-place list.
    ///
    /// A seat is occupied iff its name does not appear in `free`; names the
    /// plan does not know are ignored.
    pub fn apply_free_places(&mut self, free: &[FreePlace]) {
        let free_names: HashSet<&str> = free.iter().map(|p| p.name.as_str()).collect();
        for zone in Zone::ALL {
            let base = zone.first_index();
            for index in 0..zone.capacity() {
                let name = format!("{}{}", zone.letter(), index + 1);
                self.occupied.set(base + index, !free_names.contains(name.as_str()));
            }
        }
    }

    /// Plan-wide bit index for a seat name
    fn slot(name: &str) -> Result<usize, DeskbookError> {
        let (zone, index) = parse_seat_name(name)?;
        Ok(zone.first_index() + index)
    }

    pub fn is_occupied(&self, name: &str) -> Result<bool, DeskbookError> {
        let slot = Self::slot(name)?;
        Ok(self.occupied[slot])
    }

    fn build_seat(&self, zone: Zone, index: usize) -> Seat {
        let name = format!("{}{}", zone.letter(), index + 1);
        let (x, y) = zone.position(index);
        Seat {
            id: name.clone(),
            name,
            x,
            y,
            zone,
            seat_type: zone.seat_type(),
            is_occupied: self.occupied[zone.first_index() + index],
        }
    }

    /// Look a seat up by name
    pub fn seat(&self, name: &str) -> Result<Seat, DeskbookError> {
        let (zone, index) = parse_seat_name(name)?;
        Ok(self.build_seat(zone, index))
    }

    /// Regenerate every seat view-model with current occupancy
    pub fn seats(&self) -> Vec<Seat> {
        Zone::ALL
            .into_iter()
            .flat_map(|zone| (0..zone.capacity()).map(move |i| (zone, i)))
            .map(|(zone, i)| self.build_seat(zone, i))
            .collect()
    }

    pub fn zone_seats(&self, zone: Zone) -> Vec<Seat> {
        (0..zone.capacity()).map(|i| self.build_seat(zone, i)).collect()
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.count_ones()
    }

    pub fn free_count(&self) -> usize {
        self.occupied.count_zeros()
    }
}
