use glam::{DVec2, DVec3};
use rand::Rng;

use crate::color::{generate_color, ColorCycle};
use crate::solver::{Impulse, SimConfig};

/// Id of a free slot. Contacts must not use it: lookups by this id match
/// the first free slot, not a particular contact.
pub const UNASSIGNED: i32 = -1;

/// Id reserved for the mouse. Touch ids are small non-negative platform ids.
pub const MOUSE_ID: i32 = i32::MAX;

/// Color a pointer record carries before its first `down`.
const INITIAL_COLOR: DVec3 = DVec3::new(30.0, 0.0, 300.0);

/// One tracked touch or mouse contact.
#[derive(Clone, Debug, PartialEq)]
pub struct Pointer {
    pub id: i32,
    pub texcoord: DVec2,
    pub prev_texcoord: DVec2,
    pub delta: DVec2,
    pub down: bool,
    /// Set by a move with non-zero delta; cleared when the move is splatted.
    pub moved: bool,
    pub color: DVec3,
}

impl Default for Pointer {
    fn default() -> Self {
        Self {
            id: UNASSIGNED,
            texcoord: DVec2::ZERO,
            prev_texcoord: DVec2::ZERO,
            delta: DVec2::ZERO,
            down: false,
            moved: false,
            color: INITIAL_COLOR,
        }
    }
}

/// Pointer records, recycled by id and never removed.
#[derive(Clone, Debug, Default)]
pub struct Pointers {
    pointers: Vec<Pointer>,
    colors: ColorCycle,
}

impl Pointers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pointer> {
        self.pointers.iter()
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn get(&self, id: i32) -> Option<&Pointer> {
        self.pointers.iter().find(|p| p.id == id)
    }

    /// Start a contact. Reuses the record for `id`, else a free slot,
    /// else appends a new record.
    pub fn down<R: Rng + ?Sized>(&mut self, id: i32, texcoord: DVec2, rng: &mut R) {
        let slot = match self.pointers.iter().position(|p| p.id == id) {
            Some(i) => i,
            None => match self.pointers.iter().position(|p| p.id == UNASSIGNED) {
                Some(i) => i,
                None => {
                    self.pointers.push(Pointer::default());
                    self.pointers.len() - 1
                }
            },
        };
        let pointer = &mut self.pointers[slot];
        pointer.id = id;
        pointer.down = true;
        pointer.moved = false;
        pointer.texcoord = texcoord;
        pointer.prev_texcoord = texcoord;
        pointer.delta = DVec2::ZERO;
        pointer.color = generate_color(rng);
    }

    /// Track motion of a held contact. Unknown ids and released contacts are ignored.
    pub fn move_to(&mut self, id: i32, texcoord: DVec2) {
        let Some(pointer) = self.pointers.iter_mut().find(|p| p.id == id) else {
            return;
        };
        if !pointer.down {
            return;
        }
        pointer.prev_texcoord = pointer.texcoord;
        pointer.texcoord = texcoord;
        pointer.delta = pointer.texcoord - pointer.prev_texcoord;
        pointer.moved = pointer.delta.length_squared() > 0.0;
    }

    /// End a contact and return its slot to the free pool.
    pub fn up(&mut self, id: i32) {
        if let Some(pointer) = self.pointers.iter_mut().find(|p| p.id == id) {
            pointer.down = false;
            pointer.id = UNASSIGNED;
        }
    }

    /// Collect one impulse per moved pointer and clear their `moved` flags.
    pub fn take_impulses(&mut self, splat_force: f64) -> Vec<Impulse> {
        self.pointers
            .iter_mut()
            .filter(|p| p.moved)
            .map(|p| {
                p.moved = false;
                Impulse { point: p.texcoord, velocity: p.delta * splat_force, color: p.color }
            })
            .collect()
    }

    /// Advance the color timer; on rollover give every record a fresh color.
    /// Returns whether colors were regenerated.
    pub fn update_colors<R: Rng + ?Sized>(&mut self, dt: f64, config: &SimConfig, rng: &mut R) -> bool {
        if !self.colors.advance(dt, config) {
            return false;
        }
        for pointer in self.pointers.iter_mut() {
            pointer.color = generate_color(rng);
        }
        true
    }
}
