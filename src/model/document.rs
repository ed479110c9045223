//! The complete editable stage state.
//!
//! Every top-level collection sits behind an `Arc<Vec<T>>`. Cloning a
//! document is therefore cheap, and history snapshots share storage with the
//! live document until one side writes: the `_mut` accessors go through
//! [`Arc::make_mut`], which copies a collection only when it is shared.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
    Actor, ActorId, Area, Dialogue, Light, Movement, MusicTrack, StageElement, TimedCue,
};

/// Snapshot of everything the editor can change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageDocument {
    #[serde(default)]
    actors: Arc<Vec<Actor>>,
    #[serde(default)]
    stage_elements: Arc<Vec<StageElement>>,
    #[serde(default)]
    lights: Arc<Vec<Light>>,
    #[serde(default)]
    music_tracks: Arc<Vec<MusicTrack>>,
    #[serde(default)]
    dialogues: Arc<Vec<Dialogue>>,
    #[serde(default)]
    movements: Arc<Vec<Movement>>,
    #[serde(default)]
    areas: Arc<Vec<Area>>,
}

// ============================================================================
// Read access
// ============================================================================

impl StageDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn stage_elements(&self) -> &[StageElement] {
        &self.stage_elements
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn music_tracks(&self) -> &[MusicTrack] {
        &self.music_tracks
    }

    pub fn dialogues(&self) -> &[Dialogue] {
        &self.dialogues
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    /// True when the document holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
            && self.stage_elements.is_empty()
            && self.lights.is_empty()
            && self.music_tracks.is_empty()
            && self.dialogues.is_empty()
            && self.movements.is_empty()
            && self.areas.is_empty()
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.iter().find(|a| a.id == id)
    }

    pub fn stage_element(&self, id: &str) -> Option<&StageElement> {
        self.stage_elements.iter().find(|e| e.id == id)
    }

    pub fn light(&self, id: &str) -> Option<&Light> {
        self.lights.iter().find(|l| l.id == id)
    }

    pub fn dialogue(&self, id: &str) -> Option<&Dialogue> {
        self.dialogues.iter().find(|d| d.id == id)
    }

    /// Dialogues spoken by one actor, in document order.
    pub fn dialogues_for(&self, actor: ActorId) -> impl Iterator<Item = &Dialogue> + '_ {
        self.dialogues.iter().filter(move |d| d.actor_id == actor)
    }

    /// Movements planned for one actor, in document order.
    pub fn movements_for(&self, actor: ActorId) -> impl Iterator<Item = &Movement> + '_ {
        self.movements.iter().filter(move |m| m.actor_id == actor)
    }

    /// Latest end time over every timed cue, or 0 for an empty show.
    pub fn cue_end_time(&self) -> f64 {
        let dialogues = self.dialogues.iter().map(TimedCue::end_time);
        let music = self.music_tracks.iter().map(TimedCue::end_time);
        let lights = self.lights.iter().map(TimedCue::end_time);
        let movements = self.movements.iter().map(TimedCue::end_time);
        dialogues
            .chain(music)
            .chain(lights)
            .chain(movements)
            .fold(0.0, f64::max)
    }

    #[cfg(test)]
    fn shares_actors_with(&self, other: &StageDocument) -> bool {
        Arc::ptr_eq(&self.actors, &other.actors)
    }

    #[cfg(test)]
    fn shares_dialogues_with(&self, other: &StageDocument) -> bool {
        Arc::ptr_eq(&self.dialogues, &other.dialogues)
    }
}

// ============================================================================
// Copy-on-write access
// ============================================================================

impl StageDocument {
    pub fn actors_mut(&mut self) -> &mut Vec<Actor> {
        Arc::make_mut(&mut self.actors)
    }

    pub fn stage_elements_mut(&mut self) -> &mut Vec<StageElement> {
        Arc::make_mut(&mut self.stage_elements)
    }

    pub fn lights_mut(&mut self) -> &mut Vec<Light> {
        Arc::make_mut(&mut self.lights)
    }

    pub fn music_tracks_mut(&mut self) -> &mut Vec<MusicTrack> {
        Arc::make_mut(&mut self.music_tracks)
    }

    pub fn dialogues_mut(&mut self) -> &mut Vec<Dialogue> {
        Arc::make_mut(&mut self.dialogues)
    }

    pub fn movements_mut(&mut self) -> &mut Vec<Movement> {
        Arc::make_mut(&mut self.movements)
    }

    pub fn areas_mut(&mut self) -> &mut Vec<Area> {
        Arc::make_mut(&mut self.areas)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors_mut().iter_mut().find(|a| a.id == id)
    }

    pub fn stage_element_mut(&mut self, id: &str) -> Option<&mut StageElement> {
        self.stage_elements_mut().iter_mut().find(|e| e.id == id)
    }

    pub fn light_mut(&mut self, id: &str) -> Option<&mut Light> {
        self.lights_mut().iter_mut().find(|l| l.id == id)
    }

    pub fn dialogue_mut(&mut self, id: &str) -> Option<&mut Dialogue> {
        self.dialogues_mut().iter_mut().find(|d| d.id == id)
    }

    /// Remove an actor along with every dialogue and movement that refers to it.
    /// Returns the removed actor.
    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let index = self.actors.iter().position(|a| a.id == id)?;
        let actor = self.actors_mut().remove(index);
        if self.dialogues.iter().any(|d| d.actor_id == id) {
            self.dialogues_mut().retain(|d| d.actor_id != id);
        }
        if self.movements.iter().any(|m| m.actor_id == id) {
            self.movements_mut().retain(|m| m.actor_id != id);
        }
        Some(actor)
    }
}

/// Remove the first item accepted by `matches`.
pub(crate) fn remove_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> Option<T> {
    let index = items.iter().position(matches)?;
    Some(items.remove(index))
}
