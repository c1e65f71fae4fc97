use std::path::PathBuf;

use crate::config::ObjectOptions;
use crate::math::{self, Mat4Array};

/// A hand-placed object: which mesh to draw, where, and in what color.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub mesh_path: PathBuf,
    pub model: Mat4Array,
    pub color: [f32; 3],
}

impl SceneObject {
    pub fn from_options(options: &ObjectOptions) -> Self {
        Self {
            name: options.name.clone(),
            mesh_path: options.mesh.clone(),
            model: math::model_matrix(
                options.translation,
                options.rotation_axis,
                options.rotation_degrees.to_radians(),
                options.scale,
            ),
            color: options.color,
        }
    }
}

/// The diorama plus one mesh slot per object.
///
/// Slots start empty and are filled as background loads finish; anything
/// drawing the scene only ever sees the slots that are populated.
pub struct Scene<H> {
    objects: Vec<SceneObject>,
    slots: Vec<Option<H>>,
}

impl<H> Scene<H> {
    pub fn new(objects: Vec<SceneObject>) -> Self {
        let slots = objects.iter().map(|_| None).collect();
        Self { objects, slots }
    }

    pub fn from_options(options: &[ObjectOptions]) -> Self {
        Self::new(options.iter().map(SceneObject::from_options).collect())
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Fills `slot`, replacing whatever was there. Returns `false` for an
    /// unknown slot.
    pub fn set_mesh(&mut self, slot: usize, handle: H) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = Some(handle);
                true
            }
            None => false,
        }
    }

    pub fn mesh(&self, slot: usize) -> Option<&H> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Objects whose mesh is present, with their slot index.
    pub fn drawables(&self) -> impl Iterator<Item = (usize, &SceneObject, &H)> + '_ {
        self.objects
            .iter()
            .zip(&self.slots)
            .enumerate()
            .filter_map(|(slot, (object, mesh))| mesh.as_ref().map(|m| (slot, object, m)))
    }
}
