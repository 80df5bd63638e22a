use std::ops::{Index, IndexMut};
use std::sync::Arc;

use glam::Vec3;

use super::bbox::BoundingBox;
use super::material::Material;
use super::mesh_group::MeshGroup;

/// An ordered collection of mesh groups.
///
/// Group order is creation order; the first group is the default group.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub groups: Vec<MeshGroup>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
        }
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    /// Whether the mesh has at least one group.
    pub fn is_good(&self) -> bool {
        !self.groups.is_empty()
    }

    pub fn total_tris(&self) -> usize {
        self.groups.iter().map(MeshGroup::num_tris).sum()
    }

    pub fn total_verts(&self) -> usize {
        self.groups.iter().map(MeshGroup::num_verts).sum()
    }

    pub fn total_coords(&self) -> usize {
        self.groups.iter().map(MeshGroup::num_coords).sum()
    }

    pub fn total_normals(&self) -> usize {
        self.groups.iter().map(MeshGroup::num_normals).sum()
    }

    pub fn total_colors(&self) -> usize {
        self.groups.iter().map(MeshGroup::num_colors).sum()
    }

    /// The first group, if any.
    pub fn default_group(&self) -> Option<&MeshGroup> {
        self.groups.first()
    }

    /// First group named `name`.
    pub fn find_group(&self, name: &str) -> Option<&MeshGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn find_group_mut(&mut self, name: &str) -> Option<&mut MeshGroup> {
        self.groups.iter_mut().find(|g| g.name == name)
    }

    /// Appends a new group. Names need not be unique.
    pub fn create_group(&mut self, name: impl Into<String>) -> &mut MeshGroup {
        let group_id = self.groups.len();
        self.groups.push(MeshGroup::new(group_id, name));
        &mut self.groups[group_id]
    }

    pub fn find_or_create_group(&mut self, name: &str) -> &mut MeshGroup {
        match self.groups.iter().position(|g| g.name == name) {
            Some(index) => &mut self.groups[index],
            None => self.create_group(name),
        }
    }

    /// Material named `name` (case-insensitive) used by any group.
    pub fn find_material(&self, name: &str) -> Option<Arc<Material>> {
        self.groups
            .iter()
            .filter_map(|g| g.material.as_ref())
            .find(|m| m.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    pub fn has_any_materials(&self) -> bool {
        self.groups.iter().any(|g| g.material.is_some())
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.groups.clear();
    }

    /// Copies the mesh. Materials stay shared with `self` unless
    /// `clone_materials` is set, in which case every group gets its own copy.
    pub fn clone_mesh(&self, clone_materials: bool) -> Mesh {
        let mut mesh = self.clone();
        if clone_materials {
            for group in &mut mesh.groups {
                if let Some(material) = &group.material {
                    group.material = Some(Arc::new(Material::clone(material)));
                }
            }
        }
        mesh
    }

    /// Union of every group's bounding box.
    pub fn calculate_bbox(&self) -> BoundingBox {
        let mut groups = self.groups.iter();
        let Some(first) = groups.next() else {
            return BoundingBox::default();
        };
        groups.fold(first.calculate_bbox(), |bb, g| bb.merge(&g.calculate_bbox()))
    }

    /// Appends every group of `other`, moved by `offset`.
    ///
    /// An appended group whose name clashes with one of the existing groups
    /// gets `_{n}` appended (repeatedly) where `n` is the prior group count.
    pub fn add_mesh_data(&mut self, other: &Mesh, offset: Vec3) {
        let num_groups_old = self.groups.len();
        for group in &other.groups {
            let mut group = group.clone();
            while self.groups[..num_groups_old]
                .iter()
                .any(|g| g.name == group.name)
            {
                group.name = format!("{}_{num_groups_old}", group.name);
            }
            if offset != Vec3::ZERO {
                for v in &mut group.verts {
                    *v += offset;
                }
            }
            group.group_id = self.groups.len();
            self.groups.push(group);
        }
    }
}

impl Index<usize> for Mesh {
    type Output = MeshGroup;

    fn index(&self, index: usize) -> &MeshGroup {
        &self.groups[index]
    }
}

impl IndexMut<usize> for Mesh {
    fn index_mut(&mut self, index: usize) -> &mut MeshGroup {
        &mut self.groups[index]
    }
}
