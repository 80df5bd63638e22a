use glam::Vec3;

/// Surface material shared between mesh groups.
///
/// Groups hold materials behind an `Arc`, so one material instance can be
/// referenced by any number of groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Name of the material instance.
    pub name: String,
    /// Library file this material came from, e.g. `default.mtl`.
    pub material_file: String,

    pub diffuse_path: String,
    pub alpha_path: String,
    pub specular_path: String,
    pub normal_path: String,
    pub emissive_path: String,

    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub emissive_color: Vec3,

    /// Specular exponent normalized to [0, 1].
    pub specular: f32,
    pub alpha: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            material_file: String::new(),
            diffuse_path: String::new(),
            alpha_path: String::new(),
            specular_path: String::new(),
            normal_path: String::new(),
            emissive_path: String::new(),
            ambient_color: Vec3::ONE,
            diffuse_color: Vec3::ONE,
            specular_color: Vec3::ONE,
            emissive_color: Vec3::ZERO,
            specular: 1.0,
            alpha: 1.0,
        }
    }
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Texture paths paired with their MTL keyword, in writing order.
    pub fn texture_paths(&self) -> [(&'static str, &str); 5] {
        [
            ("map_Kd", &self.diffuse_path),
            ("map_d", &self.alpha_path),
            ("map_Ks", &self.specular_path),
            ("map_bump", &self.normal_path),
            ("map_Ke", &self.emissive_path),
        ]
    }
}
