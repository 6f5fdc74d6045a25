use serde::Deserialize;

use crate::templates::TemplateKind;
use crate::types::{Connection, Direction, Wall};

// Top-level shapes config file
#[derive(Deserialize, Debug, Clone)]
pub struct ShapesConfig {
    // Shape used when saved data names one the registry does not know.
    #[serde(default = "default_shape_name")]
    pub default_shape: String,
    #[serde(default)]
    pub atlas: Option<AtlasDef>,
    #[serde(default)]
    pub shapes: Vec<ShapeDef>,
    #[serde(default)]
    pub models: Vec<ModelDef>,
}

fn default_shape_name() -> String {
    "cube".to_string()
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct AtlasDef {
    pub columns: u32,
    pub rows: u32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ShapeDef {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub template: TemplateKind,

    // Overrides of the template's occlusion metadata, in local face order
    #[serde(default)]
    pub connection: Option<[Connection; 6]>,
    #[serde(default)]
    pub connection_dir: Option<[Direction; 6]>,

    #[serde(default)]
    pub panel_vertices: Option<[i32; 4]>,
    #[serde(default)]
    pub wall: Option<Wall>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ModelDef {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub scale: Option<f32>,
    #[serde(default)]
    pub enterable: Option<bool>,
    #[serde(default)]
    pub offset: Option<[f32; 3]>,
    #[serde(default)]
    pub bounds: Option<BoundsDef>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct BoundsDef {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl ShapesConfig {
    /// The catalog every editor ships with: cube, slope, water (auto), empty and a tree.
    pub fn builtin() -> Self {
        let shape = |name: &str, display: &str, template: TemplateKind| ShapeDef {
            name: name.to_string(),
            display_name: Some(display.to_string()),
            template,
            connection: None,
            connection_dir: None,
            panel_vertices: None,
            wall: None,
        };
        ShapesConfig {
            default_shape: default_shape_name(),
            atlas: None,
            shapes: vec![
                shape("cube", "Cube", TemplateKind::Cube),
                shape("slope", "Slope", TemplateKind::Slope),
                shape("water", "Water", TemplateKind::Auto),
                shape("empty", "Empty", TemplateKind::Empty),
            ],
            models: vec![ModelDef {
                name: "tree".to_string(),
                display_name: Some("Tree".to_string()),
                scale: Some(1.0),
                enterable: Some(false),
                offset: Some([0.0, -0.25, 0.0]),
                bounds: Some(BoundsDef {
                    min: [-0.5, 0.0, -0.5],
                    max: [0.5, 2.0, 0.5],
                }),
            }],
        }
    }
}
