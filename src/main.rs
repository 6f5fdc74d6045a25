use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};

use tsumiki_blocks::{Block, Direction, ShapeRegistry};
use tsumiki_edit::{EditDocument, EditSession, ModelTransform};
use tsumiki_geom::Vec3;

const DEFAULT_SHAPES: &str = "assets/tsumiki/shapes.toml";

#[derive(Parser, Debug)]
#[command(name = "tsumiki", about = "Voxel block editor core: scenes, meshes and undo history")]
struct Cli {
    /// Shape catalog (TOML). Falls back to the builtin catalog when the default path is missing.
    #[arg(long, global = true)]
    shapes: Option<PathBuf>,

    /// Split surface meshes into render cells of this size.
    #[arg(long, global = true)]
    bucket_size: Option<f32>,

    /// Also write debug logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the loaded shape and model catalog
    Info,
    /// Load a scene and rebuild every layer's meshes
    Rebuild {
        /// Scene file to load
        #[arg(long)]
        scene: PathBuf,
    },
    /// Build a small scene through the edit session, optionally saving it
    Demo {
        /// Where to write the resulting scene
        #[arg(long)]
        scene: Option<PathBuf>,
    },
}

fn init_logging(log_file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    match log_file {
        Some(path) => {
            CombinedLogger::init(vec![
                TermLogger::new(
                    LevelFilter::Info,
                    Config::default(),
                    TerminalMode::Mixed,
                    ColorChoice::Auto,
                ),
                WriteLogger::new(LevelFilter::Debug, Config::default(), File::create(path)?),
            ])?;
        }
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        }
    }
    Ok(())
}

fn load_registry(path: Option<&Path>) -> Result<Arc<ShapeRegistry>, Box<dyn Error>> {
    let registry = match path {
        Some(p) => ShapeRegistry::load_from_path(p)?,
        None if Path::new(DEFAULT_SHAPES).exists() => ShapeRegistry::load_from_path(DEFAULT_SHAPES)?,
        None => {
            log::warn!("{} not found; using the builtin shape catalog", DEFAULT_SHAPES);
            ShapeRegistry::builtin()?
        }
    };
    Ok(Arc::new(registry))
}

fn print_info(registry: &ShapeRegistry) {
    let atlas = registry.atlas();
    println!("atlas: {}x{} chips", atlas.columns, atlas.rows);
    for shape in &registry.shapes {
        println!(
            "shape {:>2} {:<10} {:<14} template={:?} wall={:?} auto={}",
            shape.id.0, shape.name, shape.display_name, shape.template, shape.wall, shape.auto_placement
        );
    }
    for model in &registry.models {
        println!(
            "model {:>2} {:<10} {:<14} scale={} enterable={}",
            model.id.0, model.name, model.display_name, model.scale, model.enterable
        );
    }
}

fn print_meshes(doc: &mut EditDocument) {
    for layer in doc.layers.iter_mut() {
        let surface = layer.blocks.surface_mesh();
        let (sv, st, cells) = (
            surface.vertex_count(),
            surface.mesh().triangle_count(),
            surface.bucket_count(),
        );
        let guide_tris = layer.blocks.guide_mesh().mesh().triangle_count();
        let route_tris = layer.blocks.route_mesh().mesh().triangle_count();
        let wire = layer.blocks.wire_indices().len() / 2;
        let model_tris = layer.models.guide_mesh().mesh().triangle_count();
        println!(
            "layer '{}': {} blocks, {} models, {} enterable",
            layer.name,
            layer.blocks.len(),
            layer.models.len(),
            layer.blocks.enterable_blocks().len()
        );
        println!("  surface {sv} verts / {st} tris in {cells} cells ({wire} outline segments)");
        println!("  guide {guide_tris} tris, route {route_tris} tris, model guides {model_tris} tris");
    }
    let arcs = doc.routes.line_mesh();
    println!("routes: {} paths, {} preview segments", doc.routes.len(), arcs.indices.len() / 2);
}

fn check(accepted: bool, what: &str) {
    if !accepted {
        log::warn!("demo: {} was rejected", what);
    }
}

// A terraced platform with a pond, a tree and a ladder path, built through undoable edits.
fn build_demo(session: &mut EditSession) -> Result<(), Box<dyn Error>> {
    let reg = session.registry().clone();
    let find = |name: &str| reg.find(name).ok_or_else(|| format!("shape '{name}' is not in the catalog"));
    let (cube, slope, water) = (find("cube")?, find("slope")?, find("water")?);

    check(session.begin_group(), "begin ground group");
    for x in -3i32..=3 {
        for z in -3i32..=3 {
            let p = Vec3::new(x as f32, 0.0, z as f32);
            let shape = if x.abs() <= 1 && z.abs() <= 1 { water } else { cube };
            check(session.add_block(Block::new(p, Direction::Zplus, shape)), "ground block");
        }
    }
    check(session.end_group(), "end ground group");

    check(session.begin_group(), "begin tower group");
    for y in 1..4 {
        let p = Vec3::new(3.0, y as f32 * 0.5, 3.0);
        check(session.add_block(Block::new(p, Direction::Zplus, cube)), "tower block");
    }
    check(
        session.add_block(Block::new(Vec3::new(3.0, 0.5, 2.0), Direction::Zminus, slope)),
        "tower slope",
    );
    check(session.paint_block(Vec3::new(3.0, 1.5, 3.0), Some(Direction::Yplus), 9), "paint tower top");
    check(
        session.set_meta_info(Vec3::new(3.0, 1.5, 3.0), Some("lookout".to_string())),
        "tower note",
    );
    check(session.end_group(), "end tower group");

    match reg.find_model("tree") {
        Some(tree) => {
            check(session.add_model(tree, Vec3::new(-3.0, 0.5, 3.0)), "place tree");
            check(
                session.set_model_transform(
                    Vec3::new(-3.0, 0.5, 3.0),
                    ModelTransform {
                        offset: Vec3::ZERO,
                        rotation: 30.0,
                        scale: 1.5,
                    },
                ),
                "turn tree",
            );
        }
        None => log::warn!("demo: no 'tree' model in the catalog"),
    }
    check(
        session.add_route_path(Vec3::new(-3.0, 0.0, -3.0), Vec3::new(3.0, 0.0, -3.0)),
        "route path",
    );

    // A mistaken edit, taken back.
    check(session.remove_block(Vec3::new(0.0, 0.0, 0.0)), "remove pond center");
    check(session.undo(), "undo");

    if session.begin_move(&[Vec3::new(-3.0, 0.5, 3.0)]) > 0 {
        check(session.commit_move(Vec3::new(1.0, 0.0, 0.0)), "move tree");
    } else {
        log::warn!("demo: nothing to move at the tree cell");
    }
    log::info!(
        "demo scene: {} blocks, {} undo steps",
        session.document().block_count(),
        session.history().len()
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;
    let registry = load_registry(cli.shapes.as_deref())?;

    match cli.command {
        Command::Info => print_info(&registry),
        Command::Rebuild { scene } => {
            let mut doc = tsumiki_io::load_path(&scene, registry, cli.bucket_size)?;
            print_meshes(&mut doc);
        }
        Command::Demo { scene } => {
            let mut session = EditSession::with_document(EditDocument::with_bucket_size(
                registry,
                cli.bucket_size,
            ));
            build_demo(&mut session)?;
            if let Some(path) = scene {
                tsumiki_io::save_path(session.document(), &path)?;
            }
            let mut doc = session.into_document();
            print_meshes(&mut doc);
        }
    }
    Ok(())
}
