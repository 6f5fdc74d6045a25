use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use tsumiki_blocks::{Block, Direction, ShapeRegistry};
use tsumiki_geom::Vec3;
use tsumiki_mesh_cpu::BlockGroup;

fn load_registry() -> Arc<ShapeRegistry> {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    Arc::new(ShapeRegistry::load_from_path(root.join("../../assets/tsumiki/shapes.toml")).unwrap())
}

// Terraced hill: stacked cubes with a water ring around the base.
fn build_scene(reg: &Arc<ShapeRegistry>, radius: i32, cell: Option<f32>) -> BlockGroup {
    let cube = reg.find("cube").unwrap();
    let water = reg.find("water").unwrap();
    let mut g = BlockGroup::with_bucket_size(reg.clone(), cell);
    for x in -radius..=radius {
        for z in -radius..=radius {
            let d = x.abs().max(z.abs());
            let p = |y: f32| Vec3::new(x as f32, y, z as f32);
            if d == radius {
                g.add_block(Block::new(p(0.0), Direction::Zplus, water));
                continue;
            }
            for step in 0..(radius - d) {
                g.add_block(Block::new(p(step as f32 * 0.5), Direction::Zplus, cube));
            }
        }
    }
    g
}

fn bench_rebuild(c: &mut Criterion) {
    let reg = load_registry();
    let mut group = c.benchmark_group("block_group_rebuild");
    for radius in [4, 12] {
        let mut scene = build_scene(&reg, radius, None);
        group.bench_function(format!("hill_r{radius}"), |b| {
            b.iter(|| {
                scene.update_mesh();
                black_box(scene.surface_mesh().index_count());
            })
        });
    }
    let mut bucketed = build_scene(&reg, 12, Some(8.0));
    group.bench_function("hill_r12_bucketed", |b| {
        b.iter(|| {
            bucketed.update_mesh();
            black_box(bucketed.surface_mesh().bucket_count());
        })
    });
    group.finish();
}

criterion_group!(benches, bench_rebuild);
criterion_main!(benches);
