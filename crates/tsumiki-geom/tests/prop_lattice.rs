use std::collections::HashSet;

use proptest::prelude::*;
use tsumiki_geom::{LATTICE_EXTENT, Vec3, key_to_position, lattice_key, snap_to_lattice};

fn lattice_position() -> impl Strategy<Value = Vec3> {
    (
        -LATTICE_EXTENT..LATTICE_EXTENT,
        -LATTICE_EXTENT..LATTICE_EXTENT,
        -LATTICE_EXTENT..LATTICE_EXTENT,
    )
        .prop_map(|(x, hy, z)| Vec3::new(x as f32, hy as f32 * 0.5, z as f32))
}

proptest! {
    // Every supported lattice position decodes back to itself.
    #[test]
    fn key_round_trips(p in lattice_position()) {
        prop_assert_eq!(key_to_position(lattice_key(p)), p);
    }

    // Small jitter below half a step never changes the key.
    #[test]
    fn jitter_keeps_key(p in lattice_position(), dx in -0.49f32..0.49, dy in -0.24f32..0.24, dz in -0.49f32..0.49) {
        let q = Vec3::new(p.x + dx, p.y + dy, p.z + dz);
        prop_assert_eq!(lattice_key(q), lattice_key(p));
        prop_assert_eq!(snap_to_lattice(q), p);
    }

    // Distinct supported positions never share a key.
    #[test]
    fn distinct_positions_distinct_keys(a in lattice_position(), b in lattice_position()) {
        prop_assume!(a != b);
        prop_assert_ne!(lattice_key(a), lattice_key(b));
    }
}

#[test]
fn whole_supported_cube_is_collision_free() {
    let mut seen = HashSet::new();
    for z in -LATTICE_EXTENT..LATTICE_EXTENT {
        for hy in -LATTICE_EXTENT..LATTICE_EXTENT {
            for x in -LATTICE_EXTENT..LATTICE_EXTENT {
                let p = Vec3::new(x as f32, hy as f32 * 0.5, z as f32);
                assert!(seen.insert(lattice_key(p)), "collision at {p:?}");
            }
        }
    }
    assert_eq!(seen.len(), 64 * 64 * 64);
}

#[test]
fn out_of_range_positions_alias() {
    // Accepted limitation: 64 units apart wraps to the same key.
    let a = Vec3::new(1.0, 0.0, 0.0);
    let b = Vec3::new(65.0, 0.0, 0.0);
    assert_eq!(lattice_key(a), lattice_key(b));
}
