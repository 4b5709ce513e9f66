//! Axial, sagittal and coronal views with a thick-slab sagittal band.
//!
//! Run with `RUST_LOG=debug` to see the pipeline bookkeeping.

use std::f64::consts::FRAC_PI_2;

use slice_intersect::{
    IntersectionSettings, MemoryRegistry, Point2, SliceView, Transform, UpdateDriver, ViewId,
};

fn main() {
    env_logger::init();

    let fov = [256.0, 256.0, 1.0];
    let mut registry = MemoryRegistry::new();
    registry.insert(SliceView::new(ViewId(1), "axial", [512, 512]).with_field_of_view(fov));
    registry.insert(
        SliceView::new(ViewId(2), "sagittal", [512, 512])
            .with_field_of_view(fov)
            .with_pose(Transform::rotation_y(FRAC_PI_2))
            .with_slab_thickness(5.0),
    );
    let coronal_pose =
        Transform::translation(0.0, 20.0, 0.0).then(&Transform::rotation_x(FRAC_PI_2));
    registry.insert(
        SliceView::new(ViewId(3), "coronal", [512, 512])
            .with_field_of_view(fov)
            .with_pose(coronal_pose),
    );

    let mut driver = UpdateDriver::new(IntersectionSettings::default());
    driver.set_current_view(&registry, Some(ViewId(1)));

    println!("segments on axial:");
    for s in driver.pipelines().snapshot() {
        println!(
            "  {} {:<12} ({:7.2}, {:7.2}) -> ({:7.2}, {:7.2})",
            s.peer,
            format!("{:?}", s.mode),
            s.a[0],
            s.a[1],
            s.b[0],
            s.b[1]
        );
    }

    let p = driver.convergence_point(&registry);
    println!("convergence: ({:.2}, {:.2})", p.x, p.y);

    if let Some(hit) = driver.hit_test(Point2::new(p.x + 2.0, 100.0), 5.0) {
        println!(
            "picked {} {:?} at {:.1} degrees",
            hit.peer,
            hit.mode,
            hit.angle.to_degrees()
        );
    }

    let summary = driver.rotate_all(&mut registry, &Transform::rotation_z(0.3));
    println!("rotated {} views", summary.recomputed.len());
    let p = driver.convergence_point(&registry);
    println!("convergence after rotation: ({:.2}, {:.2})", p.x, p.y);
}
