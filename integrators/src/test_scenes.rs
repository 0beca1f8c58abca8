//! Test Scenes

use rad_accelerators::LinearAccel;
use rad_cameras::PerspectiveCamera;
use rad_core::base::*;
use rad_core::camera::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::light::*;
use rad_core::medium::*;
use rad_core::primitives::*;
use rad_core::reflection::*;
use rad_core::scene::*;
use rad_core::spectrum::*;
use rad_lights::PointLight;
use rad_shapes::Quad;
use std::sync::Arc;

/// Returns a 1x1 pinhole camera three units above the origin looking down
/// with a narrow field of view.
pub(crate) fn camera_looking_down() -> ArcCamera {
    camera_looking_down_at(Point2i::new(1, 1))
}

/// Returns the downward pinhole camera with the given image resolution.
///
/// * `resolution` - Image resolution.
pub(crate) fn camera_looking_down_at(resolution: Point2i) -> ArcCamera {
    let world_to_camera = Transform::look_at(
        &Point3f::new(0.0, 3.0, 0.0),
        &Point3f::new(0.0, 0.0, 0.0),
        &Vector3f::new(0.0, 0.0, 1.0),
    )
    .expect("look at");
    Arc::new(PerspectiveCamera::new(world_to_camera, 1.0, resolution, 0.0, 1.0, None).expect("camera"))
}

/// Returns a 10x10 diffuse floor with reflectance 0.5 in the y = 0 plane,
/// facing +y.
pub(crate) fn floor() -> ArcPrimitive {
    let quad = Quad::new(
        Point3f::new(-5.0, 0.0, -5.0),
        Vector3f::new(0.0, 0.0, 10.0),
        Vector3f::new(10.0, 0.0, 0.0),
        false,
    )
    .expect("quad");
    let bsdf: ArcBSDF = Arc::new(DiffuseBSDF::new(Spectrum::new(0.5)));
    Arc::new(GeometricPrimitive::new(Arc::new(quad), Some(bsdf), None, MediumInterface::vacuum()))
}

/// Returns a scene with the floor, the downward camera and the given lights.
///
/// * `lights` - The lights.
/// * `medium` - Medium filling the scene.
pub(crate) fn floor_scene(lights: Vec<ArcLight>, medium: Option<ArcMedium>) -> Scene {
    let accel = Arc::new(LinearAccel::new(vec![floor()]));
    let media = medium.iter().cloned().collect();
    Scene::new(accel, camera_looking_down(), lights, media, medium, LightSampleStrategy::Power).expect("scene")
}

/// Returns the floor scene lit by a point light above the origin.
///
/// * `intensity` - Radiant intensity.
/// * `height`    - Height of the light.
pub(crate) fn floor_with_point_light(intensity: Float, height: Float) -> Scene {
    let light: ArcLight = Arc::new(PointLight::new(
        Point3f::new(0.0, height, 0.0),
        Spectrum::new(intensity),
        None,
    ));
    floor_scene(vec![light], None)
}

/// Returns the floor scene without lights.
pub(crate) fn floor_without_lights() -> Scene {
    floor_scene(vec![], None)
}

/// Returns the unlit floor scene seen by a camera with the given resolution.
///
/// * `resolution` - Image resolution.
pub(crate) fn unlit_floor_at(resolution: Point2i) -> Scene {
    let accel = Arc::new(LinearAccel::new(vec![floor()]));
    Scene::new(
        accel,
        camera_looking_down_at(resolution),
        vec![],
        vec![],
        None,
        LightSampleStrategy::Power,
    )
    .expect("scene")
}

/// Returns the floor interaction below a point, seen from above.
///
/// * `scene` - A floor scene.
/// * `p`     - Point on the floor.
pub(crate) fn floor_hit(scene: &Scene, p: Point3f) -> SurfaceInteraction {
    let mut ray = Ray::new(
        p + Vector3f::new(0.0, 1.0, 0.0),
        Vector3f::new(0.0, -1.0, 0.0),
        INFINITY,
        0.0,
        None,
    );
    scene.intersect(&mut ray).expect("floor hit")
}

/// Returns a point in an isotropic medium one unit above the floor.
pub(crate) fn medium_point() -> MediumInteraction {
    MediumInteraction::new(
        Point3f::new(0.0, 1.0, 0.0),
        Vector3f::new(0.0, 0.0, 1.0),
        0.0,
        None,
        PhaseFunction::Isotropic,
        MediumProperties::new(Spectrum::ZERO, Spectrum::new(1.0), Spectrum::ZERO),
    )
}
