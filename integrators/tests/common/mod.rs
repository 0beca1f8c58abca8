//! Scenes shared by the end-to-end rendering tests.

#![allow(dead_code)]

use rad_accelerators::LinearAccel;
use rad_cameras::PerspectiveCamera;
use rad_core::base::*;
use rad_core::film::*;
use rad_core::geometry::*;
use rad_core::light::*;
use rad_core::medium::*;
use rad_core::options::*;
use rad_core::primitives::*;
use rad_core::reflection::*;
use rad_core::scene::*;
use rad_core::spectrum::*;
use rad_integrators::*;
use rad_lights::DiffuseAreaLight;
use rad_samplers::RandomSampler;
use rad_shapes::Sphere;
use std::sync::Arc;

/// Reflectance of the ground sphere.
pub const ALBEDO: Float = 0.5;

/// Radiance emitted by the light sphere.
pub const EMISSION: Float = 16.0;

/// Radius of the light sphere.
pub const LIGHT_RADIUS: Float = 0.5;

/// Height of the light sphere's center above the ground.
pub const LIGHT_HEIGHT: Float = 2.0;

/// Radiance reflected at the top of the ground sphere. The light sphere
/// subtends a cone of half angle θ with sin θ = r/d around the normal, so the
/// irradiance is π·L·(r/d)² and the reflected radiance ρ·L·(r/d)².
pub fn expected_radiance() -> Float {
    ALBEDO * EMISSION * (LIGHT_RADIUS / LIGHT_HEIGHT) * (LIGHT_RADIUS / LIGHT_HEIGHT)
}

/// Initialize logging once per test binary.
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Returns a scene with a huge diffuse sphere whose top touches the origin
/// and a small spherical area light above it. The camera looks at the origin
/// from (3, 3, 0) and never sees the light directly.
///
/// * `resolution` - Image resolution.
/// * `fov`        - Field of view in degrees.
/// * `medium`     - Medium filling the scene, including the camera.
pub fn sphere_scene(resolution: Point2i, fov: Float, medium: Option<ArcMedium>) -> Arc<Scene> {
    build_scene(resolution, fov, medium, true)
}

/// Returns the sphere scene with the emitter switched off and no lights.
///
/// * `resolution` - Image resolution.
pub fn dark_scene(resolution: Point2i) -> Arc<Scene> {
    build_scene(resolution, 30.0, None, false)
}

fn build_scene(resolution: Point2i, fov: Float, medium: Option<ArcMedium>, lit: bool) -> Arc<Scene> {
    let ground = Sphere::new(Point3f::new(0.0, -100.0, 0.0), 100.0, false).expect("ground");
    let ground_bsdf: ArcBSDF = Arc::new(DiffuseBSDF::new(Spectrum::new(ALBEDO)));
    let ground: ArcPrimitive = Arc::new(GeometricPrimitive::new(
        Arc::new(ground),
        Some(ground_bsdf),
        None,
        MediumInterface::vacuum(),
    ));

    let emitter: ArcShape =
        Arc::new(Sphere::new(Point3f::new(0.0, LIGHT_HEIGHT, 0.0), LIGHT_RADIUS, false).expect("emitter"));
    let mut lights: Vec<ArcLight> = vec![];
    if lit {
        lights.push(Arc::new(
            DiffuseAreaLight::new(emitter.clone(), Spectrum::new(EMISSION), false, MediumInterface::vacuum())
                .expect("area light"),
        ));
    }
    let black: ArcBSDF = Arc::new(DiffuseBSDF::new(Spectrum::ZERO));
    let area_light = if lit { Some(0) } else { None };
    let emitter: ArcPrimitive = Arc::new(GeometricPrimitive::new(
        emitter,
        Some(black),
        area_light,
        MediumInterface::vacuum(),
    ));

    let world_to_camera = Transform::look_at(
        &Point3f::new(3.0, 3.0, 0.0),
        &Point3f::new(0.0, 0.0, 0.0),
        &Vector3f::new(0.0, 1.0, 0.0),
    )
    .expect("look at");
    let camera = Arc::new(
        PerspectiveCamera::new(world_to_camera, fov, resolution, 0.0, 1.0, medium.clone()).expect("camera"),
    );

    let accel = Arc::new(LinearAccel::new(vec![ground, emitter]));
    let media = medium.iter().cloned().collect();
    Arc::new(Scene::new(accel, camera, lights, media, medium, LightSampleStrategy::Power).expect("scene"))
}

/// Render a scene to completion and return the frame buffer.
///
/// * `scene`      - The scene.
/// * `integrator` - The integrator.
/// * `options`    - Render options; the sampler uses their sample count and
///                  seed.
pub fn render(scene: Arc<Scene>, integrator: Box<dyn Integrator>, options: RenderOptions) -> FrameBuffer {
    let sampler = Box::new(RandomSampler::new(options.samples_per_pixel, Some(options.seed)).expect("sampler"));
    let mut renderer = SampleRenderer::new(scene, integrator, sampler, options).expect("renderer");
    renderer.start().expect("start");
    renderer.wait().expect("wait");
    assert!(renderer.is_complete());
    renderer.frame_buffer()
}

/// Returns the mean of the first channel over the image.
///
/// * `fb` - The frame buffer.
pub fn image_mean(fb: &FrameBuffer) -> Float {
    let mut sum = 0.0;
    for x in 0..fb.width() {
        for y in 0..fb.height() {
            sum += fb.get(x, y)[0];
        }
    }
    sum / (fb.width() * fb.height()) as Float
}
