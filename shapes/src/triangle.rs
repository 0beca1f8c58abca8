//! Triangles and triangle meshes

use rad_core::base::*;
use rad_core::error::*;
use rad_core::geometry::*;
use rad_core::interaction::*;
use rad_core::medium::MediumInterface;
use rad_core::sampling::*;
use std::sync::Arc;

/// Triangle mesh
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    /// Vertex indices. For the ith triangle, its three vertex positions are
    /// p[vertex_indices[3 * i]], p[vertex_indices[3 * i + 1]], and
    /// p[vertex_indices[3 * i + 2]]
    pub vertex_indices: Vec<usize>,

    /// Vertex positions in world space.
    pub p: Vec<Point3f>,

    /// Vertex normals. This will be empty if there are none.
    pub n: Vec<Normal3f>,

    /// Paramteric uv-coordinates per vertex. This will be empty if there are none.
    pub uv: Vec<Point2f>,
}

impl TriangleMesh {
    /// Create a new triangle mesh.
    ///
    /// * `vertex_indices` - Vertex indices for triangles.
    /// * `p`              - Vertex positions.
    /// * `n`              - Vertex normals; empty or one per vertex.
    /// * `uv`             - Paramteric uv-coordinates; empty or one per vertex.
    pub fn new(vertex_indices: Vec<usize>, p: Vec<Point3f>, n: Vec<Normal3f>, uv: Vec<Point2f>) -> Result<Self> {
        if vertex_indices.len() % 3 != 0 {
            return Err(Error::InvalidArgument(format!(
                "triangle mesh index count {} is not a multiple of 3",
                vertex_indices.len()
            )));
        }
        if let Some(i) = vertex_indices.iter().find(|&&i| i >= p.len()) {
            return Err(Error::InvalidArgument(format!(
                "triangle mesh index {i} is out of range for {} vertices",
                p.len()
            )));
        }
        if !n.is_empty() && n.len() != p.len() {
            return Err(Error::InvalidArgument("triangle mesh needs one normal per vertex".to_string()));
        }
        if !uv.is_empty() && uv.len() != p.len() {
            return Err(Error::InvalidArgument("triangle mesh needs one uv per vertex".to_string()));
        }

        let n = n.iter().map(|n| n.normalize()).collect();
        Ok(Self {
            vertex_indices,
            p,
            n,
            uv,
        })
    }

    /// Returns the number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.vertex_indices.len() / 3
    }

    /// Returns one shape per triangle referencing the mesh.
    pub fn create_triangles(self) -> Vec<ArcShape> {
        let num_triangles = self.num_triangles();
        debug!("Creating {num_triangles} triangles");
        let mesh = Arc::new(self);
        (0..num_triangles)
            .map(|id| Arc::new(Triangle::new(Arc::clone(&mesh), id)) as ArcShape)
            .collect()
    }
}

/// A single triangle of a `TriangleMesh`.
#[derive(Clone, Debug)]
pub struct Triangle {
    /// The mesh.
    pub mesh: Arc<TriangleMesh>,

    /// Triangle index inside the mesh.
    pub id: usize,
}

impl Triangle {
    /// Create a new triangle.
    ///
    /// * `mesh` - The mesh.
    /// * `id`   - Triangle index inside the mesh.
    pub fn new(mesh: Arc<TriangleMesh>, id: usize) -> Self {
        Self { mesh, id }
    }

    /// Returns the vertex indices of the triangle.
    fn vertices(&self) -> [usize; 3] {
        let i = 3 * self.id;
        [
            self.mesh.vertex_indices[i],
            self.mesh.vertex_indices[i + 1],
            self.mesh.vertex_indices[i + 2],
        ]
    }

    /// Returns the three vertex positions.
    fn positions(&self) -> [Point3f; 3] {
        let [v0, v1, v2] = self.vertices();
        [self.mesh.p[v0], self.mesh.p[v1], self.mesh.p[v2]]
    }

    /// Returns the three uv coordinates; a default parameterization if the
    /// mesh has none.
    fn uvs(&self) -> [Point2f; 3] {
        if self.mesh.uv.is_empty() {
            [Point2f::new(0.0, 0.0), Point2f::new(1.0, 0.0), Point2f::new(1.0, 1.0)]
        } else {
            let [v0, v1, v2] = self.vertices();
            [self.mesh.uv[v0], self.mesh.uv[v1], self.mesh.uv[v2]]
        }
    }

    /// Returns the geometric normal; oriented by the shading normals if the
    /// mesh has any.
    fn geometric_normal(&self, b: &[Float; 3]) -> Normal3f {
        let [p0, p1, p2] = self.positions();
        let n = Normal3f::from((p0 - p2).cross(&(p1 - p2)).normalize());
        match self.shading_normal(b) {
            Some(ns) => n.face_forward(&Vector3f::from(ns)),
            None => n,
        }
    }

    /// Returns the interpolated shading normal.
    fn shading_normal(&self, b: &[Float; 3]) -> Option<Normal3f> {
        if self.mesh.n.is_empty() {
            return None;
        }
        let [v0, v1, v2] = self.vertices();
        let ns = self.mesh.n[v0] * b[0] + self.mesh.n[v1] * b[1] + self.mesh.n[v2] * b[2];
        if ns.length_squared() > 0.0 {
            Some(ns.normalize())
        } else {
            None
        }
    }

    /// Möller-Trumbore ray triangle test returning the ray parameter and
    /// barycentric coordinates.
    fn hit_barycentrics(&self, ray: &Ray) -> Option<(Float, [Float; 3])> {
        let [p0, p1, p2] = self.positions();
        let e1 = p1 - p0;
        let e2 = p2 - p0;
        let pvec = ray.d.cross(&e2);
        let det = e1.dot(&pvec);
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv_det = 1.0 / det;

        let tvec = ray.o - p0;
        let b1 = tvec.dot(&pvec) * inv_det;
        if !(0.0..=1.0).contains(&b1) {
            return None;
        }

        let qvec = tvec.cross(&e1);
        let b2 = ray.d.dot(&qvec) * inv_det;
        if b2 < 0.0 || b1 + b2 > 1.0 {
            return None;
        }

        let t = e2.dot(&qvec) * inv_det;
        if !(t > ray.t_min && t < ray.t_max) {
            return None;
        }
        Some((t, [1.0 - b1 - b2, b1, b2]))
    }
}

impl Shape for Triangle {
    fn get_type(&self) -> &'static str {
        "triangle"
    }

    fn world_bound(&self) -> Bounds3f {
        let [p0, p1, p2] = self.positions();
        Bounds3f::new(p0, p1).union_point(&p2)
    }

    fn intersect(&self, ray: &Ray) -> Option<SurfaceInteraction> {
        let (t, b) = self.hit_barycentrics(ray)?;
        let [p0, p1, p2] = self.positions();
        let [uv0, uv1, uv2] = self.uvs();

        // Compute triangle partial derivatives.
        let duv02 = uv0 - uv2;
        let duv12 = uv1 - uv2;
        let dp02 = p0 - p2;
        let dp12 = p1 - p2;
        let determinant = duv02.x * duv12.y - duv02.y * duv12.x;
        let n = self.geometric_normal(&b);
        let (dpdu, dpdv) = if abs(determinant) < 1e-8 {
            coordinate_system(&Vector3f::from(n))
        } else {
            let invdet = 1.0 / determinant;
            (
                (dp02 * duv12.y - dp12 * duv02.y) * invdet,
                (dp12 * duv02.x - dp02 * duv12.x) * invdet,
            )
        };

        // Interpolate hit point and uv from barycentric coordinates.
        let p = Point3f::from(Vector3f::from(p0) * b[0] + Vector3f::from(p1) * b[1] + Vector3f::from(p2) * b[2]);
        let uv = Point2f::new(
            uv0.x * b[0] + uv1.x * b[1] + uv2.x * b[2],
            uv0.y * b[0] + uv1.y * b[1] + uv2.y * b[2],
        );

        let mut si = SurfaceInteraction::new(p, n, uv, -ray.d, dpdu, dpdv, ray.time);
        si.hit.t = t;
        if let Some(ns) = self.shading_normal(&b) {
            si.set_shading(Frame::from_normal_tangent(&ns, &dpdu));
        }
        Some(si)
    }

    fn intersect_p(&self, ray: &Ray) -> bool {
        self.hit_barycentrics(ray).is_some()
    }

    fn area(&self) -> Float {
        let [p0, p1, p2] = self.positions();
        0.5 * (p1 - p0).cross(&(p2 - p0)).length()
    }

    fn sample_area(&self, u: &Point2f) -> ShapeSample {
        let b = uniform_sample_triangle(u);
        let b = [b.x, b.y, 1.0 - b.x - b.y];
        let [p0, p1, p2] = self.positions();
        let [uv0, uv1, uv2] = self.uvs();
        let p = Point3f::from(Vector3f::from(p0) * b[0] + Vector3f::from(p1) * b[1] + Vector3f::from(p2) * b[2]);
        let uv = Point2f::new(
            uv0.x * b[0] + uv1.x * b[1] + uv2.x * b[2],
            uv0.y * b[0] + uv1.y * b[1] + uv2.y * b[2],
        );
        ShapeSample {
            hit: Hit::new(p, 0.0, Vector3f::ZERO, self.geometric_normal(&b), MediumInterface::vacuum()),
            uv,
            pdf: 1.0 / self.area(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    fn square() -> Vec<ArcShape> {
        TriangleMesh::new(
            vec![0, 1, 2, 0, 2, 3],
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![],
            vec![],
        )
        .unwrap()
        .create_triangles()
    }

    #[test]
    fn invalid_indices_are_rejected() {
        let p = vec![Point3f::ZERO, Point3f::new(1.0, 0.0, 0.0), Point3f::new(0.0, 1.0, 0.0)];
        assert!(TriangleMesh::new(vec![0, 1], p.clone(), vec![], vec![]).is_err());
        assert!(TriangleMesh::new(vec![0, 1, 3], p.clone(), vec![], vec![]).is_err());
        assert!(TriangleMesh::new(vec![0, 1, 2], p.clone(), vec![Normal3f::new(0.0, 0.0, 1.0)], vec![]).is_err());
        assert!(TriangleMesh::new(vec![0, 1, 2], p, vec![], vec![]).is_ok());
    }

    #[test]
    fn square_is_covered_by_two_triangles() {
        let tris = square();
        assert_eq!(tris.len(), 2);
        let total: Float = tris.iter().map(|t| t.area()).sum();
        assert!(approx_eq!(Float, total, 1.0, epsilon = 1e-6));

        let ray = Ray::new(Point3f::new(0.75, 0.25, 1.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY, 0.0, None);
        let hits: Vec<SurfaceInteraction> = tris.iter().filter_map(|t| t.intersect(&ray)).collect();
        assert_eq!(hits.len(), 1);
        assert!(approx_eq!(Float, hits[0].hit.t, 1.0, epsilon = 1e-6));
        assert!(approx_eq!(Float, hits[0].hit.p.x, 0.75, epsilon = 1e-6));
        assert!(approx_eq!(Float, hits[0].hit.n.z.abs(), 1.0, epsilon = 1e-6));
    }

    #[test]
    fn shading_normals_orient_geometric_normal() {
        let mesh = TriangleMesh::new(
            vec![0, 1, 2],
            vec![Point3f::ZERO, Point3f::new(1.0, 0.0, 0.0), Point3f::new(0.0, 1.0, 0.0)],
            vec![Normal3f::new(0.0, 0.0, -1.0); 3],
            vec![],
        )
        .unwrap();
        let tri = &mesh.create_triangles()[0];
        let ray = Ray::new(Point3f::new(0.2, 0.2, 1.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY, 0.0, None);
        let si = tri.intersect(&ray).unwrap();
        assert!(si.hit.n.z < 0.0);
        assert!(approx_eq!(Float, si.shading.n.z, -1.0, epsilon = 1e-6));
    }

    proptest! {
        #[test]
        fn samples_lie_on_triangle(u0 in 0.0..1.0f32, u1 in 0.0..1.0f32) {
            let tri = &square()[0];
            let ss = tri.sample_area(&Point2f::new(u0, u1));
            prop_assert!(approx_eq!(Float, ss.hit.p.z, 0.0, epsilon = 1e-6));
            prop_assert!(ss.hit.p.x >= ss.hit.p.y - 1e-5);
            prop_assert!(approx_eq!(Float, ss.pdf, 2.0, epsilon = 1e-5));
        }
    }
}
