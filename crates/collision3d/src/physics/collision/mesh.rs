//! Triangle mesh collider
//!
//! Triangles are stored as authored, in model space, and transformed to
//! world space on demand. The world-space copy and its bounding box are
//! cached until the next transform or offset write.

use std::sync::OnceLock;

use log::trace;

use crate::foundation::math::{directions, Mat4, Transform, Vec3};

use super::aabb::AxisAlignedBox;
use super::primitives::{Interpenetration, Ray, SurfaceImpact};
use super::shape::{unsupported_pairing, Collider, ColliderShape, CollisionError, ShapeKind};
use super::tolerance::NEAREST_TRIANGLE_CANDIDATES;
use super::triangle::Triangle;

/// World-space triangles and their enclosing box
#[derive(Debug, Clone)]
struct MeshCache {
    triangles: Vec<Triangle>,
    bounding_box: AxisAlignedBox,
}

/// A collider made of triangles, placed by a transform
#[derive(Debug, Clone)]
pub struct TriangleMeshCollider {
    transform: Transform,
    offset: Vec3,
    /// Model-space triangles, never modified
    triangles: Vec<Triangle>,
    cache: OnceLock<MeshCache>,
}

impl TriangleMeshCollider {
    /// Create a mesh collider from model-space triangles
    pub fn new(transform: Transform, offset: Vec3, triangles: Vec<Triangle>) -> Result<Self, CollisionError> {
        if triangles.is_empty() {
            return Err(CollisionError::EmptyMesh);
        }
        Ok(Self {
            transform,
            offset,
            triangles,
            cache: OnceLock::new(),
        })
    }

    /// Create a mesh collider from model-space vertices and triangle indices
    ///
    /// Trailing indices that do not form a whole triangle are ignored; a
    /// zero-area triangle is an error.
    pub fn from_indexed(
        transform: Transform,
        offset: Vec3,
        vertices: &[Vec3],
        indices: &[u32],
    ) -> Result<Self, CollisionError> {
        let vertex = |index: u32| {
            usize::try_from(index)
                .ok()
                .and_then(|i| vertices.get(i))
                .copied()
                .ok_or(CollisionError::InvalidIndex {
                    index,
                    vertex_count: vertices.len(),
                })
        };

        let triangles = indices
            .chunks_exact(3)
            .map(|chunk| Ok(Triangle::new(vertex(chunk[0])?, vertex(chunk[1])?, vertex(chunk[2])?)))
            .collect::<Result<Vec<_>, CollisionError>>()?;
        if let Some(i) = triangles.iter().position(Triangle::is_degenerate) {
            return Err(CollisionError::DegenerateTriangle(i));
        }
        Self::new(transform, offset, triangles)
    }

    pub const fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Triangles as authored, not moved by the transform
    pub fn untransformed_triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Triangles moved, rotated and scaled by the transform and offset
    pub fn triangles(&self) -> &[Triangle] {
        &self.cached().triangles
    }

    /// Every triangle hit by `ray` and passing `filter`, with its hit point
    pub fn triangles_hit(&self, ray: &Ray, filter: impl Fn(&Triangle) -> bool) -> Vec<(Vec3, Triangle)> {
        self.triangles()
            .iter()
            .filter(|&triangle| filter(triangle))
            .filter_map(|triangle| triangle.surface_point(ray).map(|point| (point, *triangle)))
            .collect()
    }

    /// Drop the world-space copy; it is rebuilt on the next read
    pub fn invalidate(&mut self) {
        self.cache.take();
    }

    fn cached(&self) -> &MeshCache {
        self.cache.get_or_init(|| self.recompute())
    }

    fn matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.offset) * self.transform.to_matrix()
    }

    fn recompute(&self) -> MeshCache {
        trace!("Rebuilding {} world-space mesh triangles", self.triangles.len());
        let matrix = self.matrix();
        let triangles: Vec<Triangle> = self.triangles.iter().map(|t| t.transformed(&matrix)).collect();
        let positions: Vec<Vec3> = triangles.iter().flat_map(|t| t.positions).collect();
        MeshCache {
            bounding_box: AxisAlignedBox::from_positions(&positions),
            triangles,
        }
    }

    fn nearest_hit(&self, ray: &Ray) -> Option<(Vec3, Triangle)> {
        self.triangles_hit(ray, |_| true)
            .into_iter()
            .min_by(|(a, _), (b, _)| (a - ray.origin).norm().total_cmp(&(b - ray.origin).norm()))
    }

    /// The triangle whose surface is closest to `point`, searched among the
    /// [`NEAREST_TRIANGLE_CANDIDATES`] triangles with the nearest centers
    ///
    /// A triangle with a far center but a close surface can be missed.
    fn closest_triangle(&self, point: &Vec3) -> Option<&Triangle> {
        let mut candidates: Vec<&Triangle> = self.triangles().iter().collect();
        candidates.sort_by(|a, b| (a.center - point).norm().total_cmp(&(b.center - point).norm()));
        candidates.truncate(NEAREST_TRIANGLE_CANDIDATES);

        let distance = |triangle: &Triangle| (triangle.closest_surface_point(point) - point).norm();
        candidates
            .into_iter()
            .min_by(|&a, &b| distance(a).total_cmp(&distance(b)))
    }
}

impl PartialEq for TriangleMeshCollider {
    fn eq(&self, other: &Self) -> bool {
        self.transform == other.transform && self.offset == other.offset && self.triangles == other.triangles
    }
}

impl ColliderShape for TriangleMeshCollider {
    fn center(&self) -> Vec3 {
        self.transform.position
    }

    fn offset(&self) -> Vec3 {
        self.offset
    }

    fn bounding_box(&self) -> AxisAlignedBox {
        self.cached().bounding_box
    }

    fn update(&mut self, transform: &Transform) {
        if self.transform != *transform {
            self.transform = *transform;
            self.invalidate();
        }
    }

    fn update_size_and_offset(&mut self, transform: &Transform) {
        self.offset = transform.position;
        self.transform.scale = transform.scale;
        self.invalidate();
    }

    fn closest_surface_point(&self, point: &Vec3) -> Vec3 {
        self.closest_triangle(point)
            .map_or(self.position(), |triangle| triangle.closest_surface_point(point))
    }

    /// The deepest colliding triangle contact
    fn interpenetration(&self, other: &Collider) -> Option<Interpenetration> {
        if let Collider::AxisAlignedBox(_) | Collider::Triangle(_) | Collider::Mesh(_) = other {
            unsupported_pairing(ShapeKind::Mesh, other.kind());
        }

        self.triangles()
            .iter()
            .filter_map(|triangle| triangle.interpenetration(other))
            .filter(Interpenetration::is_colliding)
            .min_by(|a, b| a.depth.total_cmp(&b.depth))
    }

    fn surface_point(&self, ray: &Ray) -> Option<Vec3> {
        self.nearest_hit(ray).map(|(point, _)| point)
    }

    fn surface_normal(&self, point: &Vec3) -> Vec3 {
        self.closest_triangle(point)
            .map_or_else(directions::up, |triangle| triangle.normal)
    }

    fn surface_impact(&self, ray: &Ray) -> Option<SurfaceImpact> {
        self.nearest_hit(ray).map(|(position, triangle)| SurfaceImpact {
            normal: triangle.normal,
            position,
            triangle: Some(triangle),
        })
    }
}
