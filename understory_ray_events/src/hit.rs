// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hit testing: turn a pointer's aim into the nearest valid scene node.
//!
//! The router does not intersect geometry itself. Hosts implement
//! [`Raycaster`] over whatever spatial structure they own and the router
//! merges the candidates every raycaster reports:
//!
//! 1. Candidates from all raycasters are collected and stably sorted by distance.
//! 2. The first candidate that is alive, within the pointer length, on an
//!    enabled layer, and pickable by the source's [`SelectionFlags`] wins.
//!
//! Ray pointers without a dedicated [`EventCamera`] share one scratch camera
//! owned by the router. It is aimed along the ray for a single query and put
//! back to its default pose afterwards, so no ray observes another's pose.

use alloc::vec::Vec;

use glam::Vec3;
use kurbo::Point;
use understory_scene::{LayerMask, NodeId, Scene, SelectionFlags};

use crate::record::RaycastResult;
use crate::types::PointerId;

/// A world-space ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    /// Start point.
    pub origin: Vec3,
    /// Direction; need not be normalized.
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray.
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at `distance` along the normalized direction.
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction.normalize_or_zero() * distance
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z)
    }
}

/// Camera-equivalent pose that raycasters project from.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EventCamera {
    /// Eye position.
    pub origin: Vec3,
    /// Unit view direction.
    pub forward: Vec3,
    /// Unit up vector, orthogonal to `forward`.
    pub up: Vec3,
}

impl Default for EventCamera {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

impl EventCamera {
    /// A camera looking along `ray`.
    pub fn along(ray: Ray) -> Self {
        let mut camera = Self::default();
        camera.aim(ray);
        camera
    }

    /// The ray through the center of the view.
    pub fn ray(&self) -> Ray {
        Ray::new(self.origin, self.forward)
    }

    fn aim(&mut self, ray: Ray) {
        let forward = ray.direction.normalize_or_zero();
        self.origin = ray.origin;
        if forward == Vec3::ZERO {
            self.forward = Vec3::NEG_Z;
            self.up = Vec3::Y;
            return;
        }
        self.forward = forward;
        // Pick a reference axis that is not parallel to the view direction.
        let reference = if forward.cross(Vec3::Y).length_squared() > 1e-6 {
            Vec3::Y
        } else {
            Vec3::Z
        };
        self.up = forward.cross(reference).cross(forward).normalize_or_zero();
    }
}

/// What a hit query is aimed at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum QueryTarget<'a> {
    /// Project from a camera pose (ray pointers).
    Camera(&'a EventCamera),
    /// A point in screen space (the screen pointer).
    Screen(Point),
}

/// One hit-test request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitQuery<'a> {
    /// Pointer the query is made for.
    pub pointer: PointerId,
    /// Aim of the query.
    pub target: QueryTarget<'a>,
    /// Hits farther than this are discarded for camera queries.
    pub max_distance: f32,
}

/// One candidate reported by a [`Raycaster`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RaycastHit {
    /// Node that was hit.
    pub node: NodeId,
    /// Distance along the query ray.
    pub distance: f32,
    /// Hit point in the pointer's 2D event space.
    pub screen_position: Point,
    /// Hit point in world space.
    pub world_position: Vec3,
}

/// Host-provided intersection against some part of the scene.
pub trait Raycaster {
    /// Append every node `query` intersects to `out`, in any order.
    fn raycast(&mut self, scene: &Scene, query: &HitQuery<'_>, out: &mut Vec<RaycastHit>);
}

/// Pointer-specific filters applied to raycast candidates.
#[derive(Copy, Clone, Debug)]
pub(crate) struct HitFilter {
    pub(crate) max_distance: f32,
    pub(crate) layers: LayerMask,
    pub(crate) mode: SelectionFlags,
}

impl HitFilter {
    fn accepts(&self, scene: &Scene, hit: &RaycastHit, camera_query: bool) -> bool {
        let Some(node) = scene.get(hit.node) else {
            return false;
        };
        (!camera_query || hit.distance <= self.max_distance)
            && self.layers.contains(node.layer)
            && node.selection.intersects(self.mode)
    }
}

/// Aim of a pointer for this tick, as reported by its input source.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Aim<'a> {
    /// A world-space ray.
    Ray {
        /// Current pose.
        ray: Ray,
        /// Dedicated camera to query with, if the source has one.
        camera: Option<&'a EventCamera>,
    },
    /// A point in screen space.
    Screen(Point),
}

/// Router-owned scratch state for hit testing.
#[derive(Debug, Default)]
pub(crate) struct HitTester {
    camera: EventCamera,
    hits: Vec<RaycastHit>,
    candidates: Vec<(usize, RaycastHit)>,
}

impl HitTester {
    /// Resolve the nearest valid hit for one pointer.
    pub(crate) fn test(
        &mut self,
        scene: &Scene,
        raycasters: &mut [&mut dyn Raycaster],
        pointer: PointerId,
        aim: Aim<'_>,
        filter: HitFilter,
    ) -> RaycastResult {
        let Self {
            camera,
            hits,
            candidates,
        } = self;
        candidates.clear();

        let target = match aim {
            Aim::Ray {
                camera: Some(own), ..
            } => QueryTarget::Camera(own),
            Aim::Ray { ray, camera: None } => {
                camera.aim(ray);
                QueryTarget::Camera(&*camera)
            }
            Aim::Screen(point) => QueryTarget::Screen(point),
        };
        let camera_query = matches!(target, QueryTarget::Camera(_));
        let query = HitQuery {
            pointer,
            target,
            max_distance: filter.max_distance,
        };
        for (index, raycaster) in raycasters.iter_mut().enumerate() {
            hits.clear();
            raycaster.raycast(scene, &query, hits);
            candidates.extend(hits.drain(..).map(|hit| (index, hit)));
        }
        *camera = EventCamera::default();

        candidates.sort_by(|a, b| a.1.distance.total_cmp(&b.1.distance));
        candidates
            .iter()
            .find(|(_, hit)| filter.accepts(scene, hit, camera_query))
            .map_or(RaycastResult::NONE, |&(raycaster, hit)| RaycastResult {
                node: Some(hit.node),
                distance: hit.distance,
                screen_position: hit.screen_position,
                world_position: hit.world_position,
                raycaster,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use understory_scene::SceneNode;

    use crate::types::RayId;

    /// Reports a fixed candidate list and records the camera it saw.
    struct Fixed {
        hits: Vec<RaycastHit>,
        seen: Option<EventCamera>,
    }

    impl Raycaster for Fixed {
        fn raycast(&mut self, _: &Scene, query: &HitQuery<'_>, out: &mut Vec<RaycastHit>) {
            if let QueryTarget::Camera(c) = query.target {
                self.seen = Some(*c);
            }
            out.extend_from_slice(&self.hits);
        }
    }

    fn hit(node: NodeId, distance: f32) -> RaycastHit {
        RaycastHit {
            node,
            distance,
            screen_position: Point::new(f64::from(distance), 0.0),
            world_position: Vec3::ZERO,
        }
    }

    fn filter() -> HitFilter {
        HitFilter {
            max_distance: 10.0,
            layers: LayerMask::ALL,
            mode: SelectionFlags::RAY,
        }
    }

    #[test]
    fn nearest_valid_candidate_wins_across_raycasters() {
        let mut scene = Scene::new();
        let hidden = scene
            .insert(
                None,
                SceneNode {
                    layer: 3,
                    ..SceneNode::default()
                },
            )
            .unwrap();
        let direct_only = scene
            .insert(
                None,
                SceneNode {
                    selection: SelectionFlags::DIRECT,
                    ..SceneNode::default()
                },
            )
            .unwrap();
        let far = scene.insert(None, SceneNode::default()).unwrap();
        let near = scene.insert(None, SceneNode::default()).unwrap();

        let mut a = Fixed {
            hits: vec![hit(far, 4.0), hit(hidden, 0.5)],
            seen: None,
        };
        let mut b = Fixed {
            hits: vec![hit(direct_only, 1.0), hit(near, 2.0)],
            seen: None,
        };
        let mut tester = HitTester::default();
        let result = tester.test(
            &scene,
            &mut [&mut a, &mut b],
            PointerId::Ray(RayId(1)),
            Aim::Ray {
                ray: Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X),
                camera: None,
            },
            HitFilter {
                layers: LayerMask::ALL.without(3),
                ..filter()
            },
        );
        assert_eq!(result.node, Some(near));
        assert_eq!(result.raycaster, 1);

        // The scratch camera was aimed for the query and reset after it.
        let seen = a.seen.unwrap();
        assert_eq!(seen.origin, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(seen.forward, Vec3::X);
        assert_eq!(tester.camera, EventCamera::default());
    }

    #[test]
    fn distance_limit_and_stale_nodes() {
        let mut scene = Scene::new();
        let gone = scene.insert(None, SceneNode::default()).unwrap();
        let beyond = scene.insert(None, SceneNode::default()).unwrap();
        scene.remove(gone);

        let mut caster = Fixed {
            hits: vec![hit(gone, 1.0), hit(beyond, 12.0)],
            seen: None,
        };
        let mut tester = HitTester::default();
        let aim = Aim::Ray {
            ray: Ray::default(),
            camera: None,
        };
        let result = tester.test(&scene, &mut [&mut caster], PointerId::Screen, aim, filter());
        assert!(!result.is_valid());

        // Screen queries ignore the distance limit.
        let result = tester.test(
            &scene,
            &mut [&mut caster],
            PointerId::Screen,
            Aim::Screen(Point::ZERO),
            HitFilter {
                mode: SelectionFlags::all(),
                ..filter()
            },
        );
        assert_eq!(result.node, Some(beyond));
    }

    #[test]
    fn dedicated_camera_is_used_as_is() {
        let scene = Scene::new();
        let own = EventCamera {
            origin: Vec3::ONE,
            forward: Vec3::Z,
            up: Vec3::X,
        };
        let mut caster = Fixed {
            hits: Vec::new(),
            seen: None,
        };
        let mut tester = HitTester::default();
        tester.test(
            &scene,
            &mut [&mut caster],
            PointerId::Ray(RayId(2)),
            Aim::Ray {
                ray: Ray::default(),
                camera: Some(&own),
            },
            filter(),
        );
        assert_eq!(caster.seen, Some(own));
    }

    #[test]
    fn camera_along_vertical_ray_has_orthogonal_up() {
        let camera = EventCamera::along(Ray::new(Vec3::ZERO, Vec3::new(0.0, -3.0, 0.0)));
        assert_eq!(camera.forward, Vec3::NEG_Y);
        assert!(camera.up.dot(camera.forward).abs() < 1e-6);
        assert!((camera.up.length() - 1.0).abs() < 1e-6);
    }
}
