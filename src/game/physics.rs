use nalgebra::UnitQuaternion;
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use super::constants::physics as consts;

/// Static description of a character box body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub half_extents: [f32; 3],
    pub mass: f32,
    pub linear_damping: f32,
}

impl BodySpec {
    /// Builds a spec from full box dimensions (width, height, depth).
    pub fn from_size(size: [f32; 3], mass: f32, linear_damping: f32) -> Self {
        Self {
            half_extents: [size[0] / 2.0, size[1] / 2.0, size[2] / 2.0],
            mass,
            linear_damping,
        }
    }

    fn volume(&self) -> f32 {
        let [hx, hy, hz] = self.half_extents;
        8.0 * hx * hy * hz
    }
}

/// Kinematic state of a body, used to park a body outside the simulation
/// and to transfer pose between bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub translation: [f32; 3],
    /// Quaternion [x, y, z, w]
    pub rotation: [f32; 4],
    pub linvel: [f32; 3],
    pub angvel: [f32; 3],
}

impl BodyState {
    pub fn at(translation: [f32; 3]) -> Self {
        Self {
            translation,
            rotation: [0.0, 0.0, 0.0, 1.0],
            linvel: [0.0; 3],
            angvel: [0.0; 3],
        }
    }

    /// Same pose, zero velocity.
    pub fn at_rest(self) -> Self {
        Self {
            linvel: [0.0; 3],
            angvel: [0.0; 3],
            ..self
        }
    }

    fn unit_rotation(&self) -> UnitQuaternion<f32> {
        let [x, y, z, w] = self.rotation;
        UnitQuaternion::from_quaternion(nalgebra::Quaternion::new(w, x, y, z))
    }
}

/// Wrapper around the rapier3d pipeline used by the character core.
pub struct PhysicsWorld {
    pub gravity: Vector<Real>,
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub integration_parameters: IntegrationParameters,
    pub physics_pipeline: PhysicsPipeline,
    pub island_manager: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub impulse_joint_set: ImpulseJointSet,
    pub multibody_joint_set: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Creates a new physics world with the given downward gravity
    pub fn new(gravity_y: f32) -> Self {
        Self {
            gravity: vector![0.0, -gravity_y, 0.0],
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Steps the physics simulation forward by dt seconds
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Rebuilds the query pipeline after bodies were added or removed outside a step.
    pub fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Adds fixed box geometry (floors, walls, furniture).
    pub fn add_static_box(&mut self, center: [f32; 3], half_extents: [f32; 3]) -> RigidBodyHandle {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![center[0], center[1], center[2]])
            .build();
        let handle = self.rigid_body_set.insert(body);
        let collider = ColliderBuilder::cuboid(half_extents[0], half_extents[1], half_extents[2])
            .friction(0.3)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.refresh_queries();
        handle
    }

    /// Adds a large flat ground whose top face lies at y = 0.
    pub fn add_ground_plane(&mut self) -> RigidBodyHandle {
        self.add_static_box([0.0, -0.5, 0.0], [500.0, 0.5, 500.0])
    }

    /// Inserts a dynamic character box into the simulation.
    /// Rotation is locked so the character never tips over.
    pub fn insert_character_body(&mut self, spec: &BodySpec, state: BodyState) -> RigidBodyHandle {
        let [tx, ty, tz] = state.translation;
        let mut body = RigidBodyBuilder::dynamic()
            .translation(vector![tx, ty, tz])
            .linear_damping(spec.linear_damping)
            .lock_rotations()
            .can_sleep(false)
            .build();
        body.set_rotation(state.unit_rotation(), false);
        body.set_linvel(vector![state.linvel[0], state.linvel[1], state.linvel[2]], false);
        body.set_angvel(vector![state.angvel[0], state.angvel[1], state.angvel[2]], false);
        let handle = self.rigid_body_set.insert(body);

        let [hx, hy, hz] = spec.half_extents;
        let density = if spec.volume() > consts::EPSILON {
            spec.mass / spec.volume()
        } else {
            1.0
        };
        let collider = ColliderBuilder::cuboid(hx, hy, hz)
            .friction(consts::CHARACTER_FRICTION)
            .restitution(consts::CHARACTER_RESTITUTION)
            .density(density)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        self.refresh_queries();
        handle
    }

    /// Removes a character body from the simulation, returning its last state.
    pub fn remove_character_body(&mut self, handle: RigidBodyHandle) -> Option<BodyState> {
        let state = self.body_state(handle)?;
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        self.refresh_queries();
        Some(state)
    }

    /// Whether the handle refers to a body currently in the simulation
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    /// Reads the full kinematic state of a body
    pub fn body_state(&self, handle: RigidBodyHandle) -> Option<BodyState> {
        self.rigid_body_set.get(handle).map(|body| {
            let t = body.translation();
            let r = body.rotation();
            let v = body.linvel();
            let w = body.angvel();
            BodyState {
                translation: [t.x, t.y, t.z],
                rotation: [r.i, r.j, r.k, r.w],
                linvel: [v.x, v.y, v.z],
                angvel: [w.x, w.y, w.z],
            }
        })
    }

    /// Gets the position of a rigid body
    pub fn translation(&self, handle: RigidBodyHandle) -> Option<[f32; 3]> {
        self.rigid_body_set.get(handle).map(|body| {
            let pos = body.translation();
            [pos.x, pos.y, pos.z]
        })
    }

    /// Gets the linear velocity of a rigid body
    pub fn linvel(&self, handle: RigidBodyHandle) -> Option<[f32; 3]> {
        self.rigid_body_set.get(handle).map(|body| {
            let vel = body.linvel();
            [vel.x, vel.y, vel.z]
        })
    }

    /// Sets the linear velocity of a dynamic body
    pub fn set_linvel(&mut self, handle: RigidBodyHandle, velocity: [f32; 3]) -> bool {
        match self.rigid_body_set.get_mut(handle) {
            Some(body) if body.is_dynamic() => {
                body.set_linvel(vector![velocity[0], velocity[1], velocity[2]], true);
                true
            }
            _ => false,
        }
    }

    /// Casts a ray straight down from `origin`.
    /// Returns (hit_distance, hit_y) for the closest solid hit within max_distance.
    pub fn raycast_down(
        &self,
        origin: [f32; 3],
        max_distance: f32,
        exclude_body: Option<RigidBodyHandle>,
    ) -> Option<(f32, f32)> {
        let ray = Ray::new(point![origin[0], origin[1], origin[2]], vector![0.0, -1.0, 0.0]);

        let filter = match exclude_body {
            Some(body_handle) => QueryFilter::default()
                .exclude_rigid_body(body_handle)
                .exclude_sensors(),
            None => QueryFilter::default().exclude_sensors(),
        };

        let (_, toi) = self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &ray,
            max_distance,
            true,
            filter,
        )?;
        let hit_point = ray.point_at(toi);
        Some((toi, hit_point.y))
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(consts::DEFAULT_GRAVITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocky_spec() -> BodySpec {
        BodySpec {
            half_extents: [0.24, 0.3, 0.24],
            mass: 70.0,
            linear_damping: 0.5,
        }
    }

    #[test]
    fn test_physics_world_creation() {
        let world = PhysicsWorld::default();
        assert_eq!(world.gravity.y, -consts::DEFAULT_GRAVITY);
    }

    #[test]
    fn test_body_from_size_halves_dimensions() {
        let spec = BodySpec::from_size([0.6, 0.5, 0.6], 70.0, 0.2);
        assert_eq!(spec.half_extents, [0.3, 0.25, 0.3]);
    }

    #[test]
    fn test_character_body_falls() {
        let mut world = PhysicsWorld::default();
        let handle = world.insert_character_body(&blocky_spec(), BodyState::at([0.0, 10.0, 0.0]));

        for _ in 0..10 {
            world.step(1.0 / 60.0);
        }

        let pos = world.translation(handle).unwrap();
        assert!(pos[1] < 10.0, "Body should fall, got y={}", pos[1]);
    }

    #[test]
    fn test_character_body_does_not_tip() {
        let mut world = PhysicsWorld::default();
        world.add_ground_plane();
        let handle = world.insert_character_body(&blocky_spec(), BodyState::at([0.0, 0.5, 0.0]));
        world.set_linvel(handle, [4.0, 0.0, 0.0]);

        for _ in 0..60 {
            world.step(1.0 / 60.0);
        }

        let state = world.body_state(handle).unwrap();
        assert!((state.rotation[3].abs() - 1.0).abs() < 1e-4, "Rotation should stay identity");
    }

    #[test]
    fn test_remove_and_reinsert_keeps_state() {
        let mut world = PhysicsWorld::default();
        let handle = world.insert_character_body(&blocky_spec(), BodyState::at([1.0, 2.0, 3.0]));
        world.set_linvel(handle, [0.0, 5.0, 0.0]);

        let parked = world.remove_character_body(handle).unwrap();
        assert!(!world.contains(handle));
        assert_eq!(parked.translation, [1.0, 2.0, 3.0]);
        assert_eq!(parked.linvel, [0.0, 5.0, 0.0]);

        let new_handle = world.insert_character_body(&blocky_spec(), parked.at_rest());
        assert_eq!(world.translation(new_handle).unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(world.linvel(new_handle).unwrap(), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_raycast_down_finds_ground() {
        let mut world = PhysicsWorld::default();
        world.add_ground_plane();

        let hit = world.raycast_down([0.0, 6.0, 0.0], 10.0, None);
        let (distance, ground_y) = hit.expect("Should detect floor");
        assert!((distance - 6.0).abs() < 1e-3, "Distance should be ~6, got {}", distance);
        assert!(ground_y.abs() < 1e-3, "Ground top should be y=0, got {}", ground_y);

        assert!(world.raycast_down([0.0, 6.0, 0.0], 5.0, None).is_none());
    }

    #[test]
    fn test_raycast_ignores_excluded_body() {
        let mut world = PhysicsWorld::default();
        world.add_ground_plane();
        let handle = world.insert_character_body(&blocky_spec(), BodyState::at([0.0, 3.0, 0.0]));

        // Ray starts inside the character box; without exclusion it hits the box itself.
        let own = world.raycast_down([0.0, 3.0, 0.0], 1.0, None);
        assert!(own.is_some());
        let excluded = world.raycast_down([0.0, 3.0, 0.0], 1.0, Some(handle));
        assert!(excluded.is_none());
    }
}
