use glam::DVec3;

/// Point-mass body used by the headless host. Forces accumulate between
/// fixed steps and are consumed by [`RigidBody::integrate`].
#[derive(Clone, Debug)]
pub struct RigidBody {
    pub position: DVec3,
    pub velocity: DVec3,
    mass: f64,
    linear_damping: f64,
    force: DVec3,
    asleep: bool,
}

impl RigidBody {
    pub fn new(position: DVec3, mass: f64, linear_damping: f64) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            mass,
            linear_damping,
            force: DVec3::ZERO,
            asleep: false,
        }
    }

    pub fn add_force(&mut self, force: DVec3) {
        if !self.asleep {
            self.force += force;
        }
    }

    pub fn pending_force(&self) -> DVec3 {
        self.force
    }

    /// Semi-implicit Euler with velocity damping.
    pub fn integrate(&mut self, dt: f64) {
        if self.asleep {
            self.force = DVec3::ZERO;
            return;
        }
        self.velocity += self.force / self.mass * dt;
        self.velocity *= 1.0 / (1.0 + self.linear_damping * dt);
        self.position += self.velocity * dt;
        self.force = DVec3::ZERO;
    }

    pub fn stop(&mut self) {
        self.velocity = DVec3::ZERO;
        self.force = DVec3::ZERO;
    }

    pub fn sleep(&mut self) {
        self.asleep = true;
        self.stop();
    }

    pub fn wake_up(&mut self) {
        self.asleep = false;
    }

    pub fn is_sleeping(&self) -> bool {
        self.asleep
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn force_accelerates_then_clears() {
        let mut body = RigidBody::new(DVec3::ZERO, 1.0, 0.0);
        body.add_force(DVec3::new(2.0, 0.0, 0.0));
        body.integrate(0.5);
        assert_eq!(body.velocity, DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(body.position, DVec3::new(0.5, 0.0, 0.0));
        body.integrate(0.5);
        assert_eq!(body.velocity, DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn sleeping_body_ignores_forces() {
        let mut body = RigidBody::new(DVec3::ZERO, 1.0, 0.0);
        body.velocity = DVec3::ONE;
        body.sleep();
        body.add_force(DVec3::ONE);
        body.integrate(1.0);
        assert_eq!(body.position, DVec3::ZERO);
        body.wake_up();
        body.add_force(DVec3::X);
        body.integrate(1.0);
        assert_eq!(body.velocity, DVec3::X);
    }
}
