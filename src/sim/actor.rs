//! The physics actor: one platformer character and everything the
//! simulation knows about it.
//!
//! Hosts drive it through action triggers (`walk_right`, `jump`, …) which
//! press virtual buttons, then call [`PhysicsActor::update`] once per
//! frame.  All the per-tick rules live in [`super::step`].

use glam::{IVec2, Vec2};
use log::debug;

use crate::defs::{
    Buttons, Param, ParamError, SensorMask, Tunables, airdrag_coefficients, trig,
};
use crate::world::{Layer, MovementMode, Obstacle, ObstacleMap};

use super::{
    components::{ActorSnapshot, Pose, Slot, State, movement_mode_of},
    input::{InputSource, VirtualInput},
    sensor::Sensor,
    step::Step,
    tic::FixedStep,
};

/// Sensor geometry per pose, in slot order A B C D M N U.
#[rustfmt::skip]
const SENSORS: [[Sensor; 7]; Pose::COUNT] = [
    // standing
    [
        Sensor::vertical(-9, 0, 20), Sensor::vertical(9, 0, 20),
        Sensor::vertical(-9, -24, 0), Sensor::vertical(9, -24, 0),
        Sensor::horizontal(4, -10, 0), Sensor::horizontal(4, 0, 10),
        Sensor::horizontal(-4, 0, 0),
    ],
    // airborne
    [
        Sensor::vertical(-9, 0, 20), Sensor::vertical(9, 0, 20),
        Sensor::vertical(-9, -24, 0), Sensor::vertical(9, -24, 0),
        Sensor::horizontal(0, -11, 0), Sensor::horizontal(0, 0, 11),
        Sensor::horizontal(-4, 0, 0),
    ],
    // rolling
    [
        Sensor::vertical(-5, 0, 19), Sensor::vertical(5, 0, 19),
        Sensor::vertical(-5, -10, 0), Sensor::vertical(5, -10, 0),
        Sensor::horizontal(0, -11, 0), Sensor::horizontal(0, 0, 11),
        Sensor::horizontal(-4, 0, 0),
    ],
];

/// One sensor as seen by a debug observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorLine {
    pub slot: Slot,
    pub head: IVec2,
    pub tail: IVec2,
    pub enabled: bool,
}

pub struct PhysicsActor {
    pub(crate) position: Vec2,
    pub(crate) xsp: f32,
    pub(crate) ysp: f32,
    pub(crate) gsp: f32,
    pub(crate) angle: u8,
    pub(crate) mode: MovementMode,
    pub(crate) state: State,
    pub(crate) layer: Layer,

    pub(crate) midair: bool,
    pub(crate) was_midair: bool,
    pub(crate) facing_right: bool,
    pub(crate) touching_ceiling: bool,
    pub(crate) inside_wall: bool,
    pub(crate) winning_pose: bool,
    pub(crate) sticky_lock: bool,

    /* timers, in seconds */
    pub(crate) hlock_timer: f32,
    pub(crate) jump_lock_timer: f32,
    pub(crate) wait_timer: f32,
    pub(crate) midair_timer: f32,
    pub(crate) breathe_timer: f32,

    pub(crate) charge_intensity: f32,
    pub(crate) cfg: Tunables,
    pub(crate) airdrag_coefficients: [f32; 2],

    pub(crate) sensors: [[Sensor; 7]; Pose::COUNT],
    pub(crate) enabled: SensorMask,
    pub(crate) angle_sensors: [Vec2; 2],

    pub(crate) input: Box<dyn InputSource + Send + Sync>,
    clock: FixedStep,
}

impl std::fmt::Debug for PhysicsActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsActor")
            .field("position", &self.position)
            .field("xsp", &self.xsp)
            .field("ysp", &self.ysp)
            .field("gsp", &self.gsp)
            .field("angle", &self.angle)
            .field("mode", &self.mode)
            .field("state", &self.state)
            .field("midair", &self.midair)
            .finish_non_exhaustive()
    }
}

impl PhysicsActor {
    pub fn new(position: Vec2) -> Self {
        Self::with_input(position, Box::new(VirtualInput::new()))
    }

    pub fn with_input(position: Vec2, input: Box<dyn InputSource + Send + Sync>) -> Self {
        debug!("physics actor created at {position}");
        let cfg = Tunables::default();
        let airdrag_coefficients = airdrag_coefficients(cfg.airdrag);
        Self {
            position,
            xsp: 0.0,
            ysp: 0.0,
            gsp: 0.0,
            angle: 0,
            mode: MovementMode::Floor,
            state: State::Stopped,
            layer: Layer::Default,
            midair: true,
            was_midair: true,
            facing_right: true,
            touching_ceiling: false,
            inside_wall: false,
            winning_pose: false,
            sticky_lock: false,
            hlock_timer: 0.0,
            jump_lock_timer: 0.0,
            wait_timer: 0.0,
            midair_timer: 0.0,
            breathe_timer: 0.0,
            charge_intensity: 0.0,
            cfg,
            airdrag_coefficients,
            sensors: SENSORS,
            enabled: SensorMask::empty(),
            angle_sensors: [position; 2],
            input,
            clock: FixedStep::default(),
        }
    }

    /* ---------------------------------------------------------------- */
    /* simulation                                                       */
    /* ---------------------------------------------------------------- */

    /// Advance one real-time frame of `dt` seconds.  Runs at the fixed
    /// rate while the host keeps up and falls back to `dt` when it lags.
    pub fn update<M: ObstacleMap>(&mut self, map: &M, dt: f32) {
        debug_assert!(dt.is_finite() && dt >= 0.0, "bad frame delta {dt}");

        // inside a solid brick, possibly smashed?
        let at_u = self
            .sensor(Slot::U)
            .check(self.position, self.mode, self.layer, map);
        self.inside_wall = at_u.is_some_and(|o| o.is_solid());

        let dt = self.clock.advance(dt);
        Step::run(self, map, dt);
        self.input.end_frame();
    }

    /* ---------------------------------------------------------------- */
    /* sensors                                                          */
    /* ---------------------------------------------------------------- */

    #[inline]
    pub fn pose(&self) -> Pose {
        Pose::select(self.state, self.midair)
    }

    /// Active sensor in `slot`.
    #[inline]
    pub fn sensor(&self, slot: Slot) -> &Sensor {
        &self.sensors[self.pose().index()][slot.index()]
    }

    #[inline]
    pub(crate) fn standing_sensor(&self, slot: Slot) -> &Sensor {
        &self.sensors[Pose::Standing.index()][slot.index()]
    }

    /// World-space segments of the active sensor set, for debug drawing.
    pub fn sensor_lines(&self) -> [SensorLine; 7] {
        Slot::ALL.map(|slot| {
            let sensor = self.sensor(slot);
            let enabled = match slot {
                Slot::A => self.enabled.contains(SensorMask::A),
                Slot::B => self.enabled.contains(SensorMask::B),
                Slot::C => self.enabled.contains(SensorMask::C),
                Slot::D => self.enabled.contains(SensorMask::D),
                Slot::M => self.enabled.contains(SensorMask::M),
                Slot::N => self.enabled.contains(SensorMask::N),
                Slot::U => true,
            };
            SensorLine {
                slot,
                head: sensor.head(self.position, self.mode),
                tail: sensor.tail(self.position, self.mode),
                enabled,
            }
        })
    }

    /// Ground points behind the last accepted angle, or the actor's own
    /// position twice when none was accepted.
    #[inline]
    pub fn angle_sensor_points(&self) -> [Vec2; 2] {
        self.angle_sensors
    }

    /* ---------------------------------------------------------------- */
    /* kinematics & state                                               */
    /* ---------------------------------------------------------------- */

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    #[inline]
    pub fn xsp(&self) -> f32 {
        self.xsp
    }

    #[inline]
    pub fn set_xsp(&mut self, value: f32) {
        self.xsp = value;
    }

    #[inline]
    pub fn ysp(&self) -> f32 {
        self.ysp
    }

    #[inline]
    pub fn set_ysp(&mut self, value: f32) {
        self.ysp = value;
    }

    #[inline]
    pub fn gsp(&self) -> f32 {
        self.gsp
    }

    #[inline]
    pub fn set_gsp(&mut self, value: f32) {
        self.gsp = value;
    }

    /// Raw angle byte, clockwise, `0` = flat floor.
    #[inline]
    pub fn angle(&self) -> u8 {
        self.angle
    }

    /// Angle in counter-clockwise degrees, `0..360`.
    #[inline]
    pub fn angle_degrees(&self) -> i32 {
        trig::to_degrees(self.angle)
    }

    /// Sets the angle and the movement mode that goes with it.
    pub fn set_angle(&mut self, angle: u8) {
        self.angle = angle;
        self.mode = movement_mode_of(angle, self.mode);
    }

    #[inline]
    pub fn movement_mode(&self) -> MovementMode {
        self.mode
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn layer(&self) -> Layer {
        self.layer
    }

    #[inline]
    pub fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    #[inline]
    pub fn is_midair(&self) -> bool {
        self.midair
    }

    #[inline]
    pub fn is_touching_ceiling(&self) -> bool {
        self.touching_ceiling
    }

    #[inline]
    pub fn is_facing_right(&self) -> bool {
        self.facing_right
    }

    #[inline]
    pub fn is_inside_wall(&self) -> bool {
        self.inside_wall
    }

    #[inline]
    pub fn charge_intensity(&self) -> f32 {
        self.charge_intensity
    }

    /// Height difference between the standing and rolling foot sensors.
    pub fn roll_delta(&self) -> i32 {
        let standing = &self.sensors[Pose::Standing.index()][Slot::A.index()];
        let rolling = &self.sensors[Pose::Rolling.index()][Slot::A.index()];
        standing.y2() - rolling.y2()
    }

    /// `(width, height, centre)` of the hitbox spanned by the sensors.
    pub fn bounding_box(&self) -> (i32, i32, Vec2) {
        let (pos, mode) = (self.position, self.mode);
        let a = self.standing_sensor(Slot::A).tail(pos, mode);
        let d = self.sensor(Slot::D).head(pos, mode);
        let m = self.sensor(Slot::M).head(pos, mode);
        let n = self.sensor(Slot::N).tail(pos, mode);

        let (w, h) = match mode {
            MovementMode::Floor => (n.x - m.x + 1, a.y - d.y + 1),
            MovementMode::Ceiling => (m.x - n.x + 1, d.y - a.y + 1),
            MovementMode::RightWall => (a.x - d.x + 1, m.y - n.y + 1),
            MovementMode::LeftWall => (d.x - a.x + 1, n.y - m.y + 1),
        };
        (w, h, pos)
    }

    /// Is either foot sensor touching `obstacle`?
    pub fn is_standing_on<O: Obstacle + ?Sized>(&self, obstacle: &O) -> bool {
        [Slot::A, Slot::B].into_iter().any(|slot| {
            let (min, max) = self.sensor(slot).world_rect(self.position, self.mode);
            obstacle.got_collision(min.x, min.y, max.x, max.y)
        })
    }

    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            position: self.position,
            xsp: self.xsp,
            ysp: self.ysp,
            gsp: self.gsp,
            angle: self.angle,
            mode: self.mode,
            state: self.state,
            midair: self.midair,
            facing_right: self.facing_right,
            touching_ceiling: self.touching_ceiling,
            inside_wall: self.inside_wall,
        }
    }

    /* ---------------------------------------------------------------- */
    /* tunables                                                         */
    /* ---------------------------------------------------------------- */

    #[inline]
    pub fn tunables(&self) -> &Tunables {
        &self.cfg
    }

    #[inline]
    pub fn param(&self, param: Param) -> f32 {
        self.cfg.get(param)
    }

    pub fn set_param(&mut self, param: Param, value: f32) -> Result<(), ParamError> {
        self.cfg.set(param, value)?;
        if param == Param::AirDrag {
            self.airdrag_coefficients = airdrag_coefficients(self.cfg.airdrag);
        }
        Ok(())
    }

    /// Apply a `name=value` assignment.
    pub fn apply_assignment(&mut self, text: &str) -> Result<(), ParamError> {
        let (param, value) = Param::parse_assignment(text)?;
        self.set_param(param, value)
    }

    pub fn set_jump_attenuation(&mut self, enabled: bool) {
        self.cfg.jump_attenuation = enabled;
    }

    pub fn reset_model_parameters(&mut self) {
        self.cfg = Tunables::default();
        self.airdrag_coefficients = airdrag_coefficients(self.cfg.airdrag);
    }

    #[inline]
    pub fn airdrag_coefficients(&self) -> [f32; 2] {
        self.airdrag_coefficients
    }

    /* ---------------------------------------------------------------- */
    /* input & action triggers                                          */
    /* ---------------------------------------------------------------- */

    #[inline]
    pub fn input(&self) -> &dyn InputSource {
        self.input.as_ref()
    }

    #[inline]
    pub fn input_mut(&mut self) -> &mut dyn InputSource {
        self.input.as_mut()
    }

    /// Press every button in `buttons` for this frame.
    pub fn press(&mut self, buttons: Buttons) {
        for b in buttons.iter() {
            self.input.simulate_down(b);
        }
    }

    pub fn walk_right(&mut self) {
        self.input.simulate_down(Buttons::RIGHT);
    }

    pub fn walk_left(&mut self) {
        self.input.simulate_down(Buttons::LEFT);
    }

    pub fn duck(&mut self) {
        self.input.simulate_down(Buttons::DOWN);
    }

    pub fn look_up(&mut self) {
        self.input.simulate_down(Buttons::UP);
    }

    pub fn jump(&mut self) {
        self.input.simulate_down(Buttons::FIRE1);
    }

    fn force_state(&mut self, state: State) {
        if self.state != state {
            debug!("{:?} -> {:?} (triggered)", self.state, state);
        }
        self.state = state;
    }

    pub fn kill(&mut self) {
        self.force_state(State::Dead);
    }

    pub fn hit(&mut self) {
        self.force_state(State::GettingHit);
    }

    pub fn bounce(&mut self) {
        self.force_state(State::Jumping);
    }

    pub fn spring(&mut self) {
        self.force_state(State::Springing);
    }

    pub fn roll(&mut self) {
        self.force_state(State::Rolling);
    }

    pub fn drown(&mut self) {
        self.force_state(State::Drowned);
    }

    pub fn breathe(&mut self) {
        self.force_state(State::Breathing);
        self.breathe_timer = 0.5;
    }

    /// Brake to a halt and strike the pose.  The pose takes over the
    /// input until [`PhysicsActor::resurrect`].
    pub fn enable_winning_pose(&mut self) {
        debug!("winning pose enabled");
        self.winning_pose = true;
    }

    /// Bring a dead or drowned actor back at `position`, with its input
    /// handed back to the host.  Returns `false` (and does nothing) for a
    /// living actor.
    pub fn resurrect(&mut self, position: Vec2) -> bool {
        if !matches!(self.state, State::Dead | State::Drowned) {
            return false;
        }
        debug!("resurrected at {position}");
        self.gsp = 0.0;
        self.xsp = 0.0;
        self.ysp = 0.0;
        self.facing_right = true;
        self.state = State::Stopped;
        self.position = position;
        self.winning_pose = false;
        self.input.reset();
        self.input.enable();
        true
    }

    /// Ignore left/right input for at least `seconds`.  Never shortens a
    /// running lock.
    pub fn lock_horizontally_for(&mut self, seconds: f32) {
        let seconds = seconds.max(0.0);
        if seconds > self.hlock_timer {
            self.hlock_timer = seconds;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Brick;

    #[test]
    fn fresh_actor_defaults() {
        let pa = PhysicsActor::new(Vec2::new(10.0, 20.0));
        assert_eq!(pa.state(), State::Stopped);
        assert_eq!(pa.movement_mode(), MovementMode::Floor);
        assert!(pa.is_midair());
        assert!(pa.is_facing_right());
        assert_eq!(pa.angle_degrees(), 0);
        assert_eq!(pa.roll_delta(), 1);
        assert_eq!(pa.airdrag_coefficients(), airdrag_coefficients(31.0 / 32.0));
    }

    #[test]
    fn bounding_box_on_the_floor() {
        let mut pa = PhysicsActor::new(Vec2::new(100.0, 100.0));
        pa.midair = false;
        let (w, h, centre) = pa.bounding_box();
        assert_eq!((w, h), (21, 45));
        assert_eq!(centre, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn air_drag_changes_recompute_coefficients() {
        let mut pa = PhysicsActor::new(Vec2::ZERO);
        pa.set_param(Param::AirDrag, 1.0).unwrap();
        assert_eq!(pa.airdrag_coefficients(), [0.0, 1.0]);
        pa.apply_assignment("airdrag=0").unwrap();
        assert_eq!(pa.airdrag_coefficients(), [0.0, 0.0]);
        pa.reset_model_parameters();
        assert_eq!(pa.param(Param::AirDrag), 31.0 / 32.0);
    }

    #[test]
    fn resurrect_only_the_dead() {
        let mut pa = PhysicsActor::new(Vec2::ZERO);
        assert!(!pa.resurrect(Vec2::ONE));
        pa.kill();
        pa.set_ysp(100.0);
        assert!(pa.resurrect(Vec2::ONE));
        assert_eq!(pa.state(), State::Stopped);
        assert_eq!(pa.position(), Vec2::ONE);
        assert_eq!(pa.ysp(), 0.0);
    }

    #[test]
    fn resurrect_hands_the_input_back() {
        let mut pa = PhysicsActor::new(Vec2::ZERO);
        pa.enable_winning_pose();
        pa.input_mut().disable();
        pa.drown();
        assert!(pa.resurrect(Vec2::ONE));

        pa.walk_right();
        assert!(pa.input().is_down(Buttons::RIGHT));
        assert!(!pa.winning_pose);
    }

    #[test]
    fn horizontal_lock_only_grows() {
        let mut pa = PhysicsActor::new(Vec2::ZERO);
        pa.lock_horizontally_for(0.5);
        pa.lock_horizontally_for(0.2);
        pa.lock_horizontally_for(-3.0);
        assert_eq!(pa.hlock_timer, 0.5);
    }

    #[test]
    fn standing_on_a_brick() {
        let floor = Brick::solid(0, 100, 64, 16);
        let far = Brick::solid(500, 100, 64, 16);
        let pa = PhysicsActor::new(Vec2::new(32.0, 81.0));
        assert!(pa.is_standing_on(&floor));
        assert!(!pa.is_standing_on(&far));
    }
}
