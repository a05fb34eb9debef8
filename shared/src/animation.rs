//! Value holders and a spring scheduler for the crop transform.
//!
//! The shell owns the frame clock. It calls [`SpringScheduler::tick`] (through
//! the crop controller) with the elapsed time and renders whatever the
//! animated values hold afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

/// Displacement and speed below which a spring is considered settled.
pub const REST_THRESHOLD: f64 = 0.001;

// --- Listener handles ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(f64) + Send>;

/// A scalar that notifies subscribers whenever it is written.
pub struct AnimatedValue {
    value: f64,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl AnimatedValue {
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            value,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        for (_, listener) in &mut self.listeners {
            listener(value);
        }
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(f64) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if the listener was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for AnimatedValue {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl fmt::Debug for AnimatedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimatedValue")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// --- Spring parameters ---

/// Origami-style spring parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub tension: f64,
    pub friction: f64,
}

impl SpringConfig {
    /// Snap-back after a pan is released.
    pub const SETTLE: Self = Self::new(150.0, 8.0);
    /// Explicit zoom in/out buttons.
    pub const ZOOM: Self = Self::new(100.0, 10.0);
    /// Reset to the fitted view.
    pub const RESET: Self = Self::new(40.0, 7.0);

    #[must_use]
    pub const fn new(tension: f64, friction: f64) -> Self {
        Self { tension, friction }
    }

    #[must_use]
    pub fn stiffness(self) -> f64 {
        (self.tension - 30.0) * 3.62 + 194.0
    }

    #[must_use]
    pub fn damping(self) -> f64 {
        (self.friction - 8.0) * 3.0 + 25.0
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.tension.is_finite()
            && self.friction.is_finite()
            && self.stiffness() > 0.0
            && self.damping() > 0.0
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::RESET
    }
}

// --- Closed-form damped spring ---

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringSample {
    pub position: f64,
    pub velocity: f64,
}

#[derive(Clone, Debug)]
pub struct Spring {
    from: f64,
    to: f64,
    initial_velocity: f64,
    stiffness: f64,
    damping: f64,
    elapsed: Duration,
    last: SpringSample,
    settled: bool,
}

impl Spring {
    #[must_use]
    pub fn new(from: f64, to: f64, initial_velocity: f64, config: SpringConfig) -> Self {
        let settled = (to - from).abs() <= REST_THRESHOLD && initial_velocity.abs() <= REST_THRESHOLD;
        Self {
            from,
            to,
            initial_velocity,
            stiffness: config.stiffness(),
            damping: config.damping(),
            elapsed: Duration::ZERO,
            last: SpringSample {
                position: if settled { to } else { from },
                velocity: if settled { 0.0 } else { initial_velocity },
            },
            settled,
        }
    }

    #[must_use]
    pub fn target(&self) -> f64 {
        self.to
    }

    #[must_use]
    pub fn current(&self) -> SpringSample {
        self.last
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Position and velocity `t` after the spring started.
    #[must_use]
    pub fn sample(&self, t: Duration) -> SpringSample {
        let t = t.as_secs_f64();
        let mass = 1.0;
        let zeta = self.damping / (2.0 * (self.stiffness * mass).sqrt());
        let omega0 = (self.stiffness / mass).sqrt();
        let x0 = self.to - self.from;
        let v0 = -self.initial_velocity;

        if zeta < 1.0 {
            let omega1 = omega0 * (1.0 - zeta * zeta).sqrt();
            let envelope = (-zeta * omega0 * t).exp();
            let (sin, cos) = (omega1 * t).sin_cos();
            let a = (v0 + zeta * omega0 * x0) / omega1;
            let position = self.to - envelope * (a * sin + x0 * cos);
            let velocity = zeta * omega0 * envelope * (sin * a + x0 * cos)
                - envelope * (cos * (v0 + zeta * omega0 * x0) - omega1 * x0 * sin);
            SpringSample { position, velocity }
        } else if zeta > 1.0 + 1e-6 {
            let omega2 = omega0 * (zeta * zeta - 1.0).sqrt();
            let b = (v0 + zeta * omega0 * x0) / omega2;
            let (r1, r2) = (-zeta * omega0 + omega2, -zeta * omega0 - omega2);
            let (c1, c2) = ((x0 + b) / 2.0, (x0 - b) / 2.0);
            let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
            let position = self.to - (c1 * e1 + c2 * e2);
            let velocity = -(c1 * r1 * e1 + c2 * r2 * e2);
            SpringSample { position, velocity }
        } else {
            let envelope = (-omega0 * t).exp();
            let position = self.to - envelope * (x0 + (v0 + omega0 * x0) * t);
            let velocity = envelope * (v0 * (t * omega0 - 1.0) + t * x0 * omega0 * omega0);
            SpringSample { position, velocity }
        }
    }

    /// Advances by `dt`. Snaps onto the target once at rest.
    pub fn step(&mut self, dt: Duration) -> SpringSample {
        if self.settled {
            return self.last;
        }
        self.elapsed += dt;
        let sample = self.sample(self.elapsed);
        if (self.to - sample.position).abs() <= REST_THRESHOLD
            && sample.velocity.abs() <= REST_THRESHOLD
        {
            self.settled = true;
            self.last = SpringSample {
                position: self.to,
                velocity: 0.0,
            };
        } else {
            self.last = sample;
        }
        self.last
    }
}

// --- Scheduler ---

/// Runs at most one spring per key.
#[derive(Debug)]
pub struct SpringScheduler<K> {
    active: HashMap<K, Spring>,
}

impl<K> SpringScheduler<K>
where
    K: Copy + Eq + Hash,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: HashMap::new(),
        }
    }

    /// Replaces any spring already running on `key`, carrying its velocity over.
    pub fn start(&mut self, key: K, from: f64, to: f64, config: SpringConfig) {
        let velocity = self
            .active
            .get(&key)
            .map_or(0.0, |running| running.current().velocity);
        self.active.insert(key, Spring::new(from, to, velocity, config));
    }

    pub fn stop(&mut self, key: K) -> Option<Spring> {
        self.active.remove(&key)
    }

    pub fn stop_all(&mut self) {
        self.active.clear();
    }

    #[must_use]
    pub fn is_animating(&self, key: K) -> bool {
        self.active.contains_key(&key)
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    #[must_use]
    pub fn target(&self, key: K) -> Option<f64> {
        self.active.get(&key).map(Spring::target)
    }

    /// Advances every spring and returns the new positions. Settled springs
    /// report their target once and are dropped.
    pub fn tick(&mut self, dt: Duration) -> Vec<(K, f64)> {
        let mut frame = Vec::with_capacity(self.active.len());
        for (key, spring) in &mut self.active {
            frame.push((*key, spring.step(dt).position));
        }
        self.active.retain(|_, spring| !spring.is_settled());
        frame
    }
}

impl<K> Default for SpringScheduler<K>
where
    K: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const FRAME: Duration = Duration::from_millis(16);

    fn run_to_rest(spring: &mut Spring) -> usize {
        let mut frames = 0;
        while !spring.is_settled() {
            spring.step(FRAME);
            frames += 1;
            assert!(frames < 10_000, "spring never settled");
        }
        frames
    }

    #[test]
    fn origami_conversion_matches_known_presets() {
        assert!((SpringConfig::SETTLE.stiffness() - 628.4).abs() < 1e-9);
        assert!((SpringConfig::SETTLE.damping() - 25.0).abs() < 1e-9);
        assert!((SpringConfig::ZOOM.stiffness() - 447.4).abs() < 1e-9);
        assert!((SpringConfig::ZOOM.damping() - 31.0).abs() < 1e-9);
    }

    #[test]
    fn spring_starts_at_origin_and_settles_on_target() {
        let mut spring = Spring::new(40.0, 0.0, 0.0, SpringConfig::SETTLE);
        assert_eq!(spring.sample(Duration::ZERO).position, 40.0);
        run_to_rest(&mut spring);
        assert_eq!(spring.current().position, 0.0);
        assert_eq!(spring.current().velocity, 0.0);
    }

    #[test]
    fn underdamped_spring_overshoots() {
        let spring = Spring::new(0.0, 100.0, 0.0, SpringConfig::SETTLE);
        let peak = (1..200)
            .map(|i| spring.sample(FRAME * i).position)
            .fold(f64::MIN, f64::max);
        assert!(peak > 100.0);
    }

    #[test]
    fn overdamped_spring_creeps_in_without_overshoot() {
        // damping 61 against stiffness 230.2
        let mut spring = Spring::new(0.0, 100.0, 0.0, SpringConfig::new(40.0, 20.0));
        assert!((spring.sample(Duration::ZERO).position).abs() < 1e-9);

        let mut previous = 0.0;
        for i in 1..400 {
            let position = spring.sample(FRAME * i).position;
            assert!(position <= 100.0, "overshot at frame {i}: {position}");
            assert!(position >= previous);
            previous = position;
        }

        run_to_rest(&mut spring);
        assert_eq!(spring.current().position, 100.0);
    }

    #[test]
    fn overdamped_spring_keeps_initial_velocity() {
        let spring = Spring::new(0.0, 10.0, 50.0, SpringConfig::new(40.0, 20.0));
        assert!((spring.sample(Duration::ZERO).velocity - 50.0).abs() < 1e-9);
    }

    #[test]
    fn spring_already_on_target_is_settled() {
        let spring = Spring::new(2.0, 2.0, 0.0, SpringConfig::ZOOM);
        assert!(spring.is_settled());
    }

    #[test]
    fn animated_value_notifies_subscribers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut value = AnimatedValue::new(1.0);
        let id = value.subscribe(move |v| sink.lock().unwrap().push(v));

        value.set_value(1.5);
        value.set_value(2.0);
        assert!(value.unsubscribe(id));
        value.set_value(3.0);

        assert_eq!(*seen.lock().unwrap(), vec![1.5, 2.0]);
        assert_eq!(value.value(), 3.0);
        assert!(!value.unsubscribe(id));
    }

    #[test]
    fn listeners_are_independent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut value = AnimatedValue::default();
        for _ in 0..3 {
            let calls = Arc::clone(&calls);
            value.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }
        value.set_value(4.0);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(value.listener_count(), 3);
    }

    #[test]
    fn later_start_on_same_key_wins() {
        let mut scheduler = SpringScheduler::new();
        scheduler.start("x", 0.0, 10.0, SpringConfig::ZOOM);
        scheduler.tick(FRAME);
        scheduler.start("x", 5.0, -10.0, SpringConfig::ZOOM);
        assert_eq!(scheduler.target("x"), Some(-10.0));

        let mut last = None;
        for _ in 0..1_000 {
            for (_, v) in scheduler.tick(FRAME) {
                last = Some(v);
            }
            if scheduler.is_idle() {
                break;
            }
        }
        assert!(scheduler.is_idle());
        assert_eq!(last, Some(-10.0));
    }

    #[test]
    fn stop_removes_spring() {
        let mut scheduler = SpringScheduler::new();
        scheduler.start(1u8, 0.0, 1.0, SpringConfig::RESET);
        assert!(scheduler.is_animating(1));
        assert!(scheduler.stop(1).is_some());
        assert!(scheduler.tick(FRAME).is_empty());
    }
}
