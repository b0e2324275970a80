//! CorePlugin wires the animation clock, map settings and startup logging.
use bevy::prelude::*;
#[cfg(feature = "core_debug")]
use bevy::time::TimerMode;
use std::time::Duration;

use super::config::MapSettings;

const DEFAULT_ANIMATION_SPEED: f32 = 1.0;
const MIN_ANIMATION_SPEED: f32 = 0.05;
/// Longest frame delta fed to camera transitions, so a stalled frame does not skip them.
const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);

#[cfg(feature = "core_debug")]
#[derive(Resource)]
struct DebugTickTimer {
    timer: Timer,
}

#[cfg(feature = "core_debug")]
impl Default for DebugTickTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

/// Frame time used to advance camera transitions.
#[derive(Resource, Debug)]
pub struct AnimationClock {
    speed: f32,
    last_real_delta: Duration,
    last_scaled_delta: Duration,
    elapsed: Duration,
}

impl AnimationClock {
    /// Creates a clock that plays animations at `speed` times real time.
    pub fn new(speed: f32) -> Self {
        Self {
            speed: speed.max(MIN_ANIMATION_SPEED),
            last_real_delta: Duration::ZERO,
            last_scaled_delta: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(MIN_ANIMATION_SPEED);
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[cfg_attr(not(feature = "core_debug"), allow(dead_code))]
    pub fn last_real_delta(&self) -> Duration {
        self.last_real_delta
    }

    /// Delta to feed into transitions this frame.
    pub fn last_scaled_delta(&self) -> Duration {
        self.last_scaled_delta
    }

    #[cfg_attr(not(any(test, feature = "core_debug")), allow(dead_code))]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Applies a real frame delta, capping it before scaling.
    pub fn tick(&mut self, real_delta: Duration) {
        self.last_real_delta = real_delta;
        self.last_scaled_delta = real_delta.min(MAX_FRAME_DELTA).mul_f32(self.speed);
        self.elapsed += self.last_scaled_delta;
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(DEFAULT_ANIMATION_SPEED)
    }
}

/// Registers the animation clock and map settings.
#[derive(Debug, Clone, Copy)]
pub struct CorePlugin {
    animation_speed: f32,
}

impl CorePlugin {
    #[allow(dead_code)]
    pub const fn with_animation_speed(animation_speed: f32) -> Self {
        Self { animation_speed }
    }
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self {
            animation_speed: DEFAULT_ANIMATION_SPEED,
        }
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<MapSettings>() {
            app.insert_resource(MapSettings::load_or_default());
        }

        app.insert_resource(AnimationClock::new(self.animation_speed))
            .add_systems(Startup, log_startup_animation_speed)
            .add_systems(First, update_animation_clock);

        #[cfg(feature = "core_debug")]
        {
            app.insert_resource(DebugTickTimer::default())
                .add_systems(Update, log_animation_ticks);
        }
    }
}

fn update_animation_clock(mut clock: ResMut<AnimationClock>, time: Res<Time>) {
    clock.tick(time.delta());
}

fn log_startup_animation_speed(clock: Res<AnimationClock>) {
    info!(
        "CorePlugin initialised with animation speed: {:.3}",
        clock.speed()
    );
}

#[cfg(feature = "core_debug")]
fn log_animation_ticks(mut timer: ResMut<DebugTickTimer>, clock: Res<AnimationClock>) {
    if timer.timer.tick(clock.last_real_delta()).just_finished() {
        info!(
            target: "core_debug",
            "Animation elapsed: {:.2}s | speed: {:.3} | real dt: {:.4}s | scaled dt: {:.4}s",
            clock.elapsed().as_secs_f32(),
            clock.speed(),
            clock.last_real_delta().as_secs_f32(),
            clock.last_scaled_delta().as_secs_f32(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_scales_delta_with_speed() {
        let mut clock = AnimationClock::new(2.0);
        clock.tick(Duration::from_millis(40));

        assert_eq!(clock.speed(), 2.0);
        assert_eq!(clock.last_real_delta(), Duration::from_millis(40));
        assert!((clock.last_scaled_delta().as_secs_f32() - 0.08).abs() < 1e-6);
        assert_eq!(clock.elapsed(), clock.last_scaled_delta());
    }

    #[test]
    fn long_frames_are_capped_before_scaling() {
        let mut clock = AnimationClock::default();
        clock.tick(Duration::from_secs(3));
        let capped = clock.last_scaled_delta().as_secs_f32();
        assert!((capped - MAX_FRAME_DELTA.as_secs_f32()).abs() < 1e-6);
    }

    #[test]
    fn clock_clamps_min_speed() {
        let mut clock = AnimationClock::new(0.0);
        assert!((clock.speed() - MIN_ANIMATION_SPEED).abs() < f32::EPSILON);

        clock.set_speed(-5.0);
        assert!((clock.speed() - MIN_ANIMATION_SPEED).abs() < f32::EPSILON);
    }
}
