use std::time::Duration;

use keris_warrior_core::{Position, SpawnOrder};
use rand::{Rng, RngCore};

/// Half-width of the lane hostiles march across before stepping down.
const LANE_HALF_WIDTH: f32 = 10.0;
/// Depth a marching hostile descends each time it reaches a lane edge.
const STEP_DOWN: f32 = 1.0;
/// Depth at which a marching hostile reaches the player.
const PLAYER_LINE: f32 = -8.0;
/// Launch point of the bonus UFO.
const UFO_LAUNCH: Position = Position::new(-LANE_HALF_WIDTH, 1.0, 5.0);

/// Tagged variant naming what a hostile is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Regular level enemy that marches and fires.
    Grunt,
    /// Bonus-round enemy that marches and never fires.
    BonusGrunt,
    /// Bonus UFO crossing the field once; hitting it grants a power-up.
    BonusUfo,
}

impl EntityKind {
    /// Reports whether the hostile counts toward clearing the current wave.
    #[must_use]
    pub const fn is_wave_member(self) -> bool {
        matches!(self, Self::Grunt | Self::BonusGrunt)
    }
}

/// Something a hostile did during an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Fired one projectile at the player.
    Fired,
    /// Left the play field without being hit.
    Escaped,
    /// Descended to the player's line.
    ReachedPlayer,
}

/// Consequence of a player projectile hitting a hostile.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// The hostile was destroyed and scores points.
    Destroyed,
    /// The hostile was destroyed and grants a power-up.
    GrantsPowerUp,
}

/// Per-frame behaviour shared by every hostile.
pub trait Behavior {
    /// Advances the hostile by `dt`, reporting the most significant action taken.
    fn update(&mut self, dt: Duration, rng: &mut dyn RngCore) -> Option<Action>;

    /// Resolves a hit by a player projectile.
    fn on_hit(&self) -> HitOutcome;
}

#[derive(Clone, Copy, Debug)]
struct ShotTimer {
    min: Duration,
    max: Duration,
    until_next: Duration,
}

impl ShotTimer {
    fn new(min: Duration, max: Duration, rng: &mut dyn RngCore) -> Self {
        let mut timer = Self {
            min,
            max,
            until_next: Duration::ZERO,
        };
        timer.rearm(rng);
        timer
    }

    fn rearm(&mut self, rng: &mut dyn RngCore) {
        let span = self.max.saturating_sub(self.min);
        self.until_next = self.min + span.mul_f32(rng.gen::<f32>());
    }

    fn advance(&mut self, dt: Duration, rng: &mut dyn RngCore) -> bool {
        self.until_next = self.until_next.saturating_sub(dt);
        if !self.until_next.is_zero() {
            return false;
        }
        self.rearm(rng);
        true
    }
}

/// Live hostile on the play field.
#[derive(Clone, Debug)]
pub struct Hostile {
    kind: EntityKind,
    position: Position,
    base_speed: f32,
    speed: f32,
    heading: f32,
    shots: Option<ShotTimer>,
}

impl Hostile {
    /// Creates a wave member from a spawn order.
    ///
    /// Dormant or unresolvable shoot intervals yield a hostile that never fires.
    pub fn from_order(kind: EntityKind, order: &SpawnOrder, rng: &mut dyn RngCore) -> Self {
        let shots = if order.shoot_interval.is_dormant() {
            None
        } else {
            order
                .shoot_interval
                .resolve("shoot_interval")
                .ok()
                .map(|(min, max)| ShotTimer::new(min, max, rng))
        };
        Self {
            kind,
            position: order.position,
            base_speed: order.speed,
            speed: order.speed,
            heading: 1.0,
            shots,
        }
    }

    /// Creates a bonus UFO at its launch point.
    #[must_use]
    pub fn ufo(speed: f32) -> Self {
        Self {
            kind: EntityKind::BonusUfo,
            position: UFO_LAUNCH,
            base_speed: speed,
            speed,
            heading: 1.0,
            shots: None,
        }
    }

    /// Kind of hostile.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current speed after multipliers.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Recomputes the speed from the configured base speed.
    ///
    /// The bonus UFO ignores enemy speed multipliers.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) {
        if self.kind.is_wave_member() {
            self.speed = self.base_speed * multiplier;
        }
    }

    fn march(&mut self, dt: Duration) -> Option<Action> {
        self.position.x += self.speed * dt.as_secs_f32() * self.heading;
        if self.position.x >= LANE_HALF_WIDTH {
            self.heading = -1.0;
            self.position.z -= STEP_DOWN;
        } else if self.position.x <= -LANE_HALF_WIDTH {
            self.heading = 1.0;
            self.position.z -= STEP_DOWN;
        }
        (self.position.z <= PLAYER_LINE).then_some(Action::ReachedPlayer)
    }
}

impl Behavior for Hostile {
    fn update(&mut self, dt: Duration, rng: &mut dyn RngCore) -> Option<Action> {
        match self.kind {
            EntityKind::Grunt | EntityKind::BonusGrunt => {
                if let Some(action) = self.march(dt) {
                    return Some(action);
                }
                let fired = self
                    .shots
                    .as_mut()
                    .is_some_and(|timer| timer.advance(dt, rng));
                fired.then_some(Action::Fired)
            }
            EntityKind::BonusUfo => {
                self.position.x += self.speed * dt.as_secs_f32();
                (self.position.x > LANE_HALF_WIDTH).then_some(Action::Escaped)
            }
        }
    }

    fn on_hit(&self) -> HitOutcome {
        match self.kind {
            EntityKind::Grunt | EntityKind::BonusGrunt => HitOutcome::Destroyed,
            EntityKind::BonusUfo => HitOutcome::GrantsPowerUp,
        }
    }
}
