use std::time::Duration;

use keris_warrior_core::Event;
use rand::Rng;

/// Countdown to the next bonus UFO launch, redrawn after every launch.
#[derive(Clone, Debug)]
pub struct UfoSchedule {
    min: Duration,
    max: Duration,
    until_next: Duration,
}

impl UfoSchedule {
    /// Creates a schedule and draws the first delay.
    pub fn new<R: Rng + ?Sized>(min: Duration, max: Duration, rng: &mut R) -> Self {
        let mut schedule = Self {
            min,
            max,
            until_next: Duration::ZERO,
        };
        schedule.until_next = schedule.sample(rng);
        schedule
    }

    /// Advances the countdown, requesting a launch when it runs out.
    ///
    /// At most one launch is requested per tick even when `dt` spans several
    /// intervals.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: Duration, rng: &mut R, out: &mut Vec<Event>) {
        self.until_next = self.until_next.saturating_sub(dt);
        if !self.until_next.is_zero() {
            return;
        }

        log::debug!("bonus ufo launch requested");
        out.push(Event::BonusUfoSpawnRequested);
        self.until_next = self.sample(rng);
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let span = self.max.saturating_sub(self.min);
        self.min + span.mul_f32(rng.gen::<f32>())
    }
}
