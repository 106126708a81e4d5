#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative progression state for Keris Warrior.
//!
//! The [`World`] composes the wave controller, power-up engine, and score
//! ledger. Engine adapters feed it [`Command`] values through [`apply`] and
//! react to the [`Event`] values it appends. Read-only access goes through
//! [`query`].

use std::{collections::VecDeque, time::Duration};

use keris_warrior_core::{
    keys, Achievement, BonusRoundDefinition, Command, ConfigurationError, Event, GameConfig,
    InvariantViolation, LevelCatalog, LevelIndex, PowerUpKind, SettingsStore, SpawnPlan,
    StoreError, WaveKind,
};
use keris_warrior_system_power_ups::{self as power_ups, PowerUpEngine, UfoSchedule};
use keris_warrior_system_scoring::{self as scoring, ScoreLedger};
use keris_warrior_system_shop::{self as shop, Loadout};
use keris_warrior_system_waves::{self as waves, Transition, WaveController};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Power-ups a single game must collect to unlock [`Achievement::BonusHunter`].
const BONUS_HUNTER_POWER_UPS: u32 = 5;

/// Progress flags of the game in flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    current_level: LevelIndex,
    is_game_over: bool,
    is_bonus_round_active: bool,
    double_score_from_bonus_round: bool,
    heart_lost_during_current_level: bool,
    health_lost_this_game: bool,
    power_ups_collected: u32,
}

impl GameState {
    fn new() -> Self {
        Self {
            current_level: LevelIndex::FIRST,
            is_game_over: false,
            is_bonus_round_active: false,
            double_score_from_bonus_round: false,
            heart_lost_during_current_level: false,
            health_lost_this_game: false,
            power_ups_collected: 0,
        }
    }

    /// Level the game is on, or just finished when a bonus round is running.
    #[must_use]
    pub const fn current_level(&self) -> LevelIndex {
        self.current_level
    }

    /// Reports whether the game reached `GameOver` or `Won`.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    /// Reports whether the bonus round is in progress.
    #[must_use]
    pub const fn is_bonus_round_active(&self) -> bool {
        self.is_bonus_round_active
    }

    /// Reports whether the bonus round is doubling scored points.
    #[must_use]
    pub const fn double_score_from_bonus_round(&self) -> bool {
        self.double_score_from_bonus_round
    }

    /// Reports whether health dropped below its level-start value on this level.
    #[must_use]
    pub const fn heart_lost_during_current_level(&self) -> bool {
        self.heart_lost_during_current_level
    }

    /// Reports whether health dropped below its game-start value at any point.
    #[must_use]
    pub const fn health_lost_this_game(&self) -> bool {
        self.health_lost_this_game
    }

    /// Power-ups activated during this game.
    #[must_use]
    pub const fn power_ups_collected(&self) -> u32 {
        self.power_ups_collected
    }
}

#[derive(Clone, Debug)]
struct Session {
    state: GameState,
    health: u32,
    level_start_health: u32,
    waves: WaveController,
    power_ups: PowerUpEngine,
    ledger: ScoreLedger,
    ufo: UfoSchedule,
}

/// Authoritative progression state plus the persisted settings it reads and writes.
#[derive(Debug)]
pub struct World<S> {
    config: GameConfig,
    catalog: LevelCatalog,
    bonus: BonusRoundDefinition,
    waves: waves::Config,
    power_ups: power_ups::Config,
    ufo_interval: (Duration, Duration),
    store: S,
    rng: ChaCha8Rng,
    session: Option<Session>,
}

impl<S: SettingsStore> World<S> {
    /// Validates the configuration and creates a world waiting for [`Command::StartGame`].
    pub fn new(
        config: GameConfig,
        catalog: LevelCatalog,
        bonus: BonusRoundDefinition,
        store: S,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let waves = waves::Config::new(
            catalog.last_index(),
            bonus.duration()?,
            config.bonus_defeated_grace()?,
        );
        let power_ups = power_ups::Config::from_tuning(&config.power_ups)?;
        let ufo_interval = config.ufo_interval.resolve("ufo_interval")?;
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);

        Ok(Self {
            config,
            catalog,
            bonus,
            waves,
            power_ups,
            ufo_interval,
            store,
            rng,
            session: None,
        })
    }

    fn start_game(&mut self, out: &mut Vec<Event>) {
        if let Some(mut previous) = self.session.take() {
            previous.power_ups.clear(out);
        }
        if let Err(error) = shop::ensure_defaults(&mut self.store) {
            report_store_error(&error, out);
        }
        let loadout = Loadout::load(&self.store);
        out.push(Event::LoadoutEquipped {
            keris: loadout.keris,
            cloth: loadout.cloth,
        });

        let (ufo_min, ufo_max) = self.ufo_interval;
        let health = self.config.starting_health;
        let mut session = Session {
            state: GameState::new(),
            health,
            level_start_health: health,
            waves: WaveController::new(self.waves),
            power_ups: PowerUpEngine::new(self.power_ups),
            ledger: ScoreLedger::new(self.config.coins_per_point),
            ufo: UfoSchedule::new(ufo_min, ufo_max, &mut self.rng),
        };
        log::info!("game started with {} levels", self.catalog.len());
        out.push(Event::PlayerHealthRestored { health });
        out.push(Event::ScoreChanged { score: 0, coins: 0 });

        let mut forced = Vec::new();
        if let Err(violation) = self.load_level(LevelIndex::FIRST, out) {
            report_violation(violation, out);
            session.waves.declare_won(&mut forced);
        }
        self.process(&mut session, forced, out);
        self.session = Some(session);
    }

    fn execute(&mut self, session: &mut Session, command: Command, out: &mut Vec<Event>) {
        let mut transitions = Vec::new();
        match command {
            // Handled by `apply` before a session is consulted.
            Command::StartGame => {}
            Command::Tick { dt } => {
                session.waves.tick(dt, &mut transitions);
                self.process(session, std::mem::take(&mut transitions), out);
                if session.waves.phase().is_terminal() {
                    return;
                }
                session.power_ups.tick(dt, out);
                session.ufo.tick(dt, &mut self.rng, out);
            }
            Command::ReportWaveCleared => session.waves.handle_wave_cleared(
                session.state.heart_lost_during_current_level,
                &mut transitions,
            ),
            Command::ReportHealth { health } => {
                self.report_health(session, health, &mut transitions);
            }
            Command::ReportEnemyDestroyed { points } => {
                let multiplier = session.power_ups.score_multiplier();
                let _ = session.ledger.add_score(points, multiplier);
                out.push(Event::ScoreChanged {
                    score: session.ledger.score(),
                    coins: session.ledger.coins(),
                });
                if session.ledger.check_milestones(&mut self.store, out) {
                    persist(&mut self.store, out);
                }
            }
            Command::ReportPlayerDied => session.waves.end_game(&mut transitions),
            Command::RequestPowerUp => {
                let kind = power_ups::choose_random(&mut self.rng);
                grant_power_up(session, kind, out);
            }
            Command::GrantPowerUp { kind } => grant_power_up(session, kind, out),
            Command::FireShot => {
                let mut expired = Vec::new();
                let projectiles = session.power_ups.consume_shot(&mut expired);
                out.push(Event::ShotFired { projectiles });
                out.append(&mut expired);
            }
        }
        self.process(session, transitions, out);
    }

    fn report_health(&self, session: &mut Session, health: u32, out: &mut Vec<Transition>) {
        session.health = health;
        if health < session.level_start_health {
            session.state.heart_lost_during_current_level = true;
        }
        if health < self.config.starting_health {
            session.state.health_lost_this_game = true;
        }
        if health == 0 {
            session.waves.end_game(out);
        }
    }

    fn process(&mut self, session: &mut Session, transitions: Vec<Transition>, out: &mut Vec<Event>) {
        let mut pending: VecDeque<Transition> = transitions.into();
        while let Some(transition) = pending.pop_front() {
            match transition {
                Transition::BonusRoundStarted { duration } => {
                    session.state.is_bonus_round_active = true;
                    session.state.double_score_from_bonus_round = true;
                    session.power_ups.set_bonus_round_double_score(true);
                    out.push(Event::BonusRoundStarted { duration });
                    spawn(WaveKind::Bonus, self.bonus.spawn_plan(), out);
                }
                Transition::BonusCountdownChanged { seconds } => {
                    out.push(Event::BonusCountdownChanged { seconds });
                }
                Transition::BonusEnemiesDefeated => out.push(Event::BonusEnemiesDefeated),
                Transition::BonusSurvivorsDespawned => out.push(Event::BonusSurvivorsDespawned),
                Transition::BonusRoundEnded { cleared } => {
                    session.state.is_bonus_round_active = false;
                    session.state.double_score_from_bonus_round = false;
                    session.power_ups.set_bonus_round_double_score(false);
                    out.push(Event::BonusRoundEnded { cleared });
                }
                Transition::LevelAdvanced {
                    level,
                    restore_health,
                } => {
                    session.state.current_level = level;
                    session.state.heart_lost_during_current_level = false;
                    if restore_health {
                        session.health = self.config.starting_health;
                        out.push(Event::PlayerHealthRestored {
                            health: session.health,
                        });
                    }
                    session.level_start_health = session.health;

                    if let Err(violation) = self.load_level(level, out) {
                        report_violation(violation, out);
                        let mut forced = Vec::new();
                        session.waves.declare_won(&mut forced);
                        pending.extend(forced);
                    }
                }
                Transition::Won => self.conclude(session, true, out),
                Transition::GameOver => self.conclude(session, false, out),
            }
        }
    }

    fn load_level(&self, level: LevelIndex, out: &mut Vec<Event>) -> Result<(), InvariantViolation> {
        let definition =
            self.catalog
                .level(level)
                .map_err(|_| InvariantViolation::LevelPastCatalog {
                    attempted: level,
                    last: self.catalog.last_index(),
                })?;
        log::info!("loading level {}: {}", level.get(), definition.name);
        out.push(Event::LevelStarted {
            level,
            name: definition.name.clone(),
        });
        spawn(WaveKind::Level(level), definition.spawn_plan(level), out);
        Ok(())
    }

    fn conclude(&mut self, session: &mut Session, won: bool, out: &mut Vec<Event>) {
        session.state.is_game_over = true;
        session.state.is_bonus_round_active = false;
        session.state.double_score_from_bonus_round = false;
        session.power_ups.clear(out);

        let final_score = session.ledger.score();
        log::info!(
            "game concluded ({}) with {final_score} points",
            if won { "won" } else { "game over" }
        );
        out.push(Event::GameConcluded { final_score, won });
        let player_name = if self.store.has_key(keys::PLAYER_NAME) {
            self.store.string(keys::PLAYER_NAME, keys::DEFAULT_PLAYER_NAME)
        } else {
            keys::DEFAULT_PLAYER_NAME.to_owned()
        };
        out.push(Event::LeaderboardSubmissionRequested {
            player_name,
            score: final_score,
        });

        let _ = session.ledger.check_milestones(&mut self.store, out);
        if !session.state.health_lost_this_game {
            let _ = scoring::unlock(&mut self.store, Achievement::Untouchable, out);
        }
        if session.state.power_ups_collected >= BONUS_HUNTER_POWER_UPS {
            let _ = scoring::unlock(&mut self.store, Achievement::BonusHunter, out);
        }

        let settlement = session.ledger.settle_currency(&mut self.store);
        out.push(Event::CoinsSettled {
            earned: settlement.earned,
            total: settlement.total,
        });
        persist(&mut self.store, out);
    }
}

/// Applies the provided command to the world, appending the resulting events.
///
/// Commands other than [`Command::StartGame`] are ignored before the first
/// game starts and after the current game concluded.
pub fn apply<S: SettingsStore>(world: &mut World<S>, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartGame => world.start_game(out_events),
        command => {
            let Some(mut session) = world.session.take() else {
                log::debug!("ignoring {command:?}: no game in progress");
                return;
            };
            if !session.waves.phase().is_terminal() {
                world.execute(&mut session, command, out_events);
            }
            world.session = Some(session);
        }
    }
}

fn grant_power_up(session: &mut Session, kind: PowerUpKind, out: &mut Vec<Event>) {
    session.state.power_ups_collected = session.state.power_ups_collected.saturating_add(1);
    session.power_ups.activate(kind, out);
}

fn spawn(wave: WaveKind, plan: SpawnPlan, out: &mut Vec<Event>) {
    for missing in plan.missing {
        log::warn!("skipping spawn: {missing}");
        out.push(Event::SpawnSkipped { missing });
    }
    out.push(Event::EnemiesSpawned {
        wave,
        orders: plan.orders,
    });
}

fn persist<S: SettingsStore>(store: &mut S, out: &mut Vec<Event>) {
    if let Err(error) = store.save() {
        report_store_error(&error, out);
    }
}

fn report_store_error(error: &StoreError, out: &mut Vec<Event>) {
    log::warn!("{error}");
    out.push(Event::PersistenceFailed {
        reason: error.to_string(),
    });
}

fn report_violation(violation: InvariantViolation, out: &mut Vec<Event>) {
    log::error!("{violation}; treating the game as won");
    out.push(Event::InvariantViolated { violation });
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::{GameState, World};
    use keris_warrior_core::{GameConfig, LevelCatalog, LevelIndex, SettingsStore, WavePhase};

    /// Progress flags of the current game, if one was started.
    #[must_use]
    pub fn game_state<S>(world: &World<S>) -> Option<&GameState> {
        world.session.as_ref().map(|session| &session.state)
    }

    /// Phase of the wave state machine, if a game was started.
    #[must_use]
    pub fn phase<S>(world: &World<S>) -> Option<WavePhase> {
        world.session.as_ref().map(|session| session.waves.phase())
    }

    /// Index of the active level; the first level before a game starts.
    #[must_use]
    pub fn level_index<S>(world: &World<S>) -> LevelIndex {
        game_state(world).map_or(LevelIndex::FIRST, GameState::current_level)
    }

    /// Name shown in the level text.
    #[must_use]
    pub fn current_level_name<S>(world: &World<S>) -> &str {
        world
            .catalog
            .level(level_index(world))
            .map_or("", |level| level.name.as_str())
    }

    /// Bonus countdown text, or `None` when the label should be blank.
    #[must_use]
    pub fn bonus_countdown_display<S>(world: &World<S>) -> Option<String> {
        world
            .session
            .as_ref()
            .and_then(|session| session.waves.countdown_display())
    }

    /// Power-up status text, or `None` when the label should be blank.
    #[must_use]
    pub fn power_up_status_display<S>(world: &World<S>) -> Option<String> {
        world
            .session
            .as_ref()
            .and_then(|session| session.power_ups.status_display())
    }

    /// Score of the current game.
    #[must_use]
    pub fn score<S>(world: &World<S>) -> u64 {
        world
            .session
            .as_ref()
            .map_or(0, |session| session.ledger.score())
    }

    /// Coins derived from the score of the current game.
    #[must_use]
    pub fn coins<S>(world: &World<S>) -> u64 {
        world
            .session
            .as_ref()
            .map_or(0, |session| session.ledger.coins())
    }

    /// Reports whether the current game reached `GameOver` or `Won`.
    #[must_use]
    pub fn is_game_over<S>(world: &World<S>) -> bool {
        game_state(world).is_some_and(GameState::is_game_over)
    }

    /// Player health as last reported.
    #[must_use]
    pub fn health<S>(world: &World<S>) -> u32 {
        world
            .session
            .as_ref()
            .map_or(world.config.starting_health, |session| session.health)
    }

    /// Factor currently applied to scored points.
    #[must_use]
    pub fn score_multiplier<S>(world: &World<S>) -> u32 {
        world
            .session
            .as_ref()
            .map_or(1, |session| session.power_ups.score_multiplier())
    }

    /// Factor currently applied to enemy speed.
    #[must_use]
    pub fn enemy_speed_multiplier<S>(world: &World<S>) -> f32 {
        world
            .session
            .as_ref()
            .map_or(1.0, |session| session.power_ups.enemy_speed_multiplier())
    }

    /// Shot cooldown the player's weapon currently uses.
    #[must_use]
    pub fn shoot_cooldown<S>(world: &World<S>) -> Duration {
        world.session.as_ref().map_or(world.power_ups_base_cooldown(), |session| {
            session.power_ups.shoot_cooldown()
        })
    }

    /// Powered shots left on the double-bullets power-up.
    #[must_use]
    pub fn remaining_powered_shots<S>(world: &World<S>) -> u32 {
        world
            .session
            .as_ref()
            .map_or(0, |session| session.power_ups.remaining_powered_shots())
    }

    /// Tuning the world was created with.
    #[must_use]
    pub fn config<S>(world: &World<S>) -> &GameConfig {
        &world.config
    }

    /// Level catalog the world was created with.
    #[must_use]
    pub fn catalog<S>(world: &World<S>) -> &LevelCatalog {
        &world.catalog
    }

    /// Persisted settings.
    #[must_use]
    pub fn store<S: SettingsStore>(world: &World<S>) -> &S {
        &world.store
    }
}

impl<S> World<S> {
    fn power_ups_base_cooldown(&self) -> Duration {
        self.config
            .power_ups
            .base_shoot_cooldown()
            .unwrap_or(Duration::ZERO)
    }
}
