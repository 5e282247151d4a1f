use rand::distr::Alphanumeric;
use rand::Rng as _;
use tracing::{debug, info};

use crate::constants::{
    kitten_image, kitten_variant_after, CHASE_PROBABILITY, FINAL_STAGE_LIVES,
    FINAL_ZOMBIE_CAUGHT_SFX, FINAL_ZOMBIE_IMAGE, FINAL_ZOMBIE_NEARBY_SFX, GRID_HEIGHT, GRID_WIDTH,
    KITTENS_TO_SAVE, KITTEN_FOUND_SFX, PLAYER_IMAGE, PLAYER_START, STARTING_LIVES,
    ZOMBIE_CAUGHT_SFX, ZOMBIE_IMAGE, ZOMBIE_NEARBY_SFX, ZOMBIE_START,
};
use crate::rng::Rng;
use crate::types::{
    Direction, Encounter, EncounterKind, GameEvent, KittenView, PlayerView, SixthSense, Snapshot,
    SoundCue, TerminalState, TurnReport, Vec2, ZombieView,
};
use crate::world::LocationGrid;

mod chase_system;
mod spawn_system;
pub mod utils;

use self::spawn_system::random_cell_excluding;
use self::utils::{in_bounds, manhattan, neighboring, offset};

const SESSION_ID_LEN: usize = 32;

#[derive(Clone, Debug)]
struct Player {
    pos: Vec2,
    lives: i32,
    kittens_saved: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ZombieStage {
    Normal,
    Final,
}

#[derive(Clone, Debug)]
struct Zombie {
    pos: Vec2,
    stage: ZombieStage,
}

impl Zombie {
    fn new(pos: Vec2) -> Self {
        Self {
            pos,
            stage: ZombieStage::Normal,
        }
    }

    fn image_url(&self) -> &'static str {
        match self.stage {
            ZombieStage::Normal => ZOMBIE_IMAGE,
            ZombieStage::Final => FINAL_ZOMBIE_IMAGE,
        }
    }

    fn nearby_sfx(&self) -> &'static str {
        match self.stage {
            ZombieStage::Normal => ZOMBIE_NEARBY_SFX,
            ZombieStage::Final => FINAL_ZOMBIE_NEARBY_SFX,
        }
    }

    fn caught_sfx(&self) -> &'static str {
        match self.stage {
            ZombieStage::Normal => ZOMBIE_CAUGHT_SFX,
            ZombieStage::Final => FINAL_ZOMBIE_CAUGHT_SFX,
        }
    }

    fn view(&self) -> ZombieView {
        ZombieView {
            x: self.pos.x,
            y: self.pos.y,
            image_url: self.image_url().to_string(),
            nearby_sfx: self.nearby_sfx().to_string(),
            caught_sfx: self.caught_sfx().to_string(),
        }
    }
}

#[derive(Clone, Debug)]
struct Kitten {
    pos: Vec2,
    variant: i32,
}

#[derive(Clone, Debug)]
pub struct GameBoardOptions {
    pub zombie_spawns: Vec<Vec2>,
    pub chase_probability: f32,
}

impl Default for GameBoardOptions {
    fn default() -> Self {
        Self {
            zombie_spawns: vec![ZOMBIE_START],
            chase_probability: CHASE_PROBABILITY,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GameBoard {
    pub session_id: String,
    pub map: LocationGrid,

    rng: Rng,
    options: GameBoardOptions,
    player: Player,
    zombies: Vec<Zombie>,
    kitten: Kitten,
    encounters: Vec<Encounter>,
    turn: u64,
    terminal: Option<TerminalState>,
}

impl GameBoard {
    pub fn new(seed: u32, options: GameBoardOptions) -> Self {
        let mut rng = Rng::new(seed);
        let map = LocationGrid::new(GRID_WIDTH, GRID_HEIGHT);
        let zombies = Self::spawn_zombies(&options.zombie_spawns);
        let kitten = Kitten {
            pos: random_cell_excluding(&mut rng, map.width, map.height, PLAYER_START),
            variant: kitten_variant_after(0),
        };
        let session_id = make_session_id();
        info!(session_id = %session_id, seed, zombies = zombies.len(), "game board created");

        Self {
            session_id,
            map,
            rng,
            options,
            player: Player {
                pos: PLAYER_START,
                lives: STARTING_LIVES,
                kittens_saved: 0,
            },
            zombies,
            kitten,
            encounters: Vec::new(),
            turn: 0,
            terminal: None,
        }
    }

    pub fn is_ended(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn terminal(&self) -> Option<TerminalState> {
        self.terminal
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn player_position(&self) -> Vec2 {
        self.player.pos
    }

    pub fn lives(&self) -> i32 {
        self.player.lives
    }

    pub fn kittens_saved(&self) -> i32 {
        self.player.kittens_saved
    }

    pub fn kitten_position(&self) -> Vec2 {
        self.kitten.pos
    }

    pub fn zombie_positions(&self) -> Vec<Vec2> {
        self.zombies.iter().map(|zombie| zombie.pos).collect()
    }

    pub fn is_valid_move(&self, direction: Direction) -> bool {
        in_bounds(
            offset(self.player.pos, direction),
            self.map.width,
            self.map.height,
        )
    }

    pub fn move_player(&mut self, direction: Option<Direction>) -> TurnReport {
        if self.is_ended() {
            return TurnReport::rejected();
        }
        let Some(direction) = direction else {
            return TurnReport::rejected();
        };
        if !self.is_valid_move(direction) {
            debug!(session_id = %self.session_id, ?direction, "move out of bounds ignored");
            return TurnReport::rejected();
        }

        self.turn += 1;
        let mut events = Vec::new();
        self.player.pos = offset(self.player.pos, direction);
        self.move_zombies();
        let here = self.player.pos;

        if let Some(zombie) = self.zombies_near(here).next() {
            events.push(GameEvent::Sound {
                cue: SoundCue::ZombieNearby,
                url: zombie.nearby_sfx().to_string(),
            });
        }

        self.encounters = self.collect_encounters();

        let caught = self.zombies_at(here).next().map(|zombie| zombie.caught_sfx());
        if let Some(url) = caught {
            events.push(GameEvent::Sound {
                cue: SoundCue::ZombieCaught,
                url: url.to_string(),
            });
        }
        let found_kitten = self.kitten.pos == here;
        if found_kitten {
            events.push(GameEvent::Sound {
                cue: SoundCue::KittenFound,
                url: KITTEN_FOUND_SFX.to_string(),
            });
        }

        let mut won = false;
        if found_kitten {
            self.player.kittens_saved += 1;
            events.push(GameEvent::KittenSaved {
                saved: self.player.kittens_saved,
                remaining: KITTENS_TO_SAVE - self.player.kittens_saved,
            });
            if self.player.kittens_saved >= KITTENS_TO_SAVE {
                won = true;
            } else {
                self.relocate_kitten();
            }
        }

        let mut dead = false;
        if caught.is_some() {
            self.player.lives = (self.player.lives - 1).max(0);
            events.push(GameEvent::LifeLost {
                lives: self.player.lives,
            });
            if self.player.lives == FINAL_STAGE_LIVES {
                self.zombies.iter_mut().for_each(Zombie::enter_final_stage);
                events.push(GameEvent::FinalStage);
            }
            dead = self.player.lives == 0;
        }

        let terminal = if dead {
            events.push(GameEvent::Died);
            Some(TerminalState::Defeat)
        } else if won {
            events.push(GameEvent::Won);
            Some(TerminalState::Victory)
        } else {
            None
        };
        if let Some(state) = terminal {
            info!(
                session_id = %self.session_id,
                turn = self.turn,
                ?state,
                lives = self.player.lives,
                kittens = self.player.kittens_saved,
                "session reached terminal state"
            );
        }
        self.terminal = terminal;

        debug!(
            session_id = %self.session_id,
            turn = self.turn,
            x = here.x,
            y = here.y,
            lives = self.player.lives,
            kittens = self.player.kittens_saved,
            "turn resolved"
        );

        TurnReport {
            moved: true,
            events,
            terminal,
        }
    }

    pub fn sixth_sense(&self) -> SixthSense {
        let here = self.player.pos;
        SixthSense {
            closest_zombie: self
                .zombies
                .iter()
                .map(|zombie| manhattan(here, zombie.pos))
                .min(),
            kitten: manhattan(here, self.kitten.pos),
        }
    }

    pub fn encounters(&self) -> &[Encounter] {
        &self.encounters
    }

    fn collect_encounters(&self) -> Vec<Encounter> {
        let here = self.player.pos;
        let mut encounters: Vec<Encounter> = self
            .zombies_at(here)
            .map(|zombie| Encounter {
                kind: EncounterKind::Attacked,
                image_url: zombie.image_url().to_string(),
                message: "You are attacked by an enemy!".to_string(),
            })
            .collect();
        if self.kitten.pos == here {
            encounters.push(Encounter {
                kind: EncounterKind::Found,
                image_url: kitten_image(self.kitten.variant),
                message: "You have found a kitten!".to_string(),
            });
        }
        encounters
    }

    pub fn set_description(&mut self, pos: Vec2, text: String) -> bool {
        self.map.set_description(pos, text)
    }

    pub fn build_snapshot(&self) -> Snapshot {
        let sixth_sense = self.sixth_sense();
        Snapshot {
            session_id: self.session_id.clone(),
            turn: self.turn,
            player: PlayerView {
                x: self.player.pos.x,
                y: self.player.pos.y,
                lives: self.player.lives,
                kittens_saved: self.player.kittens_saved,
                kittens_remaining: KITTENS_TO_SAVE - self.player.kittens_saved,
                image_url: PLAYER_IMAGE.to_string(),
            },
            zombies: self.zombies.iter().map(Zombie::view).collect(),
            kitten: KittenView {
                x: self.kitten.pos.x,
                y: self.kitten.pos.y,
                image_url: kitten_image(self.kitten.variant),
            },
            location: self.map.view(self.player.pos),
            encounters: self.encounters.clone(),
            sixth_sense_text: sixth_sense.hint_text(),
            sixth_sense,
            terminal: self.terminal,
        }
    }
}

fn make_session_id() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}
