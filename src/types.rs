use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    pub fn delta(self) -> Vec2 {
        match self {
            Self::North => Vec2 { x: 0, y: -1 },
            Self::South => Vec2 { x: 0, y: 1 },
            Self::West => Vec2 { x: -1, y: 0 },
            Self::East => Vec2 { x: 1, y: 0 },
        }
    }

    /// Maps a browser `KeyboardEvent.key` value to a move. Unmapped keys are a no-op.
    ///
    /// The letter keys keep the layout the game always shipped with: `s` moves
    /// toward smaller y (like `ArrowUp`) and `w` toward larger y.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "a" | "ArrowLeft" => Some(Self::West),
            "d" | "ArrowRight" => Some(Self::East),
            "s" | "ArrowUp" => Some(Self::North),
            "w" | "ArrowDown" => Some(Self::South),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Start,
    Game,
    End,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    Defeat,
    Victory,
}

impl TerminalState {
    pub fn next_screen(self) -> Screen {
        match self {
            Self::Defeat => Screen::Start,
            Self::Victory => Screen::End,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    ZombieNearby,
    ZombieCaught,
    KittenFound,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    Sound {
        cue: SoundCue,
        url: String,
    },
    KittenSaved {
        saved: i32,
        remaining: i32,
    },
    LifeLost {
        lives: i32,
    },
    FinalStage,
    Died,
    Won,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EncounterKind {
    Attacked,
    Found,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Encounter {
    pub kind: EncounterKind,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SixthSense {
    #[serde(rename = "closestZombie")]
    pub closest_zombie: Option<i32>,
    pub kitten: i32,
}

impl SixthSense {
    pub fn hint_text(&self) -> String {
        let zombie = self
            .closest_zombie
            .map(|distance| distance.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!("Closest Zombie: {zombie} UM and Kitten: {} UM", self.kitten)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: i32,
    pub y: i32,
    pub lives: i32,
    #[serde(rename = "kittensSaved")]
    pub kittens_saved: i32,
    #[serde(rename = "kittensRemaining")]
    pub kittens_remaining: i32,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ZombieView {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "nearbySfx")]
    pub nearby_sfx: String,
    #[serde(rename = "caughtSfx")]
    pub caught_sfx: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KittenView {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct LocationView {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub description: String,
    pub coordinates: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub turn: u64,
    pub player: PlayerView,
    pub zombies: Vec<ZombieView>,
    pub kitten: KittenView,
    pub location: LocationView,
    pub encounters: Vec<Encounter>,
    #[serde(rename = "sixthSense")]
    pub sixth_sense: SixthSense,
    #[serde(rename = "sixthSenseText")]
    pub sixth_sense_text: String,
    pub terminal: Option<TerminalState>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub moved: bool,
    pub events: Vec<GameEvent>,
    pub terminal: Option<TerminalState>,
}

impl TurnReport {
    pub fn rejected() -> Self {
        Self::default()
    }

    pub fn sounds(&self) -> impl Iterator<Item = (SoundCue, &str)> {
        self.events.iter().filter_map(|event| match event {
            GameEvent::Sound { cue, url } => Some((*cue, url.as_str())),
            _ => None,
        })
    }
}
