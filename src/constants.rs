use crate::types::Vec2;

pub const GRID_WIDTH: i32 = 5;
pub const GRID_HEIGHT: i32 = 5;

pub const STARTING_LIVES: i32 = 9;
pub const KITTENS_TO_SAVE: i32 = 7;
pub const KITTEN_VARIANTS: i32 = 7;
pub const FINAL_STAGE_LIVES: i32 = 1;

pub const CHASE_PROBABILITY: f32 = 0.75;

pub const PLAYER_START: Vec2 = Vec2 { x: 2, y: 1 };
pub const ZOMBIE_START: Vec2 = Vec2 { x: 0, y: 4 };

pub const TERMINAL_DELAY_MS: u64 = 2_000;

pub const PLAYER_IMAGE: &str = "resources/ninjacats/cat3.png";
pub const ZOMBIE_IMAGE: &str = "resources/dogs/dog3.png";
pub const ZOMBIE_NEARBY_SFX: &str = "resources/sfx/dog.ogg";
pub const ZOMBIE_CAUGHT_SFX: &str = "resources/sfx/zombie.ogg";
pub const FINAL_ZOMBIE_IMAGE: &str = "resources/dogs/final2.png";
pub const FINAL_ZOMBIE_NEARBY_SFX: &str = "resources/sfx/final.ogg";
pub const FINAL_ZOMBIE_CAUGHT_SFX: &str = "resources/sfx/finalcatch.ogg";
pub const KITTEN_FOUND_SFX: &str = "resources/sfx/ambient2.ogg";

pub const UNKNOWN_DESCRIPTION: &str = "unknown";

pub fn kitten_image(variant: i32) -> String {
    format!("resources/kittens/{variant}.png")
}

pub fn kitten_variant_after(saved: i32) -> i32 {
    saved.rem_euclid(KITTEN_VARIANTS) + 1
}

pub fn location_image(x: i32, y: i32) -> String {
    format!("resources/locations/{x}-{y}.png")
}

pub fn location_description_path(x: i32, y: i32) -> String {
    format!("locations/{x}-{y}.txt")
}
