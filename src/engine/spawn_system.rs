use super::*;

pub(super) fn random_cell_excluding(rng: &mut Rng, width: i32, height: i32, blocked: Vec2) -> Vec2 {
    loop {
        let candidate = rng.coords(width, height);
        if candidate != blocked {
            return candidate;
        }
    }
}

impl GameBoard {
    pub(super) fn spawn_zombies(spawns: &[Vec2]) -> Vec<Zombie> {
        let mut zombies: Vec<Zombie> = spawns.iter().copied().map(Zombie::new).collect();
        if zombies.is_empty() {
            zombies.push(Zombie::new(ZOMBIE_START));
        }
        zombies
    }

    pub(super) fn relocate_kitten(&mut self) {
        self.kitten.pos = random_cell_excluding(
            &mut self.rng,
            self.map.width,
            self.map.height,
            self.player.pos,
        );
        self.kitten.variant = kitten_variant_after(self.player.kittens_saved);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn random_cell_never_lands_on_blocked_cell() {
        let mut rng = Rng::new(99);
        for _ in 0..1_000 {
            let blocked = rng.coords(GRID_WIDTH, GRID_HEIGHT);
            let cell = random_cell_excluding(&mut rng, GRID_WIDTH, GRID_HEIGHT, blocked);
            assert_ne!(cell, blocked);
            assert!(in_bounds(cell, GRID_WIDTH, GRID_HEIGHT));
        }
    }

    #[test]
    fn random_cell_covers_the_whole_grid() {
        let mut rng = Rng::new(1);
        let mut seen = HashSet::new();
        for _ in 0..2_000 {
            seen.insert(random_cell_excluding(
                &mut rng,
                GRID_WIDTH,
                GRID_HEIGHT,
                PLAYER_START,
            ));
        }
        assert_eq!(seen.len(), (GRID_WIDTH * GRID_HEIGHT - 1) as usize);
        assert!(!seen.contains(&PLAYER_START));
    }

    #[test]
    fn empty_spawn_list_falls_back_to_default_zombie() {
        let zombies = GameBoard::spawn_zombies(&[]);
        assert_eq!(zombies.len(), 1);
        assert_eq!(zombies[0].pos, ZOMBIE_START);
    }

    #[test]
    fn relocation_advances_kitten_variant() {
        let mut board = GameBoard::new(8, GameBoardOptions::default());
        board.player.kittens_saved = 3;
        board.relocate_kitten();
        assert_eq!(board.kitten.variant, 4);
        assert_ne!(board.kitten.pos, board.player.pos);
    }
}
