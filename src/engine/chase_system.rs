use super::*;

impl Zombie {
    pub(super) fn step_toward(&mut self, target: Vec2) {
        let dx = target.x - self.pos.x;
        let dy = target.y - self.pos.y;
        if dx.abs() >= dy.abs() {
            if dx < 0 {
                self.pos.x -= 1;
            } else {
                self.pos.x += 1;
            }
        } else if dy < 0 {
            self.pos.y -= 1;
        } else {
            self.pos.y += 1;
        }
    }

    pub(super) fn enter_final_stage(&mut self) {
        self.stage = ZombieStage::Final;
    }
}

impl GameBoard {
    pub(super) fn move_zombies(&mut self) {
        let target = self.player.pos;
        for zombie in &mut self.zombies {
            if self.rng.bool(self.options.chase_probability) {
                zombie.step_toward(target);
            }
        }
    }

    pub(super) fn zombies_at(&self, pos: Vec2) -> impl Iterator<Item = &Zombie> {
        self.zombies.iter().filter(move |zombie| zombie.pos == pos)
    }

    pub(super) fn zombies_near(&self, pos: Vec2) -> impl Iterator<Item = &Zombie> {
        self.zombies
            .iter()
            .filter(move |zombie| neighboring(zombie.pos, pos))
    }
}
