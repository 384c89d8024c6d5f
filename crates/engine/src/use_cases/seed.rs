//! Bootstrap content: the Bobiverse universe and its protagonist.

use std::sync::Arc;

use taleforge_domain::{Character, Universe};

use crate::entities::{Characters, Universes};
use crate::infrastructure::ports::{ClockPort, RepoError};

const BOBIVERSE_NAME: &str = "Bobiverse";

/// Outcome of a seed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyPresent,
}

/// Idempotent seeding of the default universe. Safe to call on every boot.
pub struct SeedContent {
    universes: Arc<Universes>,
    characters: Arc<Characters>,
    clock: Arc<dyn ClockPort>,
}

impl SeedContent {
    pub fn new(
        universes: Arc<Universes>,
        characters: Arc<Characters>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            universes,
            characters,
            clock,
        }
    }

    pub async fn run(&self) -> Result<SeedOutcome, RepoError> {
        if self.universes.find_by_name(BOBIVERSE_NAME).await?.is_some() {
            return Ok(SeedOutcome::AlreadyPresent);
        }

        let now = self.clock.now();
        let universe = Universe::new(
            BOBIVERSE_NAME,
            "The universe of the Bobiverse series: self-replicating Von Neumann \
             probes exploring the galaxy after Earth's decline.",
            "You are the narrator of an interactive story set in the Bobiverse. \
             Humanity's survivors cling to a dying Earth while replicant probes, \
             each a copy of the engineer Bob Johansson, spread across nearby star \
             systems. Stay faithful to the series' grounded, engineering-minded \
             tone: relativistic travel, printer logistics, SCUT communication, \
             GUPPI assistance, and first contact handled with curiosity and care.",
            now,
        )
        .with_game_instructions(
            "The player is a replicant probe. Track their resources (printers, \
             drones, raw materials) and the passage of in-universe time. Major \
             decisions should have long-term consequences across star systems.",
        );
        self.universes.save(&universe).await?;

        let bob = Character::new(
            universe.id,
            "Bob Johansson",
            "A software engineer whose scanned mind now runs a Von Neumann probe. \
             Practical, wry, and endlessly curious.",
            now,
        )
        .protagonist()
        .with_personality(
            "Engineer's pragmatism with a dry sense of humor. Names things after \
             science fiction references and talks through problems aloud.",
        )
        .with_backstory(
            "Sold his software company, died crossing the street the same day, \
             and woke up a century later as a disembodied mind owned by a \
             theocratic state. Escaped Earth aboard an interstellar probe and \
             began replicating.",
        )
        .with_special_abilities(vec![
            "Self-replication".to_string(),
            "Frame-rate time dilation".to_string(),
            "Drone and printer control".to_string(),
            "SCUT instant communication".to_string(),
        ]);
        self.characters.save(&bob).await?;

        tracing::info!(universe_id = %universe.id, "Seeded default universe");
        Ok(SeedOutcome::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{
        MockCharacterRepo, MockClockPort, MockCustomCharacterRepo, MockCustomUniverseRepo,
        MockUniverseRepo,
    };
    use chrono::{TimeZone, Utc};

    fn seeder(universe_repo: MockUniverseRepo, character_repo: MockCharacterRepo) -> SeedContent {
        let mut clock = MockClockPort::new();
        clock
            .expect_now()
            .returning(|| Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
        SeedContent::new(
            Arc::new(Universes::new(
                Arc::new(universe_repo),
                Arc::new(MockCustomUniverseRepo::new()),
            )),
            Arc::new(Characters::new(
                Arc::new(character_repo),
                Arc::new(MockCustomCharacterRepo::new()),
            )),
            Arc::new(clock),
        )
    }

    #[tokio::test]
    async fn seeds_universe_and_protagonist_when_absent() {
        let mut universe_repo = MockUniverseRepo::new();
        universe_repo.expect_find_by_name().returning(|_| Ok(None));
        universe_repo
            .expect_save()
            .withf(|u| u.name == "Bobiverse" && u.game_instructions.is_some())
            .times(1)
            .returning(|_| Ok(()));

        let mut character_repo = MockCharacterRepo::new();
        character_repo
            .expect_save()
            .withf(|c| c.name == "Bob Johansson" && c.is_protagonist)
            .times(1)
            .returning(|_| Ok(()));

        let outcome = seeder(universe_repo, character_repo)
            .run()
            .await
            .expect("seed should succeed");
        assert_eq!(outcome, SeedOutcome::Created);
    }

    #[tokio::test]
    async fn second_run_is_a_no_op() {
        let mut universe_repo = MockUniverseRepo::new();
        universe_repo.expect_find_by_name().returning(|name| {
            Ok(Some(Universe::new(name, "d", "p", Utc::now())))
        });
        universe_repo.expect_save().times(0);

        let mut character_repo = MockCharacterRepo::new();
        character_repo.expect_save().times(0);

        let outcome = seeder(universe_repo, character_repo)
            .run()
            .await
            .expect("seed should succeed");
        assert_eq!(outcome, SeedOutcome::AlreadyPresent);
    }
}
