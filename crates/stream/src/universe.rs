use glam::DVec2;
use voidspace_common::SectorCoord;
use voidspace_kernel::{ConfigError, Sector, SectorGenerator, Tunables, WorldSeed};
use voidspace_persist::WorldChanges;

use crate::sampler::PhysicsSampler;
use crate::streamer::{SectorStreamer, StreamConfig, StreamStats, VisibleObjects};

/// One world instance: generator, sector cache and depletion overlay.
///
/// The server and every client each own one. Nothing is shared between
/// instances; they agree because generation is deterministic.
pub struct Universe {
    streamer: SectorStreamer,
    changes: WorldChanges,
}

impl Universe {
    /// Validate configuration and create an empty world.
    pub fn new(
        seed: WorldSeed,
        tunables: Tunables,
        config: StreamConfig,
    ) -> Result<Self, ConfigError> {
        let generator = SectorGenerator::new(seed, tunables)?;
        let streamer = SectorStreamer::new(generator, config)?;
        tracing::info!(%seed, "universe initialised");
        Ok(Self {
            streamer,
            changes: WorldChanges::new(),
        })
    }

    /// Replace the overlay, e.g. with one loaded from a `ChangeStore`.
    pub fn with_changes(mut self, changes: WorldChanges) -> Self {
        self.changes = changes;
        self
    }

    pub fn seed(&self) -> WorldSeed {
        self.streamer.generator().seed()
    }

    pub fn update(&mut self, position: DVec2) -> &StreamStats {
        self.streamer.update(position)
    }

    /// Objects near `position` at live positions, minus depleted ones.
    pub fn visible_objects(
        &mut self,
        position: DVec2,
        view_distance: f64,
        sampler: &impl PhysicsSampler,
    ) -> VisibleObjects {
        let mut visible = self
            .streamer
            .visible_objects(position, view_distance, sampler);
        visible.retain_available(&self.changes);
        visible
    }

    pub fn sector(&self, coord: SectorCoord) -> Option<&Sector> {
        self.streamer.sector(coord)
    }

    pub fn streamer(&self) -> &SectorStreamer {
        &self.streamer
    }

    pub fn changes(&self) -> &WorldChanges {
        &self.changes
    }

    pub fn changes_mut(&mut self) -> &mut WorldChanges {
        &mut self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::KinematicSampler;
    use voidspace_persist::ChangeEvent;

    fn universe(seed: u32) -> Universe {
        Universe::new(WorldSeed(seed), Tunables::default(), StreamConfig::default()).unwrap()
    }

    #[test]
    fn server_and_client_see_the_same_world() {
        let mut server = universe(1234);
        let mut client = universe(1234);
        let pos = DVec2::new(12_345.0, -6_789.0);
        let sampler = KinematicSampler::at(10.0, 10.0);

        let a = server.visible_objects(pos, 3000.0, &sampler);
        let b = client.visible_objects(pos, 3000.0, &sampler);
        assert_eq!(a, b);
    }

    #[test]
    fn depletion_survives_eviction() {
        let mut u = universe(5);
        let home = DVec2::new(2500.0, 2500.0);
        let sampler = KinematicSampler::default();

        let visible = u.visible_objects(home, f64::INFINITY, &sampler);
        let target = visible.asteroids[0].entity.id.clone();
        u.changes_mut().mark_depleted(target.clone(), 60_000);

        // Travel far enough to evict home, then come back.
        u.update(DVec2::new(100_000.0, 100_000.0));
        assert!(u.sector(SectorCoord::new(0, 0)).is_none());

        let again = u.visible_objects(home, f64::INFINITY, &sampler);
        assert!(again.ids().all(|id| *id != target));
        assert_eq!(again.len(), visible.len() - 1);

        u.changes_mut().mark_respawned(&target);
        let restored = u.visible_objects(home, f64::INFINITY, &sampler);
        assert_eq!(restored.len(), visible.len());
    }

    #[test]
    fn client_applies_server_deltas() {
        let mut server = universe(77);
        let mut client = universe(77);
        let home = DVec2::new(2500.0, 2500.0);
        let sampler = KinematicSampler::default();

        let seen = server.visible_objects(home, f64::INFINITY, &sampler);
        let target = seen.asteroids[0].entity.id.clone();
        server.changes_mut().mark_depleted(target.clone(), 1);

        let deltas: Vec<ChangeEvent> = server.changes_mut().drain_events();
        for event in &deltas {
            client.changes_mut().apply(event);
        }
        let client_view = client.visible_objects(home, f64::INFINITY, &sampler);
        let server_view = server.visible_objects(home, f64::INFINITY, &sampler);
        assert_eq!(client_view, server_view);
        assert!(client.changes().is_depleted(&target));
    }

    #[test]
    fn restored_overlay_is_used() {
        let mut changes = WorldChanges::new();
        changes.mark_depleted("0_0_star_0".into(), 5);
        let mut u = universe(42).with_changes(changes);
        let visible = u.visible_objects(
            DVec2::new(2500.0, 2500.0),
            f64::INFINITY,
            &KinematicSampler::default(),
        );
        assert!(visible.stars.iter().all(|s| s.entity.id.as_str() != "0_0_star_0"));
        assert_eq!(u.seed(), WorldSeed(42));
    }

    #[test]
    fn bad_config_fails_at_init() {
        let mut tunables = Tunables::default();
        tunables.sector_size = -1.0;
        assert!(Universe::new(WorldSeed(1), tunables, StreamConfig::default()).is_err());
    }
}
