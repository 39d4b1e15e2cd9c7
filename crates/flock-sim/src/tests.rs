//! Integration tests for flock-sim.

use flock_agent::{AgentStore, AgentStoreBuilder};
use flock_core::{Params, SimConfig, Vec3};

use crate::{Backend, Sim};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(population: usize, total_ticks: u64) -> SimConfig {
    SimConfig {
        population,
        seed:                  42,
        dt:                    1.0 / 60.0,
        total_ticks,
        num_threads:           None,
        output_interval_ticks: total_ticks.max(1),
        seed_radius:           2.0,
    }
}

fn seeded_store(n: usize, seed: u64) -> AgentStore {
    AgentStoreBuilder::new(n, seed)
        .seed_volume(Vec3::ZERO, 2.0)
        .init_speed(2.0)
        .build()
        .unwrap()
}

fn positions<B: Backend>(sim: &Sim<B>) -> Vec<Vec3> {
    sim.view().positions.to_vec()
}

fn assert_close(a: &[Vec3], b: &[Vec3], tol: f32) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!(x.abs_diff_eq(*y, tol), "agent {i}: {x} vs {y}");
    }
}

// ── SimBuilder validation ─────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;
    use crate::{ParallelBackend, SequentialBackend, SimBuilder, SimError};

    #[test]
    fn initialize_seeds_population() {
        let seq = Sim::initialize(test_config(40, 1), Params::default(), SequentialBackend::new()).unwrap();
        let par = Sim::initialize(test_config(40, 1), Params::default(), ParallelBackend::new()).unwrap();
        assert_eq!(seq.backend().len(), 40);
        assert_eq!(par.backend().len(), 40);
        assert_eq!(par.backend().force_buffer().len(), 40);
        assert_eq!(par.backend().ramps().len(), 40);
    }

    #[test]
    fn both_backends_seed_identically() {
        let seq = Sim::initialize(test_config(64, 1), Params::default(), SequentialBackend::new()).unwrap();
        let par = Sim::initialize(test_config(64, 1), Params::default(), ParallelBackend::new()).unwrap();
        assert_eq!(positions(&seq), positions(&par));
    }

    #[test]
    fn seeds_inside_seed_sphere_around_wall_center() {
        let params = Params { wall_center: Vec3::new(10.0, 0.0, -3.0), ..Params::default() };
        let sim = Sim::initialize(test_config(100, 1), params, SequentialBackend::new()).unwrap();
        for p in positions(&sim) {
            assert!(p.distance(Vec3::new(10.0, 0.0, -3.0)) <= 2.0 + 1e-5);
        }
    }

    #[test]
    fn explicit_store_is_used() {
        let store = seeded_store(5, 99);
        let expected = store.position.clone();
        let sim = SimBuilder::new(test_config(5, 1), Params::default(), SequentialBackend::new())
            .store(store)
            .build()
            .unwrap();
        assert_eq!(positions(&sim), expected);
    }

    #[test]
    fn store_count_mismatch_errors() {
        let result = SimBuilder::new(test_config(6, 1), Params::default(), SequentialBackend::new())
            .store(seeded_store(5, 1))
            .build();
        assert!(matches!(
            result,
            Err(SimError::AgentCountMismatch { expected: 6, got: 5, .. })
        ));
    }

    #[test]
    fn negative_dt_rejected() {
        let config = SimConfig { dt: -0.1, ..test_config(3, 1) };
        let result = Sim::initialize(config, Params::default(), SequentialBackend::new());
        assert!(matches!(result, Err(SimError::InvalidStep(_))));
    }

    #[test]
    fn zero_threads_rejected() {
        let config = SimConfig { num_threads: Some(0), ..test_config(3, 1) };
        let result = Sim::initialize(config, Params::default(), ParallelBackend::new());
        assert!(matches!(result, Err(SimError::Config(_))));
    }

    #[test]
    fn empty_population_runs() {
        let mut sim = Sim::initialize(test_config(0, 3), Params::default(), ParallelBackend::new()).unwrap();
        let summary = sim.tick(0.1).unwrap();
        assert_eq!(summary.agents, 0);
        assert_eq!(summary.mean_speed, 0.0);
        assert_eq!(summary.mean_neighbors, 0.0);
    }
}

// ── Run lifecycle ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle_tests {
    use flock_agent::Pose;
    use flock_core::Tick;

    use super::*;
    use crate::{NoopObserver, ParallelBackend, SequentialBackend, SimError, SimObserver, TickSummary};

    #[derive(Default)]
    struct Counter {
        starts:     u64,
        ends:       u64,
        snapshots:  Vec<(Tick, usize)>,
        sim_end:    Option<Tick>,
        last:       Option<TickSummary>,
    }

    impl SimObserver for Counter {
        fn on_tick_start(&mut self, _tick: Tick) {
            self.starts += 1;
        }
        fn on_tick_end(&mut self, tick: Tick, summary: &TickSummary) {
            assert_eq!(tick, summary.tick);
            self.ends += 1;
            self.last = Some(*summary);
        }
        fn on_snapshot(&mut self, tick: Tick, poses: &[Pose]) {
            self.snapshots.push((tick, poses.len()));
        }
        fn on_sim_end(&mut self, final_tick: Tick) {
            self.sim_end = Some(final_tick);
        }
    }

    #[test]
    fn run_reaches_end_tick() {
        let mut sim = Sim::initialize(test_config(10, 12), Params::default(), SequentialBackend::new()).unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(12));
        assert!((sim.clock.elapsed_secs - 12.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn observer_hooks_fire_per_tick() {
        let config = SimConfig { output_interval_ticks: 2, ..test_config(7, 10) };
        let mut sim = Sim::initialize(config, Params::default(), ParallelBackend::new()).unwrap();
        let mut obs = Counter::default();
        sim.run(&mut obs).unwrap();

        assert_eq!(obs.starts, 10);
        assert_eq!(obs.ends, 10);
        assert_eq!(obs.sim_end, Some(Tick(10)));
        let ticks: Vec<u64> = obs.snapshots.iter().map(|(t, _)| t.0).collect();
        assert_eq!(ticks, vec![0, 2, 4, 6, 8]);
        assert!(obs.snapshots.iter().all(|&(_, n)| n == 7));
        assert_eq!(obs.last.unwrap().agents, 7);
    }

    #[test]
    fn zero_interval_disables_snapshots() {
        let config = SimConfig { output_interval_ticks: 0, ..test_config(3, 5) };
        let mut sim = Sim::initialize(config, Params::default(), SequentialBackend::new()).unwrap();
        let mut obs = Counter::default();
        sim.run(&mut obs).unwrap();
        assert!(obs.snapshots.is_empty());
    }

    #[test]
    fn run_ticks_ignores_end_tick() {
        let mut sim = Sim::initialize(test_config(3, 2), Params::default(), SequentialBackend::new()).unwrap();
        let mut obs = Counter::default();
        sim.run_ticks(5, &mut obs).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(5));
        assert_eq!(obs.sim_end, None);
    }

    #[test]
    fn clock_sums_variable_dt() {
        let mut sim = Sim::initialize(test_config(3, 1), Params::default(), SequentialBackend::new()).unwrap();
        sim.tick(0.1).unwrap();
        sim.tick(0.25).unwrap();
        let summary = sim.tick(0.05).unwrap();
        assert_eq!(summary.tick, Tick(2));
        assert!((summary.elapsed_secs - 0.4).abs() < 1e-6);
    }

    #[test]
    fn zero_dt_does_not_move_agents() {
        let mut sim = Sim::initialize(test_config(20, 1), Params::default(), ParallelBackend::new()).unwrap();
        let before = positions(&sim);
        sim.tick(0.0).unwrap();
        assert_eq!(positions(&sim), before);
    }

    #[test]
    fn invalid_dt_rejected_without_advancing() {
        let mut sim = Sim::initialize(test_config(3, 1), Params::default(), SequentialBackend::new()).unwrap();
        assert!(matches!(sim.tick(-1.0), Err(SimError::InvalidStep(_))));
        assert!(matches!(sim.tick(f32::NAN), Err(SimError::InvalidStep(_))));
        assert_eq!(sim.clock.current_tick, Tick(0));
    }

    #[test]
    fn shutdown_releases_storage() {
        let mut sim = Sim::initialize(test_config(30, 1), Params::default(), ParallelBackend::new()).unwrap();
        sim.tick(0.1).unwrap();
        sim.shutdown();
        assert!(!sim.is_running());
        assert!(sim.backend().is_empty());
        assert_eq!(sim.backend().capacity(), 0);
        assert!(matches!(sim.tick(0.1), Err(SimError::ShutDown)));
        sim.shutdown();
    }

    #[test]
    fn poses_match_view() {
        let mut sim = Sim::initialize(test_config(9, 1), Params::default(), SequentialBackend::new()).unwrap();
        sim.tick(0.1).unwrap();
        let poses: Vec<Pose> = sim.poses().collect();
        assert_eq!(poses.len(), 9);
        for (pose, p) in poses.iter().zip(sim.view().positions) {
            assert_eq!(pose.position, *p);
            assert!(pose.orientation.is_normalized());
        }
    }
}

// ── Parameters ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod params_tests {
    use super::*;
    use crate::{ParallelBackend, SequentialBackend};

    #[test]
    fn staged_params_apply_at_next_tick() {
        let mut sim = Sim::initialize(test_config(20, 1), Params::default(), SequentialBackend::new()).unwrap();
        let slow = Params { min_speed: 0.5, max_speed: 1.0, ..Params::default() };
        sim.stage_params(slow.clone());
        assert_eq!(sim.params().max_speed, 5.0);

        sim.tick(0.1).unwrap();
        assert_eq!(sim.params(), &slow);
        for v in sim.view().velocities {
            assert!(v.length() <= 1.0 + 1e-4);
        }
    }

    #[test]
    fn last_staged_bundle_wins() {
        let mut sim = Sim::initialize(test_config(5, 1), Params::default(), ParallelBackend::new()).unwrap();
        sim.stage_params(Params { max_speed: 3.0, ..Params::default() });
        sim.stage_params(Params { max_speed: 4.0, ..Params::default() });
        sim.tick(0.1).unwrap();
        assert_eq!(sim.params().max_speed, 4.0);
    }

    #[test]
    fn inverted_speed_range_is_repaired() {
        let params = Params { min_speed: 3.0, max_speed: 1.0, ..Params::default() };
        let mut sim = Sim::initialize(test_config(15, 1), params, SequentialBackend::new()).unwrap();
        sim.tick(0.1).unwrap();
        for v in sim.view().velocities {
            assert!((v.length() - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn disabled_rules_do_not_fail_ticks() {
        let params = Params {
            neighbor_distance: -1.0,
            wall_scale:        0.0,
            repel_radius:      0.0,
            ..Params::default()
        };
        let mut sim = Sim::initialize(test_config(15, 1), params, ParallelBackend::new()).unwrap();
        let summary = sim.tick(0.1).unwrap();
        assert_eq!(summary.mean_neighbors, 0.0);
    }
}

// ── Speed bounds ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod speed_tests {
    use super::*;
    use crate::{NoopObserver, ParallelBackend, SequentialBackend};

    fn assert_speeds_bounded<B: Backend>(sim: &Sim<B>) {
        let (min, max) = sim.params().speed_limits();
        for v in sim.view().velocities {
            let s = v.length();
            assert!(s >= min - 1e-4 && s <= max + 1e-4, "speed {s} outside [{min}, {max}]");
        }
    }

    #[test]
    fn sequential_speeds_stay_in_bounds() {
        let mut sim = Sim::initialize(test_config(80, 1), Params::default(), SequentialBackend::new()).unwrap();
        for _ in 0..60 {
            sim.run_ticks(1, &mut NoopObserver).unwrap();
            assert_speeds_bounded(&sim);
        }
    }

    #[test]
    fn parallel_speeds_stay_in_bounds() {
        let mut sim = Sim::initialize(test_config(300, 1), Params::default(), ParallelBackend::new()).unwrap();
        for _ in 0..60 {
            sim.run_ticks(1, &mut NoopObserver).unwrap();
            assert_speeds_bounded(&sim);
        }
    }

    #[test]
    fn mean_speed_reported_in_bounds() {
        let mut sim = Sim::initialize(test_config(50, 1), Params::default(), ParallelBackend::new()).unwrap();
        let summary = sim.tick(0.1).unwrap();
        assert!(summary.mean_speed >= 2.0 - 1e-4 && summary.mean_speed <= 5.0 + 1e-4);
    }
}

// ── Determinism and backend agreement ─────────────────────────────────────────

#[cfg(test)]
mod determinism_tests {
    use super::*;
    use crate::{NoopObserver, ParallelBackend, SequentialBackend};

    fn run<B: Backend>(backend: B, params: Params, config: SimConfig) -> Vec<Vec3> {
        let mut sim = Sim::initialize(config, params, backend).unwrap();
        sim.run(&mut NoopObserver).unwrap();
        positions(&sim)
    }

    #[test]
    fn repeated_runs_are_identical() {
        let a = run(SequentialBackend::new(), Params::default(), test_config(60, 30));
        let b = run(SequentialBackend::new(), Params::default(), test_config(60, 30));
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_diverge() {
        let a = run(SequentialBackend::new(), Params::default(), test_config(20, 5));
        let b = run(SequentialBackend::new(), Params::default(), SimConfig { seed: 7, ..test_config(20, 5) });
        assert_ne!(a, b);
    }

    #[test]
    fn backends_agree() {
        // Two batches: 256 + 44.
        let seq = run(SequentialBackend::new(), Params::default(), test_config(300, 20));
        let par = run(ParallelBackend::new(), Params::default(), test_config(300, 20));
        assert_close(&seq, &par, 1e-4);
    }

    #[test]
    fn backends_agree_without_clamp() {
        let params = Params::legacy_sequential();
        let seq = run(SequentialBackend::new(), params.clone(), test_config(100, 20));
        let par = run(ParallelBackend::new(), params, test_config(100, 20));
        assert_close(&seq, &par, 1e-4);
    }

    #[test]
    fn batch_size_does_not_change_results() {
        let a = run(ParallelBackend::new(), Params::default(), test_config(100, 15));
        let b = run(ParallelBackend::new().with_batch_size(7), Params::default(), test_config(100, 15));
        assert_eq!(a, b);
    }

    #[test]
    fn dedicated_pool_matches_global_pool() {
        let a = run(ParallelBackend::new(), Params::default(), test_config(100, 15));
        let config = SimConfig { num_threads: Some(2), ..test_config(100, 15) };
        let b = run(ParallelBackend::new(), Params::default(), config);
        assert_eq!(a, b);
    }
}

// ── Two-phase tick ────────────────────────────────────────────────────────────

#[cfg(test)]
mod two_phase_tests {
    use flock_behavior::{FlockContext, ForceModel, Integrator, ObstacleSet};
    use flock_core::Tick;

    use super::*;
    use crate::{ParallelBackend, SequentialBackend, SimBuilder};

    /// Every agent's force from the pre-tick snapshot, then every commit.
    fn reference_step(store: &AgentStore, params: &Params, dt: f32) -> Vec<Vec3> {
        let model = ForceModel::new(params);
        let integrator = Integrator::new(params);
        let obstacles = ObstacleSet::new();
        let ctx = FlockContext::new(Tick::ZERO, store.view(), &obstacles);
        let forces: Vec<Vec3> = store.agent_ids().map(|id| model.steer(id, &ctx).force).collect();

        let mut next = store.clone();
        for (i, f) in forces.into_iter().enumerate() {
            integrator.integrate(&mut next.position[i], &mut next.velocity[i], f, dt);
        }
        next.position
    }

    #[test]
    fn sequential_reads_only_pre_tick_state() {
        let store = seeded_store(50, 3);
        let expected = reference_step(&store, &Params::default(), 0.1);
        let mut sim = SimBuilder::new(test_config(50, 1), Params::default(), SequentialBackend::new())
            .store(store)
            .build()
            .unwrap();
        sim.tick(0.1).unwrap();
        assert_eq!(sim.view().positions, &expected[..]);
    }

    #[test]
    fn parallel_reads_only_pre_tick_state() {
        let store = seeded_store(50, 3);
        let expected = reference_step(&store, &Params::default(), 0.1);
        let mut sim = SimBuilder::new(test_config(50, 1), Params::default(), ParallelBackend::new().with_batch_size(8))
            .store(store)
            .build()
            .unwrap();
        sim.tick(0.1).unwrap();
        assert_eq!(sim.view().positions, &expected[..]);
    }

    #[test]
    fn agent_order_does_not_matter() {
        let forward = seeded_store(40, 11);
        let mut reversed = AgentStore::default();
        for i in (0..forward.len()).rev() {
            reversed.push(forward.position[i], forward.velocity[i]);
        }

        let mut a = SimBuilder::new(test_config(40, 1), Params::default(), SequentialBackend::new())
            .store(forward)
            .build()
            .unwrap();
        let mut b = SimBuilder::new(test_config(40, 1), Params::default(), SequentialBackend::new())
            .store(reversed)
            .build()
            .unwrap();
        a.tick(0.1).unwrap();
        b.tick(0.1).unwrap();

        let mut b_positions = positions(&b);
        b_positions.reverse();
        assert_close(&positions(&a), &b_positions, 1e-4);
    }
}

// ── Backend specifics ─────────────────────────────────────────────────────────

#[cfg(test)]
mod backend_tests {
    use flock_agent::Pose;
    use flock_core::AgentId;

    use super::*;
    use crate::{DEFAULT_BATCH_SIZE, ParallelBackend, SequentialBackend};

    #[test]
    fn batch_count_rounds_up() {
        let sim = Sim::initialize(test_config(300, 1), Params::default(), ParallelBackend::new()).unwrap();
        assert_eq!(sim.backend().batch_size(), DEFAULT_BATCH_SIZE);
        assert_eq!(sim.backend().batch_count(), 2);
        assert_eq!(ParallelBackend::new().with_batch_size(0).batch_size(), 1);
    }

    #[test]
    fn force_buffer_cleared_after_tick() {
        let mut sim = Sim::initialize(test_config(40, 1), Params::default(), ParallelBackend::new()).unwrap();
        sim.tick(0.1).unwrap();
        assert!(sim.backend().force_buffer().iter().all(|f| *f == Vec3::ZERO));
    }

    #[test]
    fn ramp_moves_max_speed_gradually() {
        let params = Params { speed_ramp_rate: Some(1.0), ..Params::default() };
        let mut sim = Sim::initialize(test_config(10, 1), params.clone(), ParallelBackend::new()).unwrap();
        assert!(sim.backend().ramps().iter().all(|r| r.prev_max_speed == 5.0));

        sim.stage_params(Params { max_speed: 10.0, ..params });
        sim.tick(0.5).unwrap();
        for ramp in sim.backend().ramps() {
            assert!((ramp.prev_max_speed - 5.5).abs() < 1e-5);
            assert!((ramp.additional_speed - 0.5).abs() < 1e-5);
        }
        for v in sim.view().velocities {
            assert!(v.length() <= 5.5 + 1e-4);
        }
    }

    #[test]
    fn spawned_agent_joins_next_tick() {
        let mut sim = Sim::initialize(test_config(4, 1), Params::default(), SequentialBackend::new()).unwrap();
        let id = sim.backend_mut().spawn(Vec3::new(0.5, 0.0, 0.0), Vec3::X * 2.0);
        assert_eq!(id, AgentId(4));
        let summary = sim.tick(0.1).unwrap();
        assert_eq!(summary.agents, 5);
    }

    #[test]
    fn despawn_moves_last_agent() {
        let mut sim = Sim::initialize(test_config(4, 1), Params::default(), SequentialBackend::new()).unwrap();
        let last = sim.view().position(AgentId(3));
        let removed: Option<Pose> = sim.backend_mut().despawn(AgentId(1));
        assert!(removed.is_some());
        assert_eq!(sim.backend().len(), 3);
        assert_eq!(sim.view().position(AgentId(1)), last);
        assert!(sim.backend_mut().despawn(AgentId(9)).is_none());
    }

    #[test]
    fn release_empties_parallel_backend() {
        let mut backend = ParallelBackend::new();
        backend.load(seeded_store(12, 1), &Params::default()).unwrap();
        assert_eq!(backend.len(), 12);
        backend.release();
        assert!(backend.is_empty());
        assert!(backend.ramps().is_empty());
        assert!(backend.orientations().is_empty());
    }
}

// ── Obstacle provider ─────────────────────────────────────────────────────────

#[cfg(test)]
mod obstacle_tests {
    use std::sync::{Arc, Mutex};

    use flock_behavior::{FnObstacles, Obstacle, StaticObstacles, Unavailable};
    use flock_core::Tick;

    use super::*;
    use crate::{ParallelBackend, SequentialBackend, SimBuilder};

    #[test]
    fn provider_polled_once_per_tick() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let provider = FnObstacles(move |tick: Tick, out: &mut Vec<Obstacle>| -> Result<(), Unavailable> {
            log.lock().unwrap().push(tick.0);
            out.push(Obstacle::point(Vec3::new(tick.0 as f32, 0.0, 0.0)));
            Ok(())
        });
        let mut sim = SimBuilder::new(test_config(5, 1), Params::default(), SequentialBackend::new())
            .obstacles(provider)
            .build()
            .unwrap();
        for _ in 0..3 {
            let summary = sim.tick(0.1).unwrap();
            assert_eq!(summary.obstacles, 1);
        }
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(sim.obstacles().as_slice()[0].center, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn unavailable_provider_means_no_obstacles() {
        let provider = FnObstacles(|tick: Tick, out: &mut Vec<Obstacle>| -> Result<(), Unavailable> {
            out.push(Obstacle::point(Vec3::ZERO));
            if tick.0 % 2 == 1 { Err(Unavailable) } else { Ok(()) }
        });
        let mut sim = SimBuilder::new(test_config(5, 1), Params::default(), ParallelBackend::new())
            .obstacles(provider)
            .build()
            .unwrap();
        assert_eq!(sim.tick(0.1).unwrap().obstacles, 1);
        assert_eq!(sim.tick(0.1).unwrap().obstacles, 0);
        assert!(sim.obstacles().is_empty());
        assert_eq!(sim.tick(0.1).unwrap().obstacles, 1);
    }

    #[test]
    fn repeller_pushes_agent_away() {
        let params = Params {
            separation_weight: 0.0,
            alignment_weight:  0.0,
            cohesion_weight:   0.0,
            wall_weight:       0.0,
            min_speed:         0.0,
            ..Params::default()
        };
        let mut store = AgentStore::default();
        store.push(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO);
        let mut sim = SimBuilder::new(test_config(1, 1), params, SequentialBackend::new())
            .store(store)
            .obstacles(StaticObstacles(vec![Obstacle::point(Vec3::ZERO)]))
            .build()
            .unwrap();
        sim.tick(0.1).unwrap();
        let v = sim.view().velocities[0];
        assert!(v.x > 0.0);
        assert!(v.y.abs() < 1e-6 && v.z.abs() < 1e-6);
    }
}
