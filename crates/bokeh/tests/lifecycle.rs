//! End-to-end pool lifecycle scenarios

use bokeh::{BokehConfig, BokehPool, LegCompleted, RunState};
use bokeh_animation::{AnimationClock, Easing};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::thread;

fn pool(count: u32, duration_ms: u64, seed: u64) -> BokehPool {
    let config = BokehConfig::default()
        .with_count(count)
        .with_leg_duration_ms(duration_ms);
    BokehPool::with_rng(config, Box::new(StdRng::seed_from_u64(seed))).unwrap()
}

#[test]
fn test_build_yields_distinct_indices() {
    for count in [1u32, 3, 20, 64] {
        let pool = pool(count, 1000, count as u64);
        let indices: HashSet<usize> = pool
            .scheduler()
            .particles()
            .iter()
            .map(|p| p.index)
            .collect();
        assert_eq!(indices, (0..count as usize).collect());
    }
}

#[test]
fn test_single_particle_recycles_in_place() {
    let pool = pool(1, 1000, 1);
    pool.build();
    pool.start();

    let first = pool.scheduler().particles()[0];
    let first_leg = first.leg.unwrap();
    assert_eq!(first_leg.leg.start_delay_ms, 0);

    let completed = pool.scheduler().advance(1000.0);
    assert_eq!(
        completed,
        vec![LegCompleted {
            particle: first.id,
            leg: first_leg.id,
        }]
    );
    assert!(pool.scheduler().on_leg_completed(completed[0]));

    let after = pool.scheduler().particles()[0];
    let second_leg = after.leg.unwrap();
    assert_eq!(after.id, first.id);
    assert_ne!(second_leg.id, first_leg.id);
    assert_eq!(second_leg.leg.start_delay_ms, 0);
    assert_ne!(second_leg.leg.target, first_leg.leg.target);
    assert_eq!(after.transform.scale, first.transform.scale);
    assert_eq!(pool.scheduler().stats().legs_issued, 2);
}

#[test]
fn test_scale_never_rerolled() {
    let pool = pool(8, 200, 5);
    pool.start();
    let scales: Vec<f32> = pool
        .scheduler()
        .transforms()
        .iter()
        .map(|t| t.scale)
        .collect();

    for _ in 0..200 {
        pool.tick(16.0);
    }
    pool.stop();
    pool.start();
    pool.tick(50.0);

    let after: Vec<f32> = pool
        .scheduler()
        .transforms()
        .iter()
        .map(|t| t.scale)
        .collect();
    assert_eq!(after, scales);
    assert!(pool.scheduler().stats().recycled >= 8);
}

#[test]
fn test_four_particle_wave() {
    let pool = pool(4, 1000, 2);
    pool.start();
    let delays: Vec<u64> = pool
        .scheduler()
        .particles()
        .iter()
        .map(|p| p.leg.unwrap().leg.start_delay_ms)
        .collect();
    assert_eq!(delays, vec![0, 250, 500, 750]);
}

#[test]
fn test_wave_erodes_after_recycle() {
    let pool = pool(4, 1000, 3);
    pool.start();

    // Every particle has completed its first leg by t = 1750
    for _ in 0..175 {
        pool.tick(10.0);
    }
    assert!(pool
        .scheduler()
        .particles()
        .iter()
        .all(|p| p.leg.unwrap().leg.start_delay_ms == 0));
}

#[test]
fn test_cancel_freezes_interpolated_value() {
    let config = BokehConfig::default()
        .with_count(1)
        .with_leg_duration_ms(1000)
        .with_easing(Easing::Linear);
    let pool = BokehPool::with_rng(config, Box::new(StdRng::seed_from_u64(4))).unwrap();
    pool.start();

    let snapshot = pool.scheduler().particles()[0];
    let start = snapshot.transform;
    let target = snapshot.leg.unwrap().leg.target;

    pool.tick(500.0);
    pool.stop();
    let frozen = pool.scheduler().transforms()[0];

    let expected_x = start.translate_x + (target.dx - start.translate_x) * 0.5;
    let expected_opacity = start.opacity + (target.opacity - start.opacity) * 0.5;
    assert!((frozen.translate_x - expected_x).abs() < 1e-3);
    assert!((frozen.opacity - expected_opacity).abs() < 1e-5);

    pool.tick(500.0);
    assert_eq!(pool.scheduler().transforms()[0], frozen);
    assert_ne!(frozen.translate_x, target.dx);
}

#[test]
fn test_idempotent_lifecycle() {
    let pool = pool(5, 1000, 6);
    pool.start();
    let once = pool.scheduler().particles();
    pool.start();
    assert_eq!(pool.scheduler().particles(), once);

    pool.tick(100.0);
    pool.stop();
    let stopped = pool.scheduler().particles();
    pool.stop();
    assert_eq!(pool.scheduler().particles(), stopped);
    assert_eq!(pool.state(), RunState::Stopped);
}

#[test]
fn test_rebuild_on_resize_keeps_running() {
    let pool = pool(6, 1000, 8);
    pool.start();
    pool.tick(300.0);

    pool.on_layout(bokeh_core::Size::new(640.0, 480.0), bokeh_core::Insets::ZERO);
    assert!(pool.is_running());

    pool.rebuild();
    assert!(pool.is_running());
    let particles = pool.scheduler().particles();
    assert_eq!(particles.len(), 6);
    assert_eq!(particles[0].leg.unwrap().leg.start_delay_ms, 0);
    assert_eq!(pool.scheduler().viewport().radius, 240.0);
}

#[test]
fn test_stop_races_with_clock_thread() {
    let mut clock = AnimationClock::new();
    clock.set_target_fps(500);

    let mut pool = pool(16, 20, 10);
    assert!(pool.attach_clock(&clock.handle()));
    pool.start();
    clock.start_background();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let scheduler = pool.scheduler().clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    scheduler.stop();
                    scheduler.start();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    pool.stop();
    let issued = pool.scheduler().stats().legs_issued;
    thread::sleep(std::time::Duration::from_millis(50));
    clock.stop_background();

    assert_eq!(pool.state(), RunState::Stopped);
    assert!(pool.scheduler().particles().iter().all(|p| p.leg.is_none()));
    assert_eq!(pool.scheduler().stats().legs_issued, issued);
    assert_eq!(pool.scheduler().particle_count(), 16);
}
