//! Tether Headless Scene Harness
//!
//! Validates pure scene logic, bundled data and the engine end to end.
//! Runs entirely in-process: no window, no GPU.
//!
//! Usage:
//!   cargo run -p tether-simtest
//!   cargo run -p tether-simtest -- --verbose
//!   cargo run -p tether-simtest -- --json
//!
//! Logging goes through `env_logger`; set `RUST_LOG=debug` for engine detail.

use serde::Serialize;
use std::f32::consts::PI;

use tether_core::prelude::*;
use tether_logic::bounds::SceneBounds;
use tether_logic::camera::CameraRig;
use tether_logic::content::{parse_items, ContentIntake};
use tether_logic::error::DataError;
use tether_logic::pagination::PageWindow;
use tether_logic::suspension::{SuspensionConfig, SuspensionParams};
use tether_logic::wander::{WanderConfig, WanderingAgent};
use tether_logic::wind::WindField;

// ── Bundled data (same files the viewer loads) ─────────────────────────
const CONTENT_JSON: &str = include_str!("../../../data/sample_content.json");
const CONFIG_JSON: &str = include_str!("../../../data/scene_config.json");

const DT: f32 = 1.0 / 60.0;
const TEN_MINUTES: usize = 60 * 60 * 10;

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    let json = std::env::args().any(|a| a == "--json");
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if verbose { "info" } else { "warn" }),
    )
    .init();

    println!("=== Tether Scene Harness ===\n");

    let mut results = Vec::new();

    // 1. Bundled content and config
    let intake = match parse_items(CONTENT_JSON) {
        Ok(intake) => intake,
        Err(e) => {
            println!("  ✗ content_parse: {e}");
            std::process::exit(1);
        }
    };
    results.extend(validate_content(&intake));
    let config = match SceneConfig::from_json(CONFIG_JSON) {
        Ok(config) => {
            results.push(check("config_parse", true, "scene_config.json is valid"));
            config
        }
        Err(e) => {
            results.push(check("config_parse", false, format!("{e}")));
            SceneConfig::default()
        }
    };

    // 2. Placement sweep
    results.extend(validate_placement(&config));

    // 3. Wind sweep
    results.extend(validate_wind(&config));

    // 4. Wander sweep
    results.extend(validate_wander(&config, verbose));

    // 5. Paging walk on the engine
    results.extend(validate_paging(&config, &intake));

    // 6. Ten-minute scene run
    results.extend(validate_scene_run(&config, &intake, verbose));

    // 7. Clicks and navigation
    results.extend(validate_navigation(&config, &intake));

    // 8. Teardown leak check
    results.extend(validate_teardown(&config, &intake));

    // 9. Camera limits
    results.extend(validate_camera(&config));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    if json {
        match serde_json::to_string_pretty(&results) {
            Ok(text) => println!("{text}"),
            Err(e) => log::error!("Could not serialize results: {e}"),
        }
    } else {
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Content ──────────────────────────────────────────────────────────

fn validate_content(intake: &ContentIntake) -> Vec<TestResult> {
    println!("--- Content ---");
    let mut results = Vec::new();

    results.push(check(
        "content_accepted",
        intake.accepted.len() == 12,
        format!("{} items accepted", intake.accepted.len()),
    ));

    let missing = intake
        .rejected
        .iter()
        .filter(|e| matches!(e, DataError::MissingId { .. }))
        .count();
    let duplicate = intake
        .rejected
        .iter()
        .filter(|e| matches!(e, DataError::DuplicateId { .. }))
        .count();
    results.push(check(
        "content_rejected",
        missing == 1 && duplicate == 1,
        format!("{missing} without id, {duplicate} duplicate"),
    ));

    let first_wins = intake
        .accepted
        .iter()
        .find(|i| i.id == "on-tethers")
        .is_some_and(|i| i.title == "On tethers");
    results.push(check(
        "content_first_duplicate_wins",
        first_wins,
        "earliest record keeps the id",
    ));

    results
}

// ── 2. Placement ────────────────────────────────────────────────────────

fn validate_placement(config: &SceneConfig) -> Vec<TestResult> {
    println!("--- Placement ---");
    let mut results = Vec::new();
    let bounds = &config.bounds;
    let suspension: &SuspensionConfig = &config.suspension;

    let mut out_of_range = 0;
    let mut outside = 0;
    let mut unstable = 0;
    let n = 5_000;
    for i in 0..n {
        let id = format!("sweep-{i}");
        let total = 1 + i % 9;
        let p = SuspensionParams::derive(&id, i % total, total, bounds, suspension);
        if !(suspension.tether_min..=suspension.tether_max).contains(&p.tether_length)
            || !(suspension.sensitivity_min..=suspension.sensitivity_max)
                .contains(&p.wind_sensitivity)
        {
            out_of_range += 1;
        }
        if p.anchor.x.abs() > bounds.bound_x() || p.anchor.z.abs() > bounds.bound_z() {
            outside += 1;
        }
        if SuspensionParams::derive(&id, i % total, total, bounds, suspension) != p {
            unstable += 1;
        }
    }

    results.push(check(
        "placement_ranges",
        out_of_range == 0,
        format!("{out_of_range}/{n} ids outside tether/sensitivity range"),
    ));
    results.push(check(
        "placement_inside_margins",
        outside == 0,
        format!("{outside}/{n} anchors outside the margins"),
    ));
    results.push(check(
        "placement_deterministic",
        unstable == 0,
        format!("{unstable}/{n} ids derived differently twice"),
    ));

    let single = SuspensionParams::derive("alone", 0, 1, bounds, suspension);
    results.push(check(
        "placement_single_centred",
        single.slot_x == 0.0 && single.horizontal_offset == 0.0,
        format!("x = {}", single.horizontal_offset),
    ));

    results
}

// ── 3. Wind ─────────────────────────────────────────────────────────────

fn validate_wind(config: &SceneConfig) -> Vec<TestResult> {
    println!("--- Wind ---");
    let wind_config = config.wind;
    let mut wind = WindField::new(wind_config);
    let mut peak = Vec3::ZERO;
    let mut violations = 0;

    for _ in 0..TEN_MINUTES {
        let f = wind.tick(DT).force;
        peak = Vec3::new(peak.x.max(f.x.abs()), peak.y.max(f.y.abs()), peak.z.max(f.z.abs()));
        if f.x.abs() > wind_config.max_force
            || f.z.abs() > wind_config.max_force
            || f.y.abs() > wind_config.max_force * wind_config.vertical_ratio
        {
            violations += 1;
        }
    }

    vec![
        check(
            "wind_bounded",
            violations == 0,
            format!("peak ({:.4}, {:.4}, {:.4})", peak.x, peak.y, peak.z),
        ),
        check(
            "wind_vertical_weaker",
            peak.y < peak.x && peak.y < peak.z,
            format!("|y| peak {:.4}", peak.y),
        ),
    ]
}

// ── 4. Wander ───────────────────────────────────────────────────────────

fn validate_wander(config: &SceneConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Wander ---");
    let mut results = Vec::new();
    let bounds: SceneBounds = config.bounds;
    let wander: WanderConfig = config.wander;

    let mut escaped = 0;
    let mut bad_angles = 0;
    let mut overrides = 0;
    for seed in 0..8u32 {
        let mut agent = WanderingAgent::new(seed, 0.0, 0.0, seed as f32);
        for _ in 0..TEN_MINUTES / 10 {
            let tick = agent.step(&wander, &bounds, DT);
            if !bounds.contains(agent.state.x, agent.state.z) {
                escaped += 1;
            }
            let h = agent.state.current_heading;
            if !(h > -PI && h <= PI) || tick.alignment < 0.0 {
                bad_angles += 1;
            }
            if tick.boundary_override {
                overrides += 1;
            }
        }
        if verbose {
            println!(
                "    agent {seed}: ({:.2}, {:.2}) heading {:.2}",
                agent.state.x, agent.state.z, agent.state.current_heading
            );
        }
    }
    results.push(check(
        "wander_bounded",
        escaped == 0,
        format!("{escaped} ticks outside the floor"),
    ));
    results.push(check(
        "wander_angles_normalized",
        bad_angles == 0,
        format!("{bad_angles} bad headings, {overrides} edge overrides"),
    ));

    // Facing out of the +X edge must turn back inside.
    let mut edge = WanderingAgent::new(99, bounds.bound_x() - 0.1, 0.0, PI / 2.0);
    let mut overridden = false;
    for _ in 0..240 {
        overridden |= edge.step(&wander, &bounds, DT).boundary_override;
    }
    let (dx, _) = tether_logic::math::heading_direction(edge.state.current_heading);
    results.push(check(
        "wander_edge_turns_back",
        overridden && dx < 0.0,
        format!("heading {:.2} after 4 s", edge.state.current_heading),
    ));

    results
}

// ── 5. Paging ───────────────────────────────────────────────────────────

fn new_engine(config: &SceneConfig, intake: &ContentIntake) -> Option<SceneEngine> {
    match SceneEngine::with_default_physics(config.clone(), intake.accepted.clone()) {
        Ok(engine) => Some(engine),
        Err(e) => {
            log::error!("Engine refused config: {e}");
            None
        }
    }
}

fn validate_paging(config: &SceneConfig, intake: &ContentIntake) -> Vec<TestResult> {
    println!("--- Paging ---");
    let mut results = Vec::new();
    let Some(mut engine) = new_engine(config, intake) else {
        return vec![check("paging_engine", false, "engine failed to start")];
    };

    let window = PageWindow::new(intake.accepted.len(), config.page_size);
    results.push(check(
        "paging_sizes",
        window.page_sizes() == [5, 5, 2],
        format!("{:?}", window.page_sizes()),
    ));

    let sides = |e: &SceneEngine| -> Vec<PortalSide> {
        e.portals().into_iter().map(|p| p.side).collect()
    };
    let first_ids = engine.page_item_ids();
    let first_params: Vec<_> = first_ids.iter().filter_map(|id| engine.params_of(id)).collect();

    let mut visibility_ok = sides(&engine) == [PortalSide::Next];
    let mut walked = vec![engine.hung_count()];
    while engine.next_page().is_some() {
        walked.push(engine.hung_count());
        let expected: &[PortalSide] = if engine.window().has_next() {
            &[PortalSide::Prev, PortalSide::Next]
        } else {
            &[PortalSide::Prev]
        };
        visibility_ok &= sides(&engine) == expected;
        for _ in 0..30 {
            engine.update(DT);
        }
    }
    results.push(check(
        "paging_walk",
        walked == [5, 5, 2],
        format!("hung per page {walked:?}"),
    ));
    results.push(check(
        "paging_portal_visibility",
        visibility_ok,
        "prev only after page 0, next only before the last",
    ));

    while engine.prev_page().is_some() {}
    let again: Vec<_> = engine
        .page_item_ids()
        .iter()
        .filter_map(|id| engine.params_of(id))
        .collect();
    results.push(check(
        "paging_round_trip_identical",
        engine.page_item_ids() == first_ids && again == first_params,
        "page 0 rebuilt with the same placements",
    ));

    results
}

// ── 6. Scene run ────────────────────────────────────────────────────────

fn validate_scene_run(
    config: &SceneConfig,
    intake: &ContentIntake,
    verbose: bool,
) -> Vec<TestResult> {
    println!("--- Scene run (10 min) ---");
    let Some(mut engine) = new_engine(config, intake) else {
        return vec![check("scene_engine", false, "engine failed to start")];
    };

    let mut under_driven = 0;
    let mut worst_stretch = 0.0f32;
    let mut non_finite = 0;
    let mut last = FrameReport::default();
    for frame in 0..TEN_MINUTES {
        last = engine.update(DT);
        if last.bodies_driven != engine.hung_count() {
            under_driven += 1;
        }
        if frame % 60 == 0 {
            for body in engine.snapshot().bodies {
                if !body.position.is_finite() {
                    non_finite += 1;
                    continue;
                }
                if let Some(params) = engine.params_of(&body.item_id) {
                    let stretch =
                        (body.position.distance(&body.anchor) - params.tether_length).abs();
                    worst_stretch = worst_stretch.max(stretch);
                }
            }
        }
    }

    if verbose {
        match serde_json::to_string(&last) {
            Ok(text) => println!("    last frame: {text}"),
            Err(e) => log::warn!("Could not serialize frame report: {e}"),
        }
    }

    vec![
        check(
            "scene_every_body_driven",
            under_driven == 0,
            format!("{under_driven} frames skipped a body"),
        ),
        check(
            "scene_tethers_hold",
            worst_stretch < 0.05,
            format!("worst stretch {worst_stretch:.4}"),
        ),
        check(
            "scene_finite",
            non_finite == 0,
            format!("{non_finite} non-finite transforms"),
        ),
    ]
}

// ── 7. Navigation ───────────────────────────────────────────────────────

fn validate_navigation(config: &SceneConfig, intake: &ContentIntake) -> Vec<TestResult> {
    println!("--- Navigation ---");
    let Some(mut engine) = new_engine(config, intake) else {
        return vec![check("navigation_engine", false, "engine failed to start")];
    };

    let Some(target) = engine.snapshot().find_body("hello-world").map(|b| b.position) else {
        return vec![check("navigation_pick", false, "hello-world not on page 0")];
    };
    let eye = Vec3::new(target.x, target.y, target.z + 10.0);
    let picked = engine.pick_item(eye, Vec3::new(0.0, 0.0, -1.0));
    let clicked = picked.as_deref().is_some_and(|id| engine.click(id));
    let off_page = engine.click("last-light");

    let mut opened: Vec<String> = Vec::new();
    engine.dispatch_navigation(&mut opened);
    engine.click("hello-world");
    let logged = engine.dispatch_navigation(&mut LogNavigator);

    vec![
        check(
            "navigation_pick",
            picked.as_deref() == Some("hello-world"),
            format!("picked {picked:?}"),
        ),
        check(
            "navigation_click_queues",
            clicked && !off_page && opened == ["hello-world"] && logged == 1,
            format!("opened {opened:?}"),
        ),
    ]
}

// ── 8. Teardown ─────────────────────────────────────────────────────────

fn validate_teardown(config: &SceneConfig, intake: &ContentIntake) -> Vec<TestResult> {
    println!("--- Teardown ---");
    let Some(mut engine) = new_engine(config, intake) else {
        return vec![check("teardown_engine", false, "engine failed to start")];
    };

    let agents = engine.agent_count();
    let mut steady = true;
    for _ in 0..50 {
        while engine.next_page().is_some() {
            engine.update(DT);
        }
        while engine.prev_page().is_some() {
            engine.update(DT);
        }
        steady &= engine.physics().body_count() == engine.hung_count() * 2 + agents;
        steady &= engine.physics().constraint_count() == engine.hung_count();
    }
    engine.teardown();
    let bodies = engine.physics().body_count();
    let constraints = engine.physics().constraint_count();

    vec![
        check(
            "teardown_paging_steady",
            steady,
            "body and tether counts stable across 50 page cycles",
        ),
        check(
            "teardown_releases_everything",
            bodies == 0 && constraints == 0,
            format!("{bodies} bodies, {constraints} constraints left"),
        ),
    ]
}

// ── 9. Camera ───────────────────────────────────────────────────────────

fn validate_camera(config: &SceneConfig) -> Vec<TestResult> {
    println!("--- Camera ---");
    let c = config.camera;
    let mut rig = CameraRig::new(c);
    let mut violations = 0;
    for i in 0..1_000 {
        let t = i as f32 * 0.37;
        rig.zoom_by(1.0 + t.sin() * 0.5);
        rig.orbit(t.cos() * 0.4, (t * 1.3).sin() * 0.4);
        if !(c.min_zoom..=c.max_zoom).contains(&rig.zoom())
            || !(c.min_polar..=c.max_polar).contains(&rig.polar())
            || !(c.min_azimuth..=c.max_azimuth).contains(&rig.azimuth())
        {
            violations += 1;
        }
    }
    vec![check(
        "camera_clamped",
        violations == 0,
        format!("{violations} out-of-range states"),
    )]
}
