//! Integration tests for the pure scene pipeline.
//!
//! Exercises: JSON intake → PageWindow → SuspensionParams, plus wind and
//! wander behaviour over long horizons.
//!
//! Pure logic only: no physics backend and no rendering.

use tether_logic::bounds::SceneBounds;
use tether_logic::config::SceneConfig;
use tether_logic::content::parse_items;
use tether_logic::math::heading_direction;
use tether_logic::pagination::{portals, PageWindow, PortalSide};
use tether_logic::suspension::SuspensionParams;
use tether_logic::wander::{WanderConfig, WanderingAgent};
use tether_logic::wind::WindField;

// ── Helpers ────────────────────────────────────────────────────────────

fn sample_json(n: usize) -> String {
    let items: Vec<String> = (0..n)
        .map(|i| format!(r#"{{"id": "entry-{i}", "title": "Entry {i}"}}"#))
        .collect();
    format!("[{}]", items.join(","))
}

fn page_params(
    window: &PageWindow,
    ids: &[String],
    config: &SceneConfig,
) -> Vec<SuspensionParams> {
    let slice = window.slice(ids);
    slice
        .iter()
        .enumerate()
        .map(|(i, id)| {
            SuspensionParams::derive(id, i, slice.len(), &config.bounds, &config.suspension)
        })
        .collect()
}

// ── Pipeline ───────────────────────────────────────────────────────────

#[test]
fn twelve_items_split_five_five_two() {
    let intake = parse_items(&sample_json(12)).unwrap();
    let window = PageWindow::new(intake.accepted.len(), 5);
    assert_eq!(window.page_sizes(), [5, 5, 2]);
}

#[test]
fn placements_survive_a_page_round_trip() {
    let config = SceneConfig::default();
    let intake = parse_items(&sample_json(7)).unwrap();
    let ids: Vec<String> = intake.accepted.into_iter().map(|i| i.id).collect();
    let mut window = PageWindow::new(ids.len(), config.page_size);

    let before = page_params(&window, &ids, &config);
    window.next().unwrap();
    let second = page_params(&window, &ids, &config);
    assert_eq!(second.len(), 2);
    window.prev().unwrap();
    assert_eq!(page_params(&window, &ids, &config), before);
}

#[test]
fn anchors_stay_inside_margins() {
    let config = SceneConfig::default();
    let ids: Vec<String> = (0..400).map(|i| format!("anchor-{i}")).collect();
    let window = PageWindow::new(ids.len(), 9);
    for page in 0..window.total_pages() {
        let mut w = window;
        w.go_to(page);
        for p in page_params(&w, &ids, &config) {
            assert!(p.anchor.x.abs() <= config.bounds.bound_x());
            assert!(p.anchor.z.abs() <= config.bounds.bound_z());
            assert!(p.rest_position.y > config.bounds.floor_y);
        }
    }
}

#[test]
fn portals_follow_page_position() {
    let bounds = SceneBounds::default();
    let mut window = PageWindow::new(12, 5);
    let sides = |w: &PageWindow| -> Vec<PortalSide> {
        portals(w, &bounds, 0.0).into_iter().map(|p| p.side).collect()
    };
    assert_eq!(sides(&window), [PortalSide::Next]);
    window.next();
    assert_eq!(sides(&window), [PortalSide::Prev, PortalSide::Next]);
    window.next();
    assert_eq!(sides(&window), [PortalSide::Prev]);
}

// ── Wind ───────────────────────────────────────────────────────────────

#[test]
fn wind_is_bounded_and_continuous() {
    let config = SceneConfig::default().wind;
    let mut wind = WindField::new(config);
    let mut last = wind.tick(0.0).force;
    for _ in 0..20_000 {
        let f = wind.tick(1.0 / 60.0).force;
        assert!(f.x.abs() <= config.max_force);
        assert!(f.z.abs() <= config.max_force);
        assert!(f.y.abs() <= config.max_force * config.vertical_ratio);
        // coherent noise: no jumps between consecutive frames
        assert!((f - last).length() < config.max_force * 0.1);
        last = f;
    }
}

// ── Wander ─────────────────────────────────────────────────────────────

#[test]
fn agent_at_positive_x_edge_turns_back_inside() {
    let bounds = SceneBounds::default();
    let config = WanderConfig::default();
    // facing straight out of the +X edge
    let mut agent = WanderingAgent::new(11, bounds.bound_x() - 0.2, 0.0, std::f32::consts::FRAC_PI_2);

    let mut overridden = false;
    for _ in 0..180 {
        let tick = agent.step(&config, &bounds, 1.0 / 60.0);
        overridden |= tick.boundary_override;
        assert!(bounds.contains(agent.state.x, agent.state.z));
    }
    assert!(overridden);
    let (dx, _) = heading_direction(agent.state.current_heading);
    assert!(dx < 0.0, "still heading out: {}", agent.state.current_heading);
}

#[test]
fn agents_with_different_seeds_diverge() {
    let bounds = SceneBounds::default();
    let config = WanderConfig::default();
    let mut a = WanderingAgent::new(1, 0.0, 0.0, 0.0);
    let mut b = WanderingAgent::new(2, 0.0, 0.0, 0.0);
    for _ in 0..600 {
        a.step(&config, &bounds, 1.0 / 60.0);
        b.step(&config, &bounds, 1.0 / 60.0);
    }
    assert_ne!(a.state, b.state);
}
