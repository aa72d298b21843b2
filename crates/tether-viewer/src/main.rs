//! Tether Viewer - Bevy-based view of the suspended-content scene
//!
//! Controls:
//!   scroll            zoom (clamped)
//!   right drag        orbit (clamped)
//!   left click        open a hanging item, or step through a portal
//!   PageUp/PageDown   previous/next page (also ←/→)
//!   + / - / 0         simulation speed, pause
//!   [ / ]             wind time scale
//!
//! Usage:
//!   cargo run -p tether-viewer
//!   cargo run -p tether-viewer -- --content posts.json --config scene.json

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use tether_core::engine::{SceneEngine, PORTAL_PICK_RADIUS};
use tether_core::navigation::Navigator;
use tether_core::render::{AgentView, BodyView, RenderSink};
use tether_logic::camera::CameraRig;
use tether_logic::config::SceneConfig;
use tether_logic::content::{parse_items, ContentItem};
use tether_logic::math::Vec3 as SimVec3;
use tether_logic::pagination::{Portal, PortalSide};

const DEFAULT_CONTENT: &str = include_str!("../../../data/sample_content.json");
const DEFAULT_CONFIG: &str = include_str!("../../../data/scene_config.json");

fn main() {
    let (config, items) = load_inputs();
    let engine = match SceneEngine::with_default_physics(config.clone(), items) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Invalid scene config: {e}");
            std::process::exit(1);
        }
    };

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Tether".to_string(),
                resolution: (1280.0, 720.0).into(),
                present_mode: bevy::window::PresentMode::AutoVsync,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(SceneWrapper(engine))
        .insert_resource(RigState(CameraRig::new(config.camera)))
        .insert_resource(ViewerNavigator::default())
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                update_scene,
                page_controls,
                camera_controls,
                handle_click,
                render_room,
                render_scene,
                update_text_ui,
            ),
        )
        .run();
}

/// Content and config from `--content`/`--config` paths, or the bundled
/// samples.
fn load_inputs() -> (SceneConfig, Vec<ContentItem>) {
    let args: Vec<String> = std::env::args().collect();
    let arg = |flag: &str| {
        args.iter()
            .position(|a| a == flag)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };
    let read = |path: Option<String>, fallback: &str| match path {
        Some(path) => std::fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("Failed to read {path}: {e}; using bundled sample");
            fallback.to_string()
        }),
        None => fallback.to_string(),
    };

    let config_text = read(arg("--config"), DEFAULT_CONFIG);
    let config = SceneConfig::from_json(&config_text).unwrap_or_else(|e| {
        eprintln!("Invalid scene config: {e}; using defaults");
        SceneConfig::default()
    });

    let content_text = read(arg("--content"), DEFAULT_CONTENT);
    let items = match parse_items(&content_text) {
        Ok(intake) => intake.accepted,
        Err(e) => {
            eprintln!("Failed to parse content: {e}");
            Vec::new()
        }
    };
    (config, items)
}

#[derive(Resource)]
struct SceneWrapper(SceneEngine);

#[derive(Resource)]
struct RigState(CameraRig);

/// Stands in for a browser: remembers and logs what was opened.
#[derive(Resource, Default)]
struct ViewerNavigator {
    opened: Vec<String>,
}

impl Navigator for ViewerNavigator {
    fn navigate(&mut self, item_id: &str) {
        info!("Open item {item_id}");
        self.opened.push(item_id.to_string());
    }
}

// Marker component for text UI elements
#[derive(Component)]
struct StatusText;

fn to_bevy(v: SimVec3) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn to_sim(v: Vec3) -> SimVec3 {
    SimVec3::new(v.x, v.y, v.z)
}

fn rig_transform(rig: &CameraRig) -> Transform {
    Transform::from_translation(to_bevy(rig.eye_position()))
        .looking_at(to_bevy(rig.target()), Vec3::Y)
}

fn setup(mut commands: Commands, sim: Res<SceneWrapper>, rig: Res<RigState>) {
    commands.spawn((Camera3d::default(), rig_transform(&rig.0)));

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            ..default()
        },
        Transform::from_xyz(4.0, 10.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 16.0,
            ..default()
        },
        TextColor(Color::srgba(0.85, 0.85, 0.85, 0.9)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(12.0),
            ..default()
        },
        StatusText,
    ));

    info!(
        "Scene with {} items over {} pages",
        sim.0.items().len(),
        sim.0.window().total_pages()
    );
}

fn update_scene(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut sim: ResMut<SceneWrapper>,
) {
    // Time scale controls: +/= to speed up, - to slow down, 0 to pause/resume
    if keyboard.just_pressed(KeyCode::Equal) || keyboard.just_pressed(KeyCode::NumpadAdd) {
        let current = sim.0.time_scale();
        sim.0.set_time_scale(faster(current));
    }
    if keyboard.just_pressed(KeyCode::Minus) || keyboard.just_pressed(KeyCode::NumpadSubtract) {
        let current = sim.0.time_scale();
        sim.0.set_time_scale((current / 2.0).max(0.125));
    }
    if keyboard.just_pressed(KeyCode::Digit0) || keyboard.just_pressed(KeyCode::Numpad0) {
        let current = sim.0.time_scale();
        sim.0.set_time_scale(if current > 0.0 { 0.0 } else { 1.0 });
    }

    // Wind evolves on its own clock
    if keyboard.just_pressed(KeyCode::BracketRight) {
        let current = sim.0.wind_time_scale();
        sim.0.set_wind_time_scale((current * 1.5).min(5.0));
    }
    if keyboard.just_pressed(KeyCode::BracketLeft) {
        let current = sim.0.wind_time_scale();
        sim.0.set_wind_time_scale(current / 1.5);
    }

    sim.0.update(time.delta_secs());
}

/// Next speed up from `current`. Speeding up a paused scene resumes it.
fn faster(current: f32) -> f32 {
    if current <= 0.0 {
        1.0
    } else {
        (current * 2.0).min(8.0)
    }
}

fn page_controls(keyboard: Res<ButtonInput<KeyCode>>, mut sim: ResMut<SceneWrapper>) {
    let side = if keyboard.just_pressed(KeyCode::PageDown)
        || keyboard.just_pressed(KeyCode::ArrowRight)
    {
        PortalSide::Next
    } else if keyboard.just_pressed(KeyCode::PageUp) || keyboard.just_pressed(KeyCode::ArrowLeft)
    {
        PortalSide::Prev
    } else {
        return;
    };
    if let Some(load) = sim.0.activate_portal(side) {
        info!("Page {}/{}", load.page + 1, load.total_pages);
    }
}

fn camera_controls(
    mut rig: ResMut<RigState>,
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut scroll_events: EventReader<MouseWheel>,
    mut motion_events: EventReader<MouseMotion>,
) {
    let orbit_speed = 0.005;
    let zoom_speed = 0.1;

    if mouse_buttons.pressed(MouseButton::Right) || mouse_buttons.pressed(MouseButton::Middle) {
        for motion in motion_events.read() {
            rig.0
                .orbit(-motion.delta.x * orbit_speed, -motion.delta.y * orbit_speed);
        }
    } else {
        motion_events.clear();
    }

    for scroll in scroll_events.read() {
        rig.0.zoom_by(1.0 - scroll.y * zoom_speed);
    }

    if let Ok(mut transform) = camera_query.get_single_mut() {
        *transform = rig_transform(&rig.0);
    }
}

fn handle_click(
    mut sim: ResMut<SceneWrapper>,
    mut navigator: ResMut<ViewerNavigator>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mouse: Res<ButtonInput<MouseButton>>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }

    let Ok(window) = window_query.get_single() else {
        return;
    };
    let Some(cursor_pos) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera_query.get_single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, cursor_pos) else {
        return;
    };

    let origin = to_sim(ray.origin);
    let direction = to_sim(*ray.direction);

    // Portals sit in front of the bodies at the edges; check them first.
    if let Some(side) = sim.0.pick_portal(origin, direction) {
        sim.0.activate_portal(side);
        return;
    }
    if let Some(id) = sim.0.pick_item(origin, direction) {
        sim.0.click(&id);
    }
    sim.0.dispatch_navigation(&mut *navigator);
}

fn render_room(sim: Res<SceneWrapper>, mut gizmos: Gizmos) {
    let bounds = sim.0.config().bounds;
    let hx = bounds.floor_width / 2.0;
    let hz = bounds.floor_depth / 2.0;
    let floor_color = Color::srgba(0.35, 0.35, 0.45, 0.6);
    let margin_color = Color::srgba(0.35, 0.35, 0.45, 0.25);

    for (y, color) in [(bounds.floor_y, floor_color), (bounds.ceiling_y, margin_color)] {
        let corners = [
            Vec3::new(-hx, y, -hz),
            Vec3::new(hx, y, -hz),
            Vec3::new(hx, y, hz),
            Vec3::new(-hx, y, hz),
        ];
        for i in 0..4 {
            gizmos.line(corners[i], corners[(i + 1) % 4], color);
        }
    }

    // Walkable area inside the margins
    let bx = bounds.bound_x();
    let bz = bounds.bound_z();
    gizmos.rect(
        Isometry3d::new(
            Vec3::new(0.0, bounds.floor_y, 0.0),
            Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        ),
        Vec2::new(bx * 2.0, bz * 2.0),
        margin_color,
    );
}

/// Draws whatever the engine mirrors into it.
struct GizmoSink<'a, 'w, 's> {
    gizmos: &'a mut Gizmos<'w, 's>,
    body_radius: f32,
    agent_radius: f32,
}

impl RenderSink for GizmoSink<'_, '_, '_> {
    fn body(&mut self, body: &BodyView<'_>) {
        let position = to_bevy(body.position);
        let anchor = to_bevy(body.anchor);
        let rotation = Quat::from_rotation_y(body.yaw);
        if body.hung {
            self.gizmos
                .line(anchor, position, Color::srgba(0.8, 0.8, 0.8, 0.5));
            self.gizmos.sphere(
                Isometry3d::new(position, rotation),
                self.body_radius,
                Color::srgb(0.95, 0.75, 0.35),
            );
        } else {
            self.gizmos.sphere(
                Isometry3d::new(position, rotation),
                self.body_radius,
                Color::srgba(0.6, 0.6, 0.6, 0.4),
            );
        }
        self.gizmos
            .sphere(Isometry3d::from_translation(anchor), 0.05, Color::WHITE);
    }

    fn agent(&mut self, agent: &AgentView) {
        let position = to_bevy(agent.position);
        let hue = (agent.seed % 360) as f32;
        let color = Color::hsl(hue, 0.6, 0.6);
        self.gizmos.sphere(
            Isometry3d::from_translation(position),
            self.agent_radius,
            color,
        );
        let (sin, cos) = agent.heading.sin_cos();
        let facing = Vec3::new(sin, 0.0, cos);
        self.gizmos
            .arrow(position, position + facing * (self.agent_radius * 2.0), color);
    }

    fn portal(&mut self, portal: &Portal) {
        let color = match portal.side {
            PortalSide::Prev => Color::srgb(0.4, 0.7, 1.0),
            PortalSide::Next => Color::srgb(0.5, 1.0, 0.6),
        };
        self.gizmos.circle(
            Isometry3d::from_translation(to_bevy(portal.position)),
            PORTAL_PICK_RADIUS,
            color,
        );
    }
}

fn render_scene(sim: Res<SceneWrapper>, mut gizmos: Gizmos) {
    let config = sim.0.config();
    let mut sink = GizmoSink {
        gizmos: &mut gizmos,
        body_radius: config.suspension.body.collider_radius,
        agent_radius: config.wander.collider_radius,
    };
    sim.0.mirror(&mut sink);
}

fn update_text_ui(
    sim: Res<SceneWrapper>,
    navigator: Res<ViewerNavigator>,
    mut text_query: Query<&mut Text, With<StatusText>>,
) {
    let Ok(mut text) = text_query.get_single_mut() else {
        return;
    };
    let window = sim.0.window();
    let page = if window.total_pages() == 0 {
        "No items".to_string()
    } else {
        format!("Page {}/{}", window.current_page() + 1, window.total_pages())
    };
    let wind = sim.0.last_wind().force;
    let last_opened = navigator
        .opened
        .last()
        .map(|id| format!(" | opened {id}"))
        .unwrap_or_default();
    **text = format!(
        "{page} | speed {:.2}x | wind {:.2}x ({:+.3}, {:+.3}){last_opened}",
        sim.0.time_scale(),
        sim.0.wind_time_scale(),
        wind.x,
        wind.z,
    );
}
