use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::Rc;

use glam::{Quat, Vec3};

use crate::engine::config::{AppConfig, Variant};
use crate::engine::graphics::{HeadlessSurface, SurfaceStats};
use crate::engine::overlay::OverlayView;
use crate::engine::state::ArState;
use crate::engine::subscription::Topic;
use crate::engine::xr::{InputSource, Pose, SimulatedPlatform};
use crate::engine::{ArContext, EngineError, Lifecycle};

fn context(variant: Variant) -> (ArContext, Rc<RefCell<SurfaceStats>>) {
    let (surface, stats) = HeadlessSurface::new();
    let ctx = ArContext::new(AppConfig::for_variant(variant), Box::new(surface));
    (ctx, stats)
}

fn mounted(variant: Variant, platform: &mut SimulatedPlatform) -> (ArContext, Rc<RefCell<SurfaceStats>>) {
    let (mut ctx, stats) = context(variant);
    pollster::block_on(ctx.mount(platform)).unwrap();
    (ctx, stats)
}

fn started(variant: Variant, platform: &mut SimulatedPlatform) -> (ArContext, Rc<RefCell<SurfaceStats>>) {
    let (mut ctx, stats) = mounted(variant, platform);
    pollster::block_on(ctx.start_session(platform)).unwrap();
    assert!(ctx.state().is_active());
    (ctx, stats)
}

fn select_at(platform: &mut SimulatedPlatform, position: Vec3) {
    platform.push_select(InputSource::screen(Some(Pose::new(position, Quat::IDENTITY))));
}

#[test]
fn unsupported_platform_shows_banner_not_start_button() {
    let mut platform = SimulatedPlatform::new().with_ar_supported(false);
    let (ctx, _) = mounted(Variant::Cube, &mut platform);

    assert_eq!(*ctx.state(), ArState::Unsupported);
    let view = ctx.overlay_view();
    assert!(view.shows_unsupported_banner());
    assert!(!view.shows_start_button());
}

#[test]
fn missing_capability_query_is_unsupported() {
    let mut platform = SimulatedPlatform::new().without_capability_query();
    let (ctx, _) = mounted(Variant::Cube, &mut platform);
    assert_eq!(ctx.overlay_view(), OverlayView::UnsupportedBanner);
}

#[test]
fn rejected_capability_query_is_unsupported() {
    let mut platform = SimulatedPlatform::new().with_query_error("not allowed");
    let (ctx, _) = mounted(Variant::Cube, &mut platform);
    assert_eq!(*ctx.state(), ArState::Unsupported);
}

#[test]
fn capability_is_queried_once_per_mount() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, _) = mounted(Variant::Cube, &mut platform);
    pollster::block_on(ctx.mount(&mut platform)).unwrap();

    assert_eq!(platform.capability_queries, 1);
    assert_eq!(*ctx.state(), ArState::Inactive);
}

#[test]
fn pending_capability_check_ignores_selects_and_starts() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, stats) = context(Variant::Cube);
    assert_eq!(*ctx.state(), ArState::Probing);
    assert_eq!(ctx.overlay_view(), OverlayView::Hidden);

    select_at(&mut platform, Vec3::new(0.0, 0.0, -0.5));
    platform.push_frame(0.0);
    assert_eq!(ctx.pump(&mut platform).unwrap(), 0);
    assert!(pollster::block_on(ctx.start_session(&mut platform)).is_err());

    assert_eq!(*ctx.state(), ArState::Probing);
    assert_eq!(ctx.scene().meshes().count(), 0);
    assert_eq!(platform.session_requests, 0);
    assert_eq!(stats.borrow().presents, 0);
}

#[test]
fn start_before_mount_is_an_error() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, _) = context(Variant::Cube);
    assert_eq!(ctx.lifecycle(), Lifecycle::Created);
    assert!(matches!(
        pollster::block_on(ctx.start_session(&mut platform)),
        Err(EngineError::NotMounted)
    ));
}

#[test]
fn session_start_hides_start_button_and_end_clears_placement() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, _) = mounted(Variant::Cube, &mut platform);
    assert!(ctx.overlay_view().shows_start_button());

    pollster::block_on(ctx.start_session(&mut platform)).unwrap();
    assert!(ctx.state().is_active());
    assert_eq!(ctx.overlay_view(), OverlayView::TapToPlaceHint);
    assert!(ctx.renderer().xr.is_presenting());

    select_at(&mut platform, Vec3::new(0.0, 0.0, -0.5));
    ctx.pump(&mut platform).unwrap();
    assert!(ctx.state().is_placed());
    assert_eq!(ctx.overlay_view(), OverlayView::Hidden);

    platform.simulate_session_end();
    ctx.pump(&mut platform).unwrap();

    assert_eq!(*ctx.state(), ArState::Inactive);
    assert!(!ctx.state().is_placed());
    assert!(ctx.overlay_view().shows_start_button());
    assert_eq!(ctx.scene().meshes().count(), 0);
    assert!(!ctx.renderer().xr.is_presenting());
    assert!(!ctx.subscriptions().is_subscribed(Topic::Select));
}

#[test]
fn user_end_goes_through_platform_confirmation() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, _) = started(Variant::Cube, &mut platform);

    ctx.end_session(&mut platform).unwrap();
    assert!(ctx.state().is_active());

    ctx.pump(&mut platform).unwrap();
    assert_eq!(*ctx.state(), ArState::Inactive);
    assert_eq!(platform.end_requests, 1);
}

#[test]
fn failed_session_request_stays_inactive_and_can_retry() {
    let mut platform = SimulatedPlatform::new().rejecting_sessions();
    let (mut ctx, _) = mounted(Variant::Cube, &mut platform);

    pollster::block_on(ctx.start_session(&mut platform)).unwrap();
    assert_eq!(*ctx.state(), ArState::Inactive);
    assert!(ctx.overlay_view().shows_start_button());
    assert!(!ctx.renderer().xr.enabled);

    platform.set_reject_sessions(false);
    pollster::block_on(ctx.start_session(&mut platform)).unwrap();
    assert!(ctx.state().is_active());
    assert_eq!(platform.session_requests, 2);
}

#[test]
fn hit_test_variant_without_platform_support_fails_to_start() {
    let mut platform = SimulatedPlatform::new().with_features([
        crate::engine::xr::Feature::Local,
        crate::engine::xr::Feature::DomOverlay,
    ]);
    let (mut ctx, _) = mounted(Variant::HitTest, &mut platform);

    pollster::block_on(ctx.start_session(&mut platform)).unwrap();
    assert_eq!(*ctx.state(), ArState::Inactive);
}

#[test]
fn partial_session_init_override_still_places_by_hit_test() {
    let config = AppConfig::from_json(
        r#"{ "session_init": { "required_features": [], "optional_features": ["dom-overlay"] } }"#,
        Some(Variant::HitTest),
    )
    .unwrap();
    let (surface, _) = HeadlessSurface::new();
    let mut ctx = ArContext::new(config, Box::new(surface));
    let mut platform = SimulatedPlatform::new();
    pollster::block_on(ctx.mount(&mut platform)).unwrap();
    pollster::block_on(ctx.start_session(&mut platform)).unwrap();
    assert!(ctx.state().is_active());

    let ray = platform.pointer_pose(Vec3::ZERO, Vec3::new(0.0, -1.0, -1.0));
    platform.push_select(InputSource::screen(ray));
    ctx.pump(&mut platform).unwrap();

    assert!(ctx.state().is_placed());
}

#[test]
fn many_selects_place_exactly_once() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, _) = started(Variant::Cube, &mut platform);
    let additions_before = ctx.scene().additions();

    // First select has no pose and is ignored; the second places.
    platform.push_select(InputSource::screen(None));
    select_at(&mut platform, Vec3::new(0.2, 0.0, -0.4));
    for i in 0..8 {
        select_at(&mut platform, Vec3::new(i as f32, 5.0, 5.0));
    }
    ctx.pump(&mut platform).unwrap();

    assert_eq!(ctx.scene().additions() - additions_before, 1);
    let node = ctx.state().placed_node().unwrap();
    assert_eq!(
        ctx.scene().get(node).unwrap().transform.position,
        Vec3::new(0.2, 0.0, -0.4)
    );
}

#[test]
fn each_session_places_its_own_object() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, _) = started(Variant::Tetra, &mut platform);

    select_at(&mut platform, Vec3::new(0.0, 0.0, -0.3));
    ctx.pump(&mut platform).unwrap();
    platform.simulate_session_end();
    ctx.pump(&mut platform).unwrap();

    pollster::block_on(ctx.start_session(&mut platform)).unwrap();
    assert!(ctx.state().can_place());
    select_at(&mut platform, Vec3::new(1.0, 0.0, -0.3));
    ctx.pump(&mut platform).unwrap();

    assert_eq!(ctx.scene().meshes().count(), 1);
    let node = ctx.state().placed_node().unwrap();
    assert_eq!(ctx.scene().get(node).unwrap().transform.position.x, 1.0);
}

#[test]
fn selects_outside_a_session_are_dropped() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, _) = mounted(Variant::Cube, &mut platform);

    select_at(&mut platform, Vec3::ZERO);
    assert_eq!(ctx.pump(&mut platform).unwrap(), 0);
    assert_eq!(ctx.scene().meshes().count(), 0);
}

#[test]
fn rotation_is_static_until_placed_then_grows() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, stats) = started(Variant::Cube, &mut platform);

    for t in 0..3 {
        platform.push_frame(t as f64 * 16.0);
    }
    ctx.pump(&mut platform).unwrap();
    assert_eq!(stats.borrow().presents, 3);
    assert_eq!(stats.borrow().last_frame.as_ref().unwrap().items.len(), 0);

    select_at(&mut platform, Vec3::new(0.0, 0.0, -0.5));
    ctx.pump(&mut platform).unwrap();
    let node = ctx.state().placed_node().unwrap();
    assert_eq!(ctx.scene().get(node).unwrap().transform.rotation, Vec3::ZERO);

    let mut previous = 0.0;
    for t in 3..10 {
        platform.push_frame(t as f64 * 16.0);
        ctx.pump(&mut platform).unwrap();
        let r = ctx.scene().get(node).unwrap().transform.rotation;
        assert!(r.x > previous && r.x < TAU);
        assert_eq!(r.x, r.y);
        previous = r.x;
    }
    assert_eq!(stats.borrow().presents, 10);
    assert_eq!(stats.borrow().last_frame.as_ref().unwrap().items.len(), 1);
}

#[test]
fn one_draw_per_frame_even_without_session() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, stats) = mounted(Variant::Cube, &mut platform);

    platform.push_frame(0.0);
    platform.push_frame(16.0);
    ctx.pump(&mut platform).unwrap();

    assert_eq!(stats.borrow().presents, 2);
    assert_eq!(ctx.renderer().frames_drawn(), 2);
}

#[test]
fn teardown_stops_drawing_and_releases_surface() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, stats) = started(Variant::Cube, &mut platform);
    platform.push_frame(0.0);
    ctx.pump(&mut platform).unwrap();
    let presents = stats.borrow().presents;

    ctx.unmount(&mut platform);

    assert_eq!(ctx.lifecycle(), Lifecycle::Disposed);
    assert!(stats.borrow().released);
    assert!(ctx.renderer().is_disposed());
    assert!(ctx.subscriptions().is_empty());
    assert!(platform.active_session().is_none());
    assert_eq!(*ctx.state(), ArState::Inactive);

    platform.push_frame(32.0);
    assert!(matches!(ctx.pump(&mut platform), Err(EngineError::Disposed)));
    assert!(matches!(ctx.resize(10, 10), Err(EngineError::Disposed)));
    assert_eq!(stats.borrow().presents, presents);

    // Idempotent.
    ctx.unmount(&mut platform);
    assert_eq!(platform.end_requests, 1);
}

#[test]
fn resize_only_touches_camera_and_surface() {
    let mut platform = SimulatedPlatform::new();
    let (mut ctx, stats) = started(Variant::Cube, &mut platform);
    select_at(&mut platform, Vec3::new(0.0, 0.0, -0.5));
    ctx.pump(&mut platform).unwrap();
    let state_before = *ctx.state();

    ctx.resize(1200, 600).unwrap();

    assert!((ctx.camera().aspect - 2.0).abs() < 1e-6);
    assert_eq!(ctx.renderer().size(), (1200, 600));
    assert_eq!((stats.borrow().width, stats.borrow().height), (1200, 600));
    assert_eq!(*ctx.state(), state_before);

    // Degenerate sizes are ignored.
    ctx.resize(0, 600).unwrap();
    assert_eq!(ctx.renderer().size(), (1200, 600));
}
