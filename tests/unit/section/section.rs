use super::*;
use crate::animation::tree::NodeBuilder;
use crate::animation::variant::Transition;
use crate::animation::variant::VariantKey;
use crate::foundation::core::Rect;
use crate::visibility::sim::SimulatedHost;

fn ms(v: u64) -> Millis {
    Millis(v)
}

fn tree() -> AnimationNode {
    NodeBuilder::new("root")
        .transition(Transition::stagger(ms(200), ms(100)))
        .children((0..4).map(|i| AnimationNode::leaf(format!("item{i}"))))
        .build()
        .unwrap()
}

fn host() -> Rc<SimulatedHost> {
    Rc::new(SimulatedHost::new(Rect::new(0.0, 0.0, 100.0, 100.0)))
}

#[test]
fn offscreen_section_waits_for_intersection() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 300.0, 100.0, 400.0));
    let cfg = VisibilityConfig::retriggering(0.3).unwrap();
    let (mut s, update) = Section::mount("about", host.clone(), el, cfg, tree(), ms(0)).unwrap();
    assert!(update.is_empty());
    assert!(!s.is_visible());

    let update = s.on_intersection(0.2, ms(10));
    assert!(update.is_empty());

    let update = s.on_intersection(0.4, ms(20));
    assert_eq!(update.visibility, Some(true));
    assert_eq!(update.planned.len(), 5);
    assert!(update.fired.is_empty());

    let fired = s.tick(ms(120));
    assert_eq!(fired.len(), 2);
    assert_eq!(s.tick(ms(720)).len(), 3);
}

#[test]
fn onscreen_section_plans_on_mount() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 0.0, 100.0, 100.0));
    let cfg = VisibilityConfig::retriggering(0.3).unwrap();
    let (s, update) = Section::mount("hero", host.clone(), el, cfg, tree(), ms(0)).unwrap();
    assert_eq!(update.visibility, Some(true));
    assert_eq!(update.planned.len(), 5);
    assert_eq!(s.scheduler().epoch(), 1);
}

#[test]
fn zero_delay_commands_fire_in_the_same_update() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 0.0, 100.0, 100.0));
    let flat = NodeBuilder::new("root")
        .child(AnimationNode::leaf("a"))
        .build()
        .unwrap();
    let (_s, update) = Section::mount(
        "flat",
        host.clone(),
        el,
        VisibilityConfig::default(),
        flat,
        ms(0),
    )
    .unwrap();
    assert_eq!(update.fired.len(), 2);
}

#[test]
fn latched_section_never_reverses() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 300.0, 100.0, 400.0));
    let cfg = VisibilityConfig::latched(0.2).unwrap();
    let (mut s, _) = Section::mount("skills", host.clone(), el, cfg, tree(), ms(0)).unwrap();

    s.on_intersection(0.5, ms(0));
    assert_eq!(host.active_observations(), 0);
    let update = s.on_intersection(0.0, ms(50));
    assert!(update.is_empty());
    assert!(s.is_visible());
}

#[test]
fn retriggering_section_hides_then_replays() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 300.0, 100.0, 400.0));
    let cfg = VisibilityConfig::retriggering(0.2).unwrap();
    let (mut s, _) = Section::mount("projects", host.clone(), el, cfg, tree(), ms(0)).unwrap();

    s.on_intersection(0.5, ms(0));
    s.tick(ms(1000));
    let update = s.on_intersection(0.0, ms(1000));
    assert_eq!(update.visibility, Some(false));
    assert!(
        update
            .fired
            .iter()
            .all(|f| f.target == VariantKey::Hidden && f.at == ms(1000))
    );
    assert_eq!(update.fired.len(), 5);

    let update = s.on_intersection(0.5, ms(1010));
    assert_eq!(update.planned.len(), 5);
    assert_eq!(s.scheduler().epoch(), 2);
}

#[test]
fn unmount_releases_and_silences_everything() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 0.0, 100.0, 100.0));
    let cfg = VisibilityConfig::retriggering(0.3).unwrap();
    let (mut s, update) = Section::mount("contact", host.clone(), el, cfg, tree(), ms(0)).unwrap();
    assert!(update.fired.is_empty());
    assert_eq!(host.active_observations(), 1);

    s.unmount();
    s.unmount();
    assert!(!s.is_mounted());
    assert_eq!(host.active_observations(), 0);
    assert!(s.tick(ms(10_000)).is_empty());
    assert!(s.on_intersection(0.0, ms(10_000)).is_empty());
    assert!(s.rebind(el, ms(10_000)).is_empty());
}

#[test]
fn rebinding_to_a_new_element_swaps_observation() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 300.0, 100.0, 400.0));
    let cfg = VisibilityConfig::retriggering(0.3).unwrap();
    let (mut s, _) = Section::mount("about", host.clone(), el, cfg, tree(), ms(0)).unwrap();
    let first = s.observation_id();

    let replacement = host.mount(Rect::new(0.0, 0.0, 100.0, 100.0));
    let update = s.rebind(replacement, ms(5));
    assert_eq!(update.visibility, Some(true));
    assert_ne!(s.observation_id(), first);
    assert_eq!(host.active_observations(), 1);
}

#[test]
fn rebind_drops_commands_planned_for_previous_element() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 0.0, 100.0, 100.0));
    let cfg = VisibilityConfig::retriggering(0.3).unwrap();
    let (mut s, _) = Section::mount("about", host.clone(), el, cfg, tree(), ms(0)).unwrap();
    assert_eq!(s.scheduler().pending(), 5);

    let replacement = host.mount(Rect::new(0.0, 10.0, 100.0, 110.0));
    let update = s.rebind(replacement, ms(50));
    assert_eq!(update.visibility, None);
    assert_eq!(update.planned.len(), 5);
    assert_eq!(s.scheduler().pending(), 5);
    assert_eq!(s.scheduler().epoch(), 2);

    // The old root was due at 100; the new one at 150.
    assert!(s.tick(ms(149)).is_empty());
    let fired = s.tick(ms(150));
    assert_eq!(fired.len(), 2);
    assert!(fired.iter().all(|f| f.at == ms(150)));
    assert_eq!(s.tick(ms(1000)).len(), 3);
}

#[test]
fn rebind_to_offscreen_element_cancels_everything_pending() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 0.0, 100.0, 100.0));
    let cfg = VisibilityConfig::retriggering(0.3).unwrap();
    let (mut s, _) = Section::mount("about", host.clone(), el, cfg, tree(), ms(0)).unwrap();

    let offscreen = host.mount(Rect::new(0.0, 500.0, 100.0, 600.0));
    let update = s.rebind(offscreen, ms(50));
    assert_eq!(update.visibility, Some(false));
    assert!(update.planned.is_empty());
    assert_eq!(s.scheduler().pending(), 0);
    assert!(s.tick(ms(10_000)).is_empty());
    assert!(
        s.scheduler()
            .records()
            .all(|r| r.state == crate::schedule::scheduler::NodeState::Hidden)
    );
}

#[test]
fn rebind_hides_nodes_already_shown() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 0.0, 100.0, 100.0));
    let cfg = VisibilityConfig::retriggering(0.3).unwrap();
    let (mut s, _) = Section::mount("about", host.clone(), el, cfg, tree(), ms(0)).unwrap();
    assert_eq!(s.tick(ms(120)).len(), 2);

    let offscreen = host.mount(Rect::new(0.0, 500.0, 100.0, 600.0));
    let update = s.rebind(offscreen, ms(200));
    assert_eq!(update.fired.len(), 2);
    assert!(update.fired.iter().all(|f| f.target == VariantKey::Hidden));
    assert!(s.tick(ms(10_000)).is_empty());

    // Rebinding to the element already observed changes nothing.
    assert!(s.rebind(offscreen, ms(10_001)).is_empty());
}

#[test]
fn sections_are_independent() {
    let host = host();
    let a_el = host.mount(Rect::new(0.0, 0.0, 100.0, 100.0));
    let b_el = host.mount(Rect::new(0.0, 500.0, 100.0, 600.0));
    let cfg = VisibilityConfig::retriggering(0.3).unwrap();
    let (mut a, _) = Section::mount("a", host.clone(), a_el, cfg, tree(), ms(0)).unwrap();
    let (b, _) = Section::mount("b", host.clone(), b_el, cfg, tree(), ms(0)).unwrap();

    a.unmount();
    assert_eq!(host.active_observations(), 1);
    assert!(!b.is_visible());
    assert!(b.is_mounted());
    assert_eq!(b.scheduler().epoch(), 0);
}

#[test]
fn dynamic_child_added_through_section() {
    let host = host();
    let el = host.mount(Rect::new(0.0, 0.0, 100.0, 100.0));
    let cfg = VisibilityConfig::retriggering(0.3).unwrap();
    let (mut s, _) = Section::mount("projects", host.clone(), el, cfg, tree(), ms(0)).unwrap();
    s.tick(ms(2000));
    let update = s
        .insert_child(&NodeId::new("root"), AnimationNode::leaf("late"), ms(2000))
        .unwrap();
    assert_eq!(update.planned.len(), 1);
    assert_eq!(update.fired.len(), 1);
}
