use keyline_core::{
    Ease, EditorConfig, ObjectId, PlaybackEvent, PlaybackState, Property, SceneId, Timeline, Value, WorkArea,
    WorkAreaHandle,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn check(wa: &WorkArea, duration: f32) {
    assert!(wa.in_point() >= 0.0, "{wa:?}");
    assert!(wa.in_point() < wa.out_point(), "{wa:?}");
    assert!(wa.out_point() <= duration, "{wa:?}");
}

#[test]
fn work_area_bounds_hold_for_any_drag_sequence() {
    let duration = 8.0;
    let mut wa = WorkArea::new(duration, 0.1);
    let mut seed: u64 = 42;
    for _ in 0..5000 {
        seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
        let r = (seed >> 33) as f32 / (1u64 << 31) as f32;
        let v = r * 24.0 - 8.0;
        let handle = match seed % 3 {
            0 => WorkAreaHandle::In,
            1 => WorkAreaHandle::Out,
            _ => WorkAreaHandle::Region,
        };
        wa.drag(handle, v, duration);
        check(&wa, duration);
    }
}

#[test]
fn region_drag_preserves_width_against_the_edges() {
    let mut wa = WorkArea::new(10.0, 0.1);
    wa.set_in(2.0, 10.0);
    wa.set_out(5.0, 10.0);
    wa.translate(100.0, 10.0);
    approx(wa.in_point(), 7.0, 1e-5);
    approx(wa.out_point(), 10.0, 1e-5);
    wa.translate(-100.0, 10.0);
    approx(wa.in_point(), 0.0, 1e-5);
    approx(wa.out_point(), 3.0, 1e-5);
}

#[test]
fn shrinking_the_duration_refits_the_work_area() {
    let mut tl = Timeline::in_memory(EditorConfig::default());
    tl.drag_work_area(WorkAreaHandle::In, 6.0);
    tl.drag_work_area(WorkAreaHandle::Out, 9.0);
    tl.set_duration(4.0).unwrap();
    check(tl.work_area(), 4.0);
    assert!(tl.set_duration(0.0).is_err());
}

#[test]
fn looping_playback_stays_inside_the_enabled_work_area() {
    let mut tl = Timeline::in_memory(EditorConfig::default());
    let obj = ObjectId::new("dot");
    tl.set_active_object(obj.clone(), None);
    tl.record_keyframe(&obj, None, Property::PositionX, Value::Number(0.0))
        .unwrap();
    tl.seek(10.0).unwrap();
    tl.record_keyframe(&obj, None, Property::PositionX, Value::Number(100.0))
        .unwrap();
    tl.set_looping(true).unwrap();
    tl.drag_work_area(WorkAreaHandle::In, 2.0);
    tl.drag_work_area(WorkAreaHandle::Out, 4.0);
    tl.set_work_area_enabled(true);

    tl.play();
    approx(tl.clock().time(), 2.0, 1e-6);
    for _ in 0..120 {
        tl.tick(1.0 / 30.0);
        let t = tl.clock().time();
        assert!((2.0..=4.0).contains(&t), "t={t}");
    }
    assert_eq!(tl.clock().state(), PlaybackState::Playing);
    let out = tl.frame();
    let x = out.value_of(&obj, Property::PositionX).unwrap().as_number().unwrap();
    // Default ease over [0, 10]: the loop window covers u in [0.2, 0.4].
    let ease = Ease::from_name("power2.out");
    let (lo, hi) = (100.0 * ease.apply(0.2), 100.0 * ease.apply(0.4));
    assert!(x >= lo - 1e-3 && x <= hi + 1e-3, "x={x} lo={lo} hi={hi}");
}

#[test]
fn once_playback_stops_at_the_end_and_reports_events() {
    let mut tl = Timeline::in_memory(EditorConfig::default());
    tl.set_duration(1.0).unwrap();
    tl.play();
    tl.tick(0.6);
    tl.tick(0.6);
    assert_eq!(tl.clock().state(), PlaybackState::Stopped);
    approx(tl.clock().time(), 1.0, 1e-6);
    assert_eq!(
        tl.frame().events,
        vec![PlaybackEvent::Playing, PlaybackEvent::Stopped]
    );

    // Playing again from the end starts over.
    tl.play();
    approx(tl.clock().time(), 0.0, 1e-6);
}

#[test]
fn scrubbing_moves_the_playhead_without_ticking() {
    let mut tl = Timeline::in_memory(EditorConfig::default());
    tl.play();
    tl.begin_scrub();
    tl.scrub(3.0).unwrap();
    assert!(!tl.tick(0.5));
    approx(tl.clock().time(), 3.0, 1e-6);
    tl.end_scrub();
    assert!(tl.tick(0.5));
    approx(tl.clock().time(), 3.5, 1e-6);
    tl.toggle();
    assert_eq!(tl.clock().state(), PlaybackState::Paused);
    tl.stop();
    approx(tl.clock().time(), 0.0, 1e-6);
}

#[test]
fn seek_ignores_the_work_area() {
    let mut tl = Timeline::in_memory(EditorConfig::default());
    tl.drag_work_area(WorkAreaHandle::In, 2.0);
    tl.drag_work_area(WorkAreaHandle::Out, 4.0);
    tl.set_work_area_enabled(true);
    tl.seek(8.0).unwrap();
    approx(tl.clock().time(), 8.0, 1e-6);
    tl.seek(-1.0).unwrap();
    approx(tl.clock().time(), 0.0, 1e-6);
}

#[test]
fn play_rewinds_only_from_outside_the_work_area() {
    let mut tl = Timeline::in_memory(EditorConfig::default());
    tl.drag_work_area(WorkAreaHandle::In, 2.0);
    tl.drag_work_area(WorkAreaHandle::Out, 4.0);
    tl.set_work_area_enabled(true);
    tl.seek(3.0).unwrap();
    tl.play();
    approx(tl.clock().time(), 3.0, 1e-6);
    tl.pause();
    tl.seek(6.0).unwrap();
    assert!(!tl.work_area().contains(6.0));
    tl.play();
    approx(tl.clock().time(), 2.0, 1e-6);
    assert!(tl.work_area().contains(tl.clock().time()));
}

#[test]
fn frame_samples_the_active_scene_only() {
    let mut tl = Timeline::in_memory(EditorConfig::default());
    let intro = SceneId::new("intro");
    let outro = SceneId::new("outro");
    let title = ObjectId::new("title");
    let credits = ObjectId::new("credits");
    tl.record_keyframe(&title, Some(&intro), Property::Opacity, Value::Number(0.5))
        .unwrap();
    tl.record_keyframe(&credits, Some(&outro), Property::Opacity, Value::Number(0.25))
        .unwrap();

    // Without an active object every animation is sampled.
    let out = tl.frame();
    assert_eq!(out.value_of(&title, Property::Opacity), Some(Value::Number(0.5)));
    assert_eq!(out.value_of(&credits, Property::Opacity), Some(Value::Number(0.25)));

    tl.set_active_object(title.clone(), Some(intro));
    let out = tl.frame();
    assert_eq!(out.value_of(&title, Property::Opacity), Some(Value::Number(0.5)));
    assert_eq!(out.value_of(&credits, Property::Opacity), None);

    tl.set_active_object(credits.clone(), Some(outro));
    let out = tl.frame();
    assert_eq!(out.value_of(&title, Property::Opacity), None);
    assert_eq!(out.value_of(&credits, Property::Opacity), Some(Value::Number(0.25)));
}
