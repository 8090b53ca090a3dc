use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use keyline_core::{
    sample_animation, EditorConfig, ObjectId, Property, Store, Timeline, Value,
};

const EASES: [&str; 4] = ["power2.out", "sine.inOut", "elastic.out", "none"];

/// Store with one animation holding `keys_per_property` keys on four properties.
fn populated_store(keys_per_property: usize) -> (Store, keyline_core::AnimationId) {
    let mut cfg = EditorConfig::default();
    cfg.default_duration = keys_per_property as f32;
    let mut store = Store::in_memory(&cfg);
    let anim = store.ensure_animation(&ObjectId::new("bench"), None).id;
    for property in [Property::PositionX, Property::PositionY, Property::Opacity, Property::Rotation] {
        for i in 0..keys_per_property {
            store
                .create_keyframe(
                    anim,
                    i as f32,
                    property,
                    Value::Number((i % 7) as f32),
                    Some(EASES[i % EASES.len()]),
                )
                .unwrap();
        }
    }
    (store, anim)
}

fn bench_sample_animation(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample_animation");
    for keys in [8usize, 64, 512] {
        let (store, anim) = populated_store(keys);
        group.throughput(Throughput::Elements(4));
        group.bench_with_input(BenchmarkId::from_parameter(keys), &keys, |b, &keys| {
            let mut t = 0.0f32;
            b.iter(|| {
                t = (t + 0.37) % keys as f32;
                black_box(sample_animation(&store, anim, black_box(t)))
            })
        });
    }
    group.finish();
}

fn bench_frame_while_playing(c: &mut Criterion) {
    let mut timeline = Timeline::in_memory(EditorConfig::default());
    for n in 0..32 {
        let object = ObjectId::new(format!("object-{n}"));
        for i in 0..10 {
            timeline.seek(i as f32).unwrap();
            timeline
                .record_keyframe(&object, None, Property::Scale, Value::Number(i as f32 * 0.1))
                .unwrap();
        }
    }
    timeline.set_looping(true).unwrap();
    timeline.play();
    c.bench_function("frame_32_objects", |b| {
        b.iter(|| {
            timeline.tick(black_box(1.0 / 60.0));
            black_box(timeline.frame().changes.len())
        })
    });
}

criterion_group!(benches, bench_sample_animation, bench_frame_while_playing);
criterion_main!(benches);
