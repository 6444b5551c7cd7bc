use criterion::{criterion_group, criterion_main, Criterion};
use qrframe_qr::DetectedCode;
use qrframe_report::{assemble, to_csv, FrameDimensions, ScanResult};

fn bench_assemble(c: &mut Criterion) {
    let frame = FrameDimensions {
        width: 1920,
        height: 1080,
    };

    // a 12x8 rack of modules, every other one with a structured payload
    let detections = (0..96)
        .map(|i| {
            let (x, y) = ((i % 12) as f32 * 150.0, (i / 12) as f32 * 130.0);
            let text = if i % 2 == 0 {
                format!("MODULE_{i:03}")
            } else {
                format!(r#"{{"device_id":"SENSOR_{i:03}","type":"temperature_sensor","slot":{i}}}"#)
            };
            DetectedCode::new(
                text,
                vec![[x, y], [x + 100.0, y + 2.0], [x + 98.0, y + 101.0], [x - 1.0, y + 99.0]],
            )
        })
        .collect::<Vec<_>>();

    c.bench_function("assemble-96-modules", |b| {
        b.iter(|| std::hint::black_box(assemble("rack.png", frame, &detections)));
    });

    let result = ScanResult::from(assemble("rack.png", frame, &detections));
    c.bench_function("to-json-96-modules", |b| {
        b.iter(|| std::hint::black_box(result.to_json(false).unwrap()));
    });

    let report = assemble("rack.png", frame, &detections);
    c.bench_function("to-csv-96-modules", |b| {
        b.iter(|| std::hint::black_box(to_csv(&report)));
    });
}

criterion_group!(benches, bench_assemble);
criterion_main!(benches);
