use frameprobe::{
    FilesystemSink, FrameInspector, InspectorSettings, MemorySink, OverlayRenderer,
    Provenance, SourceRegistry, StubConfig, StubSource, SyntheticFrame,
};

/// Detections per frame for counts 1..=31 when no metadata is attached.
const EXPECTED_COUNTS: [usize; 31] = [
    1, 1, 1, 1, // 1-4: car
    1, 1, 1, // 5-7: truck
    1, 1, // 8-9: motorcycle
    0, 0, 0, 0, 0, // 10-14
    2, // 15: car and bus
    0, 0, 0, 0, // 16-19
    1, 1, 1, 1, 1, // 20-24: car
    1, 1, 1, // 25-27: truck
    1, 1, // 28-29: motorcycle
    0, 0, // 30-31
];

fn memory_inspector() -> FrameInspector {
    FrameInspector::new(
        InspectorSettings::default(),
        SourceRegistry::with_vendor_defaults(),
        OverlayRenderer::without_text(),
        Box::new(MemorySink::new()),
    )
}

#[test]
fn thirty_one_frames_persist_exactly_once() {
    let mut inspector = memory_inspector();
    let counters = inspector.counters();
    let frame = SyntheticFrame::solid_rgb(64, 64, [200, 100, 50]);

    let mut persisted = Vec::new();
    for _ in 0..31 {
        let report = inspector.inspect(&frame);
        assert!(report.decoded);
        assert_eq!(report.detections.provenance, Provenance::Synthesized);
        assert_eq!(
            report.detection_count(),
            EXPECTED_COUNTS[report.frame_count as usize - 1],
            "frame {}",
            report.frame_count
        );
        if let Some(path) = report.persisted {
            persisted.push((report.frame_count, path));
        }
    }

    assert_eq!(counters.frame_count(), 31);
    assert_eq!(persisted.len(), 1);
    assert_eq!(persisted[0].0, 30);
    assert!(persisted[0].1.to_string_lossy().ends_with("frame_30"));
}

#[test]
fn detection_counts_follow_the_cycle() {
    let mut inspector = memory_inspector();
    let frame = SyntheticFrame::solid_rgb(8, 8, [0, 0, 0]);
    let counts: Vec<usize> = (0..20)
        .map(|_| inspector.inspect(&frame).detection_count())
        .collect();
    assert_eq!(
        counts,
        vec![1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 1]
    );
}

#[test]
fn vendor_metadata_suppresses_synthesis() {
    let mut inspector = memory_inspector();
    for _ in 0..4 {
        inspector.inspect(&SyntheticFrame::solid_rgb(8, 8, [0, 0, 0]));
    }
    // Count 5 would synthesize one event.
    let frame = SyntheticFrame::solid_rgb(8, 8, [0, 0, 0]).with_annotation("HailoROIMeta");
    let report = inspector.inspect(&frame);
    assert_eq!(report.frame_count, 5);
    assert!(report.scan.detection_meta_found);
    assert_eq!(report.detections.provenance, Provenance::Metadata);
    assert_eq!(report.detection_count(), 0);
    assert!(report
        .to_string()
        .contains("Found Hailo metadata: HailoROIMeta"));
}

#[test]
fn stub_run_writes_sampled_jpegs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sink = FilesystemSink::new(dir.path()).expect("sink");
    let mut inspector = FrameInspector::new(
        InspectorSettings::default(),
        SourceRegistry::with_vendor_defaults(),
        OverlayRenderer::without_text(),
        Box::new(sink),
    );

    let mut source = StubSource::new(StubConfig {
        width: 64,
        height: 48,
        frames: 61,
    });
    let mut reports = 0;
    let processed = source.run(&mut inspector, |_| reports += 1);
    assert_eq!(processed, 61);
    assert_eq!(reports, 61);
    assert_eq!(inspector.counters().frame_count(), 61);

    let mut saved: Vec<String> = std::fs::read_dir(dir.path())
        .expect("read output dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    saved.sort();
    assert_eq!(saved, vec!["frame_30.jpg", "frame_60.jpg"]);

    let image = image::open(dir.path().join("frame_30.jpg")).expect("decode jpeg");
    assert_eq!((image.width(), image.height()), (64, 48));
}

#[test]
fn capture_disabled_still_counts_and_scans() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sink = FilesystemSink::new(dir.path()).expect("sink");
    let mut inspector = FrameInspector::new(
        InspectorSettings {
            capture_frames: false,
            ..InspectorSettings::default()
        },
        SourceRegistry::with_vendor_defaults(),
        OverlayRenderer::without_text(),
        Box::new(sink),
    );
    let frame = SyntheticFrame::solid_rgb(16, 16, [1, 2, 3]);
    for _ in 0..30 {
        let report = inspector.inspect(&frame);
        assert!(!report.decoded);
        assert!(report.persisted.is_none());
    }
    assert_eq!(inspector.counters().frame_count(), 30);
    assert_eq!(std::fs::read_dir(dir.path()).expect("read").count(), 0);
}
