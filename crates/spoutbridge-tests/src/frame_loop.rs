//! Frame loop scenarios driven tick by tick.

use crate::fakes::{bridge, descriptor, FakeGpu, GpuOp, ScriptedSources, ScriptedSync, TestHost};
use spoutbridge_core::{
    AwaitOutcome, BridgeError, CameraData, FrameEvent, ImageFrameData, ImageId, PixelFormat,
    Region, StreamHandle,
};
use spoutbridge_gpu::{Flip, TargetSlot};
use spoutbridge_sync::schema::DEFAULT_SCENE;
use spoutbridge_sync::{
    BridgeConfig, FrameSyncLoop, FrameSyncService, LoopState, SkipReason, TickOutcome,
};

fn frame(scene_index: u32) -> AwaitOutcome {
    AwaitOutcome::Frame(FrameEvent::new(12.5, scene_index))
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn zero_sources_publish_empty_schema_and_reject_scene_zero() {
    let mut sync = ScriptedSync::default();
    sync.push(frame(0));
    let (_dir, mut bridge) = bridge(BridgeConfig::default(), ScriptedSources::default(), sync);
    let mut host = TestHost::default();

    let outcome = bridge.tick(&mut host).unwrap();

    assert_eq!(
        outcome,
        TickOutcome::Skipped(SkipReason::StaleSceneIndex {
            index: 0,
            scene_count: 0
        })
    );
    assert_eq!(bridge.sync().last_published().unwrap().scene_count(), 0);
    assert_eq!(bridge.stats().stale_frames, 1);
    assert_eq!(bridge.state(), LoopState::Idle);
}

#[test]
fn vanished_source_kept_without_pruning() {
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A", "B"]),
        ScriptedSync::default(),
    );
    let mut host = TestHost::default();

    assert_eq!(bridge.tick(&mut host).unwrap(), TickOutcome::TimedOut);
    assert_eq!(bridge.schema().scene_count(), 2);

    bridge.video_mut().names = names(&["B"]);
    bridge.tick(&mut host).unwrap();

    assert_eq!(bridge.sources().names(), names(&["A", "B"]).as_slice());
    assert_eq!(bridge.sync().published.len(), 1);
    assert_eq!(bridge.schema().scene_count(), 2);
}

#[test]
fn vanished_source_pruned_and_schema_republished() {
    let config = BridgeConfig {
        remove_sender_names: true,
        ..Default::default()
    };
    let (_dir, mut bridge) = bridge(
        config,
        ScriptedSources::with_names(&["A", "B"]),
        ScriptedSync::default(),
    );
    let mut host = TestHost::default();

    bridge.tick(&mut host).unwrap();
    bridge.video_mut().names = names(&["B"]);
    bridge.tick(&mut host).unwrap();

    assert_eq!(bridge.sources().names(), names(&["B"]).as_slice());
    let published = &bridge.sync().published;
    assert_eq!(published.len(), 2);
    assert_eq!(published[1].scene_count(), 1);
    assert_eq!(published[1].scenes[0].name, "B");
}

#[test]
fn new_sources_append_without_moving_existing_scenes() {
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A"]),
        ScriptedSync::default(),
    );
    let mut host = TestHost::default();

    bridge.tick(&mut host).unwrap();
    bridge.video_mut().names = names(&["C", "A", "B"]);
    bridge.tick(&mut host).unwrap();

    let scenes: Vec<&str> = bridge.schema().scene_names().collect();
    assert_eq!(scenes, vec!["A", "C", "B"]);
    assert_eq!(bridge.stats().schema_publications, 2);
}

#[test]
fn enumeration_failure_keeps_schema() {
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A"]),
        ScriptedSync::default(),
    );
    let mut host = TestHost::default();
    bridge.tick(&mut host).unwrap();

    bridge.video_mut().fail_enumerate = true;
    assert_eq!(bridge.tick(&mut host).unwrap(), TickOutcome::TimedOut);
    assert_eq!(bridge.schema().scene_count(), 1);
    assert_eq!(bridge.sync().published.len(), 1);
}

#[test]
fn publish_failure_retried_next_tick() {
    let sync = ScriptedSync {
        fail_publish: true,
        ..Default::default()
    };
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A"]),
        sync,
    );
    let mut host = TestHost::default();

    bridge.tick(&mut host).unwrap();
    assert_eq!(bridge.schema().scene_count(), 0);

    bridge.sync_mut().fail_publish = false;
    bridge.tick(&mut host).unwrap();
    assert_eq!(bridge.schema().scene_count(), 1);
    assert_eq!(bridge.sync().published.len(), 1);
}

#[test]
fn unwritable_schema_cache_still_adopts_published_schema() {
    let mut sync = ScriptedSync::default();
    for _ in 0..3 {
        sync.push(frame(0));
    }
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("bridge.rs.json");
    let config = BridgeConfig {
        schema_path: Some(path.clone()),
        ..Default::default()
    };
    let mut bridge = FrameSyncLoop::new(
        config,
        FakeGpu::default(),
        ScriptedSources::with_names(&["A"]),
        sync,
    )
    .unwrap();
    let mut host = TestHost::default();

    for _ in 0..3 {
        assert_eq!(
            bridge.tick(&mut host).unwrap(),
            TickOutcome::Dispatched {
                frames_sent: 0,
                input_forwarded: false
            }
        );
    }

    assert_eq!(bridge.schema().scene_count(), 1);
    assert_eq!(bridge.sync().published.len(), 1);
    assert!(bridge.sync().persisted.is_empty());
    assert_eq!(bridge.stats().schema_publications, 1);
    assert_eq!(bridge.stats().stale_frames, 0);
    assert_eq!(bridge.selected_source(), Some("A"));
    assert!(!path.exists());
}

#[test]
fn selection_follows_published_schema_while_republish_pending() {
    let config = BridgeConfig {
        remove_sender_names: true,
        ..Default::default()
    };
    let (_dir, mut bridge) = bridge(
        config,
        ScriptedSources::with_names(&["A", "B", "C"]),
        ScriptedSync::default(),
    );
    let mut host = TestHost::default();
    bridge.tick(&mut host).unwrap();
    assert_eq!(bridge.schema().scene_count(), 3);

    bridge.sync_mut().fail_publish = true;
    bridge.video_mut().names = names(&["A", "C"]);
    bridge.sync_mut().push(frame(1));
    bridge.tick(&mut host).unwrap();

    assert_eq!(bridge.sources().names(), names(&["A", "C"]).as_slice());
    assert_eq!(bridge.schema().scenes[1].name, "B");
    assert_eq!(bridge.video().selected, names(&["B"]));
    assert_eq!(bridge.selected_source(), Some("B"));
}

#[test]
fn stream_resize_recreates_target_once() {
    let mut sync = ScriptedSync::default();
    sync.descriptors = vec![descriptor(1, 640, 480, PixelFormat::Bgra8)];
    sync.push(AwaitOutcome::StreamsChanged);
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A"]),
        sync,
    );
    let mut host = TestHost::default();

    bridge.tick(&mut host).unwrap();
    let h1 = TargetSlot::Stream(StreamHandle(1));
    assert_eq!(bridge.pool().get(h1).unwrap().width, 640);
    let destroys_before = bridge.gpu().destroys();

    bridge.sync_mut().descriptors = vec![descriptor(1, 1280, 720, PixelFormat::Bgra8)];
    bridge.sync_mut().push(AwaitOutcome::StreamsChanged);
    let outcome = bridge.tick(&mut host).unwrap();

    assert_eq!(
        outcome,
        TickOutcome::Reconciled {
            streams: 1,
            evicted: Vec::new()
        }
    );
    assert_eq!(bridge.gpu().destroys(), destroys_before + 1);
    let target = bridge.pool().get(h1).unwrap();
    assert_eq!((target.width, target.height), (1280, 720));

    // Later copies land on the new geometry.
    let target_id = target.id;
    bridge.sync_mut().push(frame(0));
    bridge.tick(&mut host).unwrap();
    let last_blit = bridge.gpu().blits().last().copied().cloned().unwrap();
    assert_eq!(
        last_blit,
        GpuOp::Blit {
            src: bridge.pool().get(TargetSlot::Source).unwrap().id,
            src_region: Region::full(1280, 720),
            dst: target_id,
            dst_region: Region::full(1280, 720),
            flip: Flip::None,
        }
    );
}

#[test]
fn unchanged_descriptors_do_not_reallocate() {
    let mut sync = ScriptedSync::default();
    sync.descriptors = vec![
        descriptor(1, 640, 480, PixelFormat::Bgra8),
        descriptor(2, 320, 240, PixelFormat::Rgba32F),
    ];
    sync.push(AwaitOutcome::StreamsChanged);
    sync.push(AwaitOutcome::StreamsChanged);
    let (_dir, mut bridge) = bridge(BridgeConfig::default(), ScriptedSources::default(), sync);
    let mut host = TestHost::default();

    bridge.tick(&mut host).unwrap();
    let allocations = bridge.pool().allocation_count();
    bridge.tick(&mut host).unwrap();

    assert_eq!(bridge.pool().allocation_count(), allocations);
    assert_eq!(bridge.streams().len(), 2);
}

#[test]
fn streams_changed_never_dispatches() {
    let mut sync = ScriptedSync::default();
    sync.descriptors = vec![
        descriptor(1, 640, 480, PixelFormat::Bgra8),
        descriptor(2, 1920, 1080, PixelFormat::Rgba8),
    ];
    sync.push(AwaitOutcome::StreamsChanged);
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A"]),
        sync,
    );
    let mut host = TestHost::default();

    let outcome = bridge.tick(&mut host).unwrap();

    assert!(matches!(outcome, TickOutcome::Reconciled { streams: 2, .. }));
    assert!(bridge.sync().sent.is_empty());
    assert!(bridge.gpu().blits().is_empty());
    assert_eq!(bridge.streams(), bridge.sync().descriptors.as_slice());
}

#[test]
fn stale_handles_are_evicted() {
    let mut sync = ScriptedSync::default();
    sync.descriptors = vec![
        descriptor(1, 64, 64, PixelFormat::Bgra8),
        descriptor(2, 64, 64, PixelFormat::Bgra8),
    ];
    sync.push(AwaitOutcome::StreamsChanged);
    let (_dir, mut bridge) = bridge(BridgeConfig::default(), ScriptedSources::default(), sync);
    let mut host = TestHost::default();
    bridge.tick(&mut host).unwrap();
    let h1_id = bridge
        .pool()
        .get(TargetSlot::Stream(StreamHandle(1)))
        .unwrap()
        .id;

    bridge.sync_mut().descriptors = vec![descriptor(2, 64, 64, PixelFormat::Bgra8)];
    bridge.sync_mut().push(AwaitOutcome::StreamsChanged);
    let outcome = bridge.tick(&mut host).unwrap();

    assert_eq!(
        outcome,
        TickOutcome::Reconciled {
            streams: 1,
            evicted: vec![StreamHandle(1)]
        }
    );
    assert!(!bridge.pool().contains(TargetSlot::Stream(StreamHandle(1))));
    assert!(!bridge.gpu().is_live(h1_id));
}

#[test]
fn rejected_descriptor_only_drops_that_stream() {
    let mut sync = ScriptedSync::default();
    sync.descriptors = vec![
        descriptor(1, 0, 480, PixelFormat::Bgra8),
        descriptor(2, 640, 480, PixelFormat::Bgra8),
        descriptor(3, 640, 480, PixelFormat::Unknown(9)),
        descriptor(2, 800, 600, PixelFormat::Bgra8),
    ];
    sync.push(AwaitOutcome::StreamsChanged);
    let (_dir, mut bridge) = bridge(BridgeConfig::default(), ScriptedSources::default(), sync);
    let mut host = TestHost::default();

    let outcome = bridge.tick(&mut host).unwrap();

    assert!(matches!(outcome, TickOutcome::Reconciled { streams: 1, .. }));
    assert_eq!(bridge.streams()[0].handle, StreamHandle(2));
    assert_eq!(bridge.streams()[0].width, 640);
    assert_eq!(bridge.pool().stream_handles(), vec![StreamHandle(2)]);
}

#[test]
fn frame_clears_blits_and_sends_every_stream() {
    let camera = CameraData {
        id: 1,
        ..Default::default()
    };
    let mut sync = ScriptedSync::default();
    sync.descriptors = vec![
        descriptor(1, 640, 480, PixelFormat::Bgra8),
        descriptor(2, 320, 180, PixelFormat::Rgba32F),
    ];
    sync.push(AwaitOutcome::StreamsChanged);
    sync.push(AwaitOutcome::Frame(
        FrameEvent::new(3.25, 1).with_camera(StreamHandle(1), camera),
    ));
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A", "B"]),
        sync,
    );
    let mut host = TestHost::default();

    bridge.tick(&mut host).unwrap();
    let outcome = bridge.tick(&mut host).unwrap();

    assert_eq!(
        outcome,
        TickOutcome::Dispatched {
            frames_sent: 2,
            input_forwarded: false
        }
    );
    assert_eq!(bridge.video().selected, names(&["B"]));
    assert_eq!(bridge.selected_source(), Some("B"));

    let sent = &bridge.sync().sent;
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].0, StreamHandle(1));
    assert_eq!(sent[0].2.t_tracked, 3.25);
    assert_eq!(sent[0].2.camera, Some(camera));
    // Missing camera data is not an error.
    assert_eq!(sent[1].0, StreamHandle(2));
    assert_eq!(sent[1].2.camera, None);

    for (handle, width, height) in [(1, 640, 480), (2, 320, 180)] {
        let id = bridge
            .pool()
            .get(TargetSlot::Stream(StreamHandle(handle)))
            .unwrap()
            .id;
        let clear = bridge
            .gpu()
            .ops
            .iter()
            .position(|op| *op == GpuOp::Fill { id, color: [0.0; 4] })
            .expect("stream target cleared");
        let blit = bridge
            .gpu()
            .ops
            .iter()
            .position(|op| {
                matches!(op, GpuOp::Blit { dst, dst_region, flip: Flip::None, .. }
                    if *dst == id && *dst_region == Region::full(width, height))
            })
            .expect("source blitted into stream");
        assert!(clear < blit);
    }
}

#[test]
fn selected_source_geometry_resizes_local_target() {
    let mut sync = ScriptedSync::default();
    sync.push(frame(0));
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A"]),
        sync,
    );
    let mut host = TestHost::default();

    let source = bridge.pool().get(TargetSlot::Source);
    assert!(source.is_none());
    bridge.tick(&mut host).unwrap();
    let source = bridge.pool().get(TargetSlot::Source).unwrap();
    assert_eq!((source.width, source.height), (1280, 720));
    assert_eq!(source.format, PixelFormat::Rgba32F);

    bridge.video_mut().geometry = Some((1920, 1080));
    bridge.tick(&mut host).unwrap();

    let source = bridge.pool().get(TargetSlot::Source).unwrap();
    assert_eq!((source.width, source.height), (1920, 1080));
    assert_eq!(bridge.video().received, 1);
    assert_eq!(bridge.stats().frames_received, 1);
}

#[test]
fn incoming_image_forwarded_under_outgoing_name() {
    let image = ImageFrameData {
        image_id: ImageId(42),
        width: 320,
        height: 240,
        format: PixelFormat::Bgra8,
    };
    let mut sync = ScriptedSync::default();
    sync.images.insert(0, image);
    sync.push(frame(0));
    let config = BridgeConfig {
        enable_input: true,
        ..Default::default()
    };
    let (_dir, mut bridge) = bridge(config, ScriptedSources::with_names(&["A"]), sync);
    let mut host = TestHost::default();

    let outcome = bridge.tick(&mut host).unwrap();

    assert_eq!(
        outcome,
        TickOutcome::Dispatched {
            frames_sent: 0,
            input_forwarded: true
        }
    );
    let input = bridge.pool().get(TargetSlot::Input).unwrap();
    assert_eq!((input.width, input.height, input.format), (320, 240, PixelFormat::Bgra8));
    assert_eq!(bridge.sync().fetched, vec![(ImageId(42), input.id)]);
    assert_eq!(
        bridge.video().sent,
        vec![("RenderStream".to_string(), input.id, 320, 240)]
    );
    assert!(bridge.schema().scenes[0].parameter("spout_input").is_some());
}

#[test]
fn missing_incoming_image_is_tolerated() {
    let mut sync = ScriptedSync::default();
    sync.push(frame(0));
    let config = BridgeConfig {
        enable_input: true,
        ..Default::default()
    };
    let (_dir, mut bridge) = bridge(config, ScriptedSources::with_names(&["A"]), sync);
    let mut host = TestHost::default();

    let outcome = bridge.tick(&mut host).unwrap();
    assert!(matches!(
        outcome,
        TickOutcome::Dispatched {
            input_forwarded: false,
            ..
        }
    ));
    assert!(bridge.video().sent.is_empty());
}

#[test]
fn disabled_outputs_publish_default_scene_once() {
    let image = ImageFrameData {
        image_id: ImageId(1),
        width: 64,
        height: 64,
        format: PixelFormat::Rgba8,
    };
    let mut sync = ScriptedSync::default();
    sync.descriptors = vec![descriptor(1, 64, 64, PixelFormat::Bgra8)];
    sync.images.insert(0, image);
    sync.push(AwaitOutcome::Timeout);
    sync.push(frame(0));
    let config = BridgeConfig {
        enable_input: true,
        disable_outputs: true,
        ..Default::default()
    };
    let (_dir, mut bridge) = bridge(config, ScriptedSources::with_names(&["A"]), sync);
    let mut host = TestHost::default();

    bridge.tick(&mut host).unwrap();
    let outcome = bridge.tick(&mut host).unwrap();

    assert_eq!(
        outcome,
        TickOutcome::Dispatched {
            frames_sent: 0,
            input_forwarded: true
        }
    );
    assert_eq!(bridge.video().enumerations, 0);
    assert!(bridge.sources().is_empty());
    let published = &bridge.sync().published;
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].scene_count(), 1);
    assert_eq!(published[0].scenes[0].name, DEFAULT_SCENE);
    assert!(bridge.sync().sent.is_empty());
}

#[test]
fn zero_sources_with_input_publish_default_scene() {
    let config = BridgeConfig {
        enable_input: true,
        ..Default::default()
    };
    let (_dir, mut bridge) = bridge(config, ScriptedSources::default(), ScriptedSync::default());
    let mut host = TestHost::default();

    bridge.tick(&mut host).unwrap();
    let names: Vec<&str> = bridge.schema().scene_names().collect();
    assert_eq!(names, vec![DEFAULT_SCENE]);
}

#[test]
fn windowed_mode_presents_flipped_preview() {
    let config = BridgeConfig {
        windowed: true,
        ..Default::default()
    };
    let (_dir, mut bridge) = bridge(config, ScriptedSources::default(), ScriptedSync::default());
    let mut host = TestHost::default();

    bridge.tick(&mut host).unwrap();

    let preview = bridge.pool().get(TargetSlot::Preview).unwrap();
    assert_eq!((preview.width, preview.height), (1280, 720));
    assert_eq!(host.presented, vec![preview.id]);
    let blits = bridge.gpu().blits();
    assert_eq!(blits.len(), 1);
    assert!(matches!(
        blits[0],
        GpuOp::Blit { dst, flip: Flip::Vertical, .. } if *dst == preview.id
    ));
}

#[test]
fn send_failures_are_logged_and_ignored() {
    let mut sync = ScriptedSync {
        fail_sends: true,
        ..Default::default()
    };
    sync.descriptors = vec![descriptor(1, 64, 64, PixelFormat::Bgra8)];
    sync.push(AwaitOutcome::StreamsChanged);
    sync.push(frame(0));
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A"]),
        sync,
    );
    let mut host = TestHost::default();

    bridge.tick(&mut host).unwrap();
    let outcome = bridge.tick(&mut host).unwrap();
    assert_eq!(
        outcome,
        TickOutcome::Dispatched {
            frames_sent: 0,
            input_forwarded: false
        }
    );
    assert_eq!(bridge.gpu().blits().len(), 1);
}

#[test]
fn shutdown_checked_before_await() {
    let mut sync = ScriptedSync::default();
    sync.push(frame(0));
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A"]),
        sync,
    );
    let mut host = TestHost {
        stop: true,
        ..Default::default()
    };

    assert_eq!(bridge.tick(&mut host).unwrap(), TickOutcome::Stopped);
    assert_eq!(bridge.sync().awaits, 0);
    assert_eq!(bridge.video().enumerations, 0);
}

#[test]
fn run_until_stopped_releases_targets() {
    let mut sync = ScriptedSync::default();
    sync.descriptors = vec![descriptor(7, 128, 72, PixelFormat::Rgbx8)];
    sync.push(AwaitOutcome::StreamsChanged);
    sync.push(frame(0));
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A"]),
        sync,
    );
    let mut host = TestHost::stopping_after(4);

    let stats = bridge.run(&mut host).unwrap();

    assert_eq!(stats.ticks, 4);
    assert_eq!(stats.reconciliations, 1);
    assert_eq!(stats.frames_dispatched, 1);
    assert_eq!(stats.frames_sent, 1);
    assert_eq!(stats.timeouts, 2);
    assert!(bridge.pool().is_empty());
    assert_eq!(bridge.gpu().live_count(), 0);
}

#[test]
fn fatal_blit_ends_session() {
    let mut sync = ScriptedSync::default();
    sync.descriptors = vec![descriptor(1, 64, 64, PixelFormat::Bgra8)];
    sync.push(AwaitOutcome::StreamsChanged);
    sync.push(frame(0));
    sync.push(frame(0));

    let dir = tempfile::tempdir().unwrap();
    let config = BridgeConfig {
        schema_path: Some(dir.path().join("bridge.rs.json")),
        ..Default::default()
    };
    let mut bridge = FrameSyncLoop::new(
        config,
        FakeGpu::failing_blits(),
        ScriptedSources::with_names(&["A"]),
        sync,
    )
    .unwrap();
    let mut host = TestHost::default();

    let err = bridge.run(&mut host).unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(bridge.stats().frames_dispatched, 1);
    assert_eq!(bridge.sync().awaits, 2);
    assert!(bridge.sync().sent.is_empty());
    assert!(bridge.pool().is_empty());
    assert_eq!(bridge.gpu().live_count(), 0);
}

#[test]
fn await_error_ends_session() {
    let mut sync = ScriptedSync::default();
    sync.push(AwaitOutcome::Timeout);
    sync.outcomes
        .push_back(Err(BridgeError::Service("session closed".to_string())));
    let (_dir, mut bridge) = bridge(BridgeConfig::default(), ScriptedSources::default(), sync);
    let mut host = TestHost::default();

    let err = bridge.run(&mut host).unwrap_err();
    assert!(matches!(err, BridgeError::Service(_)));
    assert_eq!(bridge.sync().awaits, 2);
    assert_eq!(bridge.gpu().live_count(), 0);
}

#[test]
fn schema_on_disk_reloads_with_tracked_scene_count() {
    let (_dir, mut bridge) = bridge(
        BridgeConfig::default(),
        ScriptedSources::with_names(&["A", "B", "C"]),
        ScriptedSync::default(),
    );
    let mut host = TestHost::default();
    bridge.tick(&mut host).unwrap();

    let path = bridge.schema_path().to_path_buf();
    let loaded = FrameSyncService::<FakeGpu>::load_schema(bridge.sync_mut(), &path)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.scene_count(), 3);
    assert_eq!(&loaded, bridge.schema());
}
