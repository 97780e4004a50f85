//! # Rendering Pipeline
//!
//! Pattern source through the frame builder and encoder, checked with an
//! independent GIF decoder.

use super::fixtures::*;
use cat_01_gif_encoder::BACKGROUND;
use cat_02_frame_builder::FrameBuilder;
use cat_03_sim_worker::{base_gif_name, TaskExecutor};
use cat_04_job_dispatcher::Deadline;
use shared_types::{
    ErrorCategory, JobId, SimSummary, TaskHandler, TaskOutcome, TaskPayload, TaskRequest,
};

fn build_gif(rle: &str, script: &str) -> Vec<u8> {
    let engine = engine();
    let pattern = engine.parse_pattern(rle).unwrap();
    let args: Vec<&str> = script.split_whitespace().collect();
    let set = FrameBuilder::new(engine).build(pattern, &args).unwrap();
    set.encode().unwrap().into_bytes()
}

fn live(frame: &DecodedFrame) -> usize {
    frame.indices.iter().filter(|&&i| i != 0).count()
}

#[test]
fn test_blinker_decodes_as_oscillation() {
    let (width, height, frames) = decode_gif(&build_gif(BLINKER, "4")).unwrap();
    assert_eq!((width, height), (5, 5));
    assert_eq!(frames.len(), 4);
    assert!(frames.iter().all(|f| f.delay == 100));
    assert!(frames.iter().all(|f| live(f) == 3));
    assert_ne!(frames[0].indices, frames[1].indices);
    assert_eq!(frames[0].indices, frames[2].indices);
    assert_eq!(frames[1].indices, frames[3].indices);
}

#[test]
fn test_glider_frames_share_one_canvas() {
    let (width, height, frames) = decode_gif(&build_gif(GLIDER, "9")).unwrap();
    assert_eq!(frames.len(), 9);
    for frame in &frames {
        assert_eq!(frame.indices.len(), usize::from(width) * usize::from(height));
        assert_eq!(live(frame), 5);
    }
    // Two full periods moved the glider two cells diagonally.
    assert!(width >= 7 && height >= 7);
    assert_ne!(frames[0].indices, frames[8].indices);
}

#[test]
fn test_fps_and_multi_part_delays() {
    let (_, _, frames) = decode_gif(&build_gif(BLINKER, "5 fps 4")).unwrap();
    assert_eq!(frames.len(), 4);
    assert!(frames.iter().all(|f| f.delay == 20));

    let (_, _, frames) = decode_gif(&build_gif(BLINKER, "4 > 2 fps 2")).unwrap();
    let delays: Vec<u16> = frames.iter().map(|f| f.delay).collect();
    assert_eq!(delays, vec![58, 58, 58, 58, 58, 50, 50]);
}

#[test]
fn test_generations_palette_holds_every_state() {
    let bytes = build_gif(BRIANS_BRAIN, "3");
    let (_, _, frames) = decode_gif(&bytes).unwrap();
    assert!(frames[0].indices.contains(&1));
    assert!(frames[0].indices.contains(&2));
    assert!(frames.iter().flat_map(|f| &f.indices).all(|&i| i < 4));

    // Global colour table starts with the background colour.
    assert_eq!(&bytes[13..16], &[BACKGROUND.r, BACKGROUND.g, BACKGROUND.b]);
}

#[test]
fn test_executor_output_file_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let executor = TaskExecutor::new(engine(), dir.path());
    let reply = executor.handle(TaskRequest::new(
        JobId::new(1),
        TaskPayload::Sim {
            argv: argv(&["sim", "6", ">", "wait", "2"]),
            pattern_source: GLIDER.to_string(),
        },
    ));
    let TaskOutcome::Success(data) = reply.outcome else {
        panic!("sim failed: {:?}", reply.outcome);
    };
    let summary: SimSummary = serde_json::from_value(data).unwrap();
    assert_eq!(summary.gif_path, dir.path().join(base_gif_name(JobId::new(1))));

    let (width, height, frames) = decode_gif(&std::fs::read(&summary.gif_path).unwrap()).unwrap();
    assert_eq!(frames.len(), summary.frames);
    assert_eq!(frames.len(), 9);
    assert_eq!((u32::from(width), u32::from(height)), (summary.width, summary.height));
    assert_eq!(frames[6].indices, frames[8].indices);
}

#[test]
fn test_script_errors_reach_the_reply() {
    let dir = tempfile::tempdir().unwrap();
    let executor = TaskExecutor::new(engine(), dir.path());
    let reply = executor.handle(TaskRequest::new(
        JobId::new(2),
        TaskPayload::Sim {
            argv: argv(&["sim", "3", ">", "setrule", "B0/S"]),
            pattern_source: BLINKER.to_string(),
        },
    ));
    assert!(matches!(
        reply.outcome,
        TaskOutcome::ExpectedFailure {
            category: ErrorCategory::Rule,
            ..
        }
    ));
    assert!(!dir.path().join(base_gif_name(JobId::new(2))).exists());
}

#[tokio::test]
async fn test_concurrent_sims_write_separate_files() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = start_executor_dispatcher(dir.path());

    let (blinker, glider) = tokio::join!(
        dispatcher.simulate(argv(&["sim", "2"]), BLINKER, Deadline::Default),
        dispatcher.simulate(argv(&["sim", "9"]), GLIDER, Deadline::Default),
    );
    let blinker = blinker.unwrap().unwrap();
    let glider = glider.unwrap().unwrap();
    assert_ne!(blinker.gif_path, glider.gif_path);

    // Reading after both finished still gives each caller its own render.
    let (_, _, frames) = decode_gif(&std::fs::read(&blinker.gif_path).unwrap()).unwrap();
    assert_eq!(frames.len(), blinker.frames);
    assert_eq!(frames.len(), 2);
    let (_, _, frames) = decode_gif(&std::fs::read(&glider.gif_path).unwrap()).unwrap();
    assert_eq!(frames.len(), 9);
    dispatcher.shutdown().await.unwrap();
}
