//! # Chat Commands End to End
//!
//! Command wording over a real dispatcher and worker.

use super::fixtures::*;
use caterer_runtime::{Commands, Invocation, RuntimeConfig, WorkerMode};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn invoke(words: &[&str], pattern: Option<&str>) -> Invocation {
    Invocation::new("someone", argv(words), pattern.map(str::to_string))
}

#[tokio::test]
async fn test_timeout_is_reported_and_next_sim_renders() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = start_thread_dispatcher(
        Arc::new(HangingHandler::new(dir.path(), Duration::from_millis(600))),
        Duration::from_millis(150),
    );
    let commands = Commands::new(dispatcher.clone(), engine(), BTreeSet::new());

    let reply = commands.run(invoke(&["sim", HANG], Some(BLINKER))).await;
    assert_eq!(reply.content.as_deref(), Some("Error: Timed out!"));
    assert!(reply.file.is_none());

    let reply = commands.run(invoke(&["sim", "4"], Some(BLINKER))).await;
    let file = reply.file.expect("sim should attach a gif");
    let (_, _, frames) = decode_gif(&std::fs::read(file).unwrap()).unwrap();
    assert_eq!(frames.len(), 4);

    // Only the sim that rendered is counted.
    let reply = commands.run(invoke(&["simstats"], None)).await;
    assert_eq!(reply.content.as_deref(), Some("B3/S23: 1"));
    dispatcher.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_commands_over_configured_thread_worker() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = RuntimeConfig {
        worker_mode: WorkerMode::Thread,
        ..RuntimeConfig::default()
    };
    config.worker.output_dir = dir.path().to_path_buf();
    config.admins.insert("someone".to_string());
    config.validate().unwrap();

    let dispatcher = caterer_runtime::start_dispatcher(&config, engine());
    let commands = Commands::new(dispatcher.clone(), engine(), config.admins.clone());

    let reply = commands
        .run(invoke(&["sim", "notimeout", "identify"], Some(GLIDER)))
        .await;
    assert_eq!(reply.content.as_deref(), Some("c/4 diagonal spaceship"));
    assert!(reply.file.is_some());

    let reply = commands.run(invoke(&["basic_identify"], Some(BLINKER))).await;
    let text = reply.content.unwrap();
    assert!(text.starts_with("Period 2 oscillator"));
    assert!(text.contains("Populations: 3 | 3 | 3"));

    let reply = commands.run(invoke(&["sim", "3", ">", "setrule", "B0/S"], Some(BLINKER))).await;
    assert!(reply.content.unwrap().starts_with("Rule error: "));

    let reply = commands.run(invoke(&["identify"], None)).await;
    assert_eq!(reply.content.as_deref(), Some("Error: Cannot find RLE"));
    dispatcher.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_random_soup_renders() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher = start_executor_dispatcher(dir.path());
    let commands = Commands::new(dispatcher.clone(), engine(), BTreeSet::new());

    let reply = commands
        .run(invoke(&["sim", "rand", "8x8", "50%", "B3/S23", "3"], None))
        .await;
    let file = reply.file.expect("soup sim should attach a gif");
    let (_, _, frames) = decode_gif(&std::fs::read(file).unwrap()).unwrap();
    assert_eq!(frames.len(), 3);
    dispatcher.shutdown().await.unwrap();
}
