/// Generation pipeline runs against the offline backend
use ai_pipeline::backends::mock::MockFailure;
use ai_pipeline::*;
use std::time::{Duration, Instant};
use timeline::plan;

#[tokio::test]
async fn test_progress_reported_after_each_image() {
    let backend = MockBackend::new(MockConfig::default());
    let segments = plan(15.0, 5.0).unwrap();
    let style = find_style("Anime").unwrap();

    let mut updates = Vec::new();
    let images = GenerationPipeline::new(&backend)
        .run(&segments, "a cat", style, |progress, so_far| {
            updates.push((*progress, so_far.len()));
        })
        .await
        .unwrap();

    assert_eq!(
        updates,
        vec![
            (GenerationProgress { completed: 1, total: 3 }, 1),
            (GenerationProgress { completed: 2, total: 3 }, 2),
            (GenerationProgress { completed: 3, total: 3 }, 3),
        ]
    );
    let timestamps: Vec<f64> = images.iter().map(|i| i.timestamp).collect();
    assert_eq!(timestamps, vec![0.0, 5.0, 10.0]);
    assert!(images
        .iter()
        .all(|i| i.image_url.starts_with("data:image/jpeg;base64,")));
}

#[tokio::test]
async fn test_prompts_carry_style_and_rounded_time() {
    let backend = MockBackend::new(MockConfig::default());
    let segments = plan(12.0, 5.0).unwrap();
    let style = find_style("Watercolor").unwrap();

    GenerationPipeline::new(&backend)
        .run(&segments, "rainy street", style, |_, _| {})
        .await
        .unwrap();

    let prompts = backend.prompts();
    assert_eq!(prompts.len(), 3);
    assert_eq!(
        prompts[2],
        format!("rainy street, {}, scene at 10 seconds.", style.prompt)
    );
}

#[tokio::test]
async fn test_slow_backend_is_awaited_one_call_at_a_time() {
    let latency = Duration::from_millis(25);
    let backend = MockBackend::new(MockConfig {
        latency,
        ..MockConfig::default()
    });
    let segments = plan(15.0, 5.0).unwrap();

    let mut calls_at_update = Vec::new();
    let start = Instant::now();
    GenerationPipeline::new(&backend)
        .run(&segments, "slow", default_style(), |progress, _| {
            calls_at_update.push((progress.completed, backend.call_count()));
        })
        .await
        .unwrap();

    assert!(start.elapsed() >= latency * 3);
    assert_eq!(calls_at_update, vec![(1, 1), (2, 2), (3, 3)]);
}

#[tokio::test]
async fn test_run_aborts_on_first_failure() {
    let backend = MockBackend::failing_on(2, MockFailure::Transport);
    let segments = plan(15.0, 5.0).unwrap();

    let mut updates = 0;
    let result = GenerationPipeline::new(&backend)
        .run(&segments, "a cat", default_style(), |_, _| updates += 1)
        .await;

    match result {
        Err(PipelineError::Generation { segment, source, .. }) => {
            assert_eq!(segment, 1);
            assert!(matches!(source, BackendError::Transport(_)));
        }
        other => panic!("expected generation error, got {other:?}"),
    }
    assert_eq!(updates, 1);
    // no calls after the failing one
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_empty_payload_fails_the_run() {
    let backend = MockBackend::failing_on(1, MockFailure::EmptyPayload);
    let segments = plan(4.0, 5.0).unwrap();

    let result = GenerationPipeline::new(&backend)
        .run(&segments, "a cat", default_style(), |_, _| {})
        .await;
    assert!(matches!(
        result,
        Err(PipelineError::Generation {
            source: BackendError::InvalidResponse(_),
            ..
        })
    ));
}

#[tokio::test]
async fn test_no_segments_is_an_error() {
    let backend = MockBackend::new(MockConfig::default());
    let result = GenerationPipeline::new(&backend)
        .run(&[], "a cat", default_style(), |_, _| {})
        .await;
    assert!(matches!(result, Err(PipelineError::NoSegments)));
    assert_eq!(backend.call_count(), 0);
}
