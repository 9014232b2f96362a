//! Sketch-then-matting workflow with the VanceAI Rust SDK.
//!
//! Run with:
//!   VANCEAI_API_KEY=... cargo run --example workflow -- path/to/photo.jpg
//!
//! Set `RUST_LOG=vanceai=debug` to see each request.

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use vanceai::{ClientBuilder, Config, Job, ModuleParams, Status, WorkflowStep};

#[tokio::main]
async fn main() -> vanceai::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let input = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tests/testdata/cat.jpg".to_string());

    // -----------------------------------------------------------------------
    // 1. Create a client (reads VANCEAI_API_KEY from environment)
    // -----------------------------------------------------------------------
    let client = ClientBuilder::new().build()?;

    // -----------------------------------------------------------------------
    // 2. Upload the image
    // -----------------------------------------------------------------------
    let uploaded = client.upload_file(&input).await?;
    println!(
        "Uploaded {} as {} ({}x{}, {} bytes)",
        uploaded.data.name,
        uploaded.data.uid,
        uploaded.data.w,
        uploaded.data.h,
        uploaded.data.filesize
    );

    // -----------------------------------------------------------------------
    // 3. Submit a two-step workflow
    // -----------------------------------------------------------------------
    let job = Job::workflow([
        WorkflowStep::new(
            "sketch",
            Config::new(
                "sketch",
                ModuleParams {
                    model_name: "SketchStable".into(),
                    single_face: true,
                    composite: true,
                    ..Default::default()
                },
            ),
        ),
        WorkflowStep::new(
            "matting",
            Config::new(
                "matting",
                ModuleParams {
                    model_name: "MattingStable".into(),
                    rescale: 532,
                    ..Default::default()
                },
            )
            .quality(100),
        ),
    ]);
    let submitted = client.transform(&uploaded.data.uid, &job).await?;
    let trans_id = submitted.data.trans_id;
    println!("Submitted job {trans_id}");

    // -----------------------------------------------------------------------
    // 4. Poll until the job leaves the queue
    // -----------------------------------------------------------------------
    let status = loop {
        let progress = client.get_progress(&trans_id).await?;
        match progress.data.status {
            // The result is pushed to the webhook; progress may never move on.
            Some(Status::Webhook) => {
                println!("Job {trans_id} reports to the configured webhook");
                return Ok(());
            }
            Some(s) if s.is_pending() => {
                println!("  Status: {s}");
                tokio::time::sleep(Duration::from_secs(3)).await;
            }
            other => break other,
        }
    };
    if !status.is_some_and(|s| s.is_finished()) {
        println!("Job ended with status {status:?}");
        return Ok(());
    }

    // -----------------------------------------------------------------------
    // 5. Stream the result to disk
    // -----------------------------------------------------------------------
    let dir = std::path::Path::new(&uploaded.data.uid);
    tokio::fs::create_dir_all(dir).await?;
    let out = dir.join("output.jpg");
    let written = client.download(&trans_id).await?.save(&out).await?;
    println!("Saved {written} bytes to {}", out.display());

    // -----------------------------------------------------------------------
    // 6. Check the remaining quota
    // -----------------------------------------------------------------------
    let point = client.get_point().await?;
    println!("Quota: {} of {} used", point.data.used_num, point.data.max_num);

    Ok(())
}
