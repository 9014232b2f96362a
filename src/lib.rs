//! # VanceAI SDK for Rust
//!
//! Async Rust client for the [VanceAI](https://vanceai.com) image processing
//! API. Upload an image, submit a job, poll its progress, stream the result
//! back, and query your account quota.
//!
//! ## Quick start
//!
//! ```no_run
//! use vanceai::{Client, Config, Job, ModuleParams};
//!
//! #[tokio::main]
//! async fn main() -> vanceai::Result<()> {
//!     let client = Client::new("your_api_token", "");
//!
//!     let uploaded = client.upload_file("cat.jpg").await?;
//!     println!("{}x{} ({} bytes)", uploaded.data.w, uploaded.data.h, uploaded.data.filesize);
//!
//!     let job = Job::single(
//!         "enlarge",
//!         Config::new("enlarge", ModuleParams {
//!             model_name: "EnlargeStable".into(),
//!             suppress_noise: 26,
//!             remove_blur: 26,
//!             scale: "2x".into(),
//!             ..Default::default()
//!         }),
//!     );
//!     let submitted = client.transform(&uploaded.data.uid, &job).await?;
//!
//!     let progress = client.get_progress(&submitted.data.trans_id).await?;
//!     if progress.data.status.is_some_and(|s| s.is_finished()) {
//!         let written = client
//!             .download(&submitted.data.trans_id)
//!             .await?
//!             .save("cat_2x.jpg")
//!             .await?;
//!         println!("saved {written} bytes");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Transport failures (connection errors, non-200 statuses, malformed JSON)
//! and service-reported failures are separate variants of [`VanceAiError`].
//! Use [`VanceAiError::kind`] to branch on the latter:
//!
//! ```no_run
//! # async fn example(client: vanceai::Client) {
//! use vanceai::ErrorKind;
//!
//! match client.get_point().await {
//!     Ok(resp) => println!("used {} of {}", resp.data.used_num, resp.data.max_num),
//!     Err(e) if e.kind() == Some(ErrorKind::InvalidApiKey) => eprintln!("check your token"),
//!     Err(e) => eprintln!("{e}"),
//! }
//! # }
//! ```

mod client;
mod download;
mod errors;
mod job;
mod models;

pub use client::{Client, ClientBuilder};
pub use download::ImageStream;
pub use errors::{ErrorKind, Result, VanceAiError};
pub use job::{
    Compress, Config, Job, JobConfig, ModuleParams, OutParams, Workflow, WorkflowStep, WORKFLOW,
};
pub use models::{Data, Message, Response, Status};
