//! Image generation subcommands.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Subcommand};
use colored::Colorize;

use studio_core::OperationState;
use studio_core::model::{ImageJob, ImageRequest, ImageUpload, OutputImage, Provider};
use studio_core::ops::ImageGeneration;
use studio_http::ApiClient;

use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct ImageCommand {
    #[command(subcommand)]
    pub command: ImageSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ImageSubcommand {
    /// Submit a prompt and wait for the result
    Generate(GenerateArgs),

    /// List your image jobs
    List(ListArgs),

    /// Show one image job
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[arg(long)]
    pub prompt: String,

    /// openai or gemini
    #[arg(long, default_value = "openai")]
    pub provider: Provider,

    /// Model name (defaults to the provider's default)
    #[arg(long)]
    pub model: Option<String>,

    /// Chat thread to attach the job to
    #[arg(long)]
    pub thread: Option<u64>,

    /// Reference image to upload (repeatable)
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,

    /// Directory to write inline image outputs to
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Delay between status checks, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub interval_ms: u64,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print jobs as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub id: u64,

    /// Keep checking until the job finishes
    #[arg(long)]
    pub wait: bool,

    /// Delay between status checks, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub interval_ms: u64,

    /// Print the job as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn handle(cmd: ImageCommand, api: &str) -> Result<()> {
    match cmd.command {
        ImageSubcommand::Generate(args) => generate(args, api).await,
        ImageSubcommand::List(args) => list(args, api).await,
        ImageSubcommand::Show(args) => show(args, api).await,
    }
}

async fn generate(args: GenerateArgs, api: &str) -> Result<()> {
    let mut request = ImageRequest::new(args.provider, args.prompt);
    if let Some(model) = args.model {
        request = request.with_model(model);
    }
    if let Some(thread) = args.thread {
        request = request.in_thread(thread);
    }
    for path in &args.images {
        request = request.attach(read_upload(path)?);
    }

    let client = session::open_client(api)?;
    session::require_login(&client)?;

    let receipt = client
        .submit_image(&request)
        .await
        .context("Failed to submit image job")?;
    output::note(&format!("Submitted job {}", receipt.id));

    let job = wait_for(&client, receipt.id, args.interval_ms).await?;
    render_job(&job);

    if let Some(dir) = &args.out {
        save_outputs(&job, dir)?;
    }

    Ok(())
}

async fn list(args: ListArgs, api: &str) -> Result<()> {
    let client = session::open_client(api)?;
    session::require_login(&client)?;

    let jobs = client
        .image_jobs()
        .await
        .context("Failed to list image jobs")?;

    if args.json {
        return output::json_pretty(&jobs);
    }

    if jobs.is_empty() {
        output::note("No image jobs found.");
        return Ok(());
    }

    for job in &jobs {
        let created = job
            .created_at
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "{:>6}  {:<10}  {:<16}  {}  {}",
            job.id,
            job.status.to_string(),
            created,
            format!("{}/{}", job.provider, job.model).dimmed(),
            job.prompt
        );
    }

    Ok(())
}

async fn show(args: ShowArgs, api: &str) -> Result<()> {
    let client = session::open_client(api)?;
    session::require_login(&client)?;

    let job = if args.wait {
        wait_for(&client, args.id, args.interval_ms).await?
    } else {
        client
            .image_job(args.id)
            .await
            .context("Failed to fetch image job")?
    };

    if args.json {
        output::json_pretty(&job)
    } else {
        render_job(&job);
        Ok(())
    }
}

/// Poll a job until it settles. A failed job is an error.
async fn wait_for(client: &ApiClient, id: u64, interval_ms: u64) -> Result<ImageJob> {
    let mut last = None;
    let state = client
        .tracker()
        .poll_with::<ImageGeneration, _>(&id, Duration::from_millis(interval_ms), |state| {
            let status = state.status().map(|job| job.status);
            if status != last {
                if let Some(status) = status {
                    output::note(&format!("Job {id}: {status}"));
                }
                last = status;
            }
        })
        .await;

    match state {
        OperationState::Succeeded(job) => Ok(job),
        OperationState::Failed(failure) => bail!("Job {id} failed: {failure}"),
        OperationState::Pending(_) => bail!("Job {id} did not finish"),
    }
}

fn render_job(job: &ImageJob) {
    output::field("Job", &job.id.to_string());
    output::field("Status", &job.status.to_string());
    output::field("Provider", &format!("{}/{}", job.provider, job.model));
    output::field("Prompt", &job.prompt);
    if let Some(thread) = job.thread {
        output::field("Thread", &thread.to_string());
    }
    output::field("Credits spent", &job.credits_spent.to_string());
    for (n, image) in job.outputs().enumerate() {
        let label = format!("Image {}", n + 1);
        match image {
            OutputImage::Url(url) => output::field(&label, url),
            OutputImage::Base64(data) => {
                output::field(&label, &format!("inline PNG ({} base64 chars)", data.len()))
            }
        }
    }
}

/// Write inline outputs as `job-<id>-<n>.png`. URL outputs are listed only.
fn save_outputs(job: &ImageJob, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).context("Failed to create output directory")?;

    let mut written = 0;
    for (n, image) in job.outputs().enumerate() {
        let Some(bytes) = image.decode()? else {
            continue;
        };
        let path = dir.join(format!("job-{}-{}.png", job.id, n + 1));
        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        output::success(&format!("Saved {}", path.display()));
        written += 1;
    }

    if written == 0 {
        output::note("No inline images to save.");
    }
    Ok(())
}

fn read_upload(path: &Path) -> Result<ImageUpload> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("image")
        .to_string();
    let mime = mime_guess::from_path(path).first().map(|m| m.to_string());

    Ok(ImageUpload {
        file_name,
        mime,
        bytes,
    })
}
