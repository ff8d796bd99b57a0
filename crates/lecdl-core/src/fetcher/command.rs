//! Process-backed fetcher: runs an external tool per URL type.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::FetcherConfig;
use crate::fs_util;
use crate::retry::FetchError;
use crate::url_model::UrlType;

use super::{FetchRequest, FetchedArtifact, Fetcher};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const STDERR_TAIL: usize = 500;

/// Argv templates. The first element is the program; `{url}`, `{stem}` and
/// `{ext}` (with leading dot, or empty) are substituted in every element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplates {
    pub video: Vec<String>,
    pub document: Vec<String>,
    pub folder: Vec<String>,
}

/// Runs the configured tool for each request and finds what it wrote.
#[derive(Debug, Clone)]
pub struct CommandFetcher {
    templates: CommandTemplates,
    timeout: Duration,
}

impl CommandFetcher {
    pub fn new(templates: CommandTemplates, timeout: Duration) -> Self {
        Self { templates, timeout }
    }

    pub fn from_config(cfg: &FetcherConfig) -> Self {
        Self::new(
            CommandTemplates {
                video: cfg.video_command.clone(),
                document: cfg.document_command.clone(),
                folder: cfg.folder_command.clone(),
            },
            Duration::from_secs(cfg.timeout_secs),
        )
    }

    fn template_for(&self, url_type: UrlType) -> &[String] {
        if url_type.is_video() {
            &self.templates.video
        } else if url_type == UrlType::GoogleDriveFolder {
            &self.templates.folder
        } else {
            &self.templates.document
        }
    }

    fn run(&self, argv: &[String]) -> Result<(), FetchError> {
        let (program, args) = match argv.split_first() {
            Some(split) => split,
            None => {
                return Err(FetchError::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "empty fetch command template",
                )))
            }
        };
        tracing::debug!(program = %program, args = ?args, "running fetch command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drain stderr on a thread so a chatty tool cannot block on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        // On timeout the reader is left detached: a grandchild may still hold the pipe.
        let Some(status) = wait_with_deadline(&mut child, self.timeout)? else {
            return Err(FetchError::Timeout(self.timeout));
        };
        if status.success() {
            return Ok(());
        }
        let stderr = stderr_reader
            .and_then(|h| h.join().ok())
            .map(|buf| tail(String::from_utf8_lossy(&buf).trim(), STDERR_TAIL))
            .unwrap_or_default();
        Err(FetchError::Command {
            status: status.to_string(),
            stderr,
        })
    }
}

/// Waits for `child` up to `timeout`; kills it and returns `None` on expiry.
fn wait_with_deadline(
    child: &mut Child,
    timeout: Duration,
) -> std::io::Result<Option<std::process::ExitStatus>> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn tail(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        return s.to_string();
    }
    s.chars().skip(count - max_chars).collect()
}

/// Extension (with dot) the document tool is asked to write.
fn extension_for(url_type: UrlType) -> &'static str {
    match url_type {
        UrlType::GoogleSlides | UrlType::GoogleDocs => ".pdf",
        UrlType::GoogleSheets => ".xlsx",
        _ => "",
    }
}

fn folder_path(stem: &Path) -> PathBuf {
    fs_util::with_suffix(stem, "_folder")
}

fn render(template: &[String], url: &str, stem: &Path, ext: &str) -> Vec<String> {
    let stem = stem.to_string_lossy();
    template
        .iter()
        .map(|part| {
            part.replace("{url}", url)
                .replace("{stem}", &stem)
                .replace("{ext}", ext)
        })
        .collect()
}

impl Fetcher for CommandFetcher {
    fn fetch(&self, request: &FetchRequest<'_>) -> Result<FetchedArtifact, FetchError> {
        if let Some(parent) = request.stem.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let ext = extension_for(request.url_type);
        let argv = render(
            self.template_for(request.url_type),
            request.url,
            request.stem,
            ext,
        );
        if request.url_type == UrlType::GoogleDriveFolder {
            std::fs::create_dir_all(folder_path(request.stem))?;
        }

        self.run(&argv)?;

        let candidates = if request.url_type == UrlType::GoogleDriveFolder {
            vec![folder_path(request.stem)]
        } else {
            fs_util::find_stem_artifacts(request.stem)
        };
        let found = candidates.into_iter().find_map(|path| {
            fs_util::artifact_size(&path)
                .filter(|&size| size > 0)
                .map(|file_size| FetchedArtifact { path, file_size })
        });
        match found {
            Some(artifact) => {
                tracing::debug!(
                    url = request.url,
                    path = %artifact.path.display(),
                    file_size = artifact.file_size,
                    "fetched"
                );
                Ok(artifact)
            }
            None => Err(FetchError::NoArtifact(request.stem.to_path_buf())),
        }
    }
}
