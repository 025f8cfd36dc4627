//! Scripted encoder double shared by the integration tests
#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncWriteExt, DuplexStream};

use reelmux::adapters::toml_config::ReelmuxConfig;
use reelmux::ports::{KillSwitch, OutputStream, ProcessExit, ProcessHandle, ProcessPort};
use reelmux::DomainError;

/// What one fake encoder run does
#[derive(Debug, Clone)]
pub struct ScriptedRun {
    pub stderr: String,
    pub stdout: Vec<u8>,
    pub exit_code: Option<i32>,
    /// Keep stderr open and block in `wait` until the kill switch trips
    pub hang: bool,
    /// Files written when the process starts
    pub files: Vec<(PathBuf, Vec<u8>)>,
}

impl ScriptedRun {
    pub fn exit(code: i32) -> Self {
        Self {
            stderr: String::new(),
            stdout: Vec::new(),
            exit_code: Some(code),
            hang: false,
            files: Vec::new(),
        }
    }

    pub fn stderr(mut self, text: impl Into<String>) -> Self {
        self.stderr = text.into();
        self
    }

    pub fn stdout(mut self, bytes: Vec<u8>) -> Self {
        self.stdout = bytes;
        self
    }

    pub fn writes(mut self, path: impl Into<PathBuf>, bytes: &[u8]) -> Self {
        self.files.push((path.into(), bytes.to_vec()));
        self
    }

    pub fn hang_until_killed(mut self) -> Self {
        self.hang = true;
        self
    }
}

type Handler = dyn Fn(&[String]) -> Result<ScriptedRun, DomainError> + Send + Sync;

/// Process port that answers every spawn from a closure and records the arguments
pub struct FakeProcessPort {
    handler: Box<Handler>,
    spawned: Mutex<Vec<Vec<String>>>,
}

impl FakeProcessPort {
    pub fn new(
        handler: impl Fn(&[String]) -> Result<ScriptedRun, DomainError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            spawned: Mutex::new(Vec::new()),
        })
    }

    /// Port whose program can never be started
    pub fn unavailable() -> Arc<Self> {
        Self::new(|_| {
            Err(DomainError::ProcessUnavailable {
                program: "ffmpeg".to_string(),
                reason: "executable not found".to_string(),
            })
        })
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.lock().unwrap().len()
    }

    pub fn spawned_args(&self) -> Vec<Vec<String>> {
        self.spawned.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessPort for FakeProcessPort {
    async fn spawn(
        &self,
        _program: &Path,
        args: &[String],
    ) -> Result<Box<dyn ProcessHandle>, DomainError> {
        self.spawned.lock().unwrap().push(args.to_vec());
        let run = (self.handler)(args)?;

        for (path, bytes) in &run.files {
            std::fs::write(path, bytes).unwrap();
        }

        let (stderr, hang_writer): (OutputStream, Option<DuplexStream>) = if run.hang {
            let (mut writer, reader) = tokio::io::duplex(64 * 1024);
            writer.write_all(run.stderr.as_bytes()).await.unwrap();
            (Box::new(reader), Some(writer))
        } else {
            (Box::new(Cursor::new(run.stderr.into_bytes())), None)
        };

        Ok(Box::new(FakeHandle {
            stderr: Some(stderr),
            stdout: Some(Box::new(Cursor::new(run.stdout))),
            exit_code: run.exit_code,
            hang_writer,
            switch: KillSwitch::new(),
        }))
    }
}

struct FakeHandle {
    stderr: Option<OutputStream>,
    stdout: Option<OutputStream>,
    exit_code: Option<i32>,
    hang_writer: Option<DuplexStream>,
    switch: KillSwitch,
}

#[async_trait]
impl ProcessHandle for FakeHandle {
    fn take_stderr(&mut self) -> Option<OutputStream> {
        self.stderr.take()
    }

    fn take_stdout(&mut self) -> Option<OutputStream> {
        self.stdout.take()
    }

    fn kill_switch(&self) -> KillSwitch {
        self.switch.clone()
    }

    async fn wait(&mut self) -> Result<ProcessExit, DomainError> {
        if let Some(writer) = self.hang_writer.take() {
            self.switch.tripped().await;
            drop(writer);
            return Ok(ProcessExit {
                code: None,
                terminated: true,
            });
        }
        Ok(ProcessExit {
            code: self.exit_code,
            terminated: self.switch.is_tripped(),
        })
    }
}

/// Diagnostic text of an information-only run on a file of `seconds` length
pub fn probe_output(seconds: f64) -> String {
    let total_cs = (seconds * 100.0).round() as u64;
    let (hours, rest) = (total_cs / 360_000, total_cs % 360_000);
    let (minutes, rest) = (rest / 6000, rest % 6000);
    format!(
        "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mp4':\n  \
         Duration: {:02}:{:02}:{:02}.{:02}, start: 0.000000, bitrate: 1205 kb/s\n  \
         Stream #0:0(und): Video: h264 (High), yuv420p, 1280x720 [SAR 1:1 DAR 16:9], 25 fps, 25 tbr\n  \
         Stream #0:1(und): Audio: aac (LC), 48000 Hz, stereo, fltp, 128 kb/s\n\
         At least one output file must be specified\n",
        hours,
        minutes,
        rest / 100,
        rest % 100
    )
}

/// Encoder status line at `seconds` into the output
pub fn status_line(seconds: f64, speed: f64) -> String {
    let total_cs = (seconds * 100.0).round() as u64;
    format!(
        "frame=  100 fps= 50 q=28.0 size=     256kB time={:02}:{:02}:{:02}.{:02} bitrate= 800.0kbits/s speed={}x\r",
        total_cs / 360_000,
        (total_cs % 360_000) / 6000,
        (total_cs % 6000) / 100,
        total_cs % 100,
        speed
    )
}

pub fn is_probe(args: &[String]) -> bool {
    args.len() == 3 && args[0] == "-hide_banner" && args[1] == "-i"
}

pub fn is_merge(args: &[String]) -> bool {
    args.iter().any(|a| a == "-filter_complex")
}

/// Configuration with every directory under `root`
pub fn test_config(root: &Path) -> ReelmuxConfig {
    let mut config = ReelmuxConfig::default();
    config.encoder.ffmpeg_path = PathBuf::from("ffmpeg");
    config.output.directory = root.join("output");
    config.preview.scratch_directory = root.join("scratch");
    config
}

/// Signed 16-bit little-endian samples
pub fn pcm(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Files left directly under `dir` (none when it does not exist)
pub fn entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(read) => read.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}
