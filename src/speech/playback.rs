//! Audio playback for synthesized speech
//!
//! Plays MP3 speech audio to the default output device. At most one
//! utterance is audible at a time: starting a new playback cancels the
//! current one. The cpal stream lives on a dedicated thread because it is
//! not `Send`; cancellation goes through a shared stop flag.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};

use crate::{Error, Result};

/// Sample rate for playback (matches common TTS output)
const PLAYBACK_SAMPLE_RATE: u32 = 24000;

/// Poll interval while waiting for a stream to drain
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cancellable speech playback
#[derive(Debug, Default)]
pub struct Playback {
    current: Mutex<Option<Arc<AtomicBool>>>,
}

impl Playback {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode MP3 bytes and play them, cancelling any current utterance
    ///
    /// # Errors
    ///
    /// Returns error if decoding fails; device errors after that are
    /// logged on the playback thread
    pub fn play_mp3(&self, mp3_data: &[u8]) -> Result<()> {
        let samples = decode_mp3(mp3_data)?;
        self.play_samples(samples);
        Ok(())
    }

    /// Play raw f32 samples, cancelling any current utterance
    pub fn play_samples(&self, samples: Vec<f32>) {
        let stop = Arc::new(AtomicBool::new(false));

        {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(prev) = current.replace(Arc::clone(&stop)) {
                prev.store(true, Ordering::SeqCst);
            }
        }

        std::thread::spawn(move || {
            if let Err(e) = run_stream(&samples, &stop) {
                tracing::error!(error = %e, "speech playback failed");
            }
        });
    }

    /// Cancel the current utterance, if any
    pub fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(stop) = current.take() {
            stop.store(true, Ordering::SeqCst);
        }
    }
}

/// Feed samples through a cpal output stream until they drain, the stop
/// flag is raised, or the duration-derived timeout passes
fn run_stream(samples: &[f32], stop: &Arc<AtomicBool>) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

    let supported_config = device
        .supported_output_configs()
        .map_err(|e| Error::Audio(e.to_string()))?
        .find(|c| {
            c.channels() == 1
                && c.min_sample_rate() <= SampleRate(PLAYBACK_SAMPLE_RATE)
                && c.max_sample_rate() >= SampleRate(PLAYBACK_SAMPLE_RATE)
        })
        .or_else(|| {
            // Fallback: try stereo
            device.supported_output_configs().ok()?.find(|c| {
                c.channels() == 2
                    && c.min_sample_rate() <= SampleRate(PLAYBACK_SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(PLAYBACK_SAMPLE_RATE)
            })
        })
        .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;

    let config: StreamConfig = supported_config
        .with_sample_rate(SampleRate(PLAYBACK_SAMPLE_RATE))
        .config();
    let channels = config.channels as usize;

    let samples = Arc::new(samples.to_vec());
    let position = Arc::new(Mutex::new(0usize));
    let finished = Arc::new(AtomicBool::new(false));

    let cb_samples = Arc::clone(&samples);
    let cb_position = Arc::clone(&position);
    let cb_finished = Arc::clone(&finished);

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut pos = cb_position.lock().unwrap_or_else(|e| e.into_inner());

                for frame in data.chunks_mut(channels) {
                    let sample = if *pos < cb_samples.len() {
                        cb_samples[*pos]
                    } else {
                        cb_finished.store(true, Ordering::SeqCst);
                        0.0
                    };

                    for out in frame.iter_mut() {
                        *out = sample;
                    }

                    if *pos < cb_samples.len() {
                        *pos += 1;
                    }
                }
            },
            |err| {
                tracing::error!(error = %err, "audio playback error");
            },
            None,
        )
        .map_err(|e| Error::Audio(e.to_string()))?;

    stream.play().map_err(|e| Error::Audio(e.to_string()))?;

    let duration_ms = (samples.len() as u64 * 1000) / u64::from(PLAYBACK_SAMPLE_RATE);
    let timeout = Duration::from_millis(duration_ms + 500);
    let start = Instant::now();

    while !finished.load(Ordering::SeqCst) && !stop.load(Ordering::SeqCst) {
        if start.elapsed() > timeout {
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    drop(stream);
    tracing::debug!(
        samples = samples.len(),
        cancelled = stop.load(Ordering::SeqCst),
        "playback finished"
    );

    Ok(())
}

/// Decode MP3 bytes to mono f32 samples
fn decode_mp3(mp3_data: &[u8]) -> Result<Vec<f32>> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                let frame_samples: Vec<f32> = if frame.channels == 2 {
                    // Stereo: average channels
                    frame
                        .data
                        .chunks(2)
                        .map(|chunk| {
                            let left = f32::from(chunk[0]) / 32768.0;
                            let right =
                                f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                            f32::midpoint(left, right)
                        })
                        .collect()
                } else {
                    frame.data.iter().map(|&s| f32::from(s) / 32768.0).collect()
                };

                samples.extend(frame_samples);
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    Ok(samples)
}
