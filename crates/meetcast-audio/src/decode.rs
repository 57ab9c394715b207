use crate::error::DecodeError;
use std::io::{Cursor, ErrorKind};
use std::path::Path;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info, warn};

/// Width of one decoded sample (s16le).
pub const BYTES_PER_SAMPLE: usize = 2;

/// Decoded PCM audio held wholly in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    pcm: Vec<u8>,
    sample_rate: u32,
    channels: usize,
}

impl AudioBuffer {
    /// Wraps raw interleaved s16le bytes.
    pub fn from_pcm(pcm: Vec<u8>, sample_rate: u32, channels: usize) -> Self {
        Self {
            pcm,
            sample_rate,
            channels,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pcm
    }

    pub fn len(&self) -> usize {
        self.pcm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Playback length at the decoded rate and layout.
    pub fn duration(&self) -> Duration {
        let bytes_per_second = self.sample_rate as u64 * (self.channels * BYTES_PER_SAMPLE) as u64;
        if bytes_per_second == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.pcm.len() as f64 / bytes_per_second as f64)
    }
}

impl std::fmt::Debug for AudioBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioBuffer")
            .field("bytes", &self.pcm.len())
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .finish()
    }
}

/// Reads and decodes the MP3 file at `path`.
pub fn load_audio(path: &Path) -> Result<AudioBuffer, DecodeError> {
    let bytes = std::fs::read(path).map_err(|e| read_error(path, e))?;
    decode_audio(bytes)
}

/// Reads the file asynchronously and decodes it on the blocking pool.
pub async fn load_audio_async(path: &Path) -> Result<AudioBuffer, DecodeError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| read_error(path, e))?;
    tokio::task::spawn_blocking(move || decode_audio(bytes))
        .await
        .map_err(|e| DecodeError::Task(e.to_string()))?
}

/// Decodes an in-memory MP3 stream into interleaved s16le PCM.
///
/// Packets the decoder reports as corrupt are skipped. The stream must yield
/// at least one sample.
pub fn decode_audio(bytes: Vec<u8>) -> Result<AudioBuffer, DecodeError> {
    let source_len = bytes.len();
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Unsupported(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoAudioTrack)?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::Codec(e.to_string()))?;

    let mut pcm = Vec::new();
    let mut sample_rate = codec_params.sample_rate.unwrap_or_default();
    let mut channels = codec_params.channels.map(|c| c.count()).unwrap_or_default();
    let mut skipped = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(DecodeError::Malformed(e.to_string())),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();

                let mut samples = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                samples.copy_interleaved_ref(decoded);
                pcm.reserve(samples.samples().len() * BYTES_PER_SAMPLE);
                for sample in samples.samples() {
                    pcm.extend_from_slice(&sample.to_le_bytes());
                }
            }
            Err(SymphoniaError::DecodeError(reason)) => {
                skipped += 1;
                debug!(reason, "skipping corrupt packet");
            }
            Err(e) => return Err(DecodeError::Malformed(e.to_string())),
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped corrupt packets while decoding");
    }
    if pcm.is_empty() {
        return Err(DecodeError::Empty);
    }

    let buffer = AudioBuffer::from_pcm(pcm, sample_rate, channels);
    info!(
        source_bytes = source_len,
        pcm_bytes = buffer.len(),
        sample_rate,
        channels,
        duration_ms = buffer.duration().as_millis() as u64,
        "decoded audio"
    );
    Ok(buffer)
}

fn read_error(path: &Path, e: std::io::Error) -> DecodeError {
    if e.kind() == ErrorKind::NotFound {
        DecodeError::NotFound(path.to_path_buf())
    } else {
        DecodeError::Read {
            path: path.to_path_buf(),
            source: e,
        }
    }
}
