//! Tail-buffer protocol shared by every streaming pitch estimator and
//! the phase-vocoder pipeline: accumulate input until a full frame is
//! available, slide over it, and carry the unconsumed remainder
//! forward to the next call.
//!
//! Splitting a stream into chunks and concatenating the frames each
//! chunk produces must equal the frames a single call over the whole
//! stream would produce, up to a deferred tail shorter than
//! `slideLength`. That property is this module's reason to exist.

use crate::error::{AuroraError, AuroraResult};

/// Where a stream currently sits relative to its next full frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// No carried-over samples.
    Empty,
    /// Carrying `tailLength` prior samples, non-negative.
    Accumulating,
    /// `|tailLength|` samples of the next input must be discarded
    /// before anything counts toward a frame.
    Skipping,
}

/// Frame materializer with an elastic active buffer and a carried tail.
pub struct StreamingFrameEngine {
    fft_length: usize,
    slide_length: usize,
    is_continue: bool,
    tail_buffer: Vec<f32>,
    tail_length: i64,
    active_buffer: Vec<f32>,
}

impl StreamingFrameEngine {
    pub fn new(fft_length: usize, slide_length: usize, is_continue: bool) -> AuroraResult<Self> {
        if fft_length == 0 {
            return Err(AuroraError::param_range("fft_length", "must be > 0"));
        }
        if slide_length == 0 {
            return Err(AuroraError::param_range("slide_length", "must be > 0"));
        }
        Ok(Self {
            fft_length,
            slide_length,
            is_continue,
            tail_buffer: Vec::new(),
            tail_length: 0,
            active_buffer: Vec::new(),
        })
    }

    pub fn fft_length(&self) -> usize {
        self.fft_length
    }

    pub fn slide_length(&self) -> usize {
        self.slide_length
    }

    pub fn state(&self) -> StreamState {
        if self.tail_length == 0 {
            StreamState::Empty
        } else if self.tail_length > 0 {
            StreamState::Accumulating
        } else {
            StreamState::Skipping
        }
    }

    /// Feeds `data` in and returns every full `fftLength` frame the
    /// call produced, each hopping `slideLength` samples from the
    /// last. Returns an empty vector (not an error) when there isn't
    /// yet enough data for one frame.
    pub fn process(&mut self, data: &[f32]) -> Vec<Vec<f32>> {
        let data_length = data.len() as i64;
        let total: i64 = if self.is_continue {
            self.tail_length + data_length
        } else {
            data_length
        };

        if total < self.fft_length as i64 {
            if self.is_continue {
                if self.tail_length >= 0 {
                    self.tail_buffer.extend_from_slice(data);
                } else {
                    let skip = (-self.tail_length) as usize;
                    if skip < data.len() {
                        self.tail_buffer.extend_from_slice(&data[skip..]);
                    }
                }
            }
            self.tail_length = total;
            return Vec::new();
        }

        let fft_len = self.fft_length as i64;
        let slide_len = self.slide_length as i64;
        let time_length = ((total - fft_len) / slide_len + 1) as usize;
        let new_tail_len = (total - fft_len) % slide_len + (fft_len - slide_len);

        let prev_tail = self.tail_length.max(0) as usize;
        let skip = (-self.tail_length.min(0)) as usize;

        let demand = prev_tail + data.len().saturating_sub(skip);
        if self.active_buffer.capacity() < demand {
            #[cfg(feature = "debug-log")]
            log::debug!("active buffer growing {} -> {demand}", self.active_buffer.capacity());
            self.active_buffer.reserve(demand - self.active_buffer.capacity());
        } else if self.active_buffer.capacity() > 2 * demand.max(1) {
            #[cfg(feature = "debug-log")]
            log::debug!("active buffer shrinking {} -> {demand}", self.active_buffer.capacity());
            self.active_buffer.shrink_to(demand);
        }
        self.active_buffer.clear();
        self.active_buffer.extend_from_slice(&self.tail_buffer[..prev_tail]);
        self.active_buffer.extend_from_slice(&data[skip.min(data.len())..]);

        let mut frames = Vec::with_capacity(time_length);
        for t in 0..time_length {
            let start = t * self.slide_length;
            frames.push(self.active_buffer[start..start + self.fft_length].to_vec());
        }

        if self.is_continue {
            if new_tail_len >= 0 {
                let nt = new_tail_len as usize;
                let start = self.active_buffer.len().saturating_sub(nt);
                self.tail_buffer = self.active_buffer[start..].to_vec();
            } else {
                self.tail_buffer.clear();
            }
        } else {
            self.tail_buffer.clear();
        }
        self.tail_length = new_tail_len;

        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_emits_no_frames() {
        let mut engine = StreamingFrameEngine::new(64, 16, true).unwrap();
        let frames = engine.process(&vec![0.0; 10]);
        assert!(frames.is_empty());
        assert_eq!(engine.state(), StreamState::Accumulating);
    }

    #[test]
    fn single_shot_matches_frame_count() {
        let mut engine = StreamingFrameEngine::new(64, 16, false).unwrap();
        let data: Vec<f32> = (0..200).map(|i| i as f32).collect();
        let frames = engine.process(&data);
        assert_eq!(frames.len(), (200 - 64) / 16 + 1);
        assert_eq!(frames[0], data[0..64]);
    }

    #[test]
    fn chunked_stream_matches_single_shot_modulo_tail() {
        let data: Vec<f32> = (0..500).map(|i| (i as f32 * 0.01).sin()).collect();

        let mut single = StreamingFrameEngine::new(64, 16, true).unwrap();
        let whole = single.process(&data);

        let mut chunked = StreamingFrameEngine::new(64, 16, true).unwrap();
        let mut pieces = Vec::new();
        for chunk in data.chunks(37) {
            pieces.extend(chunked.process(chunk));
        }

        assert_eq!(pieces.len(), whole.len());
        for (a, b) in pieces.iter().zip(whole.iter()) {
            assert_eq!(a, b);
        }
    }
}
