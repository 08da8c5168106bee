/// Sound engine: procedural blips via rodio.
///
/// The fixed effects are rendered to in-memory WAV buffers once at start.
/// Merge blips are pitched by rank and rendered on demand.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Build without the "sound" feature to get a silent stub.

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::PI * 2.0;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_slide: Arc<Vec<u8>>,
        sfx_win: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::debug!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_slide: Arc::new(make_wav(&synth(&[220.0], 0.025, 0.12, Envelope::Decay, 0.0))),
                sfx_win: Arc::new(make_wav(&synth(&[523.0, 659.0, 784.0, 1047.0], 0.1, 0.3, Envelope::Soft, 0.3))),
                sfx_game_over: Arc::new(make_wav(&game_over_tune())),
            })
        }

        fn play_buf(&self, buf: Vec<u8>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            if let Ok(src) = rodio::Decoder::new(Cursor::new(buf)) {
                sink.append(src);
                sink.detach();
            }
        }

        pub fn play_slide(&self) { self.play_buf(self.sfx_slide.to_vec()); }
        pub fn play_win(&self) { self.play_buf(self.sfx_win.to_vec()); }
        pub fn play_game_over(&self) { self.play_buf(self.sfx_game_over.to_vec()); }

        /// Higher tiles ring higher: one semitone per rank above a 4.
        pub fn play_merge(&self, rank: u8) {
            let freq = 330.0 * 2f32.powf(rank.saturating_sub(2) as f32 / 12.0);
            self.play_buf(make_wav(&synth(&[freq], 0.06, 0.25, Envelope::Decay, 0.0)));
        }
    }

    // ── Synthesis ──

    #[derive(Clone, Copy)]
    enum Envelope {
        /// Ramp to silence across the note.
        Decay,
        /// Sag to 70% by the end of the note.
        Soft,
    }

    impl Envelope {
        fn gain(self, progress: f32) -> f32 {
            match self {
                Envelope::Decay => 1.0 - progress,
                Envelope::Soft => 1.0 - 0.3 * progress,
            }
        }
    }

    /// Equal-length notes back to back, mono f32 samples. `octave_mix`
    /// blends in the first overtone; 0.0 is a pure sine.
    fn synth(freqs: &[f32], note_secs: f32, volume: f32, env: Envelope, octave_mix: f32) -> Vec<f32> {
        let per_note = (SAMPLE_RATE as f32 * note_secs) as usize;
        freqs
            .iter()
            .flat_map(|&freq| {
                (0..per_note).map(move |i| {
                    let phase = i as f32 / SAMPLE_RATE as f32 * freq * TAU;
                    let wave = phase.sin() * (1.0 - octave_mix) + (2.0 * phase).sin() * octave_mix;
                    wave * env.gain(i as f32 / per_note as f32) * volume
                })
            })
            .collect()
    }

    /// A4 down to C4, last quarter faded out.
    fn game_over_tune() -> Vec<f32> {
        let mut samples = synth(&[440.0, 370.0, 311.0, 261.0], 0.12, 0.3, Envelope::Soft, 0.3);
        let tail = samples.len() / 4;
        let start = samples.len() - tail;
        for (k, s) in samples[start..].iter_mut().enumerate() {
            *s *= (tail - k) as f32 / tail as f32;
        }
        samples
    }

    /// 16-bit mono PCM in a RIFF/WAVE container, ready for `rodio::Decoder`.
    fn make_wav(samples: &[f32]) -> Vec<u8> {
        const CHANNELS: u16 = 1;
        const BITS: u16 = 16;
        const BLOCK: u16 = CHANNELS * BITS / 8;
        let data_len = samples.len() as u32 * BLOCK as u32;

        let header: [&[u8]; 12] = [
            b"RIFF",
            &(36 + data_len).to_le_bytes(),
            b"WAVEfmt ",
            &16u32.to_le_bytes(),
            &1u16.to_le_bytes(),
            &CHANNELS.to_le_bytes(),
            &SAMPLE_RATE.to_le_bytes(),
            &(SAMPLE_RATE * BLOCK as u32).to_le_bytes(),
            &BLOCK.to_le_bytes(),
            &BITS.to_le_bytes(),
            b"data",
            &data_len.to_le_bytes(),
        ];
        let mut wav = header.concat();

        wav.extend(
            samples
                .iter()
                .flat_map(|&s| ((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).to_le_bytes()),
        );
        wav
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_slide(&self) {}
    pub fn play_merge(&self, _rank: u8) {}
    pub fn play_win(&self) {}
    pub fn play_game_over(&self) {}
}
