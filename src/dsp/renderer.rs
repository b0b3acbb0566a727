//! WAV renderer: encodes a synth's scheduled tones as a WAV byte buffer.

use super::synth::Synth;

/// Render everything scheduled on `synth` as 16-bit stereo PCM WAV.
pub fn render_wav(synth: &Synth) -> Vec<u8> {
    let pcm = synth.render_pcm_i16();
    encode_wav(&pcm, synth.sample_rate() as u32, 2)
}

/// Wrap interleaved i16 samples in a RIFF/WAVE container.
pub fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let block_align = channels * (bits_per_sample / 8);
    let byte_rate = sample_rate * block_align as u32;
    let data_size = (samples.len() * 2) as u32;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_size).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::{Tone, ToneSink};

    fn le_u32(bytes: &[u8]) -> u32 {
        u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    #[test]
    fn wav_header_valid() {
        let mut synth = Synth::new(22050.0);
        synth.play_tone(Tone::blip(440.0, 100.0, 0.2));
        let wav = render_wav(&synth);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(le_u32(&wav[24..28]), 22050);
        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 2);
        assert_eq!(le_u32(&wav[4..8]) as usize, wav.len() - 8);
    }

    #[test]
    fn data_size_matches_clock() {
        let mut synth = Synth::new(44100.0);
        synth.advance(500.0);
        let wav = render_wav(&synth);
        // 0.5 s · 22050 frames · 2 channels · 2 bytes
        assert_eq!(le_u32(&wav[40..44]), 88200);
        assert_eq!(wav.len(), 44 + 88200);
    }

    #[test]
    fn rendered_phrase_is_not_silent() {
        let mut synth = Synth::new(22050.0);
        for (k, hz) in [220.0, 277.18, 329.63].into_iter().enumerate() {
            synth.play_tone(Tone::blip(hz, 200.0, 0.2).delayed(200.0 * k as f64));
        }
        let wav = render_wav(&synth);
        let loud = wav[44..]
            .chunks_exact(2)
            .any(|b| i16::from_le_bytes([b[0], b[1]]) != 0);
        assert!(loud, "rendered WAV should contain audio");
    }
}
