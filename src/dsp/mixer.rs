//! Mixer: sums overlapping voices into one block with master gain.

#[derive(Debug, Clone)]
pub struct Mixer {
    pub master_gain: f64,
    buffer: Vec<f64>,
}

impl Default for Mixer {
    fn default() -> Self {
        Mixer::new(1.0)
    }
}

impl Mixer {
    pub fn new(master_gain: f64) -> Self {
        Mixer {
            master_gain,
            buffer: Vec::new(),
        }
    }

    /// Zero a block of `len` samples.
    pub fn clear(&mut self, len: usize) {
        self.buffer.clear();
        self.buffer.resize(len, 0.0);
    }

    /// Accumulate into slot `index`; out-of-block writes are dropped.
    pub fn add(&mut self, index: usize, sample: f64) {
        if let Some(slot) = self.buffer.get_mut(index) {
            *slot += sample;
        }
    }

    /// The block with gain and soft clipping applied, appended to `out`.
    pub fn drain_into(&self, out: &mut Vec<f64>) {
        out.extend(self.buffer.iter().map(|&s| soft_clip(s * self.master_gain)));
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// tanh saturation: many simultaneous tones bend rather than wrap.
fn soft_clip(x: f64) -> f64 {
    x.tanh()
}
