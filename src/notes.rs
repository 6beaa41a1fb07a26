//! Monitored frequency table and its mapping onto spectrum bins.

/// Pitch class names, index 0 = C
pub const NOTES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Number of monitored frequencies (C0 through B8)
pub const NOTE_COUNT: usize = 108;

/// Table index of the 440 Hz reference
const A4_INDEX: usize = 57;
const A4_HZ: f32 = 440.0;

/// Note label for a table index, e.g. `label(69) == "A5"`
pub fn label(index: usize) -> String {
    format!("{}{}", NOTES[index % 12], index / 12)
}

/// Equal-tempered frequency (Hz) of a table index
pub fn equal_tempered(index: usize) -> f32 {
    let semitones = index as f32 - A4_INDEX as f32;
    A4_HZ * 2.0f32.powf(semitones / 12.0)
}

/// One monitored frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyEntry {
    /// Frequency (Hz)
    pub frequency: f32,
    /// Position in the table
    pub index: usize,
    /// Spectrum bin holding this frequency
    pub bin_index: usize,
}

/// Ordered monitored frequencies, built once per bin-size/bin-count pair.
///
/// Several entries may share a bin when the spectrum is coarser than the
/// note spacing; `bin_index` never decreases as `index` grows.
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    entries: Vec<FrequencyEntry>,
    bin_size_hz: f32,
    bin_count: usize,
}

impl FrequencyTable {
    /// Build the standard 108-note chromatic table.
    pub fn chromatic(bin_size_hz: f32, bin_count: usize) -> Self {
        let frequencies: Vec<f32> = (0..NOTE_COUNT).map(equal_tempered).collect();
        Self::new(&frequencies, bin_size_hz, bin_count)
    }

    /// Build a table from ascending frequencies.
    ///
    /// Bin indices are clamped to the last bin so lookups stay in bounds
    /// when a frequency sits above Nyquist.
    pub fn new(frequencies: &[f32], bin_size_hz: f32, bin_count: usize) -> Self {
        let last_bin = bin_count.saturating_sub(1);
        let entries = frequencies
            .iter()
            .enumerate()
            .map(|(index, &frequency)| FrequencyEntry {
                frequency,
                index,
                bin_index: ((frequency / bin_size_hz).floor() as usize).min(last_bin),
            })
            .collect();

        Self {
            entries,
            bin_size_hz,
            bin_count,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bin_size_hz(&self) -> f32 {
        self.bin_size_hz
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn entries(&self) -> &[FrequencyEntry] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> Option<&FrequencyEntry> {
        self.entries.get(index)
    }

    /// Spectrum bin for a table index; out-of-table indices clamp to the
    /// nearest boundary entry.
    pub fn index_to_bin(&self, index: usize) -> usize {
        match self.entries.len() {
            0 => 0,
            len => self.entries[index.min(len - 1)].bin_index,
        }
    }

    /// Spectrum bin for an arbitrary frequency (Hz), clamped to the spectrum.
    pub fn frequency_to_bin(&self, hz: f32) -> usize {
        let bin = (hz.max(0.0) / self.bin_size_hz).floor() as usize;
        bin.min(self.bin_count.saturating_sub(1))
    }
}
