use super::{FAT16_ENTRIES_PER_SECTOR, FIRST_CLUSTER, PROF_16_CLUSTER_COUNT, SECTOR_SIZE};

/// Media descriptor and reserved entries opening every FAT
pub const FAT16_PREAMBLE: [u16; 2] = [0xFFF8, 0xFFFF];

/// Cluster chain terminator
pub const END_OF_CHAIN: u16 = 0xFFFF;

/// Last cluster of the exported file
const LAST_CLUSTER: u16 = FIRST_CLUSTER + PROF_16_CLUSTER_COUNT - 1;

/// Generate one sector of the FAT.
///
/// `written` is the number of FAT entries already emitted by earlier calls,
/// not counting the preamble, and the returned value is the updated count.
/// The first call (`written == 0`) also emits the preamble. Entry `k` of the
/// file chain links to `k + 1`, the last cluster holds [`END_OF_CHAIN`].
/// Generation is complete once `PROF_16_CLUSTER_COUNT` is returned; unused
/// entries of the final sector are left free (zero).
pub fn generate_fat16(block: &mut [u8; SECTOR_SIZE], written: u16) -> u16 {
    for b in block.iter_mut() {
        *b = 0;
    }

    let mut entries = block.chunks_exact_mut(2);

    // The preamble takes the place of the first two chain entries
    let preamble: &[u16] = if written == 0 { &FAT16_PREAMBLE } else { &[] };

    let remaining = PROF_16_CLUSTER_COUNT.saturating_sub(written) as usize;
    let count = usize::min(remaining, FAT16_ENTRIES_PER_SECTOR) - preamble.len();

    for (v, e) in preamble.iter().zip(entries.by_ref()) {
        e.copy_from_slice(&v.to_le_bytes());
    }

    // Value of the first entry emitted by this call
    let start = FIRST_CLUSTER + 1 + written;

    for (i, e) in entries.take(count).enumerate() {
        let next = start + i as u16;
        let v = if next > LAST_CLUSTER { END_OF_CHAIN } else { next };
        e.copy_from_slice(&v.to_le_bytes());
    }

    crate::trace!("FAT chunk at {}: {} entries", written, count);

    written + count as u16
}

/// Iterator over the FAT one sector at a time
///
/// Yields the sectors holding the preamble and the file chain; the rest of
/// the FAT is free and not produced.
#[derive(Clone, Debug, Default)]
pub struct FatChunks {
    written: u16,
}

impl FatChunks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries generated so far, excluding the preamble
    pub fn written(&self) -> u16 {
        self.written
    }
}

impl Iterator for FatChunks {
    type Item = [u8; SECTOR_SIZE];

    fn next(&mut self) -> Option<Self::Item> {
        if self.written >= PROF_16_CLUSTER_COUNT {
            return None;
        }

        let mut block = [0u8; SECTOR_SIZE];
        self.written = generate_fat16(&mut block, self.written);

        Some(block)
    }
}
