use super::seed::SEED_SIZE_BYTES;

const ROUNDS: usize = 20;

// Fixed nonce words; the counter provides the only block-to-block variation.
const NONCE: [u32; 3] = [0xfa42_7c2c, 0x9422_e076, 0xb0ea_2065];

#[inline]
fn quarter_round(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(16);
    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(12);
    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(8);
    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(7);
}

fn chacha_block(out: &mut [u32; 16], input: &[u32; 16]) {
    let mut x = *input;
    // 10 loops x 2 rounds/loop = 20 rounds
    for _ in (0..ROUNDS).step_by(2) {
        // Column round
        quarter_round(&mut x, 0, 4, 8, 12);
        quarter_round(&mut x, 1, 5, 9, 13);
        quarter_round(&mut x, 2, 6, 10, 14);
        quarter_round(&mut x, 3, 7, 11, 15);
        // Diagonal round
        quarter_round(&mut x, 0, 5, 10, 15);
        quarter_round(&mut x, 1, 6, 11, 12);
        quarter_round(&mut x, 2, 7, 8, 13);
        quarter_round(&mut x, 3, 4, 9, 14);
    }
    for (o, (xi, i)) in out.iter_mut().zip(x.iter().zip(input.iter())) {
        *o = xi.wrapping_add(*i);
    }
}

/// ChaCha20-based deterministic `u32`/`u64` stream.
///
/// State layout: words 0..4 hold the "expand 32-byte k" constant, 4..12 the
/// key words assembled big-endian from the seed bytes, word 12 the block
/// counter and 13..16 a fixed nonce. Output words are served from a 16-word
/// window that is refilled (counter incremented, one block run) on demand.
#[derive(Debug, Clone)]
pub struct ChaChaRng {
    block: [u32; 16],
    out: [u32; 16],
    pos: usize,
}

impl ChaChaRng {
    pub fn from_seed(seed: &[u8; SEED_SIZE_BYTES]) -> Self {
        let mut block = [0u32; 16];
        for (word, chunk) in block[..4].iter_mut().zip(b"expand 32-byte k".chunks(4)) {
            *word = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        for (word, chunk) in block[4..12].iter_mut().zip(seed.chunks(4)) {
            *word = u32::from_be_bytes(chunk.try_into().unwrap());
        }
        block[12] = 0;
        block[13..].copy_from_slice(&NONCE);

        Self {
            block,
            out: [0; 16],
            pos: 16,
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        if self.pos >= 16 {
            self.block[12] = self.block[12].wrapping_add(1);
            chacha_block(&mut self.out, &self.block);
            self.pos = 0;
        }
        let result = self.out[self.pos];
        self.pos += 1;
        result
    }

    /// Two successive `next_u32` draws assembled as `hi << 32 | lo`, so the
    /// stream is identical regardless of window alignment.
    pub fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    /// Uniform draw on `[lo, hi)` via rejection sampling: values below
    /// `u32::MAX % (hi - lo)` are redrawn to eliminate the modulo bias.
    ///
    /// Callers must pass `lo < hi`.
    pub fn bounded(&mut self, lo: u32, hi: u32) -> u32 {
        debug_assert!(lo < hi, "bounded() requires lo < hi");
        let diff = hi - lo;
        let cutoff = u32::MAX % diff;
        loop {
            let x = self.next_u32();
            if x < cutoff {
                continue;
            }
            return (x % diff) + lo;
        }
    }
}
