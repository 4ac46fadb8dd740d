use log::{error, trace};

/// Packs bits into an in-memory byte buffer, most significant bit first.
#[derive(Debug, Default)]
pub struct BitWriter {
    pub output: Vec<u8>,
    queue: u64,
    q_bits: u8,
}

impl BitWriter {
    /// Create a new BitWriter with an output buffer of the size specified (in bytes).
    /// Call flush() before taking the output or the final partial byte will be lost.
    pub fn new(size: usize) -> Self {
        Self {
            output: Vec::with_capacity(size),
            queue: 0,
            q_bits: 0,
        }
    }

    /// Internal bitstream write function common to all out functions.
    fn write_stream(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
    }

    /// Puts a single bit on the stream.
    pub fn out_bit(&mut self, bit: bool) {
        self.queue = (self.queue << 1) | bit as u64;
        self.q_bits += 1;
        self.write_stream();
    }

    /*
    NOTE: out_bits takes the value aligned to the least significant bit. Only the low
    `depth` bits are written, so out_bits(0b1011, 3) writes 011.
    */
    /// Writes the low `depth` bits (0-32) of `data`.
    pub fn out_bits(&mut self, data: u32, depth: u8) {
        if depth == 0 {
            return;
        }
        let mask = if depth >= 32 {
            u32::MAX
        } else {
            (1_u32 << depth) - 1
        };
        self.queue <<= depth; //shift queue by bit length
        self.queue |= (data & mask) as u64; //add data portion to queue
        self.q_bits += depth; //update depth of queue bits
        self.write_stream();
    }

    /// Number of bits written so far, including any still waiting in the queue.
    pub fn bit_len(&self) -> u64 {
        self.output.len() as u64 * 8 + self.q_bits as u64
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// signficant bits
    pub fn flush(&mut self) {
        if self.q_bits > 0 {
            trace!("BitWriter padding the final byte with {} zero bits", 8 - self.q_bits);
            self.queue <<= 8 - self.q_bits; //pad the queue with zeros
            self.q_bits += 8 - self.q_bits;
            self.write_stream(); // write out all that is left
            if self.q_bits > 0 {
                error!("Stuff left in the BitWriter queue.");
            }
        }
    }

    /// Flush and hand back the packed bytes.
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.flush();
        self.output
    }

    /// Debugging function to return the number of bytes.bits output so far
    pub fn loc(&self) -> String {
        format!("[{}.{}]", self.bit_len() / 8, self.bit_len() % 8)
    }
}
