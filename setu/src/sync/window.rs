//! Fixed-capacity sliding window for frame alignment
//!
//! Sliding by one byte is O(1): the read position advances and the new byte
//! lands in the slot just freed, instead of shifting every byte left.

/// Ring buffer holding at most `N` bytes
pub struct SlidingWindow<const N: usize> {
    data: [u8; N],
    tail: usize, // Read position (oldest byte)
    len: usize,  // Number of bytes held
}

impl<const N: usize> SlidingWindow<N> {
    /// Create a new empty window
    pub const fn new() -> Self {
        Self {
            data: [0u8; N],
            tail: 0,
            len: 0,
        }
    }

    /// Append bytes to the window
    ///
    /// Bytes that would overflow are silently dropped.
    #[inline]
    pub fn extend(&mut self, bytes: &[u8]) {
        for &b in bytes {
            if !self.push(b) {
                break;
            }
        }
    }

    /// Append one byte, returns false if the window is already full
    #[inline]
    pub fn push(&mut self, byte: u8) -> bool {
        if self.len == N {
            return false;
        }
        self.data[(self.tail + self.len) % N] = byte;
        self.len += 1;
        true
    }

    /// Drop n bytes from the front - O(1)
    #[inline]
    pub fn advance(&mut self, n: usize) {
        let n = n.min(self.len);
        self.tail = (self.tail + n) % N;
        self.len -= n;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Read byte at logical index (handles wraparound)
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        if index < self.len {
            Some(self.data[(self.tail + index) % N])
        } else {
            None
        }
    }

    /// Oldest byte in the window
    #[inline]
    pub fn first(&self) -> Option<u8> {
        self.get(0)
    }

    /// Newest byte in the window
    #[inline]
    pub fn last(&self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        self.get(self.len - 1)
    }

    /// Copy the window out in logical order
    ///
    /// Returns `None` unless the window is full.
    pub fn to_array(&self) -> Option<[u8; N]> {
        if !self.is_full() {
            return None;
        }
        let mut out = [0u8; N];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.data[(self.tail + i) % N];
        }
        Some(out)
    }
}

impl<const N: usize> Default for SlidingWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
