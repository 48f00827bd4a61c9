/*!
 * PID Allocation
 *
 * Bitmap over `[MIN_PID, MIN_PID + limit)`. Allocation always hands out the
 * lowest free identifier. Not synchronized: the process table owns the
 * bitmap and only touches it under the table lock.
 */

use crate::core::limits::{MIN_PID, PID_SPACE};
use crate::core::types::Pid;

const WORD_BITS: usize = u64::BITS as usize;

#[derive(Debug, Clone)]
pub struct PidBitmap {
    words: Vec<u64>,
    limit: usize,
    used: usize,
}

impl PidBitmap {
    /// Bitmap covering `limit` identifiers starting at `MIN_PID`.
    ///
    /// `limit` is clamped to `1..=PID_SPACE`.
    pub fn new(limit: usize) -> Self {
        let limit = limit.clamp(1, PID_SPACE);
        Self {
            words: vec![0; limit.div_ceil(WORD_BITS)],
            limit,
            used: 0,
        }
    }

    /// Mark the lowest free PID used and return it
    pub fn alloc(&mut self) -> Option<Pid> {
        if self.used == self.limit {
            return None;
        }
        for (w, word) in self.words.iter_mut().enumerate() {
            if *word == u64::MAX {
                continue;
            }
            let bit = (!*word).trailing_zeros() as usize;
            let index = w * WORD_BITS + bit;
            if index >= self.limit {
                return None;
            }
            *word |= 1 << bit;
            self.used += 1;
            return Some(Self::pid_of(index));
        }
        None
    }

    /// Return `pid` to the free pool. Returns false if it was not allocated.
    pub fn release(&mut self, pid: Pid) -> bool {
        let Some(index) = self.index_of(pid) else {
            return false;
        };
        let (w, mask) = (index / WORD_BITS, 1u64 << (index % WORD_BITS));
        if self.words[w] & mask == 0 {
            return false;
        }
        self.words[w] &= !mask;
        self.used -= 1;
        true
    }

    #[cfg(test)]
    fn is_used(&self, pid: Pid) -> bool {
        self.index_of(pid)
            .map(|index| self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0)
            .unwrap_or(false)
    }

    #[inline]
    pub fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn limit(&self) -> usize {
        self.limit
    }

    fn index_of(&self, pid: Pid) -> Option<usize> {
        if pid < MIN_PID {
            return None;
        }
        let index = (pid - MIN_PID) as usize;
        (index < self.limit).then_some(index)
    }

    fn pid_of(index: usize) -> Pid {
        MIN_PID + index as Pid
    }
}
