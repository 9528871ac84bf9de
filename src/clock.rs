/// Monotonic millisecond time source used to space out reads.
pub trait Clock {
    /// Milliseconds since some fixed point, normally boot.
    ///
    /// The value may wrap at `u32::MAX`; the driver only ever looks at the
    /// wrapping difference between two readings.
    fn now_ms(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now_ms(&self) -> u32 {
        C::now_ms(self)
    }
}

/// Milliseconds elapsed from `since` to `now`, tolerating one wrap of the counter.
#[inline]
pub(crate) fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}
