//! Time source

/// Monotonic millisecond clock with a blocking delay
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    fn now_millis(&mut self) -> u64;

    /// Block for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now_millis(&mut self) -> u64 {
        (**self).now_millis()
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
