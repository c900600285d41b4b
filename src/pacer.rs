/*
 *  pacer.rs
 *
 *  NetMonS - host identity at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */
use std::thread;
use std::time::{Duration, Instant};

use crate::constants::MAX_REFRESH_SECS;

/// Intervals are capped here so a deadline always fits in an `Instant`.
const MAX_INTERVAL: Duration = Duration::from_secs(MAX_REFRESH_SECS);

/// Deadline based interval timer.
///
/// `mark` starts a new interval from now, `wait` blocks until it has run
/// out. Marking right after a frame is pushed keeps frames at least one
/// interval apart however long the frame took.
pub struct Pacer {
    next_deadline: Instant,
    interval: Duration,
}

impl Pacer {
    /// Due immediately
    pub fn new(interval: Duration) -> Self {
        Self { next_deadline: Instant::now(), interval: interval.min(MAX_INTERVAL) }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.min(MAX_INTERVAL);
    }

    #[inline]
    pub fn mark(&mut self) {
        self.next_deadline = Instant::now() + self.interval;
    }

    #[inline]
    pub fn is_due(&self) -> bool {
        Instant::now() >= self.next_deadline
    }

    /// Time left before the deadline, zero when already due.
    pub fn remaining(&self) -> Duration {
        self.next_deadline.saturating_duration_since(Instant::now())
    }

    pub fn wait(&self) {
        // sleep may return early, loop until really due
        while !self.is_due() {
            thread::sleep(self.remaining());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_due() {
        let pacer = Pacer::new(Duration::from_secs(10));
        assert!(pacer.is_due());
        assert_eq!(pacer.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_mark_starts_interval() {
        let mut pacer = Pacer::new(Duration::from_secs(10));
        pacer.mark();
        assert!(!pacer.is_due());
        assert!(pacer.remaining() > Duration::from_secs(9));
    }

    #[test]
    fn test_wait_honours_interval() {
        let interval = Duration::from_millis(40);
        let mut pacer = Pacer::new(interval);
        let start = Instant::now();
        pacer.mark();
        pacer.wait();
        assert!(start.elapsed() >= interval);
        assert!(pacer.is_due());
    }

    #[test]
    fn test_huge_interval_is_capped() {
        let mut pacer = Pacer::new(Duration::from_secs(u64::MAX));
        assert_eq!(pacer.interval(), MAX_INTERVAL);
        pacer.mark();
        assert!(!pacer.is_due());

        pacer.set_interval(Duration::MAX);
        assert_eq!(pacer.interval(), MAX_INTERVAL);
    }

    #[test]
    fn test_set_interval() {
        let mut pacer = Pacer::new(Duration::from_secs(1));
        pacer.set_interval(Duration::ZERO);
        pacer.mark();
        assert_eq!(pacer.interval(), Duration::ZERO);
        assert!(pacer.is_due());
    }
}
