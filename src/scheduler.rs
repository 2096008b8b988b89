//! Wall-clock scheduling for the CPU and the 60Hz timers.
//!
//! Both clocks count ticks since a shared epoch. Tick `n` of a clock running
//! at `hz` is due at `epoch + n * 1000 / hz` ms (integer division), so a
//! clock never drifts against the wall clock no matter how irregularly the
//! host polls. Each `advance` runs every tick due before `now`, earliest
//! first.

use log::{debug, error};

use crate::chip8::Machine;
use crate::config::TIMER_HZ;
use crate::error::Fault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tick {
    Cpu,
    Timer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Clock {
    epoch: u32,
    cpu_ticks: u64,
    timer_ticks: u64,
}

impl Clock {
    pub(crate) fn new(epoch: u32) -> Self {
        Self {
            epoch,
            cpu_ticks: 0,
            timer_ticks: 0,
        }
    }

    /// Anchor both clocks at `now` with no ticks consumed.
    pub(crate) fn reset(&mut self, now: u32) {
        *self = Self::new(now);
    }

    pub(crate) fn epoch(&self) -> u32 {
        self.epoch
    }

    pub(crate) fn cpu_ticks(&self) -> u64 {
        self.cpu_ticks
    }

    pub(crate) fn timer_ticks(&self) -> u64 {
        self.timer_ticks
    }

    fn deadline(&self, ticks: u64, hz: u32) -> Option<u64> {
        let ms = ticks.checked_mul(1000)? / hz.max(1) as u64;
        ms.checked_add(self.epoch as u64)
    }

    /// The next tick due strictly before `now`, CPU first on a tie.
    ///
    /// If a deadline can no longer be computed the counters have run out;
    /// the clock is re-anchored at `now`, which leaves nothing due.
    pub(crate) fn next_due(&mut self, now: u32, cpu_hz: u32) -> Option<Tick> {
        let (cpu, timer) = match (
            self.deadline(self.cpu_ticks, cpu_hz),
            self.deadline(self.timer_ticks, TIMER_HZ),
        ) {
            (Some(cpu), Some(timer)) => (cpu, timer),
            _ => {
                debug!("tick counters exhausted, re-anchoring clock at {} ms", now);
                self.reset(now);
                return None;
            }
        };
        let now = now as u64;

        if cpu < now && cpu <= timer {
            Some(Tick::Cpu)
        } else if timer < now {
            Some(Tick::Timer)
        } else {
            None
        }
    }

    pub(crate) fn consume(&mut self, tick: Tick) {
        match tick {
            Tick::Cpu => self.cpu_ticks = self.cpu_ticks.saturating_add(1),
            Tick::Timer => self.timer_ticks = self.timer_ticks.saturating_add(1),
        }
    }

    fn rate(&self, ticks: u64, now: u32) -> u64 {
        let elapsed_secs = now.saturating_sub(self.epoch) as u64 / 1000;
        if elapsed_secs == 0 {
            return 0;
        }
        ticks / elapsed_secs
    }
}

impl Machine {
    /// Catch the machine up to the wall-clock time `now_ms`.
    ///
    /// A pending key wait is resolved first; the call that resolves it runs
    /// no ticks. Otherwise CPU and timer ticks due before `now_ms` run in
    /// deadline order. While waiting for a key or after an exit, CPU ticks
    /// still elapse but execute nothing. The first fault stops the loop and
    /// is returned with the machine as of the last good tick.
    pub fn advance(&mut self, now_ms: u32) -> Result<(), Fault> {
        if now_ms < self.clock.epoch() {
            debug!("clock went back from {} to {} ms, re-anchoring", self.clock.epoch(), now_ms);
            self.clock.reset(now_ms);
        }

        if self.resume_key_wait() {
            return Ok(());
        }

        let cpu_hz = self.config().cpu_hz;
        while let Some(tick) = self.clock.next_due(now_ms, cpu_hz) {
            match tick {
                Tick::Cpu => {
                    if let Err(fault) = self.step() {
                        error!("{}", fault);
                        return Err(fault);
                    }
                }
                Tick::Timer => self.decrement_timers(),
            }
            self.clock.consume(tick);
        }

        Ok(())
    }

    /// Measured instructions per second since the epoch, 0 within the first second.
    pub fn cpu_rate_hz(&self, now_ms: u32) -> u64 {
        self.clock.rate(self.clock.cpu_ticks(), now_ms)
    }

    /// Measured timer ticks per second since the epoch, 0 within the first second.
    pub fn timer_rate_hz(&self, now_ms: u32) -> u64 {
        self.clock.rate(self.clock.timer_ticks(), now_ms)
    }
}
