use std::collections::VecDeque;
use std::time::{Duration, Instant};

const FPS_SAMPLES: usize = 100;

#[derive(Debug)]
pub struct FrameClock {
    start: Instant,
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    samples: VecDeque<f32>,
    fixed_interval: Duration,
    fixed_accumulator: Duration,
}

impl FrameClock {
    pub fn new(fixed_interval: Duration) -> FrameClock {
        let now = Instant::now();
        FrameClock {
            start: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            samples: VecDeque::with_capacity(FPS_SAMPLES),
            fixed_interval,
            fixed_accumulator: Duration::ZERO,
        }
    }

    pub fn update(&mut self) {
        let now = Instant::now();
        let delta = now - self.last_frame;
        self.last_frame = now;
        self.advance(delta);
    }

    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.frame_count += 1;
        self.fixed_accumulator += delta;

        if self.samples.len() == FPS_SAMPLES {
            self.samples.pop_front();
        }

        self.samples.push_back(delta.as_secs_f32());
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn runtime(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }

        let spf = self.samples.iter().sum::<f32>() / (self.samples.len() as f32);
        if spf > 0.0 {
            1.0 / spf
        } else {
            0.0
        }
    }

    pub fn should_fixed_update(&mut self) -> bool {
        if self.fixed_interval.is_zero() || self.fixed_accumulator < self.fixed_interval {
            return false;
        }

        self.fixed_accumulator -= self.fixed_interval;
        true
    }

    pub fn fixed_update_interval(&self) -> Duration {
        self.fixed_interval
    }

    pub fn set_fixed_update_interval(&mut self, interval: Duration) {
        self.fixed_interval = interval;
    }

    pub fn reset(&mut self) {
        *self = FrameClock::new(self.fixed_interval);
    }
}
