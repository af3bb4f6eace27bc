//! Frame pacing and cooperative stop

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Rolling frame rate over the last few frames
#[derive(Debug)]
pub struct FpsCounter {
    frame_times: VecDeque<f32>,
    last_frame: Instant,
    sample_count: usize,
}

impl FpsCounter {
    pub fn new(sample_count: usize) -> Self {
        let sample_count = sample_count.max(1);
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            sample_count,
        }
    }

    /// Record a frame boundary.
    /// Returns (delta_time, average_fps)
    pub fn tick(&mut self) -> (f32, f32) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }
        (dt, self.average_fps())
    }

    pub fn average_fps(&self) -> f32 {
        let avg_dt: f32 =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len().max(1) as f32;
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            0.0
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_times.len()
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(60)
    }
}

/// Sleeps a fixed interval per frame. Jitter is expected; this is pacing, not timing.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    fps: FpsCounter,
    last_report: Instant,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            fps: FpsCounter::default(),
            last_report: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep, then record the frame. Yields the average fps about once a second.
    pub fn tick(&mut self) -> Option<f32> {
        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }
        let (_, fps) = self.fps.tick();
        if self.last_report.elapsed() >= Duration::from_secs(1) {
            self.last_report = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}

/// Shared flag asking a render loop to finish its current frame and exit
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_window_is_bounded() {
        let mut fps = FpsCounter::new(3);
        for _ in 0..10 {
            fps.tick();
        }
        assert_eq!(fps.frame_count(), 3);
    }

    #[test]
    fn test_pacer_sleeps_interval() {
        let mut pacer = FramePacer::new(Duration::from_millis(5));
        let start = Instant::now();
        pacer.tick();
        pacer.tick();
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_stop_flag_is_shared() {
        let flag = StopFlag::new();
        let other = flag.clone();
        assert!(!flag.is_stopped());
        std::thread::spawn(move || other.stop()).join().unwrap();
        assert!(flag.is_stopped());
    }
}
