use log::debug;
use std::time::{Duration, Instant};

// Paces the host's tick loop to a target frame rate and measures what it
// actually achieved.
#[derive(Debug)]
pub struct FpsEstimator {
    iteration_start: Instant,
    pub iteration_duration: Duration,
    smoothed_fps: f64,
}

static NATIVE_SLEEP_ACCURACY: Duration = Duration::from_micros(500);

// Weight of the newest frame in the smoothed rate.
const SMOOTHING: f64 = 0.1;

impl FpsEstimator {
    pub fn new(fps: f64) -> FpsEstimator {
        let fps = if fps > 0.0 { fps } else { 60.0 };
        FpsEstimator {
            iteration_start: Instant::now(),
            iteration_duration: Duration::from_secs_f64(1.0 / fps),
            smoothed_fps: fps,
        }
    }

    fn high_resolution_sleep_until(done: &Instant) {
        let now = Instant::now();
        let system_sleep_until = done.checked_sub(NATIVE_SLEEP_ACCURACY).unwrap_or(now);
        if now < system_sleep_until {
            std::thread::sleep(system_sleep_until.duration_since(now));
        }
        while Instant::now() < *done {
            std::hint::spin_loop();
        }
    }

    /// Blocks until the current frame's budget is spent, then starts the next
    /// one. Returns the duration of the frame that just ended.
    pub fn tick(&mut self) -> Duration {
        let sleep_until = self.iteration_start + self.iteration_duration;
        let now = Instant::now();
        if now > sleep_until {
            debug!("Over time budget by: {:?}", now - sleep_until);
        } else {
            FpsEstimator::high_resolution_sleep_until(&sleep_until);
        }
        let delta_t = self.iteration_start.elapsed();
        self.iteration_start = Instant::now();
        let secs = delta_t.as_secs_f64();
        if secs > 0.0 {
            self.smoothed_fps += SMOOTHING * (1.0 / secs - self.smoothed_fps);
        }
        delta_t
    }

    pub fn fps(&self) -> f64 {
        self.smoothed_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_from_rate() {
        let fps = FpsEstimator::new(50.0);
        assert_eq!(fps.iteration_duration, Duration::from_millis(20));
        assert_eq!(fps.fps(), 50.0);
        assert_eq!(
            FpsEstimator::new(0.0).iteration_duration,
            FpsEstimator::new(60.0).iteration_duration
        );
    }

    #[test]
    fn tick_waits_out_the_budget() {
        let mut fps = FpsEstimator::new(200.0);
        for _ in 0..3 {
            let dt = fps.tick();
            assert!(dt >= Duration::from_millis(5));
        }
        assert!(fps.fps() > 0.0 && fps.fps() <= 200.0);
    }

    // Get some stats about std::thread::sleep
    #[test]
    #[ignore] // Takes a few seconds, run on demand.
    fn sleep_test() {
        let target: f64 = 1.0 / 60.0;
        let mut max_err: f64 = 0.0;
        let mut avg_overshoot_err: f64 = 0.0;
        let mut avg_undershoot_err: f64 = 0.0;
        let mut overshoot = 0;
        let mut undershoot = 0;
        for _ in 0..1000 {
            let now = Instant::now();
            std::thread::sleep(Duration::from_secs_f64(target));
            let err = now.elapsed().as_secs_f64() - target;
            if err >= 0.0 {
                avg_overshoot_err += err.abs();
                overshoot += 1;
            } else {
                avg_undershoot_err += err.abs();
                undershoot += 1;
            }
            if err > max_err {
                max_err = err;
            }
        }
        avg_overshoot_err /= overshoot.max(1) as f64;
        avg_undershoot_err /= undershoot.max(1) as f64;
        println!(
            "Max: {}, Avg Over: {}, Avg Under: {}",
            max_err, avg_overshoot_err, avg_undershoot_err
        );
    }
}
