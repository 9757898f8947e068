use std::time::Instant;

/// Tracks a run of several joke requests and prints a summary at the end.
pub struct ProgressIndicator {
    total: usize,
    delivered: usize,
    failed: usize,
    start_time: Instant,
}

impl ProgressIndicator {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            delivered: 0,
            failed: 0,
            start_time: Instant::now(),
        }
    }

    pub fn start_item(&self) {
        println!(
            "Joke {}/{}",
            self.delivered + self.failed + 1,
            self.total
        );
    }

    pub fn complete_item(&mut self, success: bool) {
        if success {
            self.delivered += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn finish(&self) {
        let elapsed = self.start_time.elapsed();
        println!("\n{}", "=".repeat(60));
        println!("Summary:");
        println!("  Requested: {}", self.total);
        println!("  Delivered: {}", self.delivered);
        println!("  Failed:    {}", self.failed);
        println!("  Duration:  {:.2}s", elapsed.as_secs_f64());
        println!("{}", "=".repeat(60));
    }
}
