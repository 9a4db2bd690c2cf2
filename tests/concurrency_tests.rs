//! # Concurrency Tests using Loom
//!
//! This module uses loom to check the fail-fast handshake of the scheduler:
//! configurations check the halt token before launching, and a failure cancels it.

#[cfg(test)]
mod tests {
    use loom::sync::Arc;
    use loom::sync::atomic::{AtomicUsize, Ordering};
    use loom::thread;
    use tokio_util::sync::CancellationToken;

    /// Every configuration is accounted for exactly once, as either launched or
    /// skipped, whatever the interleaving with the failing configuration.
    ///
    /// The real scheduler cancels from its single consumer loop; here the
    /// failing worker cancels directly, which keeps the model small enough for
    /// loom while still racing `cancel()` against `is_cancelled()`.
    #[test]
    fn test_fail_fast_accounts_for_every_configuration() {
        const STACK_SIZE: usize = 8 * 1024 * 1024; // 8 MB

        let builder = std::thread::Builder::new()
            .name("loom-test-thread".into())
            .stack_size(STACK_SIZE);

        let handle = builder
            .spawn(|| {
                loom::model(|| {
                    const CONFIGURATIONS: usize = 2;
                    let launched = Arc::new(AtomicUsize::new(0));
                    let skipped = Arc::new(AtomicUsize::new(0));
                    let halt = Arc::new(CancellationToken::new());

                    let mut handles = vec![];

                    for slot in 0..CONFIGURATIONS {
                        let halt = halt.clone();
                        let launched = launched.clone();
                        let skipped = skipped.clone();

                        handles.push(thread::spawn(move || {
                            if halt.is_cancelled() {
                                skipped.fetch_add(1, Ordering::Relaxed);
                                return;
                            }
                            launched.fetch_add(1, Ordering::Relaxed);

                            // Configuration 0 fails and triggers fail-fast.
                            if slot == 0 {
                                halt.cancel();
                            }
                        }));
                    }

                    for handle in handles {
                        handle.join().unwrap();
                    }

                    let launched = launched.load(Ordering::Relaxed);
                    let skipped = skipped.load(Ordering::Relaxed);

                    assert_eq!(launched + skipped, CONFIGURATIONS);
                    // Nothing cancels before configuration 0 runs, so it always launches.
                    assert!(launched >= 1, "launched {launched}");
                    assert!(halt.is_cancelled());
                });
            })
            .unwrap();

        handle.join().unwrap();
    }
}
