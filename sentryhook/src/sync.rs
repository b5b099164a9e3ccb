use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct GateState {
    outstanding: usize,
    draining: bool,
}

/// Lets deliveries run concurrently while a drain waits for all of them.
///
/// A drain blocks new deliveries from entering, waits until every delivery
/// already inside has left, then reopens the gate. Only one drain runs at a
/// time; others queue behind it.
#[derive(Debug, Default)]
pub(crate) struct DrainGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl DrainGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Enters the gate, waiting for any running drain to finish first.
    pub(crate) fn enter(&self) -> Pass<'_> {
        let mut state = self.lock();
        while state.draining {
            state = self.wait(state);
        }
        state.outstanding += 1;
        Pass { gate: self }
    }

    /// Blocks until no delivery is inside the gate.
    pub(crate) fn drain(&self) {
        let mut state = self.lock();
        while state.draining {
            state = self.wait(state);
        }
        state.draining = true;
        while state.outstanding > 0 {
            state = self.wait(state);
        }
        state.draining = false;
        drop(state);
        self.changed.notify_all();
    }

    #[cfg(test)]
    pub(crate) fn outstanding(&self) -> usize {
        self.lock().outstanding
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        // counters stay consistent even if a holder panicked
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, state: MutexGuard<'a, GateState>) -> MutexGuard<'a, GateState> {
        self.changed
            .wait(state)
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Proof of being inside a [`DrainGate`]. Leaves the gate when dropped.
#[derive(Debug)]
pub(crate) struct Pass<'a> {
    gate: &'a DrainGate,
}

impl Drop for Pass<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.lock();
        state.outstanding -= 1;
        let idle = state.outstanding == 0;
        drop(state);
        if idle {
            self.gate.changed.notify_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn drain_on_idle_gate_returns_immediately() {
        let gate = DrainGate::new();
        gate.drain();
        gate.drain();
        assert_eq!(gate.outstanding(), 0);
    }

    #[test]
    fn passes_are_counted() {
        let gate = DrainGate::new();
        let first = gate.enter();
        let second = gate.enter();
        assert_eq!(gate.outstanding(), 2);
        drop(first);
        drop(second);
        assert_eq!(gate.outstanding(), 0);
    }

    #[test]
    fn drain_waits_for_outstanding_passes() {
        let gate = Arc::new(DrainGate::new());
        let released = Arc::new(AtomicBool::new(false));
        let (entered_tx, entered_rx) = mpsc::channel();

        let worker = {
            let gate = Arc::clone(&gate);
            let released = Arc::clone(&released);
            thread::spawn(move || {
                let _pass = gate.enter();
                entered_tx.send(()).unwrap();
                thread::sleep(Duration::from_millis(50));
                released.store(true, Ordering::SeqCst);
            })
        };

        entered_rx.recv().unwrap();
        gate.drain();
        assert!(released.load(Ordering::SeqCst));
        worker.join().unwrap();
    }

    #[test]
    fn enter_waits_for_running_drain() {
        let gate = Arc::new(DrainGate::new());
        let pass = gate.enter();
        let (drain_started_tx, drain_started_rx) = mpsc::channel();

        let drainer = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                drain_started_tx.send(()).unwrap();
                gate.drain();
            })
        };
        drain_started_rx.recv().unwrap();
        // give the drainer time to close the gate
        thread::sleep(Duration::from_millis(20));

        let late = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                let _pass = gate.enter();
            })
        };
        thread::sleep(Duration::from_millis(20));
        assert!(!late.is_finished());

        drop(pass);
        drainer.join().unwrap();
        late.join().unwrap();
        assert_eq!(gate.outstanding(), 0);
    }
}
