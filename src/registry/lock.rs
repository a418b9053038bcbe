//! # Re-entrant Registry Lock
//!
//! All registry state sits behind one `parking_lot::ReentrantMutex`. The same
//! thread may enter again while already holding it, which happens when a
//! contract validator registers a service through nested proxy resolution.
//!
//! The mutex only hands out shared references, so the state lives in a
//! `RefCell`. Borrows are scoped to a single `read`/`write` closure and those
//! closures never call back into user code, so nested entry cannot observe an
//! outstanding borrow.

use parking_lot::ReentrantMutex;
use std::cell::RefCell;

pub struct ReentrantLock<T> {
    inner: ReentrantMutex<RefCell<T>>,
}

/// A held acquisition; every access through it happens under the same lock hold
pub struct CriticalSection<'a, T> {
    cell: &'a RefCell<T>,
}

impl<T> CriticalSection<'_, T> {
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.borrow())
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.cell.borrow_mut())
    }
}

impl<T> ReentrantLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: ReentrantMutex::new(RefCell::new(value)),
        }
    }

    /// Hold the lock across a multi-step sequence such as check-then-insert
    pub fn enter<R>(&self, f: impl FnOnce(&CriticalSection<'_, T>) -> R) -> R {
        let guard = self.inner.lock();
        let section = CriticalSection { cell: &guard };
        f(&section)
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.enter(|section| section.read(f))
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.enter(|section| section.write(f))
    }
}

impl<T: Default> Default for ReentrantLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_nested_entry_on_same_thread() {
        let lock = ReentrantLock::new(Vec::<u32>::new());

        lock.enter(|outer| {
            outer.write(|items| items.push(1));
            // Re-entering while the outer section is held must not deadlock
            lock.write(|items| items.push(2));
            outer.write(|items| items.push(3));
        });

        assert_eq!(lock.read(|items| items.clone()), vec![1, 2, 3]);
    }

    #[test]
    fn test_concurrent_writers_do_not_lose_updates() {
        let lock = Arc::new(ReentrantLock::new(0_u64));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lock = Arc::clone(&lock);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        lock.write(|count| *count += 1);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(lock.read(|count| *count), 8000);
    }
}
