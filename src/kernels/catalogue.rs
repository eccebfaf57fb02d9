//! The static table of specialized kernels.
//!
//! This table is the only place where kernels are wired to sizes. The registry is built from
//! it at startup; adding a kernel means adding a row here. Descriptions, priorities and the
//! genuine-specialization claims are all read from these rows; every row that claims `genuine`
//! is checked against the reference kernel by [`crate::verify::verify_catalogue`].
use crate::kernels::{Kernel, Staged, Unrolled16, Unrolled8};

/// Builds one kernel instance
pub type KernelFactory = fn() -> Box<dyn Kernel>;

/// Priority of the implicit reference kernel
pub const REFERENCE_PRIORITY: u32 = 0;
/// Priority of the template-generated kernels
pub const STAGED_PRIORITY: u32 = 10;
/// Priority of the fully unrolled kernels
pub const UNROLLED_PRIORITY: u32 = 20;

/// One row of the catalogue: `(size, factory, priority, genuine)`.
#[derive(Clone, Copy)]
pub struct CatalogueEntry {
    pub size: usize,
    pub factory: KernelFactory,
    pub priority: u32,
    /// `true` only if the kernel is a real specialization verified against the reference
    pub genuine: bool,
}

impl std::fmt::Debug for CatalogueEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogueEntry")
            .field("size", &self.size)
            .field("kernel", &(self.factory)().name())
            .field("priority", &self.priority)
            .field("genuine", &self.genuine)
            .finish()
    }
}

fn unrolled_8() -> Box<dyn Kernel> {
    Box::new(Unrolled8)
}

fn unrolled_16() -> Box<dyn Kernel> {
    Box::new(Unrolled16)
}

fn staged<const LOG_N: usize>() -> Box<dyn Kernel> {
    Box::new(Staged::<LOG_N>)
}

macro_rules! catalogue {
    ($(($log_n:literal, $factory:expr, $priority:expr, $genuine:literal)),* $(,)?) => {
        [$(
            CatalogueEntry {
                size: 1 << $log_n,
                factory: $factory,
                priority: $priority,
                genuine: $genuine,
            }
        ),*]
    };
}

/// Every specialized kernel shipped with the crate, one per size from 8 to 65536.
pub static CATALOGUE: [CatalogueEntry; 14] = catalogue![
    (3, unrolled_8, UNROLLED_PRIORITY, true),
    (4, unrolled_16, UNROLLED_PRIORITY, true),
    (5, staged::<5>, STAGED_PRIORITY, true),
    (6, staged::<6>, STAGED_PRIORITY, true),
    (7, staged::<7>, STAGED_PRIORITY, true),
    (8, staged::<8>, STAGED_PRIORITY, true),
    (9, staged::<9>, STAGED_PRIORITY, true),
    (10, staged::<10>, STAGED_PRIORITY, true),
    (11, staged::<11>, STAGED_PRIORITY, true),
    (12, staged::<12>, STAGED_PRIORITY, true),
    (13, staged::<13>, STAGED_PRIORITY, true),
    (14, staged::<14>, STAGED_PRIORITY, true),
    (15, staged::<15>, STAGED_PRIORITY, true),
    (16, staged::<16>, STAGED_PRIORITY, true),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_bound_to_their_size() {
        for entry in CATALOGUE.iter() {
            let kernel = (entry.factory)();
            assert_eq!(kernel.bound_size(), Some(entry.size), "{entry:?}");
            assert!(entry.priority > REFERENCE_PRIORITY);
        }
    }

    #[test]
    fn sizes_are_unique_and_cover_8_to_65536() {
        let sizes: Vec<usize> = CATALOGUE.iter().map(|e| e.size).collect();
        let expected: Vec<usize> = (3..=16).map(|log_n| 1 << log_n).collect();
        assert_eq!(sizes, expected);
    }
}
