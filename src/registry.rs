//! Size to kernel resolution.
//!
//! Candidates are collected per size, either from the static catalogue or through
//! [`KernelRegistry::register`]. The first [`KernelRegistry::resolve`] of a size picks the
//! winner and publishes it once; from then on the size is frozen and further registrations for it
//! are refused.
//!
//! Selection order: highest priority, then genuine over fallback, then earliest registration.
//! A size with no candidate resolves to the [`ReferenceKernel`] at priority
//! [`REFERENCE_PRIORITY`].
use std::cmp::Reverse;
use std::fmt;
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::error::{FftError, SizeIssue};
use crate::kernels::catalogue::{CatalogueEntry, KernelFactory, CATALOGUE, REFERENCE_PRIORITY};
use crate::kernels::{Kernel, ReferenceKernel};
use crate::utils::validate_size;
use crate::MAX_LOG_N;

/// What was resolved for one size. Every claim is read from the registration, never assumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelDescription {
    pub name: &'static str,
    pub size: usize,
    /// `true` if the kernel only handles `size`
    pub bound: bool,
    pub priority: u32,
    pub genuine: bool,
}

impl fmt::Display for KernelDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match (self.genuine, self.bound) {
            (true, _) => "specialized kernel",
            (false, true) => "reference fallback bound",
            (false, false) => "generic reference kernel",
        };
        write!(
            f,
            "{}: {kind} for N = {}, priority {}",
            self.name, self.size, self.priority
        )
    }
}

struct Candidate {
    kernel: Box<dyn Kernel>,
    priority: u32,
    genuine: bool,
    seq: u64,
}

#[derive(Default)]
struct Candidates {
    by_log_n: Vec<Vec<Candidate>>,
    frozen: [bool; MAX_LOG_N + 1],
    next_seq: u64,
}

struct Resolved {
    kernel: Box<dyn Kernel>,
    description: KernelDescription,
}

#[allow(clippy::declare_interior_mutable_const)]
const UNRESOLVED: OnceLock<Resolved> = OnceLock::new();

/// Maps each supported size to the kernel that serves it.
pub struct KernelRegistry {
    candidates: Mutex<Candidates>,
    resolved: [OnceLock<Resolved>; MAX_LOG_N + 1],
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KernelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolved: Vec<&KernelDescription> = self
            .resolved
            .iter()
            .filter_map(|slot| slot.get().map(|r| &r.description))
            .collect();
        f.debug_struct("KernelRegistry")
            .field("resolved", &resolved)
            .finish_non_exhaustive()
    }
}

impl KernelRegistry {
    /// A registry without candidates: every size resolves to the reference kernel.
    pub fn new() -> Self {
        Self {
            candidates: Mutex::new(Candidates {
                by_log_n: (0..=MAX_LOG_N).map(|_| Vec::new()).collect(),
                ..Candidates::default()
            }),
            resolved: [UNRESOLVED; MAX_LOG_N + 1],
        }
    }

    /// A registry holding `entries`, registered in order.
    ///
    /// # Errors
    ///
    /// The first error returned by [`KernelRegistry::register`].
    pub fn from_entries(entries: &[CatalogueEntry]) -> Result<Self, FftError> {
        let registry = Self::new();
        for entry in entries {
            registry.register(entry.size, entry.factory, entry.priority, entry.genuine)?;
        }
        Ok(registry)
    }

    /// A registry holding every row of [`CATALOGUE`].
    ///
    /// # Errors
    ///
    /// See [`KernelRegistry::from_entries`].
    pub fn with_catalogue() -> Result<Self, FftError> {
        Self::from_entries(&CATALOGUE)
    }

    /// Adds a candidate for `size`.
    ///
    /// The factory is called once, here; a kernel bound to a different size is refused.
    ///
    /// # Errors
    ///
    /// - [`FftError::InvalidSize`] if `size` is unsupported or the kernel is bound to another size
    /// - [`FftError::RegistryFrozen`] if `size` has already been resolved
    pub fn register(
        &self,
        size: usize,
        factory: KernelFactory,
        priority: u32,
        genuine: bool,
    ) -> Result<(), FftError> {
        let outcome = self.try_register(size, factory, priority, genuine);
        if let Err(err) = &outcome {
            tracing::warn!(n = size, priority, genuine, %err, "kernel registration rejected");
        }
        outcome
    }

    fn try_register(
        &self,
        size: usize,
        factory: KernelFactory,
        priority: u32,
        genuine: bool,
    ) -> Result<(), FftError> {
        let log_n = validate_size(size)?;
        let kernel = factory();
        if let Some(expected) = kernel.bound_size() {
            if expected != size {
                return Err(FftError::size(size, SizeIssue::KernelBound { expected }));
            }
        }

        let mut candidates = self.candidates.lock().unwrap_or_else(PoisonError::into_inner);
        if candidates.frozen[log_n] {
            return Err(FftError::RegistryFrozen { size });
        }
        let seq = candidates.next_seq;
        candidates.next_seq += 1;
        candidates.by_log_n[log_n].push(Candidate {
            kernel,
            priority,
            genuine,
            seq,
        });
        Ok(())
    }

    fn resolve_log_n(&self, log_n: usize) -> &Resolved {
        self.resolved[log_n].get_or_init(|| {
            let size = 1 << log_n;
            let pool = {
                let mut candidates = self.candidates.lock().unwrap_or_else(PoisonError::into_inner);
                candidates.frozen[log_n] = true;
                std::mem::take(&mut candidates.by_log_n[log_n])
            };

            let winner = pool
                .into_iter()
                .max_by_key(|c| (c.priority, c.genuine, Reverse(c.seq)))
                .map(|c| (c.kernel, c.priority, c.genuine))
                .unwrap_or_else(|| {
                    let reference: Box<dyn Kernel> = Box::new(ReferenceKernel);
                    (reference, REFERENCE_PRIORITY, false)
                });
            let (kernel, priority, genuine) = winner;

            let description = KernelDescription {
                name: kernel.name(),
                size,
                bound: kernel.bound_size().is_some(),
                priority,
                genuine,
            };
            tracing::debug!(
                n = size,
                kernel = description.name,
                priority,
                genuine,
                "resolved kernel"
            );
            Resolved {
                kernel,
                description,
            }
        })
    }

    /// The kernel serving `size`. Resolving freezes the size.
    ///
    /// # Errors
    ///
    /// [`FftError::InvalidSize`] if `size` is unsupported.
    pub fn resolve(&self, size: usize) -> Result<&dyn Kernel, FftError> {
        let log_n = validate_size(size)?;
        Ok(self.resolve_log_n(log_n).kernel.as_ref())
    }

    /// Describes the kernel serving `size`, resolving it if needed.
    ///
    /// # Errors
    ///
    /// [`FftError::InvalidSize`] if `size` is unsupported.
    pub fn describe(&self, size: usize) -> Result<KernelDescription, FftError> {
        let log_n = validate_size(size)?;
        Ok(self.resolve_log_n(log_n).description.clone())
    }

    /// `true` once `size` has been resolved
    pub fn is_frozen(&self, size: usize) -> bool {
        validate_size(size).is_ok_and(|log_n| self.resolved[log_n].get().is_some())
    }
}

static GLOBAL: OnceLock<KernelRegistry> = OnceLock::new();

/// The process-wide registry, populated from [`CATALOGUE`] on first use.
pub fn global() -> &'static KernelRegistry {
    GLOBAL.get_or_init(|| match KernelRegistry::with_catalogue() {
        Ok(registry) => {
            tracing::debug!(entries = CATALOGUE.len(), "initialised kernel registry");
            registry
        }
        Err(err) => {
            tracing::error!(%err, "invalid kernel catalogue, every size uses the reference kernel");
            KernelRegistry::new()
        }
    })
}

/// Registers a kernel in the process-wide registry.
///
/// Must happen before the first transform of `size`.
///
/// # Errors
///
/// See [`KernelRegistry::register`].
pub fn register(
    size: usize,
    factory: KernelFactory,
    priority: u32,
    genuine: bool,
) -> Result<(), FftError> {
    global().register(size, factory, priority, genuine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::catalogue::{STAGED_PRIORITY, UNROLLED_PRIORITY};
    use crate::kernels::{BoundReference, Direction, Staged, Unrolled16, Unrolled8};
    use crate::options::Options;

    fn unrolled_8() -> Box<dyn Kernel> {
        Box::new(Unrolled8)
    }

    fn bound_reference_8() -> Box<dyn Kernel> {
        Box::new(BoundReference::new(8).unwrap())
    }

    fn bound_reference_32() -> Box<dyn Kernel> {
        Box::new(BoundReference::new(32).unwrap())
    }

    fn staged_32() -> Box<dyn Kernel> {
        Box::new(Staged::<5>)
    }

    /// Generic kernel with a distinct name, so tie-breaking is observable
    struct Alias(&'static str);

    impl Kernel for Alias {
        fn name(&self) -> &'static str {
            self.0
        }

        fn bound_size(&self) -> Option<usize> {
            None
        }

        fn process(&self, reals: &mut [f64], imags: &mut [f64], direction: Direction, opts: &Options) {
            ReferenceKernel.process(reals, imags, direction, opts);
        }
    }

    fn alias_first() -> Box<dyn Kernel> {
        Box::new(Alias("first"))
    }

    fn alias_second() -> Box<dyn Kernel> {
        Box::new(Alias("second"))
    }

    #[test]
    fn empty_registry_falls_back_to_reference() {
        let registry = KernelRegistry::new();
        for size in [2, 4, 1024] {
            let kernel = registry.resolve(size).unwrap();
            assert_eq!(kernel.name(), ReferenceKernel::NAME);
            let description = registry.describe(size).unwrap();
            assert_eq!(description.priority, REFERENCE_PRIORITY);
            assert!(!description.genuine && !description.bound);
        }
    }

    #[test]
    fn registered_kernel_wins_over_reference() {
        let registry = KernelRegistry::new();
        registry.register(8, unrolled_8, 1, true).unwrap();
        assert_eq!(registry.resolve(8).unwrap().name(), Unrolled8::NAME);
        assert_eq!(registry.resolve(16).unwrap().name(), ReferenceKernel::NAME);
    }

    #[test]
    fn higher_priority_wins() {
        let registry = KernelRegistry::new();
        registry.register(8, unrolled_8, 5, true).unwrap();
        registry.register(8, bound_reference_8, 7, false).unwrap();
        assert_eq!(registry.resolve(8).unwrap().name(), BoundReference::NAME);
    }

    #[test]
    fn ties_prefer_genuine_then_earliest() {
        let registry = KernelRegistry::new();
        registry.register(32, bound_reference_32, 3, false).unwrap();
        registry.register(32, staged_32, 3, true).unwrap();
        assert_eq!(registry.resolve(32).unwrap().name(), Staged::<5>::NAME);

        let registry = KernelRegistry::new();
        registry.register(64, alias_first, 3, false).unwrap();
        registry.register(64, alias_second, 3, false).unwrap();
        assert_eq!(registry.resolve(64).unwrap().name(), "first");
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        let registry = KernelRegistry::new();
        for size in [0, 1, 3, 12, 1 << 17] {
            assert!(matches!(
                registry.resolve(size),
                Err(FftError::InvalidSize { .. })
            ));
            assert!(registry.describe(size).is_err());
            assert!(!registry.is_frozen(size));
        }
        assert!(matches!(
            registry.register(12, alias_first, 1, false),
            Err(FftError::InvalidSize {
                size: 12,
                reason: SizeIssue::NotPowerOfTwo
            })
        ));
    }

    #[test]
    fn size_mismatched_factory_is_rejected() {
        let registry = KernelRegistry::new();
        let err = registry.register(16, unrolled_8, 1, true).unwrap_err();
        assert_eq!(
            err,
            FftError::InvalidSize {
                size: 16,
                reason: SizeIssue::KernelBound { expected: 8 }
            }
        );
        assert_eq!(registry.resolve(16).unwrap().name(), ReferenceKernel::NAME);
    }

    #[test]
    fn resolution_freezes_the_size() {
        let registry = KernelRegistry::new();
        assert!(!registry.is_frozen(8));
        assert_eq!(registry.resolve(8).unwrap().name(), ReferenceKernel::NAME);
        assert!(registry.is_frozen(8));
        assert_eq!(
            registry.register(8, unrolled_8, 100, true),
            Err(FftError::RegistryFrozen { size: 8 })
        );
        assert_eq!(registry.resolve(8).unwrap().name(), ReferenceKernel::NAME);
        // other sizes stay open
        registry.register(16, alias_first, 1, false).unwrap();
    }

    #[test]
    fn catalogue_and_explicit_registration_converge() {
        let discovered = KernelRegistry::with_catalogue().unwrap();
        let explicit = KernelRegistry::new();
        for entry in CATALOGUE.iter() {
            explicit
                .register(entry.size, entry.factory, entry.priority, entry.genuine)
                .unwrap();
        }
        for log_n in 1..=MAX_LOG_N {
            let size = 1 << log_n;
            assert_eq!(
                discovered.describe(size).unwrap(),
                explicit.describe(size).unwrap()
            );
        }
    }

    #[test]
    fn catalogue_resolution() {
        let registry = KernelRegistry::with_catalogue().unwrap();
        let d8 = registry.describe(8).unwrap();
        assert_eq!(d8.name, Unrolled8::NAME);
        assert_eq!(d8.priority, UNROLLED_PRIORITY);
        assert!(d8.genuine && d8.bound);
        assert_eq!(registry.resolve(16).unwrap().name(), Unrolled16::NAME);
        let d1024 = registry.describe(1024).unwrap();
        assert_eq!(d1024.name, "staged-radix2-1024");
        assert_eq!(d1024.priority, STAGED_PRIORITY);
        assert_eq!(registry.resolve(4).unwrap().name(), ReferenceKernel::NAME);
    }

    #[test]
    fn descriptions_derive_from_fields() {
        let registry = KernelRegistry::new();
        registry.register(8, bound_reference_8, 1, false).unwrap();
        registry.register(16, unrolled_16_factory, 2, true).unwrap();
        assert_eq!(
            registry.describe(8).unwrap().to_string(),
            "bound-reference-radix2: reference fallback bound for N = 8, priority 1"
        );
        assert_eq!(
            registry.describe(16).unwrap().to_string(),
            "unrolled-radix2-16: specialized kernel for N = 16, priority 2"
        );
        assert_eq!(
            registry.describe(2).unwrap().to_string(),
            "reference-radix2: generic reference kernel for N = 2, priority 0"
        );
    }

    fn unrolled_16_factory() -> Box<dyn Kernel> {
        Box::new(Unrolled16)
    }

    #[test]
    fn concurrent_resolution_publishes_once() {
        let registry = KernelRegistry::with_catalogue().unwrap();
        let seen: Vec<Vec<KernelDescription>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (1..=MAX_LOG_N)
                            .map(|log_n| registry.describe(1 << log_n).unwrap())
                            .collect()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(seen.windows(2).all(|w| w[0] == w[1]));
        assert!((1..=MAX_LOG_N).all(|log_n| registry.is_frozen(1 << log_n)));
    }

    #[test]
    fn global_registry_uses_the_catalogue() {
        assert_eq!(global().resolve(8).unwrap().name(), Unrolled8::NAME);
        assert_eq!(global().describe(65536).unwrap().name, "staged-radix2-65536");
        assert_eq!(
            register(8, unrolled_8, 1, true),
            Err(FftError::RegistryFrozen { size: 8 })
        );
    }
}
