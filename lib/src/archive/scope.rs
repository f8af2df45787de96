use super::{Error, ReleaseFailure, ResourceReleaseError};
use std::ops::{Index, IndexMut};

/// Something that holds on to an open resource and must be explicitly released
///
/// Releasing is where buffered output gets written, so it can fail. Releasing an already
/// released handle does nothing.
pub trait Release {
    fn release(&mut self) -> Result<(), Error>;
}

/// Handle to an archive registered in an [`ArchiveScope`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchiveId(usize);

/// Archives acquired during a [`use_archives`] call
pub struct ArchiveScope<H> {
    handles: Vec<H>,
}

impl<H: Release> ArchiveScope<H> {
    /// Register a handle so it gets released when the scope ends
    pub fn add(&mut self, handle: H) -> ArchiveId {
        self.handles.push(handle);
        ArchiveId(self.handles.len() - 1)
    }

    /// Try to add the result of opening an archive
    pub fn acquire<E>(&mut self, handle: Result<H, E>) -> Result<ArchiveId, E> {
        handle.map(|handle| self.add(handle))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Release every handle in acquisition order, even after some of them fail
    fn release_all(&mut self) -> Option<ResourceReleaseError> {
        let mut failures = vec![];
        for (index, handle) in self.handles.iter_mut().enumerate() {
            if let Err(error) = handle.release() {
                failures.push(ReleaseFailure { index, error });
            }
        }
        ResourceReleaseError::from_failures(failures, self.handles.len())
    }
}

impl<H> Index<ArchiveId> for ArchiveScope<H> {
    type Output = H;

    fn index(&self, id: ArchiveId) -> &H {
        &self.handles[id.0]
    }
}

impl<H> IndexMut<ArchiveId> for ArchiveScope<H> {
    fn index_mut(&mut self, id: ArchiveId) -> &mut H {
        &mut self.handles[id.0]
    }
}

/// Error type of a [`use_archives`] body
///
/// Release failures that happen after the body already failed are attached to the body's error
/// instead of replacing it.
pub trait ScopeError: From<ResourceReleaseError> {
    fn with_release_failure(self, release: ResourceReleaseError) -> Self;
}

impl ScopeError for ResourceReleaseError {
    fn with_release_failure(mut self, release: ResourceReleaseError) -> Self {
        self.suppressed.push(release.primary);
        self.suppressed.extend(release.suppressed);
        self.attempted = self.attempted.max(release.attempted);
        self
    }
}

/// Run `body` with a scope to acquire archives into, then release all of them
///
/// Every acquired handle is released whether or not `body` succeeds. Release failures are
/// returned together as a [`ResourceReleaseError`], or attached to the error of `body` if it
/// failed first.
pub fn use_archives<H, T, E, F>(body: F) -> Result<T, E>
where
    H: Release,
    E: ScopeError,
    F: FnOnce(&mut ArchiveScope<H>) -> Result<T, E>,
{
    let mut scope = ArchiveScope { handles: vec![] };
    let result = body(&mut scope);
    match (result, scope.release_all()) {
        (result, None) => result,
        (Ok(_), Some(release_error)) => Err(E::from(release_error)),
        (Err(err), Some(release_error)) => {
            log::warn!("While handling an earlier failure: {}", release_error);
            Err(err.with_release_failure(release_error))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct FakeHandle {
        id: usize,
        fails: bool,
        log: Rc<RefCell<Vec<usize>>>,
    }

    impl Release for FakeHandle {
        fn release(&mut self) -> Result<(), Error> {
            self.log.borrow_mut().push(self.id);
            if self.fails {
                Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("handle {} broke", self.id),
                )))
            } else {
                Ok(())
            }
        }
    }

    fn handles(failing: &[usize]) -> (Vec<FakeHandle>, Rc<RefCell<Vec<usize>>>) {
        let log = Rc::new(RefCell::new(vec![]));
        let handles = (0..3)
            .map(|id| FakeHandle {
                id,
                fails: failing.contains(&id),
                log: log.clone(),
            })
            .collect();
        (handles, log)
    }

    #[test]
    fn all_released_on_success() {
        let (fakes, log) = handles(&[]);
        let result: Result<usize, ResourceReleaseError> = use_archives(|scope| {
            for fake in fakes {
                scope.add(fake);
            }
            Ok(scope.len())
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn one_failure_still_closes_the_rest() {
        let (fakes, log) = handles(&[1]);
        let result: Result<(), ResourceReleaseError> = use_archives(|scope| {
            for fake in fakes {
                scope.add(fake);
            }
            Ok(())
        });
        let err = result.unwrap_err();
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert_eq!(err.primary.index, 1);
        assert!(err.suppressed.is_empty());
        assert_eq!(err.attempted, 3);
    }

    #[test]
    fn several_failures_are_all_kept() {
        let (fakes, log) = handles(&[0, 2]);
        let result: Result<(), ResourceReleaseError> = use_archives(|scope| {
            for fake in fakes {
                scope.add(fake);
            }
            Ok(())
        });
        let err = result.unwrap_err();
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        let failed: Vec<usize> = err.failures().map(|failure| failure.index).collect();
        assert_eq!(failed, vec![0, 2]);
        assert!(err.to_string().starts_with("2 of 3 archives failed to close"));
    }

    #[derive(Debug)]
    enum BodyError {
        Body,
        Release(ResourceReleaseError),
        BodyThenRelease(ResourceReleaseError),
    }

    impl From<ResourceReleaseError> for BodyError {
        fn from(err: ResourceReleaseError) -> BodyError {
            BodyError::Release(err)
        }
    }

    impl ScopeError for BodyError {
        fn with_release_failure(self, release: ResourceReleaseError) -> BodyError {
            match self {
                BodyError::Body => BodyError::BodyThenRelease(release),
                other => other,
            }
        }
    }

    #[test]
    fn body_failure_wins() {
        let (fakes, log) = handles(&[]);
        let result: Result<(), BodyError> = use_archives(|scope| {
            for fake in fakes {
                scope.add(fake);
            }
            Err(BodyError::Body)
        });
        assert!(matches!(result, Err(BodyError::Body)));
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn release_failures_after_body_failure_are_kept() {
        let (fakes, log) = handles(&[0, 2]);
        let result: Result<(), BodyError> = use_archives(|scope| {
            for fake in fakes {
                scope.add(fake);
            }
            Err(BodyError::Body)
        });
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        match result {
            Err(BodyError::BodyThenRelease(release)) => {
                let failed: Vec<usize> = release.failures().map(|failure| failure.index).collect();
                assert_eq!(failed, vec![0, 2]);
            }
            other => panic!("expected release failures on the body error, got {:?}", other),
        }
    }

    #[test]
    fn release_failures_merge_into_a_release_error() {
        let (fakes, _) = handles(&[1]);
        let (more, _) = handles(&[0]);
        let result: Result<(), ResourceReleaseError> = use_archives(|scope| {
            for fake in fakes {
                scope.add(fake);
            }
            let mut inner = ArchiveScope { handles: more };
            Err(inner.release_all().unwrap())
        });
        let err = result.unwrap_err();
        let failed: Vec<usize> = err.failures().map(|failure| failure.index).collect();
        assert_eq!(failed, vec![0, 1]);
        assert_eq!(err.attempted, 3);
    }
}
