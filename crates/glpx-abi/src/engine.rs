//! Engine context: the one-time link step and the handle every model shares.

use std::cell::OnceCell;
use std::path::Path;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, info};

use crate::abi::Abi;
use crate::error::EngineError;
use crate::memory::Bridge;
use crate::native::NativeGlpk;

/// Environment variable naming the GLPK shared library to load.
pub const LIBRARY_ENV: &str = "GLPX_GLPK_LIB";

/// Shared, lazily initialized engine.
///
/// Clones refer to the same context, so initializing one clone readies all of
/// them. Operations on a context that was never initialized fail with
/// [`EngineError::NotReady`].
#[derive(Clone, Default)]
pub struct Engine {
    inner: Rc<OnceCell<Rc<dyn Abi>>>,
}

/// Summary of a ready engine.
#[derive(Debug, Clone, Serialize)]
pub struct EngineInfo {
    pub version: String,
    pub live_allocations: usize,
}

impl Engine {
    /// Creates an uninitialized context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context that is already bound to `abi`.
    pub fn with_abi(abi: impl Abi + 'static) -> Self {
        let abi: Rc<dyn Abi> = Rc::new(abi);
        Self {
            inner: Rc::new(OnceCell::from(abi)),
        }
    }

    /// Creates a context and loads the native library from the default locations.
    pub fn load() -> Result<Self, EngineError> {
        let engine = Self::new();
        engine.init()?;
        Ok(engine)
    }

    /// Loads the native library unless already initialized.
    ///
    /// `GLPX_GLPK_LIB` takes precedence over the platform's default names.
    pub fn init(&self) -> Result<(), EngineError> {
        if self.is_ready() {
            return Ok(());
        }
        let native = match std::env::var_os(LIBRARY_ENV) {
            Some(path) => NativeGlpk::open(Path::new(&path))?,
            None => NativeGlpk::open_default()?,
        };
        self.install(Rc::new(native));
        Ok(())
    }

    /// Loads the native library from `path` unless already initialized.
    pub fn init_from(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        if self.is_ready() {
            return Ok(());
        }
        let native = NativeGlpk::open(path.as_ref())?;
        self.install(Rc::new(native));
        Ok(())
    }

    /// Binds `abi` unless another library is already bound; returns whether
    /// it was bound.
    ///
    /// A second install leaves the first binding in place.
    fn install(&self, abi: Rc<dyn Abi>) -> bool {
        let version = abi.version();
        match self.inner.set(Rc::clone(&abi)) {
            Ok(()) => {
                abi.term_out(false);
                info!(
                    component = "engine",
                    operation = "init",
                    status = "success",
                    version = %version,
                    "GLPK engine initialized"
                );
                true
            }
            Err(_) => {
                debug!(
                    component = "engine",
                    operation = "init",
                    status = "skipped",
                    version = %version,
                    "Engine already initialized; keeping the bound library"
                );
                false
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.inner.get().is_some()
    }

    /// The bound ABI, or [`EngineError::NotReady`].
    pub fn abi(&self) -> Result<Rc<dyn Abi>, EngineError> {
        match self.inner.get() {
            Some(abi) => Ok(Rc::clone(abi)),
            None => {
                debug!(
                    component = "engine",
                    operation = "abi",
                    status = "not_ready",
                    "Engine used before initialization"
                );
                Err(EngineError::NotReady)
            }
        }
    }

    pub fn bridge(&self) -> Result<Bridge<'_>, EngineError> {
        self.inner
            .get()
            .map(|abi| Bridge::new(abi.as_ref()))
            .ok_or(EngineError::NotReady)
    }

    pub fn info(&self) -> Result<EngineInfo, EngineError> {
        let abi = self.abi()?;
        Ok(EngineInfo {
            version: abi.version(),
            live_allocations: abi.live_allocations(),
        })
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("ready", &self.is_ready())
            .finish()
    }
}
