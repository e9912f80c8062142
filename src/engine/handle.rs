// src/engine/handle.rs

// Prozessweiter Engine-Zustand: Konfiguration, Parser/Formatter und der
// letzte gemeldete Fehler. Alle Engine-Aufrufe laufen seriell unter einem
// globalen Lock; der Fehler wird pro Aufruf zurückgegeben und zusätzlich
// unter demselben Lock als "letzter Fehler" abgelegt.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, Once, PoisonError};
use tracing::{debug, info, warn};

use super::native;
use super::text::{TextReader, TextWriter};
use super::{EngineFault, EngineOutcome};
use crate::config::EngineConfig;
use crate::error::GeometryResult;

struct EngineState {
    config: EngineConfig,
    reader: TextReader,
    writer: TextWriter,
    last_error: Option<String>,
}

impl EngineState {
    fn new(config: EngineConfig) -> Self {
        let writer = TextWriter::new(config.wkt_precision);
        Self {
            config,
            reader: TextReader::new(),
            writer,
            last_error: None,
        }
    }
}

static ENGINE: Mutex<Option<EngineState>> = Mutex::new(None);
static ERROR_HOOK: Once = Once::new();

thread_local! {
    static IN_ENGINE: Cell<bool> = const { Cell::new(false) };
    static CAPTURED: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn lock_engine() -> MutexGuard<'static, Option<EngineState>> {
    ENGINE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Kontext eines einzelnen Engine-Aufrufs. Gibt Zugriff auf Parser,
/// Formatter und die Notice-Senke, ohne den Lock erneut zu nehmen.
pub struct Session<'a> {
    pub(crate) config: &'a EngineConfig,
    pub(crate) reader: &'a mut TextReader,
    pub(crate) writer: &'a mut TextWriter,
}

impl Session<'_> {
    /// Notice-Callback: nie fatal, landet im Tracing-Sink.
    pub fn notice(&self, message: impl AsRef<str>) {
        if self.config.emit_notices {
            info!(target: "geobind::engine", "NOTICE: {}", message.as_ref());
        }
    }
}

/// Initialisiert die Engine mit der Standardkonfiguration.
pub fn initialize() -> GeometryResult<()> {
    initialize_with(EngineConfig::default())
}

/// Idempotent: die erste erfolgreiche Initialisierung gilt bis `shutdown()`.
pub fn initialize_with(config: EngineConfig) -> GeometryResult<()> {
    config.validate()?;
    let mut guard = lock_engine();
    if guard.is_some() {
        debug!("Engine already initialized, keeping current configuration");
        return Ok(());
    }
    install_error_hook();
    *guard = Some(EngineState::new(config));
    info!(
        engine = super::ENGINE_NAME,
        version = super::ENGINE_VERSION,
        "Geometry engine initialized"
    );
    Ok(())
}

/// Gibt Parser, Formatter und den Fehlerzustand frei. Ein späterer Aufruf
/// initialisiert die Engine wieder mit der Standardkonfiguration.
pub fn shutdown() {
    if lock_engine().take().is_some() {
        info!("Geometry engine shut down");
    }
}

pub fn is_initialized() -> bool {
    lock_engine().is_some()
}

/// Der zuletzt gemeldete Engine-Fehler, prozessweit.
pub fn last_error() -> Option<String> {
    lock_engine()
        .as_ref()
        .and_then(|state| state.last_error.clone())
}

pub fn config() -> EngineConfig {
    lock_engine()
        .as_ref()
        .map(|state| state.config.clone())
        .unwrap_or_default()
}

/// Netto-Anzahl lebender Engine-Handles, die auf diesem Thread erzeugt wurden.
pub fn handle_balance() -> i64 {
    native::balance()
}

/// Führt einen Engine-Aufruf unter dem globalen Lock aus.
///
/// Panics innerhalb der Engine werden vom Fehler-Hook abgefangen und als
/// `EngineFault` zurückgegeben; der Prozess läuft weiter.
pub(crate) fn invoke<T>(
    operation: &str,
    call: impl FnOnce(&mut Session<'_>) -> EngineOutcome<T>,
) -> EngineOutcome<T> {
    if IN_ENGINE.with(Cell::get) {
        return Err(EngineFault::new(format!(
            "re-entrant engine call to {operation}"
        )));
    }

    let mut guard = lock_engine();
    let state = guard.get_or_insert_with(|| {
        install_error_hook();
        debug!("Geometry engine initialized lazily by {}", operation);
        EngineState::new(EngineConfig::default())
    });

    let outcome = {
        let mut session = Session {
            config: &state.config,
            reader: &mut state.reader,
            writer: &mut state.writer,
        };
        IN_ENGINE.with(|flag| flag.set(true));
        let result = panic::catch_unwind(AssertUnwindSafe(|| call(&mut session)));
        IN_ENGINE.with(|flag| flag.set(false));
        result.unwrap_or_else(|payload| Err(EngineFault::new(captured_message(payload))))
    };

    if let Err(fault) = &outcome {
        warn!(operation, "Engine error: {}", fault.message);
        state.last_error = Some(fault.message.clone());
    }
    outcome
}

/// Legt einen außerhalb von `invoke` entstandenen Engine-Fehler als letzten Fehler ab.
pub(crate) fn report(operation: &str, fault: &EngineFault) {
    warn!(operation, "Engine error: {}", fault.message);
    let mut guard = lock_engine();
    let state = guard.get_or_insert_with(|| EngineState::new(EngineConfig::default()));
    state.last_error = Some(fault.message.clone());
}

fn install_error_hook() {
    ERROR_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if IN_ENGINE.with(Cell::get) {
                let mut message = payload_message(info.payload());
                if let Some(location) = info.location() {
                    message.push_str(&format!(" at {}:{}", location.file(), location.line()));
                }
                CAPTURED.with(|captured| *captured.borrow_mut() = Some(message));
            } else {
                previous(info);
            }
        }));
    });
}

fn captured_message(payload: Box<dyn Any + Send>) -> String {
    let message = CAPTURED
        .with(|captured| captured.borrow_mut().take())
        .unwrap_or_else(|| payload_message(payload.as_ref()));
    format!("EngineFailure: {message}")
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown engine failure".to_string()
    }
}
